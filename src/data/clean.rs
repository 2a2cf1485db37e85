use std::collections::HashSet;
use std::hash::Hash;

use super::model::{Dataset, Order, OrderItem, Product, Review, Stamp};

pub const UNKNOWN: &str = "Unknown";
pub const NO_TITLE: &str = "No Title";
pub const NO_MESSAGE: &str = "No Message";

/// Rows removed from one table during cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCleaning {
    pub dropped_incomplete: usize,
    pub dropped_duplicates: usize,
}

/// Per-table summary of what [`clean_dataset`] removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub orders: TableCleaning,
    pub payments: TableCleaning,
    pub order_items: TableCleaning,
    pub products: TableCleaning,
    pub reviews: TableCleaning,
}

impl CleaningReport {
    pub fn total_removed(&self) -> usize {
        [
            self.orders,
            self.payments,
            self.order_items,
            self.products,
            self.reviews,
        ]
        .iter()
        .map(|t| t.dropped_incomplete + t.dropped_duplicates)
        .sum()
    }
}

/// Fill defaults, drop incomplete order items, then drop exact duplicates.
/// The input is left untouched; cleaning a cleaned dataset changes nothing.
pub fn clean_dataset(raw: &Dataset) -> (Dataset, CleaningReport) {
    let mut report = CleaningReport::default();

    let orders = dedup(raw.orders.iter().map(fill_order), &mut report.orders);
    let payments = dedup(raw.payments.iter().cloned(), &mut report.payments);
    let products = dedup(raw.products.iter().map(fill_product), &mut report.products);
    let reviews = dedup(raw.reviews.iter().map(fill_review), &mut report.reviews);

    let complete: Vec<OrderItem> = raw
        .order_items
        .iter()
        .filter(|item| item.is_complete())
        .cloned()
        .collect();
    report.order_items.dropped_incomplete = raw.order_items.len() - complete.len();
    let order_items = dedup(complete, &mut report.order_items);

    for (table, stats) in [
        ("orders", report.orders),
        ("payments", report.payments),
        ("order items", report.order_items),
        ("products", report.products),
        ("reviews", report.reviews),
    ] {
        log::debug!(
            "Cleaned {table}: {} incomplete, {} duplicate rows dropped",
            stats.dropped_incomplete,
            stats.dropped_duplicates
        );
    }
    log::info!("Cleaning removed {} rows", report.total_removed());

    let cleaned = Dataset {
        orders,
        payments,
        order_items,
        products,
        reviews,
    };
    (cleaned, report)
}

/// Keep the first occurrence of each row, preserving input order.
fn dedup<T, I>(rows: I, stats: &mut TableCleaning) -> Vec<T>
where
    T: Clone + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for row in rows {
        if seen.insert(row.clone()) {
            kept.push(row);
        } else {
            stats.dropped_duplicates += 1;
        }
    }
    kept
}

fn fill_order(order: &Order) -> Order {
    let placeholder = |stamp: Stamp| if stamp.is_missing() { Stamp::Unknown } else { stamp };
    Order {
        status: Some(order.status.clone().unwrap_or_else(|| UNKNOWN.to_string())),
        approved_at: placeholder(order.approved_at),
        delivered_carrier_at: placeholder(order.delivered_carrier_at),
        delivered_customer_at: placeholder(order.delivered_customer_at),
        ..order.clone()
    }
}

fn fill_product(product: &Product) -> Product {
    let zero = |v: Option<u32>| Some(v.unwrap_or(0));
    Product {
        product_id: product.product_id.clone(),
        category_name: Some(
            product
                .category_name
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        ),
        name_length: zero(product.name_length),
        description_length: zero(product.description_length),
        photos_qty: zero(product.photos_qty),
        weight_g: zero(product.weight_g),
        length_cm: zero(product.length_cm),
        height_cm: zero(product.height_cm),
        width_cm: zero(product.width_cm),
    }
}

fn fill_review(review: &Review) -> Review {
    Review {
        comment_title: Some(
            review
                .comment_title
                .clone()
                .unwrap_or_else(|| NO_TITLE.to_string()),
        ),
        comment_message: Some(
            review
                .comment_message
                .clone()
                .unwrap_or_else(|| NO_MESSAGE.to_string()),
        ),
        ..review.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Amount, Payment};
    use chrono::NaiveDate;

    fn order(id: &str) -> Order {
        Order {
            order_id: id.into(),
            customer_id: "c1".into(),
            status: None,
            purchased_at: NaiveDate::from_ymd_opt(2018, 3, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            approved_at: Stamp::Missing,
            delivered_carrier_at: Stamp::Missing,
            delivered_customer_at: Stamp::Missing,
            estimated_delivery_at: Stamp::Missing,
        }
    }

    fn item(order_id: &str, product_id: Option<&str>, price: f64) -> OrderItem {
        OrderItem {
            order_id: Some(order_id.into()),
            order_item_id: Some(1),
            product_id: product_id.map(Into::into),
            seller_id: Some("s1".into()),
            shipping_limit_date: None,
            price: Some(Amount(price)),
            freight_value: None,
        }
    }

    fn review(id: &str) -> Review {
        Review {
            review_id: id.into(),
            order_id: "o1".into(),
            score: 5,
            comment_title: None,
            comment_message: Some("great".into()),
            created_at: None,
            answered_at: None,
        }
    }

    fn sample() -> Dataset {
        Dataset {
            orders: vec![order("o1"), order("o1"), order("o2")],
            payments: vec![Payment {
                order_id: "o1".into(),
                sequential: Some(1),
                payment_type: "boleto".into(),
                installments: Some(1),
                value: Amount(20.0),
            }],
            order_items: vec![
                item("o1", Some("p1"), 10.0),
                item("o1", None, 5.0),
                item("o1", Some("p1"), 10.0),
            ],
            products: vec![Product {
                product_id: "p1".into(),
                weight_g: Some(300),
                ..Default::default()
            }],
            reviews: vec![review("r1")],
        }
    }

    #[test]
    fn fills_defaults() {
        let (clean, _) = clean_dataset(&sample());

        let o = &clean.orders[0];
        assert_eq!(o.status.as_deref(), Some(UNKNOWN));
        assert_eq!(o.approved_at, Stamp::Unknown);
        assert_eq!(o.delivered_customer_at, Stamp::Unknown);
        assert_eq!(o.estimated_delivery_at, Stamp::Missing);

        let p = &clean.products[0];
        assert_eq!(p.category_name.as_deref(), Some(UNKNOWN));
        assert_eq!(p.weight_g, Some(300));
        assert_eq!(p.photos_qty, Some(0));

        let r = &clean.reviews[0];
        assert_eq!(r.comment_title.as_deref(), Some(NO_TITLE));
        assert_eq!(r.comment_message.as_deref(), Some("great"));
    }

    #[test]
    fn drops_incomplete_items_and_duplicates() {
        let (clean, report) = clean_dataset(&sample());
        assert_eq!(clean.order_items.len(), 1);
        assert_eq!(report.order_items.dropped_incomplete, 1);
        assert_eq!(report.order_items.dropped_duplicates, 1);

        assert_eq!(clean.orders.len(), 2);
        assert_eq!(clean.orders[0].order_id, "o1");
        assert_eq!(clean.orders[1].order_id, "o2");
        assert_eq!(report.orders.dropped_duplicates, 1);
        assert_eq!(report.total_removed(), 3);
    }

    #[test]
    fn rows_differing_in_one_field_are_not_duplicates() {
        let mut raw = sample();
        raw.order_items = vec![item("o1", Some("p1"), 10.0), item("o1", Some("p1"), 10.5)];
        let (clean, _) = clean_dataset(&raw);
        assert_eq!(clean.order_items.len(), 2);
    }

    #[test]
    fn payments_with_blank_counters_are_distinct_rows() {
        let payment = |sequential, installments| Payment {
            order_id: "o1".into(),
            sequential,
            payment_type: "credit_card".into(),
            installments,
            value: Amount(10.0),
        };
        let mut raw = sample();
        raw.payments = vec![payment(None, None), payment(Some(1), Some(0))];
        let (clean, report) = clean_dataset(&raw);
        assert_eq!(clean.payments.len(), 2);
        assert_eq!(report.payments.dropped_duplicates, 0);
        let total: f64 = clean.payments.iter().map(|p| p.value.value()).sum();
        assert_eq!(total, 20.0);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let (once, _) = clean_dataset(&sample());
        let (twice, report) = clean_dataset(&once);
        assert_eq!(once.orders, twice.orders);
        assert_eq!(once.order_items, twice.order_items);
        assert_eq!(once.products, twice.products);
        assert_eq!(once.reviews, twice.reviews);
        assert_eq!(once.payments, twice.payments);
        assert_eq!(report.total_removed(), 0);
    }

    #[test]
    fn input_is_not_mutated() {
        let raw = sample();
        let before = raw.orders.clone();
        let _ = clean_dataset(&raw);
        assert_eq!(raw.orders, before);
    }

    #[test]
    fn empty_tables_are_fine() {
        let (clean, report) = clean_dataset(&Dataset::default());
        assert!(clean.orders.is_empty());
        assert_eq!(report, CleaningReport::default());
    }
}
