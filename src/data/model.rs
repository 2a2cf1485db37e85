use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Amount – a monetary value that can live in a HashSet
// ---------------------------------------------------------------------------

/// A price or payment value.
/// Rows are deduplicated through a `HashSet`, so `Amount` must be `Eq + Hash`;
/// equality is bitwise, which is what an exact-duplicate check wants.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(pub f64);

impl Amount {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Amount {}

impl Hash for Amount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

// ---------------------------------------------------------------------------
// Stamp – an optional timestamp with an explicit placeholder state
// ---------------------------------------------------------------------------

/// A lifecycle timestamp of an order.
///
/// `Missing` is what the source had; `Unknown` is what the cleaner writes in
/// its place. Nothing downstream parses these fields as dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stamp {
    Present(NaiveDateTime),
    #[default]
    Missing,
    Unknown,
}

impl Stamp {
    pub fn is_missing(&self) -> bool {
        matches!(self, Stamp::Missing)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stamp::Present(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Stamp::Missing => write!(f, "<null>"),
            Stamp::Unknown => write!(f, "Unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records – one struct per source table row
// ---------------------------------------------------------------------------

/// One row of `orders_dataset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub status: Option<String>,
    pub purchased_at: NaiveDateTime,
    pub approved_at: Stamp,
    pub delivered_carrier_at: Stamp,
    pub delivered_customer_at: Stamp,
    pub estimated_delivery_at: Stamp,
}

impl Order {
    /// Calendar day of purchase; time of day is dropped.
    pub fn purchase_date(&self) -> NaiveDate {
        self.purchased_at.date()
    }
}

/// One row of `order_payments_dataset`.
/// Nothing aggregates the counters, so blanks stay blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payment {
    pub order_id: String,
    pub sequential: Option<u32>,
    pub payment_type: String,
    pub installments: Option<u32>,
    pub value: Amount,
}

/// One row of `order_items_dataset`.
/// Identifier columns stay optional until the cleaner drops incomplete rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OrderItem {
    pub order_id: Option<String>,
    pub order_item_id: Option<u32>,
    pub product_id: Option<String>,
    pub seller_id: Option<String>,
    pub shipping_limit_date: Option<String>,
    pub price: Option<Amount>,
    pub freight_value: Option<Amount>,
}

impl OrderItem {
    /// Whether every column the aggregations join or sum on is present.
    pub fn is_complete(&self) -> bool {
        self.order_id.is_some()
            && self.order_item_id.is_some()
            && self.product_id.is_some()
            && self.seller_id.is_some()
            && self.price.is_some()
    }
}

/// One row of `products_dataset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Product {
    pub product_id: String,
    pub category_name: Option<String>,
    pub name_length: Option<u32>,
    pub description_length: Option<u32>,
    pub photos_qty: Option<u32>,
    pub weight_g: Option<u32>,
    pub length_cm: Option<u32>,
    pub height_cm: Option<u32>,
    pub width_cm: Option<u32>,
}

/// One row of `order_reviews_dataset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Review {
    pub review_id: String,
    pub order_id: String,
    pub score: u8,
    pub comment_title: Option<String>,
    pub comment_message: Option<String>,
    pub created_at: Option<String>,
    pub answered_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Dataset – the five loaded tables
// ---------------------------------------------------------------------------

/// All five source tables, held in memory for the session.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub order_items: Vec<OrderItem>,
    pub products: Vec<Product>,
    pub reviews: Vec<Review>,
}

impl Dataset {
    /// `(table name, row count)` for every table, in load order.
    pub fn row_counts(&self) -> [(&'static str, usize); 5] {
        [
            ("orders", self.orders.len()),
            ("payments", self.payments.len()),
            ("order items", self.order_items.len()),
            ("products", self.products.len()),
            ("reviews", self.reviews.len()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn amount_equality_is_bitwise() {
        let mut set = HashSet::new();
        set.insert(Amount(10.5));
        set.insert(Amount(10.5));
        set.insert(Amount(10.25));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn stamp_placeholder_renders_as_unknown() {
        assert_eq!(Stamp::Unknown.to_string(), "Unknown");
        assert!(Stamp::Missing.is_missing());
        assert!(!Stamp::Unknown.is_missing());
    }

    #[test]
    fn incomplete_item_is_detected() {
        let item = OrderItem {
            order_id: Some("o1".into()),
            order_item_id: Some(1),
            product_id: Some("p1".into()),
            seller_id: Some("s1".into()),
            price: None,
            ..Default::default()
        };
        assert!(!item.is_complete());
        let item = OrderItem {
            price: Some(Amount(3.0)),
            ..item
        };
        assert!(item.is_complete());
    }
}
