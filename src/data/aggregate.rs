use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::clean::UNKNOWN;
use super::model::{OrderItem, Payment, Product, Review};
use super::season::TaggedOrder;

/// How many categories the top and bottom rankings show.
pub const RANKING_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentScore {
    pub payment_type: String,
    pub average_score: f64,
    /// Payment/review pairs that went into the average.
    pub reviews: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinCount {
    pub bin: FrequencyBin,
    pub customers: usize,
}

/// Customers per frequency bin, in bin order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyDistribution {
    pub bins: Vec<BinCount>,
    /// Customers whose order count falls outside every bin (above 200).
    pub out_of_range: usize,
}

impl FrequencyDistribution {
    pub fn binned_customers(&self) -> usize {
        self.bins.iter().map(|b| b.customers).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerFrequency {
    pub customer_id: String,
    pub orders: usize,
    pub bin: FrequencyBin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOrders {
    pub days: Vec<DailyCount>,
    pub total_orders: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPerformance {
    pub top: Vec<CategoryTotal>,
    pub bottom: Vec<CategoryTotal>,
}

// ---------------------------------------------------------------------------
// FrequencyBin
// ---------------------------------------------------------------------------

/// Right-closed bucket of a customer's order count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum FrequencyBin {
    #[default]
    UpTo10,
    UpTo20,
    UpTo50,
    UpTo100,
    Over100,
}

impl FrequencyBin {
    pub const ALL: [FrequencyBin; 5] = [
        FrequencyBin::UpTo10,
        FrequencyBin::UpTo20,
        FrequencyBin::UpTo50,
        FrequencyBin::UpTo100,
        FrequencyBin::Over100,
    ];

    /// Upper edge of the last bin; counts above it belong nowhere.
    pub const MAX_COUNT: usize = 200;

    /// Bins are (0,10], (10,20], (20,50], (50,100], (100,200].
    pub fn from_count(count: usize) -> Option<FrequencyBin> {
        match count {
            1..=10 => Some(FrequencyBin::UpTo10),
            11..=20 => Some(FrequencyBin::UpTo20),
            21..=50 => Some(FrequencyBin::UpTo50),
            51..=100 => Some(FrequencyBin::UpTo100),
            101..=200 => Some(FrequencyBin::Over100),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FrequencyBin::UpTo10 => "0-10",
            FrequencyBin::UpTo20 => "11-20",
            FrequencyBin::UpTo50 => "21-50",
            FrequencyBin::UpTo100 => "51-100",
            FrequencyBin::Over100 => "101+",
        }
    }
}

impl fmt::Display for FrequencyBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

fn order_ids(filtered: &[TaggedOrder]) -> HashSet<&str> {
    filtered.iter().map(|t| t.order.order_id.as_str()).collect()
}

/// Total item price per product category, largest first.
///
/// Categories are grouped in name order before the (stable) sort, so equal
/// totals stay in ascending name order. Items whose order is not in
/// `filtered` or whose product is unknown are skipped.
pub fn category_sales(
    filtered: &[TaggedOrder],
    items: &[OrderItem],
    products: &[Product],
) -> Vec<CategoryTotal> {
    let orders = order_ids(filtered);
    let mut categories: HashMap<&str, Vec<&str>> = HashMap::new();
    for p in products {
        categories
            .entry(p.product_id.as_str())
            .or_default()
            .push(p.category_name.as_deref().unwrap_or(UNKNOWN));
    }

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for item in items {
        let (Some(order_id), Some(product_id), Some(price)) =
            (item.order_id.as_deref(), item.product_id.as_deref(), item.price)
        else {
            continue;
        };
        if !orders.contains(order_id) {
            continue;
        }
        for category in categories.get(product_id).into_iter().flatten() {
            *totals.entry(*category).or_default() += price.value();
        }
    }

    let mut sales: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    sales.sort_by(|a, b| b.total.total_cmp(&a.total));
    sales
}

/// Mean review score per payment type over the filtered orders.
///
/// Every payment row pairs with every review of the same order. Payment
/// types without any such pair do not appear.
pub fn payment_satisfaction(
    filtered: &[TaggedOrder],
    payments: &[Payment],
    reviews: &[Review],
) -> Vec<PaymentScore> {
    let orders = order_ids(filtered);
    let mut scores: HashMap<&str, Vec<u8>> = HashMap::new();
    for r in reviews {
        scores.entry(r.order_id.as_str()).or_default().push(r.score);
    }

    let mut sums: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for p in payments.iter().filter(|p| orders.contains(p.order_id.as_str())) {
        let Some(order_scores) = scores.get(p.order_id.as_str()) else {
            continue;
        };
        let (sum, n) = sums.entry(p.payment_type.as_str()).or_default();
        *sum += order_scores.iter().map(|&s| u64::from(s)).sum::<u64>();
        *n += order_scores.len();
    }

    sums.into_iter()
        .filter(|(_, (_, n))| *n > 0)
        .map(|(payment_type, (sum, n))| PaymentScore {
            payment_type: payment_type.to_string(),
            average_score: sum as f64 / n as f64,
            reviews: n,
        })
        .collect()
}

fn orders_per_customer(filtered: &[TaggedOrder]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in filtered {
        *counts.entry(t.order.customer_id.as_str()).or_default() += 1;
    }
    counts
}

/// Number of customers in each frequency bin, all five bins listed.
pub fn frequency_distribution(filtered: &[TaggedOrder]) -> FrequencyDistribution {
    let mut per_bin: BTreeMap<FrequencyBin, usize> = BTreeMap::new();
    let mut out_of_range = 0;
    for count in orders_per_customer(filtered).into_values() {
        match FrequencyBin::from_count(count) {
            Some(bin) => *per_bin.entry(bin).or_default() += 1,
            None => out_of_range += 1,
        }
    }
    if out_of_range > 0 {
        log::debug!("{out_of_range} customers above {} orders left unbinned", FrequencyBin::MAX_COUNT);
    }

    FrequencyDistribution {
        bins: FrequencyBin::ALL
            .iter()
            .map(|&bin| BinCount {
                bin,
                customers: per_bin.get(&bin).copied().unwrap_or(0),
            })
            .collect(),
        out_of_range,
    }
}

/// Customers of one bin with their order counts, busiest first.
pub fn customers_in_bin(filtered: &[TaggedOrder], bin: FrequencyBin) -> Vec<CustomerFrequency> {
    let mut rows: Vec<CustomerFrequency> = orders_per_customer(filtered)
        .into_iter()
        .filter(|&(_, n)| FrequencyBin::from_count(n) == Some(bin))
        .map(|(customer_id, orders)| CustomerFrequency {
            customer_id: customer_id.to_string(),
            orders,
            bin,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.orders
            .cmp(&a.orders)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    rows
}

/// Orders per purchase day plus the revenue of the filtered orders.
pub fn daily_orders(filtered: &[TaggedOrder], payments: &[Payment]) -> DailyOrders {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for t in filtered {
        *per_day.entry(t.order.purchase_date()).or_default() += 1;
    }

    DailyOrders {
        days: per_day
            .into_iter()
            .map(|(date, orders)| DailyCount { date, orders })
            .collect(),
        total_orders: filtered.len(),
        total_revenue: revenue(filtered, payments),
    }
}

/// Sum of payment values whose order is in `filtered`.
pub fn revenue(filtered: &[TaggedOrder], payments: &[Payment]) -> f64 {
    let orders = order_ids(filtered);
    payments
        .iter()
        .filter(|p| orders.contains(p.order_id.as_str()))
        .map(|p| p.value.value())
        .sum()
}

/// Head and tail of the [`category_sales`] ranking.
pub fn category_performance(
    filtered: &[TaggedOrder],
    items: &[OrderItem],
    products: &[Product],
) -> CategoryPerformance {
    let sales = category_sales(filtered, items, products);
    let n = sales.len().min(RANKING_SIZE);
    CategoryPerformance {
        top: sales[..n].to_vec(),
        bottom: sales[sales.len() - n..].to_vec(),
    }
}
