use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use super::aggregate::{
    self, CategoryPerformance, CategoryTotal, CustomerFrequency, DailyOrders,
    FrequencyBin, FrequencyDistribution, PaymentScore,
};
use super::clean::{clean_dataset, CleaningReport};
use super::filter::{date_bounds, filter_orders, FilterParams};
use super::model::Dataset;
use super::season::{tag_seasons, TaggedOrder};

// ---------------------------------------------------------------------------
// PreparedData – cleaned + tagged, computed once per load
// ---------------------------------------------------------------------------

/// The canonical tables every view is derived from.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub tables: Dataset,
    pub orders: Vec<TaggedOrder>,
    pub cleaning: CleaningReport,
}

impl PreparedData {
    pub fn prepare(raw: &Dataset) -> Self {
        let (tables, cleaning) = clean_dataset(raw);
        let orders = tag_seasons(&tables.orders);
        Self {
            tables,
            orders,
            cleaning,
        }
    }

    /// Filter selecting every order. An empty order table gets an
    /// unbounded window, so every view still renders (empty).
    pub fn default_filter(&self) -> FilterParams {
        FilterParams::covering(&self.orders).unwrap_or_else(FilterParams::unbounded)
    }
}

// ---------------------------------------------------------------------------
// View – which section the viewer is looking at
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum View {
    #[default]
    Home,
    CategorySales,
    PaymentSatisfaction,
    CustomerFrequency,
    DailyOrders,
    ProductPerformance,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Home,
        View::CategorySales,
        View::PaymentSatisfaction,
        View::CustomerFrequency,
        View::DailyOrders,
        View::ProductPerformance,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::CategorySales => "Category Sales",
            View::PaymentSatisfaction => "Payment Satisfaction",
            View::CustomerFrequency => "Customer Frequency Analysis",
            View::DailyOrders => "Daily Orders",
            View::ProductPerformance => "Product Performance",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Report – output of one view
// ---------------------------------------------------------------------------

/// Headline numbers for the landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub orders: usize,
    pub customers: usize,
    pub revenue: f64,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Report {
    Home(Overview),
    CategorySales {
        categories: Vec<CategoryTotal>,
    },
    PaymentSatisfaction {
        payment_types: Vec<PaymentScore>,
    },
    CustomerFrequency {
        distribution: FrequencyDistribution,
        selected: FrequencyBin,
        customers: Vec<CustomerFrequency>,
    },
    DailyOrders(DailyOrders),
    ProductPerformance(CategoryPerformance),
}

impl Report {
    pub fn view(&self) -> View {
        match self {
            Report::Home(_) => View::Home,
            Report::CategorySales { .. } => View::CategorySales,
            Report::PaymentSatisfaction { .. } => View::PaymentSatisfaction,
            Report::CustomerFrequency { .. } => View::CustomerFrequency,
            Report::DailyOrders(_) => View::DailyOrders,
            Report::ProductPerformance(_) => View::ProductPerformance,
        }
    }
}

/// Filter the orders, then run only the aggregation `view` needs.
pub fn build_report(
    view: View,
    data: &PreparedData,
    params: &FilterParams,
    bin: FrequencyBin,
) -> Report {
    let filtered = filter_orders(&data.orders, params);
    let tables = &data.tables;
    log::debug!("{view}: {} of {} orders pass the filter", filtered.len(), data.orders.len());

    match view {
        View::Home => Report::Home(overview(&filtered, tables)),
        View::CategorySales => Report::CategorySales {
            categories: aggregate::category_sales(&filtered, &tables.order_items, &tables.products),
        },
        View::PaymentSatisfaction => Report::PaymentSatisfaction {
            payment_types: aggregate::payment_satisfaction(
                &filtered,
                &tables.payments,
                &tables.reviews,
            ),
        },
        View::CustomerFrequency => Report::CustomerFrequency {
            distribution: aggregate::frequency_distribution(&filtered),
            selected: bin,
            customers: aggregate::customers_in_bin(&filtered, bin),
        },
        View::DailyOrders => Report::DailyOrders(aggregate::daily_orders(&filtered, &tables.payments)),
        View::ProductPerformance => Report::ProductPerformance(aggregate::category_performance(
            &filtered,
            &tables.order_items,
            &tables.products,
        )),
    }
}

fn overview(filtered: &[TaggedOrder], tables: &Dataset) -> Overview {
    let customers: HashSet<&str> = filtered
        .iter()
        .map(|t| t.order.customer_id.as_str())
        .collect();
    let bounds = date_bounds(filtered);
    Overview {
        orders: filtered.len(),
        customers: customers.len(),
        revenue: aggregate::revenue(filtered, &tables.payments),
        first_day: bounds.map(|(first, _)| first),
        last_day: bounds.map(|(_, last)| last),
    }
}

// ---------------------------------------------------------------------------
// Export / formatting
// ---------------------------------------------------------------------------

/// Write a report, with the filter it was computed under, as pretty JSON.
pub fn export_report(report: &Report, params: &FilterParams, path: &Path) -> Result<()> {
    #[derive(Serialize)]
    struct Export<'a> {
        filter: &'a FilterParams,
        report: &'a Report,
    }

    let json = serde_json::to_string_pretty(&Export {
        filter: params,
        report,
    })
    .context("serialising report")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} report to {}", report.view(), path.display());
    Ok(())
}

/// `AUD 1,234,567.89`
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let rounds_to_zero = whole.bytes().all(|b| b == b'0') && cents.bytes().all(|b| b == b'0');
    let sign = if value < 0.0 && !rounds_to_zero { "-" } else { "" };
    format!("AUD {sign}{grouped}.{cents}")
}
