use chrono::NaiveDate;
use serde::Serialize;

use super::season::{SeasonFilter, TaggedOrder};

// ---------------------------------------------------------------------------
// Filter predicate: date window + season
// ---------------------------------------------------------------------------

/// The viewer's current selection. Both dates are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub season: SeasonFilter,
}

impl FilterParams {
    /// A filter spanning every purchase date in `orders`, all seasons.
    /// `None` when there are no orders to span.
    pub fn covering(orders: &[TaggedOrder]) -> Option<Self> {
        let (start, end) = date_bounds(orders)?;
        Some(Self {
            start,
            end,
            season: SeasonFilter::All,
        })
    }

    /// Every date, all seasons. Used when there are no orders to span.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
            season: SeasonFilter::All,
        }
    }

    /// Whether a single order passes.
    pub fn admits(&self, tagged: &TaggedOrder) -> bool {
        let day = tagged.order.purchase_date();
        self.start <= day && day <= self.end && self.season.matches(tagged.season)
    }
}

/// Earliest and latest purchase date.
pub fn date_bounds(orders: &[TaggedOrder]) -> Option<(NaiveDate, NaiveDate)> {
    let mut days = orders.iter().map(|t| t.order.purchase_date());
    let first = days.next()?;
    Some(days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Return the orders that pass `params`, as a new vector.
///
/// An inverted window (`start > end`) matches nothing.
pub fn filter_orders(orders: &[TaggedOrder], params: &FilterParams) -> Vec<TaggedOrder> {
    if params.start > params.end {
        return Vec::new();
    }
    orders
        .iter()
        .filter(|t| params.admits(t))
        .cloned()
        .collect()
}
