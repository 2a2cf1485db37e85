use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::Serialize;

use super::model::Order;

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// Meteorological season of a purchase month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Dec–Feb Winter, Mar–May Spring, Jun–Aug Summer, Sep–Nov Fall.
    /// `month` is 1-based; values outside 1..=12 wrap modulo 12.
    pub fn from_month(month: u32) -> Season {
        match month % 12 {
            0..=2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SeasonFilter – "All" or one season
// ---------------------------------------------------------------------------

/// Season selection in the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SeasonFilter {
    #[default]
    All,
    Only(Season),
}

impl SeasonFilter {
    /// Every choice in the order the selector lists them.
    pub fn choices() -> impl Iterator<Item = SeasonFilter> {
        std::iter::once(SeasonFilter::All).chain(Season::ALL.into_iter().map(SeasonFilter::Only))
    }

    pub fn matches(self, season: Season) -> bool {
        match self {
            SeasonFilter::All => true,
            SeasonFilter::Only(s) => s == season,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeasonFilter::All => "All",
            SeasonFilter::Only(s) => s.label(),
        }
    }
}

impl fmt::Display for SeasonFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SeasonFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeasonFilter::choices()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown season '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Tagging
// ---------------------------------------------------------------------------

/// An order with its derived season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedOrder {
    pub order: Order,
    pub season: Season,
}

/// Attach a season to every order, once, from its purchase month.
pub fn tag_seasons(orders: &[Order]) -> Vec<TaggedOrder> {
    orders
        .iter()
        .map(|order| TaggedOrder {
            season: Season::from_month(order.purchased_at.month()),
            order: order.clone(),
        })
        .collect()
}
