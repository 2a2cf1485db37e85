/// Data layer: loading, cleaning, filtering and the aggregate views.
///
/// Architecture:
/// ```text
///  orders / payments / items / products / reviews   (.csv / .parquet / .json)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse five files → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  fill nulls, drop incomplete items, drop duplicates
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  season   │  purchase month → Season   (PreparedData ends here)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date window + season → filtered orders
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  one pure function per view → Report
///   └───────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;
pub mod season;
