use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::aggregate::FrequencyBin;
use crate::data::filter::FilterParams;
use crate::data::loader::load_dataset;
use crate::data::model::Dataset;
use crate::data::report::{build_report, export_report, PreparedData, Report, View};
use crate::data::season::SeasonFilter;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Cleaned, season-tagged tables (None until a dataset is opened).
    pub data: Option<PreparedData>,

    /// Directory the current dataset came from.
    pub source_dir: Option<PathBuf>,

    /// Date window and season; set once a dataset is loaded.
    pub filter: Option<FilterParams>,

    /// Which section is shown.
    pub view: View,

    /// Bin whose customers the frequency view lists.
    pub bin: FrequencyBin,

    /// Output of `view` under `filter` (cached).
    pub report: Option<Report>,

    /// Category colours for the bar charts.
    pub colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load the five tables from `dir`; on failure keep the previous dataset.
    pub fn open_dir(&mut self, dir: &Path) {
        match load_dataset(dir) {
            Ok(raw) => {
                self.source_dir = Some(dir.to_path_buf());
                self.set_dataset(&raw);
            }
            Err(e) => {
                log::error!("Failed to load dataset from {}: {e:#}", dir.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the filter to cover it.
    pub fn set_dataset(&mut self, raw: &Dataset) {
        let data = PreparedData::prepare(raw);
        self.colors = ColorMap::new(
            data.tables
                .products
                .iter()
                .filter_map(|p| p.category_name.as_deref()),
        );
        self.filter = Some(data.default_filter());
        self.status_message = data
            .orders
            .is_empty()
            .then(|| "Dataset has no orders".to_string());
        self.data = Some(data);
        self.refresh();
    }

    /// Recompute the cached report after any selection change.
    pub fn refresh(&mut self) {
        self.report = match (&self.data, &self.filter) {
            (Some(data), Some(filter)) => Some(build_report(self.view, data, filter, self.bin)),
            _ => None,
        };
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.refresh();
        }
    }

    pub fn set_bin(&mut self, bin: FrequencyBin) {
        if self.bin != bin {
            self.bin = bin;
            self.refresh();
        }
    }

    pub fn set_season(&mut self, season: SeasonFilter) {
        self.update_filter(|f| f.season = season);
    }

    pub fn set_start(&mut self, start: NaiveDate) {
        self.update_filter(|f| f.start = start);
    }

    pub fn set_end(&mut self, end: NaiveDate) {
        self.update_filter(|f| f.end = end);
    }

    /// Back to the full date range and all seasons.
    pub fn reset_filter(&mut self) {
        if let Some(data) = &self.data {
            self.filter = Some(data.default_filter());
            self.refresh();
        }
    }

    fn update_filter(&mut self, change: impl FnOnce(&mut FilterParams)) {
        if let Some(filter) = &mut self.filter {
            let before = *filter;
            change(filter);
            if *filter != before {
                self.refresh();
            }
        }
    }

    /// Write the current report as JSON.
    pub fn export(&mut self, path: &Path) {
        let (Some(report), Some(filter)) = (&self.report, &self.filter) else {
            self.status_message = Some("Nothing to export".to_string());
            return;
        };
        match export_report(report, filter, path) {
            Ok(()) => self.status_message = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Order, Stamp};
    use crate::data::season::Season;

    fn dataset() -> Dataset {
        let order = |id: &str, m: u32| Order {
            order_id: id.into(),
            customer_id: format!("c-{id}"),
            status: None,
            purchased_at: NaiveDate::from_ymd_opt(2018, m, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            approved_at: Stamp::Missing,
            delivered_carrier_at: Stamp::Missing,
            delivered_customer_at: Stamp::Missing,
            estimated_delivery_at: Stamp::Missing,
        };
        Dataset {
            orders: vec![order("o1", 1), order("o2", 6)],
            ..Default::default()
        }
    }

    fn home_orders(state: &AppState) -> usize {
        match &state.report {
            Some(Report::Home(home)) => home.orders,
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn selections_recompute_the_report() {
        let mut state = AppState::default();
        state.set_dataset(&dataset());
        assert_eq!(home_orders(&state), 2);

        state.set_season(SeasonFilter::Only(Season::Summer));
        assert_eq!(home_orders(&state), 1);

        state.set_end(NaiveDate::from_ymd_opt(2018, 3, 1).unwrap());
        assert_eq!(home_orders(&state), 0);

        state.reset_filter();
        assert_eq!(home_orders(&state), 2);

        state.set_view(View::DailyOrders);
        assert!(matches!(state.report, Some(Report::DailyOrders(_))));
    }

    #[test]
    fn empty_dataset_still_renders_views() {
        let mut state = AppState::default();
        state.set_dataset(&Dataset::default());
        assert_eq!(home_orders(&state), 0);
        assert_eq!(state.status_message.as_deref(), Some("Dataset has no orders"));

        state.set_view(View::CategorySales);
        match &state.report {
            Some(Report::CategorySales { categories }) => assert!(categories.is_empty()),
            other => panic!("unexpected report {other:?}"),
        }

        state.set_view(View::CustomerFrequency);
        match &state.report {
            Some(Report::CustomerFrequency { distribution, customers, .. }) => {
                assert_eq!(distribution.binned_customers(), 0);
                assert!(customers.is_empty());
            }
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn failed_load_reports_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_dir(dir.path());
        assert!(state.data.is_none());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Error")));
    }
}
