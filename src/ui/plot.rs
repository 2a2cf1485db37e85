use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints};

use crate::color::ColorMap;
use crate::data::aggregate::DailyCount;

// ---------------------------------------------------------------------------
// Horizontal bar chart (ranked tables)
// ---------------------------------------------------------------------------

/// One bar: label and length.
pub struct BarRow<'a> {
    pub label: &'a str,
    pub value: f64,
}

/// How bars are coloured.
pub enum BarFill<'a> {
    Uniform(Color32),
    ByLabel(&'a ColorMap),
}

/// Horizontal bars, first row on top, labels on the y axis.
pub fn ranked_bars(ui: &mut Ui, id: &str, rows: &[BarRow<'_>], fill: BarFill<'_>, value_label: &str) {
    let n = rows.len();
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let color = match &fill {
                BarFill::Uniform(c) => *c,
                BarFill::ByLabel(map) => map.color_for(row.label),
            };
            Bar::new((n - 1 - i) as f64, row.value)
                .name(row.label)
                .fill(color)
                .width(0.7)
        })
        .collect();

    // Labels indexed by bar position, bottom bar first.
    let labels: Vec<String> = rows.iter().rev().map(|r| r.label.to_string()).collect();
    let height = (n as f32 * 22.0).clamp(160.0, 900.0);

    Plot::new(id)
        .height(height)
        .x_axis_label(value_label)
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            label_at(&labels, mark.value)
        })
        .allow_scroll(false)
        .allow_drag(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn label_at(labels: &[String], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Daily order line
// ---------------------------------------------------------------------------

/// Orders per day as a line over calendar dates.
pub fn daily_line(ui: &mut Ui, days: &[DailyCount]) {
    let points: PlotPoints = days
        .iter()
        .map(|d| [f64::from(d.date.num_days_from_ce()), d.orders as f64])
        .collect();

    Plot::new("daily_orders")
        .height(320.0)
        .x_axis_label("Date")
        .y_axis_label("Total Orders")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            day_label(mark.value)
        })
        .label_formatter(|_name, point| format!("{}\n{:.0} orders", day_label(point.x), point.y))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Daily orders")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
        });
}

fn day_label(x: f64) -> String {
    if !x.is_finite() || x.abs() > f64::from(i32::MAX) {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_labels_only_on_whole_positions() {
        let labels = vec!["low".to_string(), "high".to_string()];
        assert_eq!(label_at(&labels, 1.0), "high");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 7.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }

    #[test]
    fn day_axis_round_trips_dates() {
        let d = NaiveDate::from_ymd_opt(2018, 3, 14).unwrap();
        assert_eq!(day_label(f64::from(d.num_days_from_ce())), "2018-03-14");
        assert_eq!(day_label(f64::NAN), "");
    }
}
