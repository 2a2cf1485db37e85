use eframe::egui::{self, Color32, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::data::aggregate::{CategoryTotal, FrequencyBin};
use crate::data::report::{format_currency, Report};
use crate::state::AppState;
use crate::ui::plot::{daily_line, ranked_bars, BarFill, BarRow};
use crate::ui::tables::text_table;

// ---------------------------------------------------------------------------
// Central panel – the selected view
// ---------------------------------------------------------------------------

/// Render the report of the selected view.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("E-commerce Analysis Dashboard");
    ui.separator();

    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset folder to begin  (File → Open dataset folder…)");
        });
        return;
    };

    let mut bin = state.bin;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match report {
            Report::Home(home) => {
                ui.heading("Welcome to the E-commerce Analysis Dashboard! ✨");
                ui.label(
                    "This dashboard provides insights into daily orders, total revenue, product \
                     sales by category, customer satisfaction, transaction frequency analysis, \
                     and product performance.",
                );
                ui.add_space(8.0);
                egui::Grid::new("overview").striped(true).show(ui, |ui: &mut Ui| {
                    ui.label("Orders");
                    ui.label(home.orders.to_string());
                    ui.end_row();
                    ui.label("Customers");
                    ui.label(home.customers.to_string());
                    ui.end_row();
                    ui.label("Revenue");
                    ui.label(format_currency(home.revenue));
                    ui.end_row();
                    if let (Some(first), Some(last)) = (home.first_day, home.last_day) {
                        ui.label("Period");
                        ui.label(format!("{first} – {last}"));
                        ui.end_row();
                    }
                });
                if let Some(data) = &state.data {
                    ui.add_space(8.0);
                    ui.weak(format!(
                        "{} incomplete or duplicate rows were removed while cleaning.",
                        data.cleaning.total_removed()
                    ));
                }
            }

            Report::CategorySales { categories } => {
                ui.heading("Sales by Product Category");
                ui.label("This chart shows total sales by product category.");
                category_section(ui, "category_sales", categories, &state.colors);
            }

            Report::PaymentSatisfaction { payment_types } => {
                ui.heading("Customer Satisfaction by Payment Method");
                ui.label(
                    "This chart shows the relationship between payment methods and customer \
                     satisfaction.",
                );
                let bars: Vec<BarRow> = payment_types
                    .iter()
                    .map(|p| BarRow {
                        label: &p.payment_type,
                        value: p.average_score,
                    })
                    .collect();
                ranked_bars(
                    ui,
                    "payment_satisfaction",
                    &bars,
                    BarFill::Uniform(Color32::from_rgb(128, 0, 128)),
                    "Average Review Score",
                );
                let rows: Vec<Vec<String>> = payment_types
                    .iter()
                    .map(|p| {
                        vec![
                            p.payment_type.clone(),
                            format!("{:.2}", p.average_score),
                            p.reviews.to_string(),
                        ]
                    })
                    .collect();
                text_table(ui, "payment_table", &["Payment Method", "Average Score", "Reviews"], &rows);
            }

            Report::CustomerFrequency {
                distribution,
                selected,
                customers,
            } => {
                ui.heading("Customer Frequency Analysis");
                ui.label(
                    "This section shows the frequency of customer transactions and their \
                     distribution.",
                );
                egui::ComboBox::from_label("Select a Frequency Bin")
                    .selected_text(bin.label())
                    .show_ui(ui, |ui: &mut Ui| {
                        for choice in FrequencyBin::ALL {
                            ui.selectable_value(&mut bin, choice, choice.label());
                        }
                    });

                ui.label(format!("Showing customers in the {selected} bin"));
                let rows: Vec<Vec<String>> = customers
                    .iter()
                    .map(|c| vec![c.customer_id.clone(), c.orders.to_string(), c.bin.to_string()])
                    .collect();
                text_table(ui, "bin_customers", &["customer_id", "frequency", "frequency_bin"], &rows);

                ui.add_space(8.0);
                ui.strong("Distribution of Customers by Frequency Bin");
                let bars: Vec<BarRow> = distribution
                    .bins
                    .iter()
                    .map(|b| BarRow {
                        label: b.bin.label(),
                        value: b.customers as f64,
                    })
                    .collect();
                ranked_bars(
                    ui,
                    "frequency_bins",
                    &bars,
                    BarFill::Uniform(Color32::from_rgb(135, 206, 235)),
                    "Number of Customers",
                );
                if distribution.out_of_range > 0 {
                    ui.weak(format!(
                        "{} customers with more than {} orders are outside every bin.",
                        distribution.out_of_range,
                        FrequencyBin::MAX_COUNT
                    ));
                }
            }

            Report::DailyOrders(daily) => {
                ui.heading("Daily Orders and Revenue");
                daily_line(ui, &daily.days);
                ui.label(egui::RichText::new(format!("Total Orders: {}", daily.total_orders)).strong());
                ui.label(
                    egui::RichText::new(format!(
                        "Total Revenue: {}",
                        format_currency(daily.total_revenue)
                    ))
                    .strong(),
                );
            }

            Report::ProductPerformance(perf) => {
                ui.heading("Product Performance");
                ui.strong("Top 5 Product Categories by Total Sales:");
                category_section(ui, "top_categories", &perf.top, &state.colors);
                ui.add_space(8.0);
                ui.strong("Bottom 5 Product Categories by Total Sales:");
                category_section(ui, "bottom_categories", &perf.bottom, &state.colors);
            }
        });

    state.set_bin(bin);
}

fn category_section(ui: &mut Ui, id: &str, categories: &[CategoryTotal], colors: &ColorMap) {
    if categories.is_empty() {
        ui.label("No sales in the selected period.");
        return;
    }
    let bars: Vec<BarRow> = categories
        .iter()
        .map(|c| BarRow {
            label: &c.category,
            value: c.total,
        })
        .collect();
    ranked_bars(ui, id, &bars, BarFill::ByLabel(colors), "Total Sales");

    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|c| vec![c.category.clone(), format!("{:.2}", c.total)])
        .collect();
    text_table(ui, &format!("{id}_table"), &["Product Category", "Total Sales"], &rows);
}
