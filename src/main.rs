mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::DashboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional dataset directory to open on start.
    let dataset_dir = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Shop Lens – E-commerce Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(dataset_dir)))),
    )
}
