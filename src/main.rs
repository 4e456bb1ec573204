mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyPivotApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional first argument: a catalog JSON to open on start-up.
    let catalog_path = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Pivot – Indicator Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyPivotApp::new(catalog_path.as_deref())))),
    )
}
