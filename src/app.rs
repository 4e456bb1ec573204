use std::path::Path;

use eframe::egui;
use rusty_pivot::Catalog;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyPivotApp {
    pub state: AppState,
}

impl RustyPivotApp {
    /// Start with the catalog at `path` already open, if one was given.
    pub fn new(catalog_path: Option<&Path>) -> Self {
        let mut app = Self::default();
        if let Some(path) = catalog_path {
            match Catalog::load(path) {
                Ok(catalog) => app.state.set_catalog(catalog),
                Err(e) => {
                    log::error!("Failed to open catalog: {e:#}");
                    app.state.status_message = Some(format!("Error: {e:#}"));
                }
            }
        }
        app
    }
}

impl eframe::App for RustyPivotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: dataset, filters, period ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart(ui, &self.state);
        });
    }
}
