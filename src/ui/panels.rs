use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_pivot::{Catalog, Period, Selection, WILDCARD};

use crate::state::{AppState, ChartKind, PeriodChoice};

// ---------------------------------------------------------------------------
// Left side panel – dataset and filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dataset");
    ui.separator();

    let Some(catalog) = &state.catalog else {
        ui.label("No catalog loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the widgets.
    let choices: Vec<(String, String)> = catalog
        .datasets
        .iter()
        .map(|d| (d.id.clone(), display_title(&d.title, &d.id)))
        .collect();
    let active_id = state.active.as_ref().map(|ds| ds.id().to_string());
    let active_title = choices
        .iter()
        .find(|(id, _)| Some(id) == active_id.as_ref())
        .map(|(_, title)| title.clone())
        .unwrap_or_default();

    egui::ComboBox::from_id_salt("dataset")
        .selected_text(active_title)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for (id, title) in &choices {
                if ui
                    .selectable_label(active_id.as_ref() == Some(id), title)
                    .clicked()
                {
                    state.select_dataset(id);
                }
            }
        });

    let Some(ds) = state.active.clone() else {
        return;
    };

    ui.add_space(8.0);
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- One combo per dimension: the wildcard, then every value ----
            for dim in ds.dimensions().dimensions() {
                ui.strong(&dim.name);
                let current = state.filter.get(&dim.name).clone();

                let current_text = match current.value() {
                    Some(value) => ds.display_value(&dim.name, value).to_string(),
                    None => WILDCARD.to_string(),
                };

                egui::ComboBox::from_id_salt(("dim", &dim.name))
                    .selected_text(current_text)
                    .show_ui(ui, |ui: &mut Ui| {
                        if ui.selectable_label(current.is_all(), WILDCARD).clicked() {
                            state.set_selection(&dim.name, Selection::All);
                        }
                        for value in &dim.values {
                            let selected = current.value() == Some(value.as_str());
                            let text = ds.display_value(&dim.name, value);
                            if ui.selectable_label(selected, text).clicked() {
                                state.set_selection(&dim.name, Selection::Value(value.clone()));
                            }
                        }
                    });
                ui.add_space(4.0);
            }
            ui.separator();

            // ---- Period: trend or one cross-section ----
            ui.strong("Period");
            let periods: Vec<Period> = ds.dataset().periods().cloned().collect();
            egui::ComboBox::from_id_salt("period")
                .selected_text(period_text(&state.period))
                .show_ui(ui, |ui: &mut Ui| {
                    let mut choice = state.period.clone();
                    ui.selectable_value(&mut choice, PeriodChoice::Trend, "All periods");
                    ui.selectable_value(&mut choice, PeriodChoice::Latest, "Latest");
                    for p in &periods {
                        ui.selectable_value(&mut choice, PeriodChoice::At(p.clone()), p.to_string());
                    }
                    if choice != state.period {
                        state.set_period(choice);
                    }
                });
            ui.separator();

            // ---- Chart kind ----
            ui.strong("Chart");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut state.chart_kind, ChartKind::Line, "Line");
                ui.radio_value(&mut state.chart_kind, ChartKind::Area, "Area");
                ui.radio_value(&mut state.chart_kind, ChartKind::Bar, "Bar");
            });

            let skipped = ds.dimensions().skipped();
            if !skipped.is_empty() {
                ui.separator();
                ui.label(
                    RichText::new(format!("{} column(s) not decomposed", skipped.len()))
                        .small()
                        .weak(),
                )
                .on_hover_text(skipped.join(", "));
            }
        });
}

fn display_title(title: &str, id: &str) -> String {
    if title.is_empty() {
        id.to_string()
    } else {
        title.to_string()
    }
}

fn period_text(choice: &PeriodChoice) -> String {
    match choice {
        PeriodChoice::Trend => "All periods".to_string(),
        PeriodChoice::Latest => "Latest".to_string(),
        PeriodChoice::At(p) => p.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open catalog…").clicked() {
                open_catalog_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.active {
            let shown = state.chart.as_ref().map_or(0, |c| c.series.len());
            ui.label(format!(
                "{} periods, {} series columns, {} shown",
                ds.dataset().len(),
                ds.dimensions().column_count(),
                shown
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_catalog_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset catalog")
        .add_filter("Catalog", &["json"])
        .pick_file();

    if let Some(path) = file {
        match Catalog::load(&path) {
            Ok(catalog) => {
                log::info!(
                    "Opened catalog {} with {} dataset(s)",
                    path.display(),
                    catalog.datasets.len()
                );
                state.set_catalog(catalog);
            }
            Err(e) => {
                log::error!("Failed to open catalog: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
