use std::sync::Arc;

use rusty_pivot::data::filter::init_filter;
use rusty_pivot::data::pivot::Slice;
use rusty_pivot::{Catalog, ChartData, DATASETS, Filter, Period, PivotDataset, QueryStatus, Selection};

// ---------------------------------------------------------------------------
// Viewer choices
// ---------------------------------------------------------------------------

/// Which rows a query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodChoice {
    /// Every period (time series).
    Trend,
    /// The most recent period of the active dataset.
    Latest,
    /// One named period (cross-section).
    At(Period),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Area,
    Bar,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded catalog (None until the user opens one).
    pub catalog: Option<Catalog>,

    /// Dataset currently shown, shared with the process-wide cache.
    pub active: Option<Arc<PivotDataset>>,

    /// Per-dimension selections.
    pub filter: Filter,

    pub period: PeriodChoice,

    pub chart_kind: ChartKind,

    /// Series for the current filter, recomputed on every change.
    pub chart: Option<ChartData>,

    /// Distribution slices when a single period is selected.
    pub breakdown: Vec<Slice>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            catalog: None,
            active: None,
            filter: Filter::default(),
            period: PeriodChoice::Trend,
            chart_kind: ChartKind::Line,
            chart: None,
            breakdown: Vec::new(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded catalog and show its first dataset.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        let first = catalog.datasets.first().map(|d| d.id.clone());
        self.catalog = Some(catalog);
        self.active = None;
        self.chart = None;
        self.status_message = None;
        if let Some(id) = first {
            self.select_dataset(&id);
        }
    }

    /// Switch to dataset `id`, loading it through the shared cache.
    pub fn select_dataset(&mut self, id: &str) {
        let Some(config) = self.catalog.as_ref().and_then(|c| c.get(id)) else {
            self.status_message = Some(format!("Unknown dataset '{id}'"));
            return;
        };

        match DATASETS.get_or_load(config) {
            Ok(dataset) => {
                self.filter = init_filter(dataset.dimensions());
                self.period = PeriodChoice::Trend;
                self.active = Some(dataset);
                self.status_message = None;
                self.requery();
            }
            Err(e) => {
                log::error!("Failed to load dataset '{id}': {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn set_selection(&mut self, dimension: &str, selection: Selection) {
        self.filter.set(dimension, selection);
        self.requery();
    }

    pub fn set_period(&mut self, period: PeriodChoice) {
        self.period = period;
        self.requery();
    }

    /// The concrete period the current choice points at, if any.
    pub fn target_period(&self) -> Option<Period> {
        match &self.period {
            PeriodChoice::Trend => None,
            PeriodChoice::Latest => self
                .active
                .as_ref()
                .and_then(|ds| ds.dataset().latest_period().cloned()),
            PeriodChoice::At(p) => Some(p.clone()),
        }
    }

    /// Recompute the chart after a filter or period change.
    pub fn requery(&mut self) {
        let Some(ds) = &self.active else {
            return;
        };
        let target = self.target_period();
        let chart = ds.resolve(&self.filter, target.as_ref());

        self.breakdown = match &target {
            Some(period) if chart.status == QueryStatus::Ok => ds.breakdown(&self.filter, period),
            _ => Vec::new(),
        };
        self.status_message = match (&chart.status, &target) {
            (QueryStatus::PeriodNotFound, Some(p)) => Some(format!("No data for period {p}")),
            _ => None,
        };
        self.chart = Some(chart);
    }
}
