use anyhow::{Context, Result};

use crate::config::DatasetConfig;
use crate::data::dimension::DimensionMap;
use crate::data::filter::Filter;
use crate::data::loader::{self, parse_dataset};
use crate::data::model::{Dataset, Period};
use crate::data::pivot::{self, PivotResult, Slice};
use crate::error::DatasetError;
use crate::present::{ChartData, Presentation, present};

// ---------------------------------------------------------------------------
// PivotDataset – a parsed, decomposed, queryable dataset
// ---------------------------------------------------------------------------

/// A dataset ready for queries. Built once per load and never mutated, so
/// it can be shared freely between readers.
#[derive(Debug, Clone)]
pub struct PivotDataset {
    config: DatasetConfig,
    dataset: Dataset,
    dimensions: DimensionMap,
    presentation: Presentation,
}

impl PivotDataset {
    /// Decompose an already-parsed dataset under `config`.
    pub fn new(config: DatasetConfig, dataset: Dataset) -> Result<Self, DatasetError> {
        config.validate()?;
        let dimensions = DimensionMap::build(
            &dataset.columns,
            &config.rule,
            config.value_order,
            config.aggregate.as_deref(),
        );

        if !dimensions.skipped().is_empty() {
            log::debug!(
                "[{}] {} column(s) outside the decomposition rule: {:?}",
                config.id,
                dimensions.skipped().len(),
                dimensions.skipped()
            );
        }
        log::info!(
            "[{}] {} periods, {} series columns, dimensions {:?}",
            config.id,
            dataset.len(),
            dimensions.column_count(),
            dimensions.dimension_names().collect::<Vec<_>>()
        );

        Ok(Self {
            presentation: config.presentation(),
            config,
            dataset,
            dimensions,
        })
    }

    /// Parse raw delimited text and decompose it.
    pub fn from_text(config: DatasetConfig, text: &str) -> Result<Self, DatasetError> {
        config.validate()?;
        let dataset = parse_dataset(text, &config.parse_options())?;
        Self::new(config, dataset)
    }

    /// Read the configured `source` file and decompose it.
    pub fn load(config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        let source = config
            .source
            .clone()
            .with_context(|| format!("dataset '{}' has no source file", config.id))?;
        let dataset = loader::load_file(&source, &config.parse_options())
            .with_context(|| format!("loading dataset '{}'", config.id))?;
        Ok(Self::new(config, dataset)?)
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn dimensions(&self) -> &DimensionMap {
        &self.dimensions
    }

    /// Ordered values for a filter control, without the wildcard.
    pub fn available_values(&self, dimension: &str) -> Option<&[String]> {
        self.dimensions.values(dimension)
    }

    /// The configured display name of a dimension value, or the value itself.
    pub fn display_value<'a>(&'a self, dimension: &str, value: &'a str) -> &'a str {
        self.presentation.display_value(dimension, value)
    }

    /// Trend mode when `target_period` is `None`, cross-sectional otherwise.
    pub fn pivot(&self, filter: &Filter, target_period: Option<&Period>) -> PivotResult {
        pivot::resolve(&self.dataset, &self.dimensions, filter, target_period)
    }

    /// Resolve and present: the chart-ready series for a filter.
    pub fn resolve(&self, filter: &Filter, target_period: Option<&Period>) -> ChartData {
        present(&self.pivot(filter, target_period), &self.presentation)
    }

    /// Distribution slices for a single period, largest first.
    pub fn breakdown(&self, filter: &Filter, period: &Period) -> Vec<Slice> {
        pivot::breakdown(&self.pivot(filter, Some(period)))
    }
}
