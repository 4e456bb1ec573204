use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Palette;
use crate::data::dimension::{DecompositionRule, ValueOrder};
use crate::data::loader::ParseOptions;
use crate::error::ConfigError;
use crate::present::{DEFAULT_SEPARATOR, Presentation};

// ---------------------------------------------------------------------------
// Per-dataset configuration
// ---------------------------------------------------------------------------

/// Everything needed to parse, decompose and present one dataset.
///
/// ```json
/// {
///   "id": "bridge-conditions",
///   "title": "Bridge Conditions",
///   "source": "bridge_conditions.csv",
///   "period_column": "year",
///   "rule": { "kind": "delimited", "delimiter": "-", "dimensions": ["region", "ownership"] },
///   "aggregate": "Study Area",
///   "display_names": { "region": { "Study Area": "DVRPC Region" } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Cache key; unique within a catalog.
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Data file. Relative paths resolve against the catalog's directory.
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default = "default_period_column")]
    pub period_column: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    pub rule: DecompositionRule,
    /// Dimension names in label order. Empty means the rule's order.
    #[serde(default)]
    pub label_order: Vec<String>,
    #[serde(default = "default_separator")]
    pub label_separator: String,
    #[serde(default)]
    pub aggregate: Option<String>,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub value_order: ValueOrder,
    /// Legend and selector names, keyed by dimension then value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display_names: BTreeMap<String, BTreeMap<String, String>>,
}

fn default_period_column() -> String {
    "year".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl DatasetConfig {
    /// A config with defaults for everything but the id and rule.
    pub fn new(id: &str, rule: DecompositionRule) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            source: None,
            period_column: default_period_column(),
            delimiter: default_delimiter(),
            rule,
            label_order: Vec::new(),
            label_separator: default_separator(),
            aggregate: None,
            palette: Palette::default(),
            value_order: ValueOrder::default(),
            display_names: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rule.validate()?;
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }
        let dims = self.rule.dimensions();
        if let Some(unknown) = self.label_order.iter().find(|d| !dims.contains(&d.as_str())) {
            return Err(ConfigError::UnknownLabelDimension(unknown.clone()));
        }
        if let Some(unknown) = self.display_names.keys().find(|d| !dims.contains(&d.as_str())) {
            return Err(ConfigError::UnknownDisplayDimension(unknown.clone()));
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            period_column: self.period_column.clone(),
            // `validate` guarantees ASCII.
            delimiter: self.delimiter as u8,
        }
    }

    pub fn presentation(&self) -> Presentation {
        Presentation {
            palette: self.palette.clone(),
            label_order: self.label_order.clone(),
            separator: self.label_separator.clone(),
            aggregate: self.aggregate.clone(),
            display_names: self.display_names.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog – a JSON file listing datasets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub datasets: Vec<DatasetConfig>,
}

impl Catalog {
    /// Read and validate a catalog, resolving relative `source` paths
    /// against the catalog file's directory.
    pub fn load(path: &Path) -> Result<Catalog> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        let mut catalog = Catalog::from_json(&text)
            .with_context(|| format!("parsing catalog {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for ds in &mut catalog.datasets {
            ds.source = ds
                .source
                .take()
                .map(|src| if src.is_relative() { base.join(src) } else { src });
        }
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Catalog> {
        let catalog: Catalog = serde_json::from_str(text).context("invalid catalog JSON")?;
        for (i, ds) in catalog.datasets.iter().enumerate() {
            ds.validate()
                .with_context(|| format!("dataset #{i} ('{}')", ds.id))?;
            if catalog.datasets[..i].iter().any(|other| other.id == ds.id) {
                anyhow::bail!("dataset id '{}' appears more than once", ds.id);
            }
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.id == id)
    }
}
