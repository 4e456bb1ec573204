//! Shared fixtures for integration tests.

#![allow(dead_code)]

use rusty_pivot::{DatasetConfig, DecompositionRule, PivotDataset};

/// A small bridge-conditions table: sparse combinations, an aggregate
/// region, a gap, a non-numeric cell, and a trailing blank row.
pub const BRIDGES_CSV: &str = "\
year,Study Area-State,Study Area-Local,North-State,North-Local,South-State,East-Local,notes
2018,0.10,0.12,0.08,0.15,0.11,0.05,a
2019,0.09,0.11,,0.14,0.10,n/a,b
2020,0.08,0.10,0.07,0.13,0.09,0.04,c
,
";

/// Commute mode shares with purpose prefixes.
pub const COMMUTE_CSV: &str = "\
Year,hwsov,hwwalk,chsov,chwalk,hwunknown
2015,0.80,0.03,0.70,0.05,1
2016,0.78,0.04,0.69,0.06,1
";

pub fn delimited(dimensions: &[&str]) -> DecompositionRule {
    DecompositionRule::Delimited {
        delimiter: "-".to_string(),
        dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
    }
}

pub fn bridge_config() -> DatasetConfig {
    let mut cfg = DatasetConfig::new("bridges", delimited(&["region", "ownership"]));
    cfg.aggregate = Some("Study Area".to_string());
    cfg
}

pub fn commute_config() -> DatasetConfig {
    let mut cfg = DatasetConfig::new(
        "commute",
        DecompositionRule::Prefixed {
            prefix_len: 2,
            prefixes: Vec::new(),
            prefix_dimension: "purpose".to_string(),
            suffix_dimension: "mode".to_string(),
            vocabulary: vec!["sov".to_string(), "walk".to_string()],
        },
    );
    cfg.period_column = "Year".to_string();
    cfg.label_order = vec!["mode".to_string(), "purpose".to_string()];
    cfg
}

pub fn bridges() -> PivotDataset {
    PivotDataset::from_text(bridge_config(), BRIDGES_CSV).expect("bridge fixture parses")
}

pub fn commute() -> PivotDataset {
    PivotDataset::from_text(commute_config(), COMMUTE_CSV).expect("commute fixture parses")
}

/// A scratch directory removed when the returned guard is dropped.
pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create scratch dir")
}
