//! Pivot and selection engine for wide-format indicator datasets.
//!
//! A dataset has one row per period and one column per combination of
//! dimension values (`North-State`, `hwsov`, ...). The crate parses such
//! tables, decomposes the column names into dimensions, answers filter
//! queries with wildcard expansion, and assigns stable colours and labels
//! to the resulting series for a chart renderer.

pub mod cache;
pub mod color;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod present;

pub use cache::{DATASETS, DatasetCache};
pub use config::{Catalog, DatasetConfig};
pub use data::dimension::{DecompositionRule, DimensionMap, ValueOrder};
pub use data::filter::{Filter, Selection, WILDCARD};
pub use data::loader::{ParseOptions, parse_dataset};
pub use data::model::{Dataset, Period, Row, Value};
pub use data::pivot::{PivotResult, QueryStatus, SeriesKey};
pub use engine::PivotDataset;
pub use error::{ConfigError, DatasetError, ParseError};
pub use present::{ChartData, ChartSeries, Presentation};
