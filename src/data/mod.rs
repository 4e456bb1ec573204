/// Data layer: core types, parsing, decomposition and querying.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse text → Dataset (rows by period, columns)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ dimension   │  column names → DimensionMap (value sets, coordinate index)
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  pivot    │  Filter (+ period) → ordered series
///   └──────────┘
/// ```

pub mod dimension;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pivot;
