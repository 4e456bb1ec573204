use std::fmt;

use serde::Serialize;

use super::dimension::{Coordinate, DimensionMap};
use super::filter::{Filter, Selection};
use super::model::{Dataset, Period, Row, Value};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Deterministic identity of a resolved series, e.g.
/// `region=North|ownership=State`. Equal coordinates give equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SeriesKey(String);

impl SeriesKey {
    pub fn new<'a>(dimensions: impl IntoIterator<Item = &'a str>, coordinate: &[String]) -> Self {
        let parts: Vec<String> = dimensions
            .into_iter()
            .zip(coordinate)
            .map(|(dim, value)| format!("{dim}={value}"))
            .collect();
        SeriesKey(parts.join("|"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One (period, value) observation of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub period: Period,
    pub value: Value,
}

/// The data of one resolved column.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: SeriesKey,
    /// One value per dimension, in dimension order.
    pub coordinate: Coordinate,
    /// The source column the points were read from.
    pub column: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Ok,
    /// A cross-sectional query named a period the dataset does not have.
    PeriodNotFound,
}

/// Everything a query produced, in legend order.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotResult {
    pub status: QueryStatus,
    /// Dimension names in coordinate order.
    pub dimensions: Vec<String>,
    /// Coordinate positions that were wildcarded by the filter.
    pub varying: Vec<usize>,
    /// `Some` in cross-sectional mode.
    pub target_period: Option<Period>,
    pub series: Vec<Series>,
}

impl PivotResult {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Query engine
// ---------------------------------------------------------------------------

/// Resolve `filter` against a decomposed dataset.
///
/// * A concrete selection pins its dimension; a wildcard (or an absent
///   entry) expands to every enumerated value of that dimension.
/// * Combinations without a source column are omitted, so a fully
///   concrete filter yields at most one series.
/// * Expansion order is dimension order, outermost first, each dimension in
///   its [`DimensionMap`] enumeration order.
/// * With `target_period` each series is narrowed to that single row. An
///   unknown period yields no series and [`QueryStatus::PeriodNotFound`].
pub fn resolve(
    dataset: &Dataset,
    dimensions: &DimensionMap,
    filter: &Filter,
    target_period: Option<&Period>,
) -> PivotResult {
    let names: Vec<String> = dimensions.dimension_names().map(str::to_string).collect();

    for (dim, _) in filter.iter() {
        if dimensions.index_of(dim).is_none() {
            log::debug!("Ignoring filter on unknown dimension '{dim}'");
        }
    }

    let mut varying = Vec::new();
    let candidates: Vec<Vec<String>> = dimensions
        .dimensions()
        .iter()
        .enumerate()
        .map(|(idx, dim)| match filter.get(&dim.name) {
            Selection::All => {
                varying.push(idx);
                dim.values.clone()
            }
            Selection::Value(v) => vec![v.clone()],
        })
        .collect();

    let rows: &[Row] = match target_period {
        None => &dataset.rows,
        Some(period) => match dataset
            .rows
            .binary_search_by(|r| r.period.cmp(period))
        {
            Ok(idx) => &dataset.rows[idx..=idx],
            Err(_) => {
                log::debug!("Period {period} not in dataset");
                return PivotResult {
                    status: QueryStatus::PeriodNotFound,
                    dimensions: names,
                    varying,
                    target_period: Some(period.clone()),
                    series: Vec::new(),
                };
            }
        },
    };

    let series = cross_product(&candidates)
        .into_iter()
        .filter_map(|coordinate| {
            let column = dimensions.column(&coordinate)?.to_string();
            let points = rows
                .iter()
                .map(|row| Point {
                    period: row.period.clone(),
                    value: row.get(&column),
                })
                .collect();
            Some(Series {
                key: SeriesKey::new(names.iter().map(String::as_str), &coordinate),
                coordinate,
                column,
                points,
            })
        })
        .collect();

    PivotResult {
        status: QueryStatus::Ok,
        dimensions: names,
        varying,
        target_period: target_period.cloned(),
        series,
    }
}

/// Every combination of one value per candidate list, first list outermost.
fn cross_product(candidates: &[Vec<String>]) -> Vec<Coordinate> {
    candidates.iter().fold(vec![Vec::new()], |acc, values| {
        acc.into_iter()
            .flat_map(|prefix| {
                values.iter().map(move |v| {
                    let mut next = prefix.clone();
                    next.push(v.clone());
                    next
                })
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Distribution breakdown
// ---------------------------------------------------------------------------

/// One slice of a distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub key: SeriesKey,
    pub column: String,
    pub value: f64,
}

/// Distribution slices for a result: the last point of each series (its
/// only point in cross-sectional mode), without missing or non-positive
/// values, largest first. Equal values keep legend order.
pub fn breakdown(result: &PivotResult) -> Vec<Slice> {
    let mut slices: Vec<Slice> = result
        .series
        .iter()
        .filter_map(|s| {
            let value = s.points.last()?.value.as_f64()?;
            (value > 0.0).then(|| Slice {
                key: s.key.clone(),
                column: s.column.clone(),
                value,
            })
        })
        .collect();
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));
    slices
}
