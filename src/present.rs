//! Series presentation: positional colours and display labels.
//!
//! Everything here is a pure function of the pivot result and the dataset's
//! presentation settings, so the same query always renders the same way.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::color::Palette;
use crate::data::model::Period;
use crate::data::pivot::{Point, PivotResult, QueryStatus, Series, SeriesKey};

pub const DEFAULT_SEPARATOR: &str = " - ";

/// Per-dataset presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub palette: Palette,
    /// Dimension names in label order. Dimensions it leaves out follow in
    /// coordinate order.
    pub label_order: Vec<String>,
    pub separator: String,
    /// Rollup value suppressed in composite labels.
    pub aggregate: Option<String>,
    /// Readable names per dimension value, e.g. `purpose.hw = "Home to Work"`.
    pub display_names: BTreeMap<String, BTreeMap<String, String>>,
}

impl Presentation {
    /// The display name of `value` in `dimension`, or the value itself.
    pub fn display_value<'a>(&'a self, dimension: &str, value: &'a str) -> &'a str {
        self.display_names
            .get(dimension)
            .and_then(|names| names.get(value))
            .map_or(value, String::as_str)
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            label_order: Vec::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
            aggregate: None,
            display_names: BTreeMap::new(),
        }
    }
}

/// A chart-ready series: the contract handed to the rendering side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub key: SeriesKey,
    pub label: String,
    pub color: String,
    pub points: Vec<Point>,
}

/// Ordered chart series plus the query status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub status: QueryStatus,
    pub period: Option<Period>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Assign colour and label to every series of `result`, in order.
pub fn present(result: &PivotResult, presentation: &Presentation) -> ChartData {
    let label_positions = label_positions(result, presentation);

    let series = result
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| ChartSeries {
            key: s.key.clone(),
            label: label_for(s, &result.dimensions, &label_positions, presentation),
            color: presentation.palette.color_at(i).to_string(),
            points: s.points.clone(),
        })
        .collect();

    ChartData {
        status: result.status,
        period: result.target_period.clone(),
        series,
    }
}

/// Coordinate positions that make up a label, in label order.
///
/// Only the wildcarded dimensions distinguish the series of a result, so
/// those are the ones shown; a fully concrete query shows every dimension.
fn label_positions(result: &PivotResult, presentation: &Presentation) -> Vec<usize> {
    let mut ordered: Vec<usize> = presentation
        .label_order
        .iter()
        .filter_map(|name| result.dimensions.iter().position(|d| d == name))
        .collect();
    for pos in 0..result.dimensions.len() {
        if !ordered.contains(&pos) {
            ordered.push(pos);
        }
    }

    if result.varying.is_empty() {
        ordered
    } else {
        ordered
            .into_iter()
            .filter(|pos| result.varying.contains(pos))
            .collect()
    }
}

fn label_for(
    series: &Series,
    dimensions: &[String],
    positions: &[usize],
    presentation: &Presentation,
) -> String {
    let parts: Vec<(&str, &str)> = positions
        .iter()
        .filter_map(|&pos| Some((dimensions.get(pos)?.as_str(), series.coordinate.get(pos)?.as_str())))
        .collect();
    let Some(aggregate) = presentation.aggregate.as_deref() else {
        return join_or_column(&display(&parts, presentation), series, &presentation.separator);
    };

    let (rollup, kept): (Vec<_>, Vec<_>) =
        parts.iter().copied().partition(|(_, value)| *value == aggregate);
    match (rollup.first(), kept.is_empty()) {
        (Some(&(dim, value)), true) => presentation.display_value(dim, value).to_string(),
        _ => join_or_column(&display(&kept, presentation), series, &presentation.separator),
    }
}

fn display<'a>(parts: &[(&'a str, &'a str)], presentation: &'a Presentation) -> Vec<&'a str> {
    parts
        .iter()
        .map(|&(dim, value)| presentation.display_value(dim, value))
        .collect()
}

fn join_or_column(parts: &[&str], series: &Series, separator: &str) -> String {
    if parts.is_empty() {
        series.column.clone()
    } else {
        parts.join(separator)
    }
}
