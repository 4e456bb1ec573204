use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Period – the row key of a wide dataset
// ---------------------------------------------------------------------------

/// The observation period of a row, typically a year.
///
/// Integer-looking keys become `Year` so they sort numerically; anything
/// else is kept verbatim as a `Label`. All years order before all labels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Period {
    Year(i64),
    Label(String),
}

impl Period {
    /// Parse a raw period cell. Returns `None` for an empty cell.
    pub fn parse(raw: &str) -> Option<Period> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        match s.parse::<i64>() {
            Ok(year) => Some(Period::Year(year)),
            Err(_) => Some(Period::Label(s.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year(y) => write!(f, "{y}"),
            Period::Label(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Value – a single numeric cell
// ---------------------------------------------------------------------------

/// A numeric observation or an explicit gap.
///
/// `Missing` serializes as `null`; chart consumers draw it as a break in the
/// line, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Missing,
}

impl Value {
    /// Permissive numeric parse: surrounding whitespace is ignored and
    /// anything that is not a finite number becomes `Missing`.
    pub fn parse(raw: &str) -> Value {
        match raw.trim().parse::<f64>() {
            Ok(v) => Value::from_f64(v),
            Err(_) => Value::Missing,
        }
    }

    pub fn from_f64(v: f64) -> Value {
        if v.is_finite() {
            Value::Number(v)
        } else {
            Value::Missing
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one period of the wide table
// ---------------------------------------------------------------------------

/// One observation period: the period key and every value column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub period: Period,
    /// column_name → value. Columns absent from a ragged row are `Missing`.
    pub values: BTreeMap<String, Value>,
}

impl Row {
    /// Value of `column`, `Missing` when the row does not carry it.
    pub fn get(&self, column: &str) -> Value {
        self.values.get(column).copied().unwrap_or(Value::Missing)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete parsed table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Header name of the period column as it appeared in the source.
    pub period_column: String,
    /// Value column names in header order (excludes the period column).
    pub columns: Vec<String>,
    /// Rows sorted by ascending, unique period.
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Sort rows by period and drop repeated periods, keeping the first
    /// occurrence in source order.
    pub fn from_rows(period_column: String, columns: Vec<String>, mut rows: Vec<Row>) -> Self {
        rows.sort_by(|a, b| a.period.cmp(&b.period));

        let mut seen: HashSet<Period> = HashSet::with_capacity(rows.len());
        rows.retain(|row| {
            let fresh = seen.insert(row.period.clone());
            if !fresh {
                log::warn!("Dropping repeated period {}", row.period);
            }
            fresh
        });

        Dataset {
            period_column,
            columns,
            rows,
        }
    }

    /// Number of rows (periods).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// All periods, ascending.
    pub fn periods(&self) -> impl Iterator<Item = &Period> {
        self.rows.iter().map(|r| &r.period)
    }

    /// The most recent period, if any rows exist.
    pub fn latest_period(&self) -> Option<&Period> {
        self.rows.last().map(|r| &r.period)
    }

    /// The row for `period`, by binary search over the sorted rows.
    pub fn row(&self, period: &Period) -> Option<&Row> {
        self.rows
            .binary_search_by(|r| r.period.cmp(period))
            .ok()
            .map(|idx| &self.rows[idx])
    }
}
