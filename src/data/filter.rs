use std::collections::BTreeMap;
use std::fmt;

use super::dimension::DimensionMap;

/// The query-time pseudo-value that selects every value of a dimension.
/// It is never part of a dimension's enumerated values.
pub const WILDCARD: &str = "All";

static ALL: Selection = Selection::All;

// ---------------------------------------------------------------------------
// Selection – one dimension's constraint
// ---------------------------------------------------------------------------

/// What a filter asks of a single dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selection {
    /// Every enumerated value (the `"All"` wildcard).
    All,
    /// Exactly this value.
    Value(String),
}

impl Selection {
    /// `"All"` becomes the wildcard, anything else a concrete value.
    pub fn parse(raw: &str) -> Selection {
        if raw == WILDCARD {
            Selection::All
        } else {
            Selection::Value(raw.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Value(v) => Some(v),
        }
    }
}

impl From<&str> for Selection {
    fn from(raw: &str) -> Self {
        Selection::parse(raw)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{WILDCARD}"),
            Selection::Value(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter – a selection per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selections. A dimension with no entry is unconstrained,
/// exactly as if it were set to the wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    selections: BTreeMap<String, Selection>,
}

impl Filter {
    /// An empty filter: every dimension wildcarded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, dimension: &str, selection: impl Into<Selection>) -> Self {
        self.set(dimension, selection);
        self
    }

    pub fn set(&mut self, dimension: &str, selection: impl Into<Selection>) {
        self.selections.insert(dimension.to_string(), selection.into());
    }

    /// The selection for `dimension`; unconstrained dimensions read as `All`.
    pub fn get(&self, dimension: &str) -> &Selection {
        self.selections.get(dimension).unwrap_or(&ALL)
    }

    /// Explicit entries, in dimension-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.selections.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: AsRef<str>, V: Into<Selection>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (k, v) in iter {
            filter.set(k.as_ref(), v);
        }
        filter
    }
}

/// A filter that names every dimension of `dimensions` with the wildcard,
/// i.e. shows everything.
pub fn init_filter(dimensions: &DimensionMap) -> Filter {
    dimensions
        .dimension_names()
        .map(|name| (name, Selection::All))
        .collect()
}
