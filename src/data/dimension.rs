use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::filter::WILDCARD;
use crate::error::ConfigError;

/// A resolved position in dimension space: one value per dimension, in the
/// rule's dimension order.
pub type Coordinate = Vec<String>;

// ---------------------------------------------------------------------------
// DecompositionRule – how a composite column name encodes its dimensions
// ---------------------------------------------------------------------------

/// Per-dataset rule for splitting composite column names.
///
/// ```json
/// { "kind": "delimited", "delimiter": "-", "dimensions": ["region", "ownership"] }
/// { "kind": "prefixed", "prefix_len": 2, "prefixes": ["din", "che"],
///   "prefix_dimension": "purpose", "suffix_dimension": "mode",
///   "vocabulary": ["sov", "walk", "bike"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecompositionRule {
    /// `North-State`: exactly one part per dimension, split on `delimiter`.
    /// Parts are trimmed, so `North - State` decomposes the same way.
    Delimited {
        delimiter: String,
        dimensions: Vec<String>,
    },
    /// `hwsov`: the prefix dimension, then a word of `vocabulary`.
    ///
    /// The longest entry of `prefixes` that leaves a vocabulary word wins,
    /// so `chesov` splits as `che` + `sov` next to `chsov`. Columns with no
    /// known prefix fall back to the first `prefix_len` characters.
    Prefixed {
        prefix_len: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        prefixes: Vec<String>,
        prefix_dimension: String,
        suffix_dimension: String,
        vocabulary: Vec<String>,
    },
}

impl DecompositionRule {
    /// Dimension names in coordinate order.
    pub fn dimensions(&self) -> Vec<&str> {
        match self {
            DecompositionRule::Delimited { dimensions, .. } => {
                dimensions.iter().map(String::as_str).collect()
            }
            DecompositionRule::Prefixed {
                prefix_dimension,
                suffix_dimension,
                ..
            } => vec![prefix_dimension.as_str(), suffix_dimension.as_str()],
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            DecompositionRule::Delimited {
                delimiter,
                dimensions,
            } => {
                if dimensions.is_empty() {
                    return Err(ConfigError::NoDimensions);
                }
                if delimiter.is_empty() && dimensions.len() > 1 {
                    return Err(ConfigError::EmptyDelimiter);
                }
            }
            DecompositionRule::Prefixed {
                prefix_len,
                prefixes,
                vocabulary,
                ..
            } => {
                if *prefix_len == 0 {
                    return Err(ConfigError::ZeroPrefixLength);
                }
                if prefixes.iter().any(|p| p.is_empty()) {
                    return Err(ConfigError::EmptyPrefix);
                }
                if vocabulary.is_empty() {
                    return Err(ConfigError::EmptyVocabulary);
                }
            }
        }

        let names = self.dimensions();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ConfigError::DuplicateDimension(name.to_string()));
            }
        }
        Ok(())
    }

    /// Split a column name into its coordinate, or `None` when the name does
    /// not fit the rule.
    pub fn decompose(&self, column: &str) -> Option<Coordinate> {
        match self {
            DecompositionRule::Delimited {
                delimiter,
                dimensions,
            } => {
                let parts: Vec<String> = if dimensions.len() == 1 {
                    vec![column.trim().to_string()]
                } else {
                    column.split(delimiter.as_str()).map(|p| p.trim().to_string()).collect()
                };
                if parts.len() != dimensions.len() || parts.iter().any(|p| p.is_empty()) {
                    return None;
                }
                Some(parts)
            }
            DecompositionRule::Prefixed {
                prefix_len,
                prefixes,
                vocabulary,
                ..
            } => {
                let is_word = |suffix: &str| vocabulary.iter().any(|word| word == suffix);
                let known = prefixes
                    .iter()
                    .filter(|p| column.starts_with(p.as_str()) && is_word(&column[p.len()..]))
                    .max_by_key(|p| p.len());
                if let Some(prefix) = known {
                    return Some(vec![prefix.clone(), column[prefix.len()..].to_string()]);
                }

                let (split, _) = column.char_indices().nth(*prefix_len)?;
                let (prefix, suffix) = column.split_at(split);
                if !is_word(suffix) {
                    return None;
                }
                Some(vec![prefix.to_string(), suffix.to_string()])
            }
        }
    }

    /// The inverse of [`decompose`](Self::decompose): the canonical column
    /// name for a coordinate. `None` when the coordinate cannot be encoded.
    pub fn compose(&self, coordinate: &[String]) -> Option<String> {
        match self {
            DecompositionRule::Delimited {
                delimiter,
                dimensions,
            } => {
                if coordinate.len() != dimensions.len() {
                    return None;
                }
                Some(coordinate.join(delimiter.as_str()))
            }
            DecompositionRule::Prefixed {
                prefix_len,
                prefixes,
                vocabulary,
                ..
            } => match coordinate {
                [prefix, suffix]
                    if vocabulary.contains(suffix)
                        && (prefixes.contains(prefix) || prefix.chars().count() == *prefix_len) =>
                {
                    Some(format!("{prefix}{suffix}"))
                }
                _ => None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// DimensionMap – the value sets observed across all columns
// ---------------------------------------------------------------------------

/// Enumeration order for a dimension's values. The aggregate value, when
/// configured and present, is always first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrder {
    /// Byte-wise lexicographic, independent of column order and locale.
    #[default]
    Lexicographic,
    /// Order of first appearance among the columns.
    FirstAppearance,
}

/// One dimension and its ordered value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub values: Vec<String>,
}

/// All dimensions of a dataset plus the coordinate → column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMap {
    dimensions: Vec<Dimension>,
    columns: BTreeMap<Coordinate, String>,
    skipped: Vec<String>,
    duplicates: Vec<String>,
}

impl DimensionMap {
    /// Decompose every column under `rule`.
    ///
    /// Columns that do not fit the rule, or that use the wildcard as a
    /// literal component, are left out and recorded in [`skipped`](Self::skipped).
    /// A second column landing on an already-claimed coordinate is recorded
    /// in [`duplicates`](Self::duplicates).
    pub fn build(
        columns: &[String],
        rule: &DecompositionRule,
        order: ValueOrder,
        aggregate: Option<&str>,
    ) -> Self {
        let mut dimensions: Vec<Dimension> = rule
            .dimensions()
            .into_iter()
            .map(|name| Dimension {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect();
        let mut index: BTreeMap<Coordinate, String> = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut duplicates = Vec::new();

        for column in columns {
            let Some(coordinate) = rule.decompose(column) else {
                log::debug!("Column '{column}' does not fit the decomposition rule; skipped");
                skipped.push(column.clone());
                continue;
            };
            if coordinate.iter().any(|part| part == WILDCARD) {
                log::warn!("Column '{column}' uses the reserved value '{WILDCARD}'; skipped");
                skipped.push(column.clone());
                continue;
            }
            if let Some(first) = index.get(&coordinate) {
                log::warn!("Column '{column}' repeats the coordinate of '{first}'; skipped");
                duplicates.push(column.clone());
                continue;
            }

            for (dim, part) in dimensions.iter_mut().zip(&coordinate) {
                if !dim.values.contains(part) {
                    dim.values.push(part.clone());
                }
            }
            index.insert(coordinate, column.clone());
        }

        for dim in &mut dimensions {
            order_values(&mut dim.values, order, aggregate);
        }

        DimensionMap {
            dimensions,
            columns: index,
            skipped,
            duplicates,
        }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().map(|d| d.name.as_str())
    }

    /// Position of `name` in coordinate order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    /// Ordered values of a dimension. Never contains the wildcard.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.values.as_slice())
    }

    /// The source column holding `coordinate`, if the dataset has one.
    pub fn column(&self, coordinate: &[String]) -> Option<&str> {
        self.columns.get(coordinate).map(String::as_str)
    }

    /// Number of columns that decomposed successfully.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Columns excluded because they did not fit the rule.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Columns excluded because an earlier column had the same coordinate.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }
}

fn order_values(values: &mut Vec<String>, order: ValueOrder, aggregate: Option<&str>) {
    if order == ValueOrder::Lexicographic {
        values.sort();
    }
    if let Some(agg) = aggregate {
        if let Some(pos) = values.iter().position(|v| v == agg) {
            let v = values.remove(pos);
            values.insert(0, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_ownership() -> DecompositionRule {
        DecompositionRule::Delimited {
            delimiter: "-".to_string(),
            dimensions: vec!["region".to_string(), "ownership".to_string()],
        }
    }

    fn purpose_mode() -> DecompositionRule {
        DecompositionRule::Prefixed {
            prefix_len: 2,
            prefixes: vec!["din".to_string(), "che".to_string()],
            prefix_dimension: "purpose".to_string(),
            suffix_dimension: "mode".to_string(),
            vocabulary: vec!["sov".to_string(), "walk".to_string(), "wfh".to_string()],
        }
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn delimited_split_trims_and_requires_exact_arity() {
        let rule = region_ownership();
        assert_eq!(
            rule.decompose("North- State"),
            Some(vec!["North".to_string(), "State".to_string()])
        );
        assert_eq!(rule.decompose("North"), None);
        assert_eq!(rule.decompose("North-State-Extra"), None);
        assert_eq!(rule.decompose("-State"), None);
    }

    #[test]
    fn prefixed_split_uses_vocabulary() {
        let rule = purpose_mode();
        assert_eq!(
            rule.decompose("hwsov"),
            Some(vec!["hw".to_string(), "sov".to_string()])
        );
        assert_eq!(rule.decompose("hwtaxi"), None);
        assert_eq!(rule.decompose("hw"), None);
        assert_eq!(rule.compose(&["pe".to_string(), "walk".to_string()]).as_deref(), Some("pewalk"));
        assert_eq!(rule.compose(&["pex".to_string(), "walk".to_string()]), None);
    }

    #[test]
    fn known_prefixes_allow_mixed_lengths() {
        let rule = purpose_mode();
        let split = |c: &str| rule.decompose(c).map(|v| v.join("+"));
        assert_eq!(split("dinsov").as_deref(), Some("din+sov"));
        assert_eq!(split("chewalk").as_deref(), Some("che+walk"));
        // No known prefix: the fixed length still applies.
        assert_eq!(split("chsov").as_deref(), Some("ch+sov"));
        assert_eq!(split("dinner"), None);
        assert_eq!(
            rule.compose(&["din".to_string(), "wfh".to_string()]).as_deref(),
            Some("dinwfh")
        );
    }

    #[test]
    fn validate_rejects_bad_rules() {
        let rule = DecompositionRule::Delimited {
            delimiter: "-".to_string(),
            dimensions: vec![],
        };
        assert_eq!(rule.validate(), Err(ConfigError::NoDimensions));

        let rule = DecompositionRule::Delimited {
            delimiter: "-".to_string(),
            dimensions: vec!["a".to_string(), "a".to_string()],
        };
        assert_eq!(rule.validate(), Err(ConfigError::DuplicateDimension("a".to_string())));

        let rule = DecompositionRule::Prefixed {
            prefix_len: 0,
            prefixes: vec![],
            prefix_dimension: "p".to_string(),
            suffix_dimension: "s".to_string(),
            vocabulary: vec!["x".to_string()],
        };
        assert_eq!(rule.validate(), Err(ConfigError::ZeroPrefixLength));

        let rule = DecompositionRule::Prefixed {
            prefix_len: 2,
            prefixes: vec![String::new()],
            prefix_dimension: "p".to_string(),
            suffix_dimension: "s".to_string(),
            vocabulary: vec!["x".to_string()],
        };
        assert_eq!(rule.validate(), Err(ConfigError::EmptyPrefix));
        assert_eq!(purpose_mode().validate(), Ok(()));
    }

    #[test]
    fn aggregate_first_then_lexicographic() {
        let map = DimensionMap::build(
            &cols(&["South-State", "Study Area-State", "North-Local", "North-State"]),
            &region_ownership(),
            ValueOrder::Lexicographic,
            Some("Study Area"),
        );
        assert_eq!(
            map.values("region").unwrap(),
            &["Study Area", "North", "South"]
        );
        assert_eq!(map.values("ownership").unwrap(), &["Local", "State"]);
    }

    #[test]
    fn first_appearance_order_is_available() {
        let map = DimensionMap::build(
            &cols(&["South-State", "North-Local", "North-State"]),
            &region_ownership(),
            ValueOrder::FirstAppearance,
            None,
        );
        assert_eq!(map.values("region").unwrap(), &["South", "North"]);
        assert_eq!(map.values("ownership").unwrap(), &["State", "Local"]);
    }

    #[test]
    fn non_conforming_and_wildcard_columns_are_skipped() {
        let map = DimensionMap::build(
            &cols(&["North-State", "notes", "All-State", "North - State"]),
            &region_ownership(),
            ValueOrder::Lexicographic,
            None,
        );
        assert_eq!(map.skipped(), &["notes", "All-State"]);
        assert_eq!(map.duplicates(), &["North - State"]);
        assert_eq!(map.column_count(), 1);
        assert_eq!(map.values("region").unwrap(), &["North"]);
        assert_eq!(
            map.column(&["North".to_string(), "State".to_string()]),
            Some("North-State")
        );
    }
}
