use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Period, Row, Value};
use crate::error::ParseError;

/// How to read a delimited dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Header name of the period column (`year`, `Year`, ...).
    pub period_column: String,
    /// Single-byte field delimiter.
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            period_column: "year".to_string(),
            delimiter: b',',
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse already-fetched delimited text into a [`Dataset`].
///
/// Only a missing or empty header is an error. Rows whose period cell is
/// empty are skipped, unparsable cells become [`Value::Missing`], and short
/// rows are padded with `Missing`.
pub fn parse_dataset(text: &str, options: &ParseOptions) -> Result<Dataset, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(ParseError::UnreadableHeader)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        return Err(ParseError::MissingHeader);
    }
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::EmptyHeader);
    }

    let layout = ColumnLayout::new(&headers, &options.period_column);
    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping unreadable row {row_no}: {e}");
                continue;
            }
        };

        let Some(period) = layout
            .period_idx
            .and_then(|idx| record.get(idx))
            .and_then(Period::parse)
        else {
            log::debug!("Skipping row {row_no}: empty period");
            continue;
        };

        let values = layout
            .value_columns
            .iter()
            .map(|(idx, name)| (name.clone(), Value::parse(record.get(*idx).unwrap_or(""))))
            .collect();

        rows.push(Row { period, values });
    }

    Ok(layout.into_dataset(rows))
}

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text with a header row
/// * `.tsv`          – as above, tab-delimited unless configured otherwise
/// * `.json`         – `[{ "year": 2020, "North-State": 0.2, ... }, ...]`
/// * `.parquet`      – one row per period, numeric (or numeric text) columns
pub fn load_file(path: &Path, options: &ParseOptions) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => load_text(path, options)?,
        "tsv" => {
            let mut opts = options.clone();
            if opts.delimiter == b',' {
                opts.delimiter = b'\t';
            }
            load_text(path, &opts)?
        }
        "json" => load_json(path, options)?,
        "parquet" | "pq" => load_parquet(path, options)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} periods x {} columns from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    Ok(dataset)
}

fn load_text(path: &Path, options: &ParseOptions) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_dataset(&text, options).with_context(|| format!("parsing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Column layout shared by every source format
// ---------------------------------------------------------------------------

/// Which header position holds the period, and which hold values.
struct ColumnLayout {
    period_column: String,
    period_idx: Option<usize>,
    value_columns: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn new(headers: &[String], wanted_period: &str) -> Self {
        let period_idx = find_period_column(headers, wanted_period);
        if period_idx.is_none() {
            log::warn!("Period column '{wanted_period}' not found in header {headers:?}");
        }

        let mut value_columns: Vec<(usize, String)> = Vec::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            if Some(idx) == period_idx {
                continue;
            }
            if name.is_empty() {
                log::debug!("Ignoring unnamed column at position {idx}");
                continue;
            }
            if value_columns.iter().any(|(_, seen)| seen == name) {
                log::warn!("Ignoring repeated column '{name}' at position {idx}");
                continue;
            }
            value_columns.push((idx, name.clone()));
        }

        ColumnLayout {
            period_column: period_idx
                .map(|idx| headers[idx].clone())
                .unwrap_or_else(|| wanted_period.to_string()),
            period_idx,
            value_columns,
        }
    }

    fn into_dataset(self, rows: Vec<Row>) -> Dataset {
        let columns = self.value_columns.into_iter().map(|(_, name)| name).collect();
        Dataset::from_rows(self.period_column, columns, rows)
    }
}

/// Exact header match first, then an ASCII case-insensitive one.
fn find_period_column(headers: &[String], wanted: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h == wanted)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(wanted)))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the shape a header-mode CSV parser emits:
///
/// ```json
/// [
///   { "year": 2019, "North-State": 0.21, "North-Local": "0.30" },
///   { "year": 2020, "North-State": null,  "North-Local": 0.28 }
/// ]
/// ```
///
/// Columns are the union of record keys in first-appearance order.
fn load_json(path: &Path, options: &ParseOptions) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_records(&text, options)
}

pub(crate) fn parse_json_records(text: &str, options: &ParseOptions) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for rec in records {
        let obj = rec.as_object().context("Expected every record to be a JSON object")?;
        for key in obj.keys() {
            let key = key.trim();
            if !headers.iter().any(|h| h == key) {
                headers.push(key.to_string());
            }
        }
    }
    if headers.is_empty() {
        return Err(ParseError::MissingHeader.into());
    }

    let layout = ColumnLayout::new(&headers, &options.period_column);
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let Some(obj) = rec.as_object() else {
            continue;
        };
        let field = |name: &str| obj.iter().find(|(k, _)| k.trim() == name).map(|(_, v)| v);

        let Some(period) = layout
            .period_idx
            .and_then(|idx| field(headers[idx].as_str()))
            .and_then(json_to_period)
        else {
            log::debug!("Skipping record {i}: empty period");
            continue;
        };

        let values: BTreeMap<String, Value> = layout
            .value_columns
            .iter()
            .map(|(_, name)| (name.clone(), field(name.as_str()).map(json_to_value).unwrap_or(Value::Missing)))
            .collect();

        rows.push(Row { period, values });
    }

    Ok(layout.into_dataset(rows))
}

fn json_to_period(val: &JsonValue) -> Option<Period> {
    match val {
        JsonValue::Number(n) => match n.as_i64() {
            Some(year) => Some(Period::Year(year)),
            None => Period::parse(&n.to_string()),
        },
        JsonValue::String(s) => Period::parse(s),
        _ => None,
    }
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::Number(n) => n.as_f64().map(Value::from_f64).unwrap_or(Value::Missing),
        JsonValue::String(s) => Value::parse(s),
        _ => Value::Missing,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a wide Parquet table: one row per period, one column per series.
///
/// The period column may be integer or text. Value columns of any type
/// castable to `Float64` are accepted; cells that fail the cast (for text
/// columns) come back null and become `Missing`.
fn load_parquet(path: &Path, options: &ParseOptions) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(ParseError::MissingHeader.into());
    }

    let layout = ColumnLayout::new(&headers, &options.period_column);
    let reader = builder.build().context("building parquet reader")?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let periods: Vec<Option<Period>> = match layout.period_idx {
            Some(idx) => periods_from_array(batch.column(idx))
                .with_context(|| format!("reading period column '{}'", headers[idx]))?,
            None => vec![None; batch.num_rows()],
        };

        let columns: Vec<(String, Vec<Value>)> = layout
            .value_columns
            .iter()
            .map(|(idx, name)| (name.clone(), values_from_array(batch.column(*idx), name)))
            .collect();

        for (row, period) in periods.into_iter().enumerate() {
            let Some(period) = period else {
                continue;
            };
            let values = columns
                .iter()
                .map(|(name, vals)| (name.clone(), vals[row]))
                .collect();
            rows.push(Row { period, values });
        }
    }

    Ok(layout.into_dataset(rows))
}

// -- Arrow helpers --

fn periods_from_array(col: &Arc<dyn Array>) -> Result<Vec<Option<Period>>> {
    let text = cast(col, &DataType::Utf8).context("casting period column to text")?;
    let text = text.as_string::<i32>();
    Ok((0..text.len())
        .map(|row| {
            if text.is_null(row) {
                None
            } else {
                Period::parse(text.value(row))
            }
        })
        .collect())
}

fn values_from_array(col: &Arc<dyn Array>, name: &str) -> Vec<Value> {
    let numbers = match cast(col, &DataType::Float64) {
        Ok(arr) => arr,
        Err(e) => {
            log::warn!("Column '{name}' is not numeric ({e}); treating it as missing");
            return vec![Value::Missing; col.len()];
        }
    };
    numbers
        .as_primitive::<Float64Type>()
        .iter()
        .map(|v| v.map(Value::from_f64).unwrap_or(Value::Missing))
        .collect()
}
