use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_pivot::{Catalog, DatasetConfig, DecompositionRule, ValueOrder};
use serde_json::{Map, Value as JsonValue};

const YEARS: std::ops::RangeInclusive<i64> = 2010..=2023;

/// Trip purpose codes and their legend names. Codes are two or three letters.
const PURPOSES: [(&str, &str); 6] = [
    ("hw", "Home to Work"),
    ("ch", "Commute Home"),
    ("pe", "Personal Errands"),
    ("din", "Dining Out"),
    ("che", "Child Escort"),
    ("pg", "Pleasure Going"),
];

const MODES: [(&str, &str); 6] = [
    ("sov", "Drove Alone"),
    ("pool", "Carpool"),
    ("transit", "Transit"),
    ("walk", "Walk"),
    ("bike", "Bike"),
    ("wfh", "Worked from Home"),
];

fn names(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// A bounded random walk, one value per year.
fn random_walk(rng: &mut SimpleRng, start: f64, step: f64, lo: f64, hi: f64) -> Vec<f64> {
    let mut v = start;
    YEARS
        .map(|_| {
            v = (v + rng.range(-step, step)).clamp(lo, hi);
            (v * 1000.0).round() / 1000.0
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Bridge conditions: <Region>-<Ownership>, sparse, with gaps
// ---------------------------------------------------------------------------

fn bridge_config() -> DatasetConfig {
    let mut cfg = DatasetConfig::new(
        "bridge-conditions",
        DecompositionRule::Delimited {
            delimiter: "-".to_string(),
            dimensions: vec!["region".to_string(), "ownership".to_string()],
        },
    );
    cfg.title = "Bridge Conditions (share of deck area in poor condition)".to_string();
    cfg.source = Some(PathBuf::from("bridge_conditions.csv"));
    cfg.aggregate = Some("Study Area".to_string());
    cfg.label_order = vec!["region".to_string(), "ownership".to_string()];
    cfg.display_names.insert(
        "region".to_string(),
        names(&[("Study Area", "Study Area (all counties)")]),
    );
    cfg
}

/// Column names plus one value vector per column; `None` marks a gap.
fn bridge_columns(rng: &mut SimpleRng, rule: &DecompositionRule) -> Vec<(String, Vec<Option<f64>>)> {
    let regions = ["Study Area", "Bucks", "Chester", "Delaware", "Montgomery", "Mercer"];
    let ownerships = ["State", "Local", "Other"];

    let mut columns = Vec::new();
    for region in regions {
        for ownership in ownerships {
            // Not every county reports every ownership class.
            if region == "Mercer" && ownership == "Other" {
                continue;
            }
            let coordinate = [region.to_string(), ownership.to_string()];
            let Some(name) = rule.compose(&coordinate) else {
                continue;
            };
            let start = rng.range(0.03, 0.15);
            let values = random_walk(rng, start, 0.01, 0.0, 0.4)
                .into_iter()
                .map(|v| (rng.next_f64() > 0.05).then_some(v))
                .collect();
            columns.push((name, values));
        }
    }
    columns
}

fn write_csv(path: &Path, period_column: &str, columns: &[(String, Vec<Option<f64>>)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![period_column.to_string()];
    header.extend(columns.iter().map(|(name, _)| name.clone()));
    writer.write_record(&header)?;

    for (row, year) in YEARS.enumerate() {
        let mut record = vec![year.to_string()];
        record.extend(
            columns
                .iter()
                .map(|(_, vals)| vals[row].map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // Source exports end with a blank line; the parser skips it.
    std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, b",\n"))
        .context("appending trailing row")?;
    Ok(())
}

fn write_parquet(path: &Path, period_column: &str, columns: &[(String, Vec<Option<f64>>)]) -> Result<()> {
    let mut fields = vec![Field::new(period_column, DataType::Int64, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(Int64Array::from(YEARS.collect::<Vec<_>>()))];

    for (name, vals) in columns {
        let mut builder = Float64Builder::with_capacity(vals.len());
        for v in vals {
            builder.append_option(*v);
        }
        fields.push(Field::new(name, DataType::Float64, true));
        arrays.push(Arc::new(builder.finish()));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Commute mode: <purpose><mode>, JSON records
// ---------------------------------------------------------------------------

fn commute_config() -> DatasetConfig {
    let mut cfg = DatasetConfig::new(
        "commute-mode",
        DecompositionRule::Prefixed {
            prefix_len: 2,
            prefixes: PURPOSES
                .iter()
                .map(|(code, _)| code.to_string())
                .filter(|code| code.len() != 2)
                .collect(),
            prefix_dimension: "purpose".to_string(),
            suffix_dimension: "mode".to_string(),
            vocabulary: MODES.iter().map(|(code, _)| code.to_string()).collect(),
        },
    );
    cfg.title = "Commute Mode Share".to_string();
    cfg.source = Some(PathBuf::from("commute_mode.json"));
    cfg.period_column = "Year".to_string();
    cfg.label_order = vec!["mode".to_string(), "purpose".to_string()];
    cfg.value_order = ValueOrder::FirstAppearance;
    cfg.display_names.insert("purpose".to_string(), names(&PURPOSES));
    cfg.display_names.insert("mode".to_string(), names(&MODES));
    cfg
}

fn write_commute_json(path: &Path, rng: &mut SimpleRng, cfg: &DatasetConfig) -> Result<()> {
    let mut series: Vec<(String, Vec<f64>)> = Vec::new();
    for (purpose, _) in PURPOSES {
        for (mode, _) in MODES {
            let coordinate = [purpose.to_string(), mode.to_string()];
            let Some(name) = cfg.rule.compose(&coordinate) else {
                anyhow::bail!("cannot encode {purpose}/{mode} as a column name");
            };
            let start = if mode == "sov" { 0.7 } else { rng.range(0.01, 0.08) };
            series.push((name, random_walk(rng, start, 0.01, 0.0, 1.0)));
        }
    }

    let records: Vec<JsonValue> = YEARS
        .enumerate()
        .map(|(row, year)| {
            let mut obj = Map::new();
            obj.insert(cfg.period_column.clone(), JsonValue::from(year));
            for (name, vals) in &series {
                obj.insert(name.clone(), JsonValue::from(vals[row]));
            }
            JsonValue::Object(obj)
        })
        .collect();

    let text = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "sample_data".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    let bridges = bridge_config();
    let columns = bridge_columns(&mut rng, &bridges.rule);
    write_csv(&out_dir.join("bridge_conditions.csv"), &bridges.period_column, &columns)?;
    write_parquet(&out_dir.join("bridge_conditions.parquet"), &bridges.period_column, &columns)?;

    let mut bridges_parquet = bridges.clone();
    bridges_parquet.id = "bridge-conditions-parquet".to_string();
    bridges_parquet.source = Some(PathBuf::from("bridge_conditions.parquet"));

    let commute = commute_config();
    write_commute_json(&out_dir.join("commute_mode.json"), &mut rng, &commute)?;

    let catalog = Catalog {
        datasets: vec![bridges, bridges_parquet, commute],
    };
    let catalog_path = out_dir.join("catalog.json");
    std::fs::write(&catalog_path, serde_json::to_string_pretty(&catalog)?)
        .with_context(|| format!("writing {}", catalog_path.display()))?;

    println!(
        "Wrote {} bridge columns x {} years and a commute dataset; open {}",
        columns.len(),
        YEARS.count(),
        catalog_path.display()
    );
    Ok(())
}
