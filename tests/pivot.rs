mod common;

use pretty_assertions::assert_eq;
use rusty_pivot::{
    DatasetConfig, DecompositionRule, Filter, Period, PivotDataset, QueryStatus, Selection, Value, WILDCARD,
};

use common::{bridges, commute, delimited};

fn labels(chart: &rusty_pivot::ChartData) -> Vec<&str> {
    chart.series.iter().map(|s| s.label.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Wildcard expansion
// ---------------------------------------------------------------------------

#[test]
fn region_wildcard_excludes_other_ownership() {
    let cfg = DatasetConfig::new("small", delimited(&["region", "ownership"]));
    let ds = PivotDataset::from_text(
        cfg,
        "year,North-State,North-Local,South-State\n2020,0.2,0.3,0.4\n",
    )
    .unwrap();

    let filter = Filter::new().with("region", WILDCARD).with("ownership", "State");
    let chart = ds.resolve(&filter, None);

    assert_eq!(chart.status, QueryStatus::Ok);
    assert_eq!(labels(&chart), vec!["North", "South"]);
    let values: Vec<Option<f64>> = chart
        .series
        .iter()
        .map(|s| s.points[0].value.as_f64())
        .collect();
    assert_eq!(values, vec![Some(0.2), Some(0.4)]);
    assert_eq!(chart.series[0].points[0].period, Period::Year(2020));
}

#[test]
fn missing_combination_yields_empty_result() {
    let ds = bridges();
    let filter = Filter::new().with("region", "West").with("ownership", "State");
    let chart = ds.resolve(&filter, None);
    assert_eq!(chart.status, QueryStatus::Ok);
    assert!(chart.is_empty());
}

#[test]
fn concrete_filter_yields_at_most_one_series() {
    let ds = bridges();
    let filter = Filter::new().with("region", "North").with("ownership", "Local");
    let result = ds.pivot(&filter, None);
    assert_eq!(result.series.len(), 1);
    assert_eq!(result.series[0].column, "North-Local");
    assert_eq!(result.series[0].key.as_str(), "region=North|ownership=Local");
}

#[test]
fn aggregate_region_comes_first() {
    let ds = bridges();
    assert_eq!(
        ds.available_values("region").unwrap(),
        ["Study Area", "East", "North", "South"]
    );

    let filter = Filter::new().with("ownership", "State");
    let chart = ds.resolve(&filter, None);
    // East has no State column.
    assert_eq!(labels(&chart), vec!["Study Area", "North", "South"]);
}

#[test]
fn double_wildcard_nests_region_outermost() {
    let ds = bridges();
    let result = ds.pivot(&Filter::new(), None);
    let columns: Vec<&str> = result.series.iter().map(|s| s.column.as_str()).collect();
    assert_eq!(
        columns,
        vec![
            "Study Area-Local",
            "Study Area-State",
            "East-Local",
            "North-Local",
            "North-State",
            "South-State",
        ]
    );

    let chart = ds.resolve(&Filter::new(), None);
    assert_eq!(
        labels(&chart),
        vec!["Local", "State", "East - Local", "North - Local", "North - State", "South - State"]
    );
}

#[test]
fn wildcard_count_matches_existing_columns() {
    let ds = bridges();
    for region in ds.available_values("region").unwrap() {
        let filter = Filter::new().with("region", region.as_str()).with("ownership", Selection::All);
        let expected = ds
            .available_values("ownership")
            .unwrap()
            .iter()
            .filter(|o| ds.dataset().has_column(&format!("{region}-{o}")))
            .count();
        assert_eq!(ds.pivot(&filter, None).series.len(), expected, "region {region}");
    }
}

#[test]
fn unknown_filter_dimension_is_ignored() {
    let ds = bridges();
    let plain = ds.resolve(&Filter::new().with("ownership", "Local"), None);
    let noisy = ds.resolve(
        &Filter::new().with("ownership", "Local").with("county", "Bucks"),
        None,
    );
    assert_eq!(plain, noisy);
}

// ---------------------------------------------------------------------------
// Values and gaps
// ---------------------------------------------------------------------------

#[test]
fn gaps_and_bad_cells_are_missing_not_zero() {
    let ds = bridges();

    let north = ds.pivot(&Filter::new().with("region", "North").with("ownership", "State"), None);
    let values: Vec<Value> = north.series[0].points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![Value::Number(0.08), Value::Missing, Value::Number(0.07)]);

    let east = ds.pivot(&Filter::new().with("region", "East").with("ownership", "Local"), None);
    assert!(east.series[0].points[1].value.is_missing());
}

#[test]
fn blank_period_rows_are_dropped() {
    let ds = bridges();
    let periods: Vec<&Period> = ds.dataset().periods().collect();
    assert_eq!(
        periods,
        vec![&Period::Year(2018), &Period::Year(2019), &Period::Year(2020)]
    );
}

#[test]
fn missing_values_serialize_as_null() {
    let ds = bridges();
    let chart = ds.resolve(
        &Filter::new().with("region", "North").with("ownership", "State"),
        None,
    );
    let json = serde_json::to_value(&chart).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["series"][0]["points"][1]["period"], 2019);
    assert!(json["series"][0]["points"][1]["value"].is_null());
}

// ---------------------------------------------------------------------------
// Stability and colours
// ---------------------------------------------------------------------------

#[test]
fn repeated_queries_are_identical() {
    let ds = bridges();
    let filter = Filter::new().with("ownership", "Local");
    assert_eq!(ds.resolve(&filter, None), ds.resolve(&filter, None));
}

#[test]
fn colours_cycle_through_the_palette() {
    let header: Vec<String> = (b'A'..=b'H').map(|c| (c as char).to_string()).collect();
    let text = format!("year,{}\n2020,1,2,3,4,5,6,7,8\n", header.join(","));
    let ds = PivotDataset::from_text(DatasetConfig::new("eight", delimited(&["site"])), &text)
        .unwrap();

    let chart = ds.resolve(&Filter::new(), None);
    let palette = &ds.config().palette;
    assert_eq!(chart.series.len(), palette.len() + 1);
    for (i, s) in chart.series.iter().enumerate() {
        assert_eq!(s.color, palette.color_at(i));
    }
    assert_eq!(chart.series[palette.len()].color, chart.series[0].color);
    assert_ne!(chart.series[1].color, chart.series[0].color);
}

// ---------------------------------------------------------------------------
// Cross-sectional mode
// ---------------------------------------------------------------------------

#[test]
fn cross_section_narrows_to_one_period() {
    let ds = bridges();
    let period = Period::Year(2020);
    let chart = ds.resolve(&Filter::new().with("ownership", "State"), Some(&period));

    assert_eq!(chart.period, Some(period.clone()));
    assert!(chart.series.iter().all(|s| s.points.len() == 1));
    assert_eq!(chart.series[1].points[0].value, Value::Number(0.07));
}

#[test]
fn unknown_period_reports_status() {
    let ds = bridges();
    let chart = ds.resolve(&Filter::new(), Some(&Period::Year(2030)));
    assert_eq!(chart.status, QueryStatus::PeriodNotFound);
    assert!(chart.is_empty());
}

#[test]
fn latest_period_breakdown() {
    let ds = bridges();
    let latest = ds.dataset().latest_period().unwrap().clone();
    let slices = ds.breakdown(&Filter::new().with("ownership", "Local"), &latest);
    let cols: Vec<&str> = slices.iter().map(|s| s.column.as_str()).collect();
    assert_eq!(cols, vec!["North-Local", "Study Area-Local", "East-Local"]);
}

// ---------------------------------------------------------------------------
// Prefixed decomposition
// ---------------------------------------------------------------------------

#[test]
fn prefixed_columns_decompose_by_vocabulary() {
    let ds = commute();
    assert_eq!(ds.available_values("purpose").unwrap(), ["ch", "hw"]);
    assert_eq!(ds.available_values("mode").unwrap(), ["sov", "walk"]);
    assert_eq!(ds.dimensions().skipped(), ["hwunknown"]);
}

#[test]
fn prefixed_labels_follow_label_order() {
    let ds = commute();

    let by_purpose = ds.resolve(&Filter::new().with("mode", "sov"), None);
    assert_eq!(labels(&by_purpose), vec!["ch", "hw"]);

    let all = ds.resolve(&Filter::new(), None);
    assert_eq!(labels(&all), vec!["sov - ch", "walk - ch", "sov - hw", "walk - hw"]);

    let one = ds.resolve(&Filter::new().with("purpose", "hw").with("mode", "walk"), None);
    assert_eq!(labels(&one), vec!["walk - hw"]);
}

#[test]
fn known_prefixes_of_different_lengths_share_a_dimension() {
    let mut cfg = common::commute_config();
    if let DecompositionRule::Prefixed { prefixes, .. } = &mut cfg.rule {
        *prefixes = vec!["din".to_string(), "che".to_string()];
    }
    let ds = PivotDataset::from_text(cfg, "Year,hwsov,dinsov,chesov,chsov\n2015,0.8,0.6,0.7,0.75\n")
        .unwrap();

    assert_eq!(ds.available_values("purpose").unwrap(), ["ch", "che", "din", "hw"]);
    assert!(ds.dimensions().skipped().is_empty());

    let chart = ds.resolve(&Filter::new().with("mode", "sov"), None);
    let pivoted = ds.pivot(&Filter::new().with("mode", "sov"), None);
    let columns: Vec<&str> = pivoted
        .series
        .iter()
        .map(|s| s.column.as_str())
        .collect();
    assert_eq!(columns, vec!["chsov", "chesov", "dinsov", "hwsov"]);
    assert_eq!(labels(&chart), vec!["ch", "che", "din", "hw"]);
}

#[test]
fn display_names_reach_labels() {
    let mut cfg = common::commute_config();
    cfg.display_names.insert(
        "purpose".to_string(),
        [("hw", "Home to Work"), ("ch", "Commute Home")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    cfg.display_names.insert(
        "mode".to_string(),
        [("sov".to_string(), "Drove Alone".to_string())].into_iter().collect(),
    );
    let ds = PivotDataset::from_text(cfg, common::COMMUTE_CSV).unwrap();

    let chart = ds.resolve(&Filter::new(), None);
    assert_eq!(
        labels(&chart),
        vec![
            "Drove Alone - Commute Home",
            "walk - Commute Home",
            "Drove Alone - Home to Work",
            "walk - Home to Work",
        ]
    );
    // Keys and filters keep the raw codes.
    assert_eq!(chart.series[0].key.as_str(), "purpose=ch|mode=sov");
}

#[test]
fn partial_label_order_keeps_labels_distinct() {
    let mut cfg = DatasetConfig::new("partial", delimited(&["region", "ownership"]));
    cfg.label_order = vec!["ownership".to_string()];
    let ds = PivotDataset::from_text(cfg, "year,North-State,South-State\n2020,1,2\n").unwrap();

    let chart = ds.resolve(&Filter::new(), None);
    assert_eq!(labels(&chart), vec!["State - North", "State - South"]);
}
