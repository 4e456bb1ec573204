mod common;

use proptest::prelude::*;
use rusty_pivot::color::Palette;
use rusty_pivot::{
    DatasetConfig, Filter, ParseOptions, Period, PivotDataset, Selection, parse_dataset,
};

use common::delimited;

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const OWNERS: [&str; 3] = ["State", "Local", "Other"];

/// A random wide table: a subset of region/ownership columns, shuffled
/// period cells (some blank), and values that may be blank or junk.
fn table() -> impl Strategy<Value = String> {
    let columns = proptest::sample::subsequence(
        REGIONS
            .iter()
            .flat_map(|r| OWNERS.iter().map(move |o| format!("{r}-{o}")))
            .collect::<Vec<_>>(),
        1..=12,
    );
    let cell = prop_oneof![
        3 => (0.0f64..1.0).prop_map(|v| format!("{v:.3}")),
        1 => Just(String::new()),
        1 => Just("n/a".to_string()),
    ];
    let period = prop_oneof![
        4 => (1990i64..2030).prop_map(|y| y.to_string()),
        1 => Just(String::new()),
    ];

    (columns, 0usize..15).prop_flat_map(move |(columns, n_rows)| {
        let width = columns.len();
        proptest::collection::vec(
            (period.clone(), proptest::collection::vec(cell.clone(), width)),
            n_rows,
        )
        .prop_map(move |rows| {
            let mut text = format!("year,{}\n", columns.join(","));
            for (p, cells) in rows {
                text.push_str(&p);
                for c in cells {
                    text.push(',');
                    text.push_str(&c);
                }
                text.push('\n');
            }
            text
        })
    })
}

fn selection() -> impl Strategy<Value = Selection> {
    prop_oneof![
        Just(Selection::All),
        proptest::sample::select(REGIONS.to_vec()).prop_map(Selection::from),
        proptest::sample::select(OWNERS.to_vec()).prop_map(Selection::from),
    ]
}

fn bridges(text: &str) -> PivotDataset {
    PivotDataset::from_text(DatasetConfig::new("p", delimited(&["region", "ownership"])), text)
        .unwrap()
}

proptest! {
    #[test]
    fn periods_are_sorted_unique_and_non_empty(text in table()) {
        let ds = parse_dataset(&text, &ParseOptions::default()).unwrap();
        let periods: Vec<&Period> = ds.periods().collect();
        prop_assert!(periods.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(!periods.iter().any(|p| matches!(p, Period::Label(s) if s.is_empty())));
    }

    #[test]
    fn results_are_subsets_of_the_wildcard_query(
        text in table(),
        region in selection(),
        ownership in selection(),
    ) {
        let ds = bridges(&text);
        let filter = Filter::new().with("region", region.clone()).with("ownership", ownership.clone());
        let result = ds.pivot(&filter, None);

        let everything: Vec<String> = ds
            .pivot(&Filter::new(), None)
            .series
            .into_iter()
            .map(|s| s.column)
            .collect();
        for s in &result.series {
            prop_assert!(everything.contains(&s.column));
            prop_assert!(ds.dataset().has_column(&s.column));
        }
        if !region.is_all() && !ownership.is_all() {
            prop_assert!(result.series.len() <= 1);
        }
    }

    #[test]
    fn resolve_is_deterministic(text in table(), region in selection()) {
        let ds = bridges(&text);
        let filter = Filter::new().with("region", region);
        prop_assert_eq!(ds.resolve(&filter, None), ds.resolve(&filter, None));

        let again = bridges(&text);
        prop_assert_eq!(ds.resolve(&filter, None), again.resolve(&filter, None));
    }

    #[test]
    fn palette_index_cycles(i in 0usize..1000) {
        let palette = Palette::default();
        prop_assert_eq!(palette.color_at(i), palette.color_at(i + palette.len()));
    }
}
