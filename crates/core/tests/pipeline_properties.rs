use basket_core::mining::{count_items, count_pairs, item_support, pair_support, PairCatalog};
use basket_core::{
    Item, MiningError, MiningPipeline, MiningSettings, Pair, ScanMode, Stage, Threshold,
    Transaction, TransactionTable,
};

const TOLERANCE: f64 = 1e-12;

fn item(name: &str) -> Item {
    Item::from(name)
}

fn pair(antecedent: &str, consequent: &str) -> Pair {
    Pair::new(item(antecedent), item(consequent)).expect("distinct items")
}

/// `[{A,B}, {A,B,C}, {A}, {B,C}]`
fn worked_example() -> TransactionTable {
    TransactionTable::new(vec![
        Transaction::from_items("1", ["A", "B"]),
        Transaction::from_items("2", ["A", "B", "C"]),
        Transaction::from_items("3", ["A"]),
        Transaction::from_items("4", ["B", "C"]),
    ])
}

fn grocery() -> TransactionTable {
    let rows: [&[&str]; 8] = [
        &["bread", "milk", "milk"],
        &["bread", "diapers", "beer", "eggs"],
        &["milk", "diapers", "beer", "cola"],
        &["bread", "milk", "diapers", "beer"],
        &["bread", "milk", "diapers", "cola"],
        &["eggs"],
        &["beer", "chips", "cola"],
        &["bread", "jam", "bread"],
    ];
    TransactionTable::new(
        rows.iter()
            .enumerate()
            .map(|(id, items)| Transaction::from_items(id.to_string(), items.iter().copied()))
            .collect(),
    )
}

fn reference_settings() -> MiningSettings {
    MiningSettings {
        top_n: None,
        ..MiningSettings::from_raw(0.0, 0.0, 0.1).expect("valid thresholds")
    }
}

#[test]
fn worked_example_counts_and_supports() -> Result<(), MiningError> {
    let table = worked_example();
    let counts = count_items(&table);

    assert_eq!(counts.get(&item("A")), Some(&3));
    assert_eq!(counts.get(&item("B")), Some(&3));
    assert_eq!(counts.get(&item("C")), Some(&2));

    let supports = item_support(&counts, table.n_transactions(), Threshold::ZERO)?;
    assert_eq!(supports.get(&item("A")), Some(&0.75));
    assert_eq!(supports.get(&item("B")), Some(&0.75));
    assert_eq!(supports.get(&item("C")), Some(&0.5));

    let pairs = count_pairs(&table, &PairCatalog::from_items(counts.keys()), ScanMode::Sequential);
    assert_eq!(pairs.get(&pair("A", "B")), Some(&2));
    let pair_supports = pair_support(&pairs, table.n_transactions(), Threshold::ZERO)?;
    assert_eq!(pair_supports.get(&pair("A", "B")), Some(&0.5));
    Ok(())
}

#[test]
fn worked_example_rules_include_both_directions() -> Result<(), MiningError> {
    let report = MiningPipeline::new(reference_settings()).run(&worked_example())?;

    for (antecedent, consequent) in [("A", "B"), ("B", "A")] {
        let rule = report
            .rules
            .iter()
            .find(|rule| rule.pair() == pair(antecedent, consequent))
            .expect("rule should be present");

        assert_eq!(rule.support, 0.5);
        assert_eq!(rule.antecedent_support, 0.75);
        assert_eq!(rule.consequent_support, 0.75);
        assert!((rule.confidence - 2.0 / 3.0).abs() < TOLERANCE);
        assert!((rule.lift - (2.0 / 3.0) / 0.75).abs() < TOLERANCE);
        assert!((rule.lift - 0.888_888_888_888_889).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn supports_are_bounded_and_exact() -> Result<(), MiningError> {
    let table = grocery();
    let report = MiningPipeline::new(reference_settings()).run(&table)?;
    let n = table.n_transactions() as f64;

    for (key, support) in &report.item_support {
        let count = report.item_counts[key];
        assert!((0.0..=1.0).contains(support));
        assert_eq!(*support, count as f64 / n);
    }
    for (key, support) in &report.pair_support {
        assert!((0.0..=1.0).contains(support));
        assert_eq!(*support, report.pair_counts[key] as f64 / n);
    }
    Ok(())
}

#[test]
fn rules_satisfy_measure_identities_and_are_ranked() -> Result<(), MiningError> {
    let report = MiningPipeline::new(reference_settings()).run(&grocery())?;

    assert!(!report.rules.is_empty());
    for rule in &report.rules {
        assert!(rule.confidence >= 0.1);
        assert!((rule.confidence - rule.support / rule.antecedent_support).abs() < TOLERANCE);
        assert!((rule.lift - rule.confidence / rule.consequent_support).abs() < TOLERANCE);
        assert_eq!(report.item_support[&rule.antecedent], rule.antecedent_support);
        assert_eq!(report.pair_support[&rule.pair()], rule.support);
    }
    assert!(report.rules.windows(2).all(|window| window[0].lift >= window[1].lift));
    Ok(())
}

#[test]
fn catalog_size_matches_distinct_items() -> Result<(), MiningError> {
    let report = MiningPipeline::new(reference_settings()).run(&grocery())?;
    let k = report.distinct_items;

    assert_eq!(k, 8);
    assert_eq!(report.candidate_pairs, k * (k - 1));

    let single = TransactionTable::new(vec![Transaction::from_items("0", ["only", "only"])]);
    let report = MiningPipeline::new(reference_settings()).run(&single)?;
    assert_eq!(report.candidate_pairs, 0);
    assert!(report.pair_counts.is_empty());
    assert!(report.rules.is_empty());
    Ok(())
}

#[test]
fn rerunning_on_the_same_table_is_idempotent() -> Result<(), MiningError> {
    let table = grocery();
    let pipeline = MiningPipeline::new(reference_settings());

    let first = pipeline.run(&table)?;
    let second = pipeline.run(&table)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn parallel_scan_is_bit_identical() -> Result<(), MiningError> {
    let table = grocery();
    let sequential = MiningPipeline::new(reference_settings()).run(&table)?;
    let parallel = MiningPipeline::new(MiningSettings {
        scan_mode: ScanMode::Parallel,
        ..reference_settings()
    })
    .run(&table)?;

    assert_eq!(sequential.pair_counts, parallel.pair_counts);
    assert_eq!(sequential.rules, parallel.rules);
    Ok(())
}

#[test]
fn repeated_item_in_a_row_counts_once() {
    let counts = count_items(&grocery());

    assert_eq!(counts.get(&item("bread")), Some(&5));
    assert_eq!(counts.get(&item("milk")), Some(&4));
}

#[test]
fn zero_transactions_raise_empty_dataset() {
    let error = MiningPipeline::new(reference_settings())
        .run(&TransactionTable::default())
        .expect_err("no transactions");

    assert_eq!(error, MiningError::EmptyDataset { stage: Stage::ItemSupport });
}

#[test]
fn pair_support_threshold_prunes_rare_pairs() -> Result<(), MiningError> {
    let settings = MiningSettings {
        top_n: None,
        ..MiningSettings::from_raw(0.0, 0.25, 0.0)?
    };
    let report = MiningPipeline::new(settings).run(&grocery())?;

    assert!(report.pair_support.values().all(|support| *support >= 0.25));
    assert!(report.rules.iter().all(|rule| rule.support >= 0.25));
    assert!(!report.pair_support.contains_key(&pair("chips", "cola")));
    Ok(())
}
