use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use basket_cli::commands::{config, items, mine, OutputFormat};
use basket_core::config::{ConfigOverrides, LoadOptions};
use serde_json::Value;
use tempfile::TempDir;

const WORKED_EXAMPLE: &str = "\
ID,Item 1,Item 2,Item 3
1,A,B,
2,A,B,C
3,A,,
4,B,C,NaN
";

#[test]
fn mine_emits_ranked_rules_as_json() {
    with_env(&[], || {
        let (_dir, path) = write_csv(WORKED_EXAMPLE);
        let result = mine::run(&options_for(path, ConfigOverrides::default()), OutputFormat::Json);
        assert_eq!(result.exit_code, 0, "expected successful mining run: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "mine");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["n_transactions"], 4);
        assert_eq!(payload["n_items"], 3);
        assert_eq!(payload["candidate_pairs"], 6);

        let rules = payload["rules"].as_array().expect("rules should be an array");
        let a_to_b = rules
            .iter()
            .find(|rule| rule["antecedent"] == "A" && rule["consequent"] == "B")
            .expect("A -> B should be mined");
        assert_eq!(a_to_b["support"], 0.5);
        assert_eq!(a_to_b["antecedent_support"], 0.75);
        let lift = a_to_b["lift"].as_f64().unwrap_or_default();
        assert!((lift - 0.888_888_888_888_889).abs() < 1e-9);

        let lifts: Vec<f64> = rules.iter().filter_map(|rule| rule["lift"].as_f64()).collect();
        assert!(lifts.windows(2).all(|window| window[0] >= window[1]));
    });
}

#[test]
fn mine_table_output_lists_rules_with_header() {
    with_env(&[], || {
        let (_dir, path) = write_csv(WORKED_EXAMPLE);
        let overrides = ConfigOverrides { top_n: Some(2), ..ConfigOverrides::default() };
        let result = mine::run(&options_for(path, overrides), OutputFormat::Table);
        assert_eq!(result.exit_code, 0);

        let lines: Vec<&str> = result.output.lines().collect();
        assert!(lines[0].starts_with("transactions=4 slots=3 distinct_items=3"));
        assert!(lines[0].ends_with("(showing 2)"));
        assert!(lines[1].starts_with("antecedent"));
        assert_eq!(lines.len(), 4);
    });
}

#[test]
fn mine_without_input_is_a_config_failure() {
    with_env(&[], || {
        let result = mine::run(&LoadOptions::default(), OutputFormat::Json);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn mine_rejects_out_of_range_confidence() {
    with_env(&[], || {
        let (_dir, path) = write_csv(WORKED_EXAMPLE);
        let overrides = ConfigOverrides { min_confidence: Some(1.5), ..ConfigOverrides::default() };
        let result = mine::run(&options_for(path, overrides), OutputFormat::Json);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_threshold");
        assert!(payload["message"].as_str().unwrap_or("").contains("mining.min_confidence"));
    });
}

#[test]
fn mine_reports_empty_dataset() {
    with_env(&[], || {
        let (_dir, path) = write_csv("ID,Item 1,Item 2\n");
        let result = mine::run(&options_for(path, ConfigOverrides::default()), OutputFormat::Json);
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "empty_dataset");
        assert!(payload["message"].as_str().unwrap_or("").starts_with("item_support"));
    });
}

#[test]
fn mine_reports_missing_file_as_load_failure() {
    with_env(&[], || {
        let options =
            options_for(PathBuf::from("/nonexistent/basket.csv"), ConfigOverrides::default());
        let result = mine::run(&options, OutputFormat::Json);
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "load");
    });
}

#[test]
fn items_lists_counts_most_frequent_first() {
    with_env(&[], || {
        let (_dir, path) = write_csv(WORKED_EXAMPLE);
        let result =
            items::run(&options_for(path, ConfigOverrides::default()), OutputFormat::Json, None);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let listed = payload["items"].as_array().expect("items should be an array");
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0]["item"], "A");
        assert_eq!(listed[0]["count"], 3);
        assert_eq!(listed[2]["item"], "C");
        assert_eq!(listed[2]["support"], 0.5);
    });
}

#[test]
fn config_reports_env_sources() {
    with_env(&[("BASKET_MINING_MIN_CONFIDENCE", "0.3")], || {
        let result = config::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 0);
        let expected =
            "- mining.min_confidence = 0.3 (source: env (BASKET_MINING_MIN_CONFIDENCE))";
        assert!(result.output.contains(expected));
        assert!(result.output.contains("- mining.min_pair_support = 0.005 (source: default)"));
    });
}

#[test]
fn config_ignores_blank_env_and_credits_short_log_keys() {
    let vars = [("BASKET_MINING_MIN_CONFIDENCE", ""), ("BASKET_LOG_LEVEL", "debug")];
    with_env(&vars, || {
        let result = config::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("- mining.min_confidence = 0.1 (source: default)"));
        assert!(result
            .output
            .contains("- logging.level = debug (source: env (BASKET_LOG_LEVEL))"));
    });
}

#[test]
fn config_prints_enum_values_as_written_in_basket_toml() {
    with_env(&[("BASKET_MINING_SCAN_MODE", "parallel")], || {
        let result = config::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("- mining.catalog_policy = all_observed (source: default)"));
        assert!(result
            .output
            .contains("- mining.scan_mode = parallel (source: env (BASKET_MINING_SCAN_MODE))"));
        assert!(result.output.contains("- logging.format = compact (source: default)"));
    });
}

fn options_for(path: PathBuf, overrides: ConfigOverrides) -> LoadOptions {
    LoadOptions {
        overrides: ConfigOverrides { input_path: Some(path), ..overrides },
        ..LoadOptions::default()
    }
}

fn write_csv(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir should be created");
    let path = dir.path().join("basket.csv");
    fs::write(&path, contents).expect("csv fixture should be written");
    (dir, path)
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BASKET_MINING_MIN_ITEM_SUPPORT",
        "BASKET_MINING_MIN_PAIR_SUPPORT",
        "BASKET_MINING_MIN_CONFIDENCE",
        "BASKET_MINING_TOP_N",
        "BASKET_MINING_CATALOG_POLICY",
        "BASKET_MINING_SCAN_MODE",
        "BASKET_INPUT_PATH",
        "BASKET_INPUT_ID_COLUMN",
        "BASKET_INPUT_HAS_HEADERS",
        "BASKET_LOGGING_LEVEL",
        "BASKET_LOGGING_FORMAT",
        "BASKET_LOG_LEVEL",
        "BASKET_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
