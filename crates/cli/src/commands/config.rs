use std::fs;
use std::path::{Path, PathBuf};

use basket_core::config::{read_env, AppConfig, LoadOptions};
use basket_core::ApplicationError;
use toml::Value;

use crate::commands::CommandResult;

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &ApplicationError::from(error)),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mining = &config.mining;
    let input = &config.input;
    let entries: [(&str, String, &[&str]); 11] = [
        (
            "mining.min_item_support",
            mining.min_item_support.to_string(),
            &["BASKET_MINING_MIN_ITEM_SUPPORT"],
        ),
        (
            "mining.min_pair_support",
            mining.min_pair_support.to_string(),
            &["BASKET_MINING_MIN_PAIR_SUPPORT"],
        ),
        (
            "mining.min_confidence",
            mining.min_confidence.to_string(),
            &["BASKET_MINING_MIN_CONFIDENCE"],
        ),
        ("mining.top_n", mining.top_n.to_string(), &["BASKET_MINING_TOP_N"]),
        (
            "mining.catalog_policy",
            mining.catalog_policy.as_str().to_string(),
            &["BASKET_MINING_CATALOG_POLICY"],
        ),
        ("mining.scan_mode", mining.scan_mode.as_str().to_string(), &["BASKET_MINING_SCAN_MODE"]),
        (
            "input.path",
            input.path.as_ref().map(|path| path.display().to_string()).unwrap_or("<unset>".into()),
            &["BASKET_INPUT_PATH"],
        ),
        ("input.id_column", display_or_none(&input.id_column), &["BASKET_INPUT_ID_COLUMN"]),
        ("input.has_headers", input.has_headers.to_string(), &["BASKET_INPUT_HAS_HEADERS"]),
        (
            "logging.level",
            config.logging.level.clone(),
            &["BASKET_LOGGING_LEVEL", "BASKET_LOG_LEVEL"],
        ),
        (
            "logging.format",
            config.logging.format.as_str().to_string(),
            &["BASKET_LOGGING_FORMAT", "BASKET_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_keys) in entries {
        lines.push(render_line(key_path, &value, source(key_path, env_keys)));
    }
    lines.push(render_line(
        "input.missing_markers",
        &format!("{:?}", input.missing_markers),
        field_source(
            "input.missing_markers",
            &[],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    CommandResult::rendered(lines.join("\n"))
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("basket.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/basket.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    // First key wins, matching the loader's fallback order.
    if let Some(env_key) = env_keys.iter().find(|key| read_env(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn display_or_none(value: &str) -> String {
    if value.trim().is_empty() {
        "<none>".to_string()
    } else {
        value.to_string()
    }
}
