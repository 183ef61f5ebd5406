use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::MiningError;
use crate::loader::{default_missing_markers, InputSettings};
use crate::mining::{
    CatalogPolicy, MiningSettings, ScanMode, Threshold, DEFAULT_MIN_CONFIDENCE,
    DEFAULT_MIN_ITEM_SUPPORT, DEFAULT_MIN_PAIR_SUPPORT, DEFAULT_TOP_N,
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub mining: MiningConfig,
    pub input: InputConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct MiningConfig {
    pub min_item_support: f64,
    pub min_pair_support: f64,
    pub min_confidence: f64,
    /// Zero disables the cap.
    pub top_n: usize,
    pub catalog_policy: CatalogPolicy,
    pub scan_mode: ScanMode,
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    /// Empty means the file has no identifier column. Ignored without headers.
    pub id_column: String,
    pub has_headers: bool,
    pub missing_markers: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub input_path: Option<PathBuf>,
    pub min_item_support: Option<f64>,
    pub min_pair_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub top_n: Option<usize>,
    pub catalog_policy: Option<CatalogPolicy>,
    pub scan_mode: Option<ScanMode>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error(transparent)]
    Threshold(#[from] MiningError),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mining: MiningConfig {
                min_item_support: DEFAULT_MIN_ITEM_SUPPORT,
                min_pair_support: DEFAULT_MIN_PAIR_SUPPORT,
                min_confidence: DEFAULT_MIN_CONFIDENCE,
                top_n: DEFAULT_TOP_N,
                catalog_policy: CatalogPolicy::AllObserved,
                scan_mode: ScanMode::Sequential,
            },
            input: InputConfig {
                path: None,
                id_column: "ID".to_string(),
                has_headers: true,
                missing_markers: default_missing_markers(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl MiningConfig {
    /// Validated thresholds for the mining pipeline.
    pub fn settings(&self) -> Result<MiningSettings, ConfigError> {
        Ok(MiningSettings {
            min_item_support: Threshold::new("mining.min_item_support", self.min_item_support)?,
            min_pair_support: Threshold::new("mining.min_pair_support", self.min_pair_support)?,
            min_confidence: Threshold::new("mining.min_confidence", self.min_confidence)?,
            top_n: (self.top_n > 0).then_some(self.top_n),
            catalog_policy: self.catalog_policy,
            scan_mode: self.scan_mode,
        })
    }
}

impl InputConfig {
    pub fn settings(&self) -> InputSettings {
        let id_column = self.id_column.trim();
        let use_id_column = self.has_headers && !id_column.is_empty();
        InputSettings {
            id_column: use_id_column.then(|| id_column.to_string()),
            has_headers: self.has_headers,
            missing_markers: self.missing_markers.clone(),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("basket.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(mining) = patch.mining {
            if let Some(min_item_support) = mining.min_item_support {
                self.mining.min_item_support = min_item_support;
            }
            if let Some(min_pair_support) = mining.min_pair_support {
                self.mining.min_pair_support = min_pair_support;
            }
            if let Some(min_confidence) = mining.min_confidence {
                self.mining.min_confidence = min_confidence;
            }
            if let Some(top_n) = mining.top_n {
                self.mining.top_n = top_n;
            }
            if let Some(catalog_policy) = mining.catalog_policy {
                self.mining.catalog_policy = catalog_policy;
            }
            if let Some(scan_mode) = mining.scan_mode {
                self.mining.scan_mode = scan_mode;
            }
        }

        if let Some(input) = patch.input {
            if let Some(path) = input.path {
                self.input.path = Some(path);
            }
            if let Some(id_column) = input.id_column {
                self.input.id_column = id_column;
            }
            if let Some(has_headers) = input.has_headers {
                self.input.has_headers = has_headers;
            }
            if let Some(missing_markers) = input.missing_markers {
                self.input.missing_markers = missing_markers;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BASKET_MINING_MIN_ITEM_SUPPORT") {
            self.mining.min_item_support = parse_f64("BASKET_MINING_MIN_ITEM_SUPPORT", &value)?;
        }
        if let Some(value) = read_env("BASKET_MINING_MIN_PAIR_SUPPORT") {
            self.mining.min_pair_support = parse_f64("BASKET_MINING_MIN_PAIR_SUPPORT", &value)?;
        }
        if let Some(value) = read_env("BASKET_MINING_MIN_CONFIDENCE") {
            self.mining.min_confidence = parse_f64("BASKET_MINING_MIN_CONFIDENCE", &value)?;
        }
        if let Some(value) = read_env("BASKET_MINING_TOP_N") {
            self.mining.top_n = parse_usize("BASKET_MINING_TOP_N", &value)?;
        }
        if let Some(value) = read_env("BASKET_MINING_CATALOG_POLICY") {
            self.mining.catalog_policy = value.parse()?;
        }
        if let Some(value) = read_env("BASKET_MINING_SCAN_MODE") {
            self.mining.scan_mode = value.parse()?;
        }

        if let Some(value) = read_env("BASKET_INPUT_PATH") {
            self.input.path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("BASKET_INPUT_ID_COLUMN") {
            self.input.id_column = value;
        }
        if let Some(value) = read_env("BASKET_INPUT_HAS_HEADERS") {
            self.input.has_headers = parse_bool("BASKET_INPUT_HAS_HEADERS", &value)?;
        }

        let log_level = read_env("BASKET_LOGGING_LEVEL").or_else(|| read_env("BASKET_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BASKET_LOGGING_FORMAT").or_else(|| read_env("BASKET_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(input_path) = overrides.input_path {
            self.input.path = Some(input_path);
        }
        if let Some(min_item_support) = overrides.min_item_support {
            self.mining.min_item_support = min_item_support;
        }
        if let Some(min_pair_support) = overrides.min_pair_support {
            self.mining.min_pair_support = min_pair_support;
        }
        if let Some(min_confidence) = overrides.min_confidence {
            self.mining.min_confidence = min_confidence;
        }
        if let Some(top_n) = overrides.top_n {
            self.mining.top_n = top_n;
        }
        if let Some(catalog_policy) = overrides.catalog_policy {
            self.mining.catalog_policy = catalog_policy;
        }
        if let Some(scan_mode) = overrides.scan_mode {
            self.mining.scan_mode = scan_mode;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_mining(&self.mining)?;
        validate_input(&self.input)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("basket.toml"), PathBuf::from("config/basket.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_mining(mining: &MiningConfig) -> Result<(), ConfigError> {
    let settings = mining.settings()?;

    // Pairs built from unsupported items would have no single-item support
    // to divide by.
    if settings.min_item_support.value() > 0.0
        && settings.catalog_policy == CatalogPolicy::AllObserved
    {
        return Err(ConfigError::Validation(
            "mining.min_item_support > 0 requires mining.catalog_policy = \"supported_only\""
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_input(input: &InputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &input.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("input.path must not be empty".to_string()));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

/// Reads an environment override; unset and blank values count as absent.
pub fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    mining: Option<MiningPatch>,
    input: Option<InputPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct MiningPatch {
    min_item_support: Option<f64>,
    min_pair_support: Option<f64>,
    min_confidence: Option<f64>,
    top_n: Option<usize>,
    catalog_policy: Option<CatalogPolicy>,
    scan_mode: Option<ScanMode>,
}

#[derive(Debug, Default, Deserialize)]
struct InputPatch {
    path: Option<PathBuf>,
    id_column: Option<String>,
    has_headers: Option<bool>,
    missing_markers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
