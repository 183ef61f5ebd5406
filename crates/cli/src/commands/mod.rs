pub mod config;
pub mod items;
pub mod mine;

use std::path::PathBuf;

use basket_core::config::{AppConfig, LoadOptions};
use basket_core::{load_transactions_file, ApplicationError, TransactionTable};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    pub fn rendered(output: String) -> Self {
        Self { exit_code: 0, output }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads configuration and the transaction file it points at.
fn load_table(options: &LoadOptions) -> Result<(AppConfig, TransactionTable), CommandError> {
    let config = AppConfig::load(options.clone()).map_err(ApplicationError::from)?;
    let path: PathBuf = config.input.path.clone().ok_or(CommandError::MissingInput)?;
    let table =
        load_transactions_file(&path, &config.input.settings()).map_err(ApplicationError::from)?;
    Ok((config, table))
}

#[derive(Debug)]
enum CommandError {
    MissingInput,
    Application(ApplicationError),
}

impl From<ApplicationError> for CommandError {
    fn from(error: ApplicationError) -> Self {
        Self::Application(error)
    }
}

impl CommandError {
    fn into_result(self, command: &str) -> CommandResult {
        match self {
            Self::MissingInput => CommandResult::failure(
                command,
                "config_validation",
                "no input file configured; pass --input or set input.path",
                2,
            ),
            Self::Application(error) => CommandResult::from_error(command, &error),
        }
    }
}
