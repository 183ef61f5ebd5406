pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use basket_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use basket_core::{CatalogPolicy, ScanMode};
use clap::{Args, Parser, Subcommand};

use crate::commands::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "basket",
    about = "Market-basket association rule miner",
    long_about = "Mine pairwise association rules (support, confidence, lift) from a CSV of transactions.",
    after_help = "Examples:\n  basket mine --input data/basket.csv\n  basket mine --input data/basket.csv --min-confidence 0.3 --top 20 --json\n  basket items --input data/basket.csv\n  basket config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a basket.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Mine pairwise association rules ranked by lift")]
    Mine {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Minimum single-item support in [0, 1]")]
        min_item_support: Option<f64>,
        #[arg(long, help = "Minimum pair support in [0, 1]")]
        min_pair_support: Option<f64>,
        #[arg(long, help = "Minimum rule confidence in [0, 1]")]
        min_confidence: Option<f64>,
        #[arg(long, help = "Show at most N rules (0 = all)")]
        top: Option<usize>,
        #[arg(long, help = "Build pairs only from items meeting the item support threshold")]
        prune: bool,
        #[arg(long, help = "Scan transactions in parallel")]
        parallel: bool,
    },
    #[command(about = "List item frequencies and supports")]
    Items {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Show at most N items")]
        limit: Option<usize>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

#[derive(Debug, Args)]
struct InputArgs {
    #[arg(long, help = "Transaction CSV file")]
    input: Option<PathBuf>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    json: bool,
}

impl InputArgs {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = load_options(&cli);

    // Commands report config failures themselves; logging just falls back to defaults.
    let logging_config = AppConfig::load(options.clone()).unwrap_or_default();
    init_logging(&logging_config);

    let result = match &cli.command {
        Command::Mine { input, .. } => commands::mine::run(&options, input.format()),
        Command::Items { input, limit } => commands::items::run(&options, input.format(), *limit),
        Command::Config => commands::config::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn load_options(cli: &Cli) -> LoadOptions {
    let mut overrides = ConfigOverrides::default();
    match &cli.command {
        Command::Mine {
            input,
            min_item_support,
            min_pair_support,
            min_confidence,
            top,
            prune,
            parallel,
        } => {
            overrides.input_path = input.input.clone();
            overrides.min_item_support = *min_item_support;
            overrides.min_pair_support = *min_pair_support;
            overrides.min_confidence = *min_confidence;
            overrides.top_n = *top;
            overrides.catalog_policy = prune.then_some(CatalogPolicy::SupportedOnly);
            overrides.scan_mode = parallel.then_some(ScanMode::Parallel);
        }
        Command::Items { input, .. } => {
            overrides.input_path = input.input.clone();
        }
        Command::Config => {}
    }

    LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config.clone(),
        overrides,
    }
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
