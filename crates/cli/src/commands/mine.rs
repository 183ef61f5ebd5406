use basket_core::config::LoadOptions;
use basket_core::{ApplicationError, MiningPipeline, MiningReport, Rule};
use serde::Serialize;

use crate::commands::{load_table, CommandError, CommandResult, OutputFormat};

#[derive(Debug, Serialize)]
struct MineOutput<'a> {
    command: &'static str,
    status: &'static str,
    n_transactions: usize,
    n_items: usize,
    distinct_items: usize,
    candidate_pairs: usize,
    total_rules: usize,
    rules: &'a [Rule],
}

pub fn run(options: &LoadOptions, format: OutputFormat) -> CommandResult {
    match mine(options) {
        Ok(report) => match format {
            OutputFormat::Table => CommandResult::rendered(render_table(&report)),
            OutputFormat::Json => render_json(&report),
        },
        Err(error) => error.into_result("mine"),
    }
}

fn mine(options: &LoadOptions) -> Result<MiningReport, CommandError> {
    let (config, table) = load_table(options)?;
    let settings = config.mining.settings().map_err(ApplicationError::from)?;
    let report = MiningPipeline::new(settings).run(&table).map_err(ApplicationError::from)?;
    Ok(report)
}

fn render_json(report: &MiningReport) -> CommandResult {
    let payload = MineOutput {
        command: "mine",
        status: "ok",
        n_transactions: report.n_transactions,
        n_items: report.n_items,
        distinct_items: report.distinct_items,
        candidate_pairs: report.candidate_pairs,
        total_rules: report.total_rules,
        rules: &report.rules,
    };
    match serde_json::to_string(&payload) {
        Ok(output) => CommandResult::rendered(output),
        Err(error) => CommandResult::failure("mine", "serialization", error.to_string(), 1),
    }
}

const HEADERS: [&str; 7] = [
    "antecedent",
    "consequent",
    "antecedent support",
    "consequent support",
    "support",
    "confidence",
    "lift",
];

pub fn render_table(report: &MiningReport) -> String {
    let mut lines = vec![format!(
        "transactions={} slots={} distinct_items={} candidate_pairs={} rules={} (showing {})",
        report.n_transactions,
        report.n_items,
        report.distinct_items,
        report.candidate_pairs,
        report.total_rules,
        report.rules.len(),
    )];

    if report.rules.is_empty() {
        lines.push("no rules met the configured thresholds".to_string());
        return lines.join("\n");
    }

    let rows: Vec<[String; 7]> = report
        .rules
        .iter()
        .map(|rule| {
            [
                rule.antecedent.to_string(),
                rule.consequent.to_string(),
                format!("{:.6}", rule.antecedent_support),
                format!("{:.6}", rule.consequent_support),
                format!("{:.6}", rule.support),
                format!("{:.6}", rule.confidence),
                format!("{:.6}", rule.lift),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    lines.push(render_row(HEADERS.iter().copied(), &widths));
    for row in &rows {
        lines.push(render_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize; 7]) -> String {
    cells
        .zip(widths.iter().copied())
        .enumerate()
        .map(|(column, (cell, width))| {
            if column < 2 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
