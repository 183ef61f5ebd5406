use basket_core::config::LoadOptions;
use basket_core::mining::{count_items, item_support};
use basket_core::{ApplicationError, Item, Threshold, TransactionTable};
use serde::Serialize;

use crate::commands::{load_table, CommandError, CommandResult, OutputFormat};

#[derive(Debug, Serialize)]
struct ItemRow {
    item: Item,
    count: u64,
    support: f64,
}

#[derive(Debug, Serialize)]
struct ItemsOutput {
    command: &'static str,
    status: &'static str,
    n_transactions: usize,
    n_items: usize,
    items: Vec<ItemRow>,
}

/// Lists every observed item with its count and support, most frequent first.
pub fn run(options: &LoadOptions, format: OutputFormat, limit: Option<usize>) -> CommandResult {
    let (table, rows) = match item_rows(options) {
        Ok(value) => value,
        Err(error) => return error.into_result("items"),
    };
    let rows: Vec<ItemRow> = rows.into_iter().take(limit.unwrap_or(usize::MAX)).collect();

    match format {
        OutputFormat::Json => {
            let payload = ItemsOutput {
                command: "items",
                status: "ok",
                n_transactions: table.n_transactions(),
                n_items: table.n_items(),
                items: rows,
            };
            match serde_json::to_string(&payload) {
                Ok(output) => CommandResult::rendered(output),
                Err(error) => {
                    CommandResult::failure("items", "serialization", error.to_string(), 1)
                }
            }
        }
        OutputFormat::Table => {
            let width =
                rows.iter().map(|row| row.item.as_str().len()).max().unwrap_or(0).max(4);
            let mut lines =
                vec![format!("transactions={} slots={}", table.n_transactions(), table.n_items())];
            lines.push(format!("{:<width$}  {:>7}  {:>8}", "item", "count", "support"));
            for row in &rows {
                lines.push(format!(
                    "{:<width$}  {:>7}  {:>8.6}",
                    row.item.as_str(),
                    row.count,
                    row.support
                ));
            }
            CommandResult::rendered(lines.join("\n"))
        }
    }
}

fn item_rows(options: &LoadOptions) -> Result<(TransactionTable, Vec<ItemRow>), CommandError> {
    let (_, table) = load_table(options)?;
    let counts = count_items(&table);
    let support = item_support(&counts, table.n_transactions(), Threshold::ZERO)
        .map_err(ApplicationError::from)?;

    // A zero threshold keeps every key, so both maps iterate in the same order.
    let mut rows: Vec<ItemRow> = counts
        .into_iter()
        .zip(support.into_values())
        .map(|((item, count), support)| ItemRow { item, count, support })
        .collect();
    rows.sort_by(|left, right| {
        right.count.cmp(&left.count).then_with(|| left.item.cmp(&right.item))
    });
    Ok((table, rows))
}
