//! CSV transaction loader.
//!
//! Expected layout: an optional identifier column followed by fixed-width
//! item slots, e.g.
//!
//! ```text
//! ID,Item 1,Item 2,Item 3
//! 1,bread,milk,
//! 2,beer,NaN,diapers
//! ```
//!
//! Empty cells and configured missing-value markers become empty slots.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::domain::item::Item;
use crate::domain::transaction::{Transaction, TransactionTable};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSettings {
    /// Header name of the row identifier column. Only used with headers.
    pub id_column: Option<String>,
    pub has_headers: bool,
    pub missing_markers: Vec<String>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            id_column: Some("ID".to_string()),
            has_headers: true,
            missing_markers: default_missing_markers(),
        }
    }
}

/// Cell values read as "no item", the same set pandas' `read_csv` treats as NA.
pub const DEFAULT_MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn default_missing_markers() -> Vec<String> {
    DEFAULT_MISSING_MARKERS.iter().map(|marker| marker.to_string()).collect()
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open transaction file `{path}`: {source}")]
    Open { path: PathBuf, source: std::io::Error },
    #[error("could not read CSV header: {0}")]
    Header(#[source] csv::Error),
    #[error("CSV parse error at line {line}: {source}")]
    Parse { line: u64, source: csv::Error },
    #[error("identifier column `{0}` not found in header")]
    MissingIdColumn(String),
}

pub fn load_transactions<R: Read>(
    reader: R,
    settings: &InputSettings,
) -> Result<TransactionTable, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(settings.has_headers)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let (id_position, width) = if settings.has_headers {
        let headers = csv_reader.headers().map_err(LoadError::Header)?;
        let id_position = match settings.id_column.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => Some(
                headers
                    .iter()
                    .position(|header| header == name)
                    .ok_or_else(|| LoadError::MissingIdColumn(name.to_string()))?,
            ),
            None => None,
        };
        (id_position, headers.len() - usize::from(id_position.is_some()))
    } else {
        (None, 0)
    };

    // Physical file lines, so blank lines and quoted newlines are counted.
    let mut last_line = u64::from(settings.has_headers);
    let mut transactions = Vec::new();
    for (ordinal, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|source| {
            let line = source.position().map_or(last_line + 1, |position| position.line());
            LoadError::Parse { line, source }
        })?;
        if let Some(position) = record.position() {
            last_line = position.line();
        }

        let id = id_position
            .and_then(|position| record.get(position))
            .map(str::to_string)
            .unwrap_or_else(|| ordinal.to_string());
        let cells = record
            .iter()
            .enumerate()
            .filter(|(position, _)| Some(*position) != id_position)
            .map(|(_, cell)| parse_cell(cell, &settings.missing_markers))
            .collect();

        transactions.push(Transaction::new(id, cells));
    }

    let table = TransactionTable::with_width(transactions, width);
    info!(
        event_name = "loader.transactions.loaded",
        n_transactions = table.n_transactions(),
        n_items = table.n_items(),
        "transaction table loaded"
    );
    Ok(table)
}

pub fn load_transactions_file(
    path: &Path,
    settings: &InputSettings,
) -> Result<TransactionTable, LoadError> {
    let file =
        File::open(path).map_err(|source| LoadError::Open { path: path.to_path_buf(), source })?;
    load_transactions(file, settings)
}

fn parse_cell(cell: &str, missing_markers: &[String]) -> Option<Item> {
    let cell = cell.trim();
    if cell.is_empty() || missing_markers.iter().any(|marker| marker == cell) {
        None
    } else {
        Some(Item::from(cell))
    }
}
