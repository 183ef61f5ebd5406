//! Ordered pair catalog and the co-occurrence scan.
//!
//! The scan is the dominant cost of a mining run: conceptually every catalog
//! pair is checked against every transaction. Each transaction's items are
//! mapped to catalog indices once, and only pairs whose members are both
//! present are visited. Counts are identical to the full containment scan.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::item::{Item, Pair};
use crate::domain::transaction::{Transaction, TransactionTable};
use crate::mining::FrequencyMap;

/// Which items feed the pair catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogPolicy {
    /// Every item observed by the frequency counter.
    #[default]
    AllObserved,
    /// Only items that met the single-item support threshold.
    SupportedOnly,
}

/// How the co-occurrence scan is executed. Both modes produce the same counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Sequential,
    /// Transactions are split across the rayon pool; each worker folds into a
    /// private map and the partial maps are summed key-wise.
    Parallel,
}

impl CatalogPolicy {
    /// Spelling accepted by the config file and environment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllObserved => "all_observed",
            Self::SupportedOnly => "supported_only",
        }
    }
}

impl ScanMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

impl std::str::FromStr for CatalogPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all_observed" => Ok(Self::AllObserved),
            "supported_only" => Ok(Self::SupportedOnly),
            other => Err(ConfigError::Validation(format!(
                "unsupported catalog policy `{other}` (expected all_observed|supported_only)"
            ))),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            other => Err(ConfigError::Validation(format!(
                "unsupported scan mode `{other}` (expected sequential|parallel)"
            ))),
        }
    }
}

/// All ordered pairs of distinct catalog items.
#[derive(Clone, Debug, Default)]
pub struct PairCatalog {
    items: Vec<Item>,
    index: BTreeMap<Item, usize>,
}

impl PairCatalog {
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut items: Vec<Item> = items.into_iter().cloned().collect();
        items.sort();
        items.dedup();
        let index =
            items.iter().enumerate().map(|(position, item)| (item.clone(), position)).collect();
        Self { items, index }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// `k * (k - 1)` for `k` catalog items, zero when `k < 2`.
    pub fn len(&self) -> usize {
        let k = self.items.len();
        k * k.saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Pair> + '_ {
        self.items.iter().flat_map(move |antecedent| {
            self.items.iter().filter_map(move |consequent| {
                Pair::new(antecedent.clone(), consequent.clone())
            })
        })
    }

    fn pair_at(&self, antecedent: usize, consequent: usize) -> Pair {
        Pair {
            antecedent: self.items[antecedent].clone(),
            consequent: self.items[consequent].clone(),
        }
    }

    /// Catalog indices of the items present in `transaction`, ascending.
    fn presence(&self, transaction: &Transaction) -> Vec<usize> {
        transaction.items().iter().filter_map(|item| self.index.get(item).copied()).collect()
    }
}

type PartialCounts = HashMap<(usize, usize), u64>;

fn accumulate(
    catalog: &PairCatalog,
    mut counts: PartialCounts,
    transaction: &Transaction,
) -> PartialCounts {
    let present = catalog.presence(transaction);
    if present.len() < 2 {
        return counts;
    }
    for &antecedent in &present {
        for &consequent in &present {
            if antecedent != consequent {
                *counts.entry((antecedent, consequent)).or_insert(0) += 1;
            }
        }
    }
    counts
}

fn merge(mut left: PartialCounts, right: PartialCounts) -> PartialCounts {
    for (key, count) in right {
        *left.entry(key).or_insert(0) += count;
    }
    left
}

/// Counts, per catalog pair, how many transactions contain both members.
/// Pairs that never co-occur are absent from the result.
pub fn count_pairs(
    table: &TransactionTable,
    catalog: &PairCatalog,
    mode: ScanMode,
) -> FrequencyMap<Pair> {
    let partial = if catalog.is_empty() {
        PartialCounts::new()
    } else {
        match mode {
            ScanMode::Sequential => table
                .iter()
                .fold(PartialCounts::new(), |counts, transaction| {
                    accumulate(catalog, counts, transaction)
                }),
            ScanMode::Parallel => table
                .transactions()
                .par_iter()
                .fold(PartialCounts::new, |counts, transaction| {
                    accumulate(catalog, counts, transaction)
                })
                .reduce(PartialCounts::new, merge),
        }
    };

    let counts: FrequencyMap<Pair> = partial
        .into_iter()
        .map(|((antecedent, consequent), count)| (catalog.pair_at(antecedent, consequent), count))
        .collect();

    tracing::debug!(
        event_name = "mining.pairs.counted",
        scan_mode = ?mode,
        candidate_pairs = catalog.len(),
        co_occurring_pairs = counts.len(),
        "pair co-occurrences counted"
    );
    counts
}
