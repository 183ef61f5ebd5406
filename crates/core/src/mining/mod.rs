//! Pairwise association-rule mining.
//!
//! Stages run strictly downstream over an immutable [`TransactionTable`]:
//! item counts, item support, pair catalog, pair counts, pair support, and
//! finally ranked rules. No stage mutates another stage's input.
//!
//! [`TransactionTable`]: crate::domain::transaction::TransactionTable

use std::collections::BTreeMap;

pub mod frequency;
pub mod pairs;
pub mod pipeline;
pub mod rules;
pub mod support;
pub mod threshold;

pub use frequency::count_items;
pub use pairs::{count_pairs, CatalogPolicy, PairCatalog, ScanMode};
pub use pipeline::{MiningPipeline, MiningReport, MiningSettings};
pub use rules::{generate_rules, truncate_top};
pub use support::{compute_support, item_support, pair_support};
pub use threshold::Threshold;

/// Number of transactions whose deduplicated item set contains the key.
pub type FrequencyMap<K> = BTreeMap<K, u64>;

/// `count / n_transactions` per key, always within `[0, 1]`.
pub type SupportMap<K> = BTreeMap<K, f64>;

/// Reference defaults for a market-basket run.
pub const DEFAULT_MIN_ITEM_SUPPORT: f64 = 0.0;
pub const DEFAULT_MIN_PAIR_SUPPORT: f64 = 0.005;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.1;
pub const DEFAULT_TOP_N: usize = 10;
