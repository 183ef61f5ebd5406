use serde::Serialize;
use tracing::info;

use crate::domain::item::{Item, Pair};
use crate::domain::rule::Rule;
use crate::domain::transaction::TransactionTable;
use crate::errors::MiningError;
use crate::mining::frequency::count_items;
use crate::mining::pairs::{count_pairs, CatalogPolicy, PairCatalog, ScanMode};
use crate::mining::rules::{generate_rules, truncate_top};
use crate::mining::support::{item_support, pair_support};
use crate::mining::threshold::Threshold;
use crate::mining::{
    FrequencyMap, SupportMap, DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_ITEM_SUPPORT,
    DEFAULT_MIN_PAIR_SUPPORT,
};

/// Validated parameters for one mining run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MiningSettings {
    pub min_item_support: Threshold,
    pub min_pair_support: Threshold,
    pub min_confidence: Threshold,
    pub top_n: Option<usize>,
    pub catalog_policy: CatalogPolicy,
    pub scan_mode: ScanMode,
}

impl MiningSettings {
    /// Validates raw threshold values, rejecting anything outside `[0, 1]`.
    pub fn from_raw(
        min_item_support: f64,
        min_pair_support: f64,
        min_confidence: f64,
    ) -> Result<Self, MiningError> {
        Ok(Self {
            min_item_support: Threshold::new("min_item_support", min_item_support)?,
            min_pair_support: Threshold::new("min_pair_support", min_pair_support)?,
            min_confidence: Threshold::new("min_confidence", min_confidence)?,
            ..Self::default()
        })
    }
}

/// The reference thresholds shared with the config defaults. `top_n` is
/// uncapped; only the CLI display is capped by default.
impl Default for MiningSettings {
    fn default() -> Self {
        Self {
            min_item_support: Threshold::constant(DEFAULT_MIN_ITEM_SUPPORT),
            min_pair_support: Threshold::constant(DEFAULT_MIN_PAIR_SUPPORT),
            min_confidence: Threshold::constant(DEFAULT_MIN_CONFIDENCE),
            top_n: None,
            catalog_policy: CatalogPolicy::AllObserved,
            scan_mode: ScanMode::Sequential,
        }
    }
}

/// Everything derived by a single run. Recomputed from the table each time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MiningReport {
    pub n_transactions: usize,
    pub n_items: usize,
    pub distinct_items: usize,
    pub candidate_pairs: usize,
    pub item_counts: FrequencyMap<Item>,
    pub item_support: SupportMap<Item>,
    #[serde(skip)]
    pub pair_counts: FrequencyMap<Pair>,
    #[serde(skip)]
    pub pair_support: SupportMap<Pair>,
    /// Ranked by lift and capped at `top_n`.
    pub rules: Vec<Rule>,
    /// Rules that passed the confidence filter before the `top_n` cap.
    pub total_rules: usize,
}

#[derive(Clone, Debug, Default)]
pub struct MiningPipeline {
    settings: MiningSettings,
}

impl MiningPipeline {
    pub fn new(settings: MiningSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MiningSettings {
        &self.settings
    }

    pub fn run(&self, table: &TransactionTable) -> Result<MiningReport, MiningError> {
        let settings = &self.settings;
        info!(
            event_name = "mining.pipeline.start",
            n_transactions = table.n_transactions(),
            n_items = table.n_items(),
            "starting mining run"
        );

        let item_counts = count_items(table);
        let item_support =
            item_support(&item_counts, table.n_transactions(), settings.min_item_support)?;

        let catalog = match settings.catalog_policy {
            CatalogPolicy::AllObserved => PairCatalog::from_items(item_counts.keys()),
            CatalogPolicy::SupportedOnly => PairCatalog::from_items(item_support.keys()),
        };
        info!(
            event_name = "mining.pairs.catalog_built",
            catalog_policy = ?settings.catalog_policy,
            catalog_items = catalog.items().len(),
            candidate_pairs = catalog.len(),
            "pair catalog built"
        );

        let pair_counts = count_pairs(table, &catalog, settings.scan_mode);
        let pair_support =
            pair_support(&pair_counts, table.n_transactions(), settings.min_pair_support)?;

        let ranked = generate_rules(&item_support, &pair_support, settings.min_confidence)?;
        let total_rules = ranked.len();
        let rules = truncate_top(ranked, settings.top_n);

        info!(
            event_name = "mining.pipeline.complete",
            distinct_items = item_counts.len(),
            co_occurring_pairs = pair_counts.len(),
            supported_pairs = pair_support.len(),
            total_rules,
            returned_rules = rules.len(),
            "mining run complete"
        );

        Ok(MiningReport {
            n_transactions: table.n_transactions(),
            n_items: table.n_items(),
            distinct_items: item_counts.len(),
            candidate_pairs: catalog.len(),
            item_counts,
            item_support,
            pair_counts,
            pair_support,
            rules,
            total_rules,
        })
    }
}
