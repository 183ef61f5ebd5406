use crate::domain::item::{Item, Pair};
use crate::errors::{MiningError, Stage};
use crate::mining::threshold::Threshold;
use crate::mining::{FrequencyMap, SupportMap};

/// Converts counts into support ratios `count / n_transactions`, keeping
/// entries whose support is at least `min_support`.
///
/// The zero-transaction case is reported as [`MiningError::EmptyDataset`]
/// before any ratio is computed.
pub fn compute_support<K: Ord + Clone>(
    frequency: &FrequencyMap<K>,
    n_transactions: usize,
    min_support: Threshold,
    stage: Stage,
) -> Result<SupportMap<K>, MiningError> {
    if n_transactions == 0 {
        return Err(MiningError::EmptyDataset { stage });
    }

    let denominator = n_transactions as f64;
    let support: SupportMap<K> = frequency
        .iter()
        .filter_map(|(key, count)| {
            let ratio = *count as f64 / denominator;
            min_support.admits(ratio).then(|| (key.clone(), ratio))
        })
        .collect();

    tracing::debug!(
        event_name = "mining.support.computed",
        stage = %stage,
        min_support = min_support.value(),
        input_entries = frequency.len(),
        retained_entries = support.len(),
        "support ratios computed"
    );
    Ok(support)
}

pub fn item_support(
    frequency: &FrequencyMap<Item>,
    n_transactions: usize,
    min_support: Threshold,
) -> Result<SupportMap<Item>, MiningError> {
    compute_support(frequency, n_transactions, min_support, Stage::ItemSupport)
}

pub fn pair_support(
    frequency: &FrequencyMap<Pair>,
    n_transactions: usize,
    min_support: Threshold,
) -> Result<SupportMap<Pair>, MiningError> {
    compute_support(frequency, n_transactions, min_support, Stage::PairSupport)
}
