use crate::domain::item::Item;
use crate::domain::transaction::TransactionTable;
use crate::mining::FrequencyMap;

/// Counts, per distinct item, how many transactions contain it.
///
/// Each transaction contributes at most once per item regardless of how
/// many slots repeat it.
pub fn count_items(table: &TransactionTable) -> FrequencyMap<Item> {
    let mut counts = FrequencyMap::new();
    for transaction in table {
        for item in transaction.items() {
            *counts.entry(item.clone()).or_insert(0) += 1;
        }
    }

    tracing::debug!(
        event_name = "mining.items.counted",
        n_transactions = table.n_transactions(),
        distinct_items = counts.len(),
        "item frequencies counted"
    );
    counts
}
