use crate::domain::item::{Item, Pair};
use crate::domain::rule::Rule;
use crate::errors::MiningError;
use crate::mining::threshold::Threshold;
use crate::mining::SupportMap;

/// Builds one rule per pair, drops those under `min_confidence`, and ranks
/// the rest by lift (see [`Rule::rank_cmp`] for tie-breaks).
///
/// Every pair member must have a positive entry in `item_support`; a missing
/// entry is reported rather than treated as zero.
pub fn generate_rules(
    item_support: &SupportMap<Item>,
    pair_support: &SupportMap<Pair>,
    min_confidence: Threshold,
) -> Result<Vec<Rule>, MiningError> {
    let mut rules = Vec::new();
    for (pair, support) in pair_support {
        let antecedent_support = lookup(item_support, &pair.antecedent, pair)?;
        let consequent_support = lookup(item_support, &pair.consequent, pair)?;
        let confidence = support / antecedent_support;
        if !min_confidence.admits(confidence) {
            continue;
        }

        rules.push(Rule {
            antecedent: pair.antecedent.clone(),
            consequent: pair.consequent.clone(),
            antecedent_support,
            consequent_support,
            support: *support,
            confidence,
            lift: confidence / consequent_support,
        });
    }

    rules.sort_by(Rule::rank_cmp);

    tracing::debug!(
        event_name = "mining.rules.generated",
        candidate_pairs = pair_support.len(),
        min_confidence = min_confidence.value(),
        retained_rules = rules.len(),
        "association rules generated"
    );
    Ok(rules)
}

/// Keeps the first `limit` rules. `None` keeps everything.
pub fn truncate_top(mut rules: Vec<Rule>, limit: Option<usize>) -> Vec<Rule> {
    if let Some(limit) = limit {
        rules.truncate(limit);
    }
    rules
}

fn lookup(support: &SupportMap<Item>, item: &Item, pair: &Pair) -> Result<f64, MiningError> {
    let value = support
        .get(item)
        .copied()
        .ok_or_else(|| MiningError::MissingKey { item: item.clone(), pair: pair.clone() })?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(MiningError::NonPositiveSupport {
            item: item.clone(),
            pair: pair.clone(),
            support: value,
        })
    }
}
