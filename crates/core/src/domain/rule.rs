use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::item::{Item, Pair};

/// Directional association rule `antecedent -> consequent`.
///
/// Invariants: `confidence == support / antecedent_support` and
/// `lift == confidence / consequent_support`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub antecedent: Item,
    pub consequent: Item,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    /// Support of the pair.
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}

impl Rule {
    pub fn pair(&self) -> Pair {
        Pair { antecedent: self.antecedent.clone(), consequent: self.consequent.clone() }
    }

    /// Ranking order: lift descending, then confidence descending, then
    /// antecedent and consequent ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .lift
            .total_cmp(&self.lift)
            .then_with(|| other.confidence.total_cmp(&self.confidence))
            .then_with(|| self.antecedent.cmp(&other.antecedent))
            .then_with(|| self.consequent.cmp(&other.consequent))
    }
}
