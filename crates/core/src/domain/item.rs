use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque item identifier as it appears in a transaction cell.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(pub String);

impl Item {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Ordered 2-itemset. `(A, C)` and `(C, A)` are distinct pairs because
/// confidence and lift are directional.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub antecedent: Item,
    pub consequent: Item,
}

impl Pair {
    /// Returns `None` for a self-pair.
    pub fn new(antecedent: Item, consequent: Item) -> Option<Self> {
        (antecedent != consequent).then_some(Self { antecedent, consequent })
    }

    pub fn reversed(&self) -> Self {
        Self { antecedent: self.consequent.clone(), consequent: self.antecedent.clone() }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.antecedent, self.consequent)
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, Pair};

    #[test]
    fn self_pair_is_rejected() {
        assert!(Pair::new(Item::from("milk"), Item::from("milk")).is_none());
    }

    #[test]
    fn pairs_are_directional() {
        let forward = Pair::new(Item::from("bread"), Item::from("butter")).expect("distinct items");
        let backward = forward.reversed();

        assert_ne!(forward, backward);
        assert_eq!(backward.antecedent, Item::from("butter"));
        assert_eq!(forward.to_string(), "bread -> butter");
    }
}
