use std::collections::BTreeSet;

use crate::domain::item::Item;

/// One basket: the raw fixed-width slots plus the deduplicated item set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    id: String,
    cells: Vec<Option<Item>>,
    items: BTreeSet<Item>,
}

impl Transaction {
    pub fn new(id: impl Into<String>, cells: Vec<Option<Item>>) -> Self {
        let items = cells.iter().flatten().cloned().collect();
        Self { id: id.into(), cells, items }
    }

    /// Convenience constructor for fully populated rows.
    pub fn from_items<I, T>(id: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        Self::new(id, items.into_iter().map(|item| Some(item.into())).collect())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cells(&self) -> &[Option<Item>] {
        &self.cells
    }

    /// Distinct items in this transaction. A repeated item appears once.
    pub fn items(&self) -> &BTreeSet<Item> {
        &self.items
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.items.contains(item)
    }

    fn pad_to(&mut self, width: usize) {
        if self.cells.len() < width {
            self.cells.resize(width, None);
        }
    }
}

/// Immutable set of transactions loaded once per run.
///
/// `n_items` is the slot width of a row, not the number of distinct items.
/// Both scalars are fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TransactionTable {
    transactions: Vec<Transaction>,
    n_items: usize,
}

impl TransactionTable {
    /// Builds a table whose width is the widest row. Narrower rows are padded
    /// with empty slots.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let width = transactions.iter().map(|transaction| transaction.cells.len()).max();
        Self::with_width(transactions, width.unwrap_or(0))
    }

    /// Builds a table with an explicit slot width (the column count of the
    /// source file). Rows wider than `width` widen the table.
    pub fn with_width(mut transactions: Vec<Transaction>, width: usize) -> Self {
        let widest = transactions.iter().map(|transaction| transaction.cells.len()).max();
        let n_items = width.max(widest.unwrap_or(0));
        for transaction in &mut transactions {
            transaction.pad_to(n_items);
        }
        Self { transactions, n_items }
    }

    pub fn n_transactions(&self) -> usize {
        self.transactions.len()
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }
}

impl<'a> IntoIterator for &'a TransactionTable {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
