pub mod config;
pub mod domain;
pub mod errors;
pub mod loader;
pub mod mining;

pub use domain::item::{Item, Pair};
pub use domain::rule::Rule;
pub use domain::transaction::{Transaction, TransactionTable};
pub use errors::{ApplicationError, MiningError, Stage};
pub use loader::{load_transactions, load_transactions_file, InputSettings, LoadError};
pub use mining::{
    CatalogPolicy, FrequencyMap, MiningPipeline, MiningReport, MiningSettings, PairCatalog,
    ScanMode, SupportMap, Threshold,
};
