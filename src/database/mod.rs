pub mod models;
pub mod operations;

pub use models::{Balance, CurrencyBalance, ParsedOperation, Transaction, TransactionKind};
pub use operations::Database;
