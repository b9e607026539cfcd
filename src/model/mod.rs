//! Types that represent the core data model, such as `Transaction` and `FilterCriteria`.
mod amount;
mod filter;
mod transaction;

pub use amount::{Amount, AmountError};
pub use filter::FilterCriteria;
pub use transaction::{
    NewTransaction, Transaction, TransactionDate, TransactionId, TransactionType,
};
