//! Persistence of transactions.
//!
//! The `Store` trait is the seam between the commands and HTTP handlers on one side and the place
//! where records actually live on the other. `JsonStore` keeps them in a flat JSON file and
//! `MemoryStore` keeps them in process.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::model::{NewTransaction, Transaction, TransactionId};
use crate::Result;
use async_trait::async_trait;

/// The message used for every "no such transaction" error.
pub const NOT_FOUND: &str = "Transaction not found";

/// A collection of transactions that can be listed and changed one record at a time.
///
/// Reads return an owned snapshot, so a caller computing aggregates never observes a collection
/// that changes underneath it.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns every valid transaction in storage order.
    async fn list(&self) -> Result<Vec<Transaction>>;

    /// Returns the transaction with `id`, if there is one.
    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>>;

    /// Assigns a fresh ID to `fields` and appends the new transaction.
    async fn insert(&self, fields: NewTransaction) -> Result<Transaction>;

    /// Replaces every field of the transaction with `id` except the ID itself.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if no transaction has `id`
    /// - `ErrorType::Request` if `fields` are invalid
    async fn update(&self, id: &TransactionId, fields: NewTransaction) -> Result<Transaction>;

    /// Removes the transaction with `id` and returns it.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if no transaction has `id`
    async fn delete(&self, id: &TransactionId) -> Result<Transaction>;
}
