use crate::error::{not_found, ErrorType, IntoResult};
use crate::model::{NewTransaction, Transaction, TransactionId};
use crate::store::{Store, NOT_FOUND};
use crate::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Keeps transactions in process. Nothing is written anywhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    transactions: RwLock<Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `transactions` already in the store.
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: RwLock::new(transactions),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.read().await.clone())
    }

    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .find(|t| t.id() == id)
            .cloned())
    }

    async fn insert(&self, fields: NewTransaction) -> Result<Transaction> {
        let transaction =
            Transaction::new(TransactionId::generate(), fields).pub_result(ErrorType::Request)?;
        self.transactions.write().await.push(transaction.clone());
        Ok(transaction)
    }

    async fn update(&self, id: &TransactionId, fields: NewTransaction) -> Result<Transaction> {
        let transaction = Transaction::new(id.clone(), fields).pub_result(ErrorType::Request)?;
        let mut transactions = self.transactions.write().await;
        let existing = transactions
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| not_found(NOT_FOUND))?;
        *existing = transaction.clone();
        Ok(transaction)
    }

    async fn delete(&self, id: &TransactionId) -> Result<Transaction> {
        let mut transactions = self.transactions.write().await;
        let index = transactions
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| not_found(NOT_FOUND))?;
        Ok(transactions.remove(index))
    }
}
