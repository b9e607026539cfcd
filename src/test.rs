//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{NewTransaction, Transaction, TransactionType};
use crate::store::{JsonStore, Store};
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up a loanbook home directory with Config and an empty data file.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with an initialized home directory.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("loanbook");
        let config = Config::create(&root, None).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Opens the data file of this environment.
    pub fn store(&self) -> JsonStore {
        self.config.store()
    }

    /// Inserts `records` in order and returns them with their assigned IDs.
    pub async fn insert(&self, records: Vec<NewTransaction>) -> Vec<Transaction> {
        let store = self.store();
        let mut inserted = Vec::new();
        for fields in records {
            inserted.push(store.insert(fields).await.unwrap());
        }
        inserted
    }

    /// Inserts one loan and two expenses spread over January and February 2024:
    /// - loan 1000 on 2024-01-15, "Bank loan"
    /// - expense 500 on 2024-01-20, Materials, "Cement"
    /// - expense 200 on 2024-02-05, Labor, "Mason wages"
    pub async fn insert_sample(&self) -> Vec<Transaction> {
        self.insert(sample()).await
    }
}

/// The records inserted by `TestEnv::insert_sample`.
pub fn sample() -> Vec<NewTransaction> {
    vec![
        NewTransaction::new(TransactionType::Loan, 1000, "2024-01-15")
            .with_description("Bank loan"),
        NewTransaction::new(TransactionType::Expense, 500, "2024-01-20")
            .with_category("Materials")
            .with_description("Cement"),
        NewTransaction::new(TransactionType::Expense, 200, "2024-02-05")
            .with_category("Labor")
            .with_description("Mason wages"),
    ]
}
