use crate::backup::Backup;
use crate::error::{not_found, ErrorType, IntoResult};
use crate::model::{NewTransaction, Transaction, TransactionId};
use crate::store::{Store, NOT_FOUND};
use crate::{utils, Result};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Stores transactions as a pretty-printed JSON array in a single file.
///
/// Every mutation reads the file, changes it and writes it back while holding a lock, so two
/// concurrent mutations through the same `JsonStore` never lose each other's changes. A write
/// goes to a temporary sibling that is then renamed over the data file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    backup: Option<Backup>,
    lock: Mutex<()>,
}

/// A record as found in the data file.
#[derive(Debug, Clone)]
enum Entry {
    Valid(Transaction),
    /// A record that could not be read as a transaction. It is hidden from readers but written
    /// back exactly as it was found.
    Quarantined(Value),
}

impl Entry {
    fn transaction(&self) -> Option<&Transaction> {
        match self {
            Entry::Valid(t) => Some(t),
            Entry::Quarantined(_) => None,
        }
    }

    fn is(&self, id: &TransactionId) -> bool {
        self.transaction().is_some_and(|t| t.id() == id)
    }

    fn into_value(self) -> Result<Value> {
        match self {
            Entry::Valid(t) => {
                serde_json::to_value(&t).context("Unable to serialize a transaction")
            }
            Entry::Quarantined(v) => Ok(v),
        }
    }
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
            lock: Mutex::new(()),
        }
    }

    /// Copy the data file into the backups directory before each change.
    pub fn with_backup(mut self, backup: Backup) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in the file. A missing file, or one that does not hold a JSON array,
    /// reads as empty.
    async fn load(&self) -> Result<Vec<Entry>> {
        if !self.path.exists() {
            debug!("No data file at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }
        let content = utils::read(&self.path).await?;
        let records = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                warn!(
                    "The data file {} does not hold a JSON array, treating it as empty",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!(
                    "Unable to parse the data file {}, treating it as empty: {e}",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
        };

        let entries = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| match Transaction::from_value(record.clone()) {
                Ok(t) => Entry::Valid(t),
                Err(e) => {
                    warn!("Skipping record {i} of {}: {e:#}", self.path.display());
                    Entry::Quarantined(record)
                }
            })
            .collect();
        Ok(entries)
    }

    async fn save(&self, entries: Vec<Entry>) -> Result<()> {
        let values = entries
            .into_iter()
            .map(Entry::into_value)
            .collect::<Result<Vec<_>>>()?;
        let data =
            serde_json::to_string_pretty(&values).context("Unable to serialize transactions")?;

        if let Some(backup) = &self.backup {
            if let Some(saved) = backup.save_data_file(&self.path).await? {
                debug!("Backed up the data file to {}", saved.display());
            }
        }
        utils::write_replace(&self.path, data)
            .await
            .with_context(|| format!("Unable to save transactions to {}", self.path.display()))
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn list(&self) -> Result<Vec<Transaction>> {
        let _guard = self.lock.lock().await;
        let entries = self.load().await?;
        Ok(entries
            .into_iter()
            .filter_map(|e| match e {
                Entry::Valid(t) => Some(t),
                Entry::Quarantined(_) => None,
            })
            .collect())
    }

    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        let _guard = self.lock.lock().await;
        let entries = self.load().await?;
        Ok(entries
            .iter()
            .find_map(|e| e.transaction().filter(|t| t.id() == id).cloned()))
    }

    async fn insert(&self, fields: NewTransaction) -> Result<Transaction> {
        let transaction =
            Transaction::new(TransactionId::generate(), fields).pub_result(ErrorType::Request)?;

        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.push(Entry::Valid(transaction.clone()));
        self.save(entries).await?;
        Ok(transaction)
    }

    async fn update(&self, id: &TransactionId, fields: NewTransaction) -> Result<Transaction> {
        let transaction = Transaction::new(id.clone(), fields).pub_result(ErrorType::Request)?;

        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let entry = entries
            .iter_mut()
            .find(|e| e.is(id))
            .ok_or_else(|| not_found(NOT_FOUND))?;
        *entry = Entry::Valid(transaction.clone());
        self.save(entries).await?;
        Ok(transaction)
    }

    async fn delete(&self, id: &TransactionId) -> Result<Transaction> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let index = entries
            .iter()
            .position(|e| e.is(id))
            .ok_or_else(|| not_found(NOT_FOUND))?;
        let removed = entries.remove(index);
        self.save(entries).await?;
        match removed {
            Entry::Valid(t) => Ok(t),
            Entry::Quarantined(_) => Err(not_found(NOT_FOUND)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, TransactionType};
    use tempfile::TempDir;

    fn expense(amount: i64, date: &str) -> NewTransaction {
        NewTransaction::new(TransactionType::Expense, amount, date)
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("data.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        utils::write(&path, "this is not json").await.unwrap();
        let store = JsonStore::new(&path);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonStore::new(&path);

        let first = store
            .insert(expense(500, "2024-01-20").with_category("Materials"))
            .await
            .unwrap();
        let second = store.insert(expense(50, "2024-01-21")).await.unwrap();
        assert_ne!(first.id(), second.id());

        let reopened = JsonStore::new(&path);
        let listed = reopened.list().await.unwrap();
        assert_eq!(listed, vec![first.clone(), second]);
        assert_eq!(
            reopened.get(first.id()).await.unwrap().unwrap().category(),
            Some("Materials")
        );
    }

    #[tokio::test]
    async fn test_insert_rejects_negative_amount() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("data.json"));
        let err = store.insert(expense(-5, "2024-01-20")).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_keeps_id() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("data.json"));
        let original = store
            .insert(expense(500, "2024-01-20").with_description("cement"))
            .await
            .unwrap();

        let replacement = NewTransaction::new(TransactionType::Loan, 900, "2024-02-01");
        let updated = store.update(original.id(), replacement).await.unwrap();
        assert_eq!(updated.id(), original.id());
        assert_eq!(updated.kind(), TransactionType::Loan);
        assert_eq!(updated.amount(), Amount::from(900));
        assert_eq!(updated.description(), "");

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("data.json"));
        store.insert(expense(1, "2024-01-01")).await.unwrap();
        let id: TransactionId = "nope".parse().unwrap();

        let err = store
            .update(&id, expense(2, "2024-01-02"))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
        assert_eq!(err.to_string(), NOT_FOUND);

        let err = store.delete(&id).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("data.json"));
        let a = store.insert(expense(1, "2024-01-01")).await.unwrap();
        let b = store.insert(expense(2, "2024-01-02")).await.unwrap();

        let removed = store.delete(a.id()).await.unwrap();
        assert_eq!(removed, a);
        assert_eq!(store.list().await.unwrap(), vec![b]);
        assert!(store.get(a.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_legacy_numeric_ids_and_quarantine() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let original = r#"[
            {"id": 1718000000000, "type": "loan", "amount": 1000, "date": "2024-01-15", "description": "bank"},
            {"id": 1718000000001, "type": "expense", "date": "2024-01-16"},
            {"id": 1718000000002, "type": "expense", "amount": 20.5, "date": "someday"}
        ]"#;
        utils::write(&path, original).await.unwrap();
        let store = JsonStore::new(&path);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id().as_str(), "1718000000000");
        assert_eq!(listed[1].date().date(), None);

        // A legacy ID can be addressed by its string form.
        let id: TransactionId = "1718000000000".parse().unwrap();
        store.delete(&id).await.unwrap();

        // The record without an amount survives the rewrite untouched.
        let saved: Vec<Value> = utils::deserialize(&path).await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(
            saved[0],
            serde_json::json!({"id": 1718000000001u64, "type": "expense", "date": "2024-01-16"})
        );
        assert_eq!(saved[1]["date"], "someday");
    }

    #[tokio::test]
    async fn test_mutation_takes_backup() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join("backups");
        utils::make_dir(&backups).await.unwrap();
        let path = dir.path().join("data.json");
        utils::write(&path, "[]").await.unwrap();

        let store = JsonStore::new(&path).with_backup(Backup::with_settings(&backups, 5));
        store.insert(expense(1, "2024-01-01")).await.unwrap();
        store.insert(expense(2, "2024-01-02")).await.unwrap();

        let mut count = 0;
        let mut entries = utils::read_dir(&backups).await.unwrap();
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
    }
}
