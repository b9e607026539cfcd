//! Backup management for the data file. A copy is taken before every change to the data file.

use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Prefix for data file backups.
pub const DATA: &str = "data";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self::with_settings(config.backups(), config.backup_copies())
    }

    pub fn with_settings(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    /// Copies `data_file` into the backups directory.
    ///
    /// The filename format is `data.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file, or `None` if `data_file` does not exist yet.
    pub async fn save_data_file(&self, data_file: &Path) -> Result<Option<PathBuf>> {
        if !data_file.is_file() {
            return Ok(None);
        }
        let date = today();
        let seq = self.next_sequence_number(DATA, &date).await?;
        let path = self
            .backups_dir
            .join(format!("{DATA}.{date}-{seq:03}.{EXTENSION}"));

        utils::copy(data_file, &path).await?;
        self.rotate(DATA).await?;

        Ok(Some(path))
    }

    /// Scans the backups directory for files matching `{prefix}.{date}-NNN.json` and returns the
    /// next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, (NaiveDate, u32))> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(key) = parse_backup_name(&name, prefix) {
                files.push((entry.path(), key));
            }
        }

        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename of the form `{prefix}.{date}-NNN.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

/// Parses the date and sequence number out of `{prefix}.{date}-NNN.json`. The sequence number may
/// grow past three digits.
fn parse_backup_name(filename: &str, prefix: &str) -> Option<(NaiveDate, u32)> {
    let stem = filename
        .strip_prefix(&format!("{prefix}."))?
        .strip_suffix(&format!(".{EXTENSION}"))?;
    let (date, seq) = stem.rsplit_once('-')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((date, seq.parse().ok()?))
}
