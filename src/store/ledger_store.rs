//! Append-only medal ledger persisted as JSONL.
//!
//! One [`LedgerEntry`] per line. New entries are only ever appended; the
//! single exception is [`LedgerStore::rewrite`], used after a repair pass,
//! which replaces the file through a temp file and rename.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::domain::LedgerEntry;

/// Errors reading or writing the ledger file
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt ledger line {line} in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed ledger
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Open the ledger at `path`, creating its parent directory if needed.
    /// The file itself is created on first append.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerStoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry in file order
    pub async fn load(&self) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut entries = Vec::new();
        let mut line_no = 0;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let entry: LedgerEntry =
                serde_json::from_str(&line).map_err(|source| LedgerStoreError::Corrupt {
                    path: self.path.clone(),
                    line: line_no,
                    source,
                })?;
            entries.push(entry);
        }

        debug!(path = %self.path.display(), entries = entries.len(), "Loaded ledger");
        Ok(entries)
    }

    /// Signatures of every recorded entry
    pub async fn signatures(&self) -> Result<HashSet<String>, LedgerStoreError> {
        Ok(self.load().await?.iter().map(LedgerEntry::signature).collect())
    }

    /// Append entries to the end of the file
    pub async fn append_all(&self, entries: &[LedgerEntry]) -> Result<(), LedgerStoreError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for entry in entries {
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        info!(path = %self.path.display(), appended = entries.len(), "Appended ledger entries");
        Ok(())
    }

    /// Replace the whole file. Readers see either the old or the new ledger.
    pub async fn rewrite(&self, entries: &[LedgerEntry]) -> Result<(), LedgerStoreError> {
        let mut buf = String::new();
        for entry in entries {
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        {
            let mut file = File::create(&tmp).await?;
            file.write_all(buf.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await?;
        }
        fs::rename(&tmp, &self.path).await?;

        info!(path = %self.path.display(), entries = entries.len(), "Rewrote ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use crate::domain::{Medal, MedalEvent, FREE_AGENT};

    async fn create_test_store() -> (LedgerStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = LedgerStore::open(temp.path().join("ledger.jsonl")).await.unwrap();
        (store, temp)
    }

    fn entry(event: &str, team: &str) -> LedgerEntry {
        LedgerEntry::new(
            MedalEvent::new(event, Medal::Gold, "Someone", "Norway"),
            team,
            NaiveDate::from_ymd_opt(2026, 2, 7).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (store, _temp) = create_test_store().await;
        assert!(store.load().await.unwrap().is_empty());
        assert!(store.signatures().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let (store, _temp) = create_test_store().await;

        store.append_all(&[entry("Sprint", "Team A")]).await.unwrap();
        store
            .append_all(&[entry("Relay", FREE_AGENT), entry("Pursuit", "Team B")])
            .await
            .unwrap();

        let entries = store.load().await.unwrap();
        let events: Vec<_> = entries.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(events, vec!["Sprint", "Relay", "Pursuit"]);
        assert!(store.signatures().await.unwrap().contains("Relay_Gold_Someone"));
    }

    #[tokio::test]
    async fn test_rewrite_replaces_contents() {
        let (store, temp) = create_test_store().await;
        store
            .append_all(&[entry("Sprint", FREE_AGENT), entry("Relay", "Team B")])
            .await
            .unwrap();

        let mut entries = store.load().await.unwrap();
        entries[0].team = "Team A".to_string();
        store.rewrite(&entries).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded, entries);
        assert!(!temp.path().join("ledger.jsonl.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_line_reports_position() {
        let (store, _temp) = create_test_store().await;
        store.append_all(&[entry("Sprint", "Team A")]).await.unwrap();
        tokio::fs::write(
            store.path(),
            format!("{}\nnot json\n", serde_json::to_string(&entry("Sprint", "Team A")).unwrap()),
        )
        .await
        .unwrap();

        match store.load().await {
            Err(LedgerStoreError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corrupt line error, got {:?}", other),
        }
    }
}
