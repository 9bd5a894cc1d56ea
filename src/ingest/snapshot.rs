//! Loading scraped snapshots (medal counts, medal events, sheet exports)
//! from JSON files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::warn;

use crate::core::resolver::ResolverPool;
use crate::domain::{MedalCount, MedalEvent, RawMedalEvent};

use super::sheet::Grid;

/// Parse scraped medal counts: `{"<country>": {"Gold": n, "Silver": n, "Bronze": n}}`.
///
/// Pool order is alphabetical by scraped name, so repeated runs over the
/// same snapshot resolve identically.
pub fn parse_counts(json: &str) -> Result<ResolverPool<MedalCount>> {
    let counts: BTreeMap<String, MedalCount> =
        serde_json::from_str(json).context("Failed to parse medal counts JSON")?;

    Ok(counts
        .into_iter()
        .map(|(name, count)| (name.trim().to_string(), count))
        .filter(|(name, _)| !name.is_empty())
        .collect())
}

/// Events parsed from a scrape, plus how many records were unusable
#[derive(Debug, Clone, Default)]
pub struct ParsedEvents {
    pub events: Vec<MedalEvent>,
    pub skipped: usize,
}

/// Parse scraped medal events. Records with an unknown medal color are
/// skipped with a warning rather than failing the whole file.
pub fn parse_events(json: &str) -> Result<ParsedEvents> {
    let raw: Vec<RawMedalEvent> =
        serde_json::from_str(json).context("Failed to parse medal events JSON")?;

    let mut parsed = ParsedEvents::default();
    for record in raw {
        let athlete = record.athlete.clone();
        match MedalEvent::try_from(record) {
            Ok(event) => parsed.events.push(event),
            Err(e) => {
                warn!(%athlete, error = %e, "Skipping medal event");
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

pub async fn load_counts(path: &Path) -> Result<ResolverPool<MedalCount>> {
    let json = read(path).await?;
    parse_counts(&json).with_context(|| format!("Invalid counts file: {}", path.display()))
}

pub async fn load_events(path: &Path) -> Result<ParsedEvents> {
    let json = read(path).await?;
    parse_events(&json).with_context(|| format!("Invalid events file: {}", path.display()))
}

pub async fn load_grid(path: &Path) -> Result<Grid> {
    load_json(path).await
}

async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = read(path).await?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

async fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input file: {}", path.display()))
}

/// Digest of a set of input documents (first 16 hex chars of SHA256).
///
/// Identifies the snapshot a run was computed from; identical inputs give
/// identical digests.
pub fn snapshot_digest<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        let bytes = part.as_ref();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hex::encode(&hasher.finalize()[..8])
}
