//! Reconciling the results sheet with a scraped medal table.
//!
//! Each sheet country is resolved against the scraped names and gets its
//! counts written back. Scraped countries no row claimed are appended to the
//! sheet, so a new medal-winning nation shows up without manual entry.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::domain::MedalCount;
use crate::ingest::{results_rows, Grid, ResultsLayout, SheetError};

use super::resolver::{IdentityResolver, MatchKind, ResolverPool};

/// Counts to write into an existing sheet row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowUpdate {
    /// 1-based sheet row
    pub row: usize,
    pub country: String,
    pub counts: MedalCount,

    /// Scraped name the row resolved to
    pub matched_key: String,
    pub kind: MatchKind,
}

/// A scraped country missing from the sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppendedCountry {
    pub country: String,
    pub counts: MedalCount,
}

/// Everything the results stage will write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsReconciliation {
    pub layout: ResultsLayout,
    pub updates: Vec<RowUpdate>,
    pub appended: Vec<AppendedCountry>,

    /// Sheet countries with no scraped counts (left untouched)
    pub unresolved: Vec<String>,

    /// Sheet rows with a country
    pub processed: usize,
}

/// Match sheet rows against scraped counts.
///
/// Fails without producing any writes when a required header is missing.
#[instrument(skip_all, fields(scraped = scraped.len()))]
pub fn reconcile_results(
    grid: &Grid,
    scraped: &ResolverPool<MedalCount>,
    resolver: &IdentityResolver<'_>,
    sheet: &str,
) -> Result<ResultsReconciliation, SheetError> {
    let (layout, rows) = results_rows(grid, sheet)?;

    let mut updates = Vec::new();
    let mut unresolved = Vec::new();
    let mut claimed: HashSet<&str> = HashSet::new();

    for row in &rows {
        match resolver.resolve_match(&row.country, scraped) {
            Some(found) => {
                claimed.insert(found.key);
                updates.push(RowUpdate {
                    row: row.row,
                    country: row.country.clone(),
                    counts: *found.value,
                    matched_key: found.key.to_string(),
                    kind: found.kind,
                });
            }
            None => {
                warn!(row = row.row, country = %row.country, "No scraped counts for sheet country");
                unresolved.push(row.country.clone());
            }
        }
    }

    let appended: Vec<AppendedCountry> = scraped
        .iter()
        .filter(|(key, _)| !claimed.contains(key))
        .map(|(key, counts)| AppendedCountry {
            country: key.to_string(),
            counts: *counts,
        })
        .collect();

    info!(
        rows = rows.len(),
        updated = updates.len(),
        appended = appended.len(),
        unresolved = unresolved.len(),
        "Results reconciled"
    );

    Ok(ResultsReconciliation {
        layout,
        updates,
        appended,
        unresolved,
        processed: rows.len(),
    })
}

impl ResultsReconciliation {
    /// Write updates and appended rows into the grid.
    ///
    /// Appended rows carry a multiplier of 1 when the sheet has that column.
    pub fn apply(&self, grid: &mut Grid) {
        let layout = &self.layout;

        for update in &self.updates {
            let r = update.row - 1;
            grid.set(r, layout.gold, update.counts.gold.to_string());
            grid.set(r, layout.silver, update.counts.silver.to_string());
            grid.set(r, layout.bronze, update.counts.bronze.to_string());
        }

        for added in &self.appended {
            let mut row = vec![String::new(); layout.width()];
            row[layout.country] = added.country.clone();
            row[layout.gold] = added.counts.gold.to_string();
            row[layout.silver] = added.counts.silver.to_string();
            row[layout.bronze] = added.counts.bronze.to_string();
            if let Some(col) = layout.multiplier {
                row[col] = "1".to_string();
            }
            grid.push_row(row);
        }
    }
}
