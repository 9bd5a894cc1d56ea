//! Input boundary: already-scraped snapshots and spreadsheet exports.
//!
//! This module contains:
//! - Sheet: Text grids, header detection, results rows, draft roster
//! - Snapshot: JSON loaders for medal counts and medal events

pub mod sheet;
pub mod snapshot;

pub use sheet::{draft_roster, results_rows, DraftSheet, Grid, ResultsLayout, ResultsRow, SheetError};
pub use snapshot::{load_counts, load_events, load_grid, parse_counts, parse_events, snapshot_digest, ParsedEvents};
