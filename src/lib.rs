//! podium - medal-table reconciliation for a country draft league
//!
//! Teams draft countries before the Games. Each pass takes a scraped medal
//! snapshot and reconciles it with the league's sheets: medal counts are
//! written into the results sheet, scored, totalled per team, and every new
//! medal is booked once into an append-only ledger under the team that owns
//! its country.
//!
//! # Architecture
//!
//! Names for the same country differ between sources ("USA" vs "United
//! States", "The Netherlands" vs "Netherlands"). Every cross-source lookup
//! goes through one resolver with a fixed rule order, so counts, totals,
//! standings and ledger attribution all agree on which country is which.
//!
//! # Modules
//!
//! - `domain`: Data structures (CountryName, Medal, MedalEvent, LedgerEntry)
//! - `core`: Reconciliation logic (resolver, scoring, teams, ledger, run)
//! - `ingest`: Sheet grids and scraped JSON snapshots
//! - `store`: JSONL ledger persistence
//! - `config`: Paths, aliases and league settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Full pass over a snapshot
//! podium run --counts counts.json --events events.json \
//!     --results results.json --draft draft.json --out out/
//!
//! # Which sheet name does a spelling resolve to?
//! podium resolve "The Netherlands" --candidate Netherlands --candidate Norway
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ingest;
pub mod store;

// Re-export main types at crate root for convenience
pub use core::{AliasTable, IdentityResolver, Reconciler, ResolverPool, RunReport, TeamAggregator};
pub use domain::{normalize, CountryName, LedgerEntry, Medal, MedalCount, MedalEvent, ScoreRecord};
pub use store::LedgerStore;
