//! Domain types for the medal reconciliation engine.
//!
//! This module contains the core data structures:
//! - Country: Country names and their normalized comparison keys
//! - Medal: Medal counts and individual medal events
//! - Score: Per-country derived scores
//! - Ledger: Team-attributed medal events

pub mod country;
pub mod ledger;
pub mod medal;
pub mod score;

// Re-export commonly used types
pub use country::{normalize, CountryName};
pub use ledger::{LedgerEntry, FREE_AGENT};
pub use medal::{Medal, MedalCount, MedalEvent, MedalParseError, RawMedalEvent};
pub use score::ScoreRecord;
