//! Reconciliation logic.
//!
//! This module contains:
//! - Alias: Common/formal country name pairs
//! - Resolver: Fuzzy name resolution against keyed pools
//! - Scoring: Weighted and multiplied scores
//! - Teams: Rosters, per-team totals, country ownership
//! - Ledger: Dedup and attribution of medal events
//! - Results / Standings: Sheet-shaped outputs
//! - Run: One pass over every stage

pub mod alias;
pub mod ledger;
pub mod resolver;
pub mod results;
pub mod run;
pub mod scoring;
pub mod standings;
pub mod teams;

// Re-export commonly used types
pub use alias::{AliasPair, AliasTable};
pub use ledger::{Admission, BatchAdmission, EventLedger, Repair};
pub use resolver::{IdentityResolver, MatchKind, Resolved, ResolverPool};
pub use results::{reconcile_results, ResultsReconciliation};
pub use run::{Reconciler, RunInputs, RunOutcome, RunReport, Stage, StageStatus, StageSummary};
pub use scoring::{parse_count, parse_multiplier, score, score_rows, Parsed};
pub use standings::{standings, StandingRow};
pub use teams::{TeamAggregator, TeamRoster, TeamTotals, Totals, TotalsPlacement};
