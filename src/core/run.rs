//! One reconciliation pass over a snapshot.
//!
//! Stages run in a fixed order, each reporting its own outcome:
//!
//! 1. results: write scraped counts into the results grid, append new countries
//! 2. totals: score the updated grid and total it per drafted team
//! 3. ledger: admit new medal events, attributed to their owning team
//! 4. repair: give unowned ledger entries the team that now owns them
//!
//! A structural failure in one stage does not stop the others. Ledger and
//! repair are skipped when no roster could be read, since every event would
//! otherwise be booked to a Free Agent.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{LedgerEntry, MedalCount, MedalEvent};
use crate::ingest::{draft_roster, results_rows, DraftSheet, Grid};

use super::alias::AliasTable;
use super::ledger::{EventLedger, Repair};
use super::resolver::{IdentityResolver, ResolverPool};
use super::results::reconcile_results;
use super::scoring::score_rows;
use super::standings::{standings, StandingRow};
use super::teams::{
    Contested, TeamAggregator, Totals, TotalsPlacement, DEFAULT_MIN_TOTALS_ROW, LABEL_COLUMN,
    MULTIPLIED_LABEL, WEIGHTED_LABEL,
};

pub const RESULTS_SHEET: &str = "Results";
pub const DRAFT_SHEET: &str = "Draft";

/// Reconciliation stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Results,
    Totals,
    Ledger,
    Repair,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Results => "results",
            Stage::Totals => "totals",
            Stage::Ledger => "ledger",
            Stage::Repair => "repair",
        };
        f.pad(name)
    }
}

/// Counters for a completed stage. Fields a stage has no use for stay zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageSummary {
    pub processed: usize,
    pub matched: usize,
    pub unresolved: Vec<String>,
    pub defaulted: usize,
    pub appended: usize,
    pub admitted: usize,
    pub duplicates: usize,
    pub repaired: usize,
}

/// Outcome of a stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Completed(StageSummary),
    Failed { error: String },
    Skipped { reason: String },
}

impl StageStatus {
    pub fn summary(&self) -> Option<&StageSummary> {
        match self {
            StageStatus::Completed(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,

    #[serde(flatten)]
    pub status: StageStatus,
}

/// What a pass did, stage by stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub capture_date: NaiveDate,

    /// Digest of the snapshot the pass ran over
    pub snapshot_digest: String,

    pub stages: Vec<StageReport>,
}

impl RunReport {
    fn new(capture_date: NaiveDate, snapshot_digest: String) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            capture_date,
            snapshot_digest,
            stages: Vec::new(),
        }
    }

    fn record(&mut self, stage: Stage, status: StageStatus) {
        match &status {
            StageStatus::Completed(summary) => info!(
                %stage,
                processed = summary.processed,
                matched = summary.matched,
                unresolved = summary.unresolved.len(),
                "Stage completed"
            ),
            StageStatus::Failed { error } => error!(%stage, %error, "Stage failed"),
            StageStatus::Skipped { reason } => warn!(%stage, %reason, "Stage skipped"),
        }
        self.stages.push(StageReport { stage, status });
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageStatus> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| &s.status)
    }

    pub fn has_failures(&self) -> bool {
        self.stages.iter().any(|s| s.status.is_failed())
    }
}

/// Team totals plus where they go on the draft sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftTotals {
    pub totals: Totals,
    pub placement: TotalsPlacement,
    pub contested: Vec<Contested>,
}

impl DraftTotals {
    /// Write labels and per-team totals into the draft grid.
    ///
    /// A team in the label column gets its totals written over the labels.
    pub fn apply(&self, grid: &mut Grid, team_columns: &[(usize, String)]) {
        let weighted = self.placement.weighted_row - 1;
        let multiplied = self.placement.multiplied_row - 1;

        if let Some(team) = label_column_team(team_columns) {
            warn!(team = %team, column = LABEL_COLUMN, "Team column holds the totals labels; labels will be overwritten");
        }

        grid.set(weighted, LABEL_COLUMN, WEIGHTED_LABEL);
        grid.set(multiplied, LABEL_COLUMN, MULTIPLIED_LABEL);

        for (col, team) in team_columns {
            if let Some(totals) = self.totals.get(team) {
                grid.set(weighted, *col, totals.total_weight.to_string());
                grid.set(multiplied, *col, totals.total_final_score.to_string());
            }
        }
    }
}

/// Team whose column is the totals label column, if any
pub fn label_column_team(team_columns: &[(usize, String)]) -> Option<&str> {
    team_columns
        .iter()
        .find(|(col, _)| *col == LABEL_COLUMN)
        .map(|(_, team)| team.as_str())
}

/// Everything a pass reads
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub counts: ResolverPool<MedalCount>,
    pub events: Vec<MedalEvent>,
    pub results: Grid,
    pub draft: Grid,

    /// Ledger as currently stored
    pub ledger: Vec<LedgerEntry>,

    pub snapshot_digest: String,
}

/// Everything a pass produces
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,

    /// Results grid with counts written and new countries appended
    pub results: Grid,

    /// Draft grid with totals written (unchanged if the roster or results were unreadable)
    pub draft: Grid,

    pub totals: Option<DraftTotals>,
    pub standings: Vec<StandingRow>,

    /// Entries to append to the ledger
    pub new_entries: Vec<LedgerEntry>,

    /// Existing ledger after repair
    pub ledger: Vec<LedgerEntry>,
    pub repairs: Vec<Repair>,
}

/// Runs every stage over one snapshot.
pub struct Reconciler<'a> {
    aliases: &'a AliasTable,
    capture_date: NaiveDate,
    min_totals_row: usize,
}

impl<'a> Reconciler<'a> {
    pub fn new(aliases: &'a AliasTable, capture_date: NaiveDate) -> Self {
        Self {
            aliases,
            capture_date,
            min_totals_row: DEFAULT_MIN_TOTALS_ROW,
        }
    }

    pub fn with_min_totals_row(mut self, row: usize) -> Self {
        self.min_totals_row = row;
        self
    }

    #[instrument(skip_all, fields(digest = %inputs.snapshot_digest))]
    pub fn run(&self, inputs: RunInputs) -> RunOutcome {
        let RunInputs {
            counts,
            events,
            mut results,
            mut draft,
            mut ledger,
            snapshot_digest,
        } = inputs;

        let mut report = RunReport::new(self.capture_date, snapshot_digest);
        let resolver = IdentityResolver::new(self.aliases);
        info!(run_id = %report.run_id, capture_date = %self.capture_date, "Starting reconciliation");

        // 1. Results
        let status = match reconcile_results(&results, &counts, &resolver, RESULTS_SHEET) {
            Ok(rec) => {
                rec.apply(&mut results);
                StageStatus::Completed(StageSummary {
                    processed: rec.processed,
                    matched: rec.updates.len(),
                    unresolved: rec.unresolved,
                    appended: rec.appended.len(),
                    ..Default::default()
                })
            }
            Err(e) => StageStatus::Failed {
                error: e.to_string(),
            },
        };
        report.record(Stage::Results, status);

        // 2. Totals, scored from the updated grid
        let scored = results_rows(&results, RESULTS_SHEET).map(|(_, rows)| score_rows(&rows));

        let sheet: Option<DraftSheet> = match draft_roster(&draft, DRAFT_SHEET) {
            Ok(sheet) => Some(sheet),
            Err(e) => {
                report.record(
                    Stage::Totals,
                    StageStatus::Failed {
                        error: e.to_string(),
                    },
                );
                None
            }
        };

        let Some(sheet) = sheet else {
            let reason = format!("no roster could be read from the {DRAFT_SHEET} sheet");
            report.record(Stage::Ledger, StageStatus::Skipped { reason: reason.clone() });
            report.record(Stage::Repair, StageStatus::Skipped { reason });

            return RunOutcome {
                report,
                results,
                draft,
                totals: None,
                standings: Vec::new(),
                new_entries: Vec::new(),
                ledger,
                repairs: Vec::new(),
            };
        };

        let aggregator = TeamAggregator::new(&sheet.roster, self.aliases);

        // Without readable results the draft grid is left as it was
        let (draft_totals, standings) = match scored {
            Ok(scored) => {
                let totals = aggregator.aggregate(&scored.scores);
                let matched: usize = totals.iter().map(|t| t.matched).sum();
                let unresolved: Vec<String> =
                    totals.iter().flat_map(|t| t.unresolved.iter().cloned()).collect();

                let draft_totals = DraftTotals {
                    totals,
                    placement: TotalsPlacement::below(sheet.last_roster_row, self.min_totals_row),
                    contested: aggregator.contested().to_vec(),
                };
                draft_totals.apply(&mut draft, &sheet.team_columns);
                let standings = standings(&sheet.roster, &scored.scores, &resolver);

                report.record(
                    Stage::Totals,
                    StageStatus::Completed(StageSummary {
                        processed: sheet.roster.country_count(),
                        matched,
                        unresolved,
                        defaulted: scored.defaulted,
                        duplicates: scored.duplicates.len(),
                        ..Default::default()
                    }),
                );
                (Some(draft_totals), standings)
            }
            Err(e) => {
                report.record(
                    Stage::Totals,
                    StageStatus::Failed {
                        error: e.to_string(),
                    },
                );
                (None, Vec::new())
            }
        };

        // 3. Ledger
        let event_ledger = EventLedger::new(&aggregator, self.capture_date);
        let mut signatures: HashSet<String> = ledger.iter().map(LedgerEntry::signature).collect();
        let batch = event_ledger.admit_batch(&events, &mut signatures);

        report.record(
            Stage::Ledger,
            StageStatus::Completed(StageSummary {
                processed: events.len(),
                matched: batch.entries.len() - batch.free_agents,
                unresolved: batch
                    .entries
                    .iter()
                    .filter(|e| e.is_unowned())
                    .map(|e| e.country.display().to_string())
                    .collect(),
                admitted: batch.entries.len(),
                duplicates: batch.duplicates,
                ..Default::default()
            }),
        );

        // 4. Repair existing entries
        let unowned = ledger.iter().filter(|e| e.is_unowned()).count();
        let repairs = event_ledger.repair(&mut ledger);
        report.record(
            Stage::Repair,
            StageStatus::Completed(StageSummary {
                processed: unowned,
                repaired: repairs.len(),
                ..Default::default()
            }),
        );

        RunOutcome {
            report,
            results,
            draft,
            totals: draft_totals,
            standings,
            new_entries: batch.entries,
            ledger,
            repairs,
        }
    }
}
