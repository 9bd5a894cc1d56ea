//! Admission of medal events into the append-only ledger.
//!
//! Events are deduplicated by signature (`{event}_{medal}_{athlete}`) and
//! attributed to the team that owns the medal's country. Entries are never
//! updated here except by the explicit [`EventLedger::repair`] pass.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{LedgerEntry, MedalEvent, FREE_AGENT};

use super::teams::TeamAggregator;

/// Result of offering one event to the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub admitted: bool,
    pub entry: Option<LedgerEntry>,
}

impl Admission {
    fn rejected() -> Self {
        Self {
            admitted: false,
            entry: None,
        }
    }
}

/// Result of admitting a batch of events
#[derive(Debug, Clone, Default)]
pub struct BatchAdmission {
    /// New entries, in input order
    pub entries: Vec<LedgerEntry>,

    /// Events skipped because their signature was already recorded
    pub duplicates: usize,

    /// New entries no team owns
    pub free_agents: usize,
}

/// A team correction applied to an existing entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repair {
    /// Position of the entry in the ledger
    pub index: usize,
    pub country: String,
    pub from: String,
    pub to: String,
}

/// Dedups and attributes medal events for one run.
pub struct EventLedger<'r> {
    owners: &'r TeamAggregator<'r>,
    capture_date: NaiveDate,
}

impl<'r> EventLedger<'r> {
    /// `capture_date` is the run's date: the day the medal was observed.
    pub fn new(owners: &'r TeamAggregator<'r>, capture_date: NaiveDate) -> Self {
        Self {
            owners,
            capture_date,
        }
    }

    pub fn capture_date(&self) -> NaiveDate {
        self.capture_date
    }

    /// Check one event against the recorded signatures.
    ///
    /// Does not record the signature; callers processing a batch must add it
    /// before offering the next event (see [`admit_batch`](Self::admit_batch)).
    pub fn admit(&self, event: &MedalEvent, existing: &HashSet<String>) -> Admission {
        let signature = event.signature();
        if existing.contains(&signature) {
            debug!(%signature, "Event already recorded");
            return Admission::rejected();
        }

        let team = self.owners.owner_of(event.country.display());
        if team == FREE_AGENT {
            warn!(country = %event.country, event = %event.event, "No team owns medal country");
        }

        Admission {
            admitted: true,
            entry: Some(LedgerEntry::new(event.clone(), team, self.capture_date)),
        }
    }

    /// Admit events in order, recording each new signature as it goes so a
    /// batch never produces two entries for the same medal.
    pub fn admit_batch<'e, I>(&self, events: I, signatures: &mut HashSet<String>) -> BatchAdmission
    where
        I: IntoIterator<Item = &'e MedalEvent>,
    {
        let mut outcome = BatchAdmission::default();

        for event in events {
            match self.admit(event, signatures) {
                Admission {
                    entry: Some(entry), ..
                } => {
                    signatures.insert(entry.signature());
                    if entry.team == FREE_AGENT {
                        outcome.free_agents += 1;
                    }
                    outcome.entries.push(entry);
                }
                _ => outcome.duplicates += 1,
            }
        }

        info!(
            admitted = outcome.entries.len(),
            duplicates = outcome.duplicates,
            free_agents = outcome.free_agents,
            "Ledger batch processed"
        );
        outcome
    }

    /// Fill in the team of unowned entries (Free Agent or blank) whose
    /// country now resolves to a team. Owned entries are left alone.
    pub fn repair(&self, entries: &mut [LedgerEntry]) -> Vec<Repair> {
        let mut repairs = Vec::new();

        for (index, entry) in entries.iter_mut().enumerate() {
            if !entry.is_unowned() {
                continue;
            }

            let owner = self.owners.owner_of(entry.country.display());
            if owner == FREE_AGENT || owner == entry.team {
                continue;
            }

            info!(index, country = %entry.country, from = %entry.team, to = owner, "Repairing ledger team");
            repairs.push(Repair {
                index,
                country: entry.country.display().to_string(),
                from: entry.team.clone(),
                to: owner.to_string(),
            });
            entry.team = owner.to_string();
        }

        repairs
    }
}
