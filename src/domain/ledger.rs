//! Ledger entries: medal events attributed to a team on the day they were seen.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::country::CountryName;
use super::medal::{signature, Medal, MedalEvent};

/// Team value for a country nobody drafted.
pub const FREE_AGENT: &str = "Free Agent";

/// One row of the append-only medal ledger.
///
/// `date` is the date the medal was first observed by a run, not the date
/// it was awarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub country: CountryName,
    pub medal: Medal,
    pub event: String,
    pub athlete: String,
    pub team: String,
}

impl LedgerEntry {
    pub fn new(event: MedalEvent, team: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            date,
            country: event.country,
            medal: event.medal,
            event: event.event,
            athlete: event.athlete,
            team: team.into(),
        }
    }

    pub fn signature(&self) -> String {
        signature(&self.event, self.medal.as_str(), &self.athlete)
    }

    /// True when no team owned the country at admission time
    pub fn is_unowned(&self) -> bool {
        let team = self.team.trim();
        team.is_empty() || team == FREE_AGENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_signature_matches_event_signature() {
        let event = MedalEvent::new("Slalom", Medal::Bronze, "Some Skier", "Norway");
        let sig = event.signature();
        let entry = LedgerEntry::new(event, "Team A", NaiveDate::from_ymd_opt(2026, 2, 8).unwrap());

        assert_eq!(entry.signature(), sig);
        assert!(!entry.is_unowned());
    }

    #[test]
    fn test_unowned_detection() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        let event = MedalEvent::new("Slalom", Medal::Bronze, "Some Skier", "Norway");

        assert!(LedgerEntry::new(event.clone(), FREE_AGENT, date).is_unowned());
        assert!(LedgerEntry::new(event, "  ", date).is_unowned());
    }

    #[test]
    fn test_entry_json_shape() {
        let event = MedalEvent::new("1000m", Medal::Gold, "Jutta Leerdam", "Netherlands");
        let entry = LedgerEntry::new(event, "Team A", NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2026-02-09");
        assert_eq!(json["country"], "Netherlands");
        assert_eq!(json["medal"], "Gold");
        assert_eq!(json["team"], "Team A");
    }
}
