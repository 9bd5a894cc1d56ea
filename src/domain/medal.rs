//! Medal counts and discrete medal events as delivered by the scrapers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::country::CountryName;

/// Medal color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Fixed point value used for the weighted score
    pub fn points(self) -> u64 {
        match self {
            Medal::Gold => 3,
            Medal::Silver => 2,
            Medal::Bronze => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Medal::Gold => "Gold",
            Medal::Silver => "Silver",
            Medal::Bronze => "Bronze",
        }
    }
}

impl fmt::Display for Medal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown medal color: {0:?}")]
pub struct MedalParseError(pub String);

impl FromStr for Medal {
    type Err = MedalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gold" => Ok(Medal::Gold),
            "silver" => Ok(Medal::Silver),
            "bronze" => Ok(Medal::Bronze),
            _ => Err(MedalParseError(s.to_string())),
        }
    }
}

/// Gold/silver/bronze totals for one country in one scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedalCount {
    #[serde(rename = "Gold", default)]
    pub gold: u32,
    #[serde(rename = "Silver", default)]
    pub silver: u32,
    #[serde(rename = "Bronze", default)]
    pub bronze: u32,
}

impl MedalCount {
    pub fn new(gold: u32, silver: u32, bronze: u32) -> Self {
        Self { gold, silver, bronze }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.gold) + u64::from(self.silver) + u64::from(self.bronze)
    }
}

/// A single medal award: who won what, for which country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedalEvent {
    pub event: String,
    pub medal: Medal,
    pub athlete: String,
    pub country: CountryName,
}

impl MedalEvent {
    pub fn new(
        event: impl Into<String>,
        medal: Medal,
        athlete: impl Into<String>,
        country: impl Into<CountryName>,
    ) -> Self {
        Self {
            event: event.into(),
            medal,
            athlete: athlete.into(),
            country: country.into(),
        }
    }

    /// Dedup signature: `{event}_{medal}_{athlete}`.
    ///
    /// The country is left out so that spelling drift between scrapes does
    /// not turn an already-recorded medal into a new one.
    pub fn signature(&self) -> String {
        signature(&self.event, self.medal.as_str(), &self.athlete)
    }
}

/// Build a dedup signature from its three parts.
pub fn signature(event: &str, medal: &str, athlete: &str) -> String {
    format!("{}_{}_{}", event, medal, athlete)
}

/// Medal event as it arrives from the results-page scraper (all text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMedalEvent {
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Medal")]
    pub medal: String,
    #[serde(rename = "Athlete")]
    pub athlete: String,
    #[serde(rename = "Country")]
    pub country: String,
}

impl TryFrom<RawMedalEvent> for MedalEvent {
    type Error = MedalParseError;

    fn try_from(raw: RawMedalEvent) -> Result<Self, Self::Error> {
        let medal = raw.medal.parse()?;
        Ok(MedalEvent::new(raw.event, medal, raw.athlete, raw.country))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medal_parse_is_case_insensitive() {
        assert_eq!("Gold".parse::<Medal>().unwrap(), Medal::Gold);
        assert_eq!(" silver ".parse::<Medal>().unwrap(), Medal::Silver);
        assert_eq!("BRONZE".parse::<Medal>().unwrap(), Medal::Bronze);
        assert!("Platinum".parse::<Medal>().is_err());
    }

    #[test]
    fn test_signature_excludes_country() {
        let a = MedalEvent::new("1000m", Medal::Gold, "Jutta Leerdam", "Netherlands");
        let b = MedalEvent::new("1000m", Medal::Gold, "Jutta Leerdam", "The Netherlands");

        assert_eq!(a.signature(), "1000m_Gold_Jutta Leerdam");
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_raw_event_conversion() {
        let raw: RawMedalEvent = serde_json::from_str(
            r#"{"Event": "Downhill", "Medal": "silver", "Athlete": "A. Skier", "Country": "Austria"}"#,
        )
        .unwrap();

        let event = MedalEvent::try_from(raw).unwrap();
        assert_eq!(event.medal, Medal::Silver);
        assert_eq!(event.country.display(), "Austria");
    }

    #[test]
    fn test_medal_count_deserializes_missing_fields_as_zero() {
        let count: MedalCount = serde_json::from_str(r#"{"Gold": 2}"#).unwrap();
        assert_eq!(count, MedalCount::new(2, 0, 0));
        assert_eq!(count.total(), 2);
    }
}
