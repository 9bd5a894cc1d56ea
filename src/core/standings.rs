//! Flat final-standings table: one row per drafted country.

use serde::Serialize;

use crate::domain::ScoreRecord;

use super::resolver::{IdentityResolver, ResolverPool};
use super::scoring::DEFAULT_MULTIPLIER;
use super::teams::TeamRoster;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    pub team: String,
    pub country: String,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    pub weight: u64,
    pub multiplier: f64,
    pub final_score: f64,

    /// False when the country had no score record
    pub resolved: bool,
}

impl StandingRow {
    fn unscored(team: &str, country: &str) -> Self {
        Self {
            team: team.to_string(),
            country: country.to_string(),
            gold: 0,
            silver: 0,
            bronze: 0,
            weight: 0,
            multiplier: DEFAULT_MULTIPLIER,
            final_score: 0.0,
            resolved: false,
        }
    }

    fn scored(team: &str, country: &str, record: &ScoreRecord) -> Self {
        Self {
            team: team.to_string(),
            country: country.to_string(),
            gold: record.counts.gold,
            silver: record.counts.silver,
            bronze: record.counts.bronze,
            weight: record.weight,
            multiplier: record.multiplier,
            final_score: record.final_score,
            resolved: true,
        }
    }
}

/// Standings rows in roster order, countries in pick order.
pub fn standings(
    roster: &TeamRoster,
    scores: &ResolverPool<ScoreRecord>,
    resolver: &IdentityResolver<'_>,
) -> Vec<StandingRow> {
    roster
        .teams()
        .iter()
        .flat_map(|team| {
            team.countries.iter().filter(|c| !c.is_blank()).map(move |country| {
                match resolver.resolve(country.display(), scores) {
                    Some(record) => StandingRow::scored(&team.name, country.display(), record),
                    None => StandingRow::unscored(&team.name, country.display()),
                }
            })
        })
        .collect()
}
