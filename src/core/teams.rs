//! Team rosters, per-team score totals and country ownership.

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{CountryName, ScoreRecord, FREE_AGENT};

use super::alias::AliasTable;
use super::resolver::{IdentityResolver, Resolved, ResolverPool};

/// Label written beside the weighted totals row
pub const WEIGHTED_LABEL: &str = "Total Medals (Weighted)";

/// Label written beside the multiplied totals row
pub const MULTIPLIED_LABEL: &str = "Multiplied Total";

/// Lowest row the totals are ever placed on
pub const DEFAULT_MIN_TOTALS_ROW: usize = 10;

/// 0-based column holding the totals labels (column E)
pub const LABEL_COLUMN: usize = 4;

/// One drafted team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub name: String,
    pub countries: Vec<CountryName>,
}

/// Teams in draft order, each with its countries in pick order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamRoster {
    teams: Vec<Team>,
}

impl TeamRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a team. A name already on the roster gets the countries appended.
    pub fn add_team<I, C>(&mut self, name: impl Into<String>, countries: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<CountryName>,
    {
        let name = name.into();
        let countries = countries.into_iter().map(Into::into);

        match self.teams.iter_mut().find(|t| t.name == name) {
            Some(team) => team.countries.extend(countries),
            None => self.teams.push(Team {
                name,
                countries: countries.collect(),
            }),
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Number of drafted countries across all teams
    pub fn country_count(&self) -> usize {
        self.teams.iter().map(|t| t.countries.len()).sum()
    }
}

impl<N, I, C> FromIterator<(N, I)> for TeamRoster
where
    N: Into<String>,
    I: IntoIterator<Item = C>,
    C: Into<CountryName>,
{
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut roster = Self::new();
        for (name, countries) in iter {
            roster.add_team(name, countries);
        }
        roster
    }
}

/// Totals for one team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTotals {
    pub team: String,
    pub total_weight: u64,
    pub total_final_score: f64,

    /// Countries that resolved to a score record
    pub matched: usize,

    /// Countries with no score record (counted as zero)
    pub unresolved: Vec<String>,
}

/// Totals for every team, in roster order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub teams: Vec<TeamTotals>,
}

impl Totals {
    pub fn get(&self, team: &str) -> Option<&TeamTotals> {
        self.teams.iter().find(|t| t.team == team)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamTotals> {
        self.teams.iter()
    }

    pub fn unresolved_count(&self) -> usize {
        self.teams.iter().map(|t| t.unresolved.len()).sum()
    }
}

/// A country claimed by more than one team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contested {
    pub country: String,
    pub teams: Vec<String>,
}

/// Sums scores per team and answers "who owns this country".
///
/// When a roster lists a country on several teams, the first team in roster
/// order owns it. The conflicts are kept in [`contested`](Self::contested)
/// so they can be reported rather than silently absorbed.
pub struct TeamAggregator<'a> {
    roster: &'a TeamRoster,
    resolver: IdentityResolver<'a>,
    owners: ResolverPool<String>,
    contested: Vec<Contested>,
}

impl<'a> TeamAggregator<'a> {
    pub fn new(roster: &'a TeamRoster, aliases: &'a AliasTable) -> Self {
        let mut owners = ResolverPool::new();
        let mut contested: Vec<Contested> = Vec::new();
        // first spelling of each country -> owning team
        let mut claimed: Vec<(&CountryName, &str)> = Vec::new();

        for team in roster.teams() {
            for country in &team.countries {
                if country.is_blank() {
                    continue;
                }

                let claim = claimed
                    .iter()
                    .find(|(first, _)| first.is_equivalent(country, aliases))
                    .copied();

                let owner = match claim {
                    Some((first, owner)) => {
                        if owner != team.name {
                            warn!(
                                country = %country,
                                owner = %owner,
                                also = %team.name,
                                "Country drafted by more than one team; first team keeps it"
                            );
                            match contested.iter_mut().find(|c| c.country == first.display()) {
                                Some(entry) if !entry.teams.contains(&team.name) => {
                                    entry.teams.push(team.name.clone())
                                }
                                Some(_) => {}
                                None => contested.push(Contested {
                                    country: first.display().to_string(),
                                    teams: vec![owner.to_string(), team.name.clone()],
                                }),
                            }
                        }
                        owner
                    }
                    None => {
                        claimed.push((country, team.name.as_str()));
                        team.name.as_str()
                    }
                };

                // Every spelling maps to the first owner
                owners.insert(country.display(), owner.to_string());
            }
        }

        Self {
            roster,
            resolver: IdentityResolver::new(aliases),
            owners,
            contested,
        }
    }

    pub fn roster(&self) -> &'a TeamRoster {
        self.roster
    }

    /// Countries claimed by more than one team
    pub fn contested(&self) -> &[Contested] {
        &self.contested
    }

    /// Sum weights and final scores per team. Unresolved countries add zero.
    pub fn aggregate(&self, scores: &ResolverPool<ScoreRecord>) -> Totals {
        let teams = self
            .roster
            .teams()
            .iter()
            .map(|team| {
                let mut totals = TeamTotals {
                    team: team.name.clone(),
                    total_weight: 0,
                    total_final_score: 0.0,
                    matched: 0,
                    unresolved: Vec::new(),
                };

                for country in &team.countries {
                    match self.resolver.resolve_match(country.display(), scores) {
                        Some(found) => {
                            debug!(country = %country, key = found.key, kind = %found.kind, "Resolved drafted country");
                            totals.total_weight += found.value.weight;
                            totals.total_final_score += found.value.final_score;
                            totals.matched += 1;
                        }
                        None => {
                            warn!(team = %team.name, country = %country, "No score for drafted country");
                            totals.unresolved.push(country.display().to_string());
                        }
                    }
                }

                totals
            })
            .collect();

        Totals { teams }
    }

    /// Team owning `country`, or [`FREE_AGENT`] if no team claims it.
    pub fn owner_of(&self, country: &str) -> &str {
        self.owner_match(country)
            .map(|m| m.value.as_str())
            .unwrap_or(FREE_AGENT)
    }

    /// Ownership lookup with the matched roster spelling and rule
    pub fn owner_match(&self, country: &str) -> Option<Resolved<'_, String>> {
        self.resolver.resolve_match(country, &self.owners)
    }
}

/// Sheet rows (1-based) where the two totals lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalsPlacement {
    pub weighted_row: usize,
    pub multiplied_row: usize,
}

impl TotalsPlacement {
    /// Two rows below the last roster row, never above `min_row`
    pub fn below(last_roster_row: usize, min_row: usize) -> Self {
        let weighted_row = min_row.max(last_roster_row + 2);
        Self {
            weighted_row,
            multiplied_row: weighted_row + 1,
        }
    }
}
