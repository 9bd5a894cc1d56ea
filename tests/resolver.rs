//! Resolver Integration Tests
//!
//! Name resolution, scoring and aggregation through the public API.

use std::collections::HashSet;

use chrono::NaiveDate;
use podium::core::{
    parse_multiplier, score, EventLedger, IdentityResolver, ResolverPool, TeamAggregator,
    TeamRoster,
};
use podium::domain::{normalize, Medal, MedalCount, MedalEvent, ScoreRecord};
use podium::AliasTable;

fn pool_of(keys: &[&str]) -> ResolverPool<&'static str> {
    keys.iter().map(|k| (*k, "S")).collect()
}

#[test]
fn test_normalize_netherlands_variants() {
    assert_eq!(normalize("The Netherlands"), "netherlands");
    assert_eq!(normalize("Netherlands"), "netherlands");
}

#[test]
fn test_alias_forward_to_formal_pool_key() {
    let aliases = AliasTable::default();
    let resolver = IdentityResolver::new(&aliases);

    assert_eq!(resolver.resolve("South Korea", &pool_of(&["Republic of Korea"])), Some(&"S"));
}

#[test]
fn test_common_and_formal_names_both_resolve() {
    let aliases = AliasTable::default();
    let resolver = IdentityResolver::new(&aliases);
    let pool = pool_of(&["USA"]);

    assert_eq!(resolver.resolve("United States", &pool), Some(&"S"));
    assert_eq!(resolver.resolve("USA", &pool), Some(&"S"));
}

#[test]
fn test_neutral_athletes_sentinel() {
    let aliases = AliasTable::default();
    let resolver = IdentityResolver::new(&aliases);

    assert_eq!(
        resolver.resolve("AIN", &pool_of(&["Individual Neutral Athletes"])),
        Some(&"S")
    );
    assert_eq!(
        resolver.resolve("Individual Neutral Athletes", &pool_of(&["AIN"])),
        Some(&"S")
    );
}

#[test]
fn test_unknown_country_is_not_found() {
    let aliases = AliasTable::default();
    let resolver = IdentityResolver::new(&aliases);

    let pool = pool_of(&["Norway", "USA", "Netherlands", "Republic of Korea"]);
    assert_eq!(resolver.resolve("Atlantis", &pool), None);
}

#[test]
fn test_substituted_alias_table() {
    let aliases = AliasTable::new([("Holland", "Netherlands")]);
    let resolver = IdentityResolver::new(&aliases);
    let pool = pool_of(&["Netherlands", "USA"]);

    assert_eq!(resolver.resolve("Holland", &pool), Some(&"S"));
    // Built-in pairs are gone with a substituted table
    assert_eq!(resolver.resolve("United States", &pool), None);
}

#[test]
fn test_score_and_multiplier_parsing() {
    let record = score("Netherlands", MedalCount::new(1, 2, 3), 2.0);
    assert_eq!(record.weight, 10);
    assert_eq!(record.final_score, 20.0);

    assert_eq!(parse_multiplier(Some("1,5")).value, 1.5);
    assert_eq!(parse_multiplier(Some("")).value, 1.0);
    assert_eq!(parse_multiplier(Some("abc")).value, 1.0);
}

#[test]
fn test_ledger_signature_ignores_country_spelling() {
    let aliases = AliasTable::default();
    let roster: TeamRoster = vec![("Team A", vec!["Netherlands"])].into_iter().collect();
    let owners = TeamAggregator::new(&roster, &aliases);
    let ledger = EventLedger::new(&owners, NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
    let mut signatures = HashSet::new();

    let first = ledger.admit(
        &MedalEvent::new("1000m", Medal::Gold, "Jutta Leerdam", "Netherlands"),
        &signatures,
    );
    assert!(first.admitted);
    signatures.insert(first.entry.unwrap().signature());

    let second = ledger.admit(
        &MedalEvent::new("1000m", Medal::Gold, "Jutta Leerdam", "The Netherlands"),
        &signatures,
    );
    assert!(!second.admitted);
}

#[test]
fn test_team_totals_with_missing_country() {
    let aliases = AliasTable::default();
    let roster: TeamRoster = vec![
        ("Team A", vec!["Netherlands"]),
        ("Team B", vec!["USA", "Atlantis"]),
    ]
    .into_iter()
    .collect();

    let scores: ResolverPool<ScoreRecord> = vec![
        ("Netherlands", score("Netherlands", MedalCount::new(2, 2, 0), 2.0)),
        ("USA", score("USA", MedalCount::new(1, 1, 0), 1.0)),
    ]
    .into_iter()
    .collect();

    let totals = TeamAggregator::new(&roster, &aliases).aggregate(&scores);

    assert_eq!(totals.get("Team A").unwrap().total_final_score, 20.0);
    assert_eq!(totals.get("Team B").unwrap().total_final_score, 5.0);
    assert_eq!(totals.get("Team B").unwrap().unresolved, vec!["Atlantis".to_string()]);
}
