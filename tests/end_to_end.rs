//! End-to-End Integration Tests
//!
//! A full pass from JSON snapshot files through to the ledger file.

use chrono::NaiveDate;
use podium::core::run::Stage;
use podium::core::{Reconciler, RunInputs};
use podium::ingest::{load_counts, load_events, load_grid, parse_counts, snapshot_digest, Grid};
use podium::{AliasTable, LedgerStore};
use tempfile::TempDir;
use tokio::fs;

const COUNTS: &str = r#"{
    "Netherlands": {"Gold": 1, "Silver": 0, "Bronze": 0},
    "Norway": {"Gold": 2, "Silver": 1, "Bronze": 1},
    "United States": {"Gold": 0, "Silver": 1, "Bronze": 0}
}"#;

const EVENTS: &str = r#"[
    {"Event": "1000m", "Medal": "Gold", "Athlete": "Jutta Leerdam", "Country": "Netherlands"},
    {"Event": "Sprint", "Medal": "gold", "Athlete": "Johannes Klaebo", "Country": "Norway"},
    {"Event": "Slalom", "Medal": "Silver", "Athlete": "Some Skier", "Country": "United States"},
    {"Event": "Curling", "Medal": "Tin", "Athlete": "Nobody", "Country": "Norway"}
]"#;

const RESULTS: &str = r#"[
    ["Country", "Gold", "Silver", "Bronze", "Multiplier"],
    ["The Netherlands", 0, 0, 0, null],
    ["USA", "", "", "", "1,5"]
]"#;

const DRAFT: &str = r#"[
    ["Team A", "Team B"],
    ["The Netherlands", "USA"],
    ["Finland", null]
]"#;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
}

async fn write_inputs(temp: &TempDir) {
    fs::write(temp.path().join("counts.json"), COUNTS).await.unwrap();
    fs::write(temp.path().join("events.json"), EVENTS).await.unwrap();
    fs::write(temp.path().join("results.json"), RESULTS).await.unwrap();
    fs::write(temp.path().join("draft.json"), DRAFT).await.unwrap();
}

async fn load_inputs(temp: &TempDir, store: &LedgerStore) -> RunInputs {
    let dir = temp.path();
    let parsed = load_events(&dir.join("events.json")).await.unwrap();
    assert_eq!(parsed.skipped, 1);

    RunInputs {
        counts: load_counts(&dir.join("counts.json")).await.unwrap(),
        events: parsed.events,
        results: load_grid(&dir.join("results.json")).await.unwrap(),
        draft: load_grid(&dir.join("draft.json")).await.unwrap(),
        ledger: store.load().await.unwrap(),
        snapshot_digest: snapshot_digest([COUNTS, EVENTS, RESULTS, DRAFT]),
    }
}

#[test]
fn test_single_gold_default_multiplier() {
    let aliases = AliasTable::default();
    let inputs = RunInputs {
        counts: parse_counts(r#"{"Netherlands": {"Gold": 1, "Silver": 0, "Bronze": 0}}"#).unwrap(),
        results: Grid::new(vec![
            vec!["Country", "Gold", "Silver", "Bronze", "Multiplier"],
            vec!["Netherlands", "", "", "", ""],
        ]),
        draft: Grid::new(vec![vec!["Team A"], vec!["The Netherlands"]]),
        ..Default::default()
    };

    let outcome = Reconciler::new(&aliases, date()).run(inputs);
    let totals = outcome.totals.unwrap();
    let team_a = totals.totals.get("Team A").unwrap();

    assert_eq!(team_a.total_weight, 3);
    assert_eq!(team_a.total_final_score, 3.0);
}

#[tokio::test]
async fn test_full_pass_from_files() {
    let temp = TempDir::new().unwrap();
    write_inputs(&temp).await;
    let store = LedgerStore::open(temp.path().join("state").join("ledger.jsonl"))
        .await
        .unwrap();

    let aliases = AliasTable::default();
    let reconciler = Reconciler::new(&aliases, date());
    let outcome = reconciler.run(load_inputs(&temp, &store).await);

    assert!(!outcome.report.has_failures());
    assert_eq!(outcome.report.snapshot_digest.len(), 16);

    // Norway appended with a unit multiplier
    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.results.rows()[3], vec!["Norway", "2", "1", "1", "1"]);

    let totals = outcome.totals.as_ref().unwrap();
    assert_eq!(totals.totals.get("Team A").unwrap().total_weight, 3);
    assert_eq!(totals.totals.get("Team B").unwrap().total_final_score, 3.0);
    assert_eq!(totals.totals.get("Team A").unwrap().unresolved, vec!["Finland".to_string()]);

    let teams: Vec<_> = outcome.new_entries.iter().map(|e| e.team.as_str()).collect();
    assert_eq!(teams, vec!["Team A", "Free Agent", "Team B"]);

    store.append_all(&outcome.new_entries).await.unwrap();
    assert_eq!(store.load().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_second_pass_is_idempotent_and_repairs() {
    let temp = TempDir::new().unwrap();
    write_inputs(&temp).await;
    let store = LedgerStore::open(temp.path().join("ledger.jsonl")).await.unwrap();

    let aliases = AliasTable::default();
    let reconciler = Reconciler::new(&aliases, date());

    let first = reconciler.run(load_inputs(&temp, &store).await);
    store.append_all(&first.new_entries).await.unwrap();

    // Norway gets drafted between passes
    fs::write(
        temp.path().join("draft.json"),
        r#"[["Team A", "Team B"], ["The Netherlands", "USA"], ["Finland", "Norway"]]"#,
    )
    .await
    .unwrap();

    let second = reconciler.run(load_inputs(&temp, &store).await);
    assert!(second.new_entries.is_empty());
    assert_eq!(second.repairs.len(), 1);

    let ledger_stage = second.report.stage(Stage::Ledger).unwrap().summary().unwrap();
    assert_eq!(ledger_stage.duplicates, 3);

    store.rewrite(&second.ledger).await.unwrap();
    let stored = store.load().await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[1].team, "Team B");
    assert_eq!(stored[1].date, date());
}
