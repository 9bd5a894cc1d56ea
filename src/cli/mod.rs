//! Command-line interface for podium.
//!
//! Provides commands for a full reconciliation pass, each stage on its own,
//! ad-hoc name resolution and configuration inspection.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::fs;

use crate::config;
use crate::core::run::{DraftTotals, DRAFT_SHEET, RESULTS_SHEET};
use crate::core::{
    reconcile_results, score_rows, standings, AliasTable, EventLedger, IdentityResolver,
    Reconciler, ResolverPool, RunInputs, RunReport, StageStatus, TeamAggregator, TotalsPlacement,
};
use crate::domain::MedalCount;
use crate::ingest::{
    draft_roster, load_counts, load_events, load_grid, parse_counts, parse_events, results_rows,
    snapshot_digest, Grid,
};
use crate::store::LedgerStore;

/// podium - medal-table reconciliation for a country draft league
#[derive(Parser, Debug)]
#[command(name = "podium")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every stage over a snapshot and write the outputs
    Run {
        /// Scraped medal counts (JSON object keyed by country)
        #[arg(long)]
        counts: PathBuf,

        /// Scraped medal events (JSON array)
        #[arg(long)]
        events: PathBuf,

        /// Results sheet export (JSON grid)
        #[arg(long)]
        results: PathBuf,

        /// Draft sheet export (JSON grid)
        #[arg(long)]
        draft: PathBuf,

        /// Ledger file (defaults to the configured ledger)
        #[arg(long, env = "PODIUM_LEDGER")]
        ledger: Option<PathBuf>,

        /// Directory for updated sheets, totals, standings and the run report
        #[arg(short, long, default_value = "out")]
        out: PathBuf,

        /// Compute everything but leave the ledger untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Write scraped counts into the results sheet
    Results {
        #[arg(long)]
        counts: PathBuf,

        #[arg(long)]
        results: PathBuf,

        /// Write the updated grid here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Per-team weighted and multiplied totals
    Totals {
        #[arg(long)]
        results: PathBuf,

        #[arg(long)]
        draft: PathBuf,
    },

    /// Final standings, one row per drafted country
    Standings {
        #[arg(long)]
        results: PathBuf,

        #[arg(long)]
        draft: PathBuf,
    },

    /// Admit new medal events into the ledger
    Ledger {
        #[arg(long)]
        events: PathBuf,

        #[arg(long)]
        draft: PathBuf,

        #[arg(long, env = "PODIUM_LEDGER")]
        ledger: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Attribute Free Agent ledger entries to their current owners
    Repair {
        #[arg(long)]
        draft: PathBuf,

        #[arg(long, env = "PODIUM_LEDGER")]
        ledger: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Resolve a country name against a set of candidate names
    Resolve {
        /// Name to resolve
        name: String,

        /// Resolve against the countries of a counts file
        #[arg(long)]
        counts: Option<PathBuf>,

        /// Candidate name (repeatable)
        #[arg(short, long = "candidate")]
        candidates: Vec<String>,
    },

    /// List the alias table in effect
    Aliases,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                counts,
                events,
                results,
                draft,
                ledger,
                out,
                dry_run,
            } => run_all(&counts, &events, &results, &draft, ledger, &out, dry_run).await,
            Commands::Results {
                counts,
                results,
                out,
            } => update_results(&counts, &results, out).await,
            Commands::Totals { results, draft } => show_totals(&results, &draft).await,
            Commands::Standings { results, draft } => show_standings(&results, &draft).await,
            Commands::Ledger {
                events,
                draft,
                ledger,
                dry_run,
            } => admit_events(&events, &draft, ledger, dry_run).await,
            Commands::Repair {
                draft,
                ledger,
                dry_run,
            } => repair_ledger(&draft, ledger, dry_run).await,
            Commands::Resolve {
                name,
                counts,
                candidates,
            } => resolve_name(&name, counts, candidates).await,
            Commands::Aliases => list_aliases(),
            Commands::Config => show_config(),
        }
    }
}

fn alias_table() -> Result<AliasTable> {
    Ok(config::config()?.alias_table())
}

async fn open_ledger(path: Option<PathBuf>) -> Result<LedgerStore> {
    let path = match path {
        Some(path) => path,
        None => config::ledger_path()?,
    };
    LedgerStore::open(&path)
        .await
        .with_context(|| format!("Failed to open ledger: {}", path.display()))
}

async fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input file: {}", path.display()))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write output: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

/// Full pass over one snapshot
async fn run_all(
    counts_path: &Path,
    events_path: &Path,
    results_path: &Path,
    draft_path: &Path,
    ledger_path: Option<PathBuf>,
    out: &Path,
    dry_run: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let aliases = cfg.alias_table();

    let counts_json = read_input(counts_path).await?;
    let events_json = read_input(events_path).await?;
    let results_json = read_input(results_path).await?;
    let draft_json = read_input(draft_path).await?;

    let digest = snapshot_digest([&counts_json, &events_json, &results_json, &draft_json]);

    let counts = parse_counts(&counts_json)
        .with_context(|| format!("Invalid counts file: {}", counts_path.display()))?;
    let parsed_events = parse_events(&events_json)
        .with_context(|| format!("Invalid events file: {}", events_path.display()))?;
    let results: Grid = serde_json::from_str(&results_json)
        .with_context(|| format!("Failed to parse JSON: {}", results_path.display()))?;
    let draft: Grid = serde_json::from_str(&draft_json)
        .with_context(|| format!("Failed to parse JSON: {}", draft_path.display()))?;

    let store = open_ledger(ledger_path).await?;
    let ledger = store.load().await?;
    let existing = ledger.len();

    let reconciler =
        Reconciler::new(&aliases, cfg.capture_date()).with_min_totals_row(cfg.min_totals_row);
    let outcome = reconciler.run(RunInputs {
        counts,
        events: parsed_events.events,
        results,
        draft,
        ledger,
        snapshot_digest: digest,
    });

    fs::create_dir_all(out)
        .await
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
    write_json(&out.join("results.json"), &outcome.results).await?;
    write_json(&out.join("draft.json"), &outcome.draft).await?;
    write_json(&out.join("standings.json"), &outcome.standings).await?;
    if let Some(ref totals) = outcome.totals {
        write_json(&out.join("totals.json"), totals).await?;
    }
    write_json(&out.join("report.json"), &outcome.report).await?;

    if dry_run {
        eprintln!("Dry run: ledger not modified");
    } else {
        if !outcome.repairs.is_empty() {
            // Rewrite before appending so the new entries land after the repaired ones
            store.rewrite(&outcome.ledger).await?;
        }
        store.append_all(&outcome.new_entries).await?;
    }

    print_report(&outcome.report, parsed_events.skipped);
    if let Some(ref totals) = outcome.totals {
        print_totals(totals);
    }
    eprintln!(
        "\nLedger: {} existing, {} added, {} repaired ({})",
        existing,
        outcome.new_entries.len(),
        outcome.repairs.len(),
        store.path().display()
    );

    if outcome.report.has_failures() {
        anyhow::bail!("One or more stages failed (see {})", out.join("report.json").display());
    }
    Ok(())
}

fn print_report(report: &RunReport, skipped_events: usize) {
    eprintln!("Run ID:   {}", report.run_id);
    eprintln!("Snapshot: {}", report.snapshot_digest);
    eprintln!("Captured: {}", report.capture_date);
    if skipped_events > 0 {
        eprintln!("Skipped {} medal events with an unknown medal", skipped_events);
    }
    eprintln!();
    eprintln!("{:<10} {:<10} {:>9} {:>8} {:>11}", "STAGE", "STATUS", "PROCESSED", "MATCHED", "UNRESOLVED");
    eprintln!("{}", "-".repeat(52));

    for stage in &report.stages {
        match &stage.status {
            StageStatus::Completed(s) => eprintln!(
                "{:<10} {:<10} {:>9} {:>8} {:>11}",
                stage.stage,
                "completed",
                s.processed,
                s.matched,
                s.unresolved.len()
            ),
            StageStatus::Failed { error } => {
                eprintln!("{:<10} {:<10} {}", stage.stage, "failed", error)
            }
            StageStatus::Skipped { reason } => {
                eprintln!("{:<10} {:<10} {}", stage.stage, "skipped", reason)
            }
        }
    }

    for stage in &report.stages {
        if let Some(summary) = stage.status.summary() {
            if !summary.unresolved.is_empty() {
                eprintln!("\nUnresolved ({}): {}", stage.stage, summary.unresolved.join(", "));
            }
        }
    }
}

fn print_totals(totals: &DraftTotals) {
    eprintln!();
    eprintln!("{:<24} {:>8} {:>12}", "TEAM", "WEIGHTED", "MULTIPLIED");
    eprintln!("{}", "-".repeat(46));
    for team in totals.totals.iter() {
        eprintln!(
            "{:<24} {:>8} {:>12.2}",
            team.team, team.total_weight, team.total_final_score
        );
    }
    for contested in &totals.contested {
        eprintln!(
            "Contested: {} drafted by {} (kept by {})",
            contested.country,
            contested.teams.join(", "),
            contested.teams.first().map(String::as_str).unwrap_or("-")
        );
    }
}

/// Results stage only
async fn update_results(counts_path: &Path, results_path: &Path, out: Option<PathBuf>) -> Result<()> {
    let aliases = alias_table()?;
    let resolver = IdentityResolver::new(&aliases);

    let counts = load_counts(counts_path).await?;
    let mut grid = load_grid(results_path).await?;

    let reconciliation = reconcile_results(&grid, &counts, &resolver, RESULTS_SHEET)?;
    reconciliation.apply(&mut grid);

    eprintln!(
        "Updated {} rows, appended {} countries, {} unresolved",
        reconciliation.updates.len(),
        reconciliation.appended.len(),
        reconciliation.unresolved.len()
    );
    for country in &reconciliation.unresolved {
        eprintln!("  unresolved: {}", country);
    }

    match out {
        Some(path) => write_json(&path, &grid).await,
        None => print_json(&grid),
    }
}

async fn show_totals(results_path: &Path, draft_path: &Path) -> Result<()> {
    let cfg = config::config()?;
    let aliases = cfg.alias_table();

    let results = load_grid(results_path).await?;
    let draft = load_grid(draft_path).await?;

    let (_, rows) = results_rows(&results, RESULTS_SHEET)?;
    let scored = score_rows(&rows);
    let sheet = draft_roster(&draft, DRAFT_SHEET)?;

    let aggregator = TeamAggregator::new(&sheet.roster, &aliases);
    let totals = DraftTotals {
        totals: aggregator.aggregate(&scored.scores),
        placement: TotalsPlacement::below(sheet.last_roster_row, cfg.min_totals_row),
        contested: aggregator.contested().to_vec(),
    };

    print_totals(&totals);
    print_json(&totals)
}

async fn show_standings(results_path: &Path, draft_path: &Path) -> Result<()> {
    let aliases = alias_table()?;
    let resolver = IdentityResolver::new(&aliases);

    let results = load_grid(results_path).await?;
    let draft = load_grid(draft_path).await?;

    let (_, rows) = results_rows(&results, RESULTS_SHEET)?;
    let scored = score_rows(&rows);
    let sheet = draft_roster(&draft, DRAFT_SHEET)?;

    print_json(&standings(&sheet.roster, &scored.scores, &resolver))
}

/// Ledger stage only
async fn admit_events(
    events_path: &Path,
    draft_path: &Path,
    ledger_path: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let aliases = cfg.alias_table();

    let parsed = load_events(events_path).await?;
    let draft = load_grid(draft_path).await?;
    let sheet = draft_roster(&draft, DRAFT_SHEET)?;

    let store = open_ledger(ledger_path).await?;
    let mut signatures = store.signatures().await?;

    let aggregator = TeamAggregator::new(&sheet.roster, &aliases);
    let ledger = EventLedger::new(&aggregator, cfg.capture_date());
    let batch = ledger.admit_batch(&parsed.events, &mut signatures);

    for entry in &batch.entries {
        println!(
            "{}  {:<8} {:<24} {:<28} {}",
            entry.date,
            entry.medal.as_str(),
            entry.country.display(),
            entry.event,
            entry.team
        );
    }
    eprintln!(
        "{} admitted, {} already recorded, {} free agents, {} skipped",
        batch.entries.len(),
        batch.duplicates,
        batch.free_agents,
        parsed.skipped
    );

    if dry_run {
        eprintln!("Dry run: ledger not modified");
        return Ok(());
    }
    store.append_all(&batch.entries).await?;
    Ok(())
}

async fn repair_ledger(draft_path: &Path, ledger_path: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let cfg = config::config()?;
    let aliases = cfg.alias_table();

    let draft = load_grid(draft_path).await?;
    let sheet = draft_roster(&draft, DRAFT_SHEET)?;

    let store = open_ledger(ledger_path).await?;
    let mut entries = store.load().await?;

    let aggregator = TeamAggregator::new(&sheet.roster, &aliases);
    let repairs = EventLedger::new(&aggregator, cfg.capture_date()).repair(&mut entries);

    if repairs.is_empty() {
        println!("No ledger entries needed repair");
        return Ok(());
    }

    for repair in &repairs {
        let from = if repair.from.trim().is_empty() {
            "(blank)"
        } else {
            repair.from.as_str()
        };
        println!("#{:<5} {:<28} {} -> {}", repair.index, repair.country, from, repair.to);
    }

    if dry_run {
        eprintln!("Dry run: {} repairs not written", repairs.len());
        return Ok(());
    }
    store.rewrite(&entries).await?;
    eprintln!("Repaired {} ledger entries", repairs.len());
    Ok(())
}

async fn resolve_name(name: &str, counts: Option<PathBuf>, candidates: Vec<String>) -> Result<()> {
    let aliases = alias_table()?;
    let resolver = IdentityResolver::new(&aliases);

    let mut pool: ResolverPool<MedalCount> = match counts {
        Some(path) => load_counts(&path).await?,
        None => ResolverPool::new(),
    };
    for candidate in candidates {
        pool.insert(candidate, MedalCount::default());
    }

    if pool.is_empty() {
        anyhow::bail!("Nothing to resolve against: pass --counts or --candidate");
    }

    match resolver.resolve_match(name, &pool) {
        Some(found) => {
            println!("{} -> {} ({})", name, found.key, found.kind);
            Ok(())
        }
        None => anyhow::bail!("No match for '{}' among {} names", name, pool.len()),
    }
}

fn list_aliases() -> Result<()> {
    let aliases = alias_table()?;

    println!("{:<28} {}", "COMMON", "FORMAL");
    println!("{}", "-".repeat(60));
    for (common, formal) in aliases.pairs() {
        println!("{:<28} {}", common, formal);
    }
    Ok(())
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Podium Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:   {}", cfg.home.display());
    println!("  Ledger: {}", cfg.ledger.display());
    println!();
    println!("Ledger:");
    println!("  Capture offset: UTC{}", cfg.capture_offset);
    println!("  Capture date:   {}", cfg.capture_date());
    println!();
    println!("Draft:");
    println!("  Min totals row: {}", cfg.min_totals_row);
    println!();
    println!("Alias overrides:");
    if cfg.aliases.is_empty() {
        println!("  (using built-in table)");
    } else {
        for pair in &cfg.aliases {
            println!("  {} -> {}", pair.common, pair.formal);
        }
    }

    Ok(())
}
