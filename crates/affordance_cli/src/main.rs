use affordance_control::{ActionPanel, ClickOutcome, RecordingDispatcher};
use affordance_core::{
    evaluate_snapshot, ActionKind, Affordance, Registry, RuleSet, Snapshot, SnapshotPermissions,
};
use affordance_world::{load_rules, load_snapshot, seeded_snapshot};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod render;
mod sweep;

const DEFAULT_NOW: u64 = 1_700_000_000;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "affordance_cli", about = "Action affordance engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Source {
    /// Load the snapshot from a JSON file. Mutually exclusive with --seed.
    #[arg(long, conflicts_with = "seed")]
    snapshot: Option<String>,
    /// Generate a random snapshot with this seed. Mutually exclusive with --snapshot.
    #[arg(long, conflicts_with = "snapshot")]
    seed: Option<u64>,
    /// Block time for generated snapshots.
    #[arg(long, default_value_t = DEFAULT_NOW)]
    now: u64,
    #[arg(long, default_value = "./content")]
    content_dir: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the action bar for one snapshot.
    Evaluate {
        #[command(flatten)]
        source: Source,
        /// Re-evaluate this many times, advancing the clock by --step each time.
        #[arg(long, default_value_t = 0)]
        ticks: u64,
        #[arg(long, default_value_t = 60)]
        step: u64,
        /// Print affordances as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Click a control and print the dispatched requests.
    Click {
        #[command(flatten)]
        source: Source,
        /// Action kind, e.g. `Extract` or `surfacetransferincoming`.
        #[arg(long)]
        kind: ActionKind,
        /// Click this instance row instead of the primary control.
        #[arg(long, conflicts_with = "stack")]
        item: Option<usize>,
        /// Click the stack summary.
        #[arg(long)]
        stack: bool,
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Audit engine invariants across a range of seeded random snapshots.
    Sweep {
        #[arg(long, default_value_t = 1000)]
        seeds: u64,
        #[arg(long, default_value_t = 0)]
        start_seed: u64,
        #[arg(long, default_value_t = DEFAULT_NOW)]
        now: u64,
        #[arg(long, default_value_t = 3600)]
        step: u64,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long)]
        json: bool,
    },
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn resolve_snapshot(source: &Source) -> Result<Snapshot> {
    match (&source.snapshot, source.seed) {
        (Some(path), _) => load_snapshot(Path::new(path)),
        (None, Some(seed)) => Ok(seeded_snapshot(seed, source.now)),
        (None, None) => bail!("either --snapshot or --seed is required"),
    }
}

fn evaluate_at(snapshot: &Snapshot, rules: &RuleSet) -> Vec<Affordance> {
    let oracle = SnapshotPermissions::new(snapshot);
    evaluate_snapshot(&Registry::standard(), snapshot, rules, &oracle)
}

fn evaluate(source: &Source, ticks: u64, step: u64, json: bool) -> Result<()> {
    let rules = load_rules(&source.content_dir)?;
    let snapshot = resolve_snapshot(source)?;

    let mut previous: Option<Vec<Affordance>> = None;
    for tick in 0..=ticks {
        let now = snapshot.now.saturating_add(tick.saturating_mul(step));
        let affordances = evaluate_at(&snapshot.at(now), &rules);
        tracing::debug!(now, count = affordances.len(), "evaluated action bar");
        if previous.as_ref() == Some(&affordances) {
            continue;
        }
        if json {
            let line = serde_json::json!({ "now": now, "affordances": affordances });
            let text = serde_json::to_string(&line).context("serializing affordances")?;
            println!("{text}");
        } else {
            println!("--- t={now} ---");
            for line in render::render_bar(&affordances) {
                println!("{line}");
            }
        }
        previous = Some(affordances);
    }
    Ok(())
}

fn click(
    source: &Source,
    kind: ActionKind,
    item: Option<usize>,
    stack: bool,
    times: u32,
) -> Result<()> {
    let rules = load_rules(&source.content_dir)?;
    let snapshot = resolve_snapshot(source)?;
    let crew = snapshot
        .crew
        .as_ref()
        .map(|crew| crew.id.clone())
        .context("snapshot has no crew to click as")?;

    let mut panel = ActionPanel::new(crew);
    let mut dispatcher = RecordingDispatcher::default();
    panel.refresh(snapshot.now, evaluate_at(&snapshot, &rules));

    for _ in 0..times {
        let outcome = match (item, stack) {
            (Some(index), _) => panel.click_item(kind, index, &mut dispatcher),
            (None, true) => panel.click_stack(kind, &mut dispatcher),
            (None, false) => panel.click(kind, &mut dispatcher),
        };
        match outcome {
            ClickOutcome::Dispatched(envelope) => {
                let text = serde_json::to_string(&envelope).context("serializing envelope")?;
                println!("{text}");
            }
            ClickOutcome::Refused(reason) => println!("refused: {}", reason.text()),
            ClickOutcome::Inspected(request) => println!("inspect: {}", request.target),
            ClickOutcome::Missing => bail!("no {kind} control on the action bar"),
        }
    }
    Ok(())
}

fn run_sweep(
    start_seed: u64,
    seeds: u64,
    now: u64,
    step: u64,
    content_dir: &str,
    json: bool,
) -> Result<()> {
    let rules = load_rules(content_dir)?;
    let seeds = start_seed..start_seed.saturating_add(seeds);
    let summary = sweep::run_sweep(&rules, seeds, now, step);
    tracing::info!(seeds = summary.seeds, violations = summary.violations, "sweep finished");

    if json {
        let text = serde_json::to_string_pretty(&summary).context("serializing summary")?;
        println!("{text}");
    } else {
        println!(
            "{} seeds, {} affordances, {} violations",
            summary.seeds, summary.affordances, summary.violations
        );
        for report in &summary.failing_seeds {
            for violation in &report.violations {
                println!("  seed {}: {violation}", report.seed);
            }
        }
    }
    if summary.violations > 0 {
        bail!(
            "{} invariant violations across {} seeds",
            summary.violations,
            summary.failing_seeds.len()
        );
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Evaluate {
            source,
            ticks,
            step,
            json,
        } => evaluate(&source, ticks, step, json),
        Commands::Click {
            source,
            kind,
            item,
            stack,
            times,
        } => click(&source, kind, item, stack, times),
        Commands::Sweep {
            seeds,
            start_seed,
            now,
            step,
            content_dir,
            json,
        } => run_sweep(start_seed, seeds, now, step, &content_dir, json),
    }
}
