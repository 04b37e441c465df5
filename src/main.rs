mod checkpoint;
mod clean;
mod config;
mod context;
mod db;
mod discover;
mod error;
mod extract;
mod fetch;
mod model;
mod normalize;
mod pacing;
mod pipeline;
mod resolve;
mod stats;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::{Chamber, RecordKind, Settings};
use crate::context::RunContext;
use crate::fetch::HttpFetcher;
use crate::pipeline::{Pipeline, Selection};
use crate::stats::BatchStats;

#[derive(Parser)]
#[command(name = "parliament_scraper", about = "Bill and committee scraper for the Federal Parliament of Nepal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover, fetch, clean and write one batch
    Run {
        /// Only this chamber (default: both)
        #[arg(long, value_enum)]
        chamber: Option<Chamber>,
        /// Only this record kind (default: both)
        #[arg(long, value_enum)]
        kind: Option<RecordKind>,
        /// Checkpoint file (default: <output_dir>/records_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also upsert the batch into the SQLite store
        #[arg(long)]
        store: bool,
        /// SQLite file, overrides PARLIAMENT_DB_PATH
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Merge checkpoint files, re-normalize and deduplicate them
    Clean {
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upsert a checkpoint into the SQLite store
    Store {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show statistics for a checkpoint
    Stats {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Run { chamber, kind, output, store, db } => {
            if db.is_some() {
                settings.db_path = db;
            }
            // Everything that can be misconfigured fails here, before any request.
            let db_path = if store { Some(settings.require_db_path()?) } else { None };
            settings.ensure_output_dir()?;
            let mut selection = Selection::all();
            if let Some(c) = chamber {
                selection.chambers = vec![c];
            }
            if let Some(k) = kind {
                selection.kinds = vec![k];
            }
            let sources = selection
                .chambers
                .iter()
                .map(|&c| settings.source(c))
                .collect::<Result<Vec<_>, _>>()?;
            let fetcher = HttpFetcher::new(settings.timeout())?;
            let ctx = RunContext::new(&fetcher, sources);

            println!(
                "Scraping {} for {}...",
                join(selection.kinds.iter().map(|k| k.as_str())),
                join(selection.chambers.iter().map(|c| c.as_str()))
            );
            let report = Pipeline::new(&ctx)
                .with_progress(std::io::stderr().is_terminal())
                .run(&selection)
                .await;
            report.print();

            let path = output.unwrap_or_else(|| checkpoint::default_path(&settings.output_dir));
            checkpoint::write(&path, &report.records)?;
            println!("Wrote {} records to {}", report.records.len(), path.display());

            if let Some(db_path) = db_path {
                let counts = db::Store::open(&db_path)?.save(&report.records)?;
                println!(
                    "Stored {} bills, {} committees in {}",
                    counts.bills, counts.committees, db_path.display()
                );
            }
            Ok(())
        }
        Commands::Clean { input, output } => {
            let mut merged = Vec::new();
            for path in &input {
                let records = checkpoint::read(path)?;
                info!(path = %path.display(), records = records.len(), "loaded checkpoint");
                merged.extend(records);
            }
            let loaded = merged.len();

            let mut invalid = 0;
            let mut cleaned = Vec::with_capacity(loaded);
            for record in &merged {
                match clean::normalize_and_validate(clean::to_canonical(record)) {
                    Ok(r) => cleaned.push(r),
                    Err(e) => {
                        warn!(error = %e, "record dropped");
                        invalid += 1;
                    }
                }
            }
            let deduped = clean::dedup(cleaned);

            settings.ensure_output_dir()?;
            let path = output.unwrap_or_else(|| checkpoint::default_path(&settings.output_dir));
            checkpoint::write(&path, &deduped.records)?;
            println!(
                "Loaded {} records from {} files: {} invalid, {} duplicates, {} kept.",
                loaded,
                input.len(),
                invalid,
                deduped.discarded,
                deduped.records.len()
            );
            println!("Wrote {}", path.display());
            BatchStats::collect(&deduped.records).print();
            Ok(())
        }
        Commands::Store { input, db } => {
            if db.is_some() {
                settings.db_path = db;
            }
            let db_path = settings.require_db_path()?;
            let records = checkpoint::read(&input)?;
            let store = db::Store::open(&db_path)?;
            let counts = store.save(&records)?;
            let totals = store.counts()?;
            println!(
                "Stored {} bills, {} committees ({} bills, {} committees in {}).",
                counts.bills,
                counts.committees,
                totals.bills,
                totals.committees,
                db_path.display()
            );
            Ok(())
        }
        Commands::Stats { input } => {
            let records = checkpoint::read(&input)
                .with_context(|| format!("loading {}", input.display()))?;
            BatchStats::collect(&records).print();
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
