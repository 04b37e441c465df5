use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::clean::{dedup, normalize_and_validate};
use crate::config::{Chamber, RecordKind};
use crate::context::RunContext;
use crate::discover::{discover_ids, StopReason};
use crate::model::CleanRecord;
use crate::resolve::{fill_listing_name, resolve};

/// Which categories a run covers: every selected chamber × every selected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub chambers: Vec<Chamber>,
    pub kinds: Vec<RecordKind>,
}

impl Selection {
    pub fn all() -> Self {
        Selection {
            chambers: Chamber::ALL.to_vec(),
            kinds: RecordKind::ALL.to_vec(),
        }
    }

    fn categories(&self) -> impl Iterator<Item = (Chamber, RecordKind)> + '_ {
        self.chambers
            .iter()
            .flat_map(move |&c| self.kinds.iter().map(move |&k| (c, k)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovery,
    Acquisition,
    Validation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Discovery => "discovery",
            Stage::Acquisition => "acquisition",
            Stage::Validation => "validation",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub chamber: Chamber,
    pub kind: RecordKind,
    pub id: String,
    pub stage: Stage,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub chamber: Chamber,
    pub kind: RecordKind,
    pub discovered: usize,
    pub resolved: usize,
    pub failed: usize,
    pub invalid: usize,
    pub kept: usize,
    /// `None` when the chamber had no configured source.
    pub stop: Option<StopReason>,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub categories: Vec<CategoryReport>,
    pub failures: Vec<Failure>,
    pub duplicates: usize,
    pub records: Vec<CleanRecord>,
}

impl RunReport {
    pub fn print(&self) {
        println!(
            "{:<5} | {:<10} | {:>10} | {:>8} | {:>6} | {:>7} | {:>5}",
            "Src", "Kind", "Discovered", "Resolved", "Failed", "Invalid", "Kept"
        );
        println!("{}", "-".repeat(68));
        for c in &self.categories {
            println!(
                "{:<5} | {:<10} | {:>10} | {:>8} | {:>6} | {:>7} | {:>5}",
                c.chamber.as_str(), c.kind.as_str(), c.discovered, c.resolved, c.failed, c.invalid, c.kept
            );
        }

        for chamber in Chamber::ALL {
            let kept: usize = self
                .categories
                .iter()
                .filter(|c| c.chamber == chamber)
                .map(|c| c.kept)
                .sum();
            if self.categories.iter().any(|c| c.chamber == chamber) {
                println!("{}: {} records", chamber, kept);
            }
        }
        for c in &self.categories {
            if let Some(stop) = c.stop.as_ref().filter(|s| s.failed_page().is_some()) {
                println!("{} {}: listing stopped, {}", c.chamber, c.kind, stop);
            }
        }

        println!(
            "{} records kept, {} duplicates dropped, {} failures.",
            self.records.len(),
            self.duplicates,
            self.failures.len()
        );
        for f in &self.failures {
            println!("  {} {} {} [{}] {}", f.chamber, f.kind, f.id, f.stage, f.reason);
        }
    }
}

pub struct Pipeline<'a> {
    ctx: &'a RunContext<'a>,
    progress: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: &'a RunContext<'a>) -> Self {
        Pipeline { ctx, progress: true }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Discover, resolve, normalize, then deduplicate the whole batch. A
    /// failing entity is recorded and skipped; nothing here aborts the run.
    pub async fn run(&self, selection: &Selection) -> RunReport {
        let mut report = RunReport::default();
        let mut cleaned: Vec<CleanRecord> = Vec::new();

        for (chamber, kind) in selection.categories() {
            let mut category = CategoryReport {
                chamber,
                kind,
                discovered: 0,
                resolved: 0,
                failed: 0,
                invalid: 0,
                kept: 0,
                stop: None,
            };

            let Some(source) = self.ctx.source(chamber) else {
                warn!(%chamber, "no source configured, skipping");
                report.categories.push(category);
                continue;
            };

            info!(%chamber, %kind, "discovering");
            let discovery = discover_ids(self.ctx, source, kind).await;
            category.discovered = discovery.ids.len();

            // Nothing listed because the listing itself broke is a failure,
            // not an empty category.
            if discovery.ids.is_empty() {
                if let Some(page) = discovery.stop.failed_page() {
                    report.failures.push(Failure {
                        chamber,
                        kind,
                        id: source.list_url(kind, page),
                        stage: Stage::Discovery,
                        reason: discovery.stop.to_string(),
                    });
                }
            }
            category.stop = Some(discovery.stop);

            let pb = self.progress_bar(discovery.ids.len(), chamber, kind);
            for id in &discovery.ids {
                let outcome = resolve(self.ctx, source, kind, id).await;
                pb.inc(1);

                let mut canonical = match outcome {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(%chamber, %kind, id = %id, error = %e, "entity skipped");
                        category.failed += 1;
                        report.failures.push(Failure {
                            chamber,
                            kind,
                            id: id.clone(),
                            stage: Stage::Acquisition,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };
                category.resolved += 1;
                if let Some(name) = discovery.names.get(id) {
                    fill_listing_name(&mut canonical, name);
                }

                match normalize_and_validate(canonical) {
                    Ok(clean) => cleaned.push(clean),
                    Err(e) => {
                        warn!(%chamber, %kind, id = %id, error = %e, "record dropped");
                        category.invalid += 1;
                        report.failures.push(Failure {
                            chamber,
                            kind,
                            id: id.clone(),
                            stage: Stage::Validation,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            pb.finish_and_clear();

            info!(
                %chamber, %kind,
                discovered = category.discovered,
                resolved = category.resolved,
                failed = category.failed,
                invalid = category.invalid,
                "category done"
            );
            report.categories.push(category);
        }

        let deduped = dedup(cleaned);
        report.duplicates = deduped.discarded;
        for category in &mut report.categories {
            category.kept = deduped
                .records
                .iter()
                .filter(|r| r.chamber() == category.chamber && r.kind() == category.kind)
                .count();
        }
        report.records = deduped.records;
        report
    }

    fn progress_bar(&self, len: usize, chamber: Chamber, kind: RecordKind) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        pb.set_style(style);
        pb.set_message(format!("{} {}", chamber, kind));
        pb
    }
}
