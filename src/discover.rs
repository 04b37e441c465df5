use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, info, warn};

use crate::config::{RecordKind, Source};
use crate::context::RunContext;
use crate::extract::extract_list;
use crate::pacing::Pacer;

/// Why pagination ended. All of these are normal termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The page held no id that earlier pages had not already produced.
    Exhausted { page: u32 },
    FetchFailed { page: u32, reason: String },
    Unparsable { page: u32, reason: String },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted { page } => write!(f, "no new ids on page {}", page),
            StopReason::FetchFailed { page, reason } => write!(f, "page {} fetch failed: {}", page, reason),
            StopReason::Unparsable { page, reason } => write!(f, "page {} unparsable: {}", page, reason),
        }
    }
}

impl StopReason {
    /// The page that broke pagination, if it ended on an error.
    pub fn failed_page(&self) -> Option<u32> {
        match self {
            StopReason::Exhausted { .. } => None,
            StopReason::FetchFailed { page, .. } | StopReason::Unparsable { page, .. } => Some(*page),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub ids: Vec<String>,
    /// Names shown on the listing, by id, where the listing has them.
    pub names: HashMap<String, String>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Walk the listing pages of one category from page 1 until a page adds
/// nothing new. Ids come back in first-seen order, without duplicates.
pub async fn discover_ids(ctx: &RunContext<'_>, source: &Source, kind: RecordKind) -> Discovery {
    let mut pacer = Pacer::new(ctx.pacing(kind).list_interval);
    let mut seen: HashSet<String> = HashSet::new();
    let mut ids: Vec<String> = Vec::new();
    let mut names: HashMap<String, String> = HashMap::new();
    let mut pages_fetched = 0;
    let mut page: u32 = 1;

    let stop = loop {
        let url = source.list_url(kind, page);
        pacer.ready().await;
        debug!(%url, "listing page");

        let markup = match ctx.fetcher.fetch(&url).await {
            Ok(m) => m,
            Err(e) => break StopReason::FetchFailed { page, reason: e.to_string() },
        };
        pages_fetched += 1;

        let entries = match extract_list(&markup, kind) {
            Ok(entries) => entries,
            Err(e) => break StopReason::Unparsable { page, reason: e.to_string() },
        };

        let before = ids.len();
        for entry in entries {
            if seen.insert(entry.id.clone()) {
                if let Some(name) = entry.name {
                    names.insert(entry.id.clone(), name);
                }
                ids.push(entry.id);
            }
        }
        if ids.len() == before {
            break StopReason::Exhausted { page };
        }
        debug!(page, new = ids.len() - before, "listing page done");
        page += 1;
    };

    match &stop {
        StopReason::Exhausted { .. } => {}
        other => warn!(chamber = %source.chamber, %kind, "pagination stopped: {}", other),
    }
    info!(chamber = %source.chamber, %kind, ids = ids.len(), pages = pages_fetched, "discovery finished");

    Discovery { ids, names, pages_fetched, stop }
}
