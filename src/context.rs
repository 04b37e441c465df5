use crate::config::{Chamber, Pacing, RecordKind, Source};
use crate::fetch::Fetch;

/// Everything one run needs, built once and lent to every stage.
pub struct RunContext<'a> {
    pub fetcher: &'a dyn Fetch,
    sources: Vec<Source>,
}

impl<'a> RunContext<'a> {
    pub fn new(fetcher: &'a dyn Fetch, sources: Vec<Source>) -> Self {
        RunContext { fetcher, sources }
    }

    pub fn source(&self, chamber: Chamber) -> Option<&Source> {
        self.sources.iter().find(|s| s.chamber == chamber)
    }

    pub fn pacing(&self, kind: RecordKind) -> Pacing {
        kind.pacing()
    }
}
