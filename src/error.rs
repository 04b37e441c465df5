use thiserror::Error;

/// Network or HTTP level failure reported by a [`crate::fetch::Fetch`] implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
}

/// Markup that cannot be treated as an HTML page at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("content is not HTML ({0} bytes)")]
    NotHtml(usize),
}

/// Why a single entity could not be turned into a canonical record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("no language variant of {id} yielded any field (np: {np}; en: {en})")]
    Empty { id: String, np: String, en: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} {id}: missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        id: String,
        field: &'static str,
    },
}

/// Setup problems. These are the only errors that abort a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid base URL for {chamber}: {url}")]
    BaseUrl { chamber: &'static str, url: String },
    #[error("database path is required to store records (set PARLIAMENT_DB_PATH or --db)")]
    MissingDatabase,
    #[error("cannot prepare output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot build HTTP client: {0}")]
    Client(String),
}
