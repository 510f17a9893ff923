//! Error types for the scrape, merge and roster stages.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::SourceKind;

/// Failures that turn one source into an absent dataset.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport failure or non-success HTTP status.
    #[error("{source_kind}: failed to fetch {url}: {cause}")]
    Fetch {
        source_kind: SourceKind,
        url: String,
        #[source]
        cause: reqwest::Error,
    },

    /// No table on the page has a POS column plus a DRIVER or NAME column.
    #[error("{source_kind}: no results table among {tables} table(s) (expected POS and DRIVER/NAME headers)")]
    NoTableFound { source_kind: SourceKind, tables: usize },

    /// A table was selected but its header cannot be read as results.
    #[error("{source_kind}: results table missing {missing:?} (found {found:?})")]
    SchemaMismatch {
        source_kind: SourceKind,
        missing: Vec<&'static str>,
        found: Vec<String>,
    },
}

impl ScrapeError {
    pub fn kind(&self) -> SourceKind {
        match self {
            ScrapeError::Fetch { source_kind, .. }
            | ScrapeError::NoTableFound { source_kind, .. }
            | ScrapeError::SchemaMismatch { source_kind, .. } => *source_kind,
        }
    }
}

/// At least one of the three datasets was absent when the merge ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot build model: missing {} data", missing_list(.missing))]
pub struct MergeAbort {
    pub missing: Vec<SourceKind>,
}

fn missing_list(missing: &[SourceKind]) -> String {
    use itertools::Itertools;
    missing.iter().map(|k| k.label()).join(", ")
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected roster payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid round {value:?} in roster payload")]
    InvalidRound { value: String },

    #[error("no event with results found for season {season}")]
    NoEvent { season: i32 },

    #[error("cache I/O on {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
