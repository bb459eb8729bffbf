//! Errors surfaced by the serving path.
//!
//! The offline indexer and the CLI use `anyhow`; everything a serving layer
//! calls returns [`QueryError`] so that "the data is not there" can be told
//! apart from "there are no results".

use std::io;
use std::path::PathBuf;

/// Failure of a directory query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The dataset could not be opened or read.
    #[error("data source unavailable: {}", path.display())]
    DataSourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A persisted index file exists but could not be read.
    #[error("index unavailable: {}", path.display())]
    IndexUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A persisted index file could not be decoded.
    #[error("index record is corrupt: {}", path.display())]
    IndexCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The caller cancelled the query or its deadline elapsed.
    #[error("query cancelled")]
    Cancelled,
}

impl QueryError {
    pub(crate) fn data_source(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::DataSourceUnavailable {
            path: path.into(),
            source,
        }
    }

    /// True when the failure means the backing data cannot be served at all,
    /// as opposed to a cancelled request.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        let err = QueryError::data_source(
            "/missing/names.txt",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("/missing/names.txt"));
        assert!(!QueryError::Cancelled.is_unavailable());
    }
}
