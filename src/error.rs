// src/error.rs
// =============================================================================
// Typed errors for the library layer.
//
// Two kinds of things can go wrong while reading content:
// - A document cannot be parsed at all (ParseError). That file is skipped.
// - A file cannot be turned into a document (IngestError). Also skipped.
//
// Rule violations found in a *parsed* document are NOT errors. They are plain
// issue strings collected per page (see content::document).
//
// The binary side uses anyhow on top of these, like the rest of the CLI.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why a raw document could not be turned into a `Content`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Shorter than an opening plus a closing front matter delimiter
    #[error("markdown too short")]
    TooShort,

    /// The document does not start with a `+++` line
    #[error("markdown header could not be extracted: missing `+++` front matter")]
    MissingFrontMatter,

    /// The opening `+++` was found but the closing one never was
    #[error("markdown header could not be extracted: front matter is not closed")]
    UnterminatedFrontMatter,
}

/// A single source file that had to be skipped during ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("cannot parse markdown: {path}, err: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl IngestError {
    /// The file this error belongs to
    pub fn path(&self) -> &PathBuf {
        match self {
            IngestError::Read { path, .. }
            | IngestError::Encoding { path }
            | IngestError::Parse { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_mentions_path() {
        let err = IngestError::Parse {
            path: PathBuf::from("content/go/basics/10-intro.md"),
            source: ParseError::TooShort,
        };
        let message = err.to_string();
        assert!(message.contains("content/go/basics/10-intro.md"));
        assert!(message.contains("markdown too short"));
        assert_eq!(err.path(), &PathBuf::from("content/go/basics/10-intro.md"));
    }
}
