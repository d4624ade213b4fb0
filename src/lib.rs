// src/lib.rs
// =============================================================================
// content-checker validates a Hugo-style course site:
//
//   content/<course>/<chapter>/_index.md      chapter index
//   content/<course>/<chapter>/10-<slug>.md   pages, ordered by weight
//
// Modules, in the order data flows through them:
// - discover:  find the markdown files
// - content:   parse one file into a Content and judge it
// - hierarchy: roll pages up into chapters and courses
// - checker:   check internal/file links and probe external ones
// - report:    render the results
//
// config and error hold the shared configuration and error types.
// =============================================================================

pub mod checker;
pub mod config;
pub mod content;
pub mod discover;
pub mod error;
pub mod hierarchy;
pub mod report;

pub use config::{ProbeConfig, ScanConfig};
pub use content::{parse_document, Body, Content, State};
pub use error::{IngestError, ParseError};
pub use hierarchy::{Courses, Ingestion};
