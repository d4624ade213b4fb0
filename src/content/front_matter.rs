// src/content/front_matter.rs
// =============================================================================
// This module splits a raw document into its front matter and its body, and
// reads the front matter into a flat key/value map.
//
// The only supported front matter is the TOML-looking `+++` block:
//
//   +++
//   title = "Variables"
//   weight = 20
//   tags = ["go", "basics"]
//   +++
//   ...body...
//
// We do NOT run a TOML parser on it. Every `key = value` line becomes a string
// entry with surrounding quotes trimmed, everything else is ignored. That is
// all the checker needs and it keeps broken front matter from being fatal.
// =============================================================================

use crate::error::ParseError;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Opening and closing delimiter of the front matter block
pub const DELIMITER: &str = "+++";

// Two delimiters is the least a document can contain
const MIN_DOCUMENT_LENGTH: usize = DELIMITER.len() * 2;

static HEADER_LINE: OnceLock<Regex> = OnceLock::new();

fn header_line_regex() -> &'static Regex {
    HEADER_LINE.get_or_init(|| Regex::new(r"^(\S+)\s*=\s*(.*)$").expect("header line regex"))
}

/// The pieces of a document after splitting off the front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    /// Raw text between the two `+++` lines
    pub header: &'a str,
    /// Body with leading/trailing blank lines removed
    pub body: &'a str,
    /// Byte offset of `body` inside the (normalised) document
    pub body_offset: usize,
}

/// Converts DOS/Windows line endings into Unix ones.
pub fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n")
}

/// Splits a normalised document into front matter and body.
///
/// Fails when the document is too short, does not open with `+++`, or never
/// closes the block.
pub fn split_document(document: &str) -> Result<SplitDocument<'_>, ParseError> {
    if document.len() < MIN_DOCUMENT_LENGTH {
        return Err(ParseError::TooShort);
    }

    let opening = "+++\n";
    if !document.starts_with(opening) {
        return Err(ParseError::MissingFrontMatter);
    }

    let after_opening = &document[opening.len()..];
    let closing = "\n+++";
    let header_len = after_opening
        .find(closing)
        .ok_or(ParseError::UnterminatedFrontMatter)?;

    let header = &after_opening[..header_len];
    let rest_offset = opening.len() + header_len + closing.len();
    let rest = &document[rest_offset..];

    let is_padding = |c: char| c == '\n' || c == '+';
    let trimmed_start = rest.trim_start_matches(is_padding);
    let body_offset = rest_offset + (rest.len() - trimmed_start.len());
    let body = trimmed_start.trim_end_matches(is_padding);

    Ok(SplitDocument {
        header,
        body,
        body_offset,
    })
}

/// Flat string map read from the front matter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    values: BTreeMap<String, String>,
}

impl FrontMatter {
    /// Reads every `key = value` line; malformed lines are skipped.
    pub fn parse(header: &str) -> Self {
        let mut values = BTreeMap::new();

        for line in header.lines() {
            let Some(captures) = header_line_regex().captures(line) else {
                continue;
            };

            let value = captures[2].trim_matches(|c| c == '\'' || c == '"');
            values.insert(captures[1].to_string(), value.to_string());
        }

        FrontMatter { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of `key`, or the empty string when it is absent
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// The `tags` list, or `None` when no `tags` key exists.
    ///
    /// `tags = ["a", 'b', c]` gives `["a", "b", "c"]`.
    pub fn tags(&self) -> Option<Vec<String>> {
        let raw = self.get("tags")?;
        let inner = raw.trim_matches(|c| c == '[' || c == ']');

        Some(
            inner
                .split(',')
                .map(|part| {
                    part.trim_matches(|c| c == ' ' || c == '\'' || c == '"')
                        .to_string()
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
