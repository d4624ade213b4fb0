// src/content/links.rs
// =============================================================================
// This module extracts links from a page body, remembering where each link
// sits in the document.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows CommonMark
// - Can report the byte range of every event (into_offset_iter)
//
// Every link is keyed by its position: "<line>:<column>", where the line is
// 1-based and counted from the top of the document (front matter included)
// and the column is the 0-based byte offset of the link destination on that
// line. Example:
//
//   line 21:  - [which](https://linux.die.net/man/1/which)
//   key:      "21:10"
//
// Unlike a link checker we keep every destination here (relative paths,
// anchors, files). Sorting them out is the job of checker::links.
// =============================================================================

use super::front_matter::SplitDocument;
use pulldown_cmark::{Event, LinkType, Parser, Tag};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Where a link destination starts inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LinkPosition {
    /// 1-based line number
    pub line: usize,
    /// 0-based byte column
    pub column: usize,
}

impl fmt::Display for LinkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Link destinations of one document, ordered by position
pub type Links = BTreeMap<LinkPosition, String>;

/// Extracts all link destinations from the body of `document`.
///
/// `split` must come from splitting this very `document`.
pub fn extract_links(document: &str, split: &SplitDocument<'_>) -> Links {
    let mut links = Links::new();
    let lines = LineIndex::new(document);

    for (event, range) in Parser::new(split.body).into_offset_iter() {
        // In pulldown-cmark 0.9, Link is Tag::Link(link_type, dest_url, title)
        let Event::Start(Tag::Link(link_type, dest_url, _title)) = event else {
            continue;
        };

        if link_type == LinkType::Email || dest_url.is_empty() {
            continue;
        }

        let source = &split.body[range.clone()];
        let offset = split.body_offset + range.start + destination_offset(source, &dest_url);

        links.insert(lines.position(offset), dest_url.to_string());
    }

    links
}

// Offset of the destination inside the source text of a link:
//   [text](dest "title")  -> after the "]("
//   <dest>                -> after the "<"
// Escaped or reference-style destinations do not appear verbatim, those
// links are keyed by where the link itself starts.
fn destination_offset(source: &str, dest: &str) -> usize {
    let search_from = source.find("](").map(|i| i + 2).unwrap_or(0);

    source[search_from..]
        .find(dest)
        .map(|i| search_from + i)
        .or_else(|| source.find(dest))
        .unwrap_or(0)
}

// Byte offsets at which every line starts
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { starts }
    }

    fn position(&self, offset: usize) -> LinkPosition {
        // number of line starts at or before offset == 1-based line
        let line = self.starts.partition_point(|&start| start <= offset);
        let column = offset - self.starts[line - 1];
        LinkPosition { line, column }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::front_matter::split_document;

    fn links_of(document: &str) -> Vec<(String, String)> {
        let split = split_document(document).unwrap();
        extract_links(document, &split)
            .into_iter()
            .map(|(position, url)| (position.to_string(), url))
            .collect()
    }

    #[test]
    fn test_extract_positions() {
        let document = "+++\ntitle = 'x'\n+++\n\nTopics\n------\n\n- [which](https://linux.die.net/man/1/which)\n- [ping](https://linux.die.net/man/1/ping)\n";
        assert_eq!(
            links_of(document),
            vec![
                ("8:10".to_string(), "https://linux.die.net/man/1/which".to_string()),
                ("9:9".to_string(), "https://linux.die.net/man/1/ping".to_string()),
            ]
        );
    }

    #[test]
    fn test_two_links_on_one_line() {
        let document = "+++\ntitle = 'x'\n+++\nThanks to the [Carrie Anne](https://about.me/carrieannephilbin) and [Crash Course](https://www.youtube.com/@crashcourse)\n";
        assert_eq!(
            links_of(document),
            vec![
                ("4:28".to_string(), "https://about.me/carrieannephilbin".to_string()),
                ("4:83".to_string(), "https://www.youtube.com/@crashcourse".to_string()),
            ]
        );
    }

    #[test]
    fn test_relative_and_file_links_are_kept() {
        let document = "+++\ntitle = 'x'\n+++\n\nDownload [this SQL File](/a1.1/practice-data-cleanup.sql).\n";
        assert_eq!(
            links_of(document),
            vec![("5:25".to_string(), "/a1.1/practice-data-cleanup.sql".to_string())]
        );
    }

    #[test]
    fn test_skip_mailto_autolinks() {
        let document = "+++\ntitle = 'x'\n+++\n\nMail <someone@example.com> or see <https://example.com>\n";
        assert_eq!(
            links_of(document),
            vec![("5:35".to_string(), "https://example.com".to_string())]
        );
    }

    #[test]
    fn test_unmatched_destination_is_keyed_at_link_start() {
        let document = "+++\ntitle = 'x'\n+++\n\nSee [notes](notes\\_v2.md) and [docs][ref]\n\n[ref]: https://example.com/docs\n";
        assert_eq!(
            links_of(document),
            vec![
                ("5:4".to_string(), "notes_v2.md".to_string()),
                ("5:30".to_string(), "https://example.com/docs".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_links() {
        let document = "+++\ntitle = 'x'\n+++\n\nSummary\n-------\n\nNothing to see.\n";
        assert!(links_of(document).is_empty());
    }
}
