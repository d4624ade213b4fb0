// src/content/sections.rs
// =============================================================================
// This module splits a document body into named sections.
//
// Two heading styles open a section:
//
//   ## Summary            (ATX, exactly two hashes)
//
//   Summary               (Setext, a text line directly followed by a
//   -------                line starting with ---)
//
// A `---` line after an empty line is a horizontal rule, not a heading.
// Deeper headings (### and below) stay inside the current section.
//
// Text before the first heading lands in the implicit "root" section, which
// is dropped when it is empty.
// =============================================================================

/// Title of the implicit section before the first heading
pub const ROOT: &str = "root";

/// One named chunk of a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Lower-cased, trimmed heading text
    pub title: String,
    /// Section text with surrounding whitespace trimmed
    pub content: String,
}

/// Sections in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections(Vec<Section>);

impl Sections {
    /// Walks `body` line by line and cuts it at every heading.
    pub fn extract(body: &str) -> Self {
        let rows: Vec<&str> = body.split('\n').collect();
        let mut sections = Vec::new();

        let mut current = ROOT.to_string();
        let mut start = 0;

        for (i, row) in rows.iter().enumerate() {
            if let Some(heading) = row.strip_prefix("## ") {
                sections.push(Section::new(&current, &rows[start..i]));
                current = heading_title(heading);
                start = i + 1;
                continue;
            }

            // `i > start` keeps the underline of a heading from being read as
            // a second heading
            if i > start && row.starts_with("---") {
                let previous = rows[i - 1];
                if previous.trim().is_empty() {
                    continue;
                }

                sections.push(Section::new(&current, &rows[start..i - 1]));
                current = heading_title(previous);
                start = i + 1;
            }
        }

        sections.push(Section::new(&current, &rows[start..]));

        if sections
            .first()
            .is_some_and(|s| s.title == ROOT && s.content.is_empty())
        {
            sections.remove(0);
        }

        Sections(sections)
    }

    pub fn get(&self, title: &str) -> Option<&Section> {
        self.0.iter().find(|section| section.title == title)
    }

    /// Content of the first section called `title`, empty when absent
    pub fn content(&self, title: &str) -> &str {
        self.get(title).map(|s| s.content.as_str()).unwrap_or_default()
    }

    /// True when the first section called `title` exists and is not empty
    pub fn has_non_empty(&self, title: &str) -> bool {
        self.get(title).is_some_and(|s| !s.content.is_empty())
    }

    pub fn titles(&self) -> Vec<String> {
        self.0.iter().map(|s| s.title.clone()).collect()
    }

    /// Titles of sections that are present but have no content
    pub fn empty_titles(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|s| s.content.is_empty())
            .map(|s| s.title.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Section {
    fn new(title: &str, rows: &[&str]) -> Self {
        Section {
            title: title.to_string(),
            content: rows
                .join("\n")
                .trim_matches(|c| c == ' ' || c == '\t' || c == '\n')
                .to_string(),
        }
    }
}

fn heading_title(raw: &str) -> String {
    raw.trim_matches(|c| c == ' ' || c == '\t').to_lowercase()
}
