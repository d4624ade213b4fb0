// src/content/document.rs
// =============================================================================
// This module turns one raw markdown file into a `Content`: the parsed front
// matter, the body variant, the empty sections and the links.
//
// Parsing pipeline:
//
//   raw text
//     -> normalize_line_endings
//     -> split_document          (fails: ParseError)
//     -> FrontMatter::parse      (header)
//     -> Sections::extract       (body)
//     -> Body::select            (Default / Index / Practice)
//     -> extract_links           (whole document, for line numbers)
//
// A Content never changes after parsing, with one exception: the Index body
// gets its completion state back-filled by the chapter it belongs to.
//
// Content::issues() runs the checks that need the file name and chapter name
// on top of whatever the body itself reports.
// =============================================================================

use super::body::{Body, State};
use super::front_matter::{normalize_line_endings, split_document, FrontMatter};
use super::links::{extract_links, Links};
use super::sections::Sections;
use super::slug::slugify;
use crate::error::ParseError;

/// The audience that means "everybody"
pub const AUDIENCE_ALL: &str = "all";

/// Every audience a page may declare
pub const VALID_AUDIENCES: &[&str] = &[
    AUDIENCE_ALL,
    "all professionals",
    "Linux users",
    "Windows users",
    "Mac users",
    "all developers",
    "web developers",
    "mobile developers",
    "desktop developers",
    "game developers",
    "sysadmins",
];

pub fn is_valid_audience(audience: &str) -> bool {
    VALID_AUDIENCES.contains(&audience)
}

/// Numeric level of an importance value, -1 when unknown (or empty).
pub fn importance_level(importance: &str) -> i32 {
    match importance {
        "critical" => 5,
        "essential" => 4,
        "important" => 3,
        "relevant" => 2,
        "optional" => 1,
        _ => -1,
    }
}

/// One parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub title: String,
    /// Declared state, `None` when the front matter has none (or an unknown one)
    pub state: Option<State>,
    pub body: Body,
    pub slug: String,
    pub weight: String,
    pub audience: String,
    pub importance: String,
    pub outside_importance: String,
    /// `None` when the front matter has no `tags` key
    pub tags: Option<Vec<String>>,
    pub empty_sections: Vec<String>,
    pub links: Links,
}

/// Parses a raw document.
pub fn parse_document(raw: &str) -> Result<Content, ParseError> {
    let document = normalize_line_endings(raw);
    let split = split_document(&document)?;

    let front_matter = FrontMatter::parse(split.header);
    let sections = Sections::extract(split.body);
    let tags = front_matter.tags();

    let body = Body::select(
        front_matter.get_or_empty("archetype"),
        &sections,
        tags.as_deref().unwrap_or_default(),
    );

    let field = |key: &str| front_matter.get_or_empty(key).to_string();

    Ok(Content {
        title: field("title"),
        state: front_matter.get("state").and_then(|s| s.parse().ok()),
        body,
        slug: field("slug"),
        weight: field("weight"),
        audience: field("audience"),
        importance: field("audienceImportance"),
        outside_importance: field("outsideImportance"),
        tags,
        empty_sections: sections.empty_titles(),
        links: extract_links(&document, &split),
    })
}

impl Content {
    pub fn is_index(&self) -> bool {
        self.body.is_index()
    }

    /// Weight as a number, 0 when it is not one
    pub fn weight_number(&self) -> i64 {
        self.weight.trim().parse().unwrap_or(0)
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    /// All rule violations of this document.
    ///
    /// `file_name` is the bare file name (`20-variables.md`), `chapter` the
    /// name of the directory the file lives in.
    pub fn issues(&self, file_name: &str, chapter: &str) -> Vec<String> {
        let mut issues = self.body.list_issues(self.state);
        let expected_slug = slugify(&self.title);

        if self.is_index() {
            if chapter != expected_slug {
                issues.push(format!(
                    "chapter does not match the slug, file name: {file_name}, chapter: {chapter}, slug: {expected_slug}"
                ));
            }
        } else {
            issues.extend(self.file_name_issues(file_name));

            if !self.body.is_slug_forced() && self.slug != expected_slug {
                issues.push(format!(
                    "slug does not match the lowercase title with dashes (`{}`, `{}`)",
                    self.slug, expected_slug
                ));
            }
        }

        if self.state == Some(State::Complete) && !self.empty_sections.is_empty() {
            issues.push(format!("empty sections: {}", self.empty_sections.join(", ")));
        }

        issues.extend(self.audience_issues());
        issues.extend(self.tag_issues());

        issues
    }

    fn file_name_issues(&self, file_name: &str) -> Vec<String> {
        let mut issues = Vec::new();

        if !file_name.starts_with(&self.weight) {
            issues.push(format!(
                "file name is not prefixed with the weight of the page, file name: {}, weight: {}",
                file_name, self.weight
            ));
        }

        if format!("{}-{}.md", self.weight, self.slug) != file_name {
            issues.push(format!(
                "file name does not match the dash joined weight and slug, file name: {}, weight: {}",
                file_name, self.weight
            ));
        }

        issues
    }

    fn audience_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !is_valid_audience(&self.audience) {
            issues.push(format!("invalid audience: {}", self.audience));
        }

        if importance_level(&self.importance) < importance_level(&self.outside_importance) {
            issues.push("importance is lower than outside importance".to_string());
        }

        let for_everyone = self.audience == AUDIENCE_ALL;
        if self.outside_importance.is_empty() && !for_everyone {
            issues.push("outside importance is invalid".to_string());
        }
        if !self.outside_importance.is_empty() && for_everyone {
            issues.push("audience is 'all', outside importance must be empty".to_string());
        }

        issues
    }

    fn tag_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for tag in self.tags() {
            if tag == "unsorted" {
                issues.push("tag is 'unsorted'".to_string());
            }
            if tag.to_lowercase() != *tag {
                issues.push(format!("tag is not lowercase: {tag}"));
            }
            if tag.contains(' ') {
                issues.push(format!("tag contains spaces: {tag}"));
            }
        }

        issues
    }
}
