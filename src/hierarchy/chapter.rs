// src/hierarchy/chapter.rs
// =============================================================================
// A Chapter is every page found in one content/<course>/<chapter>/ directory,
// in the order the pages were added.
//
// Besides holding pages it knows two things:
// - its own weight, which is the weight of its index page
// - whether its pages are numbered 10, 20, 30, ... without gaps or clashes
//
// finalize() back-fills the index page once all pages are in.
// =============================================================================

use super::ordering::{format_weights, WeightBuckets};
use super::page::Page;
use crate::content::{Body, State};

// Page weights are expected to step by this much
const PAGE_WEIGHT_STEP: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub course: String,
    pub name: String,
    pub pages: Vec<Page>,
}

impl Chapter {
    pub fn new(course: impl Into<String>, name: impl Into<String>) -> Self {
        Chapter {
            course: course.into(),
            name: name.into(),
            pages: Vec::new(),
        }
    }

    pub fn add(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn index_page(&self) -> Option<&Page> {
        self.pages.iter().find(|page| page.is_index())
    }

    /// Weight of the index page, 0 without one
    pub fn weight(&self) -> i64 {
        self.index_page().map(Page::weight).unwrap_or(0)
    }

    pub fn errors(&self) -> Vec<String> {
        self.pages.iter().flat_map(Page::errors).collect()
    }

    /// Weight problems of the non-index pages.
    pub fn page_order_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut buckets = WeightBuckets::default();

        for page in self.pages.iter().filter(|page| !page.is_index()) {
            let weight = page.weight();
            buckets.insert(weight, page.path.display().to_string());

            if weight % PAGE_WEIGHT_STEP != 0 {
                issues.push(format!("weird weight: {} ({})", weight, self.name));
            }
        }

        if buckets.largest() < 1 {
            issues.push(format!("no pages found in chapter ({})", self.name));
        }

        for (weight, names) in buckets.duplicates() {
            issues.push(format!(
                "duplicate pages with weight {}: {} ({})",
                weight,
                names.join(", "),
                self.name
            ));
        }

        let missing = buckets.missing(PAGE_WEIGHT_STEP);
        if !missing.is_empty() {
            issues.push(format!(
                "missing pages with weight {} ({})",
                format_weights(&missing),
                self.name
            ));
        }

        issues
    }

    /// Back-fills the index page completion state.
    ///
    /// The index counts as complete when there is at least one other page and
    /// every other page declares itself complete. Running it twice changes
    /// nothing.
    pub fn finalize(&mut self) {
        let mut others = self.pages.iter().filter(|page| !page.is_index()).peekable();
        let every_page_complete = others.peek().is_some()
            && others.all(|page| page.state() == Some(State::Complete));

        for page in self.pages.iter_mut() {
            if let Body::Index(body) = &mut page.content.body {
                body.back_fill(every_page_complete);
            }
        }
    }
}
