// src/hierarchy/course.rs
// =============================================================================
// A Course is the list of chapters found under content/<course>/.
//
// Chapters are ordered by the weight of their index page, and unlike pages
// they step by 1: chapter weights 1, 2, 3, ... are expected with no gaps.
// =============================================================================

use super::chapter::Chapter;
use super::ordering::{format_weights, WeightBuckets};
use super::page::Page;
use crate::content::{LinkPosition, State};
use serde::Serialize;
use std::ops::AddAssign;

const CHAPTER_WEIGHT_STEP: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub name: String,
    pub chapters: Vec<Chapter>,
}

/// Page counts of a course (or of all of them, see `AddAssign`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CourseStats {
    pub title: String,
    pub total: usize,
    pub stub: usize,
    pub incomplete: usize,
    pub complete: usize,
    /// Pages with at least one issue
    pub errors: usize,
}

impl AddAssign<&CourseStats> for CourseStats {
    fn add_assign(&mut self, other: &CourseStats) {
        self.total += other.total;
        self.stub += other.stub;
        self.incomplete += other.incomplete;
        self.complete += other.complete;
        self.errors += other.errors;
    }
}

/// A link found on a page, with the page it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink<'a> {
    pub page: &'a Page,
    pub position: LinkPosition,
    pub target: &'a str,
}

impl<'a> PageLink<'a> {
    /// `<path>:<line>:<column>`, how reports refer to a link
    pub fn origin(&self) -> String {
        format!("{}:{}", self.page.path.display(), self.position)
    }
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Course {
            name: name.into(),
            chapters: Vec::new(),
        }
    }

    /// Appends `page` to the chapter of the same name, creating it if needed.
    pub fn add(&mut self, page: Page) {
        match self.chapters.iter_mut().find(|c| c.name == page.chapter) {
            Some(chapter) => chapter.add(page),
            None => {
                let mut chapter = Chapter::new(&self.name, &page.chapter);
                chapter.add(page);
                self.chapters.push(chapter);
            }
        }
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.chapters.iter().flat_map(|chapter| chapter.pages.iter())
    }

    pub fn errors(&self) -> Vec<String> {
        self.chapters.iter().flat_map(Chapter::errors).collect()
    }

    pub fn page_order_issues(&self) -> Vec<String> {
        self.chapters
            .iter()
            .flat_map(Chapter::page_order_issues)
            .collect()
    }

    /// Weight problems of the chapters, using each chapter's index weight.
    pub fn chapter_order_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let buckets: WeightBuckets = self
            .chapters
            .iter()
            .map(|chapter| (chapter.weight(), chapter.name.clone()))
            .collect();

        if buckets.largest() < 1 {
            issues.push(format!("no chapters found in course ({})", self.name));
        }

        for (weight, names) in buckets.duplicates() {
            issues.push(format!(
                "duplicate chapters with weight {}: {} ({})",
                weight,
                names.join(", "),
                self.name
            ));
        }

        let missing = buckets.missing(CHAPTER_WEIGHT_STEP);
        if !missing.is_empty() {
            issues.push(format!(
                "missing chapter with weight {} ({})",
                format_weights(&missing),
                self.name
            ));
        }

        issues
    }

    /// Every link of every page, in page order then position order.
    pub fn links(&self) -> Vec<PageLink<'_>> {
        self.pages()
            .flat_map(|page| {
                page.content.links.iter().map(move |(position, target)| PageLink {
                    page,
                    position: *position,
                    target,
                })
            })
            .collect()
    }

    pub fn stats(&self) -> CourseStats {
        let mut stats = CourseStats {
            title: self.name.clone(),
            ..CourseStats::default()
        };

        for page in self.pages() {
            stats.total += 1;
            match page.state() {
                Some(State::Stub) => stats.stub += 1,
                Some(State::Incomplete) => stats.incomplete += 1,
                Some(State::Complete) => stats.complete += 1,
                None => {}
            }
            if !page.issues().is_empty() {
                stats.errors += 1;
            }
        }

        stats
    }

    pub fn finalize(&mut self) {
        for chapter in self.chapters.iter_mut() {
            chapter.finalize();
        }
    }
}
