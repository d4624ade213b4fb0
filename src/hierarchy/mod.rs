// src/hierarchy/mod.rs
// =============================================================================
// The course -> chapter -> page tree.
//
// The tree is built in two phases:
//
//   1. ingest()    one pass over the discovered files; every file is parsed
//                  and appended to the course/chapter of the same name
//   2. finalize()  chapters back-fill their index pages
//
// After that the tree is only read: issues, ordering checks, stats and links
// are all computed on demand.
// =============================================================================

pub mod chapter;
pub mod course;
pub mod ordering;
pub mod page;

pub use chapter::Chapter;
pub use course::{Course, CourseStats, PageLink};
pub use page::{Page, PageReport, INDEX_FILE_NAME};

use crate::config::ScanConfig;
use crate::content::parse_document;
use crate::discover::SourceDocument;
use crate::error::IngestError;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// All courses, in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Courses {
    pub courses: Vec<Course>,
}

/// Outcome of one ingestion pass.
#[derive(Debug, Default)]
pub struct Ingestion {
    /// Files that made it into the tree
    pub processed: usize,
    /// Files that were skipped because they could not be read or parsed
    pub failures: Vec<IngestError>,
    /// True when the error budget stopped the pass early
    pub halted: bool,
}

impl Courses {
    pub fn new() -> Self {
        Courses::default()
    }

    /// Appends `page` to its course, creating the course if needed.
    pub fn add(&mut self, page: Page) {
        match self.courses.iter_mut().find(|c| c.name == page.course) {
            Some(course) => course.add(page),
            None => {
                let mut course = Course::new(&page.course);
                course.add(page);
                self.courses.push(course);
            }
        }
    }

    /// Parses and inserts every document, in order.
    ///
    /// A file that cannot be read or parsed is recorded and skipped. With a
    /// tag filter, documents without any of the wanted tags are left out.
    /// Files with issues and skipped files both count against
    /// `config.max_errors`; once it is reached the rest is not looked at.
    pub fn ingest<I>(&mut self, documents: I, config: &ScanConfig) -> Ingestion
    where
        I: IntoIterator<Item = Result<SourceDocument, IngestError>>,
    {
        let mut ingestion = Ingestion::default();
        let mut error_count = 0;

        for item in documents {
            if config.error_budget().is_some_and(|max| error_count >= max) {
                warn!(error_count, "max errors reached, stopping");
                ingestion.halted = true;
                break;
            }

            let page = match item.and_then(into_page) {
                Ok(page) => page,
                Err(err) => {
                    warn!("skipping {}: {}", err.path().display(), err);
                    error_count += 1;
                    ingestion.failures.push(err);
                    continue;
                }
            };

            if !config.matches_tags(page.content.tags()) {
                debug!(path = %page.path.display(), "no wanted tag, skipping");
                continue;
            }

            if !page.issues().is_empty() {
                error_count += 1;
            }

            debug!(path = %page.path.display(), "adding page");
            self.add(page);
            ingestion.processed += 1;
        }

        ingestion
    }

    /// Back-fills every chapter. Safe to call more than once.
    pub fn finalize(&mut self) {
        for course in self.courses.iter_mut() {
            course.finalize();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.courses.iter().flat_map(Course::pages)
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Site paths of every known page
    pub fn valid_internal_links(&self) -> BTreeSet<String> {
        self.pages().map(Page::internal_link).collect()
    }
}

fn into_page(document: SourceDocument) -> Result<Page, IngestError> {
    let SourceDocument {
        path,
        course,
        chapter,
        file_name,
        raw,
    } = document;

    let text = match String::from_utf8(raw) {
        Ok(text) => text,
        Err(_) => return Err(IngestError::Encoding { path }),
    };

    let content = match parse_document(&text) {
        Ok(content) => content,
        Err(source) => return Err(IngestError::Parse { path, source }),
    };

    Ok(Page {
        path,
        course,
        chapter,
        file_name,
        content,
    })
}
