// src/hierarchy/page.rs
// =============================================================================
// A Page is a parsed document plus where it was found:
//
//   content/<course>/<chapter>/<file_name>
//
// The location matters for the checks that compare the file name and the
// chapter directory against the front matter.
// =============================================================================

use crate::content::{Content, State};
use serde::Serialize;
use std::path::PathBuf;

/// File name of a chapter's index page
pub const INDEX_FILE_NAME: &str = "_index.md";

/// One document in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Path the document was read from
    pub path: PathBuf,
    pub course: String,
    pub chapter: String,
    pub file_name: String,
    pub content: Content,
}

impl Page {
    /// True for the chapter index, by body kind or by file name
    pub fn is_index(&self) -> bool {
        self.content.is_index() || self.file_name == INDEX_FILE_NAME
    }

    pub fn weight(&self) -> i64 {
        self.content.weight_number()
    }

    /// Declared state
    pub fn state(&self) -> Option<State> {
        self.content.state
    }

    pub fn issues(&self) -> Vec<String> {
        self.content.issues(&self.file_name, &self.chapter)
    }

    /// Issues prefixed with the page path, ready to print.
    pub fn errors(&self) -> Vec<String> {
        self.issues()
            .into_iter()
            .map(|issue| format!("{} - {}", self.path.display(), issue))
            .collect()
    }

    /// Site path the page is served at.
    ///
    ///   /<course>/<chapter>/<slug>/   regular pages
    ///   /<course>/<chapter>/          the index page
    pub fn internal_link(&self) -> String {
        if self.is_index() {
            format!("/{}/{}/", self.course, self.chapter)
        } else {
            format!("/{}/{}/{}/", self.course, self.chapter, self.content.slug)
        }
    }

    pub fn report(&self) -> PageReport {
        PageReport {
            path: self.path.display().to_string(),
            file_name: self.file_name.clone(),
            state: self.state(),
            derived_state: self.content.body.derive_state().0,
            issues: self.issues(),
        }
    }
}

/// What the reports need to know about a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub path: String,
    pub file_name: String,
    pub state: Option<State>,
    pub derived_state: State,
    pub issues: Vec<String>,
}
