// src/discover.rs
// =============================================================================
// Finds the markdown files of a site:
//
//   <root>/content/<course>/<chapter>/<file>.md
//
// Only files at exactly that depth are picked up. The walk is sorted by file
// name so every run sees the files in the same order.
//
// We use the `walkdir` crate which:
// - Walks a directory tree recursively
// - Lets us bound the depth (min_depth / max_depth)
// - Can sort each directory's entries
//
// A file that cannot be read does not stop the walk. It is handed on as an
// IngestError so the ingestion pass can count and report it.
// =============================================================================

use crate::config::ScanConfig;
use crate::error::IngestError;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A markdown file found under `content/`, not parsed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub course: String,
    pub chapter: String,
    pub file_name: String,
    pub raw: Vec<u8>,
}

/// Walks the content tree described by `config`.
///
/// Fails only when the content directory itself is missing.
pub fn discover(config: &ScanConfig) -> Result<Vec<Result<SourceDocument, IngestError>>> {
    let content_dir = config.content_dir();
    if !content_dir.is_dir() {
        bail!("content directory not found: {}", content_dir.display());
    }

    // with a course we start one level deeper
    let (start, depth) = match &config.course {
        Some(course) => (content_dir.join(course), 2),
        None => (content_dir.clone(), 3),
    };

    if !start.is_dir() {
        bail!("course directory not found: {}", start.display());
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(&start)
        .min_depth(depth)
        .max_depth(depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| start.clone());
                documents.push(Err(IngestError::Read {
                    path,
                    source: err.into(),
                }));
                continue;
            }
        };

        if !entry.file_type().is_file() || entry.path().extension().map_or(true, |ext| ext != "md") {
            continue;
        }

        let Some(document) = locate(&content_dir, entry.path()) else {
            debug!(path = %entry.path().display(), "not a course/chapter/page path, skipping");
            continue;
        };

        debug!(path = %document.path.display(), "found markdown file");
        documents.push(read(document));
    }

    Ok(documents)
}

// Splits <content>/<course>/<chapter>/<file> into its parts
fn locate(content_dir: &Path, path: &Path) -> Option<SourceDocument> {
    let relative = path.strip_prefix(content_dir).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;

    let [course, chapter, file_name] = parts.as_slice() else {
        return None;
    };

    Some(SourceDocument {
        path: path.to_path_buf(),
        course: course.to_string(),
        chapter: chapter.to_string(),
        file_name: file_name.to_string(),
        raw: Vec::new(),
    })
}

fn read(mut document: SourceDocument) -> Result<SourceDocument, IngestError> {
    match std::fs::read(&document.path) {
        Ok(raw) => {
            document.raw = raw;
            Ok(document)
        }
        Err(source) => Err(IngestError::Read {
            path: document.path,
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, text: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "content/go/basics/_index.md", "+++\n+++");
        write(dir.path(), "content/go/basics/20-loops.md", "loops");
        write(dir.path(), "content/go/basics/10-variables.md", "variables");
        write(dir.path(), "content/go/basics/notes.txt", "not markdown");
        write(dir.path(), "content/go/_index.md", "too shallow");
        write(dir.path(), "content/go/basics/deep/10-x.md", "too deep");
        write(dir.path(), "content/rust/intro/10-hello.md", "hello");
        dir
    }

    fn names(documents: &[Result<SourceDocument, IngestError>]) -> Vec<String> {
        documents
            .iter()
            .map(|d| {
                let d = d.as_ref().unwrap();
                format!("{}/{}/{}", d.course, d.chapter, d.file_name)
            })
            .collect()
    }

    #[test]
    fn test_discover_whole_site() {
        let dir = site();
        let documents = discover(&ScanConfig::new(dir.path())).unwrap();

        assert_eq!(
            names(&documents),
            vec![
                "go/basics/10-variables.md",
                "go/basics/20-loops.md",
                "go/basics/_index.md",
                "rust/intro/10-hello.md",
            ]
        );

        let first = documents[0].as_ref().unwrap();
        assert_eq!(first.raw, b"variables");
        assert_eq!(first.path, dir.path().join("content/go/basics/10-variables.md"));
    }

    #[test]
    fn test_discover_one_course() {
        let dir = site();
        let config = ScanConfig {
            course: Some("rust".to_string()),
            ..ScanConfig::new(dir.path())
        };

        assert_eq!(names(&discover(&config).unwrap()), vec!["rust/intro/10-hello.md"]);
    }

    #[test]
    fn test_missing_directories() {
        let dir = TempDir::new().unwrap();
        assert!(discover(&ScanConfig::new(dir.path())).is_err());

        let dir = site();
        let config = ScanConfig {
            course: Some("python".to_string()),
            ..ScanConfig::new(dir.path())
        };
        assert!(discover(&config).is_err());
    }
}
