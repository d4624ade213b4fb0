// src/report.rs
// =============================================================================
// Turns the checked tree into something a person (or a CI job) can read.
//
// Every command has two outputs:
// - a human-readable rendering, built as a String and printed by main
// - a serde-serializable value, printed as pretty JSON with --json
//
// Nothing in here decides what is wrong; it only shows it.
// =============================================================================

use crate::checker::{BrokenLink, DomainReport, LinkReport};
use crate::content::State;
use crate::hierarchy::{Course, CourseStats, Courses, Page, PageReport};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;

/// Which pages `print` shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeFilter {
    /// Only pages declaring this state; `None` shows all
    pub state: Option<State>,
    pub with_index: bool,
    pub without_non_index: bool,
}

impl TreeFilter {
    pub fn shows(&self, page: &Page) -> bool {
        if page.is_index() && !self.with_index {
            return false;
        }
        if !page.is_index() && self.without_non_index {
            return false;
        }
        match self.state {
            Some(wanted) => page.state() == Some(wanted),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterReport {
    pub chapter: String,
    pub pages: Vec<PageReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseReport {
    pub course: String,
    pub chapters: Vec<ChapterReport>,
}

/// Order issues of one course.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReport {
    pub course: String,
    pub issues: Vec<String>,
}

/// Prints any report as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    println!("{}", json_output);
    Ok(())
}

pub fn tree(courses: &Courses, filter: &TreeFilter) -> Vec<CourseReport> {
    courses
        .iter()
        .map(|course| CourseReport {
            course: course.name.clone(),
            chapters: course
                .chapters
                .iter()
                .map(|chapter| ChapterReport {
                    chapter: chapter.name.clone(),
                    pages: chapter
                        .pages
                        .iter()
                        .filter(|page| filter.shows(page))
                        .map(Page::report)
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

pub fn render_tree(tree: &[CourseReport]) -> String {
    let mut out = String::new();

    for course in tree {
        let _ = writeln!(out, "{}", course.course);
        for chapter in &course.chapters {
            let _ = writeln!(out, "  {}", chapter.chapter);
            for page in &chapter.pages {
                let state = page.state.map(State::as_str).unwrap_or("none");
                let _ = writeln!(out, "    {} {} - {}", page_marker(page), page.file_name, state);
                for issue in &page.issues {
                    let _ = writeln!(out, "        - {}", issue);
                }
            }
        }
    }

    out
}

fn page_marker(page: &PageReport) -> &'static str {
    if !page.issues.is_empty() {
        return "❌";
    }
    match page.state {
        Some(State::Complete) => "✅",
        Some(State::Incomplete) => "🟡",
        _ => "❌",
    }
}

/// Every page error of every course
pub fn errors(courses: &Courses) -> Vec<String> {
    courses.iter().flat_map(Course::errors).collect()
}

/// Per-course stats followed by a `Total` row.
pub fn stats(courses: &Courses) -> Vec<CourseStats> {
    let mut rows: Vec<CourseStats> = courses.iter().map(Course::stats).collect();

    let mut total = CourseStats {
        title: "Total".to_string(),
        ..CourseStats::default()
    };
    for row in &rows {
        total += row;
    }
    rows.push(total);

    rows
}

pub fn render_stats(rows: &[CourseStats]) -> String {
    let grand_total = rows.last().map(|row| row.total).unwrap_or(0);
    let header = [
        "Course".to_string(),
        "All".to_string(),
        "Complete".to_string(),
        "Incomplete".to_string(),
        "Stub".to_string(),
        "Errors".to_string(),
    ];

    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.title.clone(),
                with_percent(row.total, grand_total),
                with_percent(row.complete, row.total),
                with_percent(row.incomplete, row.total),
                with_percent(row.stub, row.total),
                row.errors.to_string(),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |row: &[String; 6]| {
        row.iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    let separator = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(&header));
    let _ = writeln!(out, "{}", separator);
    for (index, row) in cells.iter().enumerate() {
        // the total row gets its own separator
        if index + 1 == cells.len() && index > 0 {
            let _ = writeln!(out, "{}", separator);
        }
        let _ = writeln!(out, "{}", line(row));
    }

    out
}

fn with_percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return format!("{} (0%)", part);
    }
    format!("{} ({:.0}%)", part, part as f64 / whole as f64 * 100.0)
}

pub fn page_order(courses: &Courses) -> Vec<OrderReport> {
    order_reports(courses, Course::page_order_issues)
}

pub fn chapter_order(courses: &Courses) -> Vec<OrderReport> {
    order_reports(courses, Course::chapter_order_issues)
}

fn order_reports(courses: &Courses, issues_of: fn(&Course) -> Vec<String>) -> Vec<OrderReport> {
    courses
        .iter()
        .map(|course| OrderReport {
            course: course.name.clone(),
            issues: issues_of(course),
        })
        .filter(|report| !report.issues.is_empty())
        .collect()
}

pub fn render_order(reports: &[OrderReport]) -> String {
    let mut out = String::new();

    for report in reports {
        let _ = writeln!(out, "{}", report.course);
        let _ = writeln!(out, "{}", "=".repeat(report.course.chars().count()));
        for issue in &report.issues {
            let _ = writeln!(out, "{}", issue);
        }
        let _ = writeln!(out);
    }

    out
}

/// One domain's failures, printed as soon as the domain is done.
pub fn render_domain(report: &DomainReport, verbose: bool) -> String {
    let mut out = String::new();

    for failure in &report.failures {
        let _ = writeln!(
            out,
            "❌ Domain: {}, Status code: {}, URL: {}",
            report.domain, failure.code, failure.url
        );
        for origin in &failure.found_on {
            let _ = writeln!(out, "   - {}", origin);
        }
    }

    if verbose {
        let _ = writeln!(out, "Domain: {}, Count: {}", report.domain, report.checked);
    }

    out
}

fn render_broken(out: &mut String, kind: &str, links: &[BrokenLink]) {
    for broken in links {
        let _ = writeln!(out, "- '{}' NOT FOUND", broken.link);
        for origin in &broken.found_on {
            let _ = writeln!(out, "    - {}", origin);
        }
    }

    if links.is_empty() {
        let _ = writeln!(out, "✅ All {} links found.", kind);
    } else {
        let _ = writeln!(out, "❌ Not found {} {} links.", links.len(), kind);
    }
}

pub fn render_links(report: &LinkReport) -> String {
    let mut out = String::new();

    render_broken(&mut out, "internal", &report.internal);
    render_broken(&mut out, "file", &report.files);

    for domain in &report.skipped_domains {
        let _ = writeln!(out, "Skipping domain: {}", domain);
    }

    if report.external_checked {
        let failures: usize = report.external.iter().map(|d| d.failures.len()).sum();
        let checked: usize = report.external.iter().map(|d| d.checked).sum();
        let _ = writeln!(out);
        let _ = writeln!(out, "📊 External links:");
        let _ = writeln!(out, "   ✅ OK: {}", checked - failures);
        let _ = writeln!(out, "   ❌ Broken: {}", failures);
        let _ = writeln!(out, "   📋 Total: {}", checked);
    }

    out
}
