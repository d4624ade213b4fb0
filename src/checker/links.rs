// src/checker/links.rs
// =============================================================================
// This module sorts the links of all pages and checks each kind:
//
//   https://go.dev/doc/          external  -> probed per domain (opt-in)
//   /go/basics/variables/        internal  -> must be a known page
//   /a1.1/practice-data.sql      file      -> must exist under static/ or content/
//   #summary, mailto:...         ignored
//
// Every link remembers where it was found ("<path>:<line>:<column>") so the
// report can point at the page.
//
// External probing fans out one task per domain. Each task runs its own
// DomainClient. A shared mutex keeps the per-domain callbacks (printing)
// from interleaving, and join_all waits for every domain.
// =============================================================================

use super::http::{DomainClient, ProbeResult, Sleeper, Transport};
use crate::config::{ProbeConfig, ScanConfig};
use crate::hierarchy::Courses;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Link target -> places it was found on
pub type Origins = BTreeMap<String, Vec<String>>;

/// What kind of target a link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    External { domain: String },
    Internal(String),
    File(String),
    Ignored,
}

/// Classifies a single link target.
pub fn classify_link(target: &str) -> LinkKind {
    let target = target.trim();
    if target.is_empty() || target.starts_with('#') {
        return LinkKind::Ignored;
    }

    match Url::parse(target) {
        Ok(url) => match (url.scheme(), url.host_str()) {
            ("http" | "https", Some(host)) => LinkKind::External {
                domain: host.to_string(),
            },
            _ => LinkKind::Ignored,
        },
        // no scheme: a site path or a file
        Err(_) => {
            let path = target
                .split(|c| c == '#' || c == '?')
                .next()
                .unwrap_or_default();

            if path.is_empty() {
                LinkKind::Ignored
            } else if has_extension(path) {
                LinkKind::File(path.to_string())
            } else {
                LinkKind::Internal(path.to_string())
            }
        }
    }
}

// Only the last path segment counts: "/go/v1.2/" is a directory
fn has_extension(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|last| Path::new(last).extension().is_some())
}

/// Links of the whole tree, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSets {
    /// domain -> url -> origins
    pub external: BTreeMap<String, Origins>,
    pub internal: Origins,
    pub files: Origins,
}

impl LinkSets {
    pub fn collect(courses: &Courses) -> Self {
        let mut sets = LinkSets::default();

        for course in courses.iter() {
            for link in course.links() {
                let origin = link.origin();

                let bucket = match classify_link(link.target) {
                    LinkKind::External { domain } => sets
                        .external
                        .entry(domain)
                        .or_default()
                        .entry(link.target.to_string()),
                    LinkKind::Internal(path) => sets.internal.entry(path),
                    LinkKind::File(path) => sets.files.entry(path),
                    LinkKind::Ignored => {
                        debug!(origin, target = link.target, "ignoring link");
                        continue;
                    }
                };

                bucket.or_default().push(origin);
            }
        }

        sets
    }

    pub fn external_count(&self) -> usize {
        self.external.values().map(BTreeMap::len).sum()
    }
}

/// A link whose target could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub link: String,
    pub found_on: Vec<String>,
}

/// An external URL that did not answer 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalFailure {
    pub url: String,
    pub code: u16,
    pub found_on: Vec<String>,
}

/// Probe outcome of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    pub domain: String,
    pub checked: usize,
    pub failures: Vec<ExternalFailure>,
}

/// Everything check-links found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub internal: Vec<BrokenLink>,
    pub files: Vec<BrokenLink>,
    pub external: Vec<DomainReport>,
    pub skipped_domains: Vec<String>,
    pub external_checked: bool,
}

impl LinkReport {
    pub fn broken_count(&self) -> usize {
        self.internal.len()
            + self.files.len()
            + self
                .external
                .iter()
                .map(|domain| domain.failures.len())
                .sum::<usize>()
    }

    pub fn is_clean(&self) -> bool {
        self.broken_count() == 0
    }
}

/// Internal links that are not the path of any page (with or without a
/// trailing slash).
pub fn check_internal(links: &Origins, valid: &BTreeSet<String>) -> Vec<BrokenLink> {
    links
        .iter()
        .filter(|(link, _)| !valid.contains(*link) && !valid.contains(&format!("{link}/")))
        .map(|(link, found_on)| BrokenLink {
            link: link.clone(),
            found_on: found_on.clone(),
        })
        .collect()
}

/// File links that exist neither under `static/` nor under `content/`.
pub fn check_files(links: &Origins, config: &ScanConfig) -> Vec<BrokenLink> {
    let static_dir = config.static_dir();
    let content_dir = config.content_dir();

    links
        .iter()
        .filter(|(link, _)| {
            let relative = link.trim_start_matches('/');
            !static_dir.join(relative).exists() && !content_dir.join(relative).exists()
        })
        .map(|(link, found_on)| BrokenLink {
            link: link.clone(),
            found_on: found_on.clone(),
        })
        .collect()
}

/// Result of probing all domains.
#[derive(Debug, Default)]
pub struct ProbeOutcome {
    pub reports: Vec<DomainReport>,
    pub skipped: Vec<String>,
}

struct Collector<F> {
    on_domain: F,
    reports: Vec<DomainReport>,
}

/// Probes every domain concurrently.
///
/// `on_domain` is called once per finished domain, never concurrently.
/// Reports come back sorted by domain.
pub async fn probe_domains<F>(
    external: &BTreeMap<String, Origins>,
    config: &ProbeConfig,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    on_domain: F,
) -> ProbeOutcome
where
    F: FnMut(&DomainReport) + Send + 'static,
{
    let collector = Arc::new(Mutex::new(Collector {
        on_domain,
        reports: Vec::new(),
    }));
    let mut skipped = Vec::new();
    let mut tasks = Vec::new();

    for (domain, origins) in external {
        if config.is_skipped(domain) {
            info!(domain, "skipping domain");
            skipped.push(domain.clone());
            continue;
        }

        let client = DomainClient::new(
            domain,
            config.clone(),
            Arc::clone(&transport),
            Arc::clone(&sleeper),
        );
        let origins = origins.clone();
        let collector = Arc::clone(&collector);

        tasks.push(tokio::spawn(async move {
            let urls: Vec<String> = origins.keys().cloned().collect();
            let results = client.fetch_pages(urls).await;
            let report = domain_report(client.domain(), &origins, results);

            let mut collector = collector.lock().await;
            (collector.on_domain)(&report);
            collector.reports.push(report);
        }));
    }

    for joined in join_all(tasks).await {
        if let Err(err) = joined {
            warn!("domain probe task failed: {err}");
        }
    }

    let mut reports = std::mem::take(&mut collector.lock().await.reports);
    reports.sort_by(|a, b| a.domain.cmp(&b.domain));

    ProbeOutcome { reports, skipped }
}

fn domain_report(domain: &str, origins: &Origins, results: Vec<ProbeResult>) -> DomainReport {
    let checked = results.len();
    let failures = results
        .into_iter()
        .filter(|result| !result.is_ok())
        .map(|result| ExternalFailure {
            found_on: origins.get(&result.url).cloned().unwrap_or_default(),
            url: result.url,
            code: result.code,
        })
        .collect();

    DomainReport {
        domain: domain.to_string(),
        checked,
        failures,
    }
}

/// Runs every link check on a finalized tree.
///
/// External links are only probed when `probe` is given.
pub async fn check_links<F>(
    courses: &Courses,
    scan: &ScanConfig,
    probe: Option<(&ProbeConfig, Arc<dyn Transport>, Arc<dyn Sleeper>)>,
    on_domain: F,
) -> LinkReport
where
    F: FnMut(&DomainReport) + Send + 'static,
{
    let sets = LinkSets::collect(courses);
    debug!(
        internal = sets.internal.len(),
        files = sets.files.len(),
        external = sets.external_count(),
        "links collected"
    );

    let mut report = LinkReport {
        internal: check_internal(&sets.internal, &courses.valid_internal_links()),
        files: check_files(&sets.files, scan),
        ..LinkReport::default()
    };

    if let Some((config, transport, sleeper)) = probe {
        let outcome = probe_domains(&sets.external, config, transport, sleeper, on_domain).await;
        report.external = outcome.reports;
        report.skipped_domains = outcome.skipped;
        report.external_checked = true;
    }

    report
}
