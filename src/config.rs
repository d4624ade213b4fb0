// src/config.rs
// =============================================================================
// Run configuration, built by the CLI and handed to the library.
//
// ScanConfig  which part of the content tree to look at
// ProbeConfig how politely to probe external links
//
// Defaults for probing:
//   throttle 5s between requests to the same domain
//   3 retries, transport failures back off 1s, 4s, 16s, ...
//   3 workers per domain
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_THROTTLE: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);
pub const DEFAULT_WORKERS: usize = 3;

/// Domains that block or rate-limit automated requests so hard that probing
/// them only produces noise
pub const SKIP_DOMAINS: &[&str] = &[
    "codeforces.com",
    "developer.android.com",
    "leetcode.com",
    "linux.die.net",
    "marketplace.visualstudio.com",
    "udemy.com",
    "youtube.com",
    "www.amazon.com",
    "www.canva.com",
    "www.cloudflare.com",
    "www.java.com",
    "www.linux.org",
    "www.make.com",
    "www.mercurial-scm.org",
    "www.skillshare.com",
    "www.softwaretestinghelp.com",
    "www.whatsapp.com",
    "www.youtube.com",
];

/// Which documents to scan and when to give up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanConfig {
    /// Site root, the directory holding `content/` and `static/`
    pub root: PathBuf,
    /// Only scan this course
    pub course: Option<String>,
    /// Only keep documents carrying at least one of these tags
    pub tags: Vec<String>,
    /// Stop after this many files with errors, 0 or `None` means never
    pub max_errors: Option<usize>,
}

impl ScanConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ScanConfig {
            root: root.into(),
            ..ScanConfig::default()
        }
    }

    /// The error budget, if there is one
    pub fn error_budget(&self) -> Option<usize> {
        self.max_errors.filter(|&max| max > 0)
    }

    /// True when no tag filter is set or `tags` has a wanted tag.
    pub fn matches_tags(&self, tags: &[String]) -> bool {
        self.tags.is_empty() || tags.iter().any(|tag| self.tags.contains(tag))
    }

    /// True when the scan covers only part of the tree
    pub fn is_filtered(&self) -> bool {
        self.course.is_some() || !self.tags.is_empty()
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join("static")
    }
}

/// Pacing of the external link prober.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Pause before each request to a domain, and after a 429
    pub throttle: Duration,
    /// Extra attempts after the first one
    pub retries: u32,
    /// Base delay after a transport failure, grows 4x per attempt
    pub backoff: Duration,
    /// Concurrent requests per domain
    pub workers: usize,
    /// Skip the domains in `SKIP_DOMAINS`
    pub skip_unreliable: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            throttle: DEFAULT_THROTTLE,
            retries: DEFAULT_RETRIES,
            backoff: DEFAULT_BACKOFF,
            workers: DEFAULT_WORKERS,
            skip_unreliable: true,
        }
    }
}

impl ProbeConfig {
    /// Delay after the `attempt`-th (0-based) transport failure
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32.checked_shl(attempt.saturating_mul(2)).unwrap_or(u32::MAX))
    }

    pub fn is_skipped(&self, domain: &str) -> bool {
        self.skip_unreliable && SKIP_DOMAINS.contains(&domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_budget() {
        assert_eq!(ScanConfig::default().error_budget(), None);

        let config = ScanConfig {
            max_errors: Some(0),
            ..ScanConfig::default()
        };
        assert_eq!(config.error_budget(), None);

        let config = ScanConfig {
            max_errors: Some(4),
            ..ScanConfig::default()
        };
        assert_eq!(config.error_budget(), Some(4));
    }

    #[test]
    fn test_matches_tags() {
        let config = ScanConfig::new(".");
        assert!(config.matches_tags(&[]));

        let config = ScanConfig {
            tags: vec!["go".to_string(), "rust".to_string()],
            ..ScanConfig::new(".")
        };
        assert!(config.matches_tags(&["rust".to_string()]));
        assert!(!config.matches_tags(&["python".to_string()]));
        assert!(!config.matches_tags(&[]));
        assert!(config.is_filtered());
    }

    #[test]
    fn test_backoff_grows_fourfold() {
        let config = ProbeConfig::default();
        assert_eq!(config.backoff_for(0), Duration::from_secs(1));
        assert_eq!(config.backoff_for(1), Duration::from_secs(4));
        assert_eq!(config.backoff_for(2), Duration::from_secs(16));
    }

    #[test]
    fn test_backoff_saturates_for_huge_attempts() {
        let config = ProbeConfig::default();
        let ceiling = Duration::from_secs(u64::from(u32::MAX));
        assert_eq!(config.backoff_for(16), ceiling);
        assert_eq!(config.backoff_for(u32::MAX / 2 + 1), ceiling);
        assert_eq!(config.backoff_for(u32::MAX), ceiling);
    }

    #[test]
    fn test_skip_domains() {
        let config = ProbeConfig::default();
        assert!(config.is_skipped("www.youtube.com"));
        assert!(!config.is_skipped("go.dev"));

        let config = ProbeConfig {
            skip_unreliable: false,
            ..ProbeConfig::default()
        };
        assert!(!config.is_skipped("www.youtube.com"));
    }
}
