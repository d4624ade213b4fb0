// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every subcommand shares the same scan options (ScanArgs, flattened in):
//
//   content-checker errors ./site go --tags basics,intro --max-errors 20
//                          ^root  ^course
//
// The root can also come from CONTENT_CHECKER_ROOT.
// =============================================================================

use clap::{Args, Parser, Subcommand, ValueEnum};
use content_checker::config::{ProbeConfig, ScanConfig};
use content_checker::State;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "content-checker",
    version,
    about = "Validates course/chapter/page markdown content and checks its links",
    long_about = "content-checker reads content/<course>/<chapter>/*.md, checks every page against \
                  the content rules (sections, videos, slugs, weights, states) and verifies the \
                  links between pages. Exits with 1 when problems are found, for CI use."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Site root, the directory holding content/ and static/
    #[arg(env = "CONTENT_CHECKER_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Only check this course
    pub course: Option<String>,

    /// Only keep pages with at least one of these tags (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Stop reading files after this many had errors (0 = never)
    #[arg(long)]
    pub max_errors: Option<usize>,

    /// Print debug diagnostics to stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            root: self.root.clone(),
            course: self.course.clone(),
            tags: self
                .tags
                .iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            max_errors: self.max_errors,
        }
    }
}

/// Declared state filter for `print`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateArg {
    Stub,
    Incomplete,
    Complete,
}

impl From<StateArg> for State {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Stub => State::Stub,
            StateArg::Incomplete => State::Incomplete,
            StateArg::Complete => State::Complete,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the course tree with every page's state and issues
    Print {
        #[command(flatten)]
        scan: ScanArgs,

        /// Only show pages declaring this state
        #[arg(long, value_enum)]
        state: Option<StateArg>,

        /// Also show chapter index pages
        #[arg(long)]
        with_index: bool,

        /// Hide regular (non-index) pages
        #[arg(long)]
        without_non_index: bool,
    },

    /// List every issue, exits with 1 if there is any
    Errors {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Print a per-course table of page states
    Stats {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Check that page weights step by 10 without gaps or duplicates
    CheckPageOrder {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Check that chapter weights step by 1 without gaps or duplicates
    CheckChapterOrder {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Check internal and file links, and external ones on request
    ///
    /// Example: content-checker check-links ./site --check-external
    CheckLinks {
        #[command(flatten)]
        scan: ScanArgs,

        /// Probe external links too (slow: requests are throttled per domain)
        #[arg(long)]
        check_external: bool,

        /// Seconds to wait between requests to the same domain
        #[arg(long)]
        throttle: Option<u64>,

        /// Retries per URL after the first attempt
        #[arg(long)]
        retries: Option<u32>,

        /// Base backoff in seconds after a failed request
        #[arg(long)]
        backoff: Option<u64>,
    },
}

impl Commands {
    pub fn scan(&self) -> &ScanArgs {
        match self {
            Commands::Print { scan, .. }
            | Commands::Errors { scan }
            | Commands::Stats { scan }
            | Commands::CheckPageOrder { scan }
            | Commands::CheckChapterOrder { scan }
            | Commands::CheckLinks { scan, .. } => scan,
        }
    }
}

/// Probe settings with the command line overrides applied.
pub fn probe_config(throttle: Option<u64>, retries: Option<u32>, backoff: Option<u64>) -> ProbeConfig {
    let mut config = ProbeConfig::default();

    if let Some(seconds) = throttle {
        config.throttle = Duration::from_secs(seconds);
    }
    if let Some(retries) = retries {
        config.retries = retries;
    }
    if let Some(seconds) = backoff {
        config.backoff = Duration::from_secs(seconds);
    }

    config
}
