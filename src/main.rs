// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Find and parse the content files (one pass), then finalize the tree
// 3. Dispatch to the subcommand handler
// 4. Exit with proper code (0 = all good, 1 = problems found, 2 = error)
//
// Human output goes to stdout; diagnostics (tracing) go to stderr.
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ScanArgs};
use content_checker::checker::{self, ReqwestTransport, TokioSleeper};
use content_checker::config::ScanConfig;
use content_checker::discover::discover;
use content_checker::hierarchy::Courses;
use content_checker::report::{self, TreeFilter};
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = nothing to report
//   Ok(1) = issues, order problems or broken links found
//   Err   = could not run at all
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let scan = cli.command.scan();
    init_tracing(scan.verbose);

    let config = scan.scan_config();

    if let Commands::CheckLinks { .. } = cli.command {
        // a partial tree would report links into the rest of the site as broken
        if config.course.is_some() {
            println!("❌ cannot check links for a specific course");
            return Ok(2);
        }
        if !config.tags.is_empty() {
            println!("❌ cannot check links for a specific tag");
            return Ok(2);
        }
    }

    let courses = load(&config, scan)?;

    match &cli.command {
        Commands::Print {
            state,
            with_index,
            without_non_index,
            ..
        } => {
            let filter = TreeFilter {
                state: state.map(Into::into),
                with_index: *with_index,
                without_non_index: *without_non_index,
            };
            let tree = report::tree(&courses, &filter);

            if scan.json {
                report::print_json(&tree)?;
            } else {
                print!("{}", report::render_tree(&tree));
            }
            Ok(0)
        }

        Commands::Errors { .. } => {
            let errors = report::errors(&courses);

            if scan.json {
                report::print_json(&errors)?;
            } else if errors.is_empty() {
                println!("✅ No errors found");
            } else {
                for error in &errors {
                    println!("{}", error);
                }
                println!();
                println!("❌ {} error(s) found", errors.len());
            }
            Ok(exit_code(errors.is_empty()))
        }

        Commands::Stats { .. } => {
            let rows = report::stats(&courses);

            if scan.json {
                report::print_json(&rows)?;
            } else {
                print!("{}", report::render_stats(&rows));
            }
            Ok(0)
        }

        Commands::CheckPageOrder { .. } => print_order(report::page_order(&courses), scan.json),

        Commands::CheckChapterOrder { .. } => {
            print_order(report::chapter_order(&courses), scan.json)
        }

        Commands::CheckLinks {
            check_external,
            throttle,
            retries,
            backoff,
            ..
        } => {
            let probe_config = cli::probe_config(*throttle, *retries, *backoff);
            let probe = if *check_external {
                println!("🌐 Checking external links, this can take a while...");
                let transport: Arc<dyn checker::Transport> = Arc::new(ReqwestTransport::new()?);
                let sleeper: Arc<dyn checker::Sleeper> = Arc::new(TokioSleeper);
                Some((&probe_config, transport, sleeper))
            } else {
                None
            };

            let json = scan.json;
            let verbose = scan.verbose;
            let link_report = checker::check_links(&courses, &config, probe, move |domain| {
                // domains finish one at a time, print while the others run
                if !json {
                    print!("{}", report::render_domain(domain, verbose));
                }
            })
            .await;

            if json {
                report::print_json(&link_report)?;
            } else {
                print!("{}", report::render_links(&link_report));
            }
            Ok(exit_code(link_report.is_clean()))
        }
    }
}

// Discovers, ingests and finalizes the content tree.
fn load(config: &ScanConfig, scan: &ScanArgs) -> Result<Courses> {
    if !scan.json {
        println!("🔍 Scanning content in: {}", config.root.display());
    }

    let documents = discover(config)?;
    debug!(files = documents.len(), "files discovered");

    let mut courses = Courses::new();
    let ingestion = courses.ingest(documents, config);
    courses.finalize();

    for failure in &ingestion.failures {
        eprintln!("❌ {}", failure);
    }
    if ingestion.halted {
        warn!("max errors reached, the remaining files were not processed");
        eprintln!("⚠️  Max errors reached, stopping");
    }

    if !scan.json {
        println!("📄 Processed {} markdown files.", ingestion.processed);
    }

    Ok(courses)
}

fn print_order(reports: Vec<report::OrderReport>, json: bool) -> Result<i32> {
    if json {
        report::print_json(&reports)?;
    } else if reports.is_empty() {
        println!("✅ No ordering issues found");
    } else {
        print!("{}", report::render_order(&reports));
    }
    Ok(exit_code(reports.is_empty()))
}

fn exit_code(clean: bool) -> i32 {
    if clean {
        0
    } else {
        1
    }
}

// Diagnostics go to stderr so --json output stays parseable.
// RUST_LOG wins over --verbose.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
