//! revmark - Build revision stamper.
//!
//! Resolves the short commit SHA of a project directory and prints the
//! `GIT_SHA=<sha>` line the build tool captures. Falls back to the
//! `.git_sha` record, then to "unknown", so the build never stops here.

use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

use revmark_core::cache::MarkerCache;
use revmark_core::exec::SystemRunner;
use revmark_core::report;
use revmark_core::resolver::Resolver;

/// Build revision stamper.
#[derive(Parser)]
#[command(name = "revmark", about = "Build revision stamper", version = revmark_core::VERSION)]
struct Args {
    /// Project directory: git runs here and the .git_sha record lives here.
    #[arg(short, long, default_value = ".", env = "REVMARK_PROJECT_DIR")]
    project_dir: PathBuf,

    /// Override the .git_sha record location.
    #[arg(long, env = "REVMARK_CACHE", value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Output a JSON stamp report instead of the GIT_SHA line.
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default shows warnings only.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Diagnostics go to stderr; stdout carries only the stamp line.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN, // Default is WARN: stamping should be silent
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("revmark={}", level).parse().unwrap())
        .add_directive(format!("revmark_core={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Serialize)]
struct StampJson {
    marker: String,
    source: String,
    resolved_at: String,
    cache_file: String,
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let mut resolver = Resolver::with_project_dir(SystemRunner::new(), &args.project_dir);
    if let Some(ref cache_path) = args.cache {
        resolver = resolver.with_cache(MarkerCache::new(cache_path));
    }

    debug!("resolving revision for {}", args.project_dir.display());
    let resolution = resolver.resolve();

    if args.json {
        let json = StampJson {
            marker: resolution.marker.as_str().to_string(),
            source: resolution.source.to_string(),
            resolved_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            cache_file: resolver.cache().path().display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&json).unwrap());
    } else {
        // The build tool captures stdout, so this line is the whole contract.
        println!("{}", report::env_line(&resolution.marker));
    }
}
