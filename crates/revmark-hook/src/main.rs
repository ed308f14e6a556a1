//! revmark-hook - Pre-build action runner.
//!
//! Resolves the revision marker, exports it as GIT_SHA to the pre-build
//! command's environment, and runs that command with inherited stdio.
//! The command's exit status is forwarded unchanged, so a failing
//! pre-build script aborts the surrounding build.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use revmark_core::cache::MarkerCache;
use revmark_core::exec::{CommandSpec, SystemRunner};
use revmark_core::hook::{HookRegistry, PreBuildAction, expand_project_dir};
use revmark_core::report;
use revmark_core::resolver::Resolver;

/// Command run when none is given on the command line.
const DEFAULT_COMMAND: &[&str] = &["python3", "$PROJECT_DIR/pre_build.py"];

/// Pre-build action runner.
#[derive(Parser)]
#[command(name = "revmark-hook", about = "Pre-build action runner", version = revmark_core::VERSION)]
struct Args {
    /// Project directory: the pre-build command runs here and $PROJECT_DIR
    /// expands to it.
    #[arg(short, long, default_value = ".", env = "REVMARK_PROJECT_DIR")]
    project_dir: PathBuf,

    /// Override the .git_sha record location.
    #[arg(long, env = "REVMARK_CACHE", value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Action label used in diagnostics.
    #[arg(long, default_value = "pre_build")]
    name: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Pre-build command and its arguments (after `--`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Diagnostics go to stderr; stdout stays with the pre-build command.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO, // Default narrates the action like the build tool does
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("revmark_hook={}", level).parse().unwrap())
        .add_directive(format!("revmark_core={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the action's command from CLI words: `$PROJECT_DIR` expanded,
/// child rooted in the project directory.
fn hook_command(words: &[String], project_dir: &Path) -> CommandSpec {
    let expanded: Vec<String> = words
        .iter()
        .map(|w| expand_project_dir(w, project_dir))
        .collect();
    CommandSpec::new(expanded[0].as_str())
        .args(expanded[1..].iter().cloned())
        .current_dir(project_dir)
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let mut resolver = Resolver::with_project_dir(SystemRunner::new(), &args.project_dir);
    if let Some(ref cache_path) = args.cache {
        resolver = resolver.with_cache(MarkerCache::new(cache_path));
    }
    let resolution = resolver.resolve();
    info!(
        "exporting {}={} ({})",
        report::MARKER_KEY,
        resolution.marker,
        resolution.source
    );

    let words: Vec<String> = if args.command.is_empty() {
        DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect()
    } else {
        args.command.clone()
    };

    let mut registry = HookRegistry::new();
    registry.export_env(report::MARKER_KEY, resolution.marker.as_str());
    registry.add_pre_action(PreBuildAction::new(
        args.name.as_str(),
        hook_command(&words, &args.project_dir),
    ));

    if let Err(e) = registry.run_all(&SystemRunner::new()) {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
