//! Wiki-Mirror main entry point
//!
//! This is the command-line interface for the Wiki-Mirror static site builder.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiki_mirror::config::{load_config, Config};
use wiki_mirror::crawler::{error_chain, run_mirror};
use wiki_mirror::output::print_summary;
use wiki_mirror::MirrorError;

/// Exit status of a run aborted by Ctrl-C
const EXIT_CANCELLED: u8 = 130;

/// Wiki-Mirror: a static mirror builder for MediaWiki sites
///
/// Wiki-Mirror logs in to a MediaWiki instance, renders every page into a
/// self-contained HTML file with relative links, and stores recompressed
/// copies of the images the pages reference.
#[derive(Parser, Debug)]
#[command(name = "wiki-mirror")]
#[command(version)]
#[command(about = "A static mirror builder for MediaWiki sites", long_about = None)]
struct Cli {
    /// Path to the TOML credentials/configuration file
    #[arg(value_name = "CONFIG", default_value = "credentials.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the mirror to this directory instead of the configured one
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Validate the configuration and show what would be mirrored
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match prepare_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.dry_run {
        print_dry_run(&config);
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start the async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(handle_mirror(config));
    // Recompression running on the blocking pool cannot be aborted
    runtime.shutdown_timeout(Duration::from_secs(5));
    code
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_mirror=info,warn"),
            1 => EnvFilter::new("wiki_mirror=debug,info"),
            2 => EnvFilter::new("wiki_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration and applies command-line overrides
fn prepare_config(cli: &Cli) -> Result<Config> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if let Some(output) = &cli.output {
        config.output.directory = output
            .to_str()
            .context("Output directory is not valid UTF-8")?
            .to_string();
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    println!("=== Wiki-Mirror Dry Run ===\n");

    println!("Wiki:");
    println!("  Base URL: {}", config.wiki.base_url);
    println!("  Home page: {}", config.wiki.home_page);
    println!("  Namespaces: {:?}", config.wiki.namespaces);
    println!("  Language: {}", config.wiki.language);
    println!("  Account: {}", config.username);

    println!("\nCrawler:");
    println!(
        "  Max connections per host: {}",
        config.crawler.max_connections_per_host
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Max image dimension: {}px", config.crawler.max_image_dimension);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Preserved: {}", config.output.preserve.join(", "));

    println!("\nThresholds:");
    println!(
        "  Pages processed: more than {}",
        config.thresholds.min_processed_pages
    );
    println!(
        "  Suppressed exceptions: at most {}",
        config.thresholds.max_suppressed_exceptions
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the main mirror operation, racing it against Ctrl-C
async fn handle_mirror(config: Config) -> ExitCode {
    tracing::info!(
        "Mirroring {} into {}",
        config.wiki.base_url,
        config.output.directory
    );

    tokio::select! {
        result = run_mirror(config) => match result {
            Ok(summary) => {
                print_summary(&summary);
                if summary.verdict.is_success() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(e) => {
                tracing::error!("Mirror failed: {}", error_chain(&e));
                ExitCode::FAILURE
            }
        },
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                return ExitCode::FAILURE;
            }
            tracing::error!("{}, aborting all tasks", MirrorError::Cancelled);
            ExitCode::from(EXIT_CANCELLED)
        }
    }
}
