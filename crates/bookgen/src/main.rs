//! bookgen CLI - book extraction from page-tree exports.
//!
//! Provides commands for:
//! - `build`: Build the configured books from a page snapshot

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use commands::BuildArgs;
use output::Output;

/// bookgen - Book extraction from page-tree exports.
#[derive(Parser)]
#[command(name = "bookgen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build books from a page snapshot.
    Build(BuildArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Build(args) if args.verbose);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN
/// so unresolved embeds are always reported.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_warn() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert_eq!(log_filter(false).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_filter_verbose_is_info() {
        assert_eq!(log_filter(true).max_level_hint(), Some(LevelFilter::INFO));
    }
}
