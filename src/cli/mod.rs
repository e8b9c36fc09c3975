//! CLI argument definitions for taskmatrix.

use crate::models::StatusFilter;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Version string with build metadata, e.g. `0.1.0 (a1b2c3d 2026-10-19T12:00:00Z)`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TM_GIT_COMMIT"),
    " ",
    env!("TM_BUILD_TIMESTAMP"),
    ")"
);

/// tm - seed and reconcile tasks in a Task Matrix instance.
///
/// Run `tm seed` once to load the task catalog, then `tm correct` whenever
/// urgency or category drift needs fixing.
#[derive(Parser, Debug)]
#[command(name = "tm")]
#[command(author, version, long_version = LONG_VERSION, about = "Seed and reconcile tasks in a Task Matrix instance", long_about = None)]
pub struct Cli {
    /// Print the final summary as JSON instead of human-readable progress
    #[arg(long, global = true)]
    pub json: bool,

    /// Base URL of the tasks endpoint.
    /// Can also be set via TM_API_URL or `api-url` in config.kdl.
    #[arg(long = "api-url", global = true, env = "TM_API_URL")]
    pub api_url: Option<String>,

    /// Path to config.kdl (defaults to ~/.config/taskmatrix/config.kdl)
    #[arg(long, global = true, env = "TM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip the pauses between requests
    #[arg(long = "no-delay", global = true)]
    pub no_delay: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug). TM_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit every task in the catalog to the create endpoint
    ///
    /// Runs once per catalog entry in order. Existing tasks are not checked,
    /// so running twice creates duplicates.
    Seed {
        /// Show what would be sent without sending it
        #[arg(long)]
        dry_run: bool,

        /// Send the whole catalog in one request to the bulk endpoint
        #[arg(long)]
        bulk: bool,

        /// Load the catalog from a KDL file instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Patch urgency and category of remote tasks to match the ground truth
    Correct {
        /// Show which tasks would be patched without patching them
        #[arg(long)]
        dry_run: bool,

        /// Load the ground-truth mapping from a KDL file instead of the built-in one
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Which remote tasks to reconcile (active, completed, all)
        #[arg(long, default_value = "active")]
        status: StatusFilter,
    },

    /// List remote tasks, most important first
    List {
        /// Status filter (active, completed, all)
        #[arg(long, default_value = "active")]
        status: StatusFilter,
    },

    /// Report titles where the catalog and the ground truth disagree
    Check {
        /// Catalog KDL file to check instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Ground-truth KDL file to check instead of the built-in one
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Show the resolved settings and where each value came from
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_without_arguments() {
        let cli = Cli::try_parse_from(["tm", "seed"]).unwrap();
        match cli.command {
            Commands::Seed {
                dry_run,
                bulk,
                catalog,
            } => {
                assert!(!dry_run);
                assert!(!bulk);
                assert!(catalog.is_none());
            }
            other => panic!("Expected seed, got: {:?}", other),
        }
    }

    #[test]
    fn test_correct_status_parses() {
        let cli = Cli::try_parse_from(["tm", "correct", "--status", "all"]).unwrap();
        match cli.command {
            Commands::Correct { status, .. } => assert_eq!(status, StatusFilter::All),
            other => panic!("Expected correct, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(Cli::try_parse_from(["tm", "list", "--status", "archived"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tm",
            "correct",
            "--json",
            "--no-delay",
            "--api-url",
            "http://localhost:3000/api/tasks",
            "-vv",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(cli.no_delay);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:3000/api/tasks"));
    }
}
