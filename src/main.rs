//! tm CLI - seed and reconcile tasks in a Task Matrix instance.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use taskmatrix::api::HttpTaskApi;
use taskmatrix::catalog::{self, Catalog, GroundTruth};
use taskmatrix::cli::{Cli, Commands};
use taskmatrix::commands::{self, CommandResult, CorrectOptions, SeedOptions};
use taskmatrix::config::{self, ResolvedSettings, SettingsOverrides, TmConfig};
use taskmatrix::logging;

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if json {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), taskmatrix::Error> {
    let json = cli.json;
    let settings = load_settings(&cli)?;
    tracing::debug!(api_url = %settings.api_url(), source = %settings.api_url.source, "settings resolved");

    // Progress lines are only shown in human mode.
    let stdout = io::stdout();
    let mut sink = io::sink();
    let mut lock;
    let progress: &mut dyn Write = if json {
        &mut sink
    } else {
        lock = stdout.lock();
        &mut lock
    };

    match cli.command {
        Commands::Seed {
            dry_run,
            bulk,
            catalog,
        } => {
            let catalog = load_catalog(catalog)?;
            let api = HttpTaskApi::new(settings.api_url(), settings.timeout());
            let options = SeedOptions {
                source: settings.source().to_string(),
                pacing: settings.seed_pacing(),
                dry_run,
            };
            let result = if bulk {
                commands::seed_bulk(&api, &catalog, &options, progress)?
            } else {
                commands::seed(&api, &catalog, &options, progress)?
            };
            output(&result, json);
        }

        Commands::Correct {
            dry_run,
            mapping,
            status,
        } => {
            let truth = load_ground_truth(mapping)?;
            let api = HttpTaskApi::new(settings.api_url(), settings.timeout());
            let options = CorrectOptions {
                status,
                pacing: settings.patch_pacing(),
                dry_run,
            };
            let result = commands::correct(&api, &truth, &options, progress)?;
            output(&result, json);
        }

        Commands::List { status } => {
            let api = HttpTaskApi::new(settings.api_url(), settings.timeout());
            let result = commands::list(&api, status)?;
            output(&result, json);
        }

        Commands::Check { catalog, mapping } => {
            let catalog = load_catalog(catalog)?;
            let truth = load_ground_truth(mapping)?;
            let result = commands::check(&catalog, &truth);
            output(&result, json);
        }

        Commands::Config => {
            output(&settings, json);
        }
    }

    Ok(())
}

/// Resolve settings from CLI flags, config.kdl and defaults.
fn load_settings(cli: &Cli) -> Result<ResolvedSettings, taskmatrix::Error> {
    let config_path = cli.config.clone().or_else(config::default_config_path);
    let file_config = match config_path {
        Some(ref path) => config::load_config_file(path)?,
        None => TmConfig::new(),
    };

    let mut overrides = SettingsOverrides::new();
    if let Some(ref url) = cli.api_url {
        overrides = overrides.with_api_url(url.clone());
    }
    if cli.no_delay {
        overrides = overrides.with_no_delay();
    }

    Ok(config::resolve_settings(
        &overrides,
        &file_config,
        config_path.as_deref(),
    ))
}

fn load_catalog(path: Option<PathBuf>) -> Result<Catalog, taskmatrix::Error> {
    match path {
        Some(path) => catalog::load_catalog_file(&path),
        None => catalog::embedded_catalog(),
    }
}

fn load_ground_truth(path: Option<PathBuf>) -> Result<GroundTruth, taskmatrix::Error> {
    match path {
        Some(path) => catalog::load_ground_truth_file(&path),
        None => catalog::embedded_ground_truth(),
    }
}

fn output<T: CommandResult>(result: &T, json: bool) {
    if json {
        println!("{}", result.to_json());
    } else {
        println!("{}", result.to_human());
    }
}
