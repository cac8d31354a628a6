//! cli
//!
//! Command-line interface for the configuration store.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the logger
//! - Load configuration and open the store
//! - Delegate to command handlers
//! - Read and write the config file (`config` commands run without a store)
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! [`commands`], which call [`crate::store::ConfigStore`] and format the
//! result. All locking happens inside the store.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::store::ConfigStore;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    match cli.command {
        Command::Config { action } => {
            let config = load_config(cli.config.as_deref(), true)?;
            let target = match (&cli.config, config.loaded_from()) {
                (Some(path), _) => path.clone(),
                (None, Some(path)) => path.to_path_buf(),
                (None, None) => Config::config_path()?,
            };
            commands::config_cmd::run(action, &config, &target, cli.json)
        }
        Command::Store(command) => {
            let mut config = load_config(cli.config.as_deref(), false)?;
            if let Some(dir) = &cli.data_dir {
                config.set_data_dir(dir.clone());
            }

            let store = ConfigStore::open(&config).context("Failed to open store")?;
            let ctx = commands::Context {
                store,
                json: cli.json,
            };
            commands::dispatch(command, &ctx)
        }
    }
}

/// Load `path` if given, else search the default locations.
///
/// With `allow_missing`, an explicit path that does not exist yet yields defaults.
fn load_config(path: Option<&Path>, allow_missing: bool) -> Result<Config> {
    match path {
        Some(path) if allow_missing && !path.exists() => Ok(Config::default()),
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")
}

/// `--debug` forces debug level; otherwise `RUST_LOG` decides, defaulting to warnings.
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}
