//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--data-dir <path>`: Use this data directory instead of the configured one
//! - `--config <path>`: Load configuration from this file
//! - `--debug`: Enable debug logging
//! - `--json`: Print machine-readable output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::shipyard::DeploymentStrategy;

/// cfgstore - A versioned configuration store backed by git
#[derive(Parser, Debug)]
#[command(name = "cfgstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding one repository per project
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file to load instead of the default locations
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or change configuration values
    #[command(
        long_about = "Show or change configuration values.\n\n\
            Values are written to the file given with --config, else the file the \
            configuration was loaded from, else ~/.cfgstore/config.toml. Reading \
            reports effective values, defaults included.",
        after_help = "\
KEYS:
    data-dir, trunk, definition-file, author-name, author-email

EXAMPLES:
    cfgstore config set data-dir /srv/cfgstore
    cfgstore config get trunk
    cfgstore config list"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that operate on the store.
#[derive(Subcommand, Debug)]
pub enum StoreCommand {
    /// Create, delete, or list projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Create and inspect stages
    #[command(
        long_about = "Create and inspect stages.\n\n\
            A stage is a branch that starts from the project's trunk when it is \
            created. The list of stages and their deployment strategies come from \
            the pipeline definition (shipyard.yaml) committed at project level.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Commit a pipeline definition, then create its stages
    cfgstore resource put shop shipyard.yaml --file shipyard.yaml
    cfgstore stage create shop dev
    cfgstore stage create shop staging

    # Show stages in pipeline order
    cfgstore stage list shop

    # Show how each stage is deployed
    cfgstore stage strategies shop"
    )]
    Stage {
        #[command(subcommand)]
        action: StageAction,
    },

    /// Read and write resources
    #[command(
        long_about = "Read and write resources.\n\n\
            Without --stage a resource lives on the project's trunk. With --stage it \
            lives on that stage's branch, and --service places it under the \
            service's directory. Every write prints the resulting version.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Write a service resource from a file
    cfgstore resource put shop config.yaml --stage staging --service svc --file config.yaml

    # Read it back, now or at an earlier version
    cfgstore resource get shop config.yaml --stage staging --service svc
    cfgstore resource get shop config.yaml --stage staging --service svc --version <id>

    # See every version that changed it
    cfgstore resource history shop config.yaml --stage staging --service svc"
    )]
    Resource {
        #[command(subcommand)]
        action: ResourceAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print one effective value
    Get {
        #[arg(value_enum)]
        key: ConfigKey,
    },
    /// Write one value to the config file
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
    /// Print every effective value
    List,
}

/// Configuration keys settable from the command line
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DataDir,
    Trunk,
    DefinitionFile,
    AuthorName,
    AuthorEmail,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::DataDir,
        ConfigKey::Trunk,
        ConfigKey::DefinitionFile,
        ConfigKey::AuthorName,
        ConfigKey::AuthorEmail,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::DataDir => "data-dir",
            ConfigKey::Trunk => "trunk",
            ConfigKey::DefinitionFile => "definition-file",
            ConfigKey::AuthorName => "author-name",
            ConfigKey::AuthorEmail => "author-email",
        }
    }
}

/// Project subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectAction {
    /// Create a project with an empty trunk
    Create {
        /// Project name
        name: String,
    },
    /// Delete a project and all of its stages
    Delete {
        /// Project name
        name: String,
    },
    /// List all projects
    List,
}

/// Stage subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum StageAction {
    /// Create a stage branched from trunk
    Create {
        /// Project name
        project: String,
        /// Stage name
        stage: String,
    },
    /// List stages in pipeline order
    List {
        /// Project name
        project: String,
    },
    /// Check that a stage exists
    Get {
        /// Project name
        project: String,
        /// Stage name
        stage: String,
    },
    /// Show the deployment strategy of every stage
    Strategies {
        /// Project name
        project: String,
        /// Report every stage with this strategy instead of the defined one
        #[arg(long, value_enum, value_name = "STRATEGY")]
        fixed: Option<StrategyArg>,
    },
}

/// Resource subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ResourceAction {
    /// Create or overwrite a resource
    Put {
        /// Project name
        project: String,
        /// Resource path within the scope
        path: String,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Read content from this file
        #[arg(long, conflicts_with = "content")]
        file: Option<PathBuf>,
        /// Use this literal content
        #[arg(long)]
        content: Option<String>,
    },
    /// Print a resource's content
    Get {
        /// Project name
        project: String,
        /// Resource path within the scope
        path: String,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Read the resource as of this version
        #[arg(long, value_name = "VERSION")]
        version: Option<String>,
    },
    /// Delete a resource
    Delete {
        /// Project name
        project: String,
        /// Resource path within the scope
        path: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// List resources in a scope
    List {
        /// Project name
        project: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Show versions that changed a resource
    History {
        /// Project name
        project: String,
        /// Resource path within the scope
        path: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
}

/// Where a resource lives.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Stage the resource belongs to (omit for project level)
    #[arg(long)]
    pub stage: Option<String>,

    /// Service directory within the stage
    #[arg(long, requires = "stage")]
    pub service: Option<String>,
}

/// Deployment strategy classes accepted on the command line
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// In-place replacement
    Direct,
    /// Second deployment sharing traffic
    Duplicate,
}

impl From<StrategyArg> for DeploymentStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Direct => DeploymentStrategy::Direct,
            StrategyArg::Duplicate => DeploymentStrategy::Duplicate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_service_scope() {
        let cli = Cli::try_parse_from([
            "cfgstore",
            "resource",
            "get",
            "shop",
            "config.yaml",
            "--stage",
            "staging",
            "--service",
            "svc",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Store(StoreCommand::Resource {
                action: ResourceAction::Get { scope, version, .. },
            }) => {
                assert_eq!(scope.stage.as_deref(), Some("staging"));
                assert_eq!(scope.service.as_deref(), Some("svc"));
                assert!(version.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn service_requires_stage() {
        let result = Cli::try_parse_from([
            "cfgstore", "resource", "list", "shop", "--service", "svc",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn file_and_content_conflict() {
        let result = Cli::try_parse_from([
            "cfgstore", "resource", "put", "shop", "a", "--file", "x", "--content", "y",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn fixed_strategy_value() {
        let cli = Cli::try_parse_from([
            "cfgstore",
            "stage",
            "strategies",
            "shop",
            "--fixed",
            "duplicate",
        ])
        .unwrap();
        match cli.command {
            Command::Store(StoreCommand::Stage {
                action: StageAction::Strategies { fixed, .. },
            }) => assert_eq!(fixed, Some(StrategyArg::Duplicate)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn config_keys_are_kebab_case() {
        let cli = Cli::try_parse_from(["cfgstore", "config", "set", "author-email", "a@b.c"]).unwrap();
        match cli.command {
            Command::Config {
                action: ConfigAction::Set { key, value },
            } => {
                assert_eq!(key, ConfigKey::AuthorEmail);
                assert_eq!(key.name(), "author-email");
                assert_eq!(value, "a@b.c");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["cfgstore", "config", "get", "colour"]).is_err());
    }
}
