//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments into strong types
//! 2. Calls one store operation
//! 3. Formats and displays output (plain text, or JSON with `--json`)

pub mod config_cmd;
mod project;
mod resource;
mod stage;

pub use project::{create_project, delete_project, list_projects};
pub use resource::{delete_resource, get_resource, list_resources, put_resource, resource_history};
pub use stage::{create_stage, get_stage, list_stages, strategies};

use anyhow::Result;
use serde::Serialize;

use crate::cli::args::{ProjectAction, ResourceAction, ScopeArgs, StageAction, StoreCommand};
use crate::core::types::{ServiceName, StageName};
use crate::store::{ConfigStore, ResourceScope};

/// Execution context shared by every handler.
#[derive(Debug)]
pub struct Context {
    pub store: ConfigStore,
    pub json: bool,
}

impl Context {
    /// Print `value` as pretty JSON.
    pub(crate) fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Dispatch a store command to its handler.
pub fn dispatch(command: StoreCommand, ctx: &Context) -> Result<()> {
    match command {
        StoreCommand::Project { action } => match action {
            ProjectAction::Create { name } => project::create_project(ctx, &name),
            ProjectAction::Delete { name } => project::delete_project(ctx, &name),
            ProjectAction::List => project::list_projects(ctx),
        },

        StoreCommand::Stage { action } => match action {
            StageAction::Create { project, stage } => stage::create_stage(ctx, &project, &stage),
            StageAction::List { project } => stage::list_stages(ctx, &project),
            StageAction::Get { project, stage } => stage::get_stage(ctx, &project, &stage),
            StageAction::Strategies { project, fixed } => {
                stage::strategies(ctx, &project, fixed.map(Into::into))
            }
        },

        StoreCommand::Resource { action } => match action {
            ResourceAction::Put {
                project,
                path,
                scope,
                file,
                content,
            } => resource::put_resource(ctx, &project, &path, &scope, file.as_deref(), content),
            ResourceAction::Get {
                project,
                path,
                scope,
                version,
            } => resource::get_resource(ctx, &project, &path, &scope, version.as_deref()),
            ResourceAction::Delete {
                project,
                path,
                scope,
            } => resource::delete_resource(ctx, &project, &path, &scope),
            ResourceAction::List { project, scope } => {
                resource::list_resources(ctx, &project, &scope)
            }
            ResourceAction::History {
                project,
                path,
                scope,
            } => resource::resource_history(ctx, &project, &path, &scope),
        },
    }
}

/// Turn `--stage` / `--service` into a scope.
pub(crate) fn scope_from_args(args: &ScopeArgs) -> Result<ResourceScope> {
    Ok(match (&args.stage, &args.service) {
        (None, None) => ResourceScope::Project,
        (Some(stage), None) => ResourceScope::Stage(StageName::new(stage.as_str())?),
        (Some(stage), Some(service)) => ResourceScope::Service(
            StageName::new(stage.as_str())?,
            ServiceName::new(service.as_str())?,
        ),
        (None, Some(_)) => anyhow::bail!("--service requires --stage"),
    })
}
