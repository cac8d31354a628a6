//! project commands - Create, delete, and list projects

use anyhow::{Context as _, Result};

use super::Context;
use crate::core::types::ProjectName;

/// Create a project.
pub fn create_project(ctx: &Context, name: &str) -> Result<()> {
    let project = ProjectName::new(name)?;
    let version = ctx
        .store
        .create_project(&project)
        .with_context(|| format!("Failed to create project '{}'", project))?;

    if ctx.json {
        ctx.print_json(&serde_json::json!({ "project": project, "version": version }))
    } else {
        println!("Created project '{}' at {}", project, version.short(7));
        Ok(())
    }
}

/// Delete a project and all of its stages.
pub fn delete_project(ctx: &Context, name: &str) -> Result<()> {
    let project = ProjectName::new(name)?;
    ctx.store
        .delete_project(&project)
        .with_context(|| format!("Failed to delete project '{}'", project))?;

    if !ctx.json {
        println!("Deleted project '{}'", project);
    }
    Ok(())
}

/// List all projects.
pub fn list_projects(ctx: &Context) -> Result<()> {
    let projects = ctx.store.list_projects().context("Failed to list projects")?;

    if ctx.json {
        return ctx.print_json(&projects);
    }
    for project in projects {
        println!("{}", project);
    }
    Ok(())
}
