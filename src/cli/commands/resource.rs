//! resource commands - Read, write, list, and trace resources

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{scope_from_args, Context};
use crate::cli::args::ScopeArgs;
use crate::core::types::{ProjectName, ResourcePath};

/// Create or overwrite a resource.
///
/// Content comes from `--file`, `--content`, or stdin, in that order.
pub fn put_resource(
    ctx: &Context,
    project: &str,
    path: &str,
    scope: &ScopeArgs,
    file: Option<&Path>,
    content: Option<String>,
) -> Result<()> {
    let project = ProjectName::new(project)?;
    let path = ResourcePath::new(path)?;
    let scope = scope_from_args(scope)?;

    let bytes = match (file, content) {
        (Some(file), _) => std::fs::read(file)
            .with_context(|| format!("Failed to read {}", file.display()))?,
        (None, Some(content)) => content.into_bytes(),
        (None, None) => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let version = ctx
        .store
        .put_resource(&project, &scope, &path, &bytes)
        .with_context(|| format!("Failed to write '{}'", path))?;

    if ctx.json {
        ctx.print_json(&serde_json::json!({ "version": version }))
    } else {
        println!("{}", version);
        Ok(())
    }
}

/// Print a resource's content.
pub fn get_resource(
    ctx: &Context,
    project: &str,
    path: &str,
    scope: &ScopeArgs,
    version: Option<&str>,
) -> Result<()> {
    let project = ProjectName::new(project)?;
    let path = ResourcePath::new(path)?;
    let scope = scope_from_args(scope)?;

    let content = match version {
        Some(version) => ctx
            .store
            .get_resource_at_version(&project, &scope, &path, version)?,
        None => ctx.store.get_resource(&project, &scope, &path)?.content,
    };

    if ctx.json {
        let text = String::from_utf8(content).context("Resource is not valid UTF-8")?;
        return ctx.print_json(&serde_json::json!({
            "resourceURI": path,
            "resourceContent": text,
        }));
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}

/// Delete a resource.
pub fn delete_resource(ctx: &Context, project: &str, path: &str, scope: &ScopeArgs) -> Result<()> {
    let project = ProjectName::new(project)?;
    let path = ResourcePath::new(path)?;
    let scope = scope_from_args(scope)?;

    let version = ctx
        .store
        .delete_resource(&project, &scope, &path)
        .with_context(|| format!("Failed to delete '{}'", path))?;

    if ctx.json {
        ctx.print_json(&serde_json::json!({ "version": version }))
    } else {
        println!("{}", version);
        Ok(())
    }
}

/// List resources in a scope.
pub fn list_resources(ctx: &Context, project: &str, scope: &ScopeArgs) -> Result<()> {
    let project = ProjectName::new(project)?;
    let scope = scope_from_args(scope)?;
    let paths = ctx.store.list_resources(&project, &scope)?;

    if ctx.json {
        return ctx.print_json(&paths);
    }
    for path in paths {
        println!("{}", path);
    }
    Ok(())
}

/// Show versions that changed a resource, newest first.
pub fn resource_history(ctx: &Context, project: &str, path: &str, scope: &ScopeArgs) -> Result<()> {
    let project = ProjectName::new(project)?;
    let path = ResourcePath::new(path)?;
    let scope = scope_from_args(scope)?;
    let history = ctx.store.resource_history(&project, &scope, &path)?;

    if ctx.json {
        return ctx.print_json(&history);
    }
    for entry in history {
        println!(
            "{}  {}  {}",
            entry.version.short(7),
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.message
        );
    }
    Ok(())
}
