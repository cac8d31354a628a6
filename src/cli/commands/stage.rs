//! stage commands - Create stages and read the pipeline definition

use anyhow::{Context as _, Result};

use super::Context;
use crate::core::shipyard::DeploymentStrategy;
use crate::core::types::{ProjectName, StageName};

/// Create a stage branched from trunk.
pub fn create_stage(ctx: &Context, project: &str, stage: &str) -> Result<()> {
    let project = ProjectName::new(project)?;
    let stage = StageName::new(stage)?;
    let version = ctx
        .store
        .create_stage(&project, &stage)
        .with_context(|| format!("Failed to create stage '{}'", stage))?;

    if ctx.json {
        ctx.print_json(&serde_json::json!({ "stage": stage, "version": version }))
    } else {
        println!("Created stage '{}' at {}", stage, version.short(7));
        Ok(())
    }
}

/// List stages in pipeline order.
pub fn list_stages(ctx: &Context, project: &str) -> Result<()> {
    let project = ProjectName::new(project)?;
    let stages = ctx
        .store
        .list_stages(&project)
        .with_context(|| format!("Failed to list stages of '{}'", project))?;

    if ctx.json {
        return ctx.print_json(&stages);
    }
    for stage in stages {
        println!("{}", stage.name);
    }
    Ok(())
}

/// Check that a stage exists.
pub fn get_stage(ctx: &Context, project: &str, stage: &str) -> Result<()> {
    let project = ProjectName::new(project)?;
    let stage = StageName::new(stage)?;
    let stage = ctx.store.get_stage(&project, &stage)?;

    if ctx.json {
        ctx.print_json(&stage)
    } else {
        println!("{}", stage.name);
        Ok(())
    }
}

/// Show the deployment strategy of every stage.
pub fn strategies(ctx: &Context, project: &str, fixed: Option<DeploymentStrategy>) -> Result<()> {
    let project = ProjectName::new(project)?;
    let strategies = match fixed {
        Some(strategy) => ctx.store.fixed_deployment_strategies(&project, strategy),
        None => ctx.store.deployment_strategies(&project),
    }
    .with_context(|| format!("Failed to read deployment strategies of '{}'", project))?;

    if ctx.json {
        let map: serde_json::Map<String, serde_json::Value> = strategies
            .iter()
            .map(|(stage, strategy)| (stage.to_string(), strategy.as_str().into()))
            .collect();
        return ctx.print_json(&map);
    }
    for (stage, strategy) in strategies {
        println!("{}\t{}", stage, strategy);
    }
    Ok(())
}
