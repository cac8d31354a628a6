//! config command - Get, set, or list configuration values

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::args::{ConfigAction, ConfigKey};
use crate::core::config::Config;

/// Run a config subcommand against `config`, writing changes to `target`.
pub fn run(action: ConfigAction, config: &Config, target: &Path, json: bool) -> Result<()> {
    match action {
        ConfigAction::Get { key } => get(config, key),
        ConfigAction::Set { key, value } => set(config, target, key, &value),
        ConfigAction::List => list(config, json),
    }
}

/// Print one effective value.
pub fn get(config: &Config, key: ConfigKey) -> Result<()> {
    println!("{}", effective_value(config, key));
    Ok(())
}

/// Write one value to the config file.
pub fn set(config: &Config, target: &Path, key: ConfigKey, value: &str) -> Result<()> {
    let mut file = config.file.clone();
    match key {
        ConfigKey::DataDir => file.data_dir = Some(PathBuf::from(value)),
        ConfigKey::Trunk => file.trunk = Some(value.to_string()),
        ConfigKey::DefinitionFile => file.definition_file = Some(value.to_string()),
        ConfigKey::AuthorName => {
            file.author.get_or_insert_with(Default::default).name = Some(value.to_string())
        }
        ConfigKey::AuthorEmail => {
            file.author.get_or_insert_with(Default::default).email = Some(value.to_string())
        }
    }

    Config::write(target, &file)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    println!("Set {} = {}", key.name(), value);
    Ok(())
}

/// Print every effective value.
pub fn list(config: &Config, json: bool) -> Result<()> {
    if json {
        let values: serde_json::Map<String, serde_json::Value> = ConfigKey::ALL
            .iter()
            .map(|key| (key.name().to_string(), effective_value(config, *key).into()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    match config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# defaults"),
    }
    for key in ConfigKey::ALL {
        println!("{} = {}", key.name(), effective_value(config, key));
    }
    Ok(())
}

fn effective_value(config: &Config, key: ConfigKey) -> String {
    match key {
        ConfigKey::DataDir => config.data_dir().display().to_string(),
        ConfigKey::Trunk => config.trunk().to_string(),
        ConfigKey::DefinitionFile => config.definition_file().to_string(),
        ConfigKey::AuthorName => config.author_name().to_string(),
        ConfigKey::AuthorEmail => config.author_email().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_keeps_other_values() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("config.toml");

        set(&Config::default(), &target, ConfigKey::Trunk, "main").unwrap();
        let config = Config::load_from(&target).unwrap();
        set(&config, &target, ConfigKey::AuthorEmail, "ops@example.com").unwrap();

        let config = Config::load_from(&target).unwrap();
        assert_eq!(effective_value(&config, ConfigKey::Trunk), "main");
        assert_eq!(effective_value(&config, ConfigKey::AuthorEmail), "ops@example.com");
        assert_eq!(effective_value(&config, ConfigKey::AuthorName), "cfgstore");
    }

    #[test]
    fn invalid_value_is_not_written() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("config.toml");

        assert!(set(&Config::default(), &target, ConfigKey::Trunk, "bad..name").is_err());
        assert!(!target.exists());
    }
}
