//! Configuration loading for Riskboard

mod schema;

pub use schema::{
    CliOverrides, Config, EffectiveConfig, Messages, RecommendationTokens, DEFAULT_BASE_URL,
};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".riskboardrc.json";

/// Find and load the config file. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => read_config(&path),
        None => Ok(Config::default()),
    }
}

fn read_config(config_path: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    config.rebase_paths(config_dir);
    log::debug!("loaded config from {}", config_path.display());
    Ok(config)
}

/// Search for .riskboardrc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Write a config file with the default settings. Fails if one already exists.
pub fn write_default_config(dir: &Path, base_url: Option<&str>) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILENAME);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let config = Config {
        base_url: Some(base_url.unwrap_or(DEFAULT_BASE_URL).to_string()),
        color: Some(true),
        ..Config::default()
    };
    let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
    fs::write(&path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
