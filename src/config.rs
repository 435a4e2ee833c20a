use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub notion: Option<NotionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    /// Notion integration token.
    pub api_key: String,
    /// Default database to query for bugs.
    pub database_id: Option<String>,
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bugtrack")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

/// Credentials from the config file, falling back to `NOTION_API_KEY` /
/// `NOTION_DATABASE_ID` — agent runtimes inject credentials through the
/// environment rather than a home-dir file.
pub fn resolve_notion(config: &AppConfig) -> Option<NotionConfig> {
    if let Some(cfg) = &config.notion {
        return Some(cfg.clone());
    }
    let api_key = std::env::var("NOTION_API_KEY")
        .ok()
        .filter(|v| !v.is_empty())?;
    let database_id = std::env::var("NOTION_DATABASE_ID")
        .ok()
        .filter(|v| !v.is_empty());
    Some(NotionConfig {
        api_key,
        database_id,
    })
}
