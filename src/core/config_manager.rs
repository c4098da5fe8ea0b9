// src/core/config_manager.rs
//! Unified configuration: optional YAML file with per-environment sections,
//! then environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::scoring::ScoreScale;

const DEFAULT_CONFIG_FILE: &str = "jobmatch.yaml";
const DEFAULT_ENGINE_URL: &str = "http://localhost:5000";
const DEFAULT_STORE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PER_PAGE: u32 = 20;
const DEFAULT_PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigManager {
    pub engine: EngineConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub score_scale: ScoreScale,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            score_scale: ScoreScale::Percent,
        }
    }
}

/// Which URL family the persistence service exposes for delete and apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreRoutes {
    /// `DELETE /api/jobs/saved/{id}`, `PUT /api/jobs/saved/{id}/apply`
    #[default]
    Saved,
    /// `DELETE /api/jobs/{id}`, `POST /api/jobs/{id}/apply`
    Direct,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub score_scale: ScoreScale,
    pub routes: StoreRoutes,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            score_scale: ScoreScale::Percent,
            routes: StoreRoutes::Saved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub per_page: u32,
    /// Upper bound on any single collaborator call made by the core.
    pub operation_timeout_seconds: u64,
    pub preview_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            operation_timeout_seconds: DEFAULT_OPERATION_TIMEOUT_SECS,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl SessionConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_seconds)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: Option<ConfigManager>,
    #[serde(default)]
    production: Option<ConfigManager>,
}

impl ConfigManager {
    /// Load `jobmatch.yaml` (or `$JOBMATCH_CONFIG`) if present, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var("JOBMATCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = Self::load_from(&path, &environment)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("JOBMATCH_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from(path: &Path, environment: &str) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };
        Ok(section.unwrap_or_default())
    }

    /// Apply `MATCHING_ENGINE_URL`, `JOB_STORE_URL` and `JOBMATCH_TIMEOUT_SECS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MATCHING_ENGINE_URL") {
            self.engine.base_url = url;
        }
        if let Some(url) = lookup("JOB_STORE_URL") {
            self.store.base_url = url;
        }
        if let Some(raw) = lookup("JOBMATCH_TIMEOUT_SECS") {
            let seconds = raw
                .trim()
                .parse::<u64>()
                .context("JOBMATCH_TIMEOUT_SECS must be a whole number of seconds")?;
            self.engine.timeout_seconds = seconds;
            self.store.timeout_seconds = seconds;
        }
        Ok(())
    }
}
