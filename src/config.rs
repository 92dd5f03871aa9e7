// ⚙️ Configuration - runtime settings
// Optional TOML file first, then ACADEMY_* environment overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_WEBHOOK_URL: &str = "https://hooks.amas-academia.mx/enrollment";
pub const DEFAULT_CONFIG_FILE: &str = "academy.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub webhook_url: String,
    pub webhook_timeout_secs: u64,

    /// CSV replacing the built-in equipment catalog
    pub catalog_csv: Option<PathBuf>,

    /// JSON replacing the built-in promo codes
    pub promo_json: Option<PathBuf>,

    pub bind_addr: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            webhook_timeout_secs: 15,
            catalog_csv: None,
            promo_json: None,
            bind_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` if given, else `academy.toml` when it exists, else
    /// defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    /// Apply overrides from a variable source (std::env in production)
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("ACADEMY_WEBHOOK_URL") {
            self.webhook_url = url;
        }
        if let Some(secs) = var("ACADEMY_WEBHOOK_TIMEOUT_SECS") {
            self.webhook_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("ACADEMY_WEBHOOK_TIMEOUT_SECS is not a number: {}", secs))?;
        }
        if let Some(path) = var("ACADEMY_CATALOG_CSV") {
            self.catalog_csv = Some(PathBuf::from(path));
        }
        if let Some(path) = var("ACADEMY_PROMO_JSON") {
            self.promo_json = Some(PathBuf::from(path));
        }
        if let Some(addr) = var("ACADEMY_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(level) = var("ACADEMY_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }
}
