// src/config/settings.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "PICKIT_CONFIG_PATH";
pub const ENV_LEAGUE: &str = "PICKIT_LEAGUE";
pub const ENV_HTTP_TIMEOUT: &str = "PICKIT_HTTP_TIMEOUT_SECS";

fn default_league() -> String {
    "Rise of the Abyssal".to_string()
}
fn default_ninja_base_url() -> String {
    "https://poe.ninja".to_string()
}
fn default_scout_base_url() -> String {
    "https://poe2scout.com".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_per_page() -> u32 {
    250
}
fn default_min_value() -> f64 {
    10.0
}
fn default_min_value_currency() -> f64 {
    1.0
}
fn default_tier() -> i64 {
    1
}

/// Request defaults used when a field is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_min_value")]
    pub min_value: f64,
    #[serde(default = "default_min_value_currency")]
    pub min_value_currency: f64,
    #[serde(default = "default_tier")]
    pub waystone_tier: i64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            min_value_currency: default_min_value_currency(),
            waystone_tier: default_tier(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_league")]
    pub league: String,
    #[serde(default = "default_ninja_base_url")]
    pub ninja_base_url: String,
    #[serde(default = "default_scout_base_url")]
    pub scout_base_url: String,
    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_per_page")]
    pub scout_per_page: u32,
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            league: default_league(),
            ninja_base_url: default_ninja_base_url(),
            scout_base_url: default_scout_base_url(),
            http_timeout_secs: default_timeout(),
            scout_per_page: default_per_page(),
            defaults: Defaults::default(),
        }
    }
}

impl Settings {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_settings(&content, ext.as_str())
            .with_context(|| format!("parsing settings from {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load settings using env var + fallbacks, then apply env overrides:
    /// 1) $PICKIT_CONFIG_PATH
    /// 2) config/pickit.toml
    /// 3) config/pickit.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("PICKIT_CONFIG_PATH points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new("config/pickit.toml").exists() {
            Self::load_from(Path::new("config/pickit.toml"))?
        } else if Path::new("config/pickit.json").exists() {
            Self::load_from(Path::new("config/pickit.json"))?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(league) = std::env::var(ENV_LEAGUE) {
            self.league = league;
        }
        if let Some(secs) = std::env::var(ENV_HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.http_timeout_secs = secs;
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        if self.league.trim().is_empty() {
            self.league = default_league();
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = default_timeout();
        }
        if self.scout_per_page == 0 {
            self.scout_per_page = default_per_page();
        }
        self
    }
}

fn parse_settings(s: &str, hint_ext: &str) -> Result<Settings> {
    if hint_ext == "toml" {
        return Ok(toml::from_str(s)?);
    }
    if hint_ext == "json" {
        return Ok(serde_json::from_str(s)?);
    }
    // No usable extension: try JSON, then TOML.
    serde_json::from_str::<Settings>(s)
        .or_else(|_| toml::from_str::<Settings>(s))
        .map_err(|_| anyhow!("unsupported settings format"))
}
