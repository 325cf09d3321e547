//! Configuration Management
//!
//! Loads client configuration from TOML files.
//! Configuration includes:
//! - Where the generation functions live and the key to call them with
//! - HTTP transport timeouts
//! - Terminal output preferences
//!
//! Environment variables (`TEACHASSIST_*`) override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the serverless functions, e.g. `https://<project>/functions/v1`
    #[serde(default = "default_functions_url")]
    pub functions_url: String,
    /// Publishable key, sent as a bearer token
    pub api_key: Option<String>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Whole-request limit including the streamed body. Unset means the
    /// stream may run as long as the function keeps sending.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Terminal output preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Colored notifications on stderr
    #[serde(default = "default_true")]
    pub color: bool,
    /// Print stream statistics after each generation
    #[serde(default)]
    pub show_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            functions_url: default_functions_url(),
            api_key: None,
            http: HttpConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_stats: false,
        }
    }
}

fn default_functions_url() -> String {
    "http://localhost:54321/functions/v1".to_string()
}
fn default_connect_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config from {}", p))?;
                toml::from_str(&content).context("Failed to parse config")?
            }
            None => {
                let mut default_paths = vec![std::path::PathBuf::from("teachassist.toml")];
                if let Some(home) = dirs::home_dir() {
                    default_paths.push(home.join(".config/teachassist/config.toml"));
                }

                let mut loaded = None;
                for p in &default_paths {
                    if let Ok(content) = std::fs::read_to_string(p) {
                        loaded = Some(toml::from_str(&content).with_context(|| {
                            format!("Failed to parse config {}", p.display())
                        })?);
                        break;
                    }
                }
                loaded.unwrap_or_else(|| {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                })
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("TEACHASSIST_FUNCTIONS_URL") {
            self.functions_url = url;
        }
        if let Ok(key) = std::env::var("TEACHASSIST_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(timeout) = std::env::var("TEACHASSIST_CONNECT_TIMEOUT") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.http.connect_timeout_secs = t;
            }
        }
        if let Ok(timeout) = std::env::var("TEACHASSIST_REQUEST_TIMEOUT") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.http.request_timeout_secs = Some(t);
            }
        }
    }

    /// Full URL of a named function.
    pub fn endpoint(&self, function: &str) -> String {
        format!(
            "{}/{}",
            self.functions_url.trim_end_matches('/'),
            function.trim_start_matches('/')
        )
    }
}
