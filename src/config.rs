use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "news_alert.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the backend REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Optional HTTP timeout in seconds; requests never time out when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub actions: ActionConfig,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

/// Windows and sizes sent along with the custom backend actions.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    #[serde(default = "default_apply_days")]
    pub apply_days: u32,
    #[serde(default = "default_test_days")]
    pub test_days: u32,
    #[serde(default = "default_process_days")]
    pub process_days: u32,
    #[serde(default = "default_fetch_page_size")]
    pub fetch_page_size: u32,
}

fn default_apply_days() -> u32 {
    7
}

fn default_test_days() -> u32 {
    7
}

fn default_process_days() -> u32 {
    1
}

fn default_fetch_page_size() -> u32 {
    100
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            apply_days: default_apply_days(),
            test_days: default_test_days(),
            process_days: default_process_days(),
            fetch_page_size: default_fetch_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            listen_addr: default_listen_addr(),
            request_timeout_secs: None,
            actions: ActionConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, falling back to defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Replace the backend URL when an override is present and non-empty.
    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }
}
