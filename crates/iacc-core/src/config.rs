use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{loader::RetryPolicy, screen::ScreenKind};

/// Main configuration structure
///
/// Loaded from `config.toml`; CLI flags override what's in the file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub screens: ScreensConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> crate::Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("Could not find config directory".into()))?;
        Ok(dir.join("iacc").join("config.toml"))
    }

    /// Where the offline snapshot database lives
    pub fn cache_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Ok(path.clone());
        }

        let dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::Config("Could not find data directory".into()))?;
        Ok(dir.join("iacc").join("cache.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    pub token: Option<String>,

    /// Transport timeout; the loader itself never times out
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.iacc.example.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Turn off to never write or read the offline friends list
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Defaults to `<data_dir>/iacc/cache.db`
    pub path: Option<PathBuf>,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            path: None,
        }
    }
}

/// Per-screen retry budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreensConfig {
    #[serde(default = "default_friends_retries")]
    pub friends_max_retries: u32,

    #[serde(default)]
    pub cards_retry_enabled: bool,

    #[serde(default)]
    pub cards_max_retries: u32,

    #[serde(default = "default_transfer_retries")]
    pub sent_max_retries: u32,

    #[serde(default = "default_transfer_retries")]
    pub received_max_retries: u32,
}

fn default_friends_retries() -> u32 {
    2
}

fn default_transfer_retries() -> u32 {
    1
}

impl Default for ScreensConfig {
    fn default() -> Self {
        Self {
            friends_max_retries: default_friends_retries(),
            cards_retry_enabled: false,
            cards_max_retries: 0,
            sent_max_retries: default_transfer_retries(),
            received_max_retries: default_transfer_retries(),
        }
    }
}

impl ScreensConfig {
    pub fn retry_for(&self, kind: ScreenKind) -> RetryPolicy {
        match kind {
            ScreenKind::Friends => RetryPolicy::up_to(self.friends_max_retries),
            ScreenKind::Cards => RetryPolicy {
                enabled: self.cards_retry_enabled,
                max_retries: self.cards_max_retries,
            },
            ScreenKind::SentTransfers => RetryPolicy::up_to(self.sent_max_retries),
            ScreenKind::ReceivedTransfers => RetryPolicy::up_to(self.received_max_retries),
        }
    }
}
