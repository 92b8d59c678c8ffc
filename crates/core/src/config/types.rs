use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Alpha-2 codes of the languages to look for (default: provider languages).
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            cache: CacheConfig::default(),
            languages: default_languages(),
        }
    }
}

/// Catalogue connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Catalogue root, including the locale segment and trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "http://subscenter.cinemast.com/he/".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("subscout/{}", env!("CARGO_PKG_VERSION"))
}

/// Title resolution cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long a title→slug resolution stays valid (default: 3 weeks)
    #[serde(default = "default_title_ttl")]
    pub title_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            title_ttl_secs: default_title_ttl(),
        }
    }
}

fn default_title_ttl() -> u64 {
    3 * 7 * 24 * 60 * 60
}

fn default_languages() -> Vec<String> {
    vec!["he".to_string()]
}

/// Sanitized config for display (password redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub provider: SanitizedProviderConfig,
    pub cache: CacheConfig,
    pub languages: Vec<String>,
}

/// Sanitized provider config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProviderConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password_configured: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            provider: SanitizedProviderConfig {
                base_url: config.provider.base_url.clone(),
                username: config.provider.username.clone(),
                password_configured: config
                    .provider
                    .password
                    .as_ref()
                    .is_some_and(|p| !p.is_empty()),
                timeout_secs: config.provider.timeout_secs,
                user_agent: config.provider.user_agent.clone(),
            },
            cache: config.cache.clone(),
            languages: config.languages.clone(),
        }
    }
}
