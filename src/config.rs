//! Layered configuration.
//!
//! Sources, highest priority last:
//! 1. built-in defaults
//! 2. `~/.config/taskflow/config.toml` (user-global)
//! 3. `./taskflow.toml` (current directory)
//! 4. `TASKFLOW_*` environment variables, e.g. `TASKFLOW_API_URL`

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

const DEFAULT_API_URL: &str = "http://localhost:8000";

const fn default_timeout() -> u64 {
    30
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Base URL of the TaskFlow API, without a trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where the bearer token is kept. Defaults to the platform data directory.
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_path: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Load from files and environment. Does not read `.env`.
    pub fn load() -> Result<Self> {
        let mut config: Config = Self::figment().extract()?;
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Loads `.env` from the current directory (or a parent) into the
    /// process environment. Existing variables win. A missing file is fine.
    pub fn load_dotenv() {
        let _ = dotenvy::dotenv();
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from("taskflow.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TASKFLOW_").ignore(&["log"]))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("taskflow").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_local_api() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.token_path.is_none());
    }

    #[test]
    fn env_overrides_file_and_trailing_slash_is_trimmed() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "taskflow.toml",
                r#"
                api_url = "http://from-file:9000"
                request_timeout_secs = 5
                "#,
            )?;
            jail.set_env("TASKFLOW_API_URL", "https://api.example.com/");

            let config = Config::load().expect("config loads");
            assert_eq!(config.api_url, "https://api.example.com");
            assert_eq!(config.request_timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn token_path_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("TASKFLOW_TOKEN_PATH", "/tmp/tf-token");
            let config = Config::load().expect("config loads");
            assert_eq!(config.token_path, Some(PathBuf::from("/tmp/tf-token")));
            Ok(())
        });
    }
}
