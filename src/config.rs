use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::client::default_user_agent;
use crate::error::EnaError;
use crate::url::DEFAULT_BASE_URL;

pub const CONFIG_FILE_NAME: &str = "enasearch.json";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    base_url: String,
    timeout: Duration,
    catalog: Option<PathBuf>,
    user_agent: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog: None,
            user_agent: default_user_agent(),
        }
    }
}

impl ResolvedConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog.as_deref()
    }

    pub fn load_catalog(&self) -> Result<Catalog, EnaError> {
        match &self.catalog {
            Some(path) => Catalog::from_path(path),
            None => Catalog::packaged(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist. Without one, `enasearch.json` in the
    /// working directory, then in the user config directory, is used when
    /// present; otherwise defaults apply.
    pub fn resolve(path: Option<&Path>) -> Result<ResolvedConfig, EnaError> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(EnaError::MissingConfig(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => Self::discover(),
        };

        let Some(config_path) = config_path else {
            return Ok(ResolvedConfig::default());
        };
        tracing::debug!(path = %config_path.display(), "loading config");

        let content = fs::read_to_string(&config_path)
            .map_err(|_| EnaError::ConfigRead(config_path.clone()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|err| EnaError::ConfigParse(err.to_string()))?;

        let mut resolved = Self::resolve_config(config)?;
        if let (Some(catalog), Some(parent)) = (&resolved.catalog, config_path.parent()) {
            if catalog.is_relative() {
                resolved.catalog = Some(parent.join(catalog));
            }
        }
        Ok(resolved)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, EnaError> {
        let defaults = ResolvedConfig::default();

        let base_url = match config.base_url {
            Some(url) => {
                let url = url.trim().trim_end_matches('/').to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(EnaError::ConfigParse(format!(
                        "base_url must be an http(s) URL, got {url}"
                    )));
                }
                url
            }
            None => defaults.base_url,
        };

        let timeout = match config.timeout_secs {
            Some(0) => {
                return Err(EnaError::ConfigParse(
                    "timeout_secs must be greater than zero".to_string(),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        let user_agent = config
            .user_agent
            .map(|agent| agent.trim().to_string())
            .filter(|agent| !agent.is_empty())
            .unwrap_or(defaults.user_agent);

        Ok(ResolvedConfig {
            base_url,
            timeout,
            catalog: config.catalog,
            user_agent,
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("enasearch").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }
}
