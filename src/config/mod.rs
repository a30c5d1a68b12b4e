mod api;
mod defaults;
mod validation;

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use api::ApiConfig;
pub use defaults::{default_api_url, default_session_file, default_timeout_secs};
pub use validation::{expand_with, validate_base_url};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub session_file: PathBuf,
    pub verbose: bool,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Self::resolve(args, &file_config, |name| env::var(name).ok())
    }

    /// Merge the sources: CLI args > env vars > config file > default
    pub fn resolve(
        args: &Args,
        file_config: &FileConfig,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_url = args
            .api_url
            .clone()
            .or_else(|| env_lookup("DESIGNMART_API_URL"))
            .or(file_config.api.base_url.clone())
            .map(|url| expand_with(&url, &env_lookup))
            .unwrap_or_else(default_api_url);
        let api_url = validate_base_url(&api_url).map_err(anyhow::Error::msg)?;

        let timeout_secs = match env_lookup("DESIGNMART_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("DESIGNMART_TIMEOUT must be a number of seconds, got '{}'", raw))?,
            None => file_config
                .api
                .timeout_secs
                .unwrap_or_else(default_timeout_secs),
        };
        if timeout_secs == 0 {
            anyhow::bail!("request timeout must be at least one second");
        }

        let session_file = args
            .session_file
            .clone()
            .or_else(|| env_lookup("DESIGNMART_SESSION_FILE").map(PathBuf::from))
            .or(file_config.session.file.clone())
            .map(|path| PathBuf::from(expand_with(&path.to_string_lossy(), &env_lookup)))
            .unwrap_or_else(default_session_file);

        let verbose = args.verbose
            || env_lookup("DESIGNMART_VERBOSE")
                .map(|v| defaults::is_truthy(&v))
                .or(file_config.logging.verbose)
                .unwrap_or(false);

        Ok(Config {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            session_file,
            verbose,
        })
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::from_path(&path);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))
        }
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            // 1. Current directory (local override)
            PathBuf::from(".designmart.yaml"),
            PathBuf::from(".designmart.yml"),
            PathBuf::from(".designmart.json"),
        ];

        // 2. User's config directory
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("designmart");
            paths.push(config_dir.join("config.yaml"));
            paths.push(config_dir.join("config.yml"));
            paths.push(config_dir.join("config.json"));
        }

        paths
    }
}
