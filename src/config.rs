use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::engine::{fingerprint, FingerprintMode, HashParams};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// k-gram window length in chars.
    pub k: usize,
    pub base: u64,
    pub modulus: u64,
    pub mode: FingerprintMode,
    /// Ranked results returned per check.
    pub top_results: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            k: fingerprint::DEFAULT_K,
            base: fingerprint::DEFAULT_BASE,
            modulus: fingerprint::DEFAULT_MODULUS,
            mode: FingerprintMode::Fast,
            top_results: 5,
        }
    }
}

impl EngineConfig {
    pub fn hash_params(&self) -> HashParams {
        HashParams::new(self.k, self.base, self.modulus)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wikipedia language edition, e.g. "en" or "vi".
    pub language: String,
    /// Candidate pages fetched per check.
    pub max_results: usize,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            max_results: 5,
            concurrency: 4,
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "logs/plagcheck.log".to_string(),
            level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub search: SearchConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let explicit_path = std::env::var("CONFIG_FILE").ok();
        let config = if let Some(path) = explicit_path {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(anyhow!("config file {:?} not found", path));
            }
            Self::load_from_file(&path)?
        } else if let Some(path) = locate_default_config() {
            Self::load_from_file(&path)?
        } else {
            AppConfig::default()
        };

        Self::apply_env_overrides(config)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {:?}", path))?;
        Ok(config)
    }

    fn apply_env_overrides(mut config: AppConfig) -> anyhow::Result<AppConfig> {
        if let Ok(bind) = std::env::var("SERVER_BIND") {
            config.server.bind = bind;
        }

        if let Some(k) = parse_optional_env("ENGINE_K")? {
            config.engine.k = k;
        }

        if let Some(base) = parse_optional_env("ENGINE_BASE")? {
            config.engine.base = base;
        }

        if let Some(modulus) = parse_optional_env("ENGINE_MODULUS")? {
            config.engine.modulus = modulus;
        }

        if let Some(mode) = parse_optional_env("ENGINE_MODE")? {
            config.engine.mode = mode;
        }

        if let Some(top) = parse_optional_env("ENGINE_TOP_RESULTS")? {
            config.engine.top_results = top;
        }

        if let Ok(language) = std::env::var("SEARCH_LANGUAGE") {
            config.search.language = language;
        }

        if let Some(max_results) = parse_optional_env("SEARCH_MAX_RESULTS")? {
            config.search.max_results = max_results;
        }

        if let Some(concurrency) = parse_optional_env("SEARCH_CONCURRENCY")? {
            config.search.concurrency = concurrency;
        }

        if let Some(timeout) = parse_optional_env("SEARCH_TIMEOUT_SECS")? {
            config.search.request_timeout_secs = timeout;
        }

        if let Some(max_bytes) = parse_optional_env("UPLOAD_MAX_BYTES")? {
            config.upload.max_bytes = max_bytes;
        }

        if let Ok(log_file) = std::env::var("LOG_FILE_PATH") {
            config.logging.file = log_file;
        }

        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            config.logging.level = Some(log_level);
        }

        config
            .engine
            .hash_params()
            .validate()
            .context("invalid engine configuration")?;

        Ok(config)
    }
}

fn parse_optional_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => Ok(Some(
            v.parse::<T>()
                .with_context(|| format!("{key} must be a valid value"))?,
        )),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn locate_default_config() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("config/config.yaml"),
        PathBuf::from("../config/config.yaml"),
    ];

    candidates.into_iter().find(|path| path.exists())
}
