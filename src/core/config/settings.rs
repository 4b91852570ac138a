//! Service settings.
//!
//! Loaded once at startup from built-in defaults, an optional YAML file,
//! a `.env` file and the process environment (highest precedence).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::defaults;
use super::validation::validate_settings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config at '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    Pinecone,
    /// Process-local index, contents are lost on restart.
    Memory,
}

impl VectorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorBackend::Pinecone => "pinecone",
            VectorBackend::Memory => "memory",
        }
    }
}

impl FromStr for VectorBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pinecone" => Ok(VectorBackend::Pinecone),
            "memory" => Ok(VectorBackend::Memory),
            other => Err(ConfigError::invalid(
                "vector_backend",
                format!("unknown backend '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            cors_allowed_origins: Vec::new(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub api_key: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f64,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            embedding_model: defaults::EMBEDDING_MODEL.to_string(),
            chat_model: defaults::CHAT_MODEL.to_string(),
            temperature: defaults::CHAT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PineconeSettings {
    pub api_key: String,
    pub index_name: String,
    /// Data-plane host. Discovered from the control plane when unset.
    pub index_host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub top_k: usize,
    pub restrict_to_context: bool,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            top_k: defaults::RAG_TOP_K,
            restrict_to_context: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shared secret expected in the `X-API-KEY` header.
    pub api_key: String,
    pub server: ServerSettings,
    pub google: GoogleSettings,
    pub pinecone: PineconeSettings,
    pub vector_backend: VectorBackend,
    pub rag: RagSettings,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            server: ServerSettings::default(),
            google: GoogleSettings::default(),
            pinecone: PineconeSettings::default(),
            vector_backend: VectorBackend::Pinecone,
            rag: RagSettings::default(),
            http_timeout_secs: defaults::HTTP_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Loads `.env`, the YAML file and the process environment, then validates.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_from(&config_path(), |key| env::var(key).ok())
    }

    /// Same as [`Settings::load`] with an explicit file path and variable lookup.
    pub fn load_from<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = load_yaml_file(path)?;
        settings.apply_env(lookup)?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("TRACTION_BRAIN_API_KEY") {
            self.api_key = value;
        }
        if let Some(value) = get("GOOGLE_API_KEY") {
            self.google.api_key = value;
        }
        if let Some(value) = get("EMBEDDING_MODEL") {
            self.google.embedding_model = value;
        }
        if let Some(value) = get("CHAT_MODEL") {
            self.google.chat_model = value;
        }
        if let Some(value) = get("CHAT_TEMPERATURE") {
            self.google.temperature = parse_env("google.temperature", &value)?;
        }
        if let Some(value) = get("PINECONE_API_KEY") {
            self.pinecone.api_key = value;
        }
        if let Some(value) = get("PINECONE_INDEX_NAME") {
            self.pinecone.index_name = value;
        }
        if let Some(value) = get("PINECONE_INDEX_HOST") {
            self.pinecone.index_host = Some(value);
        }
        if let Some(value) = get("VECTOR_BACKEND") {
            self.vector_backend = value.parse()?;
        }
        if let Some(value) = get("HOST") {
            self.server.host = value;
        }
        if let Some(value) = get("PORT") {
            self.server.port = parse_env("server.port", &value)?;
        }
        if let Some(value) = get("LOG_DIR") {
            self.server.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get("CORS_ALLOWED_ORIGINS") {
            self.server.cors_allowed_origins = value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = get("HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = parse_env("http_timeout_secs", &value)?;
        }
        if let Some(value) = get("RAG_TOP_K") {
            self.rag.top_k = parse_env("rag.top_k", &value)?;
        }
        if let Some(value) = get("RAG_RESTRICT_TO_CONTEXT") {
            self.rag.restrict_to_context = parse_env("rag.restrict_to_context", &value)?;
        }

        Ok(())
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = env::var(defaults::CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(defaults::CONFIG_FILE_NAME)
}

fn load_yaml_file(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_env<T: FromStr>(path: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(path, format!("cannot parse '{}'", raw)))
}
