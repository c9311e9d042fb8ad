use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const DEFAULT_HISTORY_LIMIT: usize = 3;

/// Main tripcrew configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub gateway: GatewayConfig,
    pub history: HistoryConfig,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON file holding recent planning runs
    pub history: PathBuf,
    /// YAML file declaring the crew of role agents
    pub crew: PathBuf,
    /// Default directory for exported documents
    pub exports: PathBuf,
}

/// Completion endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// OpenAI-compatible API root (without /chat/completions)
    pub base_url: String,
    pub model: String,
    /// Environment variable consulted for the API key
    pub api_key_env: String,
    /// Per-call timeout; 0 disables it
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of runs retained, newest first
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            _ => eyre::bail!("Unknown log level: {}", s),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let dir = Config::tripcrew_dir();

        Self {
            history: dir.join("history.json"),
            crew: dir.join("crew.yaml"),
            exports: PathBuf::from("."),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must load or fail loudly
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let mut candidates = Vec::new();
        if let Ok(env_path) = std::env::var("TRIPCREW_CONFIG") {
            candidates.push(("TRIPCREW_CONFIG", PathBuf::from(env_path)));
        }
        if let Ok(dir) = std::env::var("TRIPCREW_DIR") {
            candidates.push(("TRIPCREW_DIR", PathBuf::from(dir).join("tripcrew.yaml")));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(("config dir", config_dir.join("tripcrew").join("tripcrew.yaml")));
        }
        candidates.push(("working dir", PathBuf::from("tripcrew.yaml")));

        for (source, path) in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Failed to load config from {} ({}): {}", path.display(), source, e),
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Write this configuration to `$TRIPCREW_DIR/tripcrew.yaml`
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::tripcrew_dir().join("tripcrew.yaml");
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let yaml_str = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(&config_path, yaml_str).context("Failed to write config file")?;
        Ok(config_path)
    }

    /// Get the tripcrew directory (config, crew, history)
    pub fn tripcrew_dir() -> PathBuf {
        std::env::var("TRIPCREW_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("tripcrew"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }

    /// Resolve the API key: explicit flag, then the configured env var,
    /// then a `.env` file in the tripcrew directory.
    pub fn resolve_credential(&self, explicit: Option<&str>) -> Result<Option<Credential>> {
        if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
            return Ok(Some(Credential::new(key)));
        }

        let env_var = &self.gateway.api_key_env;
        if let Ok(key) = std::env::var(env_var)
            && !key.trim().is_empty()
        {
            return Ok(Some(Credential::new(key.trim())));
        }

        let env_file = Self::tripcrew_dir().join(".env");
        if env_file.exists() {
            let content = fs::read_to_string(&env_file).context("Failed to read .env file")?;
            return Ok(parse_env_file(&content, env_var).map(Credential::new));
        }

        Ok(None)
    }
}

fn parse_env_file(content: &str, env_var: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once('=')
            && key.trim() == env_var
        {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// API key for the completion endpoint, passed explicitly to the gateway
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
