use crate::error::{Result, SfsError};
use crate::version::ApiVersion;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
pub const CONFIG_DIR_ENV: &str = "SFS_CONFIG_DIR";

pub const KEYS: &[&str] = &["endpoint", "api_version", "timeout", "insecure", "cache", "format"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(SfsError::InvalidArgument(format!(
                "format must be 'table' or 'json' (got '{}')",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

/// Persistent defaults, stored in `<config dir>/config.json`.
///
/// Every field is optional on disk; flags and environment variables win over
/// whatever is stored here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SfsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// `X.Y` or `latest`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default)]
    pub insecure: bool,

    /// Record seen ids for shell completion.
    #[serde(default)]
    pub cache: bool,

    #[serde(default)]
    pub format: OutputFormat,
}

impl SfsConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "endpoint" => Some(self.endpoint.clone().unwrap_or_default()),
            "api_version" => Some(self.api_version.clone().unwrap_or_default()),
            "timeout" => Some(self.timeout.map(|t| t.to_string()).unwrap_or_default()),
            "insecure" => Some(self.insecure.to_string()),
            "cache" => Some(self.cache.to_string()),
            "format" => Some(self.format.as_str().to_string()),
            _ => None,
        }
    }

    /// Sets `key`, validating the value; an empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "endpoint" => self.endpoint = non_empty(value),
            "api_version" => {
                if !value.is_empty() && !value.eq_ignore_ascii_case("latest") {
                    ApiVersion::parse(value)?;
                }
                self.api_version = non_empty(value);
            }
            "timeout" => {
                self.timeout = match value {
                    "" => None,
                    text => Some(text.parse().map_err(|_| {
                        SfsError::InvalidArgument(format!(
                            "timeout must be a whole number of seconds (got '{}')",
                            text
                        ))
                    })?),
                }
            }
            "insecure" => self.insecure = parse_bool(key, value)?,
            "cache" => self.cache = parse_bool(key, value)?,
            "format" => self.format = OutputFormat::parse(value)?,
            _ => {
                return Err(SfsError::InvalidArgument(format!(
                    "Unknown config key: {} (known keys: {})",
                    key,
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    pub fn list_all(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(SfsError::InvalidArgument(format!(
            "{} must be true or false (got '{}')",
            key, value
        ))),
    }
}

/// `$SFS_CONFIG_DIR`, else the platform config directory.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("org", "sfs", "sfs")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            SfsError::CommandError(format!(
                "Could not determine a configuration directory; set {}",
                CONFIG_DIR_ENV
            ))
        })
}
