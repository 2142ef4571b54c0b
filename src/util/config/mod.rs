//! tinfer configuration system
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Environment variables (TINFER_FAIL_FAST, TINFER_MAX_CALL_DEPTH, TINFER_LOG)
//! 3. Project-level (tinfer.toml, searched upward from the working directory)
//! 4. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use tinfer::util::config::Config;
//!
//! let config = Config::default();
//! assert!(!config.check.fail_fast);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::util::logger::LogLevel;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "tinfer.toml";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Type checking settings
    #[serde(default)]
    pub check: CheckConfig,
    /// Module loading settings
    #[serde(default)]
    pub modules: ModuleConfig,
    /// Log settings
    #[serde(default)]
    pub log: LogConfig,
}

/// 类型检查配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckConfig {
    /// 遇到第一个错误即停止
    #[serde(default)]
    pub fail_fast: bool,
    /// 调用点重新实例化的最大嵌套深度
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

fn default_max_call_depth() -> usize {
    64
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_call_depth: default_max_call_depth(),
        }
    }
}

/// 模块加载配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleConfig {
    /// `require("./x")` 依次尝试的扩展名
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string(), "js.json".to_string()]
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Log configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Log level name (trace/debug/info/warn/error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    /// Parsed log level, falling back to the default on unknown names
    pub fn level(&self) -> LogLevel {
        self.level.parse().unwrap_or_default()
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a configuration file
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content, path)
    }

    /// 从 `start` 向上查找 tinfer.toml；找不到时返回默认配置
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        match find_config_file(start) {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                Self::load_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// 应用环境变量覆盖
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// 应用环境变量覆盖（可注入的读取函数，便于测试）
    pub fn apply_env_from<F>(
        &mut self,
        get: F,
    ) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = get("TINFER_FAIL_FAST") {
            self.check.fail_fast = match value.as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "TINFER_FAIL_FAST".to_string(),
                        value,
                    })
                }
            };
        }
        if let Some(value) = get("TINFER_MAX_CALL_DEPTH") {
            self.check.max_call_depth =
                value.parse().map_err(|_| ConfigError::InvalidEnv {
                    name: "TINFER_MAX_CALL_DEPTH".to_string(),
                    value: value.clone(),
                })?;
        }
        if let Some(value) = get("TINFER_LOG") {
            self.log.level = value;
        }
        Ok(())
    }
}

/// Search `start` and its ancestors for a project config file
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}
