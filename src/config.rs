//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入和自动发现功能。

use crate::error::{Result, TranslationError};
use crate::translator::ServiceKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// API key 为空时读取的环境变量
pub const API_KEY_ENV: &str = "TAOT_API_KEY";

/// 客户端配置
///
/// # 示例
///
/// ```rust,no_run
/// use taot_translator::ClientConfig;
///
/// // 从默认位置加载配置
/// let config = ClientConfig::load_from_default_locations();
///
/// // 保存配置到文件
/// config.save_to_file("output.toml").unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// 翻译服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// 使用的服务商
    pub provider: ServiceKind,
    /// API key，为空时读取 `TAOT_API_KEY`
    pub api_key: String,
    /// 覆盖服务商的默认地址
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// 语言定义文件所在目录
    pub resource_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: ServiceKind::Yandex,
            api_key: String::new(),
            endpoint: None,
            resource_dir: PathBuf::from("resources"),
        }
    }
}

impl ServiceConfig {
    /// 实际使用的 API key
    pub fn resolved_api_key(&self) -> String {
        if self.api_key.is_empty() {
            std::env::var(API_KEY_ENV).unwrap_or_default()
        } else {
            self.api_key.clone()
        }
    }
}

/// HTTP 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub pool_idle_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            pool_idle_timeout_secs: 30,
            user_agent: concat!("taot-translator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// 语言偏好的持久化位置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub path: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("taot-settings.toml"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from multiple possible locations
    pub fn load_from_default_locations() -> Self {
        let possible_paths = ["taot.toml", "config.toml", ".taot.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        info!("Loaded configuration from: {}", path);
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", path, e);
                    }
                }
            }
        }

        info!("No configuration file found, using defaults");
        Self::default()
    }

    /// Generate example configuration file
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.service.endpoint {
            url::Url::parse(endpoint).map_err(|e| {
                TranslationError::Config(format!("invalid endpoint {:?}: {}", endpoint, e))
            })?;
        }
        if self.http.timeout_secs == 0 {
            return Err(TranslationError::Config(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
