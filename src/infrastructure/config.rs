//! 配置基础设施
//!
//! 配置文件为 TOML 格式，未找到配置文件时使用默认配置。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

use crate::core::error::CoreError;

/// 默认配置文件查找路径
pub const CONFIG_PATHS: [&str; 2] = ["crud-productos.toml", "./config/crud-productos.toml"];

/// 应用配置结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 远程产品服务配置
    pub api: ApiConfig,
    /// 本地镜像存储配置
    pub storage: StorageConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 本地沙箱服务配置
    pub sandbox: SandboxConfig,
}

/// 远程产品服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 服务根地址，例如 https://api.restful-api.dev
    pub base_url: String,
    /// 请求超时时间（秒），不设置则不超时
    pub timeout_seconds: Option<u64>,
}

/// 本地镜像存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 数据目录
    pub data_dir: PathBuf,
    /// 槽位名称
    pub slot: String,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
    /// 日志目录，设置后额外按天写入文件
    pub log_dir: Option<PathBuf>,
    /// 日志文件名前缀
    pub file_prefix: String,
}

/// 沙箱服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// 绑定地址
    pub bind_address: String,
    /// 端口
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.restful-api.dev".to_string(),
            timeout_seconds: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            slot: "products".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_prefix: "crud-productos".to_string(),
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl LoggingConfig {
    /// 解析日志级别，调用前应已通过 `AppConfig::validate`
    pub fn max_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

impl AppConfig {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CoreError::Config(format!("读取 {} 失败: {}", path.as_ref().display(), e))
        })?;

        toml::from_str(&content).map_err(|e| CoreError::Config(format!("解析失败: {}", e)))
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("序列化失败: {}", e)))?;

        // 确保目录存在
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::Config(e.to_string()))?;
        }

        fs::write(path.as_ref(), content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), CoreError> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "无效的服务地址: {:?}，必须以 http:// 或 https:// 开头",
                self.api.base_url
            )));
        }
        if self.api.timeout_seconds == Some(0) {
            return Err(CoreError::Config("超时时间必须大于0".to_string()));
        }

        if self.storage.slot.trim().is_empty() {
            return Err(CoreError::Config("槽位名称不能为空".to_string()));
        }

        if self.sandbox.port == 0 {
            return Err(CoreError::Config("沙箱端口必须大于0".to_string()));
        }
        if self.sandbox.bind_address.is_empty() {
            return Err(CoreError::Config("绑定地址不能为空".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(CoreError::Config(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }

    pub fn sandbox_addr(&self) -> String {
        format!("{}:{}", self.sandbox.bind_address, self.sandbox.port)
    }
}

/// 加载配置：优先使用显式路径，否则依次查找默认路径，都没有则使用默认配置
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, CoreError> {
    let config = match explicit {
        Some(path) => AppConfig::load_from_file(path)?,
        None => match CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
            Some(path) => AppConfig::load_from_file(path)?,
            None => AppConfig::default(),
        },
    };

    config.validate()?;
    Ok(config)
}
