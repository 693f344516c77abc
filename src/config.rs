use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::{AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 访问凭证（随每次拉取/提交请求发送）
    pub api_key: String,
    /// 后端 API 地址
    pub api_base_url: String,
    /// 是否使用内置的模拟后端
    pub use_mock_api: bool,
    /// 模拟后端的题目数据文件（TOML），为空时使用内置题目
    pub mock_fixture_file: Option<String>,
    /// 模拟后端的网络延迟（毫秒），为空时使用默认延迟
    pub mock_latency_ms: Option<u64>,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: "12345abc".to_string(),
            api_base_url: "http://localhost:8080/api".to_string(),
            use_mock_api: true,
            mock_fixture_file: None,
            mock_latency_ms: None,
            request_timeout_secs: 30,
            verbose_logging: false,
            output_log_file: "review_log.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_key: std::env::var("API_KEY").unwrap_or(default.api_key),
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            use_mock_api: parse_env("USE_MOCK_API", "bool").unwrap_or(default.use_mock_api),
            mock_fixture_file: std::env::var("MOCK_FIXTURE_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            mock_latency_ms: parse_env("MOCK_LATENCY_MS", "u64"),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "u64")
                .unwrap_or(default.request_timeout_secs),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")
                .unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::EmptyCredential.into());
        }
        Ok(())
    }

    /// 会话层只需要凭证，不持有整个配置
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            api_key: self.api_key.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 批次会话配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// 访问凭证
    pub api_key: String,
}

impl SessionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

/// 读取并解析环境变量，解析失败时记录警告并返回 None
fn parse_env<T: FromStr>(var_name: &str, expected_type: &str) -> Option<T> {
    let value = std::env::var(var_name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            let err = ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            };
            warn!("⚠️ {}，使用默认值", err);
            None
        }
    }
}
