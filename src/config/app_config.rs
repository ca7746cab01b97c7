// ==========================================
// PR 评审人分配服务 - 应用配置
// ==========================================
// 来源: 环境变量（HTTP_PORT / DB_PATH / ADMIN_TOKEN / LOG_LEVEL / LOG_FORMAT）
// ==========================================

use std::fmt;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// 配置键常量
pub mod config_keys {
    pub const HTTP_PORT: &str = "HTTP_PORT";
    pub const DB_PATH: &str = "DB_PATH";
    pub const ADMIN_TOKEN: &str = "ADMIN_TOKEN";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// 配置错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("缺少必填配置: {0}")]
    Missing(&'static str),

    #[error("配置值无效 ({key}={value}): {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP 监听端口
    pub http_port: u16,
    /// SQLite 数据库路径
    pub db_path: String,
    /// 管理员令牌（Bearer）
    pub admin_token: String,
    /// 默认日志级别
    pub log_level: String,
    /// 日志输出格式
    pub log_format: LogFormat,
}

impl AppConfig {
    /// 从进程环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// # 参数
    /// - `lookup`: 按键名取值；返回 None 表示未设置
    ///
    /// # 返回
    /// - `Err(ConfigError::Missing)`: ADMIN_TOKEN 未设置或为空
    /// - `Err(ConfigError::InvalidValue)`: 端口/日志级别/日志格式无法解析
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let http_port = match get(config_keys::HTTP_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: config_keys::HTTP_PORT,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let admin_token =
            get(config_keys::ADMIN_TOKEN).ok_or(ConfigError::Missing(config_keys::ADMIN_TOKEN))?;

        let log_format = match get(config_keys::LOG_FORMAT).as_deref() {
            None => LogFormat::Text,
            Some(raw) => match raw.to_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: config_keys::LOG_FORMAT,
                        value: raw.to_string(),
                        reason: "仅支持 text / json".to_string(),
                    })
                }
            },
        };

        let log_level = match get(config_keys::LOG_LEVEL) {
            Some(raw) => {
                validate_log_level(&raw).map_err(|reason| ConfigError::InvalidValue {
                    key: config_keys::LOG_LEVEL,
                    value: raw.clone(),
                    reason,
                })?;
                raw
            }
            None => DEFAULT_LOG_LEVEL.to_string(),
        };

        Ok(Self {
            http_port,
            db_path: get(config_keys::DB_PATH).unwrap_or_else(crate::app::get_default_db_path),
            admin_token,
            log_level,
            log_format,
        })
    }
}

/// 校验日志级别表达式
///
/// 不含 `=` 的片段必须是级别名（trace/debug/info/warn/error/off），
/// 含 `=` 的片段按 EnvFilter 指令解析
fn validate_log_level(raw: &str) -> Result<(), String> {
    for directive in raw.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        if !directive.contains('=') {
            directive
                .parse::<LevelFilter>()
                .map_err(|e| format!("{}: {}", directive, e))?;
        }
    }
    EnvFilter::try_new(raw).map(|_| ()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("ADMIN_TOKEN", "secret"),
            ("DB_PATH", "/tmp/pr.db"),
        ]))
        .unwrap();

        assert_eq!(cfg.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(cfg.admin_token, "secret");
        assert_eq!(cfg.db_path, "/tmp/pr.db");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn test_admin_token_required() {
        let err = AppConfig::from_lookup(lookup_from(&[("ADMIN_TOKEN", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ADMIN_TOKEN"));
    }

    #[test]
    fn test_invalid_port_and_format() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("ADMIN_TOKEN", "t"),
            ("HTTP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "HTTP_PORT", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("ADMIN_TOKEN", "t"),
            ("DB_PATH", "/tmp/pr.db"),
            ("LOG_FORMAT", "xml"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "LOG_FORMAT", .. }));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("ADMIN_TOKEN", "t"),
            ("DB_PATH", "/tmp/pr.db"),
            ("LOG_LEVEL", "not-a-level!!"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "LOG_LEVEL", .. }));

        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("ADMIN_TOKEN", "t"),
            ("DB_PATH", "/tmp/pr.db"),
            ("LOG_LEVEL", "warn,pr_reviewer_service=debug"),
        ]))
        .unwrap();
        assert_eq!(cfg.log_level, "warn,pr_reviewer_service=debug");
    }

    #[test]
    fn test_json_format_and_custom_port() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("ADMIN_TOKEN", "t"),
            ("DB_PATH", "/tmp/pr.db"),
            ("HTTP_PORT", "9090"),
            ("LOG_FORMAT", "JSON"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(cfg.http_port, 9090);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.log_level, "debug");
    }
}
