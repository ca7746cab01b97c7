// ==========================================
// PR 评审人分配服务 - 配置层
// ==========================================
// 职责: 进程级配置加载（环境变量）
// ==========================================

pub mod app_config;

// 重导出
pub use app_config::{config_keys, AppConfig, ConfigError, LogFormat};
