// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量覆盖日志级别，支持 text / json 两种输出
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogFormat;

/// 初始化日志系统
///
/// # 参数
/// - `level`: 默认日志级别（如 "info"、"debug"）
/// - `format`: 输出格式
///
/// # 环境变量
/// - RUST_LOG: 存在时覆盖 `level`
///   例如: RUST_LOG=pr_reviewer_service=trace
///
/// # 示例
/// ```no_run
/// use pr_reviewer_service::{config::LogFormat, logging};
/// logging::init("info", LogFormat::Text);
/// ```
pub fn init(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // 已安装过全局 subscriber 时忽略
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
