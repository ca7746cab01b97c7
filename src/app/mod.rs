// ==========================================
// PR 评审人分配服务 - 应用层
// ==========================================
// 职责: 状态装配 + HTTP 服务，连接外部请求与 API 层
// ==========================================

pub mod http_server;
pub mod state;

// 重导出
pub use http_server::{build_router, serve, REQUEST_ID_HEADER};
pub use state::{get_default_db_path, AppState};
