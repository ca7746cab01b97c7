// ==========================================
// PR 评审人分配服务 - 引擎层
// ==========================================
// 职责: 评审人选择策略 + 分配引擎（创建/合并/替换/批量停用）
// 红线: Engine 不拼 SQL，所有数据访问经存储契约
// ==========================================

pub mod assignment;
pub mod deactivation;
pub mod error;
pub mod repositories;
pub mod reviewer_policy;

// 重导出核心引擎
pub use assignment::{AssignmentEngine, Reassignment};
pub use deactivation::DeactivationResult;
pub use error::{EngineError, EngineResult};
pub use repositories::AssignmentRepositories;
pub use reviewer_policy::{RandomSource, ReplacementChoice, ReviewerSelectionPolicy};
