// ==========================================
// PR 评审人分配服务 - 输入校验
// ==========================================
// 职责: API 边界的请求校验，失败即返回 INVALID_INPUT，不进入引擎
// ==========================================

use std::collections::HashSet;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::TeamMember;

/// ID / 名称类字段长度上限
pub const MAX_FIELD_LEN: usize = 255;

/// 校验必填字段非空且长度合法
pub fn require_field(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{} 不能为空", field)));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(ApiError::InvalidInput(format!(
            "{} 长度不能超过 {} 个字符",
            field, MAX_FIELD_LEN
        )));
    }
    Ok(())
}

/// 校验团队成员列表
///
/// 规则:
/// - 至少一名成员
/// - user_id / username 非空
/// - user_id 不重复
/// - username 不重复
pub fn validate_team_members(members: &[TeamMember]) -> ApiResult<()> {
    if members.is_empty() {
        return Err(ApiError::InvalidInput("团队成员不能为空".to_string()));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(members.len());
    let mut seen_names: HashSet<&str> = HashSet::with_capacity(members.len());
    for (idx, member) in members.iter().enumerate() {
        require_field(&format!("members[{}].user_id", idx), &member.user_id)?;
        require_field(&format!("members[{}].username", idx), &member.username)?;
        if !seen.insert(member.user_id.as_str()) {
            return Err(ApiError::InvalidInput(format!(
                "成员 user_id 重复: {}",
                member.user_id
            )));
        }
        if !seen_names.insert(member.username.as_str()) {
            return Err(ApiError::InvalidInput(format!(
                "成员 username 重复: {}",
                member.username
            )));
        }
    }
    Ok(())
}
