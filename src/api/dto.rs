// ==========================================
// PR 评审人分配服务 - API 数据传输对象
// ==========================================
// 职责: 请求/响应的 JSON 形状（字段名与对外协议一致）
// 约定: 请求字段缺省为空值，由 validator 统一报 INVALID_INPUT
// ==========================================

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PrStatus, PullRequest, PullRequestShort, TeamMember, TeamWithMembers, User};
use crate::engine::DeactivationResult;

/// RFC 3339（秒精度，UTC 以 Z 结尾）
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ==========================================
// Pull Request
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<String>,
}

impl From<&PullRequest> for PullRequestDto {
    fn from(pr: &PullRequest) -> Self {
        Self {
            pull_request_id: pr.pull_request_id.clone(),
            pull_request_name: pr.pull_request_name.clone(),
            author_id: pr.author_id.clone(),
            status: pr.status,
            assigned_reviewers: pr.assigned_reviewers.clone(),
            created_at: format_timestamp(&pr.created_at),
            merged_at: pr.merged_at.as_ref().map(format_timestamp),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MergePullRequestRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReassignReviewerRequest {
    pub pull_request_id: String,
    pub old_user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub pr: PullRequestDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignReviewerResponse {
    pub pr: PullRequestDto,
    pub replaced_by: String,
}

// ==========================================
// Team
// ==========================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTeamRequest {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    pub team: TeamWithMembers,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamQuery {
    pub team_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeactivateMembersRequest {
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivateMembersResponse {
    pub deactivated_count: usize,
    pub reassigned_prs: usize,
    pub user_ids: Vec<String>,
}

impl From<&DeactivationResult> for DeactivateMembersResponse {
    fn from(result: &DeactivationResult) -> Self {
        Self {
            deactivated_count: result.deactivated_count,
            reassigned_prs: result.reassigned_count,
            user_ids: result.user_ids.clone(),
        }
    }
}

// ==========================================
// User
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            team_name: user.team_name.clone(),
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}

// ==========================================
// 通用
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}
