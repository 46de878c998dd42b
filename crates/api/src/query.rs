//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `pulse_db::clamp_limit` / `clamp_offset`.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /projects?status=&limit=&offset=`
#[derive(Debug, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /projects/{id}/risks?type=`
#[derive(Debug, Deserialize)]
pub struct RiskListParams {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
}

/// `GET /notifications?unread_only=&limit=&offset=`
#[derive(Debug, Deserialize)]
pub struct NotificationListParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
