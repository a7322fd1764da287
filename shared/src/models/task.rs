//! Task Model

use serde::{Deserialize, Serialize};

/// Task entity
///
/// 排序 scope 由 `(project_id, section_id)` 决定：同一分桶内的任务
/// 按 `sort_order` 升序展示。两者皆空表示收件箱任务。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub project_id: Option<i64>,
    pub section_id: Option<i64>,
    pub sort_order: f64,
    /// 计划开始日期 (YYYY-MM-DD)，today/upcoming 视图据此过滤
    pub start_date: Option<String>,
    /// 截止日期 (YYYY-MM-DD)
    pub deadline: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Tag IDs (junction table)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Create task payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    pub notes: Option<String>,
    pub project_id: Option<i64>,
    pub section_id: Option<i64>,
    /// 省略时追加到目标分桶末尾
    pub sort_order: Option<f64>,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Update task payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub sort_order: Option<f64>,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
    pub is_completed: Option<bool>,
    pub is_active: Option<bool>,
    pub tag_ids: Option<Vec<i64>>,
}
