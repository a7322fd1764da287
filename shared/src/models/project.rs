//! Project Model

use serde::{Deserialize, Serialize};

/// Project entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    /// 所属区域；`None` 表示未归入任何区域
    pub area_id: Option<i64>,
    pub sort_order: f64,
    pub is_completed: bool,
    pub completed_at: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create project payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreate {
    pub name: String,
    pub notes: Option<String>,
    pub area_id: Option<i64>,
    pub sort_order: Option<f64>,
}

/// Update project payload
///
/// `area_id` 变化即跨 scope 移动，通常与新的 `sort_order` 一起提交。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub area_id: Option<i64>,
    pub sort_order: Option<f64>,
    pub is_completed: Option<bool>,
    pub is_active: Option<bool>,
}
