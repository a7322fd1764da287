//! Task Section Model

use serde::{Deserialize, Serialize};

/// Section entity — 项目内的任务分组
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TaskSection {
    pub id: i64,
    pub name: String,
    pub project_id: i64,
    pub sort_order: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create section payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSectionCreate {
    pub name: String,
    pub project_id: i64,
    pub sort_order: Option<f64>,
}

/// Update section payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSectionUpdate {
    pub name: Option<String>,
    pub sort_order: Option<f64>,
    pub is_active: Option<bool>,
}
