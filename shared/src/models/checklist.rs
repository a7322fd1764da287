//! Checklist Item Model

use serde::{Deserialize, Serialize};

/// Checklist item entity — 任务下的子任务
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ChecklistItem {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub sort_order: f64,
    pub is_completed: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create checklist item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItemCreate {
    pub title: String,
    pub sort_order: Option<f64>,
}

/// Update checklist item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItemUpdate {
    pub title: Option<String>,
    pub sort_order: Option<f64>,
    pub is_completed: Option<bool>,
}
