//! Area Model

use serde::{Deserialize, Serialize};

/// Area entity — 最外层分组，项目归属其中
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Area {
    pub id: i64,
    pub name: String,
    pub sort_order: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create area payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaCreate {
    pub name: String,
    /// 省略时追加到列表末尾
    pub sort_order: Option<f64>,
}

/// Update area payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaUpdate {
    pub name: Option<String>,
    pub sort_order: Option<f64>,
    pub is_active: Option<bool>,
}
