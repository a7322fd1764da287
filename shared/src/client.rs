//! Client-related types shared between server and client
//!
//! Request/response DTOs used in API communication. These types are
//! shared between tern-server and tern-client.

use serde::{Deserialize, Serialize};

// Re-export ApiResponse from response module
pub use crate::response::ApiResponse;

// =============================================================================
// Sort Order DTOs
// =============================================================================

/// Batch reorder request: 一个 scope 内按最终顺序排列的全部 ID。
/// 服务端按 GAP 间隔重排这些记录的 sort_order。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<i64>,
}

/// Response for batch update operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateResponse {
    pub updated: usize,
}

// =============================================================================
// Task Move DTO
// =============================================================================

/// Cross-scope task move: 目标 project/section 与新 sort_order
/// 在同一次更新中落库。`sort_order` 为空时服务端追加到目标 scope 末尾。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveTaskRequest {
    pub project_id: Option<i64>,
    pub section_id: Option<i64>,
    pub sort_order: Option<f64>,
}
