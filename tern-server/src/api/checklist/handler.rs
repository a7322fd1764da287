//! Checklist API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::checklist;
use crate::utils::AppResult;
use shared::client::{BatchUpdateResponse, ReorderRequest};
use shared::models::{ChecklistItem, ChecklistItemCreate, ChecklistItemUpdate};
use shared::ordering;

/// GET /api/tasks/:task_id/checklist - 获取任务的子任务清单
pub async fn list(
    State(state): State<ServerState>,
    Path(task_id): Path<i64>,
) -> AppResult<Json<Vec<ChecklistItem>>> {
    Ok(Json(checklist::find_by_task(&state.pool, task_id).await?))
}

/// POST /api/tasks/:task_id/checklist - 创建子任务（默认追加到末尾）
pub async fn create(
    State(state): State<ServerState>,
    Path(task_id): Path<i64>,
    Json(payload): Json<ChecklistItemCreate>,
) -> AppResult<Json<ChecklistItem>> {
    let created = checklist::create(&state.pool, task_id, payload).await?;
    Ok(Json(created))
}

/// PUT /api/checklist/:id - 更新子任务
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ChecklistItemUpdate>,
) -> AppResult<Json<ChecklistItem>> {
    let updated = checklist::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/checklist/:id - 删除子任务 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(checklist::delete(&state.pool, id).await?))
}

/// PUT /api/tasks/:task_id/checklist/sort-order - 批量重排子任务
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Path(task_id): Path<i64>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(
        task_id = %task_id,
        count = req.ordered_ids.len(),
        "Batch update checklist sort order request received"
    );

    let assignments = ordering::renumber_scope(&req.ordered_ids);
    let updated = checklist::update_sort_orders(&state.pool, &assignments).await?;

    Ok(Json(BatchUpdateResponse { updated }))
}
