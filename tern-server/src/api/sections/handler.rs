//! Task Section API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::section;
use crate::utils::{AppError, AppResult};
use shared::client::{BatchUpdateResponse, ReorderRequest};
use shared::models::{TaskSection, TaskSectionCreate, TaskSectionUpdate};
use shared::ordering;

/// GET /api/sections/:id - 获取单个分组
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TaskSection>> {
    let found = section::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Section {id} not found")))?;
    Ok(Json(found))
}

/// POST /api/sections - 创建分组（默认追加到项目末尾）
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TaskSectionCreate>,
) -> AppResult<Json<TaskSection>> {
    let created = section::create(&state.pool, payload).await?;
    Ok(Json(created))
}

/// PUT /api/sections/:id - 更新分组
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskSectionUpdate>,
) -> AppResult<Json<TaskSection>> {
    let updated = section::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/sections/:id - 删除分组（其下任务回落到项目默认分桶）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(section::delete(&state.pool, id).await?))
}

/// PUT /api/sections/sort-order - 批量重排分组
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(
        count = req.ordered_ids.len(),
        "Batch update section sort order request received"
    );

    let assignments = ordering::renumber_scope(&req.ordered_ids);
    let updated = section::update_sort_orders(&state.pool, &assignments).await?;

    tracing::info!(
        updated = updated,
        total = req.ordered_ids.len(),
        "Batch update section sort order completed"
    );

    Ok(Json(BatchUpdateResponse { updated }))
}
