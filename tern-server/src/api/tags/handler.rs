//! Tag API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::tag;
use crate::utils::{AppError, AppResult};
use shared::client::{BatchUpdateResponse, ReorderRequest};
use shared::models::{Tag, TagCreate, TagUpdate};
use shared::ordering;

/// GET /api/tags - 获取所有标签
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Tag>>> {
    Ok(Json(tag::find_all(&state.pool).await?))
}

/// GET /api/tags/:id - 获取单个标签
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Tag>> {
    let found = tag::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tag {id} not found")))?;
    Ok(Json(found))
}

/// POST /api/tags - 创建标签
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TagCreate>,
) -> AppResult<Json<Tag>> {
    let created = tag::create(&state.pool, payload).await?;
    Ok(Json(created))
}

/// PUT /api/tags/:id - 更新标签
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TagUpdate>,
) -> AppResult<Json<Tag>> {
    let updated = tag::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/tags/:id - 删除标签（并从所有任务摘除）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(tag::delete(&state.pool, id).await?))
}

/// PUT /api/tags/sort-order - 批量重排标签
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(
        count = req.ordered_ids.len(),
        "Batch update tag sort order request received"
    );

    let assignments = ordering::renumber_scope(&req.ordered_ids);
    let updated = tag::update_sort_orders(&state.pool, &assignments).await?;

    Ok(Json(BatchUpdateResponse { updated }))
}
