//! Area API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::area;
use crate::utils::{AppError, AppResult};
use shared::client::{BatchUpdateResponse, ReorderRequest};
use shared::models::{Area, AreaCreate, AreaUpdate};
use shared::ordering;

/// GET /api/areas - 获取所有区域
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Area>>> {
    Ok(Json(area::find_all(&state.pool).await?))
}

/// GET /api/areas/:id - 获取单个区域
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Area>> {
    let found = area::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Area {id} not found")))?;
    Ok(Json(found))
}

/// POST /api/areas - 创建区域（默认追加到末尾）
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AreaCreate>,
) -> AppResult<Json<Area>> {
    let created = area::create(&state.pool, payload).await?;
    Ok(Json(created))
}

/// PUT /api/areas/:id - 更新区域（含单条 sort_order 更新）
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AreaUpdate>,
) -> AppResult<Json<Area>> {
    let updated = area::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/areas/:id - 删除区域 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(area::delete(&state.pool, id).await?))
}

/// PUT /api/areas/sort-order - 批量重排区域
///
/// 请求体为最终顺序的 ID 列表，服务端按 GAP 间隔统一重排。
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(
        count = req.ordered_ids.len(),
        "Batch update area sort order request received"
    );

    let assignments = ordering::renumber_scope(&req.ordered_ids);
    let updated = area::update_sort_orders(&state.pool, &assignments).await?;

    tracing::info!(
        updated = updated,
        total = req.ordered_ids.len(),
        "Batch update area sort order completed"
    );

    Ok(Json(BatchUpdateResponse { updated }))
}
