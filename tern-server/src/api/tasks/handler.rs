//! Task API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::task;
use crate::utils::{AppError, AppResult};
use shared::client::{BatchUpdateResponse, MoveTaskRequest, ReorderRequest};
use shared::models::{Task, TaskCreate, TaskUpdate};
use shared::ordering;

/// List query: 按 `(project, section)` 分桶过滤；`inbox=true` 时返回收件箱
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub project_id: Option<i64>,
    pub section_id: Option<i64>,
    #[serde(default)]
    pub inbox: bool,
}

/// GET /api/tasks - 获取任务列表
///
/// 不带参数时返回全部活跃任务；带 project_id/section_id 时返回对应
/// 分桶，均按 sort_order 升序。
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TaskListQuery>,
) -> AppResult<Json<Vec<Task>>> {
    let tasks = if query.inbox {
        task::find_scope(&state.pool, None, None).await?
    } else if query.project_id.is_some() || query.section_id.is_some() {
        task::find_scope(&state.pool, query.project_id, query.section_id).await?
    } else {
        task::find_all(&state.pool).await?
    };
    Ok(Json(tasks))
}

/// GET /api/tasks/:id - 获取单个任务
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Task>> {
    let found = task::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))?;
    Ok(Json(found))
}

/// POST /api/tasks - 创建任务（默认追加到目标分桶末尾）
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TaskCreate>,
) -> AppResult<Json<Task>> {
    let created = task::create(&state.pool, payload).await?;
    Ok(Json(created))
}

/// PUT /api/tasks/:id - 更新任务（含单条 sort_order 更新）
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskUpdate>,
) -> AppResult<Json<Task>> {
    let updated = task::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// PUT /api/tasks/:id/move - 跨 scope 移动任务
///
/// project/section 与 sort_order 同一次更新落库；sort_order 省略时
/// 追加到目标分桶末尾。
pub async fn move_task(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MoveTaskRequest>,
) -> AppResult<Json<Task>> {
    tracing::debug!(
        id = %id,
        project_id = ?payload.project_id,
        section_id = ?payload.section_id,
        "Move task request received"
    );
    let moved = task::move_task(&state.pool, id, payload).await?;
    Ok(Json(moved))
}

/// DELETE /api/tasks/:id - 删除任务 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(task::delete(&state.pool, id).await?))
}

/// PUT /api/tasks/sort-order - 批量重排任务
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(
        count = req.ordered_ids.len(),
        "Batch update task sort order request received"
    );

    let assignments = ordering::renumber_scope(&req.ordered_ids);
    let updated = task::update_sort_orders(&state.pool, &assignments).await?;

    tracing::info!(
        updated = updated,
        total = req.ordered_ids.len(),
        "Batch update task sort order completed"
    );

    Ok(Json(BatchUpdateResponse { updated }))
}
