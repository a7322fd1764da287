//! Project API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{project, section};
use crate::utils::{AppError, AppResult};
use shared::client::{BatchUpdateResponse, ReorderRequest};
use shared::models::{Project, ProjectCreate, ProjectUpdate, TaskSection};
use shared::ordering;

/// List query: 按区域过滤；`unfiled=true` 时只返回未归档项目
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub area_id: Option<i64>,
    #[serde(default)]
    pub unfiled: bool,
}

/// GET /api/projects - 获取项目列表（可按区域过滤）
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProjectListQuery>,
) -> AppResult<Json<Vec<Project>>> {
    let projects = if query.unfiled {
        project::find_by_area(&state.pool, None).await?
    } else if query.area_id.is_some() {
        project::find_by_area(&state.pool, query.area_id).await?
    } else {
        project::find_all(&state.pool).await?
    };
    Ok(Json(projects))
}

/// GET /api/projects/:id - 获取单个项目
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Project>> {
    let found = project::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))?;
    Ok(Json(found))
}

/// GET /api/projects/:id/sections - 获取项目下的分组
pub async fn list_sections(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<TaskSection>>> {
    Ok(Json(section::find_by_project(&state.pool, id).await?))
}

/// POST /api/projects - 创建项目（默认追加到所属区域末尾）
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProjectCreate>,
) -> AppResult<Json<Project>> {
    let created = project::create(&state.pool, payload).await?;
    Ok(Json(created))
}

/// PUT /api/projects/:id - 更新项目（area_id 变化即跨区域移动）
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectUpdate>,
) -> AppResult<Json<Project>> {
    let updated = project::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/projects/:id - 删除项目 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(project::delete(&state.pool, id).await?))
}

/// PUT /api/projects/sort-order - 批量重排项目
pub async fn batch_update_sort_order(
    State(state): State<ServerState>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<BatchUpdateResponse>> {
    tracing::info!(
        count = req.ordered_ids.len(),
        "Batch update project sort order request received"
    );

    let assignments = ordering::renumber_scope(&req.ordered_ids);
    let updated = project::update_sort_orders(&state.pool, &assignments).await?;

    tracing::info!(
        updated = updated,
        total = req.ordered_ids.len(),
        "Batch update project sort order completed"
    );

    Ok(Json(BatchUpdateResponse { updated }))
}
