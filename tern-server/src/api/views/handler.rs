//! View API Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::core::ServerState;
use crate::db::repository::task;
use crate::utils::AppResult;
use shared::models::Task;
use shared::request::PaginationQuery;

/// GET /api/views/today - 今天视图
pub async fn today(State(state): State<ServerState>) -> AppResult<Json<Vec<Task>>> {
    let today = shared::util::today_string();
    Ok(Json(task::find_today(&state.pool, &today).await?))
}

/// GET /api/views/upcoming - 计划视图（按开始日期排序）
pub async fn upcoming(State(state): State<ServerState>) -> AppResult<Json<Vec<Task>>> {
    let today = shared::util::today_string();
    Ok(Json(task::find_upcoming(&state.pool, &today).await?))
}

/// GET /api/views/logbook - 日志视图（已完成任务，分页）
pub async fn logbook(
    State(state): State<ServerState>,
    Query(page): Query<PaginationQuery>,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(
        task::find_logbook(&state.pool, page.limit(), page.offset()).await?,
    ))
}
