//! Checklist API 模块
//!
//! 列表/创建/重排挂在任务路由下（见 [`super::tasks`]），这里只有
//! 单条更新/删除的扁平路径。

pub(crate) mod handler;

use axum::{Router, routing::put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/checklist/{id}",
        put(handler::update).delete(handler::delete),
    )
}
