//! Task API 模块

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use super::checklist::handler as checklist;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tasks", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Batch sort order update (must be before /{id} to avoid path conflicts)
        .route("/sort-order", put(handler::batch_update_sort_order))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        // Cross-scope move: project/section + sort_order in one update
        .route("/{id}/move", put(handler::move_task))
        // Checklist of one task (flat update/delete lives in super::checklist)
        .route(
            "/{id}/checklist",
            get(checklist::list).post(checklist::create),
        )
        .route(
            "/{id}/checklist/sort-order",
            put(checklist::batch_update_sort_order),
        )
}
