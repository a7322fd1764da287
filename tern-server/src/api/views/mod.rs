//! View API 模块
//!
//! today / upcoming / logbook 三个只读视图。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/views", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/today", get(handler::today))
        .route("/upcoming", get(handler::upcoming))
        .route("/logbook", get(handler::logbook))
}
