//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`areas`] - 区域管理接口
//! - [`projects`] - 项目管理接口
//! - [`sections`] - 任务分组接口
//! - [`tasks`] - 任务管理接口（含跨 scope 移动）
//! - [`checklist`] - 子任务清单接口
//! - [`tags`] - 标签管理接口
//! - [`views`] - today/upcoming/logbook 视图

pub mod areas;
pub mod checklist;
pub mod health;
pub mod projects;
pub mod router_ext;
pub mod sections;
pub mod tags;
pub mod tasks;
pub mod views;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
pub use router_ext::{OneshotResult, OneshotRouter};

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(areas::router())
        .merge(projects::router())
        .merge(sections::router())
        .merge(tasks::router())
        .merge(checklist::router())
        .merge(tags::router())
        .merge(views::router())
}

/// Build a fully configured application with all middleware
///
/// This is used by both the HTTP server and oneshot calls
pub fn build_app(_state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}
