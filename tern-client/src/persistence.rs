//! Order persistence boundary
//!
//! [`OrderPersistence`] 是重排协调器与服务端之间的唯一接缝：单条
//! sort_order 更新、scope 批量重排、跨 scope 移动。网络实现走
//! [`HttpClient`]，`in-process` 特性下可直接驱动服务端 Router（测试用）。

use async_trait::async_trait;

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;
use shared::client::{BatchUpdateResponse, MoveTaskRequest, ReorderRequest};
use shared::{ItemKey, ItemKind, Scope};

/// Persistence capability consumed by the reorder controller
#[async_trait]
pub trait OrderPersistence: Send + Sync {
    /// Persist a single item's new sort_order
    async fn update_order(&self, item: ItemKey, sort_order: f64) -> ClientResult<()>;

    /// Persist a full-scope reorder; returns how many records the server
    /// actually rewrote (the controller compares this against the request)
    async fn batch_update_order(&self, scope: Scope, ordered_ids: &[i64]) -> ClientResult<usize>;

    /// Persist a cross-scope move (scope fields + sort_order in one update)
    async fn move_item(&self, item: ItemKey, dest: Scope, sort_order: f64) -> ClientResult<()>;
}

/// Resource path prefix for one item kind
fn kind_path(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Area => "api/areas",
        ItemKind::Project => "api/projects",
        ItemKind::Section => "api/sections",
        ItemKind::Task => "api/tasks",
        ItemKind::ChecklistItem => "api/checklist",
        ItemKind::Tag => "api/tags",
    }
}

/// Batch reorder endpoint for one scope
fn scope_reorder_path(scope: &Scope) -> String {
    match scope {
        Scope::Areas => "api/areas/sort-order".to_string(),
        Scope::Projects { .. } => "api/projects/sort-order".to_string(),
        Scope::Sections { .. } => "api/sections/sort-order".to_string(),
        Scope::Tasks { .. } => "api/tasks/sort-order".to_string(),
        Scope::Checklist { task_id } => format!("api/tasks/{task_id}/checklist/sort-order"),
        Scope::Tags => "api/tags/sort-order".to_string(),
    }
}

/// Cross-scope move request body for the supported kinds
fn move_body(item: ItemKey, dest: &Scope, sort_order: f64) -> ClientResult<(String, serde_json::Value)> {
    match (item.kind, dest) {
        (ItemKind::Task, Scope::Tasks { project_id, section_id }) => Ok((
            format!("api/tasks/{}/move", item.id),
            serde_json::to_value(MoveTaskRequest {
                project_id: *project_id,
                section_id: *section_id,
                sort_order: Some(sort_order),
            })?,
        )),
        (ItemKind::Project, Scope::Projects { area_id: Some(area_id) }) => Ok((
            format!("api/projects/{}", item.id),
            serde_json::json!({ "area_id": area_id, "sort_order": sort_order }),
        )),
        _ => Err(ClientError::Validation(format!(
            "cross-scope move is not supported for {} into {dest}",
            item
        ))),
    }
}

#[async_trait]
impl OrderPersistence for HttpClient {
    async fn update_order(&self, item: ItemKey, sort_order: f64) -> ClientResult<()> {
        let path = format!("{}/{}", kind_path(item.kind), item.id);
        let body = serde_json::json!({ "sort_order": sort_order });
        let _: serde_json::Value = self.put(&path, &body).await?;
        Ok(())
    }

    async fn batch_update_order(&self, scope: Scope, ordered_ids: &[i64]) -> ClientResult<usize> {
        let response: BatchUpdateResponse = self
            .put(
                &scope_reorder_path(&scope),
                &ReorderRequest {
                    ordered_ids: ordered_ids.to_vec(),
                },
            )
            .await?;
        Ok(response.updated)
    }

    async fn move_item(&self, item: ItemKey, dest: Scope, sort_order: f64) -> ClientResult<()> {
        let (path, body) = move_body(item, &dest, sort_order)?;
        let _: serde_json::Value = self.put(&path, &body).await?;
        Ok(())
    }
}

// =============================================================================
// InProcessPersistence - 直接驱动服务端 Router，不经过网络栈
// =============================================================================

#[cfg(feature = "in-process")]
pub use in_process::InProcessPersistence;

#[cfg(feature = "in-process")]
mod in_process {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use tower::Service;

    /// In-process persistence over a fully configured server router
    /// (`Router<()>`, state already applied)
    #[derive(Clone)]
    pub struct InProcessPersistence {
        router: axum::Router,
    }

    impl InProcessPersistence {
        pub fn new(router: axum::Router) -> Self {
            Self { router }
        }

        async fn put_json<T: serde::de::DeserializeOwned>(
            &self,
            path: &str,
            body: &serde_json::Value,
        ) -> ClientResult<T> {
            let request = Request::builder()
                .method("PUT")
                .uri(format!("/{}", path.trim_start_matches('/')))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body)?))
                .map_err(|e| ClientError::Internal(e.to_string()))?;

            let mut svc = self.router.clone();
            let response = svc
                .call(request)
                .await
                .map_err(|e| ClientError::Internal(e.to_string()))?;

            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .map_err(|e| ClientError::Internal(e.to_string()))?;

            if !status.is_success() {
                let message = serde_json::from_slice::<shared::ApiResponse<()>>(&bytes)
                    .map(|r| r.message)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
                return match status {
                    StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                    StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                        Err(ClientError::Validation(message))
                    }
                    _ => Err(ClientError::Internal(message)),
                };
            }

            Ok(serde_json::from_slice(&bytes)?)
        }
    }

    #[async_trait]
    impl OrderPersistence for InProcessPersistence {
        async fn update_order(&self, item: ItemKey, sort_order: f64) -> ClientResult<()> {
            let path = format!("{}/{}", kind_path(item.kind), item.id);
            let body = serde_json::json!({ "sort_order": sort_order });
            let _: serde_json::Value = self.put_json(&path, &body).await?;
            Ok(())
        }

        async fn batch_update_order(
            &self,
            scope: Scope,
            ordered_ids: &[i64],
        ) -> ClientResult<usize> {
            let body = serde_json::json!({ "ordered_ids": ordered_ids });
            let response: BatchUpdateResponse =
                self.put_json(&scope_reorder_path(&scope), &body).await?;
            Ok(response.updated)
        }

        async fn move_item(&self, item: ItemKey, dest: Scope, sort_order: f64) -> ClientResult<()> {
            let (path, body) = move_body(item, &dest, sort_order)?;
            let _: serde_json::Value = self.put_json(&path, &body).await?;
            Ok(())
        }
    }
}
