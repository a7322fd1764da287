//! HTTP client for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::client::{BatchUpdateResponse, MoveTaskRequest, ReorderRequest};
use shared::models::{
    Area, AreaCreate, AreaUpdate, ChecklistItem, ChecklistItemCreate, ChecklistItemUpdate,
    Project, ProjectCreate, ProjectUpdate, Tag, TagCreate, TagUpdate, Task, TaskCreate,
    TaskSection, TaskSectionCreate, TaskSectionUpdate, TaskUpdate,
};

/// HTTP client for making network requests to Tern Server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.client.post(&url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.client.put(&url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.client.delete(&url).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            // 服务端错误体是 ApiResponse 信封，取其 message
            let message = serde_json::from_str::<shared::ApiResponse<()>>(&text)
                .map(|r| r.message)
                .unwrap_or(text);
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                    Err(ClientError::Validation(message))
                }
                _ => Err(ClientError::Internal(message)),
            };
        }

        response.json().await.map_err(Into::into)
    }

    // ========== Area API ==========

    pub async fn list_areas(&self) -> ClientResult<Vec<Area>> {
        self.get("/api/areas").await
    }

    pub async fn create_area(&self, data: &AreaCreate) -> ClientResult<Area> {
        self.post("/api/areas", data).await
    }

    pub async fn update_area(&self, id: i64, data: &AreaUpdate) -> ClientResult<Area> {
        self.put(&format!("/api/areas/{id}"), data).await
    }

    pub async fn delete_area(&self, id: i64) -> ClientResult<bool> {
        self.delete(&format!("/api/areas/{id}")).await
    }

    pub async fn reorder_areas(&self, ordered_ids: Vec<i64>) -> ClientResult<BatchUpdateResponse> {
        self.put("/api/areas/sort-order", &ReorderRequest { ordered_ids })
            .await
    }

    // ========== Project API ==========

    pub async fn list_projects(&self, area_id: Option<i64>) -> ClientResult<Vec<Project>> {
        match area_id {
            Some(id) => self.get(&format!("/api/projects?area_id={id}")).await,
            None => self.get("/api/projects").await,
        }
    }

    pub async fn create_project(&self, data: &ProjectCreate) -> ClientResult<Project> {
        self.post("/api/projects", data).await
    }

    pub async fn update_project(&self, id: i64, data: &ProjectUpdate) -> ClientResult<Project> {
        self.put(&format!("/api/projects/{id}"), data).await
    }

    pub async fn delete_project(&self, id: i64) -> ClientResult<bool> {
        self.delete(&format!("/api/projects/{id}")).await
    }

    pub async fn reorder_projects(
        &self,
        ordered_ids: Vec<i64>,
    ) -> ClientResult<BatchUpdateResponse> {
        self.put("/api/projects/sort-order", &ReorderRequest { ordered_ids })
            .await
    }

    // ========== Section API ==========

    pub async fn list_sections(&self, project_id: i64) -> ClientResult<Vec<TaskSection>> {
        self.get(&format!("/api/projects/{project_id}/sections"))
            .await
    }

    pub async fn create_section(&self, data: &TaskSectionCreate) -> ClientResult<TaskSection> {
        self.post("/api/sections", data).await
    }

    pub async fn update_section(
        &self,
        id: i64,
        data: &TaskSectionUpdate,
    ) -> ClientResult<TaskSection> {
        self.put(&format!("/api/sections/{id}"), data).await
    }

    pub async fn delete_section(&self, id: i64) -> ClientResult<bool> {
        self.delete(&format!("/api/sections/{id}")).await
    }

    pub async fn reorder_sections(
        &self,
        ordered_ids: Vec<i64>,
    ) -> ClientResult<BatchUpdateResponse> {
        self.put("/api/sections/sort-order", &ReorderRequest { ordered_ids })
            .await
    }

    // ========== Task API ==========

    /// List every active task
    pub async fn list_all_tasks(&self) -> ClientResult<Vec<Task>> {
        self.get("/api/tasks").await
    }

    /// List tasks in one `(project, section)` bucket (inbox when both are `None`)
    pub async fn list_tasks(
        &self,
        project_id: Option<i64>,
        section_id: Option<i64>,
    ) -> ClientResult<Vec<Task>> {
        let mut path = String::from("/api/tasks");
        let mut params = Vec::new();
        if let Some(p) = project_id {
            params.push(format!("project_id={p}"));
        }
        if let Some(s) = section_id {
            params.push(format!("section_id={s}"));
        }
        if project_id.is_none() && section_id.is_none() {
            params.push("inbox=true".to_string());
        }
        if !params.is_empty() {
            path.push('?');
            path.push_str(&params.join("&"));
        }
        self.get(&path).await
    }

    pub async fn create_task(&self, data: &TaskCreate) -> ClientResult<Task> {
        self.post("/api/tasks", data).await
    }

    pub async fn update_task(&self, id: i64, data: &TaskUpdate) -> ClientResult<Task> {
        self.put(&format!("/api/tasks/{id}"), data).await
    }

    pub async fn move_task(&self, id: i64, data: &MoveTaskRequest) -> ClientResult<Task> {
        self.put(&format!("/api/tasks/{id}/move"), data).await
    }

    pub async fn delete_task(&self, id: i64) -> ClientResult<bool> {
        self.delete(&format!("/api/tasks/{id}")).await
    }

    pub async fn reorder_tasks(&self, ordered_ids: Vec<i64>) -> ClientResult<BatchUpdateResponse> {
        self.put("/api/tasks/sort-order", &ReorderRequest { ordered_ids })
            .await
    }

    // ========== Checklist API ==========

    pub async fn list_checklist(&self, task_id: i64) -> ClientResult<Vec<ChecklistItem>> {
        self.get(&format!("/api/tasks/{task_id}/checklist")).await
    }

    pub async fn create_checklist_item(
        &self,
        task_id: i64,
        data: &ChecklistItemCreate,
    ) -> ClientResult<ChecklistItem> {
        self.post(&format!("/api/tasks/{task_id}/checklist"), data)
            .await
    }

    pub async fn update_checklist_item(
        &self,
        id: i64,
        data: &ChecklistItemUpdate,
    ) -> ClientResult<ChecklistItem> {
        self.put(&format!("/api/checklist/{id}"), data).await
    }

    pub async fn delete_checklist_item(&self, id: i64) -> ClientResult<bool> {
        self.delete(&format!("/api/checklist/{id}")).await
    }

    // ========== Tag API ==========

    pub async fn list_tags(&self) -> ClientResult<Vec<Tag>> {
        self.get("/api/tags").await
    }

    pub async fn create_tag(&self, data: &TagCreate) -> ClientResult<Tag> {
        self.post("/api/tags", data).await
    }

    pub async fn update_tag(&self, id: i64, data: &TagUpdate) -> ClientResult<Tag> {
        self.put(&format!("/api/tags/{id}"), data).await
    }

    pub async fn delete_tag(&self, id: i64) -> ClientResult<bool> {
        self.delete(&format!("/api/tags/{id}")).await
    }

    pub async fn reorder_tags(&self, ordered_ids: Vec<i64>) -> ClientResult<BatchUpdateResponse> {
        self.put("/api/tags/sort-order", &ReorderRequest { ordered_ids })
            .await
    }

    // ========== View API ==========

    pub async fn view_today(&self) -> ClientResult<Vec<Task>> {
        self.get("/api/views/today").await
    }

    pub async fn view_upcoming(&self) -> ClientResult<Vec<Task>> {
        self.get("/api/views/upcoming").await
    }

    pub async fn view_logbook(&self, page: u32, per_page: u32) -> ClientResult<Vec<Task>> {
        self.get(&format!("/api/views/logbook?page={page}&per_page={per_page}"))
            .await
    }
}
