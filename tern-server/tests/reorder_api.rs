//! Ordering boundary contract tests
//!
//! 通过 oneshot 直接驱动路由（不经网络栈）验证：创建默认追加、单条
//! sort_order 更新、批量重排、跨 scope 移动与视图查询。

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};

use tern_server::api::{self, OneshotRouter};
use tern_server::{Config, ServerState};

async fn test_state() -> (tempfile::TempDir, ServerState) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        work_dir: dir.path().to_string_lossy().into_owned(),
        http_port: 0,
        environment: "test".into(),
        request_timeout_ms: 5000,
        shutdown_timeout_ms: 1000,
    };
    let state = ServerState::initialize(&config).await;
    (dir, state)
}

async fn call(
    state: &ServerState,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut router = api::build_router();
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.oneshot(state, request).await.expect("oneshot");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("entity id")
}

fn order_of(value: &Value) -> f64 {
    value["sort_order"].as_f64().expect("sort_order")
}

// =============================================================================
// Append-on-create
// =============================================================================

#[tokio::test]
async fn test_create_appends_with_gap_spacing() {
    let (_dir, state) = test_state().await;

    let (status, first) = call(&state, "POST", "/api/areas", Some(json!({"name": "Work"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order_of(&first), 1000.0);

    let (_, second) = call(&state, "POST", "/api/areas", Some(json!({"name": "Home"}))).await;
    assert_eq!(order_of(&second), 2000.0);

    let (_, list) = call(&state, "GET", "/api/areas", None).await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Work", "Home"]);
}

#[tokio::test]
async fn test_task_append_is_scoped_to_its_bucket() {
    let (_dir, state) = test_state().await;

    let (_, project) = call(
        &state,
        "POST",
        "/api/projects",
        Some(json!({"name": "Renovation"})),
    )
    .await;
    let project_id = id_of(&project);

    let (_, t1) = call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "Buy paint", "project_id": project_id})),
    )
    .await;
    let (_, t2) = call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "Sand walls", "project_id": project_id})),
    )
    .await;
    assert_eq!(order_of(&t1), 1000.0);
    assert_eq!(order_of(&t2), 2000.0);

    // 收件箱是独立 scope，排序从头开始
    let (_, inbox_task) = call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "Call plumber"})),
    )
    .await;
    assert_eq!(order_of(&inbox_task), 1000.0);
}

// =============================================================================
// Single-item order update
// =============================================================================

#[tokio::test]
async fn test_single_sort_order_update_repositions_one_row() {
    let (_dir, state) = test_state().await;

    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let (_, task) = call(
            &state,
            "POST",
            "/api/tasks",
            Some(json!({"title": title})),
        )
        .await;
        ids.push(id_of(&task));
    }

    // 把 c 移到最前：单条写入，等价 orderForInsertBetween(None, 1000)
    let (status, moved) = call(
        &state,
        "PUT",
        &format!("/api/tasks/{}", ids[2]),
        Some(json!({"sort_order": 500.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order_of(&moved), 500.0);

    let (_, list) = call(&state, "GET", "/api/tasks?inbox=true", None).await;
    let listed: Vec<i64> = list.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(listed, vec![ids[2], ids[0], ids[1]]);

    // 其余行的排序值逐位未变
    let orders: Vec<f64> = list.as_array().unwrap().iter().map(order_of).collect();
    assert_eq!(orders, vec![500.0, 1000.0, 2000.0]);
}

// =============================================================================
// Batch reorder
// =============================================================================

#[tokio::test]
async fn test_batch_reorder_renumbers_with_gap_spacing() {
    let (_dir, state) = test_state().await;

    let mut ids = Vec::new();
    for name in ["alpha", "beta", "gamma"] {
        let (_, area) = call(&state, "POST", "/api/areas", Some(json!({"name": name}))).await;
        ids.push(id_of(&area));
    }

    let reversed = vec![ids[2], ids[1], ids[0]];
    let (status, response) = call(
        &state,
        "PUT",
        "/api/areas/sort-order",
        Some(json!({"ordered_ids": reversed})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["updated"], 3);

    let (_, list) = call(&state, "GET", "/api/areas", None).await;
    let listed: Vec<i64> = list.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);

    let orders: Vec<f64> = list.as_array().unwrap().iter().map(order_of).collect();
    assert_eq!(orders, vec![1000.0, 2000.0, 3000.0]);
}

#[tokio::test]
async fn test_batch_reorder_reports_missing_rows() {
    let (_dir, state) = test_state().await;

    let (_, area) = call(&state, "POST", "/api/areas", Some(json!({"name": "solo"}))).await;

    // 未知 ID 不计入 updated，客户端据此发现分叉
    let (status, response) = call(
        &state,
        "PUT",
        "/api/areas/sort-order",
        Some(json!({"ordered_ids": [id_of(&area), 424242]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["updated"], 1);
}

// =============================================================================
// Cross-scope move
// =============================================================================

#[tokio::test]
async fn test_move_task_appends_to_destination_section() {
    let (_dir, state) = test_state().await;

    let (_, project) = call(
        &state,
        "POST",
        "/api/projects",
        Some(json!({"name": "Book"})),
    )
    .await;
    let project_id = id_of(&project);

    let (_, section) = call(
        &state,
        "POST",
        "/api/sections",
        Some(json!({"name": "Drafts", "project_id": project_id})),
    )
    .await;
    let section_id = id_of(&section);

    // 目标分组里已有一个任务
    let (_, existing) = call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "Outline", "project_id": project_id, "section_id": section_id})),
    )
    .await;
    assert_eq!(order_of(&existing), 1000.0);

    let (_, task) = call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "Chapter 1", "project_id": project_id})),
    )
    .await;

    // 不带 sort_order 的移动追加到目标分组末尾
    let (status, moved) = call(
        &state,
        "PUT",
        &format!("/api/tasks/{}/move", id_of(&task)),
        Some(json!({"project_id": project_id, "section_id": section_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["section_id"].as_i64(), Some(section_id));
    assert_eq!(order_of(&moved), 2000.0);

    let (_, list) = call(
        &state,
        "GET",
        &format!("/api/tasks?project_id={project_id}&section_id={section_id}"),
        None,
    )
    .await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Outline", "Chapter 1"]);
}

#[tokio::test]
async fn test_move_rejects_section_without_project() {
    let (_dir, state) = test_state().await;

    let (_, task) = call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "stray"})),
    )
    .await;

    let (status, _) = call(
        &state,
        "PUT",
        &format!("/api/tasks/{}/move", id_of(&task)),
        Some(json!({"section_id": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Views
// =============================================================================

#[tokio::test]
async fn test_views_filter_by_date_and_completion() {
    let (_dir, state) = test_state().await;
    let today = shared::util::today_string();

    let (_, due) = call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "due today", "start_date": today})),
    )
    .await;
    call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "later", "start_date": "2999-01-01"})),
    )
    .await;
    let (_, done) = call(
        &state,
        "POST",
        "/api/tasks",
        Some(json!({"title": "finished"})),
    )
    .await;
    call(
        &state,
        "PUT",
        &format!("/api/tasks/{}", id_of(&done)),
        Some(json!({"is_completed": true})),
    )
    .await;

    let (_, today_list) = call(&state, "GET", "/api/views/today", None).await;
    let today_ids: Vec<i64> = today_list.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(today_ids, vec![id_of(&due)]);

    let (_, upcoming) = call(&state, "GET", "/api/views/upcoming", None).await;
    assert_eq!(upcoming.as_array().unwrap().len(), 1);

    let (_, logbook) = call(&state, "GET", "/api/views/logbook", None).await;
    let logbook_ids: Vec<i64> = logbook.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(logbook_ids, vec![id_of(&done)]);
}

// =============================================================================
// End-to-end: controller over the in-process client
// =============================================================================

#[tokio::test]
async fn test_controller_reorder_round_trips_through_server() {
    use tern_client::{InProcessPersistence, ItemKey, ItemKind, ReorderController, ScopedItem};
    use tern_client::Scope;

    let (_dir, state) = test_state().await;

    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let (_, task) = call(
            &state,
            "POST",
            "/api/tasks",
            Some(json!({"title": title})),
        )
        .await;
        ids.push(id_of(&task));
    }

    let router = api::build_router().with_state(state.clone());
    let controller = ReorderController::new(InProcessPersistence::new(router));

    let scope = Scope::inbox();
    controller.load_scope(
        scope,
        vec![
            ScopedItem::new(ids[0], 1000.0),
            ScopedItem::new(ids[1], 2000.0),
            ScopedItem::new(ids[2], 3000.0),
        ],
    );

    // 把 two 拖到最前，经 in-process 持久化落到 SQLite
    let outcome = controller
        .reorder(ItemKey::new(ItemKind::Task, ids[1]), scope, 0)
        .await
        .expect("reorder settles");
    assert_eq!(outcome.new_order, 500.0);

    // 服务端重新拉取的顺序与本地乐观状态一致
    let (_, list) = call(&state, "GET", "/api/tasks?inbox=true", None).await;
    let listed: Vec<i64> = list.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(listed, vec![ids[1], ids[0], ids[2]]);
    assert_eq!(listed, controller.ids(scope));
}
