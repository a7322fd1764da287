//! Checklist Item Repository
//!
//! 子任务的排序 scope 是所属任务。

use super::{RepoError, RepoResult};
use shared::models::{ChecklistItem, ChecklistItemCreate, ChecklistItemUpdate};
use shared::ordering;
use sqlx::SqlitePool;

const CHECKLIST_SELECT: &str = "SELECT id, task_id, title, sort_order, is_completed, is_active, created_at, updated_at FROM checklist_item";

/// Find active checklist items of a task ordered by sort_order
pub async fn find_by_task(pool: &SqlitePool, task_id: i64) -> RepoResult<Vec<ChecklistItem>> {
    let sql = format!("{CHECKLIST_SELECT} WHERE is_active = 1 AND task_id = ?1 ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, ChecklistItem>(&sql)
        .bind(task_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ChecklistItem>> {
    let sql = format!("{CHECKLIST_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, ChecklistItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn scope_orders(pool: &SqlitePool, task_id: i64) -> RepoResult<Vec<f64>> {
    let orders = sqlx::query_scalar::<_, f64>(
        "SELECT sort_order FROM checklist_item WHERE is_active = 1 AND task_id = ?1",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn create(
    pool: &SqlitePool,
    task_id: i64,
    data: ChecklistItemCreate,
) -> RepoResult<ChecklistItem> {
    if data.title.trim().is_empty() {
        return Err(RepoError::Validation("Checklist title must not be empty".into()));
    }

    let task_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM task WHERE id = ?1 AND is_active = 1")
            .bind(task_id)
            .fetch_one(pool)
            .await?;
    if task_exists == 0 {
        return Err(RepoError::NotFound(format!("Task {task_id} not found")));
    }

    let sort_order = match data.sort_order {
        Some(v) => v,
        None => ordering::order_for_append(&scope_orders(pool, task_id).await?),
    };
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO checklist_item (id, task_id, title, sort_order, is_completed, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 0, 1, ?5, ?5)",
    )
    .bind(id)
    .bind(task_id)
    .bind(&data.title)
    .bind(sort_order)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create checklist item".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: ChecklistItemUpdate,
) -> RepoResult<ChecklistItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE checklist_item SET title = COALESCE(?1, title), sort_order = COALESCE(?2, sort_order), is_completed = COALESCE(?3, is_completed), updated_at = ?4 WHERE id = ?5 AND is_active = 1",
    )
    .bind(data.title)
    .bind(data.sort_order)
    .bind(data.is_completed)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Checklist item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Checklist item {id} not found")))
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE checklist_item SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Apply a batch of (id, sort_order) assignments
pub async fn update_sort_orders(pool: &SqlitePool, assignments: &[(i64, f64)]) -> RepoResult<usize> {
    let now = shared::util::now_millis();
    let mut updated = 0;
    for (id, sort_order) in assignments {
        let result = sqlx::query(
            "UPDATE checklist_item SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1",
        )
        .bind(sort_order)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => updated += 1,
            Ok(_) => tracing::warn!(id = %id, "Checklist item missing during batch sort order update"),
            Err(e) => {
                tracing::error!(id = %id, error = %e, "Failed to update checklist item sort order")
            }
        }
    }
    Ok(updated)
}
