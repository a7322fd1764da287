//! Task Section Repository

use super::{RepoError, RepoResult};
use shared::models::{TaskSection, TaskSectionCreate, TaskSectionUpdate};
use shared::ordering;
use sqlx::SqlitePool;

const SECTION_SELECT: &str =
    "SELECT id, name, project_id, sort_order, is_active, created_at, updated_at FROM task_section";

/// Find active sections of a project ordered by sort_order
pub async fn find_by_project(pool: &SqlitePool, project_id: i64) -> RepoResult<Vec<TaskSection>> {
    let sql = format!("{SECTION_SELECT} WHERE is_active = 1 AND project_id = ?1 ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, TaskSection>(&sql)
        .bind(project_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<TaskSection>> {
    let sql = format!("{SECTION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, TaskSection>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn scope_orders(pool: &SqlitePool, project_id: i64) -> RepoResult<Vec<f64>> {
    let orders = sqlx::query_scalar::<_, f64>(
        "SELECT sort_order FROM task_section WHERE is_active = 1 AND project_id = ?1",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn create(pool: &SqlitePool, data: TaskSectionCreate) -> RepoResult<TaskSection> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Section name must not be empty".into()));
    }

    // 分组必须挂在存在的项目下
    let project_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM project WHERE id = ?1 AND is_active = 1")
            .bind(data.project_id)
            .fetch_one(pool)
            .await?;
    if project_exists == 0 {
        return Err(RepoError::NotFound(format!(
            "Project {} not found",
            data.project_id
        )));
    }

    let sort_order = match data.sort_order {
        Some(v) => v,
        None => ordering::order_for_append(&scope_orders(pool, data.project_id).await?),
    };
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO task_section (id, name, project_id, sort_order, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.project_id)
    .bind(sort_order)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create section".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: TaskSectionUpdate) -> RepoResult<TaskSection> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE task_section SET name = COALESCE(?1, name), sort_order = COALESCE(?2, sort_order), is_active = COALESCE(?3, is_active), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.name)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Section {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Section {id} not found")))
}

/// Soft delete; tasks in the section fall back to the project's default bucket
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE task_section SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() > 0 {
        sqlx::query("UPDATE task SET section_id = NULL, updated_at = ?1 WHERE section_id = ?2")
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
        return Ok(true);
    }
    Ok(false)
}

/// Apply a batch of (id, sort_order) assignments
pub async fn update_sort_orders(pool: &SqlitePool, assignments: &[(i64, f64)]) -> RepoResult<usize> {
    let now = shared::util::now_millis();
    let mut updated = 0;
    for (id, sort_order) in assignments {
        let result = sqlx::query(
            "UPDATE task_section SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1",
        )
        .bind(sort_order)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => updated += 1,
            Ok(_) => tracing::warn!(id = %id, "Section missing during batch sort order update"),
            Err(e) => tracing::error!(id = %id, error = %e, "Failed to update section sort order"),
        }
    }
    Ok(updated)
}
