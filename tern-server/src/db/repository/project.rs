//! Project Repository

use super::{RepoError, RepoResult};
use shared::models::{Project, ProjectCreate, ProjectUpdate};
use shared::ordering;
use sqlx::SqlitePool;

const PROJECT_SELECT: &str = "SELECT id, name, notes, area_id, sort_order, is_completed, completed_at, is_active, created_at, updated_at FROM project";

/// Find all active projects ordered by sort_order
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Project>> {
    let sql = format!("{PROJECT_SELECT} WHERE is_active = 1 ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, Project>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Find active projects within one area (`None` = unfiled projects)
pub async fn find_by_area(pool: &SqlitePool, area_id: Option<i64>) -> RepoResult<Vec<Project>> {
    let sql = format!("{PROJECT_SELECT} WHERE is_active = 1 AND area_id IS ?1 ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, Project>(&sql)
        .bind(area_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Project>> {
    let sql = format!("{PROJECT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Project>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Current sort_order values of the active projects in one area scope
async fn scope_orders(pool: &SqlitePool, area_id: Option<i64>) -> RepoResult<Vec<f64>> {
    let orders = sqlx::query_scalar::<_, f64>(
        "SELECT sort_order FROM project WHERE is_active = 1 AND area_id IS ?1",
    )
    .bind(area_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn create(pool: &SqlitePool, data: ProjectCreate) -> RepoResult<Project> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Project name must not be empty".into()));
    }

    let sort_order = match data.sort_order {
        Some(v) => v,
        None => ordering::order_for_append(&scope_orders(pool, data.area_id).await?),
    };
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO project (id, name, notes, area_id, sort_order, is_completed, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.notes)
    .bind(data.area_id)
    .bind(sort_order)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create project".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProjectUpdate) -> RepoResult<Project> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Project {id} not found")))?;

    // 完成状态翻转时维护 completed_at
    let completed_at = match data.is_completed {
        Some(true) if !existing.is_completed => Some(shared::util::now_millis()),
        Some(false) => None,
        _ => existing.completed_at,
    };

    // area_id 是跨 scope 移动：显式提交才改变，与其余 COALESCE 字段不同
    let area_id = match data.area_id {
        Some(v) => Some(v),
        None => existing.area_id,
    };

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE project SET name = COALESCE(?1, name), notes = COALESCE(?2, notes), area_id = ?3, sort_order = COALESCE(?4, sort_order), is_completed = COALESCE(?5, is_completed), completed_at = ?6, is_active = COALESCE(?7, is_active), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.name)
    .bind(data.notes)
    .bind(area_id)
    .bind(data.sort_order)
    .bind(data.is_completed)
    .bind(completed_at)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Project {id} not found")))
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE project SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
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
            "UPDATE project SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1",
        )
        .bind(sort_order)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => updated += 1,
            Ok(_) => tracing::warn!(id = %id, "Project missing during batch sort order update"),
            Err(e) => tracing::error!(id = %id, error = %e, "Failed to update project sort order"),
        }
    }
    Ok(updated)
}
