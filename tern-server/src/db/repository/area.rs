//! Area Repository

use super::{RepoError, RepoResult};
use shared::models::{Area, AreaCreate, AreaUpdate};
use shared::ordering;
use sqlx::SqlitePool;

const AREA_SELECT: &str =
    "SELECT id, name, sort_order, is_active, created_at, updated_at FROM area";

/// Find all active areas ordered by sort_order
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Area>> {
    let sql = format!("{AREA_SELECT} WHERE is_active = 1 ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, Area>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Area>> {
    let sql = format!("{AREA_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Area>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Current sort_order values of the active areas (the append scope)
async fn scope_orders(pool: &SqlitePool) -> RepoResult<Vec<f64>> {
    let orders = sqlx::query_scalar::<_, f64>("SELECT sort_order FROM area WHERE is_active = 1")
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

pub async fn create(pool: &SqlitePool, data: AreaCreate) -> RepoResult<Area> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Area name must not be empty".into()));
    }

    let sort_order = match data.sort_order {
        Some(v) => v,
        None => ordering::order_for_append(&scope_orders(pool).await?),
    };
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO area (id, name, sort_order, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, 1, ?4, ?4)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(sort_order)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create area".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: AreaUpdate) -> RepoResult<Area> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE area SET name = COALESCE(?1, name), sort_order = COALESCE(?2, sort_order), is_active = COALESCE(?3, is_active), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.name)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Area {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Area {id} not found")))
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE area SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Apply a batch of (id, sort_order) assignments, returning how many rows
/// actually changed. Per-item failures are logged and skipped.
pub async fn update_sort_orders(pool: &SqlitePool, assignments: &[(i64, f64)]) -> RepoResult<usize> {
    let now = shared::util::now_millis();
    let mut updated = 0;
    for (id, sort_order) in assignments {
        let result = sqlx::query(
            "UPDATE area SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1",
        )
        .bind(sort_order)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => updated += 1,
            Ok(_) => tracing::warn!(id = %id, "Area missing during batch sort order update"),
            Err(e) => tracing::error!(id = %id, error = %e, "Failed to update area sort order"),
        }
    }
    Ok(updated)
}
