//! Tag Repository

use super::{RepoError, RepoResult};
use shared::models::{Tag, TagCreate, TagUpdate};
use shared::ordering;
use sqlx::SqlitePool;

const TAG_SELECT: &str =
    "SELECT id, name, color, sort_order, is_active, created_at, updated_at FROM tag";

const DEFAULT_COLOR: &str = "#8899aa";

/// Find all active tags ordered by sort_order
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Tag>> {
    let sql = format!("{TAG_SELECT} WHERE is_active = 1 ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, Tag>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Tag>> {
    let sql = format!("{TAG_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Tag>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Tag>> {
    let sql = format!("{TAG_SELECT} WHERE is_active = 1 AND name = ?1 LIMIT 1");
    let row = sqlx::query_as::<_, Tag>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn scope_orders(pool: &SqlitePool) -> RepoResult<Vec<f64>> {
    let orders = sqlx::query_scalar::<_, f64>("SELECT sort_order FROM tag WHERE is_active = 1")
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

pub async fn create(pool: &SqlitePool, data: TagCreate) -> RepoResult<Tag> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Tag name must not be empty".into()));
    }
    // Check duplicate name
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Tag '{}' already exists",
            data.name
        )));
    }

    let sort_order = match data.sort_order {
        Some(v) => v,
        None => ordering::order_for_append(&scope_orders(pool).await?),
    };
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO tag (id, name, color, sort_order, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.color.as_deref().unwrap_or(DEFAULT_COLOR))
    .bind(sort_order)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create tag".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: TagUpdate) -> RepoResult<Tag> {
    // Check duplicate name if changing
    if let Some(ref new_name) = data.name
        && let Some(other) = find_by_name(pool, new_name).await?
        && other.id != id
    {
        return Err(RepoError::Duplicate(format!(
            "Tag '{new_name}' already exists"
        )));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE tag SET name = COALESCE(?1, name), color = COALESCE(?2, color), sort_order = COALESCE(?3, sort_order), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.name)
    .bind(data.color)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Tag {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Tag {id} not found")))
}

/// Soft delete; also detaches the tag from all tasks
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE tag SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() > 0 {
        sqlx::query("DELETE FROM task_tag WHERE tag_id = ?1")
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
            "UPDATE tag SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1",
        )
        .bind(sort_order)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => updated += 1,
            Ok(_) => tracing::warn!(id = %id, "Tag missing during batch sort order update"),
            Err(e) => tracing::error!(id = %id, error = %e, "Failed to update tag sort order"),
        }
    }
    Ok(updated)
}
