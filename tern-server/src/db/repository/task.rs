//! Task Repository
//!
//! 任务的排序 scope 是 `(project_id, section_id)` 分桶；跨桶移动与
//! 排序值更新在 [`move_task`] 中作为同一次写入完成。

use super::{RepoError, RepoResult};
use shared::client::MoveTaskRequest;
use shared::models::{Task, TaskCreate, TaskUpdate};
use shared::ordering;
use sqlx::SqlitePool;

const TASK_SELECT: &str = "SELECT id, title, notes, project_id, section_id, sort_order, start_date, deadline, is_completed, completed_at, is_active, created_at, updated_at FROM task";

/// Find all active tasks ordered by sort_order
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Task>> {
    let sql = format!("{TASK_SELECT} WHERE is_active = 1 ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, Task>(&sql).fetch_all(pool).await?;
    with_tags(pool, rows).await
}

/// Find active tasks in one `(project, section)` bucket
pub async fn find_scope(
    pool: &SqlitePool,
    project_id: Option<i64>,
    section_id: Option<i64>,
) -> RepoResult<Vec<Task>> {
    let sql = format!(
        "{TASK_SELECT} WHERE is_active = 1 AND project_id IS ?1 AND section_id IS ?2 ORDER BY sort_order, id"
    );
    let rows = sqlx::query_as::<_, Task>(&sql)
        .bind(project_id)
        .bind(section_id)
        .fetch_all(pool)
        .await?;
    with_tags(pool, rows).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Task>> {
    let sql = format!("{TASK_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Task>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(mut task) => {
            task.tag_ids = tag_ids_for(pool, task.id).await?;
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

/// Current sort_order values of one `(project, section)` bucket
async fn scope_orders(
    pool: &SqlitePool,
    project_id: Option<i64>,
    section_id: Option<i64>,
) -> RepoResult<Vec<f64>> {
    let orders = sqlx::query_scalar::<_, f64>(
        "SELECT sort_order FROM task WHERE is_active = 1 AND project_id IS ?1 AND section_id IS ?2",
    )
    .bind(project_id)
    .bind(section_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn create(pool: &SqlitePool, data: TaskCreate) -> RepoResult<Task> {
    if data.title.trim().is_empty() {
        return Err(RepoError::Validation("Task title must not be empty".into()));
    }
    if data.section_id.is_some() && data.project_id.is_none() {
        return Err(RepoError::Validation(
            "A task in a section must belong to that section's project".into(),
        ));
    }

    let sort_order = match data.sort_order {
        Some(v) => v,
        None => ordering::order_for_append(
            &scope_orders(pool, data.project_id, data.section_id).await?,
        ),
    };
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO task (id, title, notes, project_id, section_id, sort_order, start_date, deadline, is_completed, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 1, ?9, ?9)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(&data.notes)
    .bind(data.project_id)
    .bind(data.section_id)
    .bind(sort_order)
    .bind(&data.start_date)
    .bind(&data.deadline)
    .bind(now)
    .execute(pool)
    .await?;

    if !data.tag_ids.is_empty() {
        set_tags(pool, id, &data.tag_ids).await?;
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create task".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: TaskUpdate) -> RepoResult<Task> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Task {id} not found")))?;

    // 完成状态翻转时维护 completed_at
    let completed_at = match data.is_completed {
        Some(true) if !existing.is_completed => Some(shared::util::now_millis()),
        Some(false) => None,
        _ => existing.completed_at,
    };

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE task SET title = COALESCE(?1, title), notes = COALESCE(?2, notes), sort_order = COALESCE(?3, sort_order), start_date = COALESCE(?4, start_date), deadline = COALESCE(?5, deadline), is_completed = COALESCE(?6, is_completed), completed_at = ?7, is_active = COALESCE(?8, is_active), updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.title)
    .bind(data.notes)
    .bind(data.sort_order)
    .bind(data.start_date)
    .bind(data.deadline)
    .bind(data.is_completed)
    .bind(completed_at)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if let Some(tag_ids) = data.tag_ids {
        set_tags(pool, id, &tag_ids).await?;
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Task {id} not found")))
}

/// Cross-scope move: project/section 与 sort_order 同一条 UPDATE 落库。
/// 未提供 sort_order 时追加到目标分桶末尾。
pub async fn move_task(pool: &SqlitePool, id: i64, req: MoveTaskRequest) -> RepoResult<Task> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Task {id} not found")))?;

    if req.section_id.is_some() && req.project_id.is_none() {
        return Err(RepoError::Validation(
            "A task in a section must belong to that section's project".into(),
        ));
    }

    let sort_order = match req.sort_order {
        Some(v) => v,
        None => {
            let mut orders = scope_orders(pool, req.project_id, req.section_id).await?;
            // 同桶内移动时排除自身，避免基于自身排序值追加
            if existing.project_id == req.project_id && existing.section_id == req.section_id {
                orders.retain(|&o| o != existing.sort_order);
            }
            ordering::order_for_append(&orders)
        }
    };

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE task SET project_id = ?1, section_id = ?2, sort_order = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(req.project_id)
    .bind(req.section_id)
    .bind(sort_order)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Task {id} not found")))
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE task SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
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
            "UPDATE task SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1",
        )
        .bind(sort_order)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => updated += 1,
            Ok(_) => tracing::warn!(id = %id, "Task missing during batch sort order update"),
            Err(e) => tracing::error!(id = %id, error = %e, "Failed to update task sort order"),
        }
    }
    Ok(updated)
}

// =============================================================================
// Views
// =============================================================================

/// Today view: 已排期且开始日期不晚于今天的未完成任务
pub async fn find_today(pool: &SqlitePool, today: &str) -> RepoResult<Vec<Task>> {
    let sql = format!(
        "{TASK_SELECT} WHERE is_active = 1 AND is_completed = 0 AND start_date IS NOT NULL AND start_date <= ?1 ORDER BY sort_order, id"
    );
    let rows = sqlx::query_as::<_, Task>(&sql)
        .bind(today)
        .fetch_all(pool)
        .await?;
    with_tags(pool, rows).await
}

/// Upcoming view: 开始日期在今天之后的未完成任务，按日期分组展示
pub async fn find_upcoming(pool: &SqlitePool, today: &str) -> RepoResult<Vec<Task>> {
    let sql = format!(
        "{TASK_SELECT} WHERE is_active = 1 AND is_completed = 0 AND start_date IS NOT NULL AND start_date > ?1 ORDER BY start_date, sort_order, id"
    );
    let rows = sqlx::query_as::<_, Task>(&sql)
        .bind(today)
        .fetch_all(pool)
        .await?;
    with_tags(pool, rows).await
}

/// Logbook view: 已完成任务，最近完成的在前
pub async fn find_logbook(pool: &SqlitePool, limit: u32, offset: u32) -> RepoResult<Vec<Task>> {
    let sql = format!(
        "{TASK_SELECT} WHERE is_active = 1 AND is_completed = 1 ORDER BY completed_at DESC, id LIMIT ?1 OFFSET ?2"
    );
    let rows = sqlx::query_as::<_, Task>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    with_tags(pool, rows).await
}

// =============================================================================
// Tags (junction table)
// =============================================================================

pub async fn tag_ids_for(pool: &SqlitePool, task_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT tag_id FROM task_tag WHERE task_id = ?1 ORDER BY tag_id",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Replace a task's tag set
pub async fn set_tags(pool: &SqlitePool, task_id: i64, tag_ids: &[i64]) -> RepoResult<()> {
    sqlx::query("DELETE FROM task_tag WHERE task_id = ?1")
        .bind(task_id)
        .execute(pool)
        .await?;
    for tag_id in tag_ids {
        sqlx::query("INSERT OR IGNORE INTO task_tag (task_id, tag_id) VALUES (?1, ?2)")
            .bind(task_id)
            .bind(tag_id)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Populate tag_ids on a batch of rows
async fn with_tags(pool: &SqlitePool, mut tasks: Vec<Task>) -> RepoResult<Vec<Task>> {
    for task in &mut tasks {
        task.tag_ids = tag_ids_for(pool, task.id).await?;
    }
    Ok(tasks)
}
