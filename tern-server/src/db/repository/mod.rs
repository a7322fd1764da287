//! Repository Module
//!
//! Free-function CRUD repositories over the SQLite pool, one module per
//! table. All ordered reads sort by `(sort_order, id)`; every new
//! `sort_order` value comes from `shared::ordering`.

pub mod area;
pub mod checklist;
pub mod project;
pub mod section;
pub mod tag;
pub mod task;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全部使用应用侧生成的 snowflake i64
// =============================================================================
//
// - 生成: shared::util::snowflake_id()
// - SQLite 列类型: INTEGER PRIMARY KEY (非 AUTOINCREMENT)
// - 插入后通过 find_by_id 回读完整行，保证返回值与库内一致
