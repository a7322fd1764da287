//! Data models
//!
//! Shared between tern-server and tern-client (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY, snowflake-generated).
//! All `sort_order` values are positive `f64`, assigned exclusively by
//! [`crate::ordering`].

pub mod area;
pub mod checklist;
pub mod project;
pub mod section;
pub mod tag;
pub mod task;

// Re-exports
pub use area::*;
pub use checklist::*;
pub use project::*;
pub use section::*;
pub use tag::*;
pub use task::*;
