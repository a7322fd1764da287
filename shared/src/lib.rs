//! Shared types for the Tern task manager
//!
//! Common types used by both tern-server and tern-client: data models,
//! API DTOs, the order assignment service and utility functions.

pub mod client;
pub mod models;
pub mod ordering;
pub mod request;
pub mod response;
pub mod scope;
pub mod util;

// Re-exports
pub use response::ApiResponse;
pub use scope::{ItemKey, ItemKind, Scope};
pub use serde::{Deserialize, Serialize};
