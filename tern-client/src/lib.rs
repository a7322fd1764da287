//! Tern Client - HTTP client and reorder coordination for the Tern server
//!
//! 两部分组成：
//!
//! - [`HttpClient`]: 面向 Tern Server REST API 的网络客户端
//! - [`ReorderController`]: 拖拽重排协调器。本地乐观更新 + 服务端确认，
//!   失败时回滚或重试，绝不让本地与服务端的排序静默分叉。

pub mod config;
pub mod error;
pub mod http;
pub mod persistence;
pub mod reorder;
pub mod store;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use persistence::OrderPersistence;
pub use reorder::{
    DragGesture, GesturePhase, RecoveryPolicy, ReorderAllOutcome, ReorderController, ReorderError,
    ReorderOutcome,
};
pub use store::{ItemStore, ScopedItem};

#[cfg(feature = "in-process")]
pub use persistence::InProcessPersistence;

// Re-export shared types for convenience
pub use shared::{ItemKey, ItemKind, Scope};
