//! Tern Server - 个人任务管理服务端
//!
//! # 架构概述
//!
//! 提供任务管理的 RESTful API：区域 → 项目 → 任务/子任务，
//! 以及分组、标签和 today/upcoming/logbook 视图。
//! 所有列表均按 `sort_order` 排序，排序值统一由 `shared::ordering` 计算。
//!
//! # 模块结构
//!
//! ```text
//! tern-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接池、迁移、仓库层
//! └── utils/         # 错误类型、日志
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
  ______
 /_  __/__  _________
  / / / _ \/ ___/ __ \
 / / /  __/ /  / / / /
/_/  \___/_/  /_/ /_/
    "#
    );
}

/// 设置运行环境：加载 .env 并初始化日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}
