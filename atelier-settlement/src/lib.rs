//! Atelier Settlement - 出品者 月次売上精算
//!
//! # 架构概述
//!
//! - **结算引擎** (`settlement`): 売上集計 → 手数料 → 源泉徴収 → 支払台帳
//! - **数据库** (`db`): SQLite (sqlx)，启动时迁移并校验 schema
//! - **外部网关** (`gateways`): 通知邮件 / 文档归档，尽力而为
//! - **HTTP API** (`api`): 运营控制台接口
//!
//! # 模块结构
//!
//! ```text
//! atelier-settlement/src/
//! ├── core/          # 配置、共享状态
//! ├── db/            # 连接池、迁移、repository
//! ├── settlement/    # 计算、台帳、通知、导出
//! ├── gateways/      # NotificationGateway / ArchivalGateway
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、时区
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod gateways;
pub mod settlement;
pub mod utils;

// Re-export 公共类型
pub use core::{AppState, Config};
pub use db::DbService;
pub use settlement::{SettlementError, SettlementLedger, SettlementService};
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

pub use utils::logger::init_logger_with_file;
