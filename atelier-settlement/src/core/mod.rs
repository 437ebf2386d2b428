//! 核心模块 - 服务配置与共享状态
//!
//! - [`Config`] - 启动时从环境变量解析的配置
//! - [`AppState`] - handler 共享的状态 (数据库连接池 + 结算服务)

pub mod config;
pub mod state;

pub use config::Config;
pub use state::AppState;
