//! 工具模块 - 日志初始化与业务时区工具

pub mod logger;
pub mod time;
