use std::time::Duration;

use chrono_tz::Tz;
use shared::error::{AppError, AppResult};

/// 结算服务配置 - 启动时解析一次，之后只读
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_URL | atelier.db | SQLite 数据库路径 |
/// | HTTP_PORT | 3100 | 运营 API 端口 |
/// | TIMEZONE | Asia/Tokyo | 运营时区 (IANA) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (不设置则输出到 stdout) |
/// | MAIL_FROM | noreply@atelier.example | 支払通知 发件地址 |
/// | SES_REGION | - | SES 区域 (不设置则用默认区域) |
/// | ARCHIVE_URL | - | 文档归档服务地址 (不设置则关闭归档) |
/// | ARCHIVE_TOKEN | - | 归档服务 Bearer token |
/// | GATEWAY_TIMEOUT_MS | 10000 | 外部网关超时(毫秒) |
/// | TRANSFER_MEMO_PREFIX | (空) | 振込ファイル 备注前缀 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_URL=/data/atelier.db TIMEZONE=Asia/Tokyo cargo run -p atelier-settlement
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库路径
    pub database_url: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运营时区，决定结算月份的起止时刻
    pub timezone: Tz,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 通知邮件发件地址
    pub mail_from: String,
    pub ses_region: Option<String>,
    /// 归档服务地址
    pub archive_url: Option<String>,
    pub archive_token: Option<String>,
    /// 外部网关 (通知/归档) 超时
    pub gateway_timeout: Duration,
    /// 振込ファイル 备注前缀 (例: "ATELIER")
    pub transfer_memo_prefix: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 时区、端口或网关超时无法解析时直接失败，不静默回落到默认值
    pub fn from_env() -> AppResult<Self> {
        let timezone_name = std::env::var("TIMEZONE").unwrap_or_else(|_| "Asia/Tokyo".into());
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| AppError::config(format!("Invalid TIMEZONE: {timezone_name}")))?;

        let http_port = match std::env::var("HTTP_PORT") {
            Ok(v) => v
                .parse()
                .map_err(|_| AppError::config(format!("Invalid HTTP_PORT: {v}")))?,
            Err(_) => 3100,
        };

        let gateway_timeout_ms = match std::env::var("GATEWAY_TIMEOUT_MS") {
            Ok(v) => parse_timeout_ms(&v)?,
            Err(_) => 10_000,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "atelier.db".into()),
            http_port,
            timezone,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: non_empty_var("LOG_DIR"),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@atelier.example".into()),
            ses_region: non_empty_var("SES_REGION"),
            archive_url: non_empty_var("ARCHIVE_URL"),
            archive_token: non_empty_var("ARCHIVE_TOKEN"),
            gateway_timeout: Duration::from_millis(gateway_timeout_ms),
            transfer_memo_prefix: std::env::var("TRANSFER_MEMO_PREFIX").unwrap_or_default(),
        })
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// 超时必须是正整数毫秒
fn parse_timeout_ms(raw: &str) -> AppResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(AppError::config(format!("Invalid GATEWAY_TIMEOUT_MS: {raw}"))),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Default for Config {
    /// 与环境变量全部未设置时相同
    fn default() -> Self {
        Self {
            database_url: "atelier.db".into(),
            http_port: 3100,
            timezone: chrono_tz::Asia::Tokyo,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
            mail_from: "noreply@atelier.example".into(),
            ses_region: None,
            archive_url: None,
            archive_token: None,
            gateway_timeout: Duration::from_millis(10_000),
            transfer_memo_prefix: String::new(),
        }
    }
}
