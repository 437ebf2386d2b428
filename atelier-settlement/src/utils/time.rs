//! 时间工具函数 (业务时区)
//!
//! 结算月份的起止时刻由 [`SettlementPeriod::bounds_millis`] 计算；
//! 这里只负责 "今天" 和 API 路径参数的解析。
//!
//! [`SettlementPeriod::bounds_millis`]: shared::models::SettlementPeriod::bounds_millis

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::error::AppResult;
use shared::models::SettlementPeriod;

/// 业务时区的今天
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 路径参数 (year, month) → 结算月份
pub fn parse_period(year: i32, month: u32) -> AppResult<SettlementPeriod> {
    SettlementPeriod::new(year, month)
}

/// 运营控制台默认的结算月份 (上个月)
pub fn default_period(tz: Tz) -> SettlementPeriod {
    SettlementPeriod::previous_of(today(tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use shared::error::ErrorCode;

    #[test]
    fn test_today_follows_timezone() {
        let tokyo = today(chrono_tz::Asia::Tokyo);
        let honolulu = today(chrono_tz::Pacific::Honolulu);
        // Tokyo is 19 hours ahead, never behind
        assert!(tokyo >= honolulu);
        assert!((tokyo - honolulu).num_days() <= 1);
    }

    #[test]
    fn test_parse_period_rejects_bad_month() {
        assert!(parse_period(2024, 5).is_ok());
        let err = parse_period(2024, 13).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSettlementPeriod);
    }

    #[test]
    fn test_default_period_is_previous_month() {
        let tz = chrono_tz::Asia::Tokyo;
        let now = today(tz);
        let period = default_period(tz);
        assert_eq!(period.next(), SettlementPeriod::containing(now));
        assert!(period.month() >= 1 && period.month() <= 12);
        assert!(period.year() <= now.year());
    }
}
