//! Settlement period (one calendar month)

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, AppResult, ErrorCode};

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 9999;

/// Withheld tax is due on this day of the month after the period
const REMITTANCE_DUE_DAY: u32 = 10;

/// Target month of a settlement run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "RawPeriod")]
pub struct SettlementPeriod {
    year: i32,
    month: u32,
}

/// Unchecked wire form; deserialization goes through [`SettlementPeriod::new`]
#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPeriod> for SettlementPeriod {
    type Error = AppError;

    fn try_from(raw: RawPeriod) -> AppResult<Self> {
        Self::new(raw.year, raw.month)
    }
}

impl SettlementPeriod {
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::with_message(
                ErrorCode::InvalidSettlementPeriod,
                format!("Month must be between 1 and 12, got {month}"),
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(AppError::with_message(
                ErrorCode::InvalidSettlementPeriod,
                format!("Year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"),
            ));
        }
        Ok(Self { year, month })
    }

    /// Period containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 默认结算对象：上个月
    pub fn previous_of(today: NaiveDate) -> Self {
        Self::containing(today).previous()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MIN)
    }

    /// Half-open `[start, end)` bounds in Unix millis, operator timezone
    ///
    /// `end` is the first instant of the next month; callers use `< end`.
    pub fn bounds_millis(&self, tz: Tz) -> (i64, i64) {
        (
            local_midnight_millis(self.first_day(), tz),
            local_midnight_millis(self.next().first_day(), tz),
        )
    }

    /// 源泉所得税 納付期限: 10th of the following month
    pub fn remittance_due_date(&self) -> NaiveDate {
        let next = self.next();
        NaiveDate::from_ymd_opt(next.year, next.month, REMITTANCE_DUE_DAY)
            .unwrap_or(NaiveDate::MIN)
    }

    /// `YYYYMM`, used in export filenames
    pub fn file_suffix(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// `YYYY-MM`, used as the archive folder key
    pub fn folder_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// `YYYY年M月`, used in notices and transfer memos
    pub fn label(&self) -> String {
        format!("{}年{}月", self.year, self.month)
    }
}

impl fmt::Display for SettlementPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// 日期零点 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在，fallback 到 UTC。
fn local_midnight_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i32, month: u32) -> SettlementPeriod {
        SettlementPeriod::new(year, month).unwrap()
    }

    #[test]
    fn test_rejects_invalid_month_and_year() {
        let err = SettlementPeriod::new(2024, 13).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSettlementPeriod);
        assert!(SettlementPeriod::new(2024, 0).is_err());
        assert!(SettlementPeriod::new(1999, 5).is_err());
    }

    #[test]
    fn test_deserialize_validates_range() {
        let p: SettlementPeriod = serde_json::from_str(r#"{"year":2024,"month":5}"#).unwrap();
        assert_eq!(p, period(2024, 5));

        let err = serde_json::from_str::<SettlementPeriod>(r#"{"year":2024,"month":13}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Month must be between 1 and 12"));
        assert!(serde_json::from_str::<SettlementPeriod>(r#"{"year":1999,"month":1}"#).is_err());
    }

    #[test]
    fn test_next_previous_wrap_year() {
        assert_eq!(period(2024, 12).next(), period(2025, 1));
        assert_eq!(period(2025, 1).previous(), period(2024, 12));
        assert_eq!(period(2024, 6).next(), period(2024, 7));
    }

    #[test]
    fn test_previous_of_today() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(SettlementPeriod::previous_of(today), period(2025, 12));
    }

    #[test]
    fn test_last_day_handles_leap_year() {
        assert_eq!(
            period(2024, 2).last_day(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            period(2023, 2).last_day(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_bounds_in_tokyo() {
        // 2024-05-01T00:00+09:00 = 2024-04-30T15:00Z
        let (start, end) = period(2024, 5).bounds_millis(chrono_tz::Asia::Tokyo);
        assert_eq!(start, 1_714_489_200_000);
        // 2024-06-01T00:00+09:00 = 2024-05-31T15:00Z
        assert_eq!(end, 1_717_167_600_000);
        assert_eq!(end - start, 31 * 24 * 3600 * 1000);
    }

    #[test]
    fn test_remittance_due_date() {
        assert_eq!(
            period(2024, 5).remittance_due_date(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
        assert_eq!(
            period(2024, 12).remittance_due_date(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
        );
    }

    #[test]
    fn test_formatting() {
        let p = period(2024, 5);
        assert_eq!(p.file_suffix(), "202405");
        assert_eq!(p.folder_key(), "2024-05");
        assert_eq!(p.label(), "2024年5月");
        assert_eq!(p.to_string(), "2024-05");
    }
}
