//! 時間工具 — 业务时区 (Asia/Tokyo) 转换
//!
//! 所有时间戳统一为 Unix millis (i64)，日期键统一为 `YYYY-MM-DD`。
//! repository 层只接收 millis 或日期键，时区转换集中在这里。

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// 业务时区 — 住宿设施所在时区
pub const BUSINESS_TZ: Tz = chrono_tz::Asia::Tokyo;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Today's calendar date in the business timezone
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&BUSINESS_TZ).date_naive()
}

/// Canonical day key (`YYYY-MM-DD`) used for planned-event dates and
/// forecast/history table keys
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Slash-form date (`YYYY/MM/DD`) — webhook / sheet convention
pub fn date_slash(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Current `HH:MM` clock time in the business timezone
pub fn now_hhmm() -> String {
    Utc::now()
        .with_timezone(&BUSINESS_TZ)
        .format("%H:%M")
        .to_string()
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在，fallback 到 UTC。
pub fn day_start_millis(date: NaiveDate) -> i64 {
    let naive = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    naive
        .and_local_timezone(BUSINESS_TZ)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Unix millis → 业务时区日历日期
///
/// Out-of-range millis fall back to today; event timestamps are always
/// server-assigned.
pub fn millis_to_date(millis: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&BUSINESS_TZ).date_naive())
        .unwrap_or_else(today)
}

/// Normalize a sheet date string: trim and unify `/` separators to `-`.
///
/// The *unpadded* normalized string is what composite booking ids are built
/// from, so this must not canonicalize further.
pub fn normalize_date_string(raw: &str) -> String {
    raw.trim().replace('/', "-")
}

/// Flexible date parser for imported rows.
///
/// Accepts `YYYY-MM-DD` and `YYYY/MM/DD`, with or without zero padding on
/// month and day. Returns `None` for anything else; callers skip such rows.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let normalized = normalize_date_string(raw);
    let mut parts = normalized.split('-');
    let (y, m, d) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_flexible_date("2026-08-15"),
            NaiveDate::from_ymd_opt(2026, 8, 15)
        );
    }

    #[test]
    fn test_parse_slash_separators() {
        assert_eq!(
            parse_flexible_date("2026/08/15"),
            NaiveDate::from_ymd_opt(2026, 8, 15)
        );
    }

    #[test]
    fn test_parse_unpadded_month_day() {
        assert_eq!(
            parse_flexible_date("2026-8-5"),
            NaiveDate::from_ymd_opt(2026, 8, 5)
        );
        assert_eq!(
            parse_flexible_date("2026/8/5"),
            NaiveDate::from_ymd_opt(2026, 8, 5)
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            parse_flexible_date(" 2026-08-15 "),
            NaiveDate::from_ymd_opt(2026, 8, 15)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("8/15"), None);
        assert_eq!(parse_flexible_date("2026-13-01"), None);
        assert_eq!(parse_flexible_date("2026-02-30"), None);
        assert_eq!(parse_flexible_date("2026-08-15-extra"), None);
        assert_eq!(parse_flexible_date("checkin tomorrow"), None);
    }

    #[test]
    fn test_normalize_keeps_unpadded_form() {
        // Composite booking ids depend on the unpadded normalized string
        assert_eq!(normalize_date_string("2026/8/5"), "2026-8-5");
    }

    #[test]
    fn test_date_key_roundtrip() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(date_key(d), "2026-08-05");
        assert_eq!(date_slash(d), "2026/08/05");
    }

    #[test]
    fn test_day_start_millis_maps_back_to_same_date() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        assert_eq!(millis_to_date(day_start_millis(d)), d);
    }
}
