use crate::core::Record;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// 日期加時間的格式，依序嘗試
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// 只有日期的格式
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("empty date value")]
    Empty,
    #[error("unrecognised date value: {0}")]
    Unrecognised(String),
}

/// 寬鬆的日期解析：接受 `M/D/YYYY h:mm AM/PM` 與 ISO-8601
///
/// 帶時區的 RFC 3339 字串取其本身時區下的日期與時間。
pub fn parse_date(value: &str) -> Result<NaiveDateTime, DateParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    Err(DateParseError::Unrecognised(value.to_string()))
}

/// 判斷 `value` 是否落在以 `reference_date` 結尾、往前 `window_days` 天的區間內（含兩端）
///
/// 以日曆日相減計算下界，跨越日光節約時間也不會偏移一天。
/// 空值或無法解析的值一律視為不符合。
pub fn matches(value: &str, window_days: u32, reference_date: NaiveDate) -> bool {
    let parsed = match parse_date(value) {
        Ok(dt) => dt.date(),
        Err(e) => {
            tracing::trace!("📅 Skipping row: {}", e);
            return false;
        }
    };

    match reference_date.checked_sub_days(Days::new(u64::from(window_days))) {
        Some(lower_bound) => parsed >= lower_bound,
        // 下界早於可表示的最小日期，任何日期都在區間內
        None => true,
    }
}

/// 依欄位名稱套用近期區間的過濾器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRecencyFilter {
    pub field: String,
    pub window_days: u32,
}

impl DateRecencyFilter {
    pub fn new(field: impl Into<String>, window_days: u32) -> Self {
        Self {
            field: field.into(),
            window_days,
        }
    }

    pub fn with_window(&self, window_days: u32) -> Self {
        Self {
            field: self.field.clone(),
            window_days,
        }
    }

    pub fn matches_record(&self, record: &Record, reference_date: NaiveDate) -> bool {
        record
            .get(&self.field)
            .map(|value| matches(value, self.window_days, reference_date))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_and_garbage_never_match() {
        let today = date(2024, 3, 10);
        assert!(!matches("", 7, today));
        assert!(!matches("   ", 7, today));
        assert!(!matches("not-a-date", 7, today));
        assert!(!matches("13/45/2024 10:00 AM", 7, today));
    }

    #[test]
    fn test_us_format_with_meridiem() {
        let parsed = parse_date("7/14/2016 12:00 AM").unwrap();
        assert_eq!(parsed.date(), date(2016, 7, 14));
        assert_eq!(parsed.time(), NaiveTime::MIN);

        let parsed = parse_date(" 12/1/2023 3:45 pm ").unwrap();
        assert_eq!(parsed.date(), date(2023, 12, 1));
        assert_eq!(parsed.time(), NaiveTime::from_hms_opt(15, 45, 0).unwrap());
    }

    #[test]
    fn test_iso_formats() {
        assert_eq!(parse_date("2024-03-01").unwrap().date(), date(2024, 3, 1));
        assert_eq!(
            parse_date("2024-03-01T10:15:00").unwrap().date(),
            date(2024, 3, 1)
        );
        assert_eq!(
            parse_date("2024-03-01 10:15:00.250").unwrap().date(),
            date(2024, 3, 1)
        );
        assert_eq!(
            parse_date("2024-03-01T23:30:00-05:00").unwrap().date(),
            date(2024, 3, 1)
        );
        assert_eq!(
            parse_date("2024-03-01T10:15:00Z").unwrap().date(),
            date(2024, 3, 1)
        );
    }

    #[test]
    fn test_year_window_uses_calendar_subtraction() {
        // 2017-07-01 往前 365 天是 2016-07-01（中間沒有 2 月 29 日）
        let reference = date(2017, 7, 1);
        assert!(matches("7/14/2016 12:00 AM", 365, reference));
        assert!(matches("7/1/2016 11:59 PM", 365, reference));
        assert!(!matches("6/30/2016 11:59 PM", 365, reference));
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let today = date(2024, 3, 10);
        assert!(matches("2024-03-03", 7, today));
        assert!(!matches("2024-03-02", 7, today));
        assert!(matches("2024-03-10", 7, today));
        assert!(matches("3/10/2024 11:59 PM", 0, today));
        assert!(!matches("3/9/2024 11:59 PM", 0, today));
    }

    #[test]
    fn test_window_across_dst_and_leap_day() {
        // 2024-03-10 是美國日光節約時間開始日
        let today = date(2024, 3, 12);
        assert!(matches("3/5/2024 1:00 AM", 7, today));
        assert!(!matches("3/4/2024 11:00 PM", 7, today));

        let after_leap = date(2024, 3, 1);
        assert!(matches("2/29/2024 8:00 AM", 1, after_leap));
        assert!(!matches("2/28/2024 8:00 AM", 1, after_leap));
    }

    #[test]
    fn test_future_dates_match() {
        assert!(matches("2030-01-01", 7, date(2024, 3, 10)));
    }

    #[test]
    fn test_filter_reads_configured_field() {
        use crate::domain::model::Headers;
        use std::sync::Arc;

        let headers = Arc::new(Headers::new(vec![
            "id".to_string(),
            "data_wydania_decyzji".to_string(),
        ]));
        let record = Record::new(
            Arc::clone(&headers),
            csv::StringRecord::from(vec!["1", "2024-03-08"]),
        );
        let missing = Record::new(headers, csv::StringRecord::from(vec!["2"]));

        let filter = DateRecencyFilter::new("data_wydania_decyzji", 7);
        assert!(filter.matches_record(&record, date(2024, 3, 10)));
        assert!(!filter.matches_record(&missing, date(2024, 3, 10)));
        assert!(!filter.with_window(1).matches_record(&record, date(2024, 3, 10)));
    }
}
