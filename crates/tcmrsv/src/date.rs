use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

use crate::types::RsvError;

/// Offset of the site's local time (Japan Standard Time, no DST)
const JST_OFFSET_SECS: i32 = 9 * 60 * 60;

/// Date format accepted from users
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Format of the `ymd` query parameter the site expects
const YMD_PARAM_LAYOUT: &str = "%Y/%m/%d %H:%M:%S";

/// The site's local timezone
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current wall-clock time in the site's timezone
pub fn jst_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&jst())
}

/// Calendar day of `now` in the site's timezone
pub fn today(now: DateTime<FixedOffset>) -> NaiveDate {
    now.with_timezone(&jst()).date_naive()
}

/// Site-local instant for a date and wall-clock time.
/// Returns `None` when the time of day does not exist.
pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<FixedOffset>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    jst().from_local_datetime(&naive).single()
}

/// Parse a user supplied `YYYY-MM-DD` date
pub fn parse_date(text: &str) -> Result<NaiveDate, RsvError> {
    NaiveDate::parse_from_str(text.trim(), DATE_LAYOUT)
        .map_err(|_| RsvError::InvalidDateFormat(text.to_string()))
}

/// Render a date as the site's `ymd` query value (midnight of that day)
pub fn ymd_param(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.format(YMD_PARAM_LAYOUT).to_string())
        .unwrap_or_default()
}

/// Shift a date by a number of days, saturating at the calendar bounds
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}
