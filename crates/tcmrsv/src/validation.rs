//! Network-free predicates over operation parameters.
//!
//! Every check here runs before a request is built, so a failing predicate
//! means no traffic reaches the portal.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use regex::Regex;

use crate::date::{add_days, at, jst, today};
use crate::types::Campus;

lazy_static::lazy_static! {
    static ref ID_REGEX: Regex = Regex::new(
        r"^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$"
    ).unwrap();
}

/// First hour a slot may start
pub const FIRST_HOUR: u32 = 7;
/// Last hour a slot may start
pub const LAST_START_HOUR: u32 = 22;
/// Closing hour; bookings may end at `CLOSING_HOUR:00` at the latest
pub const CLOSING_HOUR: u32 = 23;
/// Hour at which the third day out opens for booking
pub const BOOKING_OPENS_HOUR: u32 = 12;

/// Whether the campus can be sent to the site
pub fn is_campus_valid(campus: Campus) -> bool {
    campus.is_valid()
}

/// Whether an identifier has the canonical lowercase 8-4-4-4-12 hex shape
pub fn is_id_valid(id: &str) -> bool {
    ID_REGEX.is_match(id)
}

/// Last day (exclusive) of the booking window as seen at `now`
pub fn booking_cutoff(now: DateTime<FixedOffset>) -> NaiveDate {
    let hour = now.with_timezone(&jst()).hour();
    let days = if hour < BOOKING_OPENS_HOUR { 2 } else { 3 };
    add_days(today(now), days)
}

/// Whether `date` lies strictly between today and the booking cutoff
pub fn is_date_within_booking_window(now: DateTime<FixedOffset>, date: NaiveDate) -> bool {
    date > today(now) && date < booking_cutoff(now)
}

/// Whether a requested span obeys the slot grid and opening hours
pub fn is_time_range_valid(from_hour: u32, from_minute: u32, to_hour: u32, to_minute: u32) -> bool {
    if !(FIRST_HOUR..=LAST_START_HOUR).contains(&from_hour) {
        return false;
    }
    if to_hour < from_hour || to_hour > CLOSING_HOUR {
        return false;
    }
    if !is_half_hour(from_minute) || !is_half_hour(to_minute) {
        return false;
    }
    if to_hour == CLOSING_HOUR && to_minute != 0 {
        return false;
    }

    to_hour * 60 + to_minute > from_hour * 60 + from_minute
}

fn is_half_hour(minute: u32) -> bool {
    minute == 0 || minute == 30
}

/// Whether the slot starting at `hour:minute` on `date` has not begun yet
pub fn is_time_in_future(
    now: DateTime<FixedOffset>,
    date: NaiveDate,
    hour: u32,
    minute: u32,
) -> bool {
    match at(date, hour, minute) {
        Some(start) => start >= now,
        None => false,
    }
}

/// Whether a cancellation comment carries any text
pub fn is_comment_valid(comment: &str) -> bool {
    !comment.trim().is_empty()
}
