use chrono::NaiveDate;
use tracing::warn;

use crate::html::{Tag, Token, TokenStream};
use crate::types::{Campus, Reservation};

/// `id` of the container holding one `<dl>` per reservation
pub const RESERVATION_LIST_ID: &str = "reservation-list";

/// Printed date format, e.g. `2025年05月05日（月）`
const PRINTED_DATE_LAYOUT: &str = "%Y年%m月%d日";

/// What the text following a `<dt>`/`<dd>` describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Campus,
    Date,
    Time,
    Room,
    Cancel,
    Other,
}

impl Field {
    /// Classify a definition term/description by its `class` or `style`.
    /// Unmarked cells and the fixed-width first column hold the campus; the
    /// site reuses the room class on the `<dt>` for that column as well.
    fn classify(tag: &Tag) -> Self {
        let fixed_width = tag.attr("style").is_some_and(|style| {
            style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .contains("width:160px")
        });
        if fixed_width {
            return Field::Campus;
        }

        match tag.attr("class") {
            None => Field::Campus,
            Some("res-room") if tag.is("dt") => Field::Campus,
            Some("res-date") => Field::Date,
            Some("res-time") => Field::Time,
            Some("res-room") => Field::Room,
            Some("res-cancell") => Field::Cancel,
            Some(_) => Field::Other,
        }
    }
}

/// Extract the user's reservations from the reservation index page.
///
/// Blocks that yielded neither campus text nor an identifier are skipped.
/// Unparsable dates leave `date` empty; unparsable time ranges leave the
/// times at zero.
pub fn scan_reservations(body: &str) -> Vec<Reservation> {
    let mut tokens = TokenStream::new(body);
    let mut reservations = Vec::new();
    // Open <div> elements since entering the list; 0 means outside
    let mut list_depth = 0usize;
    let mut current: Option<Reservation> = None;
    let mut field = Field::Other;

    while let Some(token) = tokens.next_token() {
        match token {
            Token::Start(tag) => match tag.name.as_str() {
                "div" => {
                    if list_depth > 0 {
                        list_depth += 1;
                    } else if tag.attr("id") == Some(RESERVATION_LIST_ID) {
                        list_depth = 1;
                    }
                }
                "dl" if list_depth > 0 => current = Some(Reservation::default()),
                "dt" | "dd" => field = Field::classify(&tag),
                "a" if field == Field::Cancel => {
                    let (Some(reservation), Some(href)) = (current.as_mut(), tag.attr("href")) else {
                        continue;
                    };
                    if let Some(id) = query_param(href, "id") {
                        reservation.id = id;
                    }
                }
                _ => {}
            },
            Token::Text(text) => {
                if let Some(reservation) = current.as_mut() {
                    apply_text(reservation, field, &text);
                }
            }
            Token::End(name) => match name.as_str() {
                "div" if list_depth > 0 => {
                    list_depth -= 1;
                    if list_depth == 0 {
                        current = None;
                    }
                }
                "dl" => {
                    if let Some(reservation) = current.take() {
                        if !reservation.campus_name.is_empty() || !reservation.id.is_empty() {
                            reservations.push(reservation);
                        }
                    }
                }
                _ => {}
            },
        }
    }

    reservations
}

fn apply_text(reservation: &mut Reservation, field: Field, text: &str) {
    match field {
        Field::Campus => {
            reservation.campus = Campus::from_localized_name(text);
            reservation.campus_name = text.to_string();
        }
        Field::Date => {
            reservation.date = parse_printed_date(text);
            if reservation.date.is_none() {
                warn!("Unparsable reservation date '{}'", text);
            }
        }
        Field::Time => match parse_time_range(text) {
            Some((from_hour, from_minute, to_hour, to_minute)) => {
                reservation.from_hour = from_hour;
                reservation.from_minute = from_minute;
                reservation.to_hour = to_hour;
                reservation.to_minute = to_minute;
            }
            None => warn!("Unparsable reservation time range '{}'", text),
        },
        Field::Room => reservation.room_name = text.to_string(),
        Field::Cancel | Field::Other => {}
    }
}

/// Parse `2025年05月05日（月）`; the weekday suffix is ignored
fn parse_printed_date(text: &str) -> Option<NaiveDate> {
    let date = text.split('（').next().unwrap_or_default().trim();
    NaiveDate::parse_from_str(date, PRINTED_DATE_LAYOUT).ok()
}

/// Parse `17:00-22:30` into `(from_hour, from_minute, to_hour, to_minute)`
fn parse_time_range(text: &str) -> Option<(u32, u32, u32, u32)> {
    let (from, to) = text.split_once('-')?;
    let (from_hour, from_minute) = parse_clock(from)?;
    let (to_hour, to_minute) = parse_clock(to)?;
    Some((from_hour, from_minute, to_hour, to_minute))
}

fn parse_clock(text: &str) -> Option<(u32, u32)> {
    let (hour, minute) = text.trim().split_once(':')?;
    Some((hour.trim().parse().ok()?, minute.trim().parse().ok()?))
}

/// Value of `key` in the query string of a link target
fn query_param(href: &str, key: &str) -> Option<String> {
    let query = href.split_once('?').map_or(href, |(_, q)| q);
    let query = query.split('#').next().unwrap_or_default();

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| {
            urlencoding::decode(v)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| v.to_string())
                .trim()
                .to_string()
        })
}
