use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::debug;

use crate::date::{at, today};
use crate::html::{Token, TokenStream};
use crate::rooms::find_by_name;
use crate::types::{AvailableTime, Campus, RoomAvailability};

/// `id` prefix of the availability grid table
pub const GRID_TABLE_ID_PREFIX: &str = "aspTable";

/// Class prefix the site puts on bookable cells
pub const OPEN_CLASS_PREFIX: &str = "judgment4";

/// Full-width circle some grid versions print in bookable cells
pub const OPEN_GLYPH: char = '〇';

/// Hour of the first grid column
const BASE_HOUR: u32 = 7;

/// Length of one grid column in minutes
const SLOT_MINUTES: u32 = 30;

/// Start time of the slot in zero-based grid column `offset`
pub fn slot_time(offset: u32) -> AvailableTime {
    AvailableTime {
        hour: BASE_HOUR + (offset * SLOT_MINUTES) / 60,
        minute: (offset * SLOT_MINUTES) % 60,
    }
}

/// Openness signatures observed in one grid cell.
///
/// The grid markup has drifted between site versions: older pages put an
/// enabled `<input>` in bookable cells, newer ones print a circle glyph. The
/// class prefix has been present throughout. A cell is open when it carries
/// the class and either of the other two signatures, so a circle glyph or
/// enabled input in a cell without the class is read as closed. This is the
/// most fragile part of the scraper; new markup generations land here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotMarkers {
    /// Cell class starts with [`OPEN_CLASS_PREFIX`]
    pub open_class: bool,
    /// Cell contains an `<input>` without `disabled`
    pub enabled_input: bool,
    /// Cell text contains [`OPEN_GLYPH`]
    pub circle_glyph: bool,
}

impl SlotMarkers {
    /// Whether the signatures mark the slot as bookable
    pub fn is_open(&self) -> bool {
        self.open_class && (self.enabled_input || self.circle_glyph)
    }
}

#[derive(Default)]
struct RowState {
    column: u32,
    awaiting_name: bool,
    current: Option<RoomAvailability>,
}

/// Extract the free slots of every catalogued room from an availability page.
///
/// Rows whose room name is not in the catalog, and rows without a single open
/// slot, are dropped. When `date` is today (as seen at `now`), slots that have
/// already started are skipped.
pub fn scan_availability(
    body: &str,
    campus: Campus,
    date: NaiveDate,
    now: DateTime<FixedOffset>,
) -> Vec<RoomAvailability> {
    let mut tokens = TokenStream::new(body);
    let mut availabilities = Vec::new();
    let mut in_grid = false;
    let mut row: Option<RowState> = None;
    let is_today = date == today(now);

    while let Some(token) = tokens.next_token() {
        // The room name must be the token right after the span opens
        let awaiting_name = row
            .as_mut()
            .map(|r| std::mem::take(&mut r.awaiting_name))
            .unwrap_or(false);

        match token {
            Token::Start(tag) => match tag.name.as_str() {
                "table" => {
                    if tag
                        .attr("id")
                        .is_some_and(|id| id.starts_with(GRID_TABLE_ID_PREFIX))
                    {
                        in_grid = true;
                    }
                }
                "tr" if in_grid => row = Some(RowState::default()),
                "td" => {
                    let Some(r) = row.as_mut() else { continue };
                    r.column += 1;
                    if r.column < 2 {
                        continue;
                    }
                    let Some(current) = r.current.as_mut() else {
                        continue;
                    };

                    let mut markers = SlotMarkers {
                        open_class: tag
                            .attr("class")
                            .is_some_and(|c| c.starts_with(OPEN_CLASS_PREFIX)),
                        ..Default::default()
                    };
                    read_cell(&mut tokens, &mut markers);
                    if !markers.is_open() {
                        continue;
                    }

                    let slot = slot_time(r.column - 2);
                    if is_today && has_started(date, slot, now) {
                        continue;
                    }
                    current.available_times.push(slot);
                }
                "span" => {
                    if let Some(r) = row.as_mut() {
                        r.awaiting_name = r.column == 1;
                    }
                }
                _ => {}
            },
            Token::Text(text) => {
                if !awaiting_name {
                    continue;
                }
                let Some(r) = row.as_mut() else { continue };
                match find_by_name(&text, campus) {
                    Some(room) => {
                        r.current = Some(RoomAvailability {
                            room: room.clone(),
                            available_times: Vec::new(),
                        })
                    }
                    None => debug!("Room '{}' is not in the catalog, skipping row", text),
                }
            }
            Token::End(name) => match name.as_str() {
                "tr" => {
                    if let Some(current) = row.take().and_then(|r| r.current) {
                        if !current.available_times.is_empty() {
                            availabilities.push(current);
                        }
                    }
                }
                "table" => in_grid = false,
                _ => {}
            },
        }
    }

    availabilities
}

/// Consume tokens up to the `</td>` matching an already opened cell,
/// recording which openness signatures appear inside it.
fn read_cell(tokens: &mut TokenStream<'_>, markers: &mut SlotMarkers) {
    let mut depth = 1usize;

    while depth > 0 {
        let Some(token) = tokens.next_token() else {
            break;
        };
        match token {
            Token::Start(tag) if tag.is("td") => depth += 1,
            Token::Start(tag) if tag.is("input") => {
                if !tag.has_attr("disabled") {
                    markers.enabled_input = true;
                }
            }
            Token::Text(text) => {
                if text.contains(OPEN_GLYPH) {
                    markers.circle_glyph = true;
                }
            }
            Token::End(name) if name == "td" => depth -= 1,
            _ => {}
        }
    }
}

fn has_started(date: NaiveDate, slot: AvailableTime, now: DateTime<FixedOffset>) -> bool {
    at(date, slot.hour, slot.minute).is_some_and(|start| start < now)
}
