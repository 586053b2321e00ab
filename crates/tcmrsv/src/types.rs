use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Localized name the reservation list uses for the Ikebukuro campus
pub const CAMPUS_NAME_IKEBUKURO: &str = "池袋キャンパス";

/// Localized name the reservation list uses for the Nakameguro campus
pub const CAMPUS_NAME_NAKAMEGURO: &str = "中目黒・代官山キャンパス";

/// One of the two physical facility locations exposed by the portal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Campus {
    /// Ikebukuro campus, site code `1`
    Ikebukuro,
    /// Nakameguro / Daikanyama campus, site code `2`
    Nakameguro,
    /// Campus text that matched neither known name
    #[default]
    Unknown,
}

impl Campus {
    /// Code the site expects in the `campus` query parameter
    pub fn code(&self) -> &'static str {
        match self {
            Campus::Ikebukuro => "1",
            Campus::Nakameguro => "2",
            Campus::Unknown => "-1",
        }
    }

    /// Whether the campus can be sent to the site
    pub fn is_valid(&self) -> bool {
        matches!(self, Campus::Ikebukuro | Campus::Nakameguro)
    }

    /// Resolve the localized campus name shown in the reservation list.
    /// Matching is exact; anything else is `Unknown`.
    pub fn from_localized_name(text: &str) -> Self {
        match text {
            CAMPUS_NAME_IKEBUKURO => Campus::Ikebukuro,
            CAMPUS_NAME_NAKAMEGURO => Campus::Nakameguro,
            _ => Campus::Unknown,
        }
    }
}

impl fmt::Display for Campus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Campus::Ikebukuro => "ikebukuro",
            Campus::Nakameguro => "nakameguro",
            Campus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl FromStr for Campus {
    type Err = RsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "ikebukuro" => Ok(Campus::Ikebukuro),
            "2" | "nakameguro" => Ok(Campus::Nakameguro),
            other => match Campus::from_localized_name(other) {
                Campus::Unknown => Err(RsvError::InvalidCampus),
                campus => Ok(campus),
            },
        }
    }
}

/// Kind of piano installed in a practice room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PianoType {
    /// Grand piano
    Grand,
    /// Upright piano
    Upright,
    /// Room has a piano of undocumented type
    Unknown,
    /// No piano
    None,
}

/// Static reference entry for a bookable room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Stable opaque identifier used by the site
    pub id: String,
    /// Display name, exactly as the availability grid prints it
    pub name: String,
    /// Installed piano type
    pub piano_type: PianoType,
    /// Number of pianos in the room
    pub piano_number: u32,
    /// Campus the room belongs to
    pub campus: Campus,
    /// Floor number (basement floors count downwards from 1)
    pub floor: i32,
    /// Whether the room is below ground
    pub is_basement: bool,
    /// Whether the room is a classroom rather than a practice booth
    pub is_classroom: bool,
}

/// Start of a free half-hour slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AvailableTime {
    /// Hour in site-local time
    pub hour: u32,
    /// Minute, either 0 or 30
    pub minute: u32,
}

/// Free slots of one room on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomAvailability {
    /// Catalog entry the grid row resolved to
    pub room: Room,
    /// Open slots in grid order
    pub available_times: Vec<AvailableTime>,
}

/// One booking scraped from the reservation list page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reservation {
    /// Identifier taken from the cancellation link
    pub id: String,
    /// Resolved campus
    pub campus: Campus,
    /// Raw campus text as printed
    pub campus_name: String,
    /// Booking date; `None` when the printed date could not be parsed
    pub date: Option<NaiveDate>,
    /// Room name as printed
    pub room_name: String,
    /// Start hour
    pub from_hour: u32,
    /// Start minute
    pub from_minute: u32,
    /// End hour
    pub to_hour: u32,
    /// End minute
    pub to_minute: u32,
}

impl Reservation {
    /// Render the booked span as `HH:MM-HH:MM`
    pub fn time_range(&self) -> String {
        format!(
            "{:02}:{:02}-{:02}:{:02}",
            self.from_hour, self.from_minute, self.to_hour, self.to_minute
        )
    }
}

/// Credentials for the portal login form
#[derive(Clone)]
pub struct LoginParams {
    /// Student/user identifier
    pub user_id: String,
    /// Account password
    pub password: String,
}

impl fmt::Debug for LoginParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginParams")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters for an availability query
#[derive(Debug, Clone)]
pub struct GetRoomAvailabilityParams {
    /// Campus to query
    pub campus: Campus,
    /// Day to query
    pub date: NaiveDate,
}

/// Parameters for creating a reservation
#[derive(Debug, Clone)]
pub struct ReserveParams {
    /// Campus the room belongs to
    pub campus: Campus,
    /// Catalog identifier of the room
    pub room_id: String,
    /// Day to book
    pub date: NaiveDate,
    /// Start hour
    pub from_hour: u32,
    /// Start minute
    pub from_minute: u32,
    /// End hour
    pub to_hour: u32,
    /// End minute
    pub to_minute: u32,
}

/// Parameters for cancelling a reservation
#[derive(Debug, Clone)]
pub struct CancelReservationParams {
    /// Identifier of the reservation to cancel
    pub reservation_id: String,
    /// Free-text reason the site requires
    pub comment: String,
}

/// Custom error type for reservation portal operations
#[derive(thiserror::Error, Debug)]
pub enum RsvError {
    /// The request was silently redirected to the login page
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The site served its overload page
    #[error("Internal server error: the portal is overloaded")]
    InternalServerError,

    /// Campus is not one the site accepts
    #[error("Invalid campus")]
    InvalidCampus,

    /// Identifier is not a lowercase 8-4-4-4-12 hex token
    #[error("Invalid ID format")]
    InvalidIdFormat,

    /// Cancellation comment is blank
    #[error("Invalid comment: a cancellation reason is required")]
    InvalidComment,

    /// Requested time span breaks the site's slot rules
    #[error("Invalid time range")]
    InvalidTimeRange,

    /// Date is outside the booking window
    #[error("Date out of range")]
    DateOutOfRange,

    /// Requested start time has already passed
    #[error("Time is in the past")]
    TimeInPast,

    /// Reservation submission did not reach the completion page
    #[error("Create reservation failed")]
    CreateReservationFailed,

    /// Cancellation submission did not reach the completion page
    #[error("Cancel reservation failed")]
    CancelReservationFailed,

    /// Date text could not be parsed
    #[error("Invalid date format: {0}, expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    /// Transport level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Client configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RsvError {
    /// Whether the error was raised by local validation, before any request
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RsvError::InvalidCampus
                | RsvError::InvalidIdFormat
                | RsvError::InvalidComment
                | RsvError::InvalidTimeRange
                | RsvError::DateOutOfRange
                | RsvError::TimeInPast
                | RsvError::InvalidDateFormat(_)
        )
    }
}
