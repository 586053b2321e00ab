use reqwest::Url;
use tracing::{debug, info};

use crate::date::{jst_now, ymd_param};
use crate::rooms::{RoomFilter, rooms, rooms_filtered};
use crate::scrape::{Verdict, scan_availability, scan_reservations};
use crate::session::{ClientConfig, Session};
use crate::types::*;
use crate::validation::*;

/// Login page; also the target of the credential postback
pub const ENDPOINT_LOGIN: &str = "/index.aspx";
/// Reservation index listing the user's bookings
pub const ENDPOINT_INDEX: &str = "/personal/facility/index.aspx";
/// Booking confirmation page
pub const ENDPOINT_CONFIRMS: &str = "/personal/facility/confirms.aspx";
/// Availability grid
pub const ENDPOINT_RESERVE: &str = "/personal/facility/reserve.aspx";
/// Cancellation page
pub const ENDPOINT_CANCEL_RESERVATION: &str = "/personal/facility/cancel.aspx";

/// Client for the practice room reservation portal.
///
/// Each operation is a fixed GET then POST exchange sharing the postback
/// tokens of one session, so operations take `&mut self`: one client runs one
/// operation at a time. Use separate clients for independent sessions.
pub struct RsvClient {
    session: Session,
    base_url: String,
}

impl RsvClient {
    /// Create a client with its own cookie jar
    pub fn new(config: Option<ClientConfig>) -> Result<Self, RsvError> {
        let config = config.unwrap_or_default();
        let base_url = checked_base_url(&config.base_url)?;
        let session = Session::new(&config)?;

        Ok(Self { session, base_url })
    }

    /// Create a client around a caller supplied HTTP client.
    /// Only `base_url` is taken from `config`.
    pub fn with_http_client(config: ClientConfig, client: reqwest::Client) -> Result<Self, RsvError> {
        let base_url = checked_base_url(&config.base_url)?;

        Ok(Self {
            session: Session::with_http_client(client),
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in with the given credentials.
    /// Succeeds when the credential postback is not bounced back to the login page.
    pub async fn login(&mut self, params: &LoginParams) -> Result<(), RsvError> {
        let url = self.url(ENDPOINT_LOGIN);
        debug!("Fetching login page");

        let request = self.session.http().get(&url);
        self.session.exchange(request, false).await?;

        let mut form = self.session.postback().form_fields();
        form.push(("input_id", params.user_id.clone()));
        form.push(("input_pass", params.password.clone()));
        form.push(("btnLogin", String::new()));

        let request = self.session.http().post(&url).form(&form);
        self.session.exchange(request, true).await?;

        info!("Logged in");
        Ok(())
    }

    /// Free slots per room for one campus and day
    pub async fn get_room_availability(
        &mut self,
        params: &GetRoomAvailabilityParams,
    ) -> Result<Vec<RoomAvailability>, RsvError> {
        let now = jst_now();

        if !is_campus_valid(params.campus) {
            return Err(RsvError::InvalidCampus);
        }
        if !is_date_within_booking_window(now, params.date) {
            return Err(RsvError::DateOutOfRange);
        }

        let query = [
            ("campus", params.campus.code().to_string()),
            ("ymd", ymd_param(params.date)),
        ];
        let request = self
            .session
            .http()
            .get(self.url(ENDPOINT_RESERVE))
            .query(&query);
        let body = self.session.exchange(request, true).await?;

        let availabilities = scan_availability(&body, params.campus, params.date, now);
        info!(
            "{} room(s) with free slots at {} on {}",
            availabilities.len(),
            params.campus,
            params.date
        );
        Ok(availabilities)
    }

    /// Reservations currently held by the logged-in user
    pub async fn get_my_reservations(&mut self) -> Result<Vec<Reservation>, RsvError> {
        let request = self.session.http().get(self.url(ENDPOINT_INDEX));
        let body = self.session.exchange(request, true).await?;

        let reservations = scan_reservations(&body);
        info!("Found {} reservation(s)", reservations.len());
        Ok(reservations)
    }

    /// Book a room. The confirmation postback is sent exactly once.
    pub async fn reserve(&mut self, params: &ReserveParams) -> Result<(), RsvError> {
        let now = jst_now();

        if !is_campus_valid(params.campus) {
            return Err(RsvError::InvalidCampus);
        }
        if !is_id_valid(&params.room_id) {
            return Err(RsvError::InvalidIdFormat);
        }
        if !is_date_within_booking_window(now, params.date) {
            return Err(RsvError::DateOutOfRange);
        }
        if !is_time_range_valid(
            params.from_hour,
            params.from_minute,
            params.to_hour,
            params.to_minute,
        ) {
            return Err(RsvError::InvalidTimeRange);
        }
        if !is_time_in_future(now, params.date, params.from_hour, params.from_minute) {
            return Err(RsvError::TimeInPast);
        }

        let url = self.url(ENDPOINT_CONFIRMS);
        let query = [
            ("campus", params.campus.code().to_string()),
            ("room", params.room_id.clone()),
            ("ymd", ymd_param(params.date)),
            ("fromh", format!("{:02}", params.from_hour)),
            ("fromm", format!("{:02}", params.from_minute)),
            ("toh", format!("{:02}", params.to_hour)),
            ("tom", format!("{:02}", params.to_minute)),
        ];

        let request = self.session.http().get(&url).query(&query);
        self.session.exchange(request, true).await?;

        let mut form = self.session.postback().form_fields();
        form.push(("KakuteiButton", String::new()));

        let request = self.session.http().post(&url).query(&query).form(&form);
        let body = self.session.exchange(request, true).await?;
        Verdict::Reserved.check(&body)?;

        info!(
            "Reserved room {} on {} {:02}:{:02}-{:02}:{:02}",
            params.room_id,
            params.date,
            params.from_hour,
            params.from_minute,
            params.to_hour,
            params.to_minute
        );
        Ok(())
    }

    /// Cancel a reservation. The cancellation postback is sent exactly once.
    pub async fn cancel_reservation(
        &mut self,
        params: &CancelReservationParams,
    ) -> Result<(), RsvError> {
        if !is_id_valid(&params.reservation_id) {
            return Err(RsvError::InvalidIdFormat);
        }
        if !is_comment_valid(&params.comment) {
            return Err(RsvError::InvalidComment);
        }

        let url = self.url(ENDPOINT_CANCEL_RESERVATION);
        let query = [("id", params.reservation_id.clone())];

        let request = self.session.http().get(&url).query(&query);
        self.session.exchange(request, true).await?;

        let mut form = self.session.postback().form_fields();
        form.push(("freeword", params.comment.clone()));
        form.push(("YoyakuCancelButton", String::new()));

        let request = self.session.http().post(&url).query(&query).form(&form);
        let body = self.session.exchange(request, true).await?;
        Verdict::Cancelled.check(&body)?;

        info!("Cancelled reservation {}", params.reservation_id);
        Ok(())
    }

    /// The static room catalog
    pub fn get_rooms(&self) -> &'static [Room] {
        rooms()
    }

    /// Catalog entries matching `filter`
    pub fn get_rooms_filtered(&self, filter: &RoomFilter) -> Vec<Room> {
        rooms_filtered(filter)
    }
}

fn checked_base_url(base_url: &str) -> Result<String, RsvError> {
    Url::parse(base_url)
        .map_err(|e| RsvError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
    Ok(base_url.trim_end_matches('/').to_string())
}
