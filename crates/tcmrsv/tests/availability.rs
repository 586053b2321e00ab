mod common;

use chrono::Duration;
use common::*;
use tcmrsv::date::{jst_now, today, ymd_param};
use tcmrsv::{AvailableTime, Campus, GetRoomAvailabilityParams, RsvError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer};

fn time(hour: u32, minute: u32) -> AvailableTime {
    AvailableTime { hour, minute }
}

#[tokio::test]
async fn test_open_cells_become_available_times() {
    let server = MockServer::start().await;
    let mut client = logged_in_client(&server).await;
    let date = tomorrow();

    Mock::given(method("GET"))
        .and(path("/personal/facility/reserve.aspx"))
        .and(query_param("campus", "2"))
        .and(query_param("ymd", ymd_param(date)))
        .respond_with(page("personal/facility/reserve.html"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .get_room_availability(&GetRoomAvailabilityParams {
            campus: Campus::Nakameguro,
            date,
        })
        .await
        .unwrap();

    assert_eq!(result.len(), 2);

    assert_eq!(result[0].room.name, "P 426（G）");
    assert_eq!(result[0].room.id, "69f2e624-2f48-ec11-8c60-002248696fd6");
    assert_eq!(
        result[0].available_times,
        vec![time(7, 0), time(8, 0), time(9, 30)]
    );

    assert_eq!(result[1].room.name, "楽屋2（U）旧楽屋201");
    assert_eq!(result[1].room.campus, Campus::Nakameguro);
    assert_eq!(result[1].available_times, vec![time(7, 30)]);
}

#[tokio::test]
async fn test_glyph_only_grid() {
    let server = MockServer::start().await;
    let mut client = logged_in_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/personal/facility/reserve.aspx"))
        .and(query_param("campus", "1"))
        .respond_with(page("personal/facility/reserve_glyph.html"))
        .mount(&server)
        .await;

    let result = client
        .get_room_availability(&GetRoomAvailabilityParams {
            campus: Campus::Ikebukuro,
            date: tomorrow(),
        })
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].room.name, "A414（G）");
    assert_eq!(result[0].room.campus, Campus::Ikebukuro);
    assert_eq!(
        result[0].available_times,
        vec![time(7, 0), time(7, 30), time(8, 30)]
    );
}

#[tokio::test]
async fn test_date_outside_window_sends_nothing() {
    let server = MockServer::start().await;
    let mut client = client_for(&server);
    let now = jst_now();

    for date in [today(now), today(now) - Duration::days(1), today(now) + Duration::days(3)] {
        let result = client
            .get_room_availability(&GetRoomAvailabilityParams {
                campus: Campus::Ikebukuro,
                date,
            })
            .await;
        assert!(matches!(result, Err(RsvError::DateOutOfRange)), "{}", date);
    }

    assert!(requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_unknown_campus_sends_nothing() {
    let server = MockServer::start().await;
    let mut client = client_for(&server);

    let result = client
        .get_room_availability(&GetRoomAvailabilityParams {
            campus: Campus::Unknown,
            date: tomorrow(),
        })
        .await;

    assert!(matches!(result, Err(RsvError::InvalidCampus)));
    assert!(requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_expired_session_is_an_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/personal/facility/reserve.aspx"))
        .respond_with(page("index.html"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let result = client
        .get_room_availability(&GetRoomAvailabilityParams {
            campus: Campus::Ikebukuro,
            date: tomorrow(),
        })
        .await;

    assert!(matches!(result, Err(RsvError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_page_without_grid_is_empty() {
    let server = MockServer::start().await;
    let mut client = logged_in_client(&server).await;

    Mock::given(path("/personal/facility/reserve.aspx"))
        .respond_with(page("personal/facility/confirms_complete.html"))
        .mount(&server)
        .await;

    let result = client
        .get_room_availability(&GetRoomAvailabilityParams {
            campus: Campus::Ikebukuro,
            date: tomorrow(),
        })
        .await
        .unwrap();
    assert!(result.is_empty());
}
