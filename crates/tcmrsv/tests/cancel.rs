mod common;

use common::*;
use tcmrsv::{CancelReservationParams, RsvError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer};

const RESERVATION_ID: &str = "fa791156-cc27-f011-8c4e-000d3ace9c3e";

fn params(comment: &str) -> CancelReservationParams {
    CancelReservationParams {
        reservation_id: RESERVATION_ID.to_string(),
        comment: comment.to_string(),
    }
}

async fn mount_cancellation(server: &MockServer, result_page: &str) {
    Mock::given(method("GET"))
        .and(path("/personal/facility/cancel.aspx"))
        .and(query_param("id", RESERVATION_ID))
        .respond_with(page("personal/facility/cancel.html"))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/personal/facility/cancel.aspx"))
        .and(query_param("id", RESERVATION_ID))
        .respond_with(page(result_page))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cancel_succeeds_on_completion_page() {
    let server = MockServer::start().await;
    let mut client = logged_in_client(&server).await;
    mount_cancellation(&server, "personal/facility/cancel_complete.html").await;

    client.cancel_reservation(&params("予定変更のため")).await.unwrap();

    let received = requests(&server).await;
    assert_eq!(received.len(), 2);

    let form = form_body(&received[1]);
    assert_eq!(form["__VIEWSTATE"], "/wEPDwUKMTcancelstate");
    assert_eq!(form["__VIEWSTATEGENERATOR"], "5E6F7A8B");
    assert_eq!(form["__EVENTVALIDATION"], "/wEdAAcancelvalidation");
    assert_eq!(form["freeword"], "予定変更のため");
    assert_eq!(form["YoyakuCancelButton"], "");
}

#[tokio::test]
async fn test_cancel_without_marker_fails() {
    let server = MockServer::start().await;
    let mut client = logged_in_client(&server).await;
    mount_cancellation(&server, "personal/facility/rejected.html").await;

    let result = client.cancel_reservation(&params("体調不良")).await;
    assert!(matches!(result, Err(RsvError::CancelReservationFailed)));
}

#[tokio::test]
async fn test_invalid_id_sends_nothing() {
    let server = MockServer::start().await;
    let mut client = client_for(&server);

    let result = client
        .cancel_reservation(&CancelReservationParams {
            reservation_id: "12345".to_string(),
            comment: "体調不良".to_string(),
        })
        .await;

    assert!(matches!(result, Err(RsvError::InvalidIdFormat)));
    assert!(requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_blank_comment_sends_nothing() {
    let server = MockServer::start().await;
    let mut client = client_for(&server);

    for comment in ["", "   ", "\n\t"] {
        let result = client.cancel_reservation(&params(comment)).await;
        assert!(matches!(result, Err(RsvError::InvalidComment)));
    }

    assert!(requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_overloaded_cancellation_fails_before_posting() {
    let server = MockServer::start().await;
    let mut client = logged_in_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/personal/facility/cancel.aspx"))
        .respond_with(page_with_status(503, "errorpage.html"))
        .mount(&server)
        .await;

    let result = client.cancel_reservation(&params("体調不良")).await;

    assert!(matches!(result, Err(RsvError::InternalServerError)));
    assert_eq!(requests(&server).await.len(), 1);
}
