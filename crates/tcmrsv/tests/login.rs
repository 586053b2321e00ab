mod common;

use std::time::Duration;

use common::*;
use tcmrsv::{ClientConfig, RsvClient, RsvError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer};

#[tokio::test]
async fn test_login_succeeds_with_two_requests() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let mut client = client_for(&server);
    client.login(&credentials()).await.unwrap();

    let received = requests(&server).await;
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].method.as_str(), "GET");
    assert_eq!(received[1].method.as_str(), "POST");
    assert_eq!(received[1].url.path(), "/index.aspx");
}

#[tokio::test]
async fn test_login_posts_tokens_and_credentials() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let mut client = client_for(&server);
    client.login(&credentials()).await.unwrap();

    let received = requests(&server).await;
    let form = form_body(&received[1]);
    assert_eq!(
        form["__VIEWSTATE"],
        "/wEPDwUKLTM0NjYyNjQ5Nw9kFgICAw9kFgICAQ8PFgIeBFRleHRlZGRk"
    );
    assert_eq!(form["__VIEWSTATEGENERATOR"], "90059987");
    assert_eq!(form["__EVENTVALIDATION"], "/wEdAAS0fKp8Zq3yWcLzH0nEwHlk");
    assert_eq!(form["__EVENTTARGET"], "");
    assert_eq!(form["__EVENTARGUMENT"], "");
    assert_eq!(form["input_id"], USER_ID);
    assert_eq!(form["input_pass"], PASSWORD);
    assert_eq!(form["btnLogin"], "");
}

#[tokio::test]
async fn test_session_cookie_is_carried_after_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.aspx"))
        .respond_with(page("index.html"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/index.aspx"))
        .respond_with(
            page("personal/facility/index.html")
                .insert_header("set-cookie", "ASP.NET_SessionId=abc; path=/; HttpOnly"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/personal/facility/index.aspx"))
        .and(header("cookie", "ASP.NET_SessionId=abc"))
        .respond_with(page("personal/facility/index.html"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login(&credentials()).await.unwrap();
    let reservations = client.get_my_reservations().await.unwrap();

    assert_eq!(reservations.len(), 2);
}

#[tokio::test]
async fn test_login_bounced_to_login_page_fails() {
    let server = MockServer::start().await;
    Mock::given(path("/index.aspx"))
        .respond_with(page("index.html"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let result = client.login(&credentials()).await;

    assert!(matches!(result, Err(RsvError::AuthenticationFailed)));
    assert_eq!(requests(&server).await.len(), 2);
}

#[tokio::test]
async fn test_overload_page_on_first_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.aspx"))
        .respond_with(page_with_status(503, "errorpage.html"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let result = client.login(&credentials()).await;

    assert!(matches!(result, Err(RsvError::InternalServerError)));
    assert_eq!(requests(&server).await.len(), 1);
}

#[tokio::test]
async fn test_overload_page_with_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.aspx"))
        .respond_with(page("index.html"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/index.aspx"))
        .respond_with(page("errorpage.html"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let result = client.login(&credentials()).await;

    assert!(matches!(result, Err(RsvError::InternalServerError)));
}

#[tokio::test]
async fn test_unreachable_portal_is_a_network_error() {
    let mut client = RsvClient::new(Some(ClientConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout: Some(Duration::from_secs(5)),
        ..Default::default()
    }))
    .unwrap();

    let result = client.login(&credentials()).await;
    assert!(matches!(result, Err(RsvError::Network(_))));
}
