#![allow(dead_code)]

use std::collections::HashMap;

use chrono::NaiveDate;
use tcmrsv::date::{add_days, jst_now, today};
use tcmrsv::{ClientConfig, LoginParams, RsvClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const USER_ID: &str = "s2412345";
pub const PASSWORD: &str = "correct horse";

/// Read a page captured from the portal
pub fn fixture(name: &str) -> String {
    let file = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&file).unwrap_or_else(|e| panic!("missing fixture {}: {}", file, e))
}

/// 200 response carrying a fixture page
pub fn page(name: &str) -> ResponseTemplate {
    page_with_status(200, name)
}

pub fn page_with_status(status: u16, name: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(fixture(name))
}

pub fn client_for(server: &MockServer) -> RsvClient {
    RsvClient::new(Some(ClientConfig {
        base_url: server.uri(),
        ..Default::default()
    }))
    .unwrap()
}

pub fn credentials() -> LoginParams {
    LoginParams {
        user_id: USER_ID.to_string(),
        password: PASSWORD.to_string(),
    }
}

/// A date that is always inside the booking window
pub fn tomorrow() -> NaiveDate {
    add_days(today(jst_now()), 1)
}

/// Mount the login page and a successful credential postback
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/index.aspx"))
        .respond_with(page("index.html"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/index.aspx"))
        .respond_with(page("personal/facility/index.html"))
        .mount(server)
        .await;
}

/// Log in against the mounted pages and forget the login traffic
pub async fn logged_in_client(server: &MockServer) -> RsvClient {
    mount_login(server).await;
    let mut client = client_for(server);
    client.login(&credentials()).await.unwrap();
    server.reset().await;
    client
}

pub async fn requests(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

/// Decode an `application/x-www-form-urlencoded` body
pub fn form_body(request: &Request) -> HashMap<String, String> {
    let body = String::from_utf8_lossy(&request.body).replace('+', " ");
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                urlencoding::decode(key).unwrap().into_owned(),
                urlencoding::decode(value).unwrap().into_owned(),
            )
        })
        .collect()
}
