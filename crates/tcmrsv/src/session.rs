use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, cookie::Jar};
use tracing::{debug, warn};

use crate::postback::PostbackState;
use crate::scrape::{is_login_page, is_overload_page};
use crate::types::RsvError;

/// Host of the reservation portal
pub const DEFAULT_BASE_URL: &str = "https://www.tokyo-ondai-career.jp";

/// Settings for the HTTP side of a client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host every endpoint path is appended to
    pub base_url: String,

    /// Whole-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(30)),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// Cookie-backed exchange with the portal.
///
/// Every successful exchange refreshes the postback tokens from the page
/// it returned, so the next submission carries the latest state. Requests
/// are never retried here.
pub struct Session {
    client: Client,
    postback: PostbackState,
}

impl Session {
    /// Create a session with a fresh cookie jar
    pub fn new(config: &ClientConfig) -> Result<Self, RsvError> {
        let jar = Arc::new(Jar::default());

        let mut builder = Client::builder()
            .cookie_provider(jar)
            .user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| RsvError::Config(format!("Failed to create session client: {}", e)))?;

        Ok(Self::with_http_client(client))
    }

    /// Wrap a caller supplied client; it must keep cookies for logins to stick
    pub fn with_http_client(client: Client) -> Self {
        Self {
            client,
            postback: PostbackState::new(),
        }
    }

    /// Underlying HTTP client, for building requests
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Tokens recorded from the most recently fetched page
    pub fn postback(&self) -> &PostbackState {
        &self.postback
    }

    /// Send a request and return its full body.
    ///
    /// Fails with `InternalServerError` when the body is the overload page,
    /// whatever the status code, and with `AuthenticationFailed` when
    /// `require_auth` is set and the body is the login page.
    pub async fn exchange(
        &mut self,
        request: RequestBuilder,
        require_auth: bool,
    ) -> Result<String, RsvError> {
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!("{} {} (auth required: {})", method, path, require_auth);

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} {} -> {} ({} bytes)", method, path, status, body.len());

        if is_overload_page(&body) {
            warn!("{} {} returned the overload page", method, path);
            return Err(RsvError::InternalServerError);
        }

        if require_auth && is_login_page(&body) {
            debug!("{} {} was redirected to the login page", method, path);
            return Err(RsvError::AuthenticationFailed);
        }

        if !status.is_success() {
            warn!(
                "{} {} returned HTTP {} without a known failure marker",
                method, path, status
            );
        }

        self.postback.update(&body);
        Ok(body)
    }
}
