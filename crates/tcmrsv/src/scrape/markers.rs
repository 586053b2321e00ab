use crate::html::{Token, TokenStream};
use crate::types::RsvError;

/// Text of the page the site serves when it is overloaded
pub const OVERLOAD_MESSAGE: &str =
    "現在、サーバへのアクセスが集中し、ページを閲覧しにくい状態になっております。";

/// `id` of the login button, present only on the login page
pub const LOGIN_BUTTON_ID: &str = "btnLogin";

/// Text shown once a reservation has been booked
pub const RESERVATION_COMPLETE: &str = "予約が完了しました";

/// Text shown once a reservation has been cancelled
pub const CANCELLATION_COMPLETE: &str = "予約キャンセル完了";

/// Whether `body` is the site's overload page: a `<span class="title">`
/// whose text contains the overload message.
pub fn is_overload_page(body: &str) -> bool {
    let mut tokens = TokenStream::new(body);
    let mut title_depth = 0usize;

    while let Some(token) = tokens.next_token() {
        match token {
            Token::Start(tag) if tag.is("span") => {
                if title_depth > 0 {
                    title_depth += 1;
                } else if tag.has_class("title") {
                    title_depth = 1;
                }
            }
            Token::End(name) if name == "span" && title_depth > 0 => title_depth -= 1,
            Token::Text(text) if title_depth > 0 => {
                if text.contains(OVERLOAD_MESSAGE) {
                    return true;
                }
            }
            _ => {}
        }
    }

    false
}

/// Whether `body` contains the login form's submit button
pub fn is_login_page(body: &str) -> bool {
    let mut tokens = TokenStream::new(body);

    while let Some(token) = tokens.next_token() {
        if let Token::Start(tag) = token {
            if tag.is("input") && tag.attr("id") == Some(LOGIN_BUTTON_ID) {
                return true;
            }
        }
    }

    false
}

/// Outcome page check after a state-changing submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A reservation was booked
    Reserved,
    /// A reservation was cancelled
    Cancelled,
}

impl Verdict {
    /// Fixed marker text the result page must contain
    pub fn marker(&self) -> &'static str {
        match self {
            Verdict::Reserved => RESERVATION_COMPLETE,
            Verdict::Cancelled => CANCELLATION_COMPLETE,
        }
    }

    /// Check the result page; absence of the marker is a failure of the
    /// operation even though the exchange itself succeeded.
    pub fn check(&self, body: &str) -> Result<(), RsvError> {
        if body.contains(self.marker()) {
            return Ok(());
        }
        Err(match self {
            Verdict::Reserved => RsvError::CreateReservationFailed,
            Verdict::Cancelled => RsvError::CancelReservationFailed,
        })
    }
}
