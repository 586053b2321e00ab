use tracing::debug;

use crate::html::{Token, TokenStream};

/// Hidden field carrying the serialized page state
pub const VIEW_STATE: &str = "__VIEWSTATE";
/// Hidden field identifying the page class that produced the state
pub const VIEW_STATE_GENERATOR: &str = "__VIEWSTATEGENERATOR";
/// Hidden field listing the postbacks the server will accept
pub const EVENT_VALIDATION: &str = "__EVENTVALIDATION";
/// Control that raised the postback; always empty for button submits
pub const EVENT_TARGET: &str = "__EVENTTARGET";
/// Argument for the raising control; always empty for button submits
pub const EVENT_ARGUMENT: &str = "__EVENTARGUMENT";

/// Hidden web-forms tokens echoed back on every submission.
///
/// Owned by one session. The values are opaque and only ever copied from the
/// most recently fetched page into the next form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostbackState {
    /// Value of `__VIEWSTATE`
    pub view_state: String,
    /// Value of `__VIEWSTATEGENERATOR`
    pub view_state_generator: String,
    /// Value of `__EVENTVALIDATION`
    pub event_validation: String,
}

impl PostbackState {
    /// Empty state, as before the first fetch
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the hidden tokens found in `body`.
    ///
    /// A token missing from the page keeps its previous value. Whether the
    /// site ever omits exactly one token on purpose is unknown, so a stale
    /// value may be resubmitted in that case.
    pub fn update(&mut self, body: &str) {
        let mut tokens = TokenStream::new(body);
        let mut seen = 0;

        while let Some(token) = tokens.next_token() {
            let Token::Start(tag) = token else { continue };
            if !tag.is("input") {
                continue;
            }

            let slot = match tag.attr("id") {
                Some(VIEW_STATE) => &mut self.view_state,
                Some(VIEW_STATE_GENERATOR) => &mut self.view_state_generator,
                Some(EVENT_VALIDATION) => &mut self.event_validation,
                _ => continue,
            };
            *slot = tag.attr("value").unwrap_or_default().to_string();
            seen += 1;
        }

        debug!("Postback state refreshed, {} hidden field(s) seen", seen);
    }

    /// Form fields for a postback: the three tokens plus empty event fields
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (EVENT_TARGET, String::new()),
            (EVENT_ARGUMENT, String::new()),
            (VIEW_STATE, self.view_state.clone()),
            (VIEW_STATE_GENERATOR, self.view_state_generator.clone()),
            (EVENT_VALIDATION, self.event_validation.clone()),
        ]
    }
}
