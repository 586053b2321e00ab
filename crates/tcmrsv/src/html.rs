//! Forward-only token stream over HTML pages.
//!
//! Pages are read as a flat sequence of start tags, end tags and text. There
//! is no tree: scanners keep whatever position state they need (inside a
//! table, column index, element depth) and never look back.

use std::borrow::Cow;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, warn};

/// An opening (or self-closing) tag with its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Lowercased element name
    pub name: String,
    attrs: Vec<(String, String)>,
}

impl Tag {
    /// Whether this is an element of the given (lowercase) name
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Value of an attribute; valueless attributes yield `Some("")`
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the attribute is present at all
    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// Whether the `class` attribute lists `class` as one of its names
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }
}

/// One unit of the token stream
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Opening tag, also emitted for self-closing tags
    Start(Tag),
    /// Closing tag, lowercased name
    End(String),
    /// Trimmed, entity-decoded text; whitespace-only runs are skipped
    Text(String),
}

/// Single-pass tokenizer over a page body.
///
/// Never fails: markup the reader cannot parse is skipped up to the next
/// `>`, and a page that ends inside such markup simply ends there.
pub struct TokenStream<'a> {
    html: &'a str,
    // Byte offset of the reader's input within `html`
    offset: usize,
    reader: Reader<&'a [u8]>,
}

impl<'a> TokenStream<'a> {
    /// Start reading `html` from the beginning
    pub fn new(html: &'a str) -> Self {
        Self {
            html,
            offset: 0,
            reader: html_reader(html),
        }
    }

    /// Next token, or `None` at end of document
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    self.skip_malformed(&e);
                    continue;
                }
            };

            match event {
                Event::Start(e) | Event::Empty(e) => return Some(Token::Start(to_tag(&e))),
                Event::End(e) => return Some(Token::End(lower_name(e.name().as_ref()))),
                Event::Text(t) => {
                    let raw = String::from_utf8_lossy(&t);
                    let text = decode_entities(raw.trim());
                    if !text.is_empty() {
                        return Some(Token::Text(text));
                    }
                }
                Event::CData(t) => {
                    let text = String::from_utf8_lossy(&t).trim().to_string();
                    if !text.is_empty() {
                        return Some(Token::Text(text));
                    }
                }
                Event::Eof => return None,
                _ => {}
            }
        }
    }

    /// Restart reading just past the `>` closing the markup that failed to
    /// parse, or at end of document when there is none.
    fn skip_malformed(&mut self, error: &quick_xml::Error) {
        let html = self.html;
        let start = self.offset + self.reader.error_position() as usize;
        let resume = html
            .get(start + 1..)
            .and_then(|rest| rest.find('>'))
            .map(|i| start + 1 + i + 1);

        let resume = match resume {
            Some(pos) => {
                debug!("Skipping malformed markup at byte {}: {}", start, error);
                pos
            }
            None => {
                warn!("Page ends inside malformed markup at byte {}: {}", start, error);
                html.len()
            }
        };

        self.offset = resume;
        self.reader = html_reader(&html[resume..]);
    }
}

fn html_reader(html: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    // HTML leaves void elements open and tolerates stray closing tags
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;
    config.expand_empty_elements = false;
    reader
}

fn lower_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

fn to_tag(e: &BytesStart<'_>) -> Tag {
    let attrs = e
        .html_attributes()
        .filter_map(Result::ok)
        .map(|a| {
            let key = lower_name(a.key.as_ref());
            let raw = String::from_utf8_lossy(&a.value);
            (key, decode_entities(&raw))
        })
        .collect();

    Tag {
        name: lower_name(e.name().as_ref()),
        attrs,
    }
}

/// Decode XML/numeric entities, keeping the raw text when the page uses
/// HTML-only named entities such as `&nbsp;`.
fn decode_entities(raw: &str) -> String {
    match unescape(raw) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => raw.replace("&nbsp;", "\u{a0}"),
    }
}
