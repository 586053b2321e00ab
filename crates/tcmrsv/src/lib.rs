//! # tcmrsv
//!
//! Client for a music college's practice room reservation portal, an
//! ASP.NET web-forms site with no API. This library logs in, reads room
//! availability and the user's reservations, and books or cancels rooms by
//! replaying the site's form postbacks and scraping the pages it returns.

/// Domain types and the error taxonomy.
pub mod types;
pub use types::*;

/// Japan Standard Time helpers and date formats used by the portal.
pub mod date;

/// Input predicates checked before any request is sent.
pub mod validation;

/// Static catalog of practice rooms.
pub mod rooms;
pub use rooms::{RoomFilter, find_by_id, find_by_name, rooms, rooms_filtered};

/// Lenient HTML token stream shared by every scanner.
pub mod html;

/// Web-forms postback token tracking.
pub mod postback;
pub use postback::PostbackState;

/// Page scanners: availability grid, reservation list and result markers.
pub mod scrape;

/// Cookie-backed HTTP exchange with failure page detection.
pub mod session;
pub use session::{ClientConfig, DEFAULT_BASE_URL, Session};

/// High level portal operations.
pub mod client;
pub use client::RsvClient;
