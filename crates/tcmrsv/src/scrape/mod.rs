//! Single-pass extractors turning portal pages into domain data.
//!
//! Every scanner walks the page once through [`crate::html::TokenStream`],
//! treats "nothing found" as an empty result and stops at end of document.

/// Availability grid scanner and slot openness predicate
pub mod availability;
/// Failure page detection and success verdicts
pub mod markers;
/// Reservation list scanner
pub mod reservations;

pub use availability::{SlotMarkers, scan_availability, slot_time};
pub use markers::{Verdict, is_login_page, is_overload_page};
pub use reservations::scan_reservations;
