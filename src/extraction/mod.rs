//! Structured extraction from the rendered odds document.
//!
//! Pure functions over an HTML string; no browser types cross this
//! boundary, so the parsing contract is testable without a session.

pub mod odds;
