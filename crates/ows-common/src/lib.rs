//! Common types and utilities shared across the OWS gateway crates.

pub mod bbox;
pub mod error;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{OwsError, OwsResult};
pub use time::{format_iso8601, parse_iso8601, TimePeriod};
