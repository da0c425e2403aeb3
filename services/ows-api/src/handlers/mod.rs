//! HTTP request handlers for the OWS API.

pub mod health;
pub mod ows;
