//! OWS API Service Library
//!
//! HTTP front end for the OWS dispatcher: WCS coverage description and
//! OpenSearch result feeds over a configured coverage catalog.

pub mod catalog;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod operations;
pub mod routes;
pub mod state;
