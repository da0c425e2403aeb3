//! OpenSearch result formats.
//!
//! A search handler produces a page of [`ResultItem`]s plus a [`SearchContext`]
//! describing how they were found; a [`ResultFormat`] picked from the
//! [`FormatRegistry`] turns them into a feed document.
//!
//! Supported formats:
//! - `rss`: RSS 2.0 with GeoRSS and GML time extensions
//! - `atom`: Atom 1.0 with the same extensions
//! - `json`: GeoJSON FeatureCollection

pub mod atom;
pub mod context;
pub mod feed;
pub mod format;
pub mod geojson;
pub mod item;
pub mod namespaces;
pub mod rss;

pub use atom::AtomResultFormat;
pub use context::{Paging, SearchContext};
pub use format::{FormatRegistry, FormatRegistryBuilder, ResultFormat};
pub use geojson::GeoJsonResultFormat;
pub use item::{Footprint, ResultItem};
pub use namespaces::{Namespace, NamespaceMap};
pub use rss::RssResultFormat;

/// Media types of the supported feed formats
pub mod media_types {
    pub const RSS: &str = "application/rss+xml";
    pub const ATOM: &str = "application/atom+xml";
    pub const GEO_JSON: &str = "application/geo+json";
}
