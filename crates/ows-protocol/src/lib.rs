//! OGC Web Service (OWS) protocol core.
//!
//! Routes KVP requests to handlers registered per (service, version, operation),
//! turns handler errors into OWS exception reports, and normalizes every outcome
//! into a single [`OwsResponse`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ows_protocol::{CapabilityDescriptor, CapabilityRegistry, Dispatcher, ExceptionMapper};
//!
//! let mut builder = CapabilityRegistry::builder();
//! builder.register(
//!     CapabilityDescriptor::new("WCS", "2.0.1", "DescribeCoverage"),
//!     Arc::new(DescribeCoverageHandler::new(catalog)),
//! )?;
//! let dispatcher = Dispatcher::new(Arc::new(builder.build()), ExceptionMapper::default());
//! let response = dispatcher.dispatch(&request).await;
//! ```

pub mod capability;
pub mod dispatch;
pub mod exceptions;
pub mod handler;
pub mod normalize;
pub mod registry;
pub mod request;
pub mod response;
pub mod xml;

pub use capability::{CapabilityDescriptor, VersionSpec};
pub use dispatch::Dispatcher;
pub use exceptions::{ExceptionFormat, ExceptionMapper, ExceptionReport, FaultHook};
pub use handler::OwsHandler;
pub use normalize::normalize;
pub use registry::{CapabilityRegistry, CapabilityRegistryBuilder};
pub use request::{KvpParams, OwsRequest};
pub use response::{OwsResponse, ResultShape};
pub use xml::{XmlElement, XmlNode};

/// Path of the KVP endpoint all OWS deep links point at.
pub const OWS_PATH: &str = "/ows";

/// Media types used in OWS responses
pub mod media_types {
    /// Generic XML media type
    pub const XML: &str = "application/xml";
    /// JSON media type
    pub const JSON: &str = "application/json";
    /// GML media type used by coverage descriptions
    pub const GML: &str = "application/gml+xml";
}

/// XML namespaces shared by the OWS documents this crate writes.
pub mod namespaces {
    pub const OWS_11: &str = "http://www.opengis.net/ows/1.1";
    pub const OWS_20: &str = "http://www.opengis.net/ows/2.0";
    pub const OGC: &str = "http://www.opengis.net/ogc";
    pub const GML: &str = "http://www.opengis.net/gml";
    pub const GML_32: &str = "http://www.opengis.net/gml/3.2";
    pub const WCS_20: &str = "http://www.opengis.net/wcs/2.0";
    pub const XLINK: &str = "http://www.w3.org/1999/xlink";
}
