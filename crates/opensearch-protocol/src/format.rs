//! Result format contract and the registry of available formats.

use std::sync::Arc;

use ows_common::{OwsError, OwsResult};
use ows_protocol::OwsRequest;

use crate::atom::AtomResultFormat;
use crate::context::SearchContext;
use crate::geojson::GeoJsonResultFormat;
use crate::item::ResultItem;
use crate::rss::RssResultFormat;

/// Encodes one page of search results.
///
/// Implementations hold no per-request state; everything request-scoped
/// arrives through the arguments.
pub trait ResultFormat: Send + Sync {
    /// Name used to select the format in the `format` path segment.
    fn name(&self) -> &'static str;

    fn mimetype(&self) -> &'static str;

    /// Encode `items` in input order.
    fn encode(
        &self,
        request: &OwsRequest,
        collection_id: &str,
        items: &[ResultItem],
        context: &SearchContext,
    ) -> OwsResult<Vec<u8>>;
}

/// Collects formats during startup.
#[derive(Default)]
pub struct FormatRegistryBuilder {
    formats: Vec<Arc<dyn ResultFormat>>,
}

impl FormatRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a format. Names are unique, compared case-insensitively.
    pub fn register(&mut self, format: Arc<dyn ResultFormat>) -> OwsResult<&mut Self> {
        if self
            .formats
            .iter()
            .any(|f| f.name().eq_ignore_ascii_case(format.name()))
        {
            return Err(OwsError::DuplicateCapability(format!(
                "result format '{}'",
                format.name()
            )));
        }
        self.formats.push(format);
        Ok(self)
    }

    pub fn build(self) -> FormatRegistry {
        FormatRegistry {
            formats: self.formats,
        }
    }
}

/// Immutable set of result formats, looked up by name.
#[derive(Clone)]
pub struct FormatRegistry {
    formats: Vec<Arc<dyn ResultFormat>>,
}

impl FormatRegistry {
    pub fn builder() -> FormatRegistryBuilder {
        FormatRegistryBuilder::new()
    }

    /// RSS, Atom and GeoJSON.
    pub fn with_defaults() -> Self {
        FormatRegistry {
            formats: vec![
                Arc::new(RssResultFormat),
                Arc::new(AtomResultFormat),
                Arc::new(GeoJsonResultFormat),
            ],
        }
    }

    pub fn get(&self, name: &str) -> OwsResult<Arc<dyn ResultFormat>> {
        self.formats
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| OwsError::UnsupportedFormat(name.to_string()))
    }

    /// Format producing the given media type, if any.
    pub fn for_media_type(&self, media_type: &str) -> Option<Arc<dyn ResultFormat>> {
        self.formats
            .iter()
            .find(|f| f.mimetype().eq_ignore_ascii_case(media_type))
            .cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.name()).collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}
