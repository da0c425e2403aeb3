//! OpenSearch 1.1 Search over catalog collections.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opensearch_protocol::namespaces::{GEO, TIME};
use opensearch_protocol::{FormatRegistry, ResultFormat, SearchContext};
use ows_common::{parse_iso8601, BoundingBox, OwsError, OwsResult};
use ows_protocol::{OwsHandler, OwsRequest, ResultShape};
use tracing::{debug, instrument};

use crate::catalog::{Catalog, SearchQuery};
use crate::config::OpenSearchSettings;
use crate::metrics;

pub const OPENSEARCH_SERVICE: &str = "OpenSearch";
pub const OPENSEARCH_VERSION: &str = "1.1.0";

/// Search one collection and encode the page in the requested format.
///
/// Request parameters:
/// - `collection` (required)
/// - `format`: result format name, default from settings
/// - `bbox` or `box`: west,south,east,north
/// - `start`, `end`: ISO 8601 bounds of the time filter
/// - `count`, `startIndex`: paging, `startIndex` is zero-based
pub struct SearchHandler {
    catalog: Arc<Catalog>,
    formats: FormatRegistry,
    settings: OpenSearchSettings,
}

impl SearchHandler {
    pub fn new(catalog: Arc<Catalog>, formats: FormatRegistry, settings: OpenSearchSettings) -> Self {
        Self {
            catalog,
            formats,
            settings,
        }
    }

    /// `format` parameter, else the first acceptable media type, else the default.
    fn select_format(&self, request: &OwsRequest) -> OwsResult<Arc<dyn ResultFormat>> {
        if let Some(name) = request.param("format") {
            return self.formats.get(name);
        }
        request
            .accepted_media_types()
            .into_iter()
            .find_map(|media_type| self.formats.for_media_type(media_type))
            .map_or_else(|| self.formats.get(&self.settings.default_format), Ok)
    }

    fn parse_count(&self, request: &OwsRequest) -> OwsResult<usize> {
        match request.param("count") {
            Some(value) => {
                let count = parse_usize("count", value)?;
                Ok(count.min(self.settings.max_count))
            }
            None => Ok(self.settings.default_count),
        }
    }
}

fn parse_usize(param: &str, value: &str) -> OwsResult<usize> {
    value.trim().parse().map_err(|_| OwsError::InvalidParameter {
        param: param.to_string(),
        message: format!("'{}' is not a non-negative integer", value),
    })
}

/// First present parameter among `names`, with the name it was found under.
fn first_param<'a>(request: &'a OwsRequest, names: &[&'a str]) -> Option<(&'a str, &'a str)> {
    names
        .iter()
        .find_map(|name| request.param(name).map(|value| (*name, value)))
}

/// A time bound parameter, parsed, together with its raw value.
fn time_param<'a>(
    request: &'a OwsRequest,
    param: &str,
) -> OwsResult<Option<(DateTime<Utc>, &'a str)>> {
    request
        .param(param)
        .map(|value| {
            parse_iso8601(value)
                .map(|time| (time, value))
                .map_err(|e| OwsError::InvalidParameter {
                    param: param.to_string(),
                    message: e.to_string(),
                })
        })
        .transpose()
}

#[async_trait]
impl OwsHandler for SearchHandler {
    #[instrument(skip_all, fields(collection = request.param("collection").unwrap_or("-")))]
    async fn handle(&self, request: &OwsRequest) -> OwsResult<ResultShape> {
        let collection = request
            .param("collection")
            .ok_or_else(|| OwsError::MissingParameter("collection".to_string()))?;
        let format = self.select_format(request)?;

        let bbox = first_param(request, &["bbox", "box"])
            .map(|(param, value)| {
                BoundingBox::from_kvp_string(value)
                    .map(|bbox| (bbox, value))
                    .map_err(|e| OwsError::InvalidParameter {
                        param: param.to_string(),
                        message: e.to_string(),
                    })
            })
            .transpose()?;

        let start = time_param(request, "start")?;
        let end = time_param(request, "end")?;

        let count = self.parse_count(request)?;
        let start_index = request
            .param("startIndex")
            .map(|value| parse_usize("startIndex", value))
            .transpose()?
            .unwrap_or(0);

        let query = SearchQuery {
            bbox: bbox.map(|(bbox, _)| bbox),
            start: start.map(|(time, _)| time),
            end: end.map(|(time, _)| time),
            count,
            start_index,
        };
        let page = self
            .catalog
            .search(collection, &query)
            .ok_or_else(|| OwsError::InvalidParameter {
                param: "collection".to_string(),
                message: format!("unknown collection '{}'", collection),
            })?;

        let mut context = SearchContext::new(page.total, count, start_index);
        if let Some((_, raw)) = bbox {
            context = context.with_parameter(GEO, "box", raw);
        }
        if let Some((_, raw)) = start {
            context = context.with_parameter(TIME, "start", raw);
        }
        if let Some((_, raw)) = end {
            context = context.with_parameter(TIME, "end", raw);
        }

        debug!(
            format = format.name(),
            total = page.total,
            returned = page.items.len(),
            "OpenSearch page assembled"
        );
        let body = format.encode(request, collection, &page.items, &context)?;
        metrics::record_items_encoded(format.name(), page.items.len());

        Ok(ResultShape::body(body, format.mimetype()))
    }
}
