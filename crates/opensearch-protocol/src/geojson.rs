//! GeoJSON result format.
//!
//! Pages are written as a FeatureCollection carrying the OpenSearch response
//! elements as foreign members. Each feature's `bbox` follows GeoJSON axis
//! order (west, south, east, north), unlike the GeoRSS box of the XML feeds.

use ows_common::{format_iso8601, OwsResult};
use ows_protocol::OwsRequest;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::SearchContext;
use crate::feed;
use crate::format::ResultFormat;
use crate::item::ResultItem;
use crate::media_types;

/// A link in a GeoJSON feature or collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedLink {
    pub rel: String,
    pub href: String,
}

impl FeedLink {
    fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }
}

/// Search result page as a GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchFeatureCollection {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
    pub title: String,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    #[serde(rename = "itemsPerPage")]
    pub items_per_page: usize,
    #[serde(rename = "startIndex")]
    pub start_index: usize,
    pub links: Vec<FeedLink>,
    pub features: Vec<SearchFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchFeature {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    /// Null when the item has no footprint.
    pub geometry: Option<PolygonGeometry>,
    pub properties: SearchProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub type_: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchProperties {
    pub title: String,
    /// `begin/end` interval, only when both are known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub links: Vec<FeedLink>,
}

impl SearchFeature {
    fn from_item(request: &OwsRequest, item: &ResultItem) -> Self {
        let geometry = item.footprint.as_ref().map(|footprint| PolygonGeometry {
            type_: "Polygon".to_string(),
            coordinates: vec![footprint.exterior.clone()],
        });
        let bbox = item
            .extent_wgs84()
            .map(|e| [e.min_x, e.min_y, e.max_x, e.max_y]);
        let date = item.time_period().map(|period| {
            format!(
                "{}/{}",
                format_iso8601(&period.begin),
                format_iso8601(&period.end)
            )
        });

        Self {
            type_: "Feature".to_string(),
            id: item.identifier.clone(),
            bbox,
            geometry,
            properties: SearchProperties {
                title: item.identifier.clone(),
                date,
                links: vec![
                    FeedLink::new("alternate", feed::describe_coverage_url(request, item)),
                    FeedLink::new("enclosure", feed::get_coverage_url(request, item)),
                ],
            },
        }
    }
}

/// GeoJSON FeatureCollection format.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonResultFormat;

impl ResultFormat for GeoJsonResultFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn mimetype(&self) -> &'static str {
        media_types::GEO_JSON
    }

    fn encode(
        &self,
        request: &OwsRequest,
        collection_id: &str,
        items: &[ResultItem],
        context: &SearchContext,
    ) -> OwsResult<Vec<u8>> {
        for item in items {
            item.validate()?;
        }
        debug!(collection_id, items = items.len(), "Encoding GeoJSON feed");

        let links = feed::feed_links(request, context, "link")
            .into_iter()
            .filter_map(|link| {
                Some(FeedLink::new(link.attribute("rel")?, link.attribute("href")?))
            })
            .collect();

        let collection = SearchFeatureCollection {
            type_: "FeatureCollection".to_string(),
            id: request.absolute_uri(),
            title: format!("{} Search", collection_id),
            total_results: context.total_results,
            items_per_page: context.items_per_page,
            start_index: context.start_index,
            links,
            features: items
                .iter()
                .map(|item| SearchFeature::from_item(request, item))
                .collect(),
        };
        Ok(serde_json::to_vec_pretty(&collection)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Footprint;
    use chrono::{TimeZone, Utc};
    use ows_common::BoundingBox;

    fn encode(items: &[ResultItem]) -> serde_json::Value {
        let request = OwsRequest::new("GET", "http://localhost:8080", "/opensearch/collections/s2/json", "");
        let body = GeoJsonResultFormat
            .encode(&request, "s2", items, &SearchContext::new(items.len(), 10, 0))
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_feature_collection() {
        let item = ResultItem::new("c1")
            .with_footprint(Footprint::from_bbox(&BoundingBox::new(10.0, 20.0, 30.0, 40.0)))
            .with_begin_time(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
            .with_end_time(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap());
        let value = encode(&[item]);

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["totalResults"], 1);
        let feature = &value["features"][0];
        assert_eq!(feature["id"], "c1");
        assert_eq!(feature["bbox"], serde_json::json!([10.0, 20.0, 30.0, 40.0]));
        assert_eq!(feature["geometry"]["type"], "Polygon");
        assert_eq!(
            feature["properties"]["date"],
            "2020-01-01T00:00:00Z/2020-01-02T00:00:00Z"
        );
    }

    #[test]
    fn test_feature_without_footprint_or_period() {
        let item = ResultItem::new("c1")
            .with_begin_time(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let value = encode(&[item]);
        let feature = &value["features"][0];
        assert!(feature["geometry"].is_null());
        assert!(feature.get("bbox").is_none());
        assert!(feature["properties"].get("date").is_none());
    }
}
