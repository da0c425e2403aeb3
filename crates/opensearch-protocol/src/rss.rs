//! RSS 2.0 result format.

use ows_common::OwsResult;
use ows_protocol::{OwsRequest, XmlElement};
use tracing::debug;

use crate::context::SearchContext;
use crate::feed;
use crate::format::ResultFormat;
use crate::item::ResultItem;
use crate::media_types;
use crate::namespaces::{NamespaceMap, ATOM, GEORSS, GML, OPENSEARCH};

/// Prefixes the RSS encoder writes itself. The empty prefix is reserved
/// because RSS elements live in no namespace.
const RESERVED: [&str; 5] = ["", "georss", "gml", "os", "atom"];

/// RSS 2.0 channel with OpenSearch, GeoRSS and GML time extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssResultFormat;

impl RssResultFormat {
    fn namespaces() -> NamespaceMap {
        NamespaceMap::from_namespaces(&[GEORSS, GML, OPENSEARCH, ATOM])
    }

    /// Encode a single `<item>`.
    pub fn encode_item(
        &self,
        request: &OwsRequest,
        item: &ResultItem,
        context: &SearchContext,
    ) -> XmlElement {
        let link = feed::describe_coverage_url(request, item);

        let guid = if context.uses("geo") {
            XmlElement::text_element("guid", request.absolute_uri()).attr("isPermaLink", "true")
        } else {
            XmlElement::text_element("guid", item.identifier.as_str())
                .attr("isPermaLink", "false")
        };

        let mut rss_item = XmlElement::new("item")
            .child(XmlElement::text_element("title", item.identifier.as_str()))
            .child(XmlElement::text_element("link", link))
            .child(guid)
            .child(
                XmlElement::new(ATOM.qname("link"))
                    .attr("rel", "enclosure")
                    .attr("href", feed::get_coverage_url(request, item)),
            );

        if let Some(bbox) = feed::georss_box(item) {
            rss_item.push(bbox);
        }
        if let Some(period) = feed::time_period(item) {
            rss_item.push(period);
        }
        rss_item
    }
}

impl ResultFormat for RssResultFormat {
    fn name(&self) -> &'static str {
        "rss"
    }

    fn mimetype(&self) -> &'static str {
        media_types::RSS
    }

    fn encode(
        &self,
        request: &OwsRequest,
        collection_id: &str,
        items: &[ResultItem],
        context: &SearchContext,
    ) -> OwsResult<Vec<u8>> {
        let namespaces = feed::prepare(&Self::namespaces(), &RESERVED, items, context)?;
        debug!(collection_id, items = items.len(), "Encoding RSS feed");

        let channel = XmlElement::new("channel")
            .child(XmlElement::text_element(
                "title",
                format!("{} Search", collection_id),
            ))
            .child(XmlElement::text_element("link", request.absolute_uri()))
            .child(XmlElement::new("description"))
            .children(feed::opensearch_elements(context))
            .children(feed::feed_links(request, context, &ATOM.qname("link")))
            .children(
                items
                    .iter()
                    .map(|item| self.encode_item(request, item, context)),
            );

        let mut rss = XmlElement::new("rss");
        for (name, uri) in namespaces.declarations() {
            rss = rss.attr(name, uri);
        }
        rss.attr("version", "2.0").child(channel).to_pretty_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Footprint;
    use crate::namespaces::GEO;
    use chrono::{TimeZone, Utc};
    use ows_common::{BoundingBox, OwsError};

    fn request() -> OwsRequest {
        OwsRequest::new(
            "GET",
            "http://localhost:8080",
            "/opensearch/collections/s2/rss",
            "bbox=10,20,30,40",
        )
    }

    #[test]
    fn test_guid_without_geo_is_identifier() {
        let item = ResultItem::new("c1");
        let encoded = RssResultFormat.encode_item(&request(), &item, &SearchContext::default());
        let guid = encoded.find("guid").unwrap();
        assert_eq!(guid.text_content(), "c1");
        assert_eq!(guid.attribute("isPermaLink"), Some("false"));
    }

    #[test]
    fn test_guid_with_geo_is_request_uri() {
        let item = ResultItem::new("c1");
        let context = SearchContext::default().with_parameter(GEO, "box", "10,20,30,40");
        let encoded = RssResultFormat.encode_item(&request(), &item, &context);
        let guid = encoded.find("guid").unwrap();
        assert_eq!(
            guid.text_content(),
            "http://localhost:8080/opensearch/collections/s2/rss?bbox=10,20,30,40"
        );
        assert_ne!(guid.attribute("isPermaLink"), Some("false"));
    }

    #[test]
    fn test_item_box_and_period() {
        let item = ResultItem::new("c1")
            .with_footprint(Footprint::from_bbox(&BoundingBox::new(10.0, 20.0, 30.0, 40.0)))
            .with_begin_time(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let encoded = RssResultFormat.encode_item(&request(), &item, &SearchContext::default());
        assert_eq!(
            encoded.find("georss:box").unwrap().text_content(),
            "20 10 40 30"
        );
        assert!(encoded.find("gml:TimePeriod").is_none());
    }

    #[test]
    fn test_context_namespaces_declared() {
        let context = SearchContext::default().with_parameter(GEO, "box", "10,20,30,40");
        let body = RssResultFormat
            .encode(&request(), "s2", &[ResultItem::new("c1")], &context)
            .unwrap();
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains(r#"xmlns:geo="http://a9.com/-/opensearch/extensions/geo/1.0/""#));
        assert!(body.contains(r#"xmlns:georss="http://www.georss.org/georss""#));
    }

    #[test]
    fn test_reserved_prefix_rebinding_fails() {
        let mut context = SearchContext::default();
        context.namespaces.insert("gml", "http://www.opengis.net/gml/3.2");
        let err = RssResultFormat
            .encode(&request(), "s2", &[], &context)
            .unwrap_err();
        assert!(matches!(err, OwsError::UnsupportedContext(_)));
    }

    #[test]
    fn test_item_without_identifier_fails() {
        let err = RssResultFormat
            .encode(
                &request(),
                "s2",
                &[ResultItem::new("c1"), ResultItem::new("")],
                &SearchContext::default(),
            )
            .unwrap_err();
        assert!(matches!(err, OwsError::MalformedItem(_)));
    }
}
