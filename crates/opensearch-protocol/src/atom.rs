//! Atom 1.0 result format.

use chrono::{DateTime, Utc};
use ows_common::{format_iso8601, OwsResult};
use ows_protocol::{OwsRequest, XmlElement};
use tracing::debug;

use crate::context::SearchContext;
use crate::feed;
use crate::format::ResultFormat;
use crate::item::ResultItem;
use crate::media_types;
use crate::namespaces::{Namespace, NamespaceMap, ATOM, GEORSS, GML, OPENSEARCH};

const RESERVED: [&str; 4] = ["", "georss", "gml", "os"];

/// Atom feed with OpenSearch, GeoRSS and GML time extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomResultFormat;

impl AtomResultFormat {
    fn namespaces() -> NamespaceMap {
        NamespaceMap::from_namespaces(&[
            Namespace::new("", ATOM.uri),
            GEORSS,
            GML,
            OPENSEARCH,
        ])
    }

    /// Encode a single `<entry>`. `feed_updated` stands in for items without time.
    pub fn encode_entry(
        &self,
        request: &OwsRequest,
        item: &ResultItem,
        feed_updated: DateTime<Utc>,
    ) -> XmlElement {
        let describe = feed::describe_coverage_url(request, item);
        let updated = item.end_time.or(item.begin_time).unwrap_or(feed_updated);

        let mut entry = XmlElement::new("entry")
            .child(XmlElement::text_element("id", describe.as_str()))
            .child(XmlElement::text_element("title", item.identifier.as_str()))
            .child(XmlElement::text_element("updated", format_iso8601(&updated)))
            .child(
                XmlElement::new("link")
                    .attr("rel", "alternate")
                    .attr("href", describe),
            )
            .child(
                XmlElement::new("link")
                    .attr("rel", "enclosure")
                    .attr("href", feed::get_coverage_url(request, item)),
            );

        if let Some(bbox) = feed::georss_box(item) {
            entry.push(bbox);
        }
        if let Some(period) = feed::time_period(item) {
            entry.push(period);
        }
        entry
    }
}

impl ResultFormat for AtomResultFormat {
    fn name(&self) -> &'static str {
        "atom"
    }

    fn mimetype(&self) -> &'static str {
        media_types::ATOM
    }

    fn encode(
        &self,
        request: &OwsRequest,
        collection_id: &str,
        items: &[ResultItem],
        context: &SearchContext,
    ) -> OwsResult<Vec<u8>> {
        let namespaces = feed::prepare(&Self::namespaces(), &RESERVED, items, context)?;
        debug!(collection_id, items = items.len(), "Encoding Atom feed");

        let mut root = XmlElement::new("feed");
        for (name, uri) in namespaces.declarations() {
            root = root.attr(name, uri);
        }
        // Most recent item timestamp, else the time of encoding.
        let updated = items
            .iter()
            .filter_map(|item| item.end_time.or(item.begin_time))
            .max()
            .unwrap_or_else(Utc::now);

        root.child(XmlElement::text_element("id", request.absolute_uri()))
            .child(XmlElement::text_element(
                "title",
                format!("{} Search", collection_id),
            ))
            .child(XmlElement::text_element("updated", format_iso8601(&updated)))
            .children(feed::opensearch_elements(context))
            .children(feed::feed_links(request, context, "link"))
            .children(
                items
                    .iter()
                    .map(|item| self.encode_entry(request, item, updated)),
            )
            .to_pretty_bytes()
    }
}
