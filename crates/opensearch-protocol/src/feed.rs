//! Building blocks shared by the XML feed formats.

use ows_common::{format_iso8601, OwsError, OwsResult};
use ows_protocol::{OwsRequest, XmlElement, OWS_PATH};

use crate::context::SearchContext;
use crate::item::ResultItem;
use crate::namespaces::{NamespaceMap, GEORSS, GML, OPENSEARCH};

/// Query parameter carrying the page offset.
pub const START_INDEX_PARAM: &str = "startIndex";
/// Query parameter carrying the page size.
pub const COUNT_PARAM: &str = "count";

/// Merge a format's own bindings with the context's and check every item.
///
/// Every parameter extension must name a bound, non-default prefix, since
/// its parameters are written as `{prefix}:{name}` attributes.
pub fn prepare(
    own: &NamespaceMap,
    reserved: &[&str],
    items: &[ResultItem],
    context: &SearchContext,
) -> OwsResult<NamespaceMap> {
    let namespaces = own.merged(&context.namespaces, reserved)?;
    if let Some(unbound) = context
        .parameters
        .keys()
        .find(|prefix| prefix.is_empty() || namespaces.get(prefix).is_none())
    {
        return Err(OwsError::UnsupportedContext(format!(
            "parameter extension '{}' has no namespace binding",
            unbound
        )));
    }
    for item in items {
        item.validate()?;
    }
    Ok(namespaces)
}

/// `os:totalResults`, `os:itemsPerPage`, `os:startIndex` and the echoed query.
pub fn opensearch_elements(context: &SearchContext) -> Vec<XmlElement> {
    let mut query = XmlElement::new(OPENSEARCH.qname("Query"))
        .attr("role", "request")
        .attr(COUNT_PARAM, context.items_per_page.to_string())
        .attr(START_INDEX_PARAM, context.start_index.to_string());
    for (extension, params) in &context.parameters {
        for (name, value) in params {
            query = query.attr(format!("{}:{}", extension, name), value.as_str());
        }
    }

    vec![
        XmlElement::text_element(
            OPENSEARCH.qname("totalResults"),
            context.total_results.to_string(),
        ),
        XmlElement::text_element(
            OPENSEARCH.qname("itemsPerPage"),
            context.items_per_page.to_string(),
        ),
        XmlElement::text_element(
            OPENSEARCH.qname("startIndex"),
            context.start_index.to_string(),
        ),
        query,
    ]
}

/// Navigation links: self, first, previous, next and last page.
///
/// `link_name` is the qualified element name, since RSS borrows the Atom
/// element while Atom uses its own default namespace.
pub fn feed_links(request: &OwsRequest, context: &SearchContext, link_name: &str) -> Vec<XmlElement> {
    let paging = context.paging();
    let page = |rel: &str, start: usize| {
        XmlElement::new(link_name)
            .attr("rel", rel)
            .attr(
                "href",
                request.absolute_uri_with(START_INDEX_PARAM, &start.to_string()),
            )
    };

    let mut links = vec![XmlElement::new(link_name)
        .attr("rel", "self")
        .attr("href", request.absolute_uri())];
    links.push(page("first", paging.first));
    if let Some(previous) = paging.previous {
        links.push(page("previous", previous));
    }
    if let Some(next) = paging.next {
        links.push(page("next", next));
    }
    links.push(page("last", paging.last));
    links
}

/// WCS DescribeCoverage URL for an item.
pub fn describe_coverage_url(request: &OwsRequest, item: &ResultItem) -> String {
    request.build_absolute_uri(
        OWS_PATH,
        &[
            ("service", "WCS"),
            ("version", "2.0.1"),
            ("request", "DescribeCoverage"),
            ("coverageId", item.identifier.as_str()),
        ],
    )
}

/// WCS GetCoverage URL for an item.
pub fn get_coverage_url(request: &OwsRequest, item: &ResultItem) -> String {
    request.build_absolute_uri(
        OWS_PATH,
        &[
            ("service", "WCS"),
            ("version", "2.0.1"),
            ("request", "GetCoverage"),
            ("coverageId", item.identifier.as_str()),
        ],
    )
}

/// `georss:box` in south west north east order.
pub fn georss_box(item: &ResultItem) -> Option<XmlElement> {
    let extent = item.extent_wgs84()?;
    Some(XmlElement::text_element(
        GEORSS.qname("box"),
        extent.georss_box(),
    ))
}

/// `gml:TimePeriod`, only when the item has both begin and end.
pub fn time_period(item: &ResultItem) -> Option<XmlElement> {
    let period = item.time_period()?;
    Some(
        XmlElement::new(GML.qname("TimePeriod"))
            .attr(GML.qname("id"), item.identifier.as_str())
            .child(XmlElement::text_element(
                GML.qname("beginPosition"),
                format_iso8601(&period.begin),
            ))
            .child(XmlElement::text_element(
                GML.qname("endPosition"),
                format_iso8601(&period.end),
            )),
    )
}
