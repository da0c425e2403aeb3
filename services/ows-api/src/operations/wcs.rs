//! WCS 2.0.1 GetCapabilities and DescribeCoverage.

use std::sync::Arc;

use async_trait::async_trait;
use ows_common::{OwsError, OwsResult};
use ows_protocol::{namespaces, OwsHandler, OwsRequest, ResultShape, XmlElement, OWS_PATH};
use tracing::instrument;

use crate::catalog::{Catalog, Coverage};
use crate::config::ServiceInfo;

pub const WCS_VERSION: &str = "2.0.1";

const GMLCOV: &str = "http://www.opengis.net/gmlcov/1.0";
const SWE: &str = "http://www.opengis.net/swe/2.0";
const EPSG_4326: &str = "http://www.opengis.net/def/crs/EPSG/0/4326";

/// Operations advertised in the capabilities document.
const OPERATIONS: [&str; 2] = ["GetCapabilities", "DescribeCoverage"];

/// GetCapabilities, answered for any requested version.
pub struct GetCapabilitiesHandler {
    catalog: Arc<Catalog>,
    service: ServiceInfo,
}

impl GetCapabilitiesHandler {
    pub fn new(catalog: Arc<Catalog>, service: ServiceInfo) -> Self {
        Self { catalog, service }
    }

    fn service_identification(&self) -> XmlElement {
        XmlElement::new("ows:ServiceIdentification")
            .child(XmlElement::text_element("ows:Title", self.service.title.as_str()))
            .child(XmlElement::text_element(
                "ows:Abstract",
                self.service.abstract_.as_str(),
            ))
            .child(XmlElement::text_element("ows:ServiceType", "OGC WCS"))
            .child(XmlElement::text_element("ows:ServiceTypeVersion", WCS_VERSION))
    }

    fn operations_metadata(&self, request: &OwsRequest) -> XmlElement {
        let href = format!("{}?", request.build_absolute_uri(OWS_PATH, &[]));
        XmlElement::new("ows:OperationsMetadata").children(OPERATIONS.iter().map(|name| {
            XmlElement::new("ows:Operation").attr("name", *name).child(
                XmlElement::new("ows:DCP").child(
                    XmlElement::new("ows:HTTP")
                        .child(XmlElement::new("ows:Get").attr("xlink:href", href.as_str()))
                        .child(XmlElement::new("ows:Post").attr("xlink:href", href.as_str())),
                ),
            )
        }))
    }

    fn coverage_summary(&self, coverage: &Coverage) -> XmlElement {
        let mut summary = XmlElement::new("wcs:CoverageSummary");
        if let Some(title) = self.catalog.collection_title(&coverage.collection) {
            summary.push(XmlElement::text_element("ows:Title", title));
        }
        summary = summary
            .child(XmlElement::text_element("wcs:CoverageId", coverage.id.as_str()))
            .child(XmlElement::text_element(
                "wcs:CoverageSubtype",
                "RectifiedGridCoverage",
            ));
        if let Some(extent) = &coverage.extent {
            summary.push(
                XmlElement::new("ows:WGS84BoundingBox")
                    .child(XmlElement::text_element(
                        "ows:LowerCorner",
                        format!("{} {}", extent.min_x, extent.min_y),
                    ))
                    .child(XmlElement::text_element(
                        "ows:UpperCorner",
                        format!("{} {}", extent.max_x, extent.max_y),
                    )),
            );
        }
        summary
    }
}

#[async_trait]
impl OwsHandler for GetCapabilitiesHandler {
    #[instrument(skip_all, fields(coverages = self.catalog.len()))]
    async fn handle(&self, request: &OwsRequest) -> OwsResult<ResultShape> {
        let mut provider = XmlElement::new("ows:ServiceProvider");
        if !self.service.provider.is_empty() {
            provider.push(XmlElement::text_element(
                "ows:ProviderName",
                self.service.provider.as_str(),
            ));
        }

        let document = XmlElement::new("wcs:Capabilities")
            .attr("xmlns:wcs", namespaces::WCS_20)
            .attr("xmlns:ows", namespaces::OWS_20)
            .attr("xmlns:xlink", namespaces::XLINK)
            .attr("version", WCS_VERSION)
            .child(self.service_identification())
            .child(provider)
            .child(self.operations_metadata(request))
            .child(
                XmlElement::new("wcs:Contents")
                    .children(
                        self.catalog
                            .coverages()
                            .map(|coverage| self.coverage_summary(coverage)),
                    ),
            );

        Ok(ResultShape::xml(document.to_pretty_bytes()?))
    }
}

/// DescribeCoverage for one or more comma-separated coverage ids.
pub struct DescribeCoverageHandler {
    catalog: Arc<Catalog>,
}

impl DescribeCoverageHandler {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn describe(coverage: &Coverage) -> XmlElement {
        let mut description = XmlElement::new("wcs:CoverageDescription")
            .attr("gml:id", coverage.id.as_str());

        if let Some(extent) = &coverage.extent {
            let (lower, upper) = extent.lat_lon_corners();
            description.push(
                XmlElement::new("gml:boundedBy").child(
                    XmlElement::new("gml:Envelope")
                        .attr("srsName", EPSG_4326)
                        .attr("axisLabels", "Lat Long")
                        .attr("uomLabels", "deg deg")
                        .attr("srsDimension", "2")
                        .child(XmlElement::text_element("gml:lowerCorner", lower))
                        .child(XmlElement::text_element("gml:upperCorner", upper)),
                ),
            );
        }

        description.push(XmlElement::text_element(
            "wcs:CoverageId",
            coverage.id.as_str(),
        ));

        if let Some([columns, rows]) = coverage.size {
            let high = format!(
                "{} {}",
                rows.saturating_sub(1),
                columns.saturating_sub(1)
            );
            description.push(
                XmlElement::new("gml:domainSet").child(
                    XmlElement::new("gml:RectifiedGrid")
                        .attr("gml:id", format!("{}_grid", coverage.id))
                        .attr("dimension", "2")
                        .child(
                            XmlElement::new("gml:limits").child(
                                XmlElement::new("gml:GridEnvelope")
                                    .child(XmlElement::text_element("gml:low", "0 0"))
                                    .child(XmlElement::text_element("gml:high", high)),
                            ),
                        )
                        .child(XmlElement::text_element("gml:axisLabels", "Lat Long")),
                ),
            );
        }

        description.push(
            XmlElement::new("gmlcov:rangeType").child(
                XmlElement::new("swe:DataRecord").children(
                    coverage
                        .bands
                        .iter()
                        .map(|band| XmlElement::new("swe:field").attr("name", band.as_str())),
                ),
            ),
        );

        description.push(
            XmlElement::new("wcs:ServiceParameters")
                .child(XmlElement::text_element(
                    "wcs:CoverageSubtype",
                    "RectifiedGridCoverage",
                ))
                .child(XmlElement::text_element(
                    "wcs:nativeFormat",
                    "image/tiff",
                )),
        );
        description
    }
}

#[async_trait]
impl OwsHandler for DescribeCoverageHandler {
    #[instrument(skip_all, fields(coverage_id = request.param("coverageId").unwrap_or("-")))]
    async fn handle(&self, request: &OwsRequest) -> OwsResult<ResultShape> {
        let ids = request
            .param("coverageId")
            .ok_or_else(|| OwsError::MissingParameter("coverageId".to_string()))?;

        let coverages = ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                self.catalog
                    .coverage(id)
                    .ok_or_else(|| OwsError::NoSuchCoverage(id.to_string()))
            })
            .collect::<OwsResult<Vec<_>>>()?;
        if coverages.is_empty() {
            return Err(OwsError::MissingParameter("coverageId".to_string()));
        }

        let document = XmlElement::new("wcs:CoverageDescriptions")
            .attr("xmlns:wcs", namespaces::WCS_20)
            .attr("xmlns:gml", namespaces::GML_32)
            .attr("xmlns:gmlcov", GMLCOV)
            .attr("xmlns:swe", SWE)
            .children(coverages.into_iter().map(Self::describe));

        Ok(ResultShape::xml(document.to_pretty_bytes()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectionConfig, CoverageConfig};
    use ows_protocol::{normalize, OwsResponse};

    fn catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::from_config(&[CollectionConfig {
                id: "s2".to_string(),
                title: "Sentinel-2".to_string(),
                coverages: vec![CoverageConfig {
                    id: "S2A_1".to_string(),
                    bbox: Some([10.0, 20.0, 30.0, 40.0]),
                    footprint: None,
                    begin_time: None,
                    end_time: None,
                    size: Some([100, 50]),
                    bands: vec!["B04".to_string()],
                }],
            }])
            .unwrap(),
        )
    }

    async fn run(handler: &dyn OwsHandler, query: &str) -> OwsResult<OwsResponse> {
        let request = OwsRequest::get("http://localhost:8080", query);
        let shape = handler.handle(&request).await?;
        normalize(shape, 200)
    }

    #[tokio::test]
    async fn test_describe_coverage() {
        let handler = DescribeCoverageHandler::new(catalog());
        let response = run(&handler, "service=WCS&request=DescribeCoverage&coverageId=S2A_1")
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "application/xml");

        let body = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(body.contains(r#"<wcs:CoverageDescription gml:id="S2A_1">"#));
        assert!(body.contains("<gml:lowerCorner>20 10</gml:lowerCorner>"));
        assert!(body.contains("<gml:upperCorner>40 30</gml:upperCorner>"));
        assert!(body.contains("<gml:high>49 99</gml:high>"));
        assert!(body.contains(r#"<swe:field name="B04"/>"#));
    }

    #[tokio::test]
    async fn test_describe_unknown_coverage() {
        let handler = DescribeCoverageHandler::new(catalog());
        let err = run(&handler, "coverageId=S2A_1,nope").await.unwrap_err();
        assert!(matches!(err, OwsError::NoSuchCoverage(ref id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_describe_requires_coverage_id() {
        let handler = DescribeCoverageHandler::new(catalog());
        for query in ["request=DescribeCoverage", "coverageId=,"] {
            let err = run(&handler, query).await.unwrap_err();
            assert!(matches!(err, OwsError::MissingParameter(ref p) if p == "coverageId"));
        }
    }

    #[tokio::test]
    async fn test_capabilities_lists_coverages() {
        let handler = GetCapabilitiesHandler::new(catalog(), ServiceInfo::default());
        let response = run(&handler, "service=WCS&request=GetCapabilities").await.unwrap();
        let body = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(body.contains(r#"version="2.0.1""#));
        assert!(body.contains("<wcs:CoverageId>S2A_1</wcs:CoverageId>"));
        assert!(body.contains("<ows:Title>Sentinel-2</ows:Title>"));
        assert!(body.contains("<ows:LowerCorner>10 20</ows:LowerCorner>"));
        assert!(body.contains(r#"xlink:href="http://localhost:8080/ows?""#));
    }
}
