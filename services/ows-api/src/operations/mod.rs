//! OWS operation handlers and registry assembly.

pub mod opensearch;
pub mod wcs;

use std::sync::Arc;

use opensearch_protocol::FormatRegistry;
use ows_common::OwsResult;
use ows_protocol::{
    CapabilityDescriptor, CapabilityRegistry, ExceptionFormat, ExceptionMapper,
};
use tracing::info;

use crate::catalog::Catalog;
use crate::config::{ExceptionFlavour, ExceptionSettings, OwsConfig};
use crate::metrics;

use opensearch::{SearchHandler, OPENSEARCH_SERVICE, OPENSEARCH_VERSION};
use wcs::{DescribeCoverageHandler, GetCapabilitiesHandler, WCS_VERSION};

/// Register every operation this service answers and freeze the registry.
///
/// Fails on a duplicate registration; callers treat that as fatal.
pub fn build_registry(
    config: &OwsConfig,
    catalog: Arc<Catalog>,
    formats: FormatRegistry,
) -> OwsResult<CapabilityRegistry> {
    let mut builder = CapabilityRegistry::builder();

    builder
        .register(
            CapabilityDescriptor::any_version("WCS", "GetCapabilities"),
            Arc::new(GetCapabilitiesHandler::new(
                Arc::clone(&catalog),
                config.service.clone(),
            )),
        )?
        .register(
            CapabilityDescriptor::new("WCS", WCS_VERSION, "DescribeCoverage"),
            Arc::new(DescribeCoverageHandler::new(Arc::clone(&catalog))),
        )?
        .register(
            CapabilityDescriptor::new(OPENSEARCH_SERVICE, OPENSEARCH_VERSION, "Search"),
            Arc::new(SearchHandler::new(
                catalog,
                formats,
                config.opensearch.clone(),
            )),
        )?
        .default_version("WCS", WCS_VERSION)
        .default_version(OPENSEARCH_SERVICE, OPENSEARCH_VERSION);

    let registry = builder.build();
    info!(capabilities = registry.len(), "Capability registry frozen");
    Ok(registry)
}

/// Exception mapper from configuration, counting every fault it renders.
pub fn build_exception_mapper(settings: &ExceptionSettings) -> ExceptionMapper {
    let mut mapper = ExceptionMapper::new(exception_format(settings.default))
        .with_fault_hook(Arc::new(|report: &ows_protocol::ExceptionReport| {
            metrics::record_exception(&report.code)
        }));
    for (service, flavour) in &settings.services {
        mapper = mapper.with_service_format(service, exception_format(*flavour));
    }
    mapper
}

fn exception_format(flavour: ExceptionFlavour) -> ExceptionFormat {
    match flavour {
        ExceptionFlavour::Ows20 => ExceptionFormat::Ows20,
        ExceptionFlavour::Ows11 => ExceptionFormat::Ows11,
        ExceptionFlavour::Wms130 => ExceptionFormat::Wms130,
        ExceptionFlavour::Json => ExceptionFormat::Json,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contents() {
        let registry = build_registry(
            &OwsConfig::default(),
            Arc::new(Catalog::default()),
            FormatRegistry::with_defaults(),
        )
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.default_version("wcs"), Some("2.0.1"));
        assert!(registry.resolve("WCS", None, "DescribeCoverage").is_ok());
        assert!(registry.resolve("WCS", Some("1.0.0"), "GetCapabilities").is_ok());
        assert!(registry.resolve("WCS", Some("1.0.0"), "DescribeCoverage").is_err());
        assert!(registry
            .resolve("opensearch", None, "search")
            .is_ok());
        assert!(registry.versions_for("WCS", "GetCapabilities").is_empty());
        assert_eq!(registry.versions_for("WCS", "DescribeCoverage"), vec!["2.0.1"]);
    }

    #[test]
    fn test_exception_mapper_overrides() {
        let mut settings = ExceptionSettings::default();
        settings
            .services
            .insert("WMS".to_string(), ExceptionFlavour::Wms130);
        let mapper = build_exception_mapper(&settings);

        let request =
            ows_protocol::OwsRequest::get("http://localhost", "service=wms&request=GetMap");
        assert_eq!(mapper.format_for(&request), ExceptionFormat::Wms130);
    }
}
