//! Request dispatcher: resolve, invoke, map faults, normalize.

use std::sync::Arc;

use ows_common::{OwsError, OwsResult};
use tracing::{error, info_span, Instrument};

use crate::exceptions::{ExceptionMapper, DEFAULT_FAULT_STATUS};
use crate::handler::OwsHandler;
use crate::normalize::normalize;
use crate::registry::CapabilityRegistry;
use crate::request::OwsRequest;
use crate::response::{OwsResponse, ResultShape};

/// Default status for successful handler results without an explicit status.
pub const DEFAULT_SUCCESS_STATUS: u16 = 200;

/// Routes requests through the capability registry.
///
/// [`Dispatcher::dispatch`] is total: every outcome, including resolution
/// failures, handler errors and malformed handler results, becomes a response.
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    exceptions: ExceptionMapper,
}

impl Dispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>, exceptions: ExceptionMapper) -> Self {
        Self {
            registry,
            exceptions,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Serve one request.
    pub async fn dispatch(&self, request: &OwsRequest) -> OwsResponse {
        let span = info_span!(
            "ows_dispatch",
            method = request.method(),
            service = request.service().unwrap_or("-"),
            version = request.version().unwrap_or("-"),
            operation = request.operation().unwrap_or("-"),
        );

        async {
            let (shape, default_status) = match self.invoke(request).await {
                Ok(shape) => (shape, DEFAULT_SUCCESS_STATUS),
                Err(err) => (
                    self.exceptions.map_exception(request, &err),
                    DEFAULT_FAULT_STATUS,
                ),
            };

            match normalize(shape, default_status) {
                Ok(response) => response,
                Err(err) => self.contract_violation(request, &err),
            }
        }
        .instrument(span)
        .await
    }

    async fn invoke(&self, request: &OwsRequest) -> OwsResult<ResultShape> {
        let service = request
            .service()
            .ok_or_else(|| OwsError::MissingParameter("service".to_string()))?;
        let operation = request
            .operation()
            .ok_or_else(|| OwsError::MissingParameter("request".to_string()))?;

        let handler = self.resolve(service, request.version(), operation)?;
        handler.handle(request).await
    }

    /// Resolve, refining a miss: a known operation asked for at an explicit
    /// but unregistered version is a version negotiation failure, and an
    /// operation a known service does not offer at all is `OperationNotFound`.
    fn resolve(
        &self,
        service: &str,
        version: Option<&str>,
        operation: &str,
    ) -> OwsResult<Arc<dyn OwsHandler>> {
        self.registry
            .resolve(service, version, operation)
            .map_err(|err| match (err, version) {
                (OwsError::UnknownCapability { .. }, Some(version))
                    if !self.registry.versions_for(service, operation).is_empty() =>
                {
                    OwsError::UnsupportedVersion {
                        service: service.to_string(),
                        version: version.to_string(),
                    }
                }
                (OwsError::UnknownCapability { .. }, _)
                    if self.lacks_operation(service, operation) =>
                {
                    OwsError::OperationNotFound(operation.to_string())
                }
                (err, _) => err,
            })
    }

    fn lacks_operation(&self, service: &str, operation: &str) -> bool {
        let operations = self.registry.operations_for(service);
        !operations.is_empty()
            && !operations
                .iter()
                .any(|known| known.eq_ignore_ascii_case(operation))
    }

    fn contract_violation(&self, request: &OwsRequest, err: &OwsError) -> OwsResponse {
        error!(
            error = %err,
            operation = request.operation().unwrap_or("-"),
            "Handler broke the result contract"
        );
        let shape = self.exceptions.map_exception(request, err);
        let status = err.http_status_code();
        normalize(shape, status).unwrap_or_else(|_| {
            OwsResponse::new("Internal server error", "text/plain", status)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityDescriptor;
    use async_trait::async_trait;

    struct Fixed(ResultShape);

    #[async_trait]
    impl OwsHandler for Fixed {
        async fn handle(&self, _request: &OwsRequest) -> OwsResult<ResultShape> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl OwsHandler for Failing {
        async fn handle(&self, request: &OwsRequest) -> OwsResult<ResultShape> {
            Err(OwsError::InvalidParameter {
                param: "coverageId".to_string(),
                message: format!("bad value {:?}", request.param("coverageId")),
            })
        }
    }

    fn dispatcher() -> Dispatcher {
        let mut builder = CapabilityRegistry::builder();
        builder
            .register(
                CapabilityDescriptor::new("WCS", "2.0.1", "DescribeCoverage"),
                Arc::new(Fixed(ResultShape::body("<desc/>", "application/gml+xml"))),
            )
            .unwrap()
            .register(
                CapabilityDescriptor::new("WCS", "2.0.1", "GetCoverage"),
                Arc::new(Failing),
            )
            .unwrap()
            .register(
                CapabilityDescriptor::new("WCS", "2.0.1", "Broken"),
                Arc::new(Fixed(ResultShape::body("oops", ""))),
            )
            .unwrap();
        Dispatcher::new(Arc::new(builder.build()), ExceptionMapper::default())
    }

    fn get(query: &str) -> OwsRequest {
        OwsRequest::get("http://localhost:8080", query)
    }

    #[tokio::test]
    async fn test_success_defaults_to_200() {
        let response = dispatcher()
            .dispatch(&get("service=WCS&version=2.0.1&request=DescribeCoverage"))
            .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "application/gml+xml");
        assert_eq!(&response.body[..], b"<desc/>");
    }

    #[tokio::test]
    async fn test_handler_error_defaults_to_400() {
        let response = dispatcher()
            .dispatch(&get("service=WCS&version=2.0.1&request=GetCoverage"))
            .await;
        assert_eq!(response.status, 400);
        let body = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(body.contains(r#"exceptionCode="InvalidParameterValue""#));
        assert!(body.contains(r#"locator="coverageId""#));
    }

    #[tokio::test]
    async fn test_missing_service() {
        let response = dispatcher().dispatch(&get("request=GetCapabilities")).await;
        assert_eq!(response.status, 400);
        let body = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(body.contains(r#"exceptionCode="MissingParameterValue""#));
        assert!(body.contains(r#"locator="service""#));
    }

    #[tokio::test]
    async fn test_unknown_version_is_version_negotiation_failure() {
        let response = dispatcher()
            .dispatch(&get("service=WCS&version=1.0.0&request=DescribeCoverage"))
            .await;
        assert_eq!(response.status, 400);
        let body = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(body.contains(r#"exceptionCode="VersionNegotiationFailed""#));
    }

    #[tokio::test]
    async fn test_broken_shape_becomes_internal_fault() {
        let response = dispatcher()
            .dispatch(&get("service=WCS&version=2.0.1&request=Broken"))
            .await;
        assert_eq!(response.status, 500);
        let body = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(body.contains(r#"exceptionCode="NoApplicableCode""#));
        assert!(!body.contains("empty content type"));
    }

    #[test]
    fn test_unoffered_operation_of_known_service() {
        let dispatcher = dispatcher();
        let err = dispatcher.resolve("wcs", Some("2.0.1"), "GetSomething").err();
        assert!(matches!(err, Some(OwsError::OperationNotFound(ref op)) if op == "GetSomething"));

        let err = dispatcher.resolve("WMS", None, "GetMap").err();
        assert!(matches!(err, Some(OwsError::UnknownCapability { .. })));
    }
}
