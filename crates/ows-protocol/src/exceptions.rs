//! OWS exception reports.
//!
//! Errors are classified by [`OwsError::exception_code`]; the resulting
//! [`ExceptionReport`] is rendered in the exception flavour of the service the
//! request addressed, or as JSON when the client asked for it via the
//! `EXCEPTIONS` parameter. Unclassified errors never expose their message:
//! it is logged under a fresh correlation id and only that id is returned.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ows_common::OwsError;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::request::OwsRequest;
use crate::response::ResultShape;
use crate::xml::XmlElement;
use crate::{media_types, namespaces};

/// Status applied by the dispatcher when a fault does not override it.
pub const DEFAULT_FAULT_STATUS: u16 = 400;

/// A classified, client-safe description of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionReport {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(rename = "description")]
    pub message: String,
    #[serde(rename = "correlationId", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip)]
    pub status: u16,
}

impl ExceptionReport {
    /// Classify an error. Internal errors are logged here with their detail.
    pub fn from_error(err: &OwsError) -> Self {
        if err.is_internal() {
            let correlation_id = Uuid::new_v4().to_string();
            error!(
                correlation_id = %correlation_id,
                error = %err,
                "Internal error while handling OWS request"
            );
            return Self {
                code: err.exception_code().to_string(),
                locator: None,
                message: format!(
                    "An internal error occurred. Reference: {}",
                    correlation_id
                ),
                correlation_id: Some(correlation_id),
                status: err.http_status_code(),
            };
        }

        warn!(code = err.exception_code(), error = %err, "OWS request failed");
        Self {
            code: err.exception_code().to_string(),
            locator: err.locator().map(str::to_string),
            message: err.to_string(),
            correlation_id: None,
            status: err.http_status_code(),
        }
    }
}

/// Concrete syntax of a fault document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExceptionFormat {
    /// OWS Common 2.0 `ows:ExceptionReport` (WCS 2.0, OpenSearch).
    #[default]
    Ows20,
    /// OWS Common 1.1 `ows:ExceptionReport` (WCS 1.1, WMTS).
    Ows11,
    /// WMS 1.3.0 `ServiceExceptionReport`.
    Wms130,
    /// JSON object with code, locator and description.
    Json,
}

impl ExceptionFormat {
    /// Parse the value of an `EXCEPTIONS` request parameter.
    pub fn from_exceptions_param(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" | "application/json" => Some(ExceptionFormat::Json),
            "xml" | "application/xml" | "text/xml" => Some(ExceptionFormat::Ows20),
            "application/vnd.ogc.se_xml" => Some(ExceptionFormat::Wms130),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExceptionFormat::Json => media_types::JSON,
            _ => media_types::XML,
        }
    }

    /// Render a report into a result shape.
    ///
    /// The default fault status is left to the dispatcher; any other status
    /// is carried explicitly.
    pub fn render(&self, report: &ExceptionReport) -> ResultShape {
        let body = match self {
            ExceptionFormat::Ows20 => ows_report(report, namespaces::OWS_20, "2.0.0"),
            ExceptionFormat::Ows11 => ows_report(report, namespaces::OWS_11, "1.1.0"),
            ExceptionFormat::Wms130 => wms_report(report),
            ExceptionFormat::Json => json_report(report),
        };

        if report.status == DEFAULT_FAULT_STATUS {
            ResultShape::body(body, self.content_type())
        } else {
            ResultShape::with_status(body, self.content_type(), report.status)
        }
    }
}

const FALLBACK_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?><ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/2.0" version="2.0.0"><ows:Exception exceptionCode="NoApplicableCode"/></ows:ExceptionReport>"#;

fn ows_report(report: &ExceptionReport, namespace: &str, version: &str) -> Vec<u8> {
    let mut exception =
        XmlElement::new("ows:Exception").attr("exceptionCode", report.code.as_str());
    if let Some(locator) = &report.locator {
        exception = exception.attr("locator", locator.as_str());
    }
    let exception = exception.child(XmlElement::text_element(
        "ows:ExceptionText",
        report.message.as_str(),
    ));

    XmlElement::new("ows:ExceptionReport")
        .attr("xmlns:ows", namespace)
        .attr("version", version)
        .attr("xml:lang", "en")
        .child(exception)
        .to_pretty_bytes()
        .unwrap_or_else(|_| FALLBACK_REPORT.as_bytes().to_vec())
}

fn wms_report(report: &ExceptionReport) -> Vec<u8> {
    let mut exception =
        XmlElement::text_element("ServiceException", report.message.as_str())
            .attr("code", report.code.as_str());
    if let Some(locator) = &report.locator {
        exception = exception.attr("locator", locator.as_str());
    }

    XmlElement::new("ServiceExceptionReport")
        .attr("xmlns", namespaces::OGC)
        .attr("version", "1.3.0")
        .child(exception)
        .to_pretty_bytes()
        .unwrap_or_else(|_| FALLBACK_REPORT.as_bytes().to_vec())
}

fn json_report(report: &ExceptionReport) -> Vec<u8> {
    serde_json::to_vec_pretty(report).unwrap_or_else(|_| br#"{"code":"NoApplicableCode"}"#.to_vec())
}

/// Callback invoked with every report the mapper renders.
pub type FaultHook = Arc<dyn Fn(&ExceptionReport) + Send + Sync>;

/// Maps errors raised during dispatch to fault documents.
#[derive(Clone, Default)]
pub struct ExceptionMapper {
    per_service: HashMap<String, ExceptionFormat>,
    default_format: ExceptionFormat,
    on_fault: Option<FaultHook>,
}

impl fmt::Debug for ExceptionMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionMapper")
            .field("per_service", &self.per_service)
            .field("default_format", &self.default_format)
            .field("on_fault", &self.on_fault.is_some())
            .finish()
    }
}

impl ExceptionMapper {
    pub fn new(default_format: ExceptionFormat) -> Self {
        Self {
            per_service: HashMap::new(),
            default_format,
            on_fault: None,
        }
    }

    /// Observe every rendered fault, e.g. to count fault codes.
    pub fn with_fault_hook(mut self, hook: FaultHook) -> Self {
        self.on_fault = Some(hook);
        self
    }

    /// Use `format` for faults on requests addressed to `service`.
    pub fn with_service_format(mut self, service: &str, format: ExceptionFormat) -> Self {
        self.per_service
            .insert(service.to_ascii_uppercase(), format);
        self
    }

    /// Pick the fault syntax for a request.
    pub fn format_for(&self, request: &OwsRequest) -> ExceptionFormat {
        if let Some(format) = request
            .param("exceptions")
            .and_then(ExceptionFormat::from_exceptions_param)
        {
            return format;
        }
        request
            .service()
            .and_then(|s| self.per_service.get(&s.to_ascii_uppercase()).copied())
            .unwrap_or(self.default_format)
    }

    /// Produce the fault result shape for an error raised while serving `request`.
    pub fn map_exception(&self, request: &OwsRequest, err: &OwsError) -> ResultShape {
        let report = ExceptionReport::from_error(err);
        if let Some(hook) = &self.on_fault {
            hook(&report);
        }
        self.format_for(request).render(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(shape: &ResultShape) -> String {
        match shape {
            ResultShape::BodyType { body, .. } | ResultShape::BodyTypeStatus { body, .. } => {
                String::from_utf8(body.to_vec()).unwrap()
            }
            ResultShape::Prebuilt(_) => panic!("mapper never prebuilds"),
        }
    }

    #[test]
    fn test_classified_error_report() {
        let err = OwsError::MissingParameter("coverageId".to_string());
        let report = ExceptionReport::from_error(&err);
        assert_eq!(report.code, "MissingParameterValue");
        assert_eq!(report.locator.as_deref(), Some("coverageId"));
        assert!(report.message.contains("coverageId"));
        assert!(report.correlation_id.is_none());
    }

    #[test]
    fn test_internal_error_is_withheld() {
        let err = OwsError::InternalError("connection to 10.0.0.5 refused".to_string());
        let report = ExceptionReport::from_error(&err);
        assert_eq!(report.code, "NoApplicableCode");
        assert!(!report.message.contains("10.0.0.5"));
        let id = report.correlation_id.clone().unwrap();
        assert!(report.message.contains(&id));
        assert_eq!(report.status, 500);

        let body = body_of(&ExceptionFormat::Ows20.render(&report));
        assert!(!body.contains("10.0.0.5"));
        assert!(body.contains(&id));
    }

    #[test]
    fn test_ows20_rendering() {
        let err = OwsError::OperationNotFound("GetFoo".to_string());
        let shape = ExceptionFormat::Ows20.render(&ExceptionReport::from_error(&err));
        assert!(matches!(shape, ResultShape::BodyType { ref content_type, .. } if content_type == "application/xml"));
        let body = body_of(&shape);
        assert!(body.contains(r#"xmlns:ows="http://www.opengis.net/ows/2.0""#));
        assert!(body.contains(r#"exceptionCode="OperationNotSupported""#));
        assert!(body.contains(r#"locator="GetFoo""#));
    }

    #[test]
    fn test_status_override_is_explicit() {
        let err = OwsError::NoSuchCoverage("missing".to_string());
        let shape = ExceptionFormat::Ows20.render(&ExceptionReport::from_error(&err));
        assert!(matches!(shape, ResultShape::BodyTypeStatus { status: 404, .. }));
    }

    #[test]
    fn test_wms_rendering() {
        let err = OwsError::InvalidParameter {
            param: "bbox".to_string(),
            message: "bad".to_string(),
        };
        let body = body_of(&ExceptionFormat::Wms130.render(&ExceptionReport::from_error(&err)));
        assert!(body.contains("<ServiceExceptionReport"));
        assert!(body.contains(r#"code="InvalidParameterValue""#));
    }

    #[test]
    fn test_json_rendering() {
        let err = OwsError::UnsupportedFormat("pdf".to_string());
        let body = body_of(&ExceptionFormat::Json.render(&ExceptionReport::from_error(&err)));
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["code"], "InvalidFormat");
        assert_eq!(value["locator"], "format");
        assert!(value.get("status").is_none());
        assert!(value.get("correlationId").is_none());
    }

    #[test]
    fn test_mapper_format_selection() {
        let mapper = ExceptionMapper::default().with_service_format("wms", ExceptionFormat::Wms130);

        let wms = OwsRequest::get("http://localhost", "service=WMS&request=GetMap");
        assert_eq!(mapper.format_for(&wms), ExceptionFormat::Wms130);

        let wcs = OwsRequest::get("http://localhost", "service=WCS&request=GetCoverage");
        assert_eq!(mapper.format_for(&wcs), ExceptionFormat::Ows20);

        let json = OwsRequest::get(
            "http://localhost",
            "service=WMS&request=GetMap&exceptions=application/json",
        );
        assert_eq!(mapper.format_for(&json), ExceptionFormat::Json);
    }

    #[test]
    fn test_fault_hook_sees_report() {
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mapper = ExceptionMapper::default().with_fault_hook(Arc::new(move |report: &ExceptionReport| {
            sink.lock().unwrap().push(report.code.clone());
        }));

        let request = OwsRequest::get("http://localhost", "service=WCS&request=GetCoverage");
        mapper.map_exception(&request, &OwsError::MissingParameter("coverageId".to_string()));
        assert_eq!(*seen.lock().unwrap(), vec!["MissingParameterValue".to_string()]);
    }
}
