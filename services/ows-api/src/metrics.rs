//! Prometheus counters for the OWS front end.

use metrics::counter;

/// Record a dispatched OWS request.
pub fn record_request(service: &str, operation: &str) {
    counter!(
        "ows_requests_total",
        "service" => service.to_ascii_uppercase(),
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record a fault document sent to a client.
pub fn record_exception(code: &str) {
    counter!("ows_exceptions_total", "code" => code.to_string()).increment(1);
}

/// Record items written into a result feed.
pub fn record_items_encoded(format: &str, items: usize) {
    counter!("opensearch_items_encoded_total", "format" => format.to_string())
        .increment(items as u64);
}
