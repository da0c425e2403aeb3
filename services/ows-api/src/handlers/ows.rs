//! OWS and OpenSearch endpoints.
//!
//! Both translate the HTTP request into an [`OwsRequest`], hand it to the
//! dispatcher and write the normalized [`OwsResponse`] back unchanged.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Path},
    http::{header, uri::Authority, HeaderMap, StatusCode, Uri},
    response::Response,
};
use ows_protocol::{KvpParams, OwsRequest, OwsResponse};
use tracing::{error, warn};

use crate::metrics;
use crate::operations::opensearch::{OPENSEARCH_SERVICE, OPENSEARCH_VERSION};
use crate::state::AppState;

/// GET /ows - KVP request
pub async fn ows_get_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let request = OwsRequest::new(
        "GET",
        base_uri(&state, &headers),
        uri.path(),
        uri.query().unwrap_or(""),
    );
    dispatch(&state, &headers, request).await
}

/// POST /ows - form-encoded KVP in the body
pub async fn ows_post_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    body: String,
) -> Response {
    let mut request = OwsRequest::new(
        "POST",
        base_uri(&state, &headers),
        uri.path(),
        uri.query().unwrap_or(""),
    );
    if !body.trim().is_empty() {
        request = request.with_params(KvpParams::from_query(body.trim()));
    }
    dispatch(&state, &headers, request).await
}

/// GET /opensearch/collections/:collection_id/:format - OpenSearch Search
///
/// The path segments and the protocol triple are injected as parameters;
/// the request URI itself stays as received so that feed links point back here.
pub async fn opensearch_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((collection_id, format)): Path<(String, String)>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let request = OwsRequest::new(
        "GET",
        base_uri(&state, &headers),
        uri.path(),
        uri.query().unwrap_or(""),
    )
    .with_param("service", OPENSEARCH_SERVICE)
    .with_param("version", OPENSEARCH_VERSION)
    .with_param("request", "Search")
    .with_param("collection", collection_id)
    .with_param("format", format);
    dispatch(&state, &headers, request).await
}

async fn dispatch(state: &AppState, headers: &HeaderMap, request: OwsRequest) -> Response {
    let request = match headers.get(header::ACCEPT).and_then(|h| h.to_str().ok()) {
        Some(accept) => request.with_accept(accept),
        None => request,
    };
    if let (Some(service), Some(operation)) = (request.service(), request.operation()) {
        metrics::record_request(service, operation);
    }
    let response = state.dispatcher.dispatch(&request).await;
    into_http_response(response)
}

/// Configured public base URL, or one derived from the Host header.
///
/// Deployments behind a proxy should set `--base-url`; the Host header is
/// client-controlled and only trusted when it is a bare `host[:port]`.
fn base_uri(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base_url) = &state.base_url {
        return base_url.clone();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .and_then(valid_host)
        .unwrap_or_else(|| {
            warn!("Missing or malformed Host header, linking to localhost");
            "localhost"
        });
    format!("http://{}", host)
}

fn valid_host(host: &str) -> Option<&str> {
    let authority: Authority = host.parse().ok()?;
    (authority.as_str() == host && !host.contains('@')).then_some(host)
}

/// Write an [`OwsResponse`] as an HTTP response.
pub fn into_http_response(response: OwsResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, response.content_type.as_str());
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder.body(Body::from(response.body)).unwrap_or_else(|e| {
        error!(error = %e, "Failed to build HTTP response");
        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from("Internal server error"))
            .unwrap_or_default()
    })
}
