//! Handler contract for registered OWS operations.

use async_trait::async_trait;
use ows_common::OwsResult;

use crate::request::OwsRequest;
use crate::response::ResultShape;

/// Implementation of one OWS operation.
///
/// Handlers are registered once at startup and shared by every request, so
/// they must not keep per-request mutable state; anything request-scoped
/// travels through the [`OwsRequest`].
#[async_trait]
pub trait OwsHandler: Send + Sync {
    /// Serve the request, returning a result shape or a classified error.
    async fn handle(&self, request: &OwsRequest) -> OwsResult<ResultShape>;
}
