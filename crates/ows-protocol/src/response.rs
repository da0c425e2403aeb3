//! Handler result shapes and the canonical outbound response.

use bytes::Bytes;

use crate::media_types;

/// A fully formed response handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwsResponse {
    pub body: Bytes,
    pub content_type: String,
    pub status: u16,
    /// Extra headers beyond Content-Type.
    pub headers: Vec<(String, String)>,
}

impl OwsResponse {
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>, status: u16) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
            status,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// What a handler or the exception mapper may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultShape {
    /// A complete response, passed through untouched.
    Prebuilt(OwsResponse),
    /// Body, media type and an explicit status code.
    BodyTypeStatus {
        body: Bytes,
        content_type: String,
        status: u16,
    },
    /// Body and media type; status is the path default (200 success, 400 error).
    BodyType { body: Bytes, content_type: String },
}

impl ResultShape {
    pub fn body(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        ResultShape::BodyType {
            body: body.into(),
            content_type: content_type.into(),
        }
    }

    pub fn xml(body: impl Into<Bytes>) -> Self {
        Self::body(body, media_types::XML)
    }

    pub fn with_status(
        body: impl Into<Bytes>,
        content_type: impl Into<String>,
        status: u16,
    ) -> Self {
        ResultShape::BodyTypeStatus {
            body: body.into(),
            content_type: content_type.into(),
            status,
        }
    }
}
