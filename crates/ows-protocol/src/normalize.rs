//! Conversion of result shapes into the canonical response.

use ows_common::{OwsError, OwsResult};

use crate::response::{OwsResponse, ResultShape};

/// Turn a result shape into an [`OwsResponse`].
///
/// `default_status` applies to [`ResultShape::BodyType`] only. A prebuilt
/// response is returned unchanged. Shapes that cannot form a valid HTTP
/// response fail with [`OwsError::InvalidResultShape`].
pub fn normalize(shape: ResultShape, default_status: u16) -> OwsResult<OwsResponse> {
    match shape {
        ResultShape::Prebuilt(response) => Ok(response),
        ResultShape::BodyTypeStatus {
            body,
            content_type,
            status,
        } => checked(OwsResponse::new(body, content_type, status)),
        ResultShape::BodyType { body, content_type } => {
            checked(OwsResponse::new(body, content_type, default_status))
        }
    }
}

fn checked(response: OwsResponse) -> OwsResult<OwsResponse> {
    if response.content_type.trim().is_empty() {
        return Err(OwsError::InvalidResultShape(
            "empty content type".to_string(),
        ));
    }
    if !(100..=599).contains(&response.status) {
        return Err(OwsError::InvalidResultShape(format!(
            "status {} is not an HTTP status code",
            response.status
        )));
    }
    Ok(response)
}
