//! Request extractors whose rejections use the `AppError` body
//!
//! axum's own `Json`, `Path` and `Query` reject with a plain-text body; these
//! wrappers keep every client error in the `{"error": {...}}` shape.

use crate::core::AppError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum_macros::{FromRequest, FromRequestParts};
use serde::de::DeserializeOwned;
use tracing::warn;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected JSON body: {}", rejection.body_text());
        AppError::new(rejection.status(), "Invalid JSON body").with_details(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        warn!("Rejected path: {}", rejection.body_text());
        AppError::new(rejection.status(), "Invalid path parameter")
            .with_details(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        warn!("Rejected query string: {}", rejection.body_text());
        AppError::new(rejection.status(), "Invalid query string")
            .with_details(rejection.body_text())
    }
}

/// Parses a JSON body regardless of its `Content-Type`.
/// Malformed or mistyped JSON is a 400.
pub fn parse_json_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|e| {
        warn!("Rejected JSON body: {}", e);
        AppError::bad_request("Invalid JSON body").with_details(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::UpdateUserDTO;
    use axum::http::StatusCode;

    #[test]
    fn body_without_content_type_is_parsed() {
        let dto: UpdateUserDTO = parse_json_body(br#"{"points": 42}"#).unwrap();
        assert_eq!(dto.points, Some(42));
    }

    #[test]
    fn mistyped_field_is_a_bad_request() {
        let err = parse_json_body::<UpdateUserDTO>(br#"{"points": "abc"}"#).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Invalid JSON body");
    }

    #[test]
    fn empty_body_is_a_bad_request() {
        let err = parse_json_body::<UpdateUserDTO>(b"").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
