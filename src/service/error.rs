use crate::error::GenerateError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use memo_traits::RenderError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload '{part}' exceeds the limit of {limit_bytes} bytes")]
    UploadTooLarge { part: String, limit_bytes: usize },

    #[error("Request body is too large")]
    BodyTooLarge,

    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),

    #[error("Service overloaded, please try again later")]
    ServiceOverloaded,

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string(), None),
            Self::UploadTooLarge { .. } | Self::BodyTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PayloadTooLarge",
                self.to_string(),
                None,
            ),
            Self::UnsupportedMediaType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UnsupportedMediaType",
                self.to_string(),
                None,
            ),
            Self::ServiceOverloaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ServiceOverloaded",
                self.to_string(),
                None,
            ),
            Self::Generate(GenerateError::Validation(ref e)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ValidationFailed",
                e.to_string(),
                serde_json::to_value(e.issues()).ok(),
            ),
            Self::Generate(GenerateError::Configuration(ref e)) => {
                tracing::error!(error = %e, source = ?std::error::Error::source(e), "Template configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ConfigError",
                    "The service is misconfigured".to_string(),
                    None,
                )
            }
            Self::Generate(GenerateError::Rendering(RenderError::Timeout(limit))) => {
                tracing::error!(timeout_secs = limit.as_secs(), "PDF rendering timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "RenderTimeout",
                    "PDF rendering took too long".to_string(),
                    None,
                )
            }
            Self::Generate(GenerateError::Rendering(ref e)) => {
                tracing::error!(error = %e, "PDF rendering failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "RenderFailed",
                    "PDF rendering failed".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": code,
            "message": message,
        });
        if let Some(fields) = fields {
            body["fields"] = fields;
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use memo_core::{FieldSet, validate};
    use std::time::Duration;

    #[test]
    fn test_status_codes_follow_error_category() {
        let validation = validate(&FieldSet::new()).unwrap_err();
        let cases = [
            (ServiceError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::ServiceOverloaded, StatusCode::SERVICE_UNAVAILABLE),
            (ServiceError::BodyTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (
                ServiceError::UnsupportedMediaType("text/plain".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                GenerateError::from(validation).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                GenerateError::from(RenderError::Timeout(Duration::from_secs(30))).into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                GenerateError::from(RenderError::MalformedOutput("empty".into())).into(),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
