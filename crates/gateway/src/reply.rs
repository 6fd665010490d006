//! Conversions from builder output into axum responses.

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::warn;

use rendition_core::{RenderError, Rendered};

/// A finished [`Rendered`] artifact, ready to be returned from a handler.
#[derive(Debug, Clone)]
pub struct Reply(pub Rendered);

impl From<Rendered> for Reply {
    fn from(rendered: Rendered) -> Self {
        Self(rendered)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let Rendered {
            status,
            content_type,
            headers,
            body,
        } = self.0;

        let status = match StatusCode::from_u16(status) {
            Ok(code) if (100..=599).contains(&status) => code,
            _ => {
                warn!(status, "Rendered response carries an invalid status, sending 500");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut response = (status, body).into_response();
        let response_headers = response.headers_mut();

        match HeaderValue::from_str(&content_type) {
            Ok(value) => {
                response_headers.insert(CONTENT_TYPE, value);
            }
            Err(_) => warn!(content_type = %content_type, "Skipping invalid content type"),
        }

        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    response_headers.insert(name, value);
                }
                _ => warn!(header = %name, "Skipping invalid response header"),
            }
        }

        response
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`RenderError`] surfaced to an HTTP client.
#[derive(Debug)]
pub struct ApiError(pub RenderError);

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            RenderError::InvalidCallback(_) => StatusCode::BAD_REQUEST,
            RenderError::UnknownMethod { .. }
            | RenderError::Macro { .. }
            | RenderError::InvalidStatus(_)
            | RenderError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Response rendering failed");
        } else {
            warn!(error = %self.0, "Response rendering rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
