use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for ScriptError {
    fn into_response(self) -> Response {
        warn!("Rejecting request: {}", self);

        let status = match self {
            ScriptError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf8")],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_maps_to_bad_request() {
        let response = ScriptError::InvalidRequest("no path".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf8"
        );
    }
}
