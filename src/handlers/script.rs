use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tracing::{debug, instrument};

use crate::error::ScriptError;
use crate::script::ScriptResponder;

/// Every method and path lands on the install script.
pub fn router(responder: Arc<ScriptResponder>) -> Router {
    Router::new().fallback(serve_script).with_state(responder)
}

#[instrument(skip_all, fields(uri = %uri))]
pub async fn serve_script(
    State(responder): State<Arc<ScriptResponder>>,
    uri: Uri,
) -> Result<Response, ScriptError> {
    let target = uri.to_string();
    let response = responder.handle(Some(target.as_str()))?;

    debug!(bytes = response.payload.len(), "Serving install script");

    Ok(([(header::CONTENT_TYPE, response.content_type)], response.payload).into_response())
}
