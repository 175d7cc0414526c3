//! JSON-RPC transport handler. Envelope problems are HTTP errors; method
//! failures become JSON-RPC error objects inside a 200 response.

use super::AppState;
use crate::rpc::{self, RpcRequest};
use crate::{Error, Result};
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde_json::Value;

/// Content type the JSON-RPC clients send.
pub const RPC_CONTENT_TYPE: &str = "application/jsonrpc+json";

pub async fn post_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap_or("")
        .trim();
    if content_type != RPC_CONTENT_TYPE {
        return Err(Error::UnsupportedMediaType(content_type.to_string()));
    }

    let request: RpcRequest = serde_json::from_str(&body)
        .map_err(|e| Error::InvalidQuery(format!("malformed JSON-RPC request: {e}")))?;

    Ok(Json(rpc::dispatch(state.backend.as_ref(), &request).await))
}
