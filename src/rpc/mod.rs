//! JSON-RPC method registry.
//!
//! Requests arrive as `application/jsonrpc+json` POSTs on the service root.
//! Transport problems (unreadable body, wrong content type) surface as HTTP
//! errors before dispatch; method-level failures become JSON-RPC error
//! objects inside a 200 response.

pub mod protein_family;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Error;
use crate::metrics::METRICS;
use crate::solr::SearchBackend;

pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn default_version() -> String {
    "2.0".to_string()
}

fn result_envelope(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_envelope(id: &Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

/// Route a decoded request to its method. Always yields a response
/// envelope; failures inside a method map to JSON-RPC error codes.
pub async fn dispatch(backend: &dyn SearchBackend, request: &RpcRequest) -> Value {
    METRICS.rpc_calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    match request.method.as_str() {
        "proteinFamily" => match protein_family::run(backend, &request.params).await {
            Ok(rows) => result_envelope(&request.id, rows),
            Err(Error::InvalidQuery(message)) => {
                error_envelope(&request.id, INVALID_PARAMS, &message)
            }
            Err(err) => error_envelope(&request.id, INTERNAL_ERROR, &err.to_string()),
        },
        other => {
            tracing::debug!(method = other, "unknown rpc method");
            error_envelope(&request.id, METHOD_NOT_FOUND, "Method not found")
        }
    }
}
