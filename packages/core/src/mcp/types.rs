//! JSON-RPC 2.0 envelopes for the stdio MCP transport
//!
//! Block operation failures become [`MCPError`]s with an application code and
//! a `data` payload whose `type` names the failure kind.

use crate::operations::BlockOperationError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

fn jsonrpc_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let version = String::deserialize(deserializer)?;
    if version != "2.0" {
        return Err(serde::de::Error::custom(format!(
            "unsupported jsonrpc version '{}'",
            version
        )));
    }
    Ok(version)
}

/// JSON-RPC 2.0 request structure
///
/// # Example
///
/// ```json
/// {
///     "jsonrpc": "2.0",
///     "id": 123,
///     "method": "append_block",
///     "params": {
///         "docId": "doc-1",
///         "type": "heading2",
///         "text": "Intro"
///     }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct MCPRequest {
    /// JSON-RPC version (must be "2.0")
    #[serde(deserialize_with = "jsonrpc_version")]
    pub jsonrpc: String,

    /// Request identifier (used to match responses)
    pub id: u64,

    /// Method name to invoke
    pub method: String,

    /// Method parameters as JSON value
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 notification (no `id`, never answered)
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MCPNotification {
    #[serde(deserialize_with = "jsonrpc_version")]
    pub jsonrpc: String,

    pub method: String,

    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 response structure
///
/// # Error Example
///
/// ```json
/// {
///     "jsonrpc": "2.0",
///     "id": 123,
///     "error": {
///         "code": -32004,
///         "message": "Invalid field 'url' for bookmark: is required",
///         "data": { "type": "InvalidField", "field": "url" }
///     }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct MCPResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier (matches request)
    pub id: u64,

    /// Success result (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error information (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

/// JSON-RPC 2.0 error structure
#[derive(Debug, Serialize, Clone)]
pub struct MCPError {
    /// Error code (standard JSON-RPC or application-specific)
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Structured details; `type` names the error variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// JSON-RPC 2.0 standard error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Application error codes (-32000 to -32099)
pub const BLOCK_NOT_FOUND: i32 = -32000;
pub const PLACEMENT_ERROR: i32 = -32001;
pub const STORE_ERROR: i32 = -32002;
pub const VALIDATION_ERROR: i32 = -32004;

impl MCPError {
    fn new(code: i32, message: String) -> Self {
        Self {
            code,
            message,
            data: None,
        }
    }

    /// Attach a structured `data` payload
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(message: String) -> Self {
        Self::new(PARSE_ERROR, message)
    }

    pub fn invalid_request(message: String) -> Self {
        Self::new(INVALID_REQUEST, message)
    }

    /// Create a method not found error
    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: String) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn internal_error(message: String) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

impl From<BlockOperationError> for MCPError {
    fn from(err: BlockOperationError) -> Self {
        let code = match &err {
            BlockOperationError::UnsupportedType { .. }
            | BlockOperationError::InvalidField { .. }
            | BlockOperationError::Validation(_) => VALIDATION_ERROR,
            BlockOperationError::ReferenceNotFound { .. } => BLOCK_NOT_FOUND,
            BlockOperationError::InvalidParent { .. }
            | BlockOperationError::IndexOutOfRange { .. }
            | BlockOperationError::InvalidPlacement { .. } => PLACEMENT_ERROR,
            BlockOperationError::MissingRequiredWorkspaceOrDoc { .. } => INVALID_PARAMS,
            BlockOperationError::Store(_) => STORE_ERROR,
        };

        let mut data = match &err {
            BlockOperationError::UnsupportedType {
                block_type,
                accepted,
            } => json!({ "blockType": block_type, "accepted": accepted }),
            BlockOperationError::InvalidField {
                field,
                type_context,
                reason,
            } => json!({ "field": field, "typeContext": type_context, "reason": reason }),
            BlockOperationError::ReferenceNotFound { block_id } => json!({ "blockId": block_id }),
            BlockOperationError::InvalidParent { parent_id, flavour } => {
                json!({ "parentId": parent_id, "flavour": flavour })
            }
            BlockOperationError::IndexOutOfRange { index, child_count } => {
                json!({ "index": index, "childCount": child_count })
            }
            BlockOperationError::InvalidPlacement { reason } => json!({ "reason": reason }),
            BlockOperationError::MissingRequiredWorkspaceOrDoc { missing } => {
                json!({ "missing": missing })
            }
            BlockOperationError::Validation(_) | BlockOperationError::Store(_) => json!({}),
        };
        data["type"] = json!(err.kind());

        Self::new(code, err.to_string()).with_data(data)
    }
}

impl MCPResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: u64, error: MCPError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
