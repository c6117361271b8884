//! MCP Request Handlers
//!
//! One module per operation group. Every handler deserializes an explicit
//! params struct, calls [`BlockOperations`](crate::operations::BlockOperations)
//! and serializes a typed response.

pub mod blocks;
pub mod documents;
pub mod initialize;
pub mod markdown;
pub mod tools;

use crate::mcp::types::MCPError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Deserialize handler params, reporting failures as `INVALID_PARAMS`
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, MCPError> {
    serde_json::from_value(params)
        .map_err(|e| MCPError::invalid_params(format!("Invalid parameters: {}", e)))
}

pub(crate) fn to_result<T: Serialize>(response: &T) -> Result<Value, MCPError> {
    serde_json::to_value(response)
        .map_err(|e| MCPError::internal_error(format!("Failed to serialize response: {}", e)))
}
