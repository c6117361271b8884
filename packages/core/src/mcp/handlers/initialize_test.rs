use super::*;
use crate::mcp::types::{INVALID_PARAMS, INVALID_REQUEST};
use serde_json::json;

#[test]
fn test_handshake_reports_server_and_capabilities() {
    let result = handle_initialize(json!({
        "protocolVersion": "2024-11-05",
        "clientInfo": {"name": "inspector", "version": "0.3.0"}
    }))
    .unwrap();

    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "blockdoc-mcp");
    assert_eq!(result["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    assert!(result["instructions"]["block_types"]
        .as_str()
        .unwrap()
        .contains("bulleted_list"));
}

#[test]
fn test_every_known_revision_is_echoed() {
    for version in PROTOCOL_VERSIONS {
        let result = handle_initialize(json!({ "protocolVersion": version })).unwrap();
        assert_eq!(result["protocolVersion"], version);
    }
}

#[test]
fn test_unknown_revision_lists_supported_ones() {
    let err = handle_initialize(json!({"protocolVersion": "1999-01-01"})).unwrap_err();
    assert_eq!(err.code, INVALID_REQUEST);
    assert!(err.message.contains("1999-01-01"));
    assert!(err.message.contains("2025-06-18, 2025-03-26, 2024-11-05"));
}

#[test]
fn test_missing_or_mistyped_revision_is_invalid_params() {
    let missing = handle_initialize(json!({"clientInfo": {}})).unwrap_err();
    assert_eq!(missing.code, INVALID_PARAMS);
    assert!(missing.message.contains("protocolVersion"));

    let numeric = handle_initialize(json!({"protocolVersion": 20241105})).unwrap_err();
    assert_eq!(numeric.code, INVALID_PARAMS);
}
