//! Tests for MCP Markdown handlers

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::mcp::handlers::documents::handle_read_document;
    use crate::mcp::handlers::markdown::{
        handle_append_markdown, handle_export_markdown, handle_import_markdown,
    };
    use crate::mcp::types::{INVALID_PARAMS, VALIDATION_ERROR};
    use crate::operations::BlockOperations;
    use crate::store::InMemoryDocumentStore;
    use serde_json::json;
    use std::sync::Arc;

    fn operations() -> Arc<BlockOperations> {
        let config = EngineConfig {
            default_workspace_id: Some("ws".to_string()),
            ..Default::default()
        };
        Arc::new(BlockOperations::new(
            Arc::new(InMemoryDocumentStore::new()),
            config,
        ))
    }

    #[test]
    fn test_import_markdown_returns_operations() {
        let ops = operations();
        let result = handle_import_markdown(
            &ops,
            json!({ "markdown": "## Intro\n\n- [x] done\n\n---" }),
        )
        .unwrap();

        assert_eq!(result["lossy"], false);
        assert_eq!(result["stats"]["blockCount"], 3);
        let operations = result["operations"].as_array().unwrap();
        assert_eq!(operations[0], json!({"type": "heading", "level": 2.0, "text": "Intro"}));
        assert_eq!(
            operations[1],
            json!({"type": "list", "style": "todo", "checked": true, "text": "done"})
        );
        assert_eq!(operations[2], json!({"type": "divider"}));
    }

    #[test]
    fn test_import_markdown_requires_markdown() {
        let ops = operations();
        let err = handle_import_markdown(&ops, json!({})).unwrap_err();
        assert_eq!(err.code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_append_then_export_and_read() {
        let ops = operations();
        let appended = handle_append_markdown(
            &ops,
            json!({ "docId": "doc", "markdown": "# Title\n\nBody text" }),
        )
        .await
        .unwrap();
        assert_eq!(appended["appendedCount"], 2);
        assert_eq!(appended["blockIds"].as_array().unwrap().len(), 2);

        let exported = handle_export_markdown(&ops, json!({ "docId": "doc" }))
            .await
            .unwrap();
        assert_eq!(exported["markdown"], "# Title\n\nBody text\n");
        assert_eq!(exported["stats"]["unsupportedCount"], 0);

        let read = handle_read_document(&ops, json!({ "docId": "doc" }))
            .await
            .unwrap();
        assert_eq!(read["exists"], true);
        assert_eq!(read["plainText"], "Title\nBody text");
        assert_eq!(read["blocks"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_export_selected_root() {
        let ops = operations();
        let appended = handle_append_markdown(
            &ops,
            json!({ "docId": "doc", "markdown": "first\n\nsecond" }),
        )
        .await
        .unwrap();
        let second = appended["blockIds"][1].clone();

        let exported = handle_export_markdown(&ops, json!({ "docId": "doc", "rootIds": [second] }))
            .await
            .unwrap();
        assert_eq!(exported["markdown"], "second\n");
    }

    #[tokio::test]
    async fn test_lossy_import_reports_warnings() {
        let ops = operations();
        let appended = handle_append_markdown(
            &ops,
            json!({ "docId": "doc", "markdown": "- a\n  - b" }),
        )
        .await
        .unwrap();
        assert_eq!(appended["lossy"], true);
        assert_eq!(appended["appendedCount"], 2);
        assert!(!appended["warnings"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_markdown_is_rejected() {
        let config = EngineConfig {
            default_workspace_id: Some("ws".to_string()),
            max_markdown_bytes: 8,
            ..Default::default()
        };
        let ops = Arc::new(BlockOperations::new(
            Arc::new(InMemoryDocumentStore::new()),
            config,
        ));
        let err = handle_append_markdown(
            &ops,
            json!({ "docId": "doc", "markdown": "# far too long" }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, VALIDATION_ERROR);
        assert_eq!(err.data.unwrap()["field"], "markdown");
    }
}
