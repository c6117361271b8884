//! Integration tests for BlockOperations against the in-memory store
//!
//! These tests drive the public API end-to-end: normalize, validate, place,
//! build, submit, and read the result back from the store.

use blockdoc_core::{
    AppendBlockParams, BlockNode, BlockOperationError, BlockOperations, DocRef, DocSnapshot,
    DocTarget, DocumentStore, EngineConfig, Flavour, InMemoryDocumentStore, ListStyle, NodeTable,
    Placement,
};
use std::sync::Arc;

/// Test helper: service with a default workspace and its backing store
fn create_test_env() -> (BlockOperations, Arc<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let config = EngineConfig {
        default_workspace_id: Some("ws".to_string()),
        ..Default::default()
    };
    (BlockOperations::new(store.clone(), config), store)
}

fn doc() -> DocTarget {
    DocTarget::doc("doc")
}

async fn snapshot(store: &InMemoryDocumentStore) -> DocSnapshot {
    store
        .fetch_snapshot(&DocRef::new("ws", "doc"))
        .await
        .unwrap()
        .expect("document exists")
}

// ============================================================================
// append_block scenarios
// ============================================================================

#[tokio::test]
async fn test_heading_alias_bootstraps_document() {
    let (ops, store) = create_test_env();

    let result = ops
        .append_block(&doc(), &AppendBlockParams::of_type("heading2").with_text("Intro"))
        .await
        .unwrap();

    assert_eq!(result.normalized_type, "heading");
    assert_eq!(result.legacy_type.as_deref(), Some("heading2"));

    let snapshot = snapshot(&store).await;
    let page = snapshot.blocks.page().unwrap();
    assert!(page.parent_id.is_none());
    assert_eq!(
        snapshot.blocks.get(&page.children[0]).unwrap().flavour,
        Flavour::Surface
    );

    let note = snapshot.blocks.note_under(&page.id).unwrap();
    assert_eq!(note.children.last(), Some(&result.block_id));

    let heading = snapshot.blocks.get(&result.block_id).unwrap();
    assert_eq!(heading.heading_level(), Some(2));
    assert_eq!(heading.plain_text(), "Intro");
    assert!(heading.validate().is_ok());
}

#[tokio::test]
async fn test_second_append_reuses_note() {
    let (ops, store) = create_test_env();
    let first = ops
        .append_block(&doc(), &AppendBlockParams::of_type("paragraph").with_text("one"))
        .await
        .unwrap();
    let second = ops
        .append_block(&doc(), &AppendBlockParams::of_type("paragraph").with_text("two"))
        .await
        .unwrap();

    assert!(second.created_containers.is_empty());
    assert_eq!(first.parent_id, second.parent_id);
    assert_eq!(second.index, 1);
    assert_eq!(snapshot(&store).await.blocks.len(), 5);
}

#[tokio::test]
async fn test_page_without_note_gets_one_lazily() {
    let (ops, store) = create_test_env();
    let table: NodeTable = [
        BlockNode::with_id("page", Flavour::Page).with_children(vec!["surface".to_string()]),
        BlockNode::with_id("surface", Flavour::Surface).with_parent("page"),
    ]
    .into_iter()
    .collect();
    store
        .put_snapshot(DocRef::new("ws", "doc"), DocSnapshot::new(4, table))
        .await;

    let result = ops
        .append_block(&doc(), &AppendBlockParams::of_type("callout").with_text("hi"))
        .await
        .unwrap();

    assert_eq!(result.created_containers.len(), 1);
    let snapshot = snapshot(&store).await;
    let page = snapshot.blocks.get("page").unwrap();
    assert_eq!(page.children.len(), 2);
    assert_eq!(page.children[1], result.parent_id);
    assert_eq!(snapshot.version, 5);
}

#[tokio::test]
async fn test_divider_text_strict_and_lenient() {
    let (ops, store) = create_test_env();
    let request = AppendBlockParams::of_type("divider").with_text("x");

    let err = ops
        .append_block(&doc(), &request.clone().with_strict(true))
        .await
        .unwrap_err();
    assert!(matches!(err, BlockOperationError::InvalidField { ref field, .. } if field == "text"));

    let result = ops
        .append_block(&doc(), &request.with_strict(false))
        .await
        .unwrap();
    let divider = snapshot(&store).await.blocks.get(&result.block_id).cloned().unwrap();
    assert!(divider.text.is_none());
}

#[tokio::test]
async fn test_bookmark_requires_url() {
    let (ops, store) = create_test_env();
    let err = ops
        .append_block(&doc(), &AppendBlockParams::of_type("bookmark"))
        .await
        .unwrap_err();
    assert!(matches!(err, BlockOperationError::InvalidField { ref field, .. } if field == "url"));
    assert_eq!(store.document_count().await, 0);

    let ok = ops
        .append_block(
            &doc(),
            &AppendBlockParams::of_type("bookmark").with_url("https://example.com"),
        )
        .await
        .unwrap();
    let bookmark = snapshot(&store).await.blocks.get(&ok.block_id).cloned().unwrap();
    assert_eq!(bookmark.prop_str("url"), Some("https://example.com"));
    assert_eq!(bookmark.prop_str("style"), Some("horizontal"));
}

#[tokio::test]
async fn test_after_and_before_block_id() {
    let (ops, store) = create_test_env();
    let a = ops
        .append_block(&doc(), &AppendBlockParams::of_type("paragraph").with_text("a"))
        .await
        .unwrap();
    let c = ops
        .append_block(&doc(), &AppendBlockParams::of_type("paragraph").with_text("c"))
        .await
        .unwrap();
    let before = snapshot(&store).await.blocks.get(&a.parent_id).unwrap().children.len();

    let b = ops
        .append_block(
            &doc(),
            &AppendBlockParams::of_type("paragraph")
                .with_text("b")
                .with_placement(Placement::after(a.block_id.as_str())),
        )
        .await
        .unwrap();
    let first = ops
        .append_block(
            &doc(),
            &AppendBlockParams::of_type("paragraph")
                .with_text("0")
                .with_placement(Placement::before(a.block_id.as_str())),
        )
        .await
        .unwrap();

    let snapshot = snapshot(&store).await;
    let children = &snapshot.blocks.get(&a.parent_id).unwrap().children;
    assert_eq!(children.len(), before + 2);
    assert_eq!(
        children,
        &vec![first.block_id, a.block_id, b.block_id, c.block_id]
    );
}

#[tokio::test]
async fn test_index_placement_strict_and_lenient() {
    let (ops, store) = create_test_env();
    let first = ops
        .append_block(&doc(), &AppendBlockParams::of_type("paragraph").with_text("a"))
        .await
        .unwrap();
    let note_id = first.parent_id.clone();

    let err = ops
        .append_block(
            &doc(),
            &AppendBlockParams::of_type("paragraph")
                .with_placement(Placement::under(note_id.as_str()).at_index(5)),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BlockOperationError::IndexOutOfRange {
            index: 5,
            child_count: 1
        }
    ));

    let clamped = ops
        .append_block(
            &doc(),
            &AppendBlockParams::of_type("paragraph")
                .with_strict(false)
                .with_placement(Placement::under(note_id.as_str()).at_index(-3)),
        )
        .await
        .unwrap();
    assert_eq!(clamped.index, 0);
    assert_eq!(
        snapshot(&store).await.blocks.get(&note_id).unwrap().children[0],
        clamped.block_id
    );
}

#[tokio::test]
async fn test_content_under_page_rejected_in_strict_mode() {
    let (ops, store) = create_test_env();
    ops.append_block(&doc(), &AppendBlockParams::of_type("paragraph"))
        .await
        .unwrap();
    let page_id = snapshot(&store).await.blocks.page().unwrap().id.clone();

    let err = ops
        .append_block(
            &doc(),
            &AppendBlockParams::of_type("paragraph").with_placement(Placement::under(page_id.as_str())),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidParent");
}

#[tokio::test]
async fn test_table_block_has_full_grid() {
    let (ops, store) = create_test_env();
    let result = ops
        .append_block(&doc(), &AppendBlockParams::of_type("table"))
        .await
        .unwrap();

    let table = snapshot(&store).await.blocks.get(&result.block_id).cloned().unwrap();
    let rows = table.props["rows"].as_object().unwrap();
    let columns = table.props["columns"].as_object().unwrap();
    let cells = table.props["cells"].as_object().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(columns.len(), 3);
    assert_eq!(cells.len(), 9);
    for row_id in rows.keys() {
        for column_id in columns.keys() {
            assert!(cells.contains_key(&format!("{row_id}:{column_id}")));
        }
    }
}

#[tokio::test]
async fn test_lenient_table_grid_is_capped() {
    let (ops, store) = create_test_env();
    let mut request = AppendBlockParams::of_type("table").with_strict(false);
    request.rows = Some(400.0);
    request.columns = Some(400.0);

    let result = ops.append_block(&doc(), &request).await.unwrap();
    let table = snapshot(&store).await.blocks.get(&result.block_id).cloned().unwrap();
    assert_eq!(table.props["rows"].as_object().unwrap().len(), 20);
    assert_eq!(table.props["columns"].as_object().unwrap().len(), 20);
    assert_eq!(table.props["cells"].as_object().unwrap().len(), 400);

    let err = ops
        .append_block(&doc(), &request.with_strict(true))
        .await
        .unwrap_err();
    assert!(matches!(err, BlockOperationError::InvalidField { ref field, .. } if field == "rows"));
}

#[tokio::test]
async fn test_todo_list_item() {
    let (ops, store) = create_test_env();
    let result = ops
        .append_block(
            &doc(),
            &AppendBlockParams::of_type("todo").with_text("ship").with_checked(true),
        )
        .await
        .unwrap();
    assert_eq!(result.block_type.as_deref(), Some("todo"));
    assert_eq!(result.legacy_type.as_deref(), Some("todo"));

    let item = snapshot(&store).await.blocks.get(&result.block_id).cloned().unwrap();
    assert_eq!(item.prop_bool("checked"), Some(true));

    let err = ops
        .append_block(
            &doc(),
            &AppendBlockParams::of_type("bulleted_list").with_style(ListStyle::Numbered),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidField");
}

#[tokio::test]
async fn test_append_succeeds_despite_dangling_child() {
    let (ops, store) = create_test_env();
    let table: NodeTable = [
        BlockNode::with_id("page", Flavour::Page).with_children(vec!["note".to_string()]),
        BlockNode::with_id("note", Flavour::Note)
            .with_parent("page")
            .with_children(vec!["ghost".to_string()]),
    ]
    .into_iter()
    .collect();
    store
        .put_snapshot(DocRef::new("ws", "doc"), DocSnapshot::new(1, table))
        .await;

    let result = ops
        .append_block(&doc(), &AppendBlockParams::of_type("paragraph").with_text("hi"))
        .await
        .unwrap();
    assert_eq!(result.parent_id, "note");
    assert_eq!(result.index, 1);

    let read = ops.read_document(&doc()).await.unwrap();
    assert_eq!(read.tree.unsupported, 1);
    assert_eq!(read.tree.plain_text, "hi");
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_read_terminates_on_cycles() {
    let (ops, store) = create_test_env();
    let table: NodeTable = [
        BlockNode::with_id("page", Flavour::Page).with_children(vec!["note".to_string()]),
        BlockNode::with_id("note", Flavour::Note)
            .with_parent("page")
            .with_children(vec!["a".to_string()]),
        BlockNode::with_id("a", Flavour::Paragraph)
            .with_parent("note")
            .with_children(vec!["note".to_string(), "page".to_string(), "ghost".to_string()]),
    ]
    .into_iter()
    .collect();
    store
        .put_snapshot(DocRef::new("ws", "doc"), DocSnapshot::new(1, table))
        .await;

    let read = ops.read_document(&doc()).await.unwrap();
    let ids: Vec<_> = read.tree.blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["page", "note", "a"]);
    assert_eq!(read.tree.unsupported, 1);

    let export = ops.export_markdown(&doc(), None).await.unwrap();
    assert!(export.lossy);
}
