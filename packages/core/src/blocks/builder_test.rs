//! Tests for block construction and staging

#[cfg(test)]
mod tests {
    use crate::blocks::builder::{build_node, stage_block};
    use crate::blocks::normalize::normalize;
    use crate::blocks::placement::resolve_placement;
    use crate::models::{AppendBlockParams, BlockNode, DocSnapshot, Flavour, ListStyle, NodeTable};
    use crate::store::Mutation;
    use serde_json::json;

    fn node_for(params: AppendBlockParams) -> BlockNode {
        build_node(&normalize(&params, false).unwrap())
    }

    fn document() -> DocSnapshot {
        let table: NodeTable = [
            BlockNode::with_id("page", Flavour::Page)
                .with_children(vec!["surface".to_string(), "note".to_string()]),
            BlockNode::with_id("surface", Flavour::Surface).with_parent("page"),
            BlockNode::with_id("note", Flavour::Note)
                .with_parent("page")
                .with_children(vec!["p1".to_string()]),
            BlockNode::with_id("p1", Flavour::Paragraph).with_parent("note"),
        ]
        .into_iter()
        .collect();
        DocSnapshot::new(1, table)
    }

    #[test]
    fn test_heading_is_paragraph_with_level_type() {
        let node = node_for(AppendBlockParams::of_type("heading2").with_text("Intro"));
        assert_eq!(node.flavour, Flavour::Paragraph);
        assert_eq!(node.block_type.as_deref(), Some("h2"));
        assert_eq!(node.plain_text(), "Intro");
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_checked_only_kept_for_todo() {
        let todo = node_for(
            AppendBlockParams::of_type("list")
                .with_style(ListStyle::Todo)
                .with_checked(true),
        );
        assert_eq!(todo.prop_bool("checked"), Some(true));

        let bullet = node_for(AppendBlockParams::of_type("list").with_checked(true));
        assert_eq!(bullet.block_type.as_deref(), Some("bulleted"));
        assert_eq!(bullet.prop_bool("checked"), Some(false));
    }

    #[test]
    fn test_lenient_divider_discards_text() {
        let node = node_for(AppendBlockParams::of_type("divider").with_text("x"));
        assert!(node.text.is_none());
        assert!(node.props.is_empty());
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_code_block_props() {
        let node = node_for(
            AppendBlockParams::of_type("code")
                .with_language("Rust")
                .with_caption("main")
                .with_text("fn main() {}"),
        );
        assert_eq!(node.prop_str("language"), Some("rust"));
        assert_eq!(node.prop_str("caption"), Some("main"));
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_table_has_one_cell_per_pair() {
        let node = node_for(AppendBlockParams::of_type("table").with_table(vec![
            vec!["A".to_string(), "B".to_string()],
            vec!["C".to_string()],
        ]));

        let rows = node.props["rows"].as_object().unwrap();
        let columns = node.props["columns"].as_object().unwrap();
        let cells = node.props["cells"].as_object().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(columns.len(), 2);
        assert_eq!(cells.len(), 4);

        let mut ordered_rows: Vec<_> = rows.values().collect();
        ordered_rows.sort_by(|a, b| a["order"].as_str().cmp(&b["order"].as_str()));
        let mut ordered_columns: Vec<_> = columns.values().collect();
        ordered_columns.sort_by(|a, b| a["order"].as_str().cmp(&b["order"].as_str()));

        let cell = |r: usize, c: usize| {
            let key = format!(
                "{}:{}",
                ordered_rows[r]["id"].as_str().unwrap(),
                ordered_columns[c]["id"].as_str().unwrap()
            );
            cells[&key]["text"].as_str().unwrap().to_string()
        };
        assert_eq!(cell(0, 0), "A");
        assert_eq!(cell(0, 1), "B");
        assert_eq!(cell(1, 0), "C");
        assert_eq!(cell(1, 1), "");
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_attachment_defaults() {
        let mut params = AppendBlockParams::of_type("attachment");
        params.source_id = Some("blob-1".to_string());
        params.name = Some("a.pdf".to_string());
        params.mime_type = Some("application/pdf".to_string());
        let node = node_for(params);

        assert_eq!(node.prop_str("sourceId"), Some("blob-1"));
        assert_eq!(node.props["size"], json!(0));
        assert_eq!(node.props["embed"], json!(false));
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_stage_after_block_splices_without_collapsing() {
        let snapshot = document();
        let params = AppendBlockParams::of_type("paragraph").with_text("new");
        let block = normalize(&params, true).unwrap();
        let mut mutation = Mutation::new(Some(&snapshot));

        let placement =
            resolve_placement(mutation.table(), &crate::models::Placement::before("p1"), true)
                .unwrap();
        let built = stage_block(&mut mutation, &block, placement).unwrap();

        assert_eq!(built.parent_id, "note");
        assert_eq!(built.index, 0);
        assert!(built.created_containers.is_empty());
        assert_eq!(
            mutation.table().get("note").unwrap().children,
            vec![built.block_id.clone(), "p1".to_string()]
        );
    }

    #[test]
    fn test_empty_document_gets_skeleton_in_same_batch() {
        let block = normalize(&AppendBlockParams::of_type("heading2").with_text("Intro"), true)
            .unwrap();
        let mut mutation = Mutation::new(None);
        let placement = resolve_placement(mutation.table(), &block.placement, true).unwrap();
        let built = stage_block(&mut mutation, &block, placement).unwrap();

        assert_eq!(built.created_containers.len(), 3);
        let table = mutation.table();
        let page = table.page().unwrap();
        let note = table.note_under(&page.id).unwrap();
        assert_eq!(table.get(&page.children[0]).unwrap().flavour, Flavour::Surface);
        assert_eq!(note.children, vec![built.block_id.clone()]);
        assert_eq!(note.prop_str("displayMode"), Some("both"));
        assert!(table.validate_references().is_ok());

        let delta = mutation.into_delta();
        assert_eq!(delta.base_version, 0);
        // page, surface, link, note, link, heading, link
        assert_eq!(delta.ops.len(), 7);
    }

    #[test]
    fn test_missing_note_is_created_under_existing_page() {
        let table: NodeTable = [BlockNode::with_id("page", Flavour::Page)].into_iter().collect();
        let snapshot = DocSnapshot::new(3, table);
        let block = normalize(&AppendBlockParams::of_type("paragraph"), true).unwrap();
        let mut mutation = Mutation::new(Some(&snapshot));
        let placement = resolve_placement(mutation.table(), &block.placement, true).unwrap();
        let built = stage_block(&mut mutation, &block, placement).unwrap();

        assert_eq!(built.created_containers, vec![built.parent_id.clone()]);
        let note = mutation.table().get(&built.parent_id).unwrap();
        assert_eq!(note.flavour, Flavour::Note);
        assert_eq!(note.parent_id.as_deref(), Some("page"));
    }
}
