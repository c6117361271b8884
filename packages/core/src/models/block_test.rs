//! Tests for BlockNode and Flavour

#[cfg(test)]
mod tests {
    use crate::models::{BlockNode, EmbedKind, Flavour, RichText, ValidationError};
    use serde_json::json;

    #[test]
    fn test_new_assigns_unique_ids() {
        let a = BlockNode::new(Flavour::Paragraph);
        let b = BlockNode::new(Flavour::Paragraph);

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(a.parent_id.is_none());
        assert!(a.children.is_empty());
    }

    #[test]
    fn test_flavour_string_roundtrip() {
        for name in ["page", "note", "table", "embed-youtube", "embed-linked-doc"] {
            assert_eq!(Flavour::from(name).as_str(), name);
        }
        assert_eq!(
            Flavour::from("embed-figma"),
            Flavour::Embed(EmbedKind::Figma)
        );
    }

    #[test]
    fn test_unknown_flavour_is_preserved() {
        let flavour = Flavour::from("mindmap");
        assert_eq!(flavour, Flavour::Unknown("mindmap".to_string()));
        assert_eq!(String::from(flavour), "mindmap");
    }

    #[test]
    fn test_deserialize_snapshot_node() {
        let node: BlockNode = serde_json::from_value(json!({
            "id": "b1",
            "parentId": "note",
            "flavour": "list",
            "type": "todo",
            "text": "ship it",
            "props": {"checked": true}
        }))
        .unwrap();

        assert_eq!(node.flavour, Flavour::List);
        assert_eq!(node.block_type.as_deref(), Some("todo"));
        assert_eq!(node.plain_text(), "ship it");
        assert_eq!(node.prop_bool("checked"), Some(true));
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_heading_level_only_for_paragraph() {
        let heading = BlockNode::new(Flavour::Paragraph).with_type("h3");
        assert_eq!(heading.heading_level(), Some(3));

        let text = BlockNode::new(Flavour::Paragraph).with_type("text");
        assert_eq!(text.heading_level(), None);

        let list = BlockNode::new(Flavour::List).with_type("h2");
        assert_eq!(list.heading_level(), None);

        let bogus = BlockNode::new(Flavour::Paragraph).with_type("h9");
        assert_eq!(bogus.heading_level(), None);
    }

    #[test]
    fn test_validate_rejects_property_outside_schema() {
        let node = BlockNode::new(Flavour::Paragraph).with_prop("language", json!("rust"));

        assert_eq!(
            node.validate(),
            Err(ValidationError::UnexpectedProperty {
                flavour: "paragraph".to_string(),
                key: "language".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_accepts_any_property_on_unknown_flavour() {
        let node = BlockNode::new(Flavour::from("mindmap")).with_prop("layout", json!("radial"));
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_text_on_divider() {
        let node = BlockNode::new(Flavour::Divider).with_text(RichText::plain("x"));
        assert_eq!(
            node.validate(),
            Err(ValidationError::UnexpectedText("divider".to_string()))
        );

        let empty = BlockNode::new(Flavour::Divider).with_text(RichText::plain(""));
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_self_reference() {
        let node = BlockNode::with_id("loop", Flavour::Note).with_children(vec!["loop".to_string()]);
        assert_eq!(
            node.validate(),
            Err(ValidationError::SelfReference("loop".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        let node = BlockNode::with_id("", Flavour::Paragraph);
        assert_eq!(
            node.validate(),
            Err(ValidationError::MissingField("id".to_string()))
        );
    }

    #[test]
    fn test_container_classification() {
        assert!(Flavour::Note.is_container());
        assert!(Flavour::Page.is_structural_root());
        assert!(!Flavour::Note.is_structural_root());
        assert!(Flavour::Callout.carries_text());
        assert!(!Flavour::Table.carries_text());
    }
}
