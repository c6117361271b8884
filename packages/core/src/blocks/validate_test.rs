//! Tests for strict-mode field validation

#[cfg(test)]
mod tests {
    use crate::blocks::normalize::normalize;
    use crate::blocks::validate::{is_url, validate};
    use crate::models::{AppendBlockParams, ListStyle};
    use crate::operations::BlockOperationError;

    fn check(params: AppendBlockParams) -> Result<(), BlockOperationError> {
        let block = normalize(&params, true)?;
        validate(&block, &params)
    }

    fn failing_field(params: AppendBlockParams) -> String {
        match check(params) {
            Err(BlockOperationError::InvalidField { field, .. }) => field,
            other => panic!("expected InvalidField, got {other:?}"),
        }
    }

    #[test]
    fn test_divider_rejects_text_in_strict_mode() {
        let params = AppendBlockParams::of_type("divider").with_text("x");
        assert_eq!(failing_field(params.clone()), "text");

        let lenient = normalize(&params.clone().with_strict(false), true).unwrap();
        assert!(validate(&lenient, &params).is_ok());
    }

    #[test]
    fn test_bookmark_requires_url() {
        assert_eq!(failing_field(AppendBlockParams::of_type("bookmark")), "url");
        assert_eq!(
            failing_field(AppendBlockParams::of_type("bookmark").with_url("not a url")),
            "url"
        );
        assert!(check(AppendBlockParams::of_type("bookmark").with_url("https://example.com")).is_ok());
    }

    #[test]
    fn test_url_is_illegal_outside_bookmark() {
        let params = AppendBlockParams::of_type("paragraph").with_url("https://example.com");
        assert_eq!(failing_field(params), "url");
    }

    #[test]
    fn test_level_rules() {
        let mut fractional = AppendBlockParams::of_type("heading");
        fractional.level = Some(2.5);
        assert_eq!(failing_field(fractional), "level");

        let mut too_high = AppendBlockParams::of_type("heading");
        too_high.level = Some(7.0);
        assert_eq!(failing_field(too_high), "level");

        let on_paragraph = AppendBlockParams::of_type("paragraph").with_level(2);
        assert_eq!(failing_field(on_paragraph), "level");

        let conflicting = AppendBlockParams::of_type("heading2").with_level(3);
        assert_eq!(failing_field(conflicting), "level");

        let agreeing = AppendBlockParams::of_type("heading2").with_level(2);
        assert!(check(agreeing).is_ok());
    }

    #[test]
    fn test_style_and_checked_rules() {
        let style_on_code = AppendBlockParams::of_type("code").with_style(ListStyle::Todo);
        assert_eq!(failing_field(style_on_code), "style");

        let mut unknown_style = AppendBlockParams::of_type("list");
        unknown_style.style = Some("starred".to_string());
        assert_eq!(failing_field(unknown_style), "style");

        let conflicting = AppendBlockParams::of_type("todo").with_style(ListStyle::Numbered);
        assert_eq!(failing_field(conflicting), "style");

        let checked_bullet = AppendBlockParams::of_type("list").with_checked(true);
        assert_eq!(failing_field(checked_bullet), "checked");

        let checked_todo = AppendBlockParams::of_type("todo").with_checked(true);
        assert!(check(checked_todo).is_ok());
    }

    #[test]
    fn test_language_and_caption_scope() {
        let language_on_quote = AppendBlockParams::of_type("quote").with_language("rust");
        assert_eq!(failing_field(language_on_quote), "language");

        let caption_on_paragraph = AppendBlockParams::of_type("paragraph").with_caption("c");
        assert_eq!(failing_field(caption_on_paragraph), "caption");

        let mut image = AppendBlockParams::of_type("image").with_caption("c");
        image.source_id = Some("blob-1".to_string());
        assert!(check(image).is_ok());
    }

    #[test]
    fn test_attachment_requires_name_and_mime_type() {
        let mut attachment = AppendBlockParams::of_type("attachment");
        attachment.source_id = Some("blob-1".to_string());
        attachment.name = Some("report.pdf".to_string());
        assert_eq!(failing_field(attachment.clone()), "mimeType");

        attachment.mime_type = Some("application/pdf".to_string());
        assert!(check(attachment).is_ok());

        assert_eq!(failing_field(AppendBlockParams::of_type("image")), "sourceId");
    }

    #[test]
    fn test_latex_requires_expression() {
        assert_eq!(failing_field(AppendBlockParams::of_type("latex")), "latex");

        let mut latex = AppendBlockParams::of_type("latex");
        latex.latex = Some("e^{i\\pi} + 1 = 0".to_string());
        assert!(check(latex.clone()).is_ok());

        assert_eq!(failing_field(latex.with_text("x")), "text");
    }

    #[test]
    fn test_table_dimensions() {
        let mut too_wide = AppendBlockParams::of_type("table");
        too_wide.columns = Some(21.0);
        assert_eq!(failing_field(too_wide), "columns");

        let mut zero_rows = AppendBlockParams::of_type("table");
        zero_rows.rows = Some(0.0);
        assert_eq!(failing_field(zero_rows), "rows");

        let mut overflowing = AppendBlockParams::of_type("table");
        overflowing.rows = Some(1.0);
        overflowing.table_data = Some(vec![vec!["a".to_string()], vec!["b".to_string()]]);
        assert_eq!(failing_field(overflowing), "tableData");

        let mut rows_on_list = AppendBlockParams::of_type("list");
        rows_on_list.rows = Some(2.0);
        assert_eq!(failing_field(rows_on_list), "rows");
    }

    #[test]
    fn test_error_context_names_alias() {
        let err = check(AppendBlockParams::of_type("heading3").with_url("https://x.y")).unwrap_err();
        match err {
            BlockOperationError::InvalidField { type_context, .. } => {
                assert_eq!(type_context, "heading (heading3)")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/path?q=1"));
        assert!(is_url("mailto:someone@example.com"));
        assert!(!is_url("example.com"));
        assert!(!is_url("https://exa mple.com"));
        assert!(!is_url(""));
    }
}
