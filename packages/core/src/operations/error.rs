//! Error types for the BlockOperations layer
//!
//! Every variant except `Store` is a caller error: it is reported synchronously
//! and never retried. Store failures come from the document-store collaborator
//! and are propagated unchanged.

use thiserror::Error;

/// Errors that can occur while creating, reading or exporting blocks
///
/// # Examples
///
/// ```rust
/// use blockdoc_core::operations::BlockOperationError;
///
/// let err = BlockOperationError::invalid_field("url", "bookmark", "is required");
/// assert_eq!(err.to_string(), "Invalid field 'url' for bookmark: is required");
/// ```
#[derive(Error, Debug)]
pub enum BlockOperationError {
    /// The block type is neither a canonical type nor a legacy alias
    #[error("Unsupported block type '{block_type}'. Accepted types: {}", .accepted.join(", "))]
    UnsupportedType {
        block_type: String,
        accepted: Vec<String>,
    },

    /// A field is missing, malformed, or illegal for the block type
    #[error("Invalid field '{field}' for {type_context}: {reason}")]
    InvalidField {
        field: String,
        type_context: String,
        reason: String,
    },

    /// Placement references a block that is not in the document
    #[error("Block '{block_id}' does not exist")]
    ReferenceNotFound { block_id: String },

    /// Content cannot be placed directly under a structural root
    #[error("Block '{parent_id}' ({flavour}) cannot hold content directly; target a note instead")]
    InvalidParent { parent_id: String, flavour: String },

    /// Placement index outside `[0, child_count]`
    #[error("Index {index} is out of range for parent with {child_count} children")]
    IndexOutOfRange { index: i64, child_count: usize },

    /// Conflicting or inconsistent placement options
    #[error("Invalid placement: {reason}")]
    InvalidPlacement { reason: String },

    /// The call omitted a workspace or document id and no default applies
    #[error("Missing required identifier: {missing}")]
    MissingRequiredWorkspaceOrDoc { missing: String },

    /// A staged mutation broke a tree invariant
    #[error("Validation error: {0}")]
    Validation(#[from] crate::models::ValidationError),

    /// Document store failure, passed through unchanged
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl BlockOperationError {
    /// Create an UnsupportedType error
    pub fn unsupported_type(block_type: impl Into<String>, accepted: Vec<String>) -> Self {
        Self::UnsupportedType {
            block_type: block_type.into(),
            accepted,
        }
    }

    /// Create an InvalidField error
    pub fn invalid_field(
        field: impl Into<String>,
        type_context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            field: field.into(),
            type_context: type_context.into(),
            reason: reason.into(),
        }
    }

    /// Create a ReferenceNotFound error
    pub fn reference_not_found(block_id: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            block_id: block_id.into(),
        }
    }

    /// Create an InvalidParent error
    pub fn invalid_parent(parent_id: impl Into<String>, flavour: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
            flavour: flavour.into(),
        }
    }

    /// Create an IndexOutOfRange error
    pub fn index_out_of_range(index: i64, child_count: usize) -> Self {
        Self::IndexOutOfRange { index, child_count }
    }

    /// Create an InvalidPlacement error
    pub fn invalid_placement(reason: impl Into<String>) -> Self {
        Self::InvalidPlacement {
            reason: reason.into(),
        }
    }

    /// Create a MissingRequiredWorkspaceOrDoc error
    pub fn missing_required(missing: impl Into<String>) -> Self {
        Self::MissingRequiredWorkspaceOrDoc {
            missing: missing.into(),
        }
    }

    /// Stable variant name, used as the `type` of structured error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "UnsupportedType",
            Self::InvalidField { .. } => "InvalidField",
            Self::ReferenceNotFound { .. } => "ReferenceNotFound",
            Self::InvalidParent { .. } => "InvalidParent",
            Self::IndexOutOfRange { .. } => "IndexOutOfRange",
            Self::InvalidPlacement { .. } => "InvalidPlacement",
            Self::MissingRequiredWorkspaceOrDoc { .. } => "MissingRequiredWorkspaceOrDoc",
            Self::Validation(_) => "ValidationError",
            Self::Store(_) => "StoreError",
        }
    }

    /// True for errors caused by the request itself rather than the store
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationError;

    #[test]
    fn test_unsupported_type_lists_accepted_names() {
        let err = BlockOperationError::unsupported_type(
            "widget",
            vec!["paragraph".to_string(), "heading1".to_string()],
        );
        assert!(matches!(err, BlockOperationError::UnsupportedType { .. }));
        assert_eq!(
            format!("{}", err),
            "Unsupported block type 'widget'. Accepted types: paragraph, heading1"
        );
    }

    #[test]
    fn test_invalid_field_error() {
        let err = BlockOperationError::invalid_field("text", "divider", "must be empty");
        assert_eq!(err.kind(), "InvalidField");
        assert_eq!(
            format!("{}", err),
            "Invalid field 'text' for divider: must be empty"
        );
    }

    #[test]
    fn test_reference_not_found_error() {
        let err = BlockOperationError::reference_not_found("missing-block");
        assert_eq!(format!("{}", err), "Block 'missing-block' does not exist");
    }

    #[test]
    fn test_index_out_of_range_error() {
        let err = BlockOperationError::index_out_of_range(7, 2);
        assert_eq!(
            format!("{}", err),
            "Index 7 is out of range for parent with 2 children"
        );
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err = BlockOperationError::from(anyhow::anyhow!("connection reset"));
        assert_eq!(format!("{}", err), "connection reset");
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_validation_error_converts() {
        let err: BlockOperationError = ValidationError::UnknownBlock("x".to_string()).into();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.is_caller_error());
    }
}
