//! Edit panel errors.
//!
//! All of these are precondition failures reported synchronously to the caller;
//! none leave partial state behind.

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("No asset loaded")]
    NoAsset,

    #[error("Invalid attribute name: '{0}' (letters, digits and underscore only)")]
    InvalidAttributeName(String),

    #[error("Attribute already exists: {0}")]
    DuplicateAttribute(String),

    #[error("Attribute type not set: {0}")]
    MissingAttributeType(String),

    #[error("Attribute not found: {0}")]
    UnknownAttribute(String),

    #[error("Attribute is required by its asset type and cannot be deleted: {0}")]
    NotDeletable(String),

    #[error("Asset cannot be moved under {0}")]
    InvalidParent(String),

    #[error("Invalid {kind} input: {reason}")]
    InvalidInput { kind: &'static str, reason: String },

    #[error("Update for asset {actual} does not match loaded asset {expected}")]
    AssetMismatch { expected: String, actual: String },
}

pub type Result<T> = std::result::Result<T, EditError>;
