use thiserror::Error;

/// Schema compilation failures. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate kind name: {name}")]
    DuplicateKind { name: String },

    #[error("Duplicate attribute or field {field} on {owner}")]
    DuplicateField { owner: String, field: String },

    #[error("Invalid name: {name}")]
    InvalidName { name: String },

    #[error("Unknown node kind {kind} referenced by {owner}.{field}")]
    UnknownNodeKind {
        owner: String,
        field: String,
        kind: String,
    },

    #[error("Unknown relationship property set {properties} referenced by {owner}.{field}")]
    UnknownPropertySet {
        owner: String,
        field: String,
        properties: String,
    },

    #[error("Relationship property set {properties} is used by {owner}.{field} with a different relationship type or endpoints")]
    PropertySetConflict {
        owner: String,
        field: String,
        properties: String,
    },

    #[error("Edge kind {edge} already has a {direction} view ({existing}); {owner}.{field} duplicates it")]
    DuplicateEdgeView {
        edge: String,
        direction: &'static str,
        existing: String,
        owner: String,
        field: String,
    },
}

/// Top-level error type for biograph.
#[derive(Error, Debug)]
pub enum BiographError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
