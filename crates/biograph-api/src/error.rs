//! Error types for the biograph-api crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuild(#[from] async_graphql::dynamic::SchemaError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;
