//! biograph-core: Schema model, catalog, configuration, and error handling.
//!
//! This crate provides the foundational pieces shared by the graph backend
//! and the GraphQL API:
//! - Node kind, edge kind, and property set descriptors
//! - The schema builder and compiler
//! - The canonical biomedical catalog
//! - Configuration and per-request context
//! - Common error types

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod naming;
pub mod schema;
pub mod sdl;
pub mod types;

pub use config::ServiceConfig;
pub use context::RequestContext;
pub use error::{BiographError, SchemaError};
pub use schema::{CompiledSchema, SchemaBuilder};
pub use types::{
    Attribute, Direction, EdgeDeclaration, EdgeKind, Hop, NodeKind, PropertySet,
    RelationshipField, ScalarType,
};
