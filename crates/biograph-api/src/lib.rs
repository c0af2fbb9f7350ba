//! biograph-api: GraphQL endpoint over the biomedical knowledge graph.
//!
//! The GraphQL schema is generated at startup from the compiled
//! knowledge-graph schema and answered through a shared graph backend.

pub mod error;
pub mod inputs;
pub mod resolvers;
pub mod schema;
pub mod server;

pub use error::ApiError;
pub use schema::{build_schema, SchemaOptions};
pub use server::{router, serve, AppState, DATABASE_HEADER};
