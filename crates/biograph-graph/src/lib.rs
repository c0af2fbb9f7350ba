//! biograph-graph: Graph store access for the biomedical GraphQL endpoint.
//!
//! The GraphQL layer talks to a [`GraphBackend`]. Two implementations are
//! provided: [`GraphClient`] over Neo4j, and [`InMemoryBackend`] for tests
//! and offline tooling. Every operation takes the request's database from
//! its [`biograph_core::RequestContext`].

pub mod backend;
pub mod client;
pub mod cypher;
pub mod filter;
pub mod memory;
pub mod mutations;
pub mod queries;

pub use backend::{GraphBackend, Neighbor, NodeRecord, SharedBackend};
pub use client::{GraphClient, GraphConfig, GraphError};
pub use filter::{Condition, NodeFilter, Page, Predicate, Properties};
pub use memory::InMemoryBackend;
