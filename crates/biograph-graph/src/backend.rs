//! The seam between the GraphQL layer and the store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use biograph_core::{Hop, NodeKind, RequestContext};

use crate::client::GraphError;
use crate::filter::{NodeFilter, Page, Properties};

/// A node instance as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node kind name (not the storage label).
    pub kind: String,
    /// Store-assigned handle used to continue traversals from this node.
    pub element_id: String,
    pub properties: Properties,
}

impl NodeRecord {
    /// The advisory `id` attribute, if present.
    pub fn id(&self) -> Option<&str> {
        self.properties.get("id").and_then(|v| v.as_str())
    }
}

/// One edge instance reached from a node: the far node paired with the
/// properties recorded on that specific edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub node: NodeRecord,
    pub edge_id: String,
    pub properties: Properties,
}

/// Reads (and optional writes) the GraphQL layer needs from a store.
///
/// Every call receives the request's [`RequestContext`]; implementations
/// must not carry state from one request into another.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    async fn find_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
        page: Page,
    ) -> Result<Vec<NodeRecord>, GraphError>;

    async fn count_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError>;

    /// Walk `hop` from `from`, filtering on the far node.
    async fn traverse(
        &self,
        ctx: &RequestContext,
        hop: Hop<'_>,
        from: &NodeRecord,
        filter: &NodeFilter,
        page: Page,
    ) -> Result<Vec<Neighbor>, GraphError>;

    async fn count_neighbors(
        &self,
        ctx: &RequestContext,
        hop: Hop<'_>,
        from: &NodeRecord,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError>;

    async fn create_node(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        properties: &Properties,
    ) -> Result<NodeRecord, GraphError>;

    /// Set `properties` on every node matching `filter`. A null value
    /// removes the attribute. Returns the updated nodes.
    async fn update_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
        properties: &Properties,
    ) -> Result<Vec<NodeRecord>, GraphError>;

    /// Delete matching nodes and their edges. Returns the number deleted.
    async fn delete_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError>;
}

/// The backend shared by all request tasks.
pub type SharedBackend = Arc<dyn GraphBackend>;

/// Reject property keys the kind does not declare.
pub(crate) fn validate_properties(kind: &NodeKind, properties: &Properties) -> Result<(), GraphError> {
    match properties.keys().find(|k| kind.attribute(k).is_none()) {
        Some(unknown) => Err(GraphError::UnknownAttribute {
            kind: kind.name.clone(),
            attribute: unknown.clone(),
        }),
        None => Ok(()),
    }
}
