//! Write operations against Neo4j.
//!
//! Writes are unreachable when the endpoint runs with mutations disabled.
//! Properties are checked against the node kind before any statement is
//! sent.

use biograph_core::{NodeKind, RequestContext};

use crate::backend::{validate_properties, NodeRecord};
use crate::client::{GraphClient, GraphError};
use crate::cypher;
use crate::filter::{NodeFilter, Properties};
use crate::queries::node_from_row;

impl GraphClient {
    /// Create one node of `kind` and return it as stored.
    pub async fn insert_node(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        properties: &Properties,
    ) -> Result<NodeRecord, GraphError> {
        validate_properties(kind, properties)?;
        let stmt = cypher::create_node(kind, properties);
        tracing::debug!(database = %ctx.database, kind = %kind.name, cypher = %stmt.text, "create node");

        match self.query_one_on(&ctx.database, stmt.into_query()).await? {
            Some(row) => node_from_row(&row, kind),
            None => Err(GraphError::Decode {
                what: "created node",
                reason: "statement returned no row".into(),
            }),
        }
    }

    /// Set `properties` on every node of `kind` matching `filter`.
    pub async fn set_properties(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
        properties: &Properties,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        filter.validate(kind)?;
        validate_properties(kind, properties)?;
        let stmt = cypher::update_nodes(kind, filter, properties);
        tracing::debug!(database = %ctx.database, kind = %kind.name, cypher = %stmt.text, "update nodes");

        let rows = self.query_rows_on(&ctx.database, stmt.into_query()).await?;
        let mut updated = Vec::with_capacity(rows.len());
        for row in rows {
            updated.push(node_from_row(&row, kind)?);
        }
        tracing::info!(database = %ctx.database, kind = %kind.name, updated = updated.len(), "Updated nodes");
        Ok(updated)
    }

    /// Detach-delete every node of `kind` matching `filter`.
    pub async fn remove_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        filter.validate(kind)?;
        let stmt = cypher::delete_nodes(kind, filter);
        tracing::debug!(database = %ctx.database, kind = %kind.name, cypher = %stmt.text, "delete nodes");

        let deleted = self.count(ctx, stmt).await?;
        tracing::info!(database = %ctx.database, kind = %kind.name, deleted, "Deleted nodes");
        Ok(deleted)
    }
}
