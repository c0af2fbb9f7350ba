//! Read operations against Neo4j, and the [`GraphBackend`] implementation
//! for [`GraphClient`].

use async_trait::async_trait;
use serde_json::Value;

use biograph_core::{Attribute, Hop, NodeKind, RequestContext, ScalarType};

use crate::backend::{GraphBackend, Neighbor, NodeRecord};
use crate::client::{GraphClient, GraphError};
use crate::cypher;
use crate::filter::{NodeFilter, Page, Properties};

impl GraphClient {
    // ── Node Queries ─────────────────────────────────────────────

    /// List nodes of `kind` matching `filter`, ordered by element id.
    pub async fn list_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
        page: Page,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        filter.validate(kind)?;
        let stmt = cypher::match_nodes(kind, filter, page);
        tracing::debug!(database = %ctx.database, kind = %kind.name, cypher = %stmt.text, "list nodes");

        let rows = self.query_rows_on(&ctx.database, stmt.into_query()).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(node_from_row(&row, kind)?);
        }
        Ok(results)
    }

    pub async fn count_matching(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        filter.validate(kind)?;
        let stmt = cypher::count_nodes(kind, filter);
        self.count(ctx, stmt).await
    }

    // ── Neighbor Queries ─────────────────────────────────────────

    /// Walk one relationship field from `from`. Each returned neighbor
    /// carries the properties of the edge instance that reached it.
    pub async fn get_neighbors(
        &self,
        ctx: &RequestContext,
        hop: Hop<'_>,
        from: &NodeRecord,
        filter: &NodeFilter,
        page: Page,
    ) -> Result<Vec<Neighbor>, GraphError> {
        filter.validate(hop.target)?;
        let stmt = cypher::traverse(hop, &from.element_id, filter, page);
        tracing::debug!(
            database = %ctx.database,
            field = %hop.field.name,
            edge = %hop.edge.name,
            cypher = %stmt.text,
            "traverse"
        );

        let edge_attributes = hop
            .properties
            .map(|p| p.attributes.as_slice())
            .unwrap_or(&[]);

        let rows = self.query_rows_on(&ctx.database, stmt.into_query()).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node = node_from_row(&row, hop.target)?;
            let rel: neo4rs::Relation = row.get("r").map_err(|e| GraphError::Decode {
                what: "relationship",
                reason: e.to_string(),
            })?;
            let edge_id: String = row.get("rid").map_err(|e| GraphError::Decode {
                what: "relationship id",
                reason: e.to_string(),
            })?;
            results.push(Neighbor {
                node,
                edge_id,
                properties: decode_properties(&rel, edge_attributes),
            });
        }
        Ok(results)
    }

    pub async fn count_neighbors_of(
        &self,
        ctx: &RequestContext,
        hop: Hop<'_>,
        from: &NodeRecord,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        filter.validate(hop.target)?;
        let stmt = cypher::count_neighbors(hop, &from.element_id, filter);
        self.count(ctx, stmt).await
    }

    pub(crate) async fn count(
        &self,
        ctx: &RequestContext,
        stmt: cypher::Statement,
    ) -> Result<i64, GraphError> {
        match self.query_one_on(&ctx.database, stmt.into_query()).await? {
            Some(row) => row.get::<i64>("cnt").map_err(|e| GraphError::Decode {
                what: "count",
                reason: e.to_string(),
            }),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl GraphBackend for GraphClient {
    async fn find_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
        page: Page,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        self.list_nodes(ctx, kind, filter, page).await
    }

    async fn count_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        self.count_matching(ctx, kind, filter).await
    }

    async fn traverse(
        &self,
        ctx: &RequestContext,
        hop: Hop<'_>,
        from: &NodeRecord,
        filter: &NodeFilter,
        page: Page,
    ) -> Result<Vec<Neighbor>, GraphError> {
        self.get_neighbors(ctx, hop, from, filter, page).await
    }

    async fn count_neighbors(
        &self,
        ctx: &RequestContext,
        hop: Hop<'_>,
        from: &NodeRecord,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        self.count_neighbors_of(ctx, hop, from, filter).await
    }

    async fn create_node(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        properties: &Properties,
    ) -> Result<NodeRecord, GraphError> {
        self.insert_node(ctx, kind, properties).await
    }

    async fn update_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
        properties: &Properties,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        self.set_properties(ctx, kind, filter, properties).await
    }

    async fn delete_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        self.remove_nodes(ctx, kind, filter).await
    }
}

// ── Decoding ─────────────────────────────────────────────────────

/// Anything holding Bolt properties.
pub(crate) trait PropertySource {
    fn raw(&self, key: &str) -> Option<Value>;
}

impl PropertySource for neo4rs::Node {
    fn raw(&self, key: &str) -> Option<Value> {
        self.get::<Value>(key).ok()
    }
}

impl PropertySource for neo4rs::Relation {
    fn raw(&self, key: &str) -> Option<Value> {
        self.get::<Value>(key).ok()
    }
}

/// Read the declared attributes off `source`. Undeclared properties stored
/// in the graph are not exposed.
pub(crate) fn decode_properties(source: &impl PropertySource, attributes: &[Attribute]) -> Properties {
    attributes
        .iter()
        .filter_map(|attr| {
            let value = source.raw(&attr.name)?;
            Some((attr.name.clone(), normalize(attr, value)))
        })
        .collect()
}

/// Coerce a stored value to the declared scalar where the store is looser:
/// integers in float attributes, numeric ids.
fn normalize(attr: &Attribute, value: Value) -> Value {
    match value {
        Value::Array(items) if attr.list => Value::Array(
            items
                .into_iter()
                .map(|v| coerce(attr.scalar, v))
                .collect(),
        ),
        other => coerce(attr.scalar, other),
    }
}

fn coerce(scalar: ScalarType, value: Value) -> Value {
    match (scalar, value) {
        (ScalarType::Float, Value::Number(n)) => n
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        (ScalarType::Id, Value::Number(n)) => Value::String(n.to_string()),
        (_, other) => other,
    }
}

pub(crate) fn node_from_row(row: &neo4rs::Row, kind: &NodeKind) -> Result<NodeRecord, GraphError> {
    let node: neo4rs::Node = row.get("n").map_err(|e| GraphError::Decode {
        what: "node",
        reason: e.to_string(),
    })?;
    let element_id: String = row.get("eid").map_err(|e| GraphError::Decode {
        what: "node id",
        reason: e.to_string(),
    })?;
    Ok(NodeRecord {
        kind: kind.name.clone(),
        element_id,
        properties: decode_properties(&node, &kind.attributes),
    })
}
