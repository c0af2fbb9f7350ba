//! In-process graph store for tests and offline schema tooling.
//!
//! Each logical database is an independent store. Reads of a database that
//! was never written see an empty graph. Edges are matched by edge kind name,
//! which is what endpoint labels disambiguate in Neo4j.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use biograph_core::{Direction, Hop, NodeKind, RequestContext};

use crate::backend::{validate_properties, GraphBackend, Neighbor, NodeRecord};
use crate::client::GraphError;
use crate::filter::{NodeFilter, Page, Properties};

#[derive(Debug, Clone)]
struct StoredEdge {
    id: String,
    edge: String,
    source: String,
    target: String,
    properties: Properties,
}

#[derive(Debug, Default)]
struct Store {
    nodes: Vec<NodeRecord>,
    edges: Vec<StoredEdge>,
    next_id: u64,
}

impl Store {
    fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}:{:08}", self.next_id)
    }

    fn node(&self, element_id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.element_id == element_id)
    }

    fn matching<'a>(
        &'a self,
        kind: &'a NodeKind,
        filter: &'a NodeFilter,
    ) -> impl Iterator<Item = &'a NodeRecord> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.kind == kind.name && filter.matches(&n.properties))
    }

    fn neighbors<'a>(
        &'a self,
        hop: Hop<'a>,
        from: &'a NodeRecord,
        filter: &'a NodeFilter,
    ) -> impl Iterator<Item = Neighbor> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.edge == hop.edge.name)
            .filter_map(move |e| {
                let far = match hop.direction() {
                    Direction::Out if e.source == from.element_id => &e.target,
                    Direction::In if e.target == from.element_id => &e.source,
                    _ => return None,
                };
                let node = self.node(far)?;
                (node.kind == hop.target.name && filter.matches(&node.properties)).then(|| {
                    Neighbor {
                        node: node.clone(),
                        edge_id: e.id.clone(),
                        properties: e.properties.clone(),
                    }
                })
            })
    }
}

/// A [`GraphBackend`] held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    databases: RwLock<HashMap<String, Store>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node without schema checks.
    pub fn insert_node(&self, database: &str, kind: &str, properties: Properties) -> NodeRecord {
        let mut dbs = self.databases.write();
        let store = dbs.entry(database.to_string()).or_default();
        let record = NodeRecord {
            kind: kind.to_string(),
            element_id: store.allocate("n"),
            properties,
        };
        store.nodes.push(record.clone());
        record
    }

    /// Insert one instance of edge kind `edge` between two stored nodes.
    /// Returns the edge's element id.
    pub fn insert_edge(
        &self,
        database: &str,
        edge: &str,
        source: &NodeRecord,
        target: &NodeRecord,
        properties: Properties,
    ) -> String {
        let mut dbs = self.databases.write();
        let store = dbs.entry(database.to_string()).or_default();
        let id = store.allocate("e");
        store.edges.push(StoredEdge {
            id: id.clone(),
            edge: edge.to_string(),
            source: source.element_id.clone(),
            target: target.element_id.clone(),
            properties,
        });
        id
    }

    pub fn node_count(&self, database: &str) -> usize {
        self.databases
            .read()
            .get(database)
            .map_or(0, |s| s.nodes.len())
    }
}

#[async_trait]
impl GraphBackend for InMemoryBackend {
    async fn find_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
        page: Page,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        filter.validate(kind)?;
        let dbs = self.databases.read();
        Ok(dbs
            .get(&ctx.database)
            .map(|s| page.apply(s.matching(kind, filter).cloned()))
            .unwrap_or_default())
    }

    async fn count_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        filter.validate(kind)?;
        let dbs = self.databases.read();
        Ok(dbs
            .get(&ctx.database)
            .map_or(0, |s| s.matching(kind, filter).count() as i64))
    }

    async fn traverse(
        &self,
        ctx: &RequestContext,
        hop: Hop<'_>,
        from: &NodeRecord,
        filter: &NodeFilter,
        page: Page,
    ) -> Result<Vec<Neighbor>, GraphError> {
        filter.validate(hop.target)?;
        let dbs = self.databases.read();
        Ok(dbs
            .get(&ctx.database)
            .map(|s| page.apply(s.neighbors(hop, from, filter)))
            .unwrap_or_default())
    }

    async fn count_neighbors(
        &self,
        ctx: &RequestContext,
        hop: Hop<'_>,
        from: &NodeRecord,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        filter.validate(hop.target)?;
        let dbs = self.databases.read();
        Ok(dbs
            .get(&ctx.database)
            .map_or(0, |s| s.neighbors(hop, from, filter).count() as i64))
    }

    async fn create_node(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        properties: &Properties,
    ) -> Result<NodeRecord, GraphError> {
        validate_properties(kind, properties)?;
        let stored: Properties = properties
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(self.insert_node(&ctx.database, &kind.name, stored))
    }

    async fn update_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
        properties: &Properties,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        filter.validate(kind)?;
        validate_properties(kind, properties)?;
        let mut dbs = self.databases.write();
        let Some(store) = dbs.get_mut(&ctx.database) else {
            return Ok(Vec::new());
        };
        let mut updated = Vec::new();
        for node in store
            .nodes
            .iter_mut()
            .filter(|n| n.kind == kind.name && filter.matches(&n.properties))
        {
            for (key, value) in properties {
                if value.is_null() {
                    node.properties.remove(key);
                } else {
                    node.properties.insert(key.clone(), value.clone());
                }
            }
            updated.push(node.clone());
        }
        Ok(updated)
    }

    async fn delete_nodes(
        &self,
        ctx: &RequestContext,
        kind: &NodeKind,
        filter: &NodeFilter,
    ) -> Result<i64, GraphError> {
        filter.validate(kind)?;
        let mut dbs = self.databases.write();
        let Some(store) = dbs.get_mut(&ctx.database) else {
            return Ok(0);
        };
        let doomed: Vec<String> = store
            .matching(kind, filter)
            .map(|n| n.element_id.clone())
            .collect();
        store.nodes.retain(|n| !doomed.contains(&n.element_id));
        store
            .edges
            .retain(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target));
        Ok(doomed.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biograph_core::catalog::compile_biomedical;
    use serde_json::{json, Value};

    fn props(value: Value) -> Properties {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn parallel_edges_keep_their_own_properties() {
        let schema = compile_biomedical().unwrap();
        let backend = InMemoryBackend::new();
        let ctx = RequestContext::for_database("neo4j");

        let drug = backend.insert_node("neo4j", "Drug", props(json!({"id": "DB00001"})));
        let p1 = backend.insert_node("neo4j", "Protein", props(json!({"id": "P00734"})));
        backend.insert_edge(
            "neo4j",
            "Drug_targets_protein",
            &drug,
            &p1,
            props(json!({"activity_type": "Ki", "pchembl": 7.2})),
        );
        backend.insert_edge(
            "neo4j",
            "Drug_targets_protein",
            &drug,
            &p1,
            props(json!({"activity_type": "IC50", "pchembl": 6.1})),
        );

        let hop = schema.relationship("Drug", "drugTargetsProtein").unwrap();
        let out = backend
            .traverse(&ctx, hop, &drug, &NodeFilter::new(), Page::default())
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].properties.get("activity_type"), Some(&json!("Ki")));
        assert_eq!(out[1].properties.get("activity_type"), Some(&json!("IC50")));

        let back = schema
            .relationship("Protein", "drugTargetsProteinReverse")
            .unwrap();
        let count = backend
            .count_neighbors(&ctx, back, &p1, &NodeFilter::new())
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn databases_are_isolated() {
        let schema = compile_biomedical().unwrap();
        let gene = schema.node_kind("Gene").unwrap();
        let backend = InMemoryBackend::new();
        backend.insert_node("a", "Gene", props(json!({"id": "ENSG1"})));

        let in_a = backend
            .count_nodes(&RequestContext::for_database("a"), gene, &NodeFilter::new())
            .await
            .unwrap();
        let in_b = backend
            .count_nodes(&RequestContext::for_database("b"), gene, &NodeFilter::new())
            .await
            .unwrap();
        assert_eq!((in_a, in_b), (1, 0));
    }

    #[tokio::test]
    async fn create_and_delete_validate_attributes() {
        let schema = compile_biomedical().unwrap();
        let gene = schema.node_kind("Gene").unwrap();
        let backend = InMemoryBackend::new();
        let ctx = RequestContext::for_database("neo4j");

        let created = backend
            .create_node(&ctx, gene, &props(json!({"id": "ENSG1", "kegg": null})))
            .await
            .unwrap();
        assert_eq!(created.id(), Some("ENSG1"));
        assert!(!created.properties.contains_key("kegg"));

        let err = backend
            .create_node(&ctx, gene, &props(json!({"symbol": "TP53"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownAttribute { .. }));

        let deleted = backend
            .delete_nodes(&ctx, gene, &NodeFilter::new().equals("id", "ENSG1"))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(backend.node_count("neo4j"), 0);
    }

    #[tokio::test]
    async fn update_sets_and_clears_attributes() {
        let schema = compile_biomedical().unwrap();
        let gene = schema.node_kind("Gene").unwrap();
        let backend = InMemoryBackend::new();
        let ctx = RequestContext::for_database("neo4j");
        backend.insert_node("neo4j", "Gene", props(json!({"id": "ENSG1", "kegg": ["hsa:7157"]})));
        backend.insert_node("neo4j", "Gene", props(json!({"id": "ENSG2"})));

        let updated = backend
            .update_nodes(
                &ctx,
                gene,
                &NodeFilter::new().equals("id", "ENSG1"),
                &props(json!({"genes": ["TP53"], "kegg": null})),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].properties.get("genes"), Some(&json!(["TP53"])));
        assert!(!updated[0].properties.contains_key("kegg"));

        let untouched = backend
            .find_nodes(&ctx, gene, &NodeFilter::new().equals("id", "ENSG2"), Page::default())
            .await
            .unwrap();
        assert!(!untouched[0].properties.contains_key("genes"));

        let err = backend
            .update_nodes(&ctx, gene, &NodeFilter::new(), &props(json!({"symbol": "TP53"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownAttribute { .. }));
    }

    #[tokio::test]
    async fn embeddings_are_not_filterable() {
        let schema = compile_biomedical().unwrap();
        let gene = schema.node_kind("Gene").unwrap();
        let backend = InMemoryBackend::new();
        let err = backend
            .find_nodes(
                &RequestContext::for_database("neo4j"),
                gene,
                &NodeFilter::new().equals("nt_embedding", json!([0.1])),
                Page::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownAttribute { .. }));
    }
}
