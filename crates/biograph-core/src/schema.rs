//! Schema declaration and compilation.
//!
//! Declarations are collected by [`SchemaBuilder`] in a single pass and
//! validated together by [`SchemaBuilder::compile`]. Forward references are
//! allowed: a field may target a kind declared later. The resulting
//! [`CompiledSchema`] is immutable and safe to share across request tasks.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{BiographError, SchemaError};
use crate::naming::{edge_field_name, is_valid_name, reverse_field_name};
use crate::types::{
    Attribute, Direction, EdgeDeclaration, EdgeKind, Hop, NodeKind, PropertySet,
    RelationshipField,
};

#[derive(Debug, Clone)]
struct NodeDecl {
    name: String,
    labels: Vec<String>,
    attributes: Vec<Attribute>,
}

#[derive(Debug, Clone)]
struct FieldDecl {
    owner: String,
    name: String,
    target: String,
    relationship_type: String,
    direction: Direction,
    properties: Option<String>,
    /// Set when the field was derived from [`SchemaBuilder::declare_edge`].
    edge: Option<String>,
}

impl FieldDecl {
    /// `(source, target)` of the underlying edge, whichever side declares it.
    fn endpoints(&self) -> (&str, &str) {
        match self.direction {
            Direction::Out => (&self.owner, &self.target),
            Direction::In => (&self.target, &self.owner),
        }
    }

    fn edge_key(&self) -> String {
        if let Some(edge) = &self.edge {
            return edge.clone();
        }
        if let Some(properties) = &self.properties {
            return properties.clone();
        }
        let (source, target) = self.endpoints();
        format!("{source}_{}_{target}", self.relationship_type)
    }
}

/// Collects node kinds, relationship fields, and property sets.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    nodes: Vec<NodeDecl>,
    fields: Vec<FieldDecl>,
    property_sets: Vec<PropertySet>,
    edge_names: Vec<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node kind stored under a label equal to its name.
    pub fn declare_node_kind(
        &mut self,
        name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> &mut Self {
        let name = name.into();
        self.nodes.push(NodeDecl {
            labels: vec![name.clone()],
            name,
            attributes,
        });
        self
    }

    /// Register a node kind stored under explicit labels.
    pub fn declare_node_kind_with_labels(
        &mut self,
        name: impl Into<String>,
        labels: &[&str],
        attributes: Vec<Attribute>,
    ) -> &mut Self {
        self.nodes.push(NodeDecl {
            name: name.into(),
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            attributes,
        });
        self
    }

    /// Register one traversable field. `edge_type_name` is the stored
    /// relationship type.
    pub fn declare_relationship_field(
        &mut self,
        owning_kind: impl Into<String>,
        field_name: impl Into<String>,
        target_kind: impl Into<String>,
        edge_type_name: impl Into<String>,
        direction: Direction,
        property_kind: Option<&str>,
    ) -> &mut Self {
        self.fields.push(FieldDecl {
            owner: owning_kind.into(),
            name: field_name.into(),
            target: target_kind.into(),
            relationship_type: edge_type_name.into(),
            direction,
            properties: property_kind.map(str::to_string),
            edge: None,
        });
        self
    }

    /// Register the property set shared by both views of one edge kind.
    pub fn declare_relationship_properties(
        &mut self,
        edge_type_name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> &mut Self {
        self.property_sets.push(PropertySet {
            name: edge_type_name.into(),
            attributes,
        });
        self
    }

    /// Register an edge kind and derive its OUT field on the source and,
    /// unless disabled, its `...Reverse` IN field on the target.
    pub fn declare_edge(&mut self, edge: EdgeDeclaration) -> &mut Self {
        self.edge_names.push(edge.name.clone());
        self.fields.push(FieldDecl {
            owner: edge.source.clone(),
            name: edge_field_name(&edge.name),
            target: edge.target.clone(),
            relationship_type: edge.relationship_type.clone(),
            direction: Direction::Out,
            properties: edge.properties.clone(),
            edge: Some(edge.name.clone()),
        });
        if edge.reverse {
            self.fields.push(FieldDecl {
                owner: edge.target,
                name: reverse_field_name(&edge.name),
                target: edge.source,
                relationship_type: edge.relationship_type,
                direction: Direction::In,
                properties: edge.properties,
                edge: Some(edge.name),
            });
        }
        self
    }

    /// Convenience for declaring an edge together with its property set.
    pub fn declare_edge_with_properties(
        &mut self,
        edge: EdgeDeclaration,
        attributes: Vec<Attribute>,
    ) -> &mut Self {
        let edge = edge.with_properties();
        self.declare_relationship_properties(edge.name.clone(), attributes);
        self.declare_edge(edge)
    }

    /// Validate every declaration for referential consistency.
    pub fn compile(&self) -> Result<CompiledSchema, SchemaError> {
        self.check_names()?;
        self.check_kind_uniqueness()?;

        let mut nodes: Vec<NodeKind> = self
            .nodes
            .iter()
            .map(|n| NodeKind {
                name: n.name.clone(),
                labels: n.labels.clone(),
                attributes: n.attributes.clone(),
                relationships: Vec::new(),
            })
            .collect();
        let node_index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();
        let property_index: HashMap<String, usize> = self
            .property_sets
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();

        let mut taken: Vec<HashSet<String>> = nodes
            .iter()
            .map(|n| n.attributes.iter().map(|a| a.name.clone()).collect())
            .collect();
        let mut edges: Vec<EdgeKind> = Vec::new();
        let mut edge_index: HashMap<String, usize> = HashMap::new();

        for field in &self.fields {
            let owner_idx =
                *node_index
                    .get(&field.owner)
                    .ok_or_else(|| SchemaError::UnknownNodeKind {
                        owner: field.owner.clone(),
                        field: field.name.clone(),
                        kind: field.owner.clone(),
                    })?;
            if !node_index.contains_key(&field.target) {
                return Err(SchemaError::UnknownNodeKind {
                    owner: field.owner.clone(),
                    field: field.name.clone(),
                    kind: field.target.clone(),
                });
            }
            if let Some(properties) = &field.properties {
                if !property_index.contains_key(properties) {
                    return Err(SchemaError::UnknownPropertySet {
                        owner: field.owner.clone(),
                        field: field.name.clone(),
                        properties: properties.clone(),
                    });
                }
            }
            if !taken[owner_idx].insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    owner: field.owner.clone(),
                    field: field.name.clone(),
                });
            }

            let key = field.edge_key();
            let edge_idx = match edge_index.get(&key) {
                Some(&idx) => {
                    let existing = &edges[idx];
                    let (source, target) = field.endpoints();
                    if existing.relationship_type != field.relationship_type
                        || existing.source != source
                        || existing.target != target
                        || existing.properties != field.properties
                    {
                        return Err(SchemaError::PropertySetConflict {
                            owner: field.owner.clone(),
                            field: field.name.clone(),
                            properties: key,
                        });
                    }
                    idx
                }
                None => {
                    let (source, target) = field.endpoints();
                    edges.push(EdgeKind {
                        name: key.clone(),
                        relationship_type: field.relationship_type.clone(),
                        source: source.to_string(),
                        target: target.to_string(),
                        properties: field.properties.clone(),
                        out_field: None,
                        in_field: None,
                    });
                    edge_index.insert(key.clone(), edges.len() - 1);
                    edges.len() - 1
                }
            };

            let edge = &mut edges[edge_idx];
            let slot = match field.direction {
                Direction::Out => &mut edge.out_field,
                Direction::In => &mut edge.in_field,
            };
            if let Some(existing) = slot {
                return Err(SchemaError::DuplicateEdgeView {
                    edge: key,
                    direction: field.direction.as_str(),
                    existing: existing.clone(),
                    owner: field.owner.clone(),
                    field: field.name.clone(),
                });
            }
            *slot = Some(field.name.clone());

            nodes[owner_idx].relationships.push(RelationshipField {
                name: field.name.clone(),
                target: field.target.clone(),
                edge: key,
                direction: field.direction,
            });
        }

        tracing::debug!(
            node_kinds = nodes.len(),
            edge_kinds = edges.len(),
            property_sets = self.property_sets.len(),
            "Schema compiled"
        );

        Ok(CompiledSchema {
            nodes,
            edges,
            property_sets: self.property_sets.clone(),
            node_index,
            edge_index,
            property_index,
        })
    }

    fn check_names(&self) -> Result<(), SchemaError> {
        let invalid = |name: &str| SchemaError::InvalidName {
            name: name.to_string(),
        };
        for node in &self.nodes {
            let names = std::iter::once(&node.name)
                .chain(&node.labels)
                .chain(node.attributes.iter().map(|a| &a.name));
            if let Some(bad) = names.into_iter().find(|n| !is_valid_name(n)) {
                return Err(invalid(bad));
            }
        }
        for set in &self.property_sets {
            let names = std::iter::once(&set.name).chain(set.attributes.iter().map(|a| &a.name));
            if let Some(bad) = names.into_iter().find(|n| !is_valid_name(n)) {
                return Err(invalid(bad));
            }
        }
        for field in &self.fields {
            for name in [&field.name, &field.relationship_type] {
                if !is_valid_name(name) {
                    return Err(invalid(name));
                }
            }
        }
        Ok(())
    }

    fn check_kind_uniqueness(&self) -> Result<(), SchemaError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let kinds = self
            .nodes
            .iter()
            .map(|n| n.name.as_str())
            .chain(self.property_sets.iter().map(|p| p.name.as_str()));
        for name in kinds {
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateKind {
                    name: name.to_string(),
                });
            }
        }
        if let Some(clash) = self
            .edge_names
            .iter()
            .find(|e| self.nodes.iter().any(|n| &n.name == *e))
        {
            return Err(SchemaError::DuplicateKind {
                name: clash.clone(),
            });
        }

        for node in &self.nodes {
            check_unique_attributes(&node.name, &node.attributes)?;
        }
        for set in &self.property_sets {
            check_unique_attributes(&set.name, &set.attributes)?;
        }
        Ok(())
    }
}

fn check_unique_attributes(owner: &str, attributes: &[Attribute]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for attr in attributes {
        if !seen.insert(attr.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                owner: owner.to_string(),
                field: attr.name.clone(),
            });
        }
    }
    Ok(())
}

/// The validated, immutable schema.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    nodes: Vec<NodeKind>,
    edges: Vec<EdgeKind>,
    property_sets: Vec<PropertySet>,
    node_index: HashMap<String, usize>,
    edge_index: HashMap<String, usize>,
    property_index: HashMap<String, usize>,
}

impl CompiledSchema {
    /// Node kinds in declaration order.
    pub fn node_kinds(&self) -> &[NodeKind] {
        &self.nodes
    }

    pub fn node_kind(&self, name: &str) -> Option<&NodeKind> {
        self.node_index.get(name).map(|&i| &self.nodes[i])
    }

    /// Edge kinds in order of first appearance.
    pub fn edge_kinds(&self) -> &[EdgeKind] {
        &self.edges
    }

    pub fn edge_kind(&self, name: &str) -> Option<&EdgeKind> {
        self.edge_index.get(name).map(|&i| &self.edges[i])
    }

    pub fn property_sets(&self) -> &[PropertySet] {
        &self.property_sets
    }

    pub fn property_set(&self, name: &str) -> Option<&PropertySet> {
        self.property_index.get(name).map(|&i| &self.property_sets[i])
    }

    /// The node kinds, edge kinds, and property sets as one JSON document.
    pub fn to_json(&self) -> Result<String, BiographError> {
        #[derive(Serialize)]
        struct Document<'a> {
            node_kinds: &'a [NodeKind],
            edge_kinds: &'a [EdgeKind],
            property_sets: &'a [PropertySet],
        }

        Ok(serde_json::to_string_pretty(&Document {
            node_kinds: &self.nodes,
            edge_kinds: &self.edges,
            property_sets: &self.property_sets,
        })?)
    }

    /// Resolve `owner.field` into a [`Hop`].
    pub fn relationship(&self, owner: &str, field: &str) -> Option<Hop<'_>> {
        let owner = self.node_kind(owner)?;
        let field = owner.relationship(field)?;
        self.hop(owner, field)
    }

    /// Every relationship field of `owner`, resolved.
    pub fn relationships(&self, owner: &str) -> Vec<Hop<'_>> {
        match self.node_kind(owner) {
            Some(kind) => kind
                .relationships
                .iter()
                .filter_map(|field| self.hop(kind, field))
                .collect(),
            None => Vec::new(),
        }
    }

    fn hop<'a>(&'a self, owner: &'a NodeKind, field: &'a RelationshipField) -> Option<Hop<'a>> {
        let edge = self.edge_kind(&field.edge)?;
        let target = self.node_kind(&field.target)?;
        let properties = edge
            .properties
            .as_deref()
            .and_then(|name| self.property_set(name));
        Some(Hop {
            field,
            edge,
            owner,
            target,
            properties,
        })
    }
}
