//! Declarative descriptors for the knowledge-graph schema.
//!
//! Node kinds do not share behaviour, only a declaration shape, so every kind
//! is described by the same generic [`NodeKind`] value rather than a type of
//! its own.

use serde::{Deserialize, Serialize};

// ── Attributes ────────────────────────────────────────────────────

/// Scalar types an attribute may carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Id,
    String,
    Int,
    Float,
    Boolean,
}

impl ScalarType {
    /// The GraphQL name of this scalar.
    pub fn graphql_name(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
        }
    }
}

/// A named attribute on a node kind or a relationship property set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub scalar: ScalarType,
    /// `[T]` instead of `T`.
    pub list: bool,
    /// High-dimensional vector with no structural meaning to this layer.
    /// Always a `[Float]`; never offered as a filter.
    pub embedding: bool,
}

impl Attribute {
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            list: false,
            embedding: false,
        }
    }

    pub fn list(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            list: true,
            embedding: false,
        }
    }

    pub fn embedding(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scalar: ScalarType::Float,
            list: true,
            embedding: true,
        }
    }

    /// The advisory node identifier, `id: ID`.
    pub fn id() -> Self {
        Self::scalar("id", ScalarType::Id)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::String)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Boolean)
    }

    pub fn strings(name: impl Into<String>) -> Self {
        Self::list(name, ScalarType::String)
    }

    /// Whether the attribute can appear in a node filter.
    pub fn is_filterable(&self) -> bool {
        !self.embedding
    }
}

// ── Relationships ─────────────────────────────────────────────────

/// Which side of an edge a relationship field is declared on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Declared on the source kind.
    Out,
    /// Mirror view declared on the target kind.
    In,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Out => "OUT",
            Self::In => "IN",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Out => Self::In,
            Self::In => Self::Out,
        }
    }
}

/// A traversable field on a compiled node kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipField {
    pub name: String,
    /// Node kind on the far end of the traversal.
    pub target: String,
    /// Name of the edge kind this field is a view of.
    pub edge: String,
    pub direction: Direction,
}

/// Edge-level attributes shared by every view of one edge kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertySet {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl PropertySet {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }
}

/// A directed edge kind between one source and one target node kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeKind {
    /// Globally unique name, e.g. `Drug_targets_protein`.
    pub name: String,
    /// Relationship type as stored in the graph, e.g. `Targets`. Several
    /// edge kinds may share one stored type; endpoints tell them apart.
    pub relationship_type: String,
    pub source: String,
    pub target: String,
    pub properties: Option<String>,
    /// Field on the source kind exposing the OUT view, if any.
    pub out_field: Option<String>,
    /// Field on the target kind exposing the IN view, if any.
    pub in_field: Option<String>,
}

/// Input to [`crate::SchemaBuilder::declare_edge`]: one edge kind whose OUT
/// and IN field names are derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDeclaration {
    pub name: String,
    pub relationship_type: String,
    pub source: String,
    pub target: String,
    pub properties: Option<String>,
    pub reverse: bool,
}

impl EdgeDeclaration {
    /// An edge whose stored type equals its name, with a reverse view.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            relationship_type: name.clone(),
            name,
            source: source.into(),
            target: target.into(),
            properties: None,
            reverse: true,
        }
    }

    pub fn stored_as(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_type = relationship_type.into();
        self
    }

    /// Attach the property set named after this edge.
    pub fn with_properties(mut self) -> Self {
        self.properties = Some(self.name.clone());
        self
    }

    pub fn without_reverse(mut self) -> Self {
        self.reverse = false;
        self
    }
}

// ── Node Kinds ────────────────────────────────────────────────────

/// A compiled node kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeKind {
    pub name: String,
    /// Labels the kind is stored under. Defaults to `[name]`.
    pub labels: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub relationships: Vec<RelationshipField>,
}

impl NodeKind {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipField> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Whether the storage labels differ from the kind name.
    pub fn has_custom_labels(&self) -> bool {
        self.labels.len() != 1 || self.labels[0] != self.name
    }
}

/// A relationship field resolved against the compiled schema: everything a
/// backend needs to walk one hop.
#[derive(Debug, Clone, Copy)]
pub struct Hop<'a> {
    pub field: &'a RelationshipField,
    pub edge: &'a EdgeKind,
    pub owner: &'a NodeKind,
    pub target: &'a NodeKind,
    pub properties: Option<&'a PropertySet>,
}

impl Hop<'_> {
    pub fn direction(&self) -> Direction {
        self.field.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_serializes_screaming() {
        assert_eq!(serde_json::to_string(&Direction::Out).unwrap(), "\"OUT\"");
        assert_eq!(Direction::In.reversed(), Direction::Out);
    }

    #[test]
    fn embeddings_are_float_lists_and_not_filterable() {
        let attr = Attribute::embedding("esm2_embedding");
        assert_eq!(attr.scalar, ScalarType::Float);
        assert!(attr.list);
        assert!(!attr.is_filterable());
        assert!(Attribute::strings("synonyms").is_filterable());
    }

    #[test]
    fn edge_declaration_defaults() {
        let edge = EdgeDeclaration::new("Protein_has_domain", "Protein", "ProteinDomain")
            .stored_as("Has")
            .with_properties();
        assert_eq!(edge.relationship_type, "Has");
        assert_eq!(edge.properties.as_deref(), Some("Protein_has_domain"));
        assert!(edge.reverse);
    }
}
