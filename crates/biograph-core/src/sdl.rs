//! Render a compiled schema as Neo4j GraphQL type definitions.
//!
//! The output uses the `@node`, `@relationship`, and
//! `@relationshipProperties` directives, so existing tooling that consumes
//! those type definitions can be pointed at the same model.

use std::fmt::Write;

use crate::schema::CompiledSchema;
use crate::types::{Attribute, NodeKind};

impl CompiledSchema {
    /// Type definitions for every node kind followed by every non-empty
    /// property set.
    pub fn to_sdl(&self) -> String {
        let mut out = String::new();
        for kind in self.node_kinds() {
            self.write_node_kind(&mut out, kind);
        }
        for set in self.property_sets().iter().filter(|s| !s.attributes.is_empty()) {
            let _ = writeln!(out, "interface {} @relationshipProperties {{", set.name);
            for attr in &set.attributes {
                let _ = writeln!(out, "    {}: {}", attr.name, attribute_type(attr));
            }
            out.push_str("}\n\n");
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
        out
    }

    fn write_node_kind(&self, out: &mut String, kind: &NodeKind) {
        let _ = write!(out, "type {}", kind.name);
        if kind.has_custom_labels() {
            let labels: Vec<String> = kind.labels.iter().map(|l| format!("\"{l}\"")).collect();
            let _ = write!(out, " @node(labels: [{}])", labels.join(", "));
        }
        out.push_str(" {\n");
        for attr in &kind.attributes {
            let _ = writeln!(out, "    {}: {}", attr.name, attribute_type(attr));
        }
        for hop in self.relationships(&kind.name) {
            let _ = write!(
                out,
                "    {}: [{}!]! @relationship(type: \"{}\", direction: {}",
                hop.field.name,
                hop.target.name,
                hop.edge.relationship_type,
                hop.direction().as_str(),
            );
            if let Some(props) = hop.properties.filter(|p| !p.attributes.is_empty()) {
                let _ = write!(out, ", properties: \"{}\"", props.name);
            }
            out.push_str(")\n");
        }
        out.push_str("}\n\n");
    }
}

fn attribute_type(attr: &Attribute) -> String {
    let name = attr.scalar.graphql_name();
    if attr.list {
        format!("[{name}]")
    } else {
        name.to_string()
    }
}
