//! GraphQL schema generation from a compiled knowledge-graph schema.

use std::collections::HashSet;
use std::sync::Arc;

use async_graphql::dynamic::{Object, Schema};

use biograph_core::{CompiledSchema, RequestContext, ServiceConfig};
use biograph_graph::SharedBackend;

use crate::error::Result;
use crate::inputs::{create_input, options_input, update_input, where_input, where_type_name};
use crate::resolvers::{
    connection_field, connection_object, count_field, create_field, delete_field,
    delete_info_object, edge_attribute_field, list_field, node_attribute_field,
    relationship_field, relationship_object, update_field,
};

pub const QUERY_TYPE: &str = "Query";
pub const MUTATION_TYPE: &str = "Mutation";

/// Knobs for the generated schema.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Expose `create*` / `update*` / `delete*` mutations.
    pub mutations_enabled: bool,
    /// Database used when a request carries no [`RequestContext`].
    pub default_database: String,
    pub depth_limit: usize,
    pub complexity_limit: usize,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self::from(&ServiceConfig::default())
    }
}

impl From<&ServiceConfig> for SchemaOptions {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            mutations_enabled: config.api.mutations_enabled,
            default_database: config.neo4j.database.clone(),
            depth_limit: config.api.depth_limit,
            complexity_limit: config.api.complexity_limit,
        }
    }
}

/// Build the executable GraphQL schema.
///
/// Every node kind becomes an object type with its attributes, one list
/// field and one connection field per relationship field, a `Where` input,
/// and root `ks` / `ksCount` queries. Property sets become object types
/// named after the set.
pub fn build_schema(
    compiled: Arc<CompiledSchema>,
    backend: SharedBackend,
    options: &SchemaOptions,
) -> Result<Schema> {
    let mutation = options.mutations_enabled.then_some(MUTATION_TYPE);
    let mut builder = Schema::build(QUERY_TYPE, mutation, None).register(options_input());

    // Property sets.
    for set in compiled.property_sets().iter().filter(|s| !s.attributes.is_empty()) {
        let object = set
            .attributes
            .iter()
            .fold(Object::new(set.name.as_str()), |object, attr| {
                object.field(edge_attribute_field(attr))
            });
        builder = builder.register(object);
    }

    // Where inputs first, so relationship fields know which targets have one.
    let mut filterable = HashSet::new();
    for kind in compiled.node_kinds() {
        if let Some(input) = where_input(kind) {
            filterable.insert(kind.name.clone());
            builder = builder.register(input);
        }
    }
    let where_of = |kind: &str| filterable.contains(kind).then(|| where_type_name(kind));

    let mut query = Object::new(QUERY_TYPE);
    let mut mutations = Object::new(MUTATION_TYPE);

    for kind in compiled.node_kinds() {
        let mut object = kind
            .attributes
            .iter()
            .fold(Object::new(kind.name.as_str()), |object, attr| {
                object.field(node_attribute_field(attr))
            });

        for hop in compiled.relationships(&kind.name) {
            let target_where = where_of(&hop.target.name);
            let properties = hop
                .properties
                .filter(|p| !p.attributes.is_empty())
                .map(|p| p.name.as_str());

            object = object
                .field(relationship_field(
                    &compiled,
                    &kind.name,
                    hop.field,
                    target_where.as_deref(),
                ))
                .field(connection_field(&kind.name, hop.field, target_where.as_deref()));
            builder = builder
                .register(connection_object(&compiled, &kind.name, hop.field))
                .register(relationship_object(&kind.name, hop.field, properties));
        }
        builder = builder.register(object);

        let own_where = where_of(&kind.name);
        query = query
            .field(list_field(&compiled, kind, own_where.as_deref()))
            .field(count_field(&compiled, kind, own_where.as_deref()));

        if options.mutations_enabled {
            builder = builder.register(create_input(kind));
            mutations = mutations.field(create_field(&compiled, kind));
            if own_where.is_some() {
                builder = builder.register(update_input(kind));
                mutations = mutations
                    .field(update_field(&compiled, kind))
                    .field(delete_field(&compiled, kind));
            }
        }
    }

    builder = builder.register(query);
    if options.mutations_enabled {
        builder = builder.register(delete_info_object()).register(mutations);
    }

    let schema = builder
        .data(backend)
        .data(compiled.clone())
        .data(RequestContext::for_database(options.default_database.as_str()))
        .limit_depth(options.depth_limit)
        .limit_complexity(options.complexity_limit)
        .finish()?;

    tracing::info!(
        node_kinds = compiled.node_kinds().len(),
        edge_kinds = compiled.edge_kinds().len(),
        mutations = options.mutations_enabled,
        "GraphQL schema built"
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use biograph_core::catalog::compile_biomedical;
    use biograph_graph::InMemoryBackend;

    fn build(mutations_enabled: bool) -> Schema {
        let compiled = Arc::new(compile_biomedical().unwrap());
        let options = SchemaOptions {
            mutations_enabled,
            ..SchemaOptions::default()
        };
        build_schema(compiled, Arc::new(InMemoryBackend::new()), &options).unwrap()
    }

    #[test]
    fn sdl_exposes_roots_and_views() {
        let sdl = build(true).sdl();
        assert!(sdl.contains("drugs(where: DrugWhere, options: QueryOptions): [Drug!]!"));
        assert!(sdl.contains("proteinsCount(where: ProteinWhere): Int!"));
        assert!(sdl.contains("drugTargetsProteinConnection("));
        assert!(sdl.contains("type Drug_targets_protein"));
    }

    #[test]
    fn mutations_are_on_by_default() {
        assert!(SchemaOptions::default().mutations_enabled);
        let compiled = Arc::new(compile_biomedical().unwrap());
        let sdl = build_schema(compiled, Arc::new(InMemoryBackend::new()), &SchemaOptions::default())
            .unwrap()
            .sdl();
        assert!(sdl.contains("type Mutation"));
        assert!(sdl.contains("createGenes(input: [GeneCreateInput!]!): [Gene!]!"));
        assert!(sdl.contains("updateGenes(where: GeneWhere, update: GeneUpdateInput): [Gene!]!"));
        assert!(sdl.contains("deleteGenes(where: GeneWhere): DeleteInfo!"));
    }

    #[test]
    fn disabled_mutations_leave_a_read_only_schema() {
        let sdl = build(false).sdl();
        assert!(!sdl.contains("type Mutation"));
        assert!(!sdl.contains("GeneUpdateInput"));
    }
}
