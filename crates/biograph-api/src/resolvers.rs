//! Field resolvers for the generated GraphQL schema.
//!
//! Parent values are the backend's own records: [`NodeRecord`] for node
//! objects, [`Neighbor`] for relationship objects, and the edge's
//! [`Properties`] map for property-set objects.

use std::any::Any;
use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, TypeRef};
use async_graphql::Value as GqlValue;
use serde_json::Value;

use biograph_core::naming::{plural_field_name, plural_type_name, upper_camel};
use biograph_core::{Attribute, CompiledSchema, Hop, NodeKind, RelationshipField, RequestContext};
use biograph_graph::{Neighbor, NodeFilter, NodeRecord, Page, Properties, SharedBackend};

use crate::inputs::{
    attribute_type, create_type_name, parse_create, parse_options, parse_update, parse_where,
    update_type_name, where_type_name, INPUT_ARG, OPTIONS_ARG, OPTIONS_TYPE, UPDATE_ARG, WHERE_ARG,
};

pub const DELETE_INFO_TYPE: &str = "DeleteInfo";

/// Result of a delete mutation.
#[derive(Debug, Clone, Copy)]
pub struct DeleteInfo {
    pub nodes_deleted: i64,
}

/// Parent of a `...Connection` object: where the hop starts and how it is
/// filtered. `edges` and `totalCount` are resolved only when selected.
#[derive(Debug, Clone)]
struct ConnectionSource {
    from: NodeRecord,
    filter: NodeFilter,
    page: Page,
}

pub fn count_field_name(kind: &str) -> String {
    format!("{}Count", plural_field_name(kind))
}

pub fn create_field_name(kind: &str) -> String {
    format!("create{}", plural_type_name(kind))
}

pub fn update_field_name(kind: &str) -> String {
    format!("update{}", plural_type_name(kind))
}

pub fn delete_field_name(kind: &str) -> String {
    format!("delete{}", plural_type_name(kind))
}

pub fn connection_field_name(field: &str) -> String {
    format!("{field}Connection")
}

pub fn connection_type_name(owner: &str, field: &str) -> String {
    format!("{owner}{}Connection", upper_camel(field))
}

pub fn relationship_type_name(owner: &str, field: &str) -> String {
    format!("{owner}{}Relationship", upper_camel(field))
}

// ── Lookups ──────────────────────────────────────────────────────

fn node_kind<'s>(schema: &'s CompiledSchema, name: &str) -> async_graphql::Result<&'s NodeKind> {
    schema
        .node_kind(name)
        .ok_or_else(|| format!("unknown node kind {name}").into())
}

fn hop<'s>(schema: &'s CompiledSchema, owner: &str, field: &str) -> async_graphql::Result<Hop<'s>> {
    schema
        .relationship(owner, field)
        .ok_or_else(|| format!("unknown relationship field {owner}.{field}").into())
}

fn json_value(value: Option<&Value>) -> async_graphql::Result<Option<FieldValue<'static>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => Ok(Some(FieldValue::value(GqlValue::from_json(v.clone())?))),
    }
}

fn with_filter_args(field: Field, where_type: Option<&str>) -> Field {
    let field = match where_type {
        Some(ty) => field.argument(InputValue::new(WHERE_ARG, TypeRef::named(ty))),
        None => field,
    };
    field.argument(InputValue::new(OPTIONS_ARG, TypeRef::named(OPTIONS_TYPE)))
}

// ── Attribute Fields ─────────────────────────────────────────────

/// A scalar, list, or embedding field read from the parent's property map.
pub fn attribute_field<T: Any + Send + Sync>(attr: &Attribute, props: fn(&T) -> &Properties) -> Field {
    let name = attr.name.clone();
    Field::new(attr.name.as_str(), attribute_type(attr), move |ctx| {
        let name = name.clone();
        FieldFuture::new(async move {
            let parent = ctx.parent_value.try_downcast_ref::<T>()?;
            json_value(props(parent).get(&name))
        })
    })
}

pub fn node_attribute_field(attr: &Attribute) -> Field {
    attribute_field::<NodeRecord>(attr, |node| &node.properties)
}

pub fn edge_attribute_field(attr: &Attribute) -> Field {
    attribute_field::<Properties>(attr, |props| props)
}

// ── Relationship Fields ──────────────────────────────────────────

/// `field(where, options): [Target!]!`
pub fn relationship_field(
    schema: &Arc<CompiledSchema>,
    owner: &str,
    rel: &RelationshipField,
    target_where: Option<&str>,
) -> Field {
    let (schema, owner, field_name) = (schema.clone(), owner.to_string(), rel.name.clone());
    let field = Field::new(
        rel.name.as_str(),
        TypeRef::named_nn_list_nn(rel.target.as_str()),
        move |ctx| {
            let (schema, owner, field_name) = (schema.clone(), owner.clone(), field_name.clone());
            FieldFuture::new(async move {
                let from = ctx.parent_value.try_downcast_ref::<NodeRecord>()?;
                let filter = parse_where(&ctx.args)?;
                let page = parse_options(&ctx.args)?;
                let hop = hop(&schema, &owner, &field_name)?;
                let backend = ctx.data::<SharedBackend>()?;
                let request = ctx.data::<RequestContext>()?;

                let neighbors = backend.traverse(request, hop, from, &filter, page).await?;
                Ok(Some(FieldValue::list(
                    neighbors.into_iter().map(|n| FieldValue::owned_any(n.node)),
                )))
            })
        },
    );
    with_filter_args(field, target_where)
}

/// `fieldConnection(where, options): OwnerFieldConnection!`
pub fn connection_field(owner: &str, rel: &RelationshipField, target_where: Option<&str>) -> Field {
    let field = Field::new(
        connection_field_name(&rel.name),
        TypeRef::named_nn(connection_type_name(owner, &rel.name)),
        |ctx| {
            FieldFuture::new(async move {
                let from = ctx.parent_value.try_downcast_ref::<NodeRecord>()?;
                Ok(Some(FieldValue::owned_any(ConnectionSource {
                    from: from.clone(),
                    filter: parse_where(&ctx.args)?,
                    page: parse_options(&ctx.args)?,
                })))
            })
        },
    );
    with_filter_args(field, target_where)
}

/// `OwnerFieldConnection { edges: [OwnerFieldRelationship!]!, totalCount: Int! }`
pub fn connection_object(schema: &Arc<CompiledSchema>, owner: &str, rel: &RelationshipField) -> Object {
    let edges = {
        let (schema, owner, field_name) = (schema.clone(), owner.to_string(), rel.name.clone());
        Field::new(
            "edges",
            TypeRef::named_nn_list_nn(relationship_type_name(&owner, &field_name)),
            move |ctx| {
                let (schema, owner, field_name) =
                    (schema.clone(), owner.clone(), field_name.clone());
                FieldFuture::new(async move {
                    let source = ctx.parent_value.try_downcast_ref::<ConnectionSource>()?;
                    let hop = hop(&schema, &owner, &field_name)?;
                    let backend = ctx.data::<SharedBackend>()?;
                    let request = ctx.data::<RequestContext>()?;

                    let neighbors = backend
                        .traverse(request, hop, &source.from, &source.filter, source.page)
                        .await?;
                    Ok(Some(FieldValue::list(
                        neighbors.into_iter().map(FieldValue::owned_any),
                    )))
                })
            },
        )
    };

    let total = {
        let (schema, owner, field_name) = (schema.clone(), owner.to_string(), rel.name.clone());
        Field::new("totalCount", TypeRef::named_nn(TypeRef::INT), move |ctx| {
            let (schema, owner, field_name) = (schema.clone(), owner.clone(), field_name.clone());
            FieldFuture::new(async move {
                let source = ctx.parent_value.try_downcast_ref::<ConnectionSource>()?;
                let hop = hop(&schema, &owner, &field_name)?;
                let backend = ctx.data::<SharedBackend>()?;
                let request = ctx.data::<RequestContext>()?;

                let count = backend
                    .count_neighbors(request, hop, &source.from, &source.filter)
                    .await?;
                Ok(Some(FieldValue::value(count)))
            })
        })
    };

    Object::new(connection_type_name(owner, &rel.name))
        .field(edges)
        .field(total)
}

/// `OwnerFieldRelationship { node: Target!, properties: PropertySet }`
pub fn relationship_object(owner: &str, rel: &RelationshipField, properties: Option<&str>) -> Object {
    let node = Field::new("node", TypeRef::named_nn(rel.target.as_str()), |ctx| {
        FieldFuture::new(async move {
            let neighbor = ctx.parent_value.try_downcast_ref::<Neighbor>()?;
            Ok(Some(FieldValue::borrowed_any(&neighbor.node)))
        })
    });
    let object = Object::new(relationship_type_name(owner, &rel.name)).field(node);

    match properties {
        Some(set) => object.field(Field::new("properties", TypeRef::named(set), |ctx| {
            FieldFuture::new(async move {
                let neighbor = ctx.parent_value.try_downcast_ref::<Neighbor>()?;
                Ok(Some(FieldValue::borrowed_any(&neighbor.properties)))
            })
        })),
        None => object,
    }
}

// ── Root Fields ──────────────────────────────────────────────────

/// `ks(where, options): [K!]!`
pub fn list_field(schema: &Arc<CompiledSchema>, kind: &NodeKind, where_type: Option<&str>) -> Field {
    let (schema, name) = (schema.clone(), kind.name.clone());
    let field = Field::new(
        plural_field_name(&kind.name),
        TypeRef::named_nn_list_nn(kind.name.as_str()),
        move |ctx| {
            let (schema, name) = (schema.clone(), name.clone());
            FieldFuture::new(async move {
                let kind = node_kind(&schema, &name)?;
                let filter = parse_where(&ctx.args)?;
                let page = parse_options(&ctx.args)?;
                let backend = ctx.data::<SharedBackend>()?;
                let request = ctx.data::<RequestContext>()?;

                let nodes = backend.find_nodes(request, kind, &filter, page).await?;
                Ok(Some(FieldValue::list(nodes.into_iter().map(FieldValue::owned_any))))
            })
        },
    );
    with_filter_args(field, where_type)
}

/// `ksCount(where): Int!`
pub fn count_field(schema: &Arc<CompiledSchema>, kind: &NodeKind, where_type: Option<&str>) -> Field {
    let (schema, name) = (schema.clone(), kind.name.clone());
    let field = Field::new(
        count_field_name(&kind.name),
        TypeRef::named_nn(TypeRef::INT),
        move |ctx| {
            let (schema, name) = (schema.clone(), name.clone());
            FieldFuture::new(async move {
                let kind = node_kind(&schema, &name)?;
                let filter = parse_where(&ctx.args)?;
                let backend = ctx.data::<SharedBackend>()?;
                let request = ctx.data::<RequestContext>()?;

                let count = backend.count_nodes(request, kind, &filter).await?;
                Ok(Some(FieldValue::value(count)))
            })
        },
    );
    match where_type {
        Some(ty) => field.argument(InputValue::new(WHERE_ARG, TypeRef::named(ty))),
        None => field,
    }
}

// ── Mutations ────────────────────────────────────────────────────

/// `createKs(input: [KCreateInput!]!): [K!]!`
pub fn create_field(schema: &Arc<CompiledSchema>, kind: &NodeKind) -> Field {
    let (schema, name) = (schema.clone(), kind.name.clone());
    Field::new(
        create_field_name(&kind.name),
        TypeRef::named_nn_list_nn(kind.name.as_str()),
        move |ctx| {
            let (schema, name) = (schema.clone(), name.clone());
            FieldFuture::new(async move {
                let kind = node_kind(&schema, &name)?;
                let inputs = parse_create(&ctx.args)?;
                let backend = ctx.data::<SharedBackend>()?;
                let request = ctx.data::<RequestContext>()?;

                let mut created = Vec::with_capacity(inputs.len());
                for properties in &inputs {
                    created.push(backend.create_node(request, kind, properties).await?);
                }
                tracing::info!(database = %request.database, kind = %name, count = created.len(), "Created nodes");
                Ok(Some(FieldValue::list(created.into_iter().map(FieldValue::owned_any))))
            })
        },
    )
    .argument(InputValue::new(
        INPUT_ARG,
        TypeRef::named_nn_list_nn(create_type_name(&kind.name)),
    ))
}

/// `updateKs(where, update: KUpdateInput): [K!]!`
pub fn update_field(schema: &Arc<CompiledSchema>, kind: &NodeKind) -> Field {
    let (schema, name) = (schema.clone(), kind.name.clone());
    Field::new(
        update_field_name(&kind.name),
        TypeRef::named_nn_list_nn(kind.name.as_str()),
        move |ctx| {
            let (schema, name) = (schema.clone(), name.clone());
            FieldFuture::new(async move {
                let kind = node_kind(&schema, &name)?;
                let filter = parse_where(&ctx.args)?;
                let changes = parse_update(&ctx.args)?;
                let backend = ctx.data::<SharedBackend>()?;
                let request = ctx.data::<RequestContext>()?;

                let updated = backend.update_nodes(request, kind, &filter, &changes).await?;
                Ok(Some(FieldValue::list(updated.into_iter().map(FieldValue::owned_any))))
            })
        },
    )
    .argument(InputValue::new(WHERE_ARG, TypeRef::named(where_type_name(&kind.name))))
    .argument(InputValue::new(UPDATE_ARG, TypeRef::named(update_type_name(&kind.name))))
}

/// `deleteKs(where): DeleteInfo!`
pub fn delete_field(schema: &Arc<CompiledSchema>, kind: &NodeKind) -> Field {
    let (schema, name) = (schema.clone(), kind.name.clone());
    Field::new(
        delete_field_name(&kind.name),
        TypeRef::named_nn(DELETE_INFO_TYPE),
        move |ctx| {
            let (schema, name) = (schema.clone(), name.clone());
            FieldFuture::new(async move {
                let kind = node_kind(&schema, &name)?;
                let filter = parse_where(&ctx.args)?;
                let backend = ctx.data::<SharedBackend>()?;
                let request = ctx.data::<RequestContext>()?;

                let nodes_deleted = backend.delete_nodes(request, kind, &filter).await?;
                Ok(Some(FieldValue::owned_any(DeleteInfo { nodes_deleted })))
            })
        },
    )
    .argument(InputValue::new(WHERE_ARG, TypeRef::named(where_type_name(&kind.name))))
}

pub fn delete_info_object() -> Object {
    Object::new(DELETE_INFO_TYPE).field(Field::new(
        "nodesDeleted",
        TypeRef::named_nn(TypeRef::INT),
        |ctx| {
            FieldFuture::new(async move {
                let info = ctx.parent_value.try_downcast_ref::<DeleteInfo>()?;
                Ok(Some(FieldValue::value(info.nodes_deleted)))
            })
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names() {
        assert_eq!(count_field_name("BiologicalProcess"), "biologicalProcessesCount");
        assert_eq!(create_field_name("Gene"), "createGenes");
        assert_eq!(delete_field_name("Pathway"), "deletePathways");
        assert_eq!(update_field_name("BiologicalProcess"), "updateBiologicalProcesses");
        assert_eq!(
            connection_type_name("Drug", "drugTargetsProtein"),
            "DrugDrugTargetsProteinConnection"
        );
        assert_eq!(
            relationship_type_name("Protein", "drugTargetsProteinReverse"),
            "ProteinDrugTargetsProteinReverseRelationship"
        );
    }
}
