//! GraphQL input types and their conversion to backend filters.

use async_graphql::dynamic::{InputObject, InputValue, ObjectAccessor, TypeRef, ValueAccessor};
use serde_json::Value;

use biograph_core::{Attribute, NodeKind, ScalarType};
use biograph_graph::filter::{CONTAINS_SUFFIX, INCLUDES_SUFFIX, IN_SUFFIX};
use biograph_graph::{Condition, NodeFilter, Page, Properties};

pub const WHERE_ARG: &str = "where";
pub const OPTIONS_ARG: &str = "options";
pub const INPUT_ARG: &str = "input";
pub const UPDATE_ARG: &str = "update";
pub const OPTIONS_TYPE: &str = "QueryOptions";

pub fn where_type_name(kind: &str) -> String {
    format!("{kind}Where")
}

pub fn create_type_name(kind: &str) -> String {
    format!("{kind}CreateInput")
}

pub fn update_type_name(kind: &str) -> String {
    format!("{kind}UpdateInput")
}

/// Output and input type for an attribute. Every attribute is nullable.
pub fn attribute_type(attr: &Attribute) -> TypeRef {
    let name = attr.scalar.graphql_name();
    if attr.list {
        TypeRef::named_list(name)
    } else {
        TypeRef::named(name)
    }
}

// ── Input Objects ────────────────────────────────────────────────

/// `<Kind>Where`: equality and `_IN` on scalars, `_CONTAINS` on strings,
/// `_INCLUDES` on lists. Embeddings are left out. `None` when the kind has
/// nothing filterable.
pub fn where_input(kind: &NodeKind) -> Option<InputObject> {
    let mut input = InputObject::new(where_type_name(&kind.name));
    let mut any = false;
    for attr in kind.attributes.iter().filter(|a| a.is_filterable()) {
        let scalar = attr.scalar.graphql_name();
        any = true;
        if attr.list {
            input = input.field(InputValue::new(
                format!("{}{INCLUDES_SUFFIX}", attr.name),
                TypeRef::named(scalar),
            ));
            continue;
        }
        input = input
            .field(InputValue::new(attr.name.as_str(), TypeRef::named(scalar)))
            .field(InputValue::new(
                format!("{}{IN_SUFFIX}", attr.name),
                TypeRef::named_nn_list(scalar),
            ));
        if matches!(attr.scalar, ScalarType::String | ScalarType::Id) {
            input = input.field(InputValue::new(
                format!("{}{CONTAINS_SUFFIX}", attr.name),
                TypeRef::named(TypeRef::STRING),
            ));
        }
    }
    any.then_some(input)
}

/// `<Kind>CreateInput`: one optional field per attribute.
pub fn create_input(kind: &NodeKind) -> InputObject {
    attribute_input(kind, create_type_name(&kind.name))
}

/// `<Kind>UpdateInput`: same fields as the create input. An explicit null
/// clears the attribute.
pub fn update_input(kind: &NodeKind) -> InputObject {
    attribute_input(kind, update_type_name(&kind.name))
}

fn attribute_input(kind: &NodeKind, name: String) -> InputObject {
    kind.attributes
        .iter()
        .fold(InputObject::new(name), |input, attr| {
            input.field(InputValue::new(attr.name.as_str(), attribute_type(attr)))
        })
}

pub fn options_input() -> InputObject {
    InputObject::new(OPTIONS_TYPE)
        .field(InputValue::new("limit", TypeRef::named(TypeRef::INT)))
        .field(InputValue::new("offset", TypeRef::named(TypeRef::INT)))
}

// ── Argument Parsing ─────────────────────────────────────────────

fn to_json(value: ValueAccessor<'_>) -> async_graphql::Result<Value> {
    Ok(value.as_value().clone().into_json()?)
}

/// Read the `where` argument. Absent or null means no conditions.
pub fn parse_where(args: &ObjectAccessor<'_>) -> async_graphql::Result<NodeFilter> {
    let Some(value) = args.get(WHERE_ARG).filter(|v| !v.is_null()) else {
        return Ok(NodeFilter::new());
    };
    let Value::Object(fields) = to_json(value)? else {
        return Err("where must be an object".into());
    };
    fields
        .into_iter()
        .try_fold(NodeFilter::new(), |filter, (key, value)| {
            Ok(filter.with(Condition::parse(&key, value)?))
        })
}

/// Read the `options` argument into a page.
pub fn parse_options(args: &ObjectAccessor<'_>) -> async_graphql::Result<Page> {
    let Some(options) = args.get(OPTIONS_ARG).filter(|v| !v.is_null()) else {
        return Ok(Page::default());
    };
    let options = options.object()?;
    let bound = |name: &str| -> async_graphql::Result<Option<usize>> {
        match options.get(name).filter(|v| !v.is_null()) {
            Some(v) => {
                let n = v.i64()?;
                usize::try_from(n)
                    .map(Some)
                    .map_err(|_| format!("{name} must not be negative, got {n}").into())
            }
            None => Ok(None),
        }
    };
    Ok(Page::new(bound("offset")?.unwrap_or(0), bound("limit")?))
}

/// Read the `input` list of a create mutation.
pub fn parse_create(args: &ObjectAccessor<'_>) -> async_graphql::Result<Vec<Properties>> {
    let list = args.try_get(INPUT_ARG)?.list()?;
    list.iter()
        .map(|item| match to_json(item)? {
            Value::Object(props) => Ok(props),
            other => Err(format!("create input must be an object, got {other}").into()),
        })
        .collect()
}

/// Read the `update` argument of an update mutation. Absent means no
/// changes.
pub fn parse_update(args: &ObjectAccessor<'_>) -> async_graphql::Result<Properties> {
    let Some(value) = args.get(UPDATE_ARG).filter(|v| !v.is_null()) else {
        return Ok(Properties::new());
    };
    match to_json(value)? {
        Value::Object(props) => Ok(props),
        other => Err(format!("update must be an object, got {other}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biograph_core::catalog::compile_biomedical;

    #[test]
    fn where_input_skips_embeddings() {
        let schema = compile_biomedical().unwrap();
        let protein = schema.node_kind("Protein").unwrap();
        let input = where_input(protein).unwrap();
        assert_eq!(input.type_name(), "ProteinWhere");
        assert_eq!(create_input(protein).type_name(), "ProteinCreateInput");
        assert_eq!(update_input(protein).type_name(), "ProteinUpdateInput");
    }

    #[test]
    fn list_attributes_use_list_types() {
        assert_eq!(
            attribute_type(&Attribute::strings("synonyms")).to_string(),
            "[String]"
        );
        assert_eq!(attribute_type(&Attribute::id()).to_string(), "ID");
    }
}
