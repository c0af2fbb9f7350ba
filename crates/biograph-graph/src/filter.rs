//! Node filters and paging shared by every backend.

use serde_json::Value;

use biograph_core::NodeKind;

use crate::client::GraphError;

/// Attribute values keyed by attribute name.
pub type Properties = serde_json::Map<String, Value>;

pub const IN_SUFFIX: &str = "_IN";
pub const CONTAINS_SUFFIX: &str = "_CONTAINS";
pub const INCLUDES_SUFFIX: &str = "_INCLUDES";

/// One test against a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `null` matches a missing or null attribute.
    Equals(Value),
    In(Vec<Value>),
    /// Substring match on string attributes.
    Contains(String),
    /// Membership test on list attributes.
    Includes(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub attribute: String,
    pub predicate: Predicate,
}

impl Condition {
    /// Parse a filter input key such as `name`, `name_IN`, `name_CONTAINS`,
    /// or `synonyms_INCLUDES`.
    pub fn parse(key: &str, value: Value) -> Result<Self, GraphError> {
        let (attribute, predicate) = if let Some(attr) = key.strip_suffix(IN_SUFFIX) {
            match value {
                Value::Array(items) => (attr, Predicate::In(items)),
                other => {
                    return Err(GraphError::InvalidFilter(format!(
                        "{key} expects a list, got {other}"
                    )))
                }
            }
        } else if let Some(attr) = key.strip_suffix(CONTAINS_SUFFIX) {
            match value {
                Value::String(s) => (attr, Predicate::Contains(s)),
                other => {
                    return Err(GraphError::InvalidFilter(format!(
                        "{key} expects a string, got {other}"
                    )))
                }
            }
        } else if let Some(attr) = key.strip_suffix(INCLUDES_SUFFIX) {
            (attr, Predicate::Includes(value))
        } else {
            (key, Predicate::Equals(value))
        };

        Ok(Self {
            attribute: attribute.to_string(),
            predicate,
        })
    }

    fn matches(&self, properties: &Properties) -> bool {
        let actual = properties.get(&self.attribute).unwrap_or(&Value::Null);
        match &self.predicate {
            Predicate::Equals(Value::Null) => actual.is_null(),
            Predicate::Equals(expected) => values_equal(actual, expected),
            Predicate::In(options) => options.iter().any(|o| values_equal(actual, o)),
            Predicate::Contains(needle) => actual
                .as_str()
                .is_some_and(|s| s.contains(needle.as_str())),
            Predicate::Includes(item) => actual
                .as_array()
                .is_some_and(|items| items.iter().any(|v| values_equal(v, item))),
        }
    }
}

/// A conjunction of conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeFilter {
    pub conditions: Vec<Condition>,
}

impl NodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition.
    pub fn equals(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            attribute: attribute.into(),
            predicate: Predicate::Equals(value.into()),
        });
        self
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, properties: &Properties) -> bool {
        self.conditions.iter().all(|c| c.matches(properties))
    }

    /// Reject conditions on attributes the kind does not declare, or on
    /// embeddings.
    pub fn validate(&self, kind: &NodeKind) -> Result<(), GraphError> {
        for condition in &self.conditions {
            match kind.attribute(&condition.attribute) {
                Some(attr) if attr.is_filterable() => {}
                _ => {
                    return Err(GraphError::UnknownAttribute {
                        kind: kind.name.clone(),
                        attribute: condition.attribute.clone(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Offset/limit paging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Page {
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        items
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Equality with integer/float unification, so `3` matches `3.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn parses_suffixes() {
        let c = Condition::parse("name_IN", json!(["a", "b"])).unwrap();
        assert_eq!(c.attribute, "name");
        assert_eq!(c.predicate, Predicate::In(vec![json!("a"), json!("b")]));

        let c = Condition::parse("synonyms_INCLUDES", json!("asthma")).unwrap();
        assert_eq!(c.attribute, "synonyms");

        let c = Condition::parse("id", json!("DB00001")).unwrap();
        assert_eq!(c.predicate, Predicate::Equals(json!("DB00001")));

        assert!(Condition::parse("name_IN", json!("a")).is_err());
        assert!(Condition::parse("name_CONTAINS", json!(1)).is_err());
    }

    #[test]
    fn matches_conditions() {
        let p = props(json!({
            "id": "P12345",
            "length": 120,
            "protein_names": ["Insulin", "INS"],
            "name": "insulin receptor"
        }));

        assert!(NodeFilter::new().matches(&p));
        assert!(NodeFilter::new().equals("id", "P12345").matches(&p));
        assert!(NodeFilter::new().equals("length", 120.0).matches(&p));
        assert!(!NodeFilter::new().equals("id", "P99999").matches(&p));
        assert!(NodeFilter::new().equals("mass", Value::Null).matches(&p));
        assert!(NodeFilter::new()
            .with(Condition::parse("protein_names_INCLUDES", json!("INS")).unwrap())
            .matches(&p));
        assert!(NodeFilter::new()
            .with(Condition::parse("name_CONTAINS", json!("receptor")).unwrap())
            .equals("length", 120)
            .matches(&p));
        assert!(!NodeFilter::new()
            .with(Condition::parse("id_IN", json!(["A", "B"])).unwrap())
            .matches(&p));
    }

    #[test]
    fn paging() {
        let page = Page::new(1, Some(2));
        assert_eq!(page.apply(0..10), vec![1, 2]);
        assert_eq!(Page::default().apply(0..3), vec![0, 1, 2]);
    }
}
