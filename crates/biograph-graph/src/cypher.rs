//! Parameterised Cypher for the node and hop operations.
//!
//! Labels, relationship types, and attribute names come from the compiled
//! schema and are backtick-quoted. Every value travels as a parameter.

use neo4rs::{query, BoltNull, BoltType, Query};
use serde_json::Value;

use biograph_core::{Direction, Hop, NodeKind};

use crate::filter::{NodeFilter, Page, Predicate, Properties};

/// A statement and its parameters, kept apart from neo4rs so it can be
/// inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: Vec<(String, Value)>,
}

impl Statement {
    fn new() -> Self {
        Self {
            text: String::new(),
            params: Vec::new(),
        }
    }

    fn bind(&mut self, prefix: &str, value: Value) -> String {
        let name = format!("{prefix}{}", self.params.len());
        self.params.push((name.clone(), value));
        name
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn into_query(self) -> Query {
        self.params
            .into_iter()
            .fold(query(&self.text), |q, (name, value)| {
                q.param(&name, to_bolt(value))
            })
    }
}

/// Convert a JSON value to a Bolt parameter.
pub fn to_bolt(value: Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => b.into(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().unwrap_or(f64::NAN).into(),
        },
        Value::String(s) => s.into(),
        Value::Array(items) => items.into_iter().map(to_bolt).collect::<Vec<_>>().into(),
        Value::Object(_) => value.to_string().into(),
    }
}

pub fn quote(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

fn pattern(var: &str, kind: &NodeKind) -> String {
    let labels: String = kind.labels.iter().map(|l| format!(":{}", quote(l))).collect();
    format!("({var}{labels})")
}

fn push_conditions(stmt: &mut Statement, var: &str, filter: &NodeFilter, clauses: &mut Vec<String>) {
    for condition in &filter.conditions {
        let prop = format!("{var}.{}", quote(&condition.attribute));
        let clause = match &condition.predicate {
            Predicate::Equals(Value::Null) => format!("{prop} IS NULL"),
            Predicate::Equals(v) => format!("{prop} = ${}", stmt.bind("w", v.clone())),
            Predicate::In(options) => {
                format!("{prop} IN ${}", stmt.bind("w", Value::Array(options.clone())))
            }
            Predicate::Contains(needle) => {
                format!("{prop} CONTAINS ${}", stmt.bind("w", Value::String(needle.clone())))
            }
            Predicate::Includes(item) => format!("${} IN {prop}", stmt.bind("w", item.clone())),
        };
        clauses.push(clause);
    }
}

fn where_clause(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

fn paging(stmt: &mut Statement, page: Page) -> String {
    let mut text = String::new();
    if page.offset > 0 {
        stmt.params.push(("skip".into(), Value::from(page.offset as i64)));
        text.push_str(" SKIP $skip");
    }
    if let Some(limit) = page.limit {
        stmt.params.push(("limit".into(), Value::from(limit as i64)));
        text.push_str(" LIMIT $limit");
    }
    text
}

fn hop_pattern(hop: Hop<'_>) -> String {
    let rel = format!("[r:{}]", quote(&hop.edge.relationship_type));
    let (left, right) = match hop.direction() {
        Direction::Out => ("-", "->"),
        Direction::In => ("<-", "-"),
    };
    format!(
        "{}{left}{rel}{right}{}",
        pattern("a", hop.owner),
        pattern("n", hop.target)
    )
}

// ── Node Statements ──────────────────────────────────────────────

pub fn match_nodes(kind: &NodeKind, filter: &NodeFilter, page: Page) -> Statement {
    let mut stmt = Statement::new();
    let mut clauses = Vec::new();
    push_conditions(&mut stmt, "n", filter, &mut clauses);
    let paging = paging(&mut stmt, page);
    stmt.text = format!(
        "MATCH {}{} RETURN n, elementId(n) AS eid ORDER BY eid{paging}",
        pattern("n", kind),
        where_clause(&clauses)
    );
    stmt
}

pub fn count_nodes(kind: &NodeKind, filter: &NodeFilter) -> Statement {
    let mut stmt = Statement::new();
    let mut clauses = Vec::new();
    push_conditions(&mut stmt, "n", filter, &mut clauses);
    stmt.text = format!(
        "MATCH {}{} RETURN count(n) AS cnt",
        pattern("n", kind),
        where_clause(&clauses)
    );
    stmt
}

// ── Hop Statements ───────────────────────────────────────────────

/// One row per edge instance, so parallel edges to the same node each keep
/// their own properties.
pub fn traverse(hop: Hop<'_>, from: &str, filter: &NodeFilter, page: Page) -> Statement {
    let mut stmt = Statement::new();
    stmt.params.push(("from".into(), Value::from(from)));
    let mut clauses = vec!["elementId(a) = $from".to_string()];
    push_conditions(&mut stmt, "n", filter, &mut clauses);
    let paging = paging(&mut stmt, page);
    stmt.text = format!(
        "MATCH {}{} RETURN n, elementId(n) AS eid, r, elementId(r) AS rid ORDER BY rid{paging}",
        hop_pattern(hop),
        where_clause(&clauses)
    );
    stmt
}

pub fn count_neighbors(hop: Hop<'_>, from: &str, filter: &NodeFilter) -> Statement {
    let mut stmt = Statement::new();
    stmt.params.push(("from".into(), Value::from(from)));
    let mut clauses = vec!["elementId(a) = $from".to_string()];
    push_conditions(&mut stmt, "n", filter, &mut clauses);
    stmt.text = format!(
        "MATCH {}{} RETURN count(r) AS cnt",
        hop_pattern(hop),
        where_clause(&clauses)
    );
    stmt
}

// ── Write Statements ─────────────────────────────────────────────

pub fn create_node(kind: &NodeKind, properties: &Properties) -> Statement {
    let mut stmt = Statement::new();
    let sets: Vec<String> = properties
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| format!("n.{} = ${}", quote(k), stmt.bind("p", v.clone())))
        .collect();
    let set = if sets.is_empty() {
        String::new()
    } else {
        format!(" SET {}", sets.join(", "))
    };
    stmt.text = format!(
        "CREATE {}{set} RETURN n, elementId(n) AS eid",
        pattern("n", kind)
    );
    stmt
}

/// Null values are bound as-is; Neo4j removes a property set to null.
pub fn update_nodes(kind: &NodeKind, filter: &NodeFilter, properties: &Properties) -> Statement {
    let mut stmt = Statement::new();
    let mut clauses = Vec::new();
    push_conditions(&mut stmt, "n", filter, &mut clauses);
    let sets: Vec<String> = properties
        .iter()
        .map(|(k, v)| format!("n.{} = ${}", quote(k), stmt.bind("p", v.clone())))
        .collect();
    let set = if sets.is_empty() {
        String::new()
    } else {
        format!(" SET {}", sets.join(", "))
    };
    stmt.text = format!(
        "MATCH {}{}{set} RETURN n, elementId(n) AS eid ORDER BY eid",
        pattern("n", kind),
        where_clause(&clauses)
    );
    stmt
}

pub fn delete_nodes(kind: &NodeKind, filter: &NodeFilter) -> Statement {
    let mut stmt = Statement::new();
    let mut clauses = Vec::new();
    push_conditions(&mut stmt, "n", filter, &mut clauses);
    stmt.text = format!(
        "MATCH {}{} DETACH DELETE n RETURN count(n) AS cnt",
        pattern("n", kind),
        where_clause(&clauses)
    );
    stmt
}
