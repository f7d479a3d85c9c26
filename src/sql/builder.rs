//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a resource schema.
//!
//! Field names are camelCase on the wire and snake_case in the table; the
//! builder converts on the way in, row decoding converts back.

use crate::case::to_snake_case;
use crate::schema::{FieldType, ResourceSchema};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Monotonic insertion-order column maintained by the bootstrap DDL.
pub(crate) const POSITION_COLUMN: &str = "pos";

/// Quote identifier for PostgreSQL (safe: only from the in-code schema).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quoted column name for a wire field name.
fn column(name: &str) -> String {
    quoted(&to_snake_case(name))
}

/// Cast type for bound parameters, so text-encoded values bind correctly.
fn cast(kind: &FieldType) -> &'static str {
    match kind {
        FieldType::Text => "text",
        FieldType::Integer => "integer",
        FieldType::Boolean => "boolean",
        FieldType::Timestamp => "timestamptz",
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: id plus every schema field, in declaration order.
fn select_column_list(schema: &ResourceSchema) -> String {
    std::iter::once(quoted("id"))
        .chain(schema.fields.iter().map(|f| column(f.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// WHERE clause from exact-match filters; silently skips non-schema fields.
fn filter_clause(q: &mut QueryBuf, schema: &ResourceSchema, filters: &[(String, Value)]) -> String {
    let mut parts = Vec::new();
    for (name, value) in filters {
        let Some(spec) = schema.field(name) else {
            continue;
        };
        let n = q.push_param(value.clone());
        parts.push(format!("{} = ${}::{}", column(name), n, cast(&spec.kind)));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// INSERT with a caller-assigned id; fields absent from the record are
/// omitted and stored as NULL. Returns the full stored row.
pub fn insert(schema: &ResourceSchema, id: &Uuid, record: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = vec![quoted("id")];
    let n = q.push_param(Value::String(id.to_string()));
    let mut placeholders = vec![format!("${}::uuid", n)];
    for spec in &schema.fields {
        let Some(value) = record.get(spec.name) else {
            continue;
        };
        let n = q.push_param(value.clone());
        cols.push(column(spec.name));
        placeholders.push(format!("${}::{}", n, cast(&spec.kind)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(schema.table),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(schema)
    );
    q
}

/// SELECT page: exact-match filters, insertion order, LIMIT/OFFSET.
pub fn select_list(
    schema: &ResourceSchema,
    filters: &[(String, Value)],
    limit: u32,
    offset: u64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = filter_clause(&mut q, schema, filters);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        select_column_list(schema),
        quoted(schema.table),
        where_clause,
        quoted(POSITION_COLUMN),
        limit,
        offset
    );
    q
}

/// COUNT of all rows matching the filters (unpaginated).
pub fn select_count(schema: &ResourceSchema, filters: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = filter_clause(&mut q, schema, filters);
    q.sql = format!(
        "SELECT COUNT(*) FROM {}{}",
        quoted(schema.table),
        where_clause
    );
    q
}

/// SELECT one row by primary key.
pub fn select_by_id(schema: &ResourceSchema, id: &Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.params.push(Value::String(id.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1::uuid",
        select_column_list(schema),
        quoted(schema.table),
        quoted("id")
    );
    q
}

/// UPDATE by id: SET every schema field present in the (already merged)
/// record. Falls back to a plain SELECT when nothing would change.
pub fn update(schema: &ResourceSchema, id: &Uuid, record: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for spec in &schema.fields {
        let Some(value) = record.get(spec.name) else {
            continue;
        };
        let n = q.push_param(value.clone());
        sets.push(format!("{} = ${}::{}", column(spec.name), n, cast(&spec.kind)));
    }
    if sets.is_empty() {
        return select_by_id(schema, id);
    }
    let id_param = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::uuid RETURNING {}",
        quoted(schema.table),
        sets.join(", "),
        quoted("id"),
        id_param,
        select_column_list(schema)
    );
    q
}

/// DELETE by id; RETURNING id distinguishes deleted from absent.
pub fn delete(schema: &ResourceSchema, id: &Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.params.push(Value::String(id.to_string()));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1::uuid RETURNING {}",
        quoted(schema.table),
        quoted("id"),
        quoted("id")
    );
    q
}
