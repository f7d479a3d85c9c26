//! Bootstrap DDL generated from a resource schema. Idempotent: safe to run
//! on every startup.

use crate::case::to_snake_case;
use crate::error::AppError;
use crate::schema::{FieldType, ResourceSchema};
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn sql_type(kind: &FieldType) -> &'static str {
    match kind {
        FieldType::Text => "TEXT",
        FieldType::Integer => "INTEGER",
        FieldType::Boolean => "BOOLEAN",
        FieldType::Timestamp => "TIMESTAMPTZ",
    }
}

/// CREATE TABLE plus one unique index per unique field. PostgreSQL unique
/// indexes ignore NULLs, which is exactly the sparse-uniqueness contract.
/// The `pos` bigserial provides insertion order for list reads.
pub fn bootstrap_ddl(schema: &ResourceSchema) -> Vec<String> {
    let table = quote(schema.table);
    let mut columns = vec![
        format!("{} UUID PRIMARY KEY", quote("id")),
        format!("{} BIGSERIAL", quote("pos")),
    ];
    for spec in &schema.fields {
        let not_null = if spec.required { " NOT NULL" } else { "" };
        columns.push(format!(
            "{} {}{}",
            quote(&to_snake_case(spec.name)),
            sql_type(&spec.kind),
            not_null
        ));
    }
    let mut statements = vec![format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table,
        columns.join(", ")
    )];
    for spec in schema.fields.iter().filter(|f| f.unique) {
        let column = to_snake_case(spec.name);
        statements.push(format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
            quote(&format!("{}_{}_key", schema.table, column)),
            table,
            quote(&column)
        ));
    }
    statements
}

pub async fn ensure_tables(pool: &PgPool, schema: &ResourceSchema) -> Result<(), AppError> {
    for sql in bootstrap_ddl(schema) {
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}
