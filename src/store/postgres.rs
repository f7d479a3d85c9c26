//! PostgreSQL-backed store: schema rules in front of builder-generated SQL.

use crate::case::to_camel_case;
use crate::error::AppError;
use crate::schema::ResourceSchema;
use crate::sql::{self, PgBindValue, QueryBuf};
use crate::store::{ListPage, Page, ResourceStore};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Store for one resource over an explicitly passed pool.
pub struct PgStore {
    pool: PgPool,
    schema: ResourceSchema,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: ResourceSchema) -> Self {
        Self { pool, schema }
    }

    async fn query_one(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_record(&r)))
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn count(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_one(&self.pool).await?;
        let n: i64 = row.try_get(0)?;
        Ok(n as u64)
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, mut record: Map<String, Value>) -> Result<Value, AppError> {
        self.schema.strip_unknown(&mut record);
        self.schema.apply_defaults(&mut record);
        self.schema.validate(&record).map_err(AppError::Validation)?;
        let id = Uuid::new_v4();
        let q = sql::insert(&self.schema, &id, &record);
        self.query_one(&q)
            .await?
            .ok_or_else(|| AppError::Persistence("insert returned no row".into()))
    }

    async fn list(&self, filters: &[(String, Value)], page: Page) -> Result<ListPage, AppError> {
        let q = sql::select_list(&self.schema, filters, page.size, page.offset());
        let items = self.query_many(&q).await?;
        let total = self.count(&sql::select_count(&self.schema, filters)).await?;
        Ok(ListPage { items, total })
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Value>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        self.query_one(&sql::select_by_id(&self.schema, &id)).await
    }

    async fn update_by_id(
        &self,
        id: &str,
        mut partial: Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let Some(existing) = self.query_one(&sql::select_by_id(&self.schema, &id)).await? else {
            return Ok(None);
        };
        let Value::Object(mut merged) = existing else {
            return Err(AppError::Persistence("stored record is not an object".into()));
        };
        self.schema.strip_unknown(&mut partial);
        for (k, v) in partial {
            merged.insert(k, v);
        }
        self.schema.validate(&merged).map_err(AppError::Validation)?;
        let q = sql::update(&self.schema, &id, &merged);
        self.query_one(&q).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(false);
        };
        let deleted = self.query_one(&sql::delete(&self.schema, &id)).await?;
        Ok(deleted.is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Decode a row into a camelCase-keyed JSON record.
fn row_to_record(row: &PgRow) -> Value {
    use sqlx::Column;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(to_camel_case(name), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}
