//! In-memory store: the same contract as `PgStore`, backed by a Vec.
//!
//! Used by the integration tests and handy for local development without a
//! database. Records live in insertion order, which is also the list order.

use crate::error::AppError;
use crate::schema::ResourceSchema;
use crate::store::{ListPage, Page, ResourceStore};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct MemoryStore {
    schema: ResourceSchema,
    records: RwLock<Vec<Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new(schema: ResourceSchema) -> Self {
        Self {
            schema,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Sparse uniqueness: a non-null candidate value conflicts with any other
    /// record holding the same value; nulls and absences never conflict.
    fn unique_conflict(
        &self,
        records: &[Map<String, Value>],
        candidate: &Map<String, Value>,
        skip_id: Option<&Value>,
    ) -> Option<String> {
        for spec in self.schema.fields.iter().filter(|f| f.unique) {
            let Some(value) = candidate.get(spec.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let taken = records.iter().any(|r| {
                r.get(spec.name) == Some(value)
                    && skip_id.map_or(true, |id| r.get("id") != Some(id))
            });
            if taken {
                return Some(format!("duplicate value for {}", spec.name));
            }
        }
        None
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, mut record: Map<String, Value>) -> Result<Value, AppError> {
        self.schema.strip_unknown(&mut record);
        self.schema.apply_defaults(&mut record);
        self.schema.validate(&record).map_err(AppError::Validation)?;
        let mut records = self.records.write().await;
        if let Some(conflict) = self.unique_conflict(&records, &record, None) {
            return Err(AppError::Persistence(conflict));
        }
        record.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        records.push(record.clone());
        Ok(Value::Object(record))
    }

    async fn list(&self, filters: &[(String, Value)], page: Page) -> Result<ListPage, AppError> {
        let records = self.records.read().await;
        let matches: Vec<&Map<String, Value>> = records
            .iter()
            .filter(|r| filters.iter().all(|(k, v)| r.get(k) == Some(v)))
            .collect();
        let total = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .map(|r| Value::Object(r.clone()))
            .collect();
        Ok(ListPage { items, total })
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Value>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let id = Value::String(id.to_string());
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.get("id") == Some(&id))
            .map(|r| Value::Object(r.clone())))
    }

    async fn update_by_id(
        &self,
        id: &str,
        mut partial: Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let id = Value::String(id.to_string());
        let mut records = self.records.write().await;
        let Some(index) = records.iter().position(|r| r.get("id") == Some(&id)) else {
            return Ok(None);
        };
        let mut merged = records[index].clone();
        self.schema.strip_unknown(&mut partial);
        for (k, v) in partial {
            merged.insert(k, v);
        }
        self.schema.validate(&merged).map_err(AppError::Validation)?;
        if let Some(conflict) = self.unique_conflict(&records, &merged, Some(&id)) {
            return Err(AppError::Persistence(conflict));
        }
        records[index] = merged.clone();
        Ok(Some(Value::Object(merged)))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(false);
        };
        let id = Value::String(id.to_string());
        let mut records = self.records.write().await;
        let Some(index) = records.iter().position(|r| r.get("id") == Some(&id)) else {
            return Ok(false);
        };
        records.remove(index);
        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{book_schema, task_schema, PLACEHOLDER_IMAGE_URL};
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    fn book(title: &str) -> Map<String, Value> {
        record(json!({"title": title, "author": "Herbert"}))
    }

    #[tokio::test]
    async fn create_then_get_returns_the_input_plus_defaults() {
        let store = MemoryStore::new(book_schema());
        let created = store
            .create(record(json!({"title": "Dune", "author": "Herbert"})))
            .await
            .unwrap();
        assert_eq!(created["title"], json!("Dune"));
        assert_eq!(created["imageUrl"], json!(PLACEHOLDER_IMAGE_URL));
        assert!(created.get("isbn").is_none());

        let id = created["id"].as_str().unwrap();
        let fetched = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let store = MemoryStore::new(book_schema());
        let err = store
            .create(record(json!({"author": "Herbert"})))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(violations) => assert_eq!(violations[0].field, "title"),
            other => panic!("expected validation failure, got {other}"),
        }
        let page = store.list(&[], Page::clamped(None, None, 100)).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn isbn_uniqueness_is_sparse() {
        let store = MemoryStore::new(book_schema());
        let mut first = book("a");
        first.insert("isbn".into(), json!("978-0441013593"));
        store.create(first.clone()).await.unwrap();

        let err = store.create(first).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        // absent isbns never conflict
        store.create(book("b")).await.unwrap();
        store.create(book("c")).await.unwrap();
        let page = store.list(&[], Page::clamped(None, None, 100)).await.unwrap();
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn pagination_returns_the_offset_window_and_full_total() {
        let store = MemoryStore::new(book_schema());
        for i in 0..25 {
            store.create(book(&format!("book-{i}"))).await.unwrap();
        }
        let page = store
            .list(&[], Page::clamped(Some(2), Some(10), 100))
            .await
            .unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0]["title"], json!("book-10"));
        assert_eq!(page.items[9]["title"], json!("book-19"));
    }

    #[tokio::test]
    async fn filters_are_exact_match() {
        let store = MemoryStore::new(book_schema());
        let mut dune = book("Dune");
        dune.insert("genre".into(), json!("SF"));
        store.create(dune).await.unwrap();
        store.create(book("Other")).await.unwrap();

        let page = store
            .list(
                &[("genre".to_string(), json!("SF"))],
                Page::clamped(None, None, 100),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0]["title"], json!("Dune"));
    }

    #[tokio::test]
    async fn missing_and_malformed_ids_are_not_found() {
        let store = MemoryStore::new(book_schema());
        let missing = Uuid::new_v4().to_string();
        assert!(store.get_by_id(&missing).await.unwrap().is_none());
        assert!(store.get_by_id("not-a-uuid").await.unwrap().is_none());
        assert!(store
            .update_by_id(&missing, Map::new())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_by_id(&missing).await.unwrap());
        assert!(!store.delete_by_id("not-a-uuid").await.unwrap());
    }

    #[tokio::test]
    async fn update_merges_and_revalidates() {
        let store = MemoryStore::new(book_schema());
        let created = store.create(book("Dune")).await.unwrap();
        let id = created["id"].as_str().unwrap();

        let updated = store
            .update_by_id(id, record(json!({"genre": "SF"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["genre"], json!("SF"));
        assert_eq!(updated["title"], json!("Dune"));

        let err = store
            .update_by_id(id, record(json!({"title": null})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn status_outside_enum_is_rejected_at_the_store() {
        let store = MemoryStore::new(task_schema());
        let err = store
            .create(record(
                json!({"userId": "u1", "title": "t", "status": "Archived"}),
            ))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(violations) => assert_eq!(violations[0].field, "status"),
            other => panic!("expected validation failure, got {other}"),
        }
    }

    #[tokio::test]
    async fn task_create_applies_defaults() {
        let store = MemoryStore::new(task_schema());
        let created = store
            .create(record(json!({"userId": "u1", "title": "t"})))
            .await
            .unwrap();
        assert_eq!(created["status"], json!("Pending"));
        assert_eq!(created["deleted"], json!(false));
        assert!(created["createdAt"].is_string());
    }
}
