//! Persistence abstraction: one store per resource, two backends.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::schema::ResourceSchema;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Offset pagination, 1-indexed pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub const DEFAULT_SIZE: u32 = 10;

    /// Build from optional query parameters. Absent or sub-1 values fall back
    /// to the defaults (page 1, 10 per page); `limit` is capped at `max_size`.
    pub fn clamped(page: Option<u32>, limit: Option<u32>, max_size: u32) -> Self {
        let number = page.filter(|p| *p >= 1).unwrap_or(1);
        let size = limit
            .filter(|l| *l >= 1)
            .unwrap_or(Self::DEFAULT_SIZE)
            .min(max_size);
        Self { number, size }
    }

    pub fn offset(&self) -> u64 {
        (u64::from(self.number) - 1) * u64::from(self.size)
    }
}

/// One page of matches plus the unpaginated total.
#[derive(Clone, Debug)]
pub struct ListPage {
    pub items: Vec<Value>,
    pub total: u64,
}

/// CRUD contract for one resource. Records are JSON objects with camelCase
/// keys; every write re-runs the schema rules on the full candidate record.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    fn schema(&self) -> &ResourceSchema;

    /// Strip unknown fields, apply defaults, validate, assign an id, persist.
    /// Uniqueness conflicts surface as persistence failures, not validation.
    async fn create(&self, record: Map<String, Value>) -> Result<Value, AppError>;

    /// Exact-match filters over filterable fields; insertion-ordered page.
    async fn list(&self, filters: &[(String, Value)], page: Page) -> Result<ListPage, AppError>;

    /// A malformed id is not-found, never an error.
    async fn get_by_id(&self, id: &str) -> Result<Option<Value>, AppError>;

    /// Merge the partial record over the stored one, re-validate the merged
    /// result, persist. Fields absent from the partial are untouched.
    async fn update_by_id(
        &self,
        id: &str,
        partial: Map<String, Value>,
    ) -> Result<Option<Value>, AppError>;

    /// Hard delete. Returns whether a record existed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError>;

    /// Connectivity probe for the readiness route.
    async fn ping(&self) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        let page = Page::clamped(None, None, 100);
        assert_eq!(page, Page { number: 1, size: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_offset_is_zero_based() {
        let page = Page::clamped(Some(2), Some(10), 100);
        assert_eq!(page.offset(), 10);
        let page = Page::clamped(Some(3), Some(7), 100);
        assert_eq!(page.offset(), 14);
    }

    #[test]
    fn limit_is_capped() {
        let page = Page::clamped(Some(1), Some(100_000), 100);
        assert_eq!(page.size, 100);
    }

    #[test]
    fn sub_one_values_fall_back_to_defaults() {
        let page = Page::clamped(Some(0), Some(0), 100);
        assert_eq!(page, Page { number: 1, size: 10 });
    }
}
