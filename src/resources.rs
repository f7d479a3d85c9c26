//! The two resource schemas served by the binaries.

use crate::schema::{FieldSpec, ResourceSchema};
use serde_json::Value;

/// Image URL assigned to books created without one.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150";

const URL_PATTERN: &str = "^https?://.+";

/// Valid task states.
pub const TASK_STATUSES: &[&str] = &["Pending", "In Progress", "Completed"];

pub fn book_schema() -> ResourceSchema {
    ResourceSchema {
        name: "Book",
        table: "books",
        fields: vec![
            FieldSpec::text("title").required(),
            FieldSpec::text("author").required().filterable(),
            FieldSpec::text("genre").filterable(),
            FieldSpec::integer("publicationYear").filterable(),
            FieldSpec::text("imageUrl")
                .default_value(Value::String(PLACEHOLDER_IMAGE_URL.to_string()))
                .pattern(URL_PATTERN, "Invalid URL format"),
            // Unique across non-null values only; absent isbns never conflict.
            FieldSpec::text("isbn").unique(),
            FieldSpec::text("description"),
        ],
    }
}

pub fn task_schema() -> ResourceSchema {
    ResourceSchema {
        name: "Task",
        table: "tasks",
        fields: vec![
            // Ownership reference; not enforced referentially.
            FieldSpec::text("userId").required().filterable(),
            FieldSpec::text("title").required(),
            FieldSpec::text("description"),
            FieldSpec::text("status")
                .allowed(TASK_STATUSES)
                .default_value(Value::String("Pending".to_string()))
                .filterable(),
            FieldSpec::timestamp("createdAt").default_now(),
            // Soft-delete marker; declared but not read or written by any route.
            FieldSpec::boolean("deleted").default_value(Value::Bool(false)),
        ],
    }
}
