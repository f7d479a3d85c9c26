//! Resource schemas: per-field presence, type, default, format, uniqueness.
//!
//! A `ResourceSchema` is a data-described rule table interpreted by one
//! generic validator. The request layer and the stores both run the same
//! rules, so a record is checked on the way in and again before every write.

use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

/// Wire type of a field. Maps to both a JSON shape and a PostgreSQL column type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Boolean,
    Timestamp,
}

/// Default applied when a field is absent from a create payload.
#[derive(Clone, Debug)]
pub enum FieldDefault {
    Value(Value),
    /// Current time, stamped by the store at create.
    Now,
}

/// Format constraint: pattern string compiled at check time, with the
/// message reported to the client on mismatch.
#[derive(Clone, Debug)]
pub struct FieldPattern {
    pub regex: &'static str,
    pub message: &'static str,
}

/// One field rule: name (camelCase wire name), type, and constraints.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldType,
    pub required: bool,
    pub default: Option<FieldDefault>,
    pub pattern: Option<FieldPattern>,
    pub allowed: Option<&'static [&'static str]>,
    pub unique: bool,
    pub filterable: bool,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            pattern: None,
            allowed: None,
            unique: false,
            filterable: false,
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(FieldDefault::Value(value));
        self
    }

    pub fn default_now(mut self) -> Self {
        self.default = Some(FieldDefault::Now);
        self
    }

    pub fn pattern(mut self, regex: &'static str, message: &'static str) -> Self {
        self.pattern = Some(FieldPattern { regex, message });
        self
    }

    pub fn allowed(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = Some(values);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }
}

/// A field-level rule violation, reported verbatim in 400 bodies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Shape and constraints of one resource. `name` is the display name used in
/// not-found and deletion messages; `table` the PostgreSQL table.
#[derive(Clone, Debug)]
pub struct ResourceSchema {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check every rule against a candidate record. Violations come back in
    /// field declaration order; a type violation suppresses the field's
    /// remaining checks.
    pub fn validate(&self, record: &Map<String, Value>) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();
        for spec in &self.fields {
            let value = record.get(spec.name);
            if spec.required && value.map_or(true, Value::is_null) {
                violations.push(FieldViolation::new(
                    spec.name,
                    format!("{} is required", spec.name),
                ));
                continue;
            }
            if let Some(v) = value {
                if !v.is_null() {
                    check_field(spec, v, &mut violations);
                }
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Fill absent fields that declare a default. An explicit null is a
    /// value, not an absence.
    pub fn apply_defaults(&self, record: &mut Map<String, Value>) {
        for spec in &self.fields {
            if record.contains_key(spec.name) {
                continue;
            }
            match &spec.default {
                Some(FieldDefault::Value(v)) => {
                    record.insert(spec.name.to_string(), v.clone());
                }
                Some(FieldDefault::Now) => {
                    record.insert(
                        spec.name.to_string(),
                        Value::String(Utc::now().to_rfc3339()),
                    );
                }
                None => {}
            }
        }
    }

    /// Drop keys the schema does not declare (including any client-sent id;
    /// identity is store-assigned).
    pub fn strip_unknown(&self, record: &mut Map<String, Value>) {
        record.retain(|k, _| self.field(k).is_some());
    }

    /// Coerce a raw query-string value to the field's JSON type so exact-match
    /// filters compare against stored values. Unparseable input stays a string
    /// (and simply matches nothing).
    pub fn coerce_query_value(&self, spec: &FieldSpec, raw: &str) -> Value {
        match spec.kind {
            FieldType::Integer => raw
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            FieldType::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    Value::Bool(true)
                } else if raw.eq_ignore_ascii_case("false") {
                    Value::Bool(false)
                } else {
                    Value::String(raw.to_string())
                }
            }
            FieldType::Text | FieldType::Timestamp => Value::String(raw.to_string()),
        }
    }
}

/// Rule checks for one present, non-null value.
pub(crate) fn check_field(spec: &FieldSpec, value: &Value, out: &mut Vec<FieldViolation>) {
    let type_ok = match spec.kind {
        FieldType::Text => value.is_string(),
        FieldType::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Timestamp => value
            .as_str()
            .map(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
            .unwrap_or(false),
    };
    if !type_ok {
        let expected = match spec.kind {
            FieldType::Text => "a string",
            FieldType::Integer => "an integer",
            FieldType::Boolean => "a boolean",
            FieldType::Timestamp => "an RFC 3339 timestamp",
        };
        out.push(FieldViolation::new(
            spec.name,
            format!("{} must be {}", spec.name, expected),
        ));
        return;
    }
    if let Some(pattern) = &spec.pattern {
        if let Some(s) = value.as_str() {
            match Regex::new(pattern.regex) {
                Ok(re) => {
                    if !re.is_match(s) {
                        out.push(FieldViolation::new(spec.name, pattern.message));
                    }
                }
                Err(_) => out.push(FieldViolation::new(spec.name, "invalid pattern")),
            }
        }
    }
    if let Some(allowed) = spec.allowed {
        if let Some(s) = value.as_str() {
            if !allowed.contains(&s) {
                out.push(FieldViolation::new(
                    spec.name,
                    format!("{} must be one of: {}", spec.name, allowed.join(", ")),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{book_schema, task_schema, PLACEHOLDER_IMAGE_URL};
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn missing_required_fields_are_reported_in_order() {
        let schema = book_schema();
        let err = schema.validate(&map(json!({}))).unwrap_err();
        let fields: Vec<&str> = err.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "author"]);
        assert_eq!(err[0].message, "title is required");
    }

    #[test]
    fn explicit_null_for_required_field_is_a_violation() {
        let schema = book_schema();
        let err = schema
            .validate(&map(json!({"title": null, "author": "x"})))
            .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].field, "title");
    }

    #[test]
    fn type_mismatch_is_reported() {
        let schema = book_schema();
        let err = schema
            .validate(&map(
                json!({"title": "Dune", "author": "Herbert", "publicationYear": "1965"}),
            ))
            .unwrap_err();
        assert_eq!(err[0].field, "publicationYear");
        assert_eq!(err[0].message, "publicationYear must be an integer");
    }

    #[test]
    fn url_pattern_is_enforced() {
        let schema = book_schema();
        let err = schema
            .validate(&map(
                json!({"title": "Dune", "author": "Herbert", "imageUrl": "not-a-url"}),
            ))
            .unwrap_err();
        assert_eq!(err[0].field, "imageUrl");
        assert_eq!(err[0].message, "Invalid URL format");

        assert!(schema
            .validate(&map(
                json!({"title": "Dune", "author": "Herbert", "imageUrl": "https://example.com/x.png"}),
            ))
            .is_ok());
    }

    #[test]
    fn status_outside_enum_is_rejected() {
        let schema = task_schema();
        let err = schema
            .validate(&map(json!({"userId": "u1", "title": "t", "status": "Done"})))
            .unwrap_err();
        assert_eq!(err[0].field, "status");
        assert!(err[0].message.contains("must be one of"));
    }

    #[test]
    fn defaults_fill_absent_fields_only() {
        let schema = book_schema();
        let mut record = map(json!({"title": "Dune", "author": "Herbert"}));
        schema.apply_defaults(&mut record);
        assert_eq!(record["imageUrl"], json!(PLACEHOLDER_IMAGE_URL));
        assert!(!record.contains_key("isbn"));

        let mut record = map(json!({"title": "Dune", "author": "Herbert", "imageUrl": null}));
        schema.apply_defaults(&mut record);
        assert_eq!(record["imageUrl"], Value::Null);
    }

    #[test]
    fn task_defaults() {
        let schema = task_schema();
        let mut record = map(json!({"userId": "u1", "title": "t"}));
        schema.apply_defaults(&mut record);
        assert_eq!(record["status"], json!("Pending"));
        assert_eq!(record["deleted"], json!(false));
        let created_at = record["createdAt"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
    }

    #[test]
    fn strip_unknown_drops_undeclared_keys_and_id() {
        let schema = book_schema();
        let mut record = map(json!({"title": "Dune", "id": "x", "rating": 5}));
        schema.strip_unknown(&mut record);
        assert_eq!(record.len(), 1);
        assert!(record.contains_key("title"));
    }

    #[test]
    fn query_coercion_follows_field_type() {
        let schema = book_schema();
        let year = schema.field("publicationYear").unwrap();
        assert_eq!(schema.coerce_query_value(year, "1965"), json!(1965));
        assert_eq!(schema.coerce_query_value(year, "xyz"), json!("xyz"));

        let tasks = task_schema();
        let deleted = tasks.field("deleted").unwrap();
        assert_eq!(tasks.coerce_query_value(deleted, "true"), json!(true));
        let author = schema.field("author").unwrap();
        assert_eq!(schema.coerce_query_value(author, "Herbert"), json!("Herbert"));
    }
}
