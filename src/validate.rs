//! Request-level validation against the resource schema's rule table.
//!
//! The same rules run again inside the stores before every write; this layer
//! rejects bad payloads before a store is ever touched.

use crate::schema::{check_field, FieldViolation, ResourceSchema};
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Full check for create payloads: required presence plus every rule on
    /// the fields present.
    pub fn validate(
        body: &Map<String, Value>,
        schema: &ResourceSchema,
    ) -> Result<(), Vec<FieldViolation>> {
        schema.validate(body)
    }

    /// Check for update payloads: rules run only over the fields present.
    /// A present null still violates required-ness, so a partial update
    /// cannot blank out a required field.
    pub fn validate_partial(
        body: &Map<String, Value>,
        schema: &ResourceSchema,
    ) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();
        for spec in &schema.fields {
            let Some(value) = body.get(spec.name) else {
                continue;
            };
            if value.is_null() {
                if spec.required {
                    violations.push(FieldViolation::new(
                        spec.name,
                        format!("{} is required", spec.name),
                    ));
                }
                continue;
            }
            check_field(spec, value, &mut violations);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
