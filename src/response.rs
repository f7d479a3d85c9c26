//! Response body shapes shared by handlers and the error mapping.
//!
//! Two error shapes exist on purpose: `{message}` for not-found and server
//! errors, `{errors: [{field, message}]}` for validation. Callers tell them
//! apart by status code.

use crate::schema::FieldViolation;
use serde::Serialize;
use serde_json::Value;

/// List responses: the requested page plus the unpaginated match count.
#[derive(Serialize)]
pub struct ListBody {
    pub items: Vec<Value>,
    pub total: u64,
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorListBody {
    pub errors: Vec<FieldViolation>,
}
