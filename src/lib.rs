//! resource-kit: schema-driven CRUD REST services over PostgreSQL.

pub mod case;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod migration;
pub mod resources;
pub mod response;
pub mod routes;
pub mod schema;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod validate;

pub use error::AppError;
pub use gate::{AccessGate, AllowAll, BearerGate, Denied};
pub use migration::ensure_tables;
pub use resources::{book_schema, task_schema};
pub use routes::{common_routes, resource_routes};
pub use schema::{FieldSpec, FieldViolation, ResourceSchema};
pub use settings::Settings;
pub use state::AppState;
pub use store::{ListPage, MemoryStore, Page, PgStore, ResourceStore};
pub use validate::RequestValidator;
