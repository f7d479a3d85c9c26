//! Shared application state for all routes.

use crate::gate::AccessGate;
use crate::store::ResourceStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResourceStore>,
    pub gate: Arc<dyn AccessGate>,
    /// Ceiling applied to the `limit` query parameter.
    pub max_page_size: u32,
}
