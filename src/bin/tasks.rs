//! Task tracker service: CRUD for tasks at /tasks.

use resource_kit::{
    common_routes, ensure_tables, gate, resource_routes, task_schema, AppState, PgStore, Settings,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("resource_kit=info".parse()?))
        .init();

    let settings = Settings::from_env();
    let schema = task_schema();

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&settings.database_url)?;
    if let Err(err) = ensure_tables(&pool, &schema).await {
        tracing::error!(error = %err, "bootstrap DDL failed, continuing");
    }

    let state = AppState {
        store: Arc::new(PgStore::new(pool, schema)),
        gate: gate::from_settings(&settings),
        max_page_size: settings.max_page_size,
    };

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .nest("/tasks", resource_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));

    let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
