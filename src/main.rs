mod analytics;
mod config;
mod database;
mod error;
mod filters;
mod handlers;
mod models;
mod services;
mod store;
mod utils;

use std::sync::Arc;

use dotenvy::dotenv;

use config::AppConfig;
use database::{create_database_pool, run_migrations};
use handlers::{create_router, AppState};
use store::PgProductionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = AppConfig::from_env()?;

    let db = create_database_pool(&config).await?;
    run_migrations(&db).await?;
    log::info!("migrations applied");

    let store = PgProductionStore::new(db, config.zone);
    let app = create_router(AppState::new(Arc::new(store), config.zone));

    let addr = config.bind_address();
    log::info!("marcenaria server starting on http://{} (UTC{})", addr, config.zone);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
