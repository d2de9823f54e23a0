use sqlx::{postgres::PgPoolOptions, Executor, Pool, Postgres};

use crate::config::AppConfig;
use crate::error::AppResult;

pub type Database = Pool<Postgres>;

pub async fn create_database_pool(config: &AppConfig) -> AppResult<Database> {
    let schema = config.db_schema.clone();
    let zone = config.zone.to_string();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .after_connect(move |conn, _meta| {
            // Identifier and offset are validated by AppConfig.
            let setup = format!(
                "CREATE SCHEMA IF NOT EXISTS {schema}; \
                 SET search_path TO {schema}, public; \
                 SET TIME ZONE INTERVAL '{zone}' HOUR TO MINUTE;"
            );
            Box::pin(async move {
                conn.execute(setup.as_str()).await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await?;

    // Test the connection
    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    log::info!("connected to database, schema {}", config.db_schema);
    Ok(pool)
}

pub async fn run_migrations(db: &Database) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}
