use crate::config::DatabaseConfig;
use rocket::fairing::AdHoc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

fn init_pool(db_config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .idle_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(1800))
        // Lazy: a request that needs the database fails as a 500, the
        // process itself starts regardless of database availability.
        .connect_lazy(&db_config.url)
}

pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::try_on_ignite("Postgres (sqlx)", |rocket| async move {
        let pool = match init_pool(&db_config) {
            Ok(pool) => pool,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize database pool");
                return Err(rocket);
            }
        };

        match sqlx::migrate!().run(&pool).await {
            Ok(()) => tracing::info!("Database migrations applied"),
            Err(e) => tracing::warn!(error = %e, "Database unavailable at startup, migrations not applied"),
        }

        Ok(rocket.manage(pool))
    })
}
