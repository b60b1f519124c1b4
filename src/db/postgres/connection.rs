use crate::env_config::models::app_setting::AppSettings;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct PostgresConnection {
    pool: Pool<Postgres>,
}

impl PostgresConnection {
    pub async fn new(settings: Arc<AppSettings>) -> Result<Self, sqlx::Error> {
        info!("Initializing PostgreSQL connection...");

        let connection_string = format!(
            "postgres://{}:{}@{}/{}",
            settings.app_env.postgres_user,
            settings.app_env.postgres_password,
            settings.app_env.postgres_host,
            settings.app_env.postgres_database
        );

        let postgres = &settings.app_config.postgres;
        let pool = PgPoolOptions::new()
            .max_connections(postgres.max_connections)
            .min_connections(postgres.min_connections)
            .max_lifetime(Duration::from_secs(postgres.max_lifetime))
            .idle_timeout(Duration::from_secs(postgres.idle_timeout))
            .acquire_timeout(Duration::from_secs(postgres.timeout))
            .connect(&connection_string)
            .await?;

        let connection = Self { pool };

        debug!("Executing test query on PostgreSQL");
        match connection.ping().await {
            Ok(_) => info!("PostgreSQL connection successful"),
            Err(e) => {
                error!("Failed to connect to PostgreSQL: {}", e);
                return Err(e);
            }
        }

        Ok(connection)
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// `SELECT 1` round trip.
    pub async fn ping(&self) -> Result<bool, sqlx::Error> {
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(result == 1)
    }
}
