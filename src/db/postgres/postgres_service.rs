use crate::db::postgres::{
    connection::PostgresConnection,
    repository::company_repository::{StructCompanyRepository, TraitCompanyRepository},
};
use crate::env_config::models::app_setting::AppSettings;
use std::sync::Arc;
use tracing::{error, info};

pub struct PostgresService {
    // Connection
    pub connection: Arc<PostgresConnection>,

    // Catalog of discovered companies
    pub repository_company: Arc<dyn TraitCompanyRepository + Send + Sync>,
}

impl PostgresService {
    pub async fn new(settings: &Arc<AppSettings>) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing PostgreSQL service components");

        info!("Creating PostgreSQL connection");
        let postgres_connection = match PostgresConnection::new(settings.clone()).await {
            Ok(conn) => {
                info!("PostgreSQL connection established successfully");
                Arc::new(conn)
            }
            Err(e) => {
                error!("Failed to establish PostgreSQL connection: {}", e);
                return Err(Box::new(e));
            }
        };

        info!("Initializing repositories");
        let company_repository = StructCompanyRepository::new(postgres_connection.clone());
        if let Err(e) = company_repository.ensure_schema().await {
            error!("Failed to prepare company_infos table: {}", e);
            return Err(Box::new(e));
        }

        info!("PostgreSQL service initialized successfully");
        Ok(Self {
            connection: postgres_connection,
            repository_company: Arc::new(company_repository),
        })
    }
}
