use crate::db::postgres::postgres_service::PostgresService;
use crate::env_config::models::app_setting::AppSettings;
use crate::services::moneycontrol::service::MoneycontrolService;

use std::sync::Arc;

pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub postgres_service: Arc<PostgresService>,
    pub moneycontrol_service: Arc<MoneycontrolService>,
}

impl AppState {
    pub fn new(
        settings: Arc<AppSettings>,
        postgres_service: Arc<PostgresService>,
        moneycontrol_service: Arc<MoneycontrolService>,
    ) -> Self {
        Self {
            settings,
            postgres_service,
            moneycontrol_service,
        }
    }
}
