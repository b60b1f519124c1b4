use axum::{Json, extract::Extension};
use std::sync::Arc;

use super::models::AppStatus;
use crate::app_state::models::AppState;

pub async fn app_status(Extension(app_state): Extension<Arc<AppState>>) -> Json<AppStatus> {
    let is_db_connected = app_state
        .postgres_service
        .connection
        .ping()
        .await
        .unwrap_or(false);

    Json(AppStatus::new(is_db_connected))
}
