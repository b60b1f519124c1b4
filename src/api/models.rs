use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

pub const MSG_COMPANY_NOT_FOUND: &str = "Company not found";
pub const MSG_TRY_AGAIN: &str = "Something went wrong, please try again after some time";

#[derive(Debug, Serialize, Deserialize)]
pub struct AppStatus {
    pub app_version: String,
    pub is_db_connected: bool,
}

impl AppStatus {
    pub fn new(is_db_connected: bool) -> Self {
        Self {
            app_version: format!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            is_db_connected,
        }
    }
}

/// `{ "status": "success", "msg": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status: String,
    pub msg: String,
}

/// `{ "status": <http code>, "error_msg": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct FailedResponse {
    pub status: u16,
    pub error_msg: String,
}

/// `{ "status": "success", "data": ... }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub status: String,
    pub data: T,
}

pub fn success(msg: &str) -> Response {
    (
        StatusCode::OK,
        Json(SuccessResponse {
            status: "success".to_string(),
            msg: msg.to_string(),
        }),
    )
        .into_response()
}

pub fn data<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(DataResponse {
            status: "success".to_string(),
            data,
        }),
    )
        .into_response()
}

pub fn failure(status: StatusCode, error_msg: &str) -> Response {
    (
        status,
        Json(FailedResponse {
            status: status.as_u16(),
            error_msg: error_msg.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
