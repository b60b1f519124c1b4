use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::models::{MSG_COMPANY_NOT_FOUND, MSG_TRY_AGAIN, data, failure, success};
use crate::app_state::models::AppState;
use crate::services::moneycontrol::errors::ScrapeError;
use crate::services::moneycontrol::service::MoneycontrolService;

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    #[serde(default)]
    pub company: String,
}

pub async fn collect_company_symbols(Extension(app_state): Extension<Arc<AppState>>) -> Response {
    symbols_response(&app_state.moneycontrol_service).await
}

pub async fn scrape_dividend_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    dividends_response(&app_state.moneycontrol_service, &query.company).await
}

pub async fn collect_historical_data(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    historical_response(&app_state.moneycontrol_service, &query.company).await
}

pub async fn stock_price(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    let service = &app_state.moneycontrol_service;
    data_or_failure(service.stock_price(&query.company).await)
}

pub async fn technical_indicators(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    let service = &app_state.moneycontrol_service;
    data_or_failure(service.technical_indicators(&query.company).await)
}

pub async fn moving_averages(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    let service = &app_state.moneycontrol_service;
    data_or_failure(service.moving_averages(&query.company).await)
}

pub async fn pivot_levels(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    let service = &app_state.moneycontrol_service;
    data_or_failure(service.pivot_levels(&query.company).await)
}

async fn symbols_response(service: &MoneycontrolService) -> Response {
    info!("Moneycontrol symbol collection started");
    match service.capture_symbols().await {
        Ok(captured) => {
            info!("Moneycontrol symbol collection finished: {} symbols", captured);
            success("Symbols collected successfully")
        }
        Err(e) => failed(e),
    }
}

async fn dividends_response(service: &MoneycontrolService, company: &str) -> Response {
    info!("Dividend history requested for {}", company);
    match service.scrape_dividend_history(company).await {
        Ok(_) => success("Dividend data saved successfully"),
        Err(e) => failed(e),
    }
}

async fn historical_response(service: &MoneycontrolService, company: &str) -> Response {
    info!("Historical daily data requested for {}", company);
    match service.capture_historical_data(company).await {
        Ok(()) => success("Historical daily data saved successfully"),
        Err(e) => failed(e),
    }
}

fn data_or_failure<T: Serialize>(result: Result<T, ScrapeError>) -> Response {
    match result {
        Ok(value) => data(value),
        Err(e) => failed(e),
    }
}

/// Lookup misses get their own message, everything else the generic one.
fn failed(e: ScrapeError) -> Response {
    if e.is_not_found() {
        return failure(StatusCode::NOT_FOUND, MSG_COMPANY_NOT_FOUND);
    }

    error!("Moneycontrol request failed: {}", e);
    failure(StatusCode::INTERNAL_SERVER_ERROR, MSG_TRY_AGAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::body_json;
    use crate::db::postgres::models::company_info::CompanyInfo;
    use crate::db::postgres::repository::company_repository::TraitCompanyRepository;
    use crate::env_config::models::app_config::ScraperConfig;
    use crate::test_support::{InMemoryCompanyRepository, ScriptedTransport, test_endpoints};

    async fn service_with(transport: ScriptedTransport) -> MoneycontrolService {
        let repository = Arc::new(InMemoryCompanyRepository::new());
        let mut company = CompanyInfo::new("Infosys", "IT", "infosys", "IT");
        company.nse_id = "INFY".to_string();
        repository.replace_all(&[company]).await.unwrap();

        MoneycontrolService::new(
            repository,
            Arc::new(transport),
            ScraperConfig::default(),
            test_endpoints(),
        )
    }

    #[tokio::test]
    async fn test_unknown_company_gets_not_found_envelope() {
        let service = service_with(ScriptedTransport::new()).await;

        let response = dividends_response(&service, "ACME").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["error_msg"], MSG_COMPANY_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_company_parameter_is_not_found() {
        let service = service_with(ScriptedTransport::new()).await;

        let response = historical_response(&service, "").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upstream_failure_gets_generic_envelope() {
        let service = service_with(ScriptedTransport::new()).await;

        let response = dividends_response(&service, "infy").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["status"], 500);
        assert_eq!(body["error_msg"], MSG_TRY_AGAIN);
    }

    #[tokio::test]
    async fn test_dividend_success_envelope() {
        let transport = ScriptedTransport::new()
            .with_page(
                "https://mc.test/dividends/infosys/IT",
                br#"<table class="mctable1"><tbody><tr><td>01-04-2023</td></tr></tbody></table>"#
                    .to_vec(),
            )
            .with_page("https://sink.test/auth", b"tok".to_vec());
        let service = service_with(transport).await;

        let response = dividends_response(&service, "Infosys").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["msg"], "Dividend data saved successfully");
    }

    #[tokio::test]
    async fn test_failed_symbol_crawl_gets_generic_envelope() {
        let service = service_with(ScriptedTransport::new()).await;

        let response = symbols_response(&service).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_pivot_levels_wrapped_in_data_envelope() {
        let transport = ScriptedTransport::new().with_page(
            "https://mc.test/technical-analysis/infosys/IT/daily",
            br#"<div id="pevotld"><table><tbody>
                <tr><td>Classic</td><td>1510</td><td>1520</td><td>1530</td><td>1500</td><td>1490</td><td>1480</td><td>1470</td></tr>
            </tbody></table></div>"#
                .to_vec(),
        );
        let service = service_with(transport).await;

        let response = data_or_failure(service.pivot_levels("INFY").await);

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["Classic"]["Pivot"], 1500.0);
        assert_eq!(body["data"]["Classic"]["S3"], 1470.0);
    }

    #[tokio::test]
    async fn test_technical_lookup_miss_gets_not_found_envelope() {
        let service = service_with(ScriptedTransport::new()).await;

        let response = data_or_failure(service.stock_price("ACME").await);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error_msg"], MSG_COMPANY_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_technical_page_failure_gets_generic_envelope() {
        let service = service_with(ScriptedTransport::new()).await;

        let response = data_or_failure(service.moving_averages("infy").await);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_query_without_company_defaults_to_empty() {
        let query: CompanyQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.company, "");
    }
}
