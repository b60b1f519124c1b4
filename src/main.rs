mod api;
mod app_state;
mod db;
mod env_config;
mod layers;
mod logger;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use app_state::models::AppState;
use axum::{Router, middleware, routing::get};
use db::postgres::postgres_service::PostgresService;
use env_config::models::{app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings};
use layers::{create_cors, create_trace};
use services::moneycontrol::{
    Endpoints, service::MoneycontrolService, transport::ReqwestTransport,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Инициализация приложения
    let settings: Arc<AppSettings> = Arc::new(initialize_application().await);

    // Подключение к базе данных
    let postgres_service = initialize_database_connection(settings.clone()).await;

    // Настройка адреса сервера
    let server_address: SocketAddr = format!(
        "{}:{}",
        settings.app_env.server_address, settings.app_env.server_port,
    )
    .parse()
    .expect("Invalid server address configuration");

    info!("Server will listen on: {}", server_address);

    // Сервис сбора данных Moneycontrol
    let moneycontrol_service = initialize_moneycontrol_service(&settings, &postgres_service);

    // Создание глобального состояния приложения
    let app_state: Arc<AppState> = Arc::new(AppState::new(
        settings.clone(),
        Arc::new(postgres_service),
        Arc::new(moneycontrol_service),
    ));

    // Создание API роутера
    let app_router = create_application_router(app_state.clone());

    // Запуск HTTP сервера
    start_http_server(app_router, server_address).await;

    info!("Application stopped");
}

/// Инициализирует настройки и логирование приложения
async fn initialize_application() -> AppSettings {
    // Загрузка переменных окружения и конфигурации
    let environment = AppEnv::new();
    let config = AppConfig::new(&environment.env);
    let app_settings = AppSettings {
        app_config: config,
        app_env: environment,
    };

    // Настройка логирования с уровнем и форматом из конфигурации
    logger::init_logger(
        &app_settings.app_config.log.level,
        &app_settings.app_config.log.format,
        app_settings.app_env.is_local(),
    )
    .expect("Failed to initialize logger");

    info!("Starting Moneycontrol Scraper application...");
    info!("Current environment: {}", app_settings.app_env.env);

    // Добавление подробного логирования в режиме разработки
    if app_settings.app_env.is_local() {
        info!("Running in local development mode");
        debug!("Configuration details: {:#?}", app_settings.app_config);
    } else {
        info!("Running in production mode");
    }

    app_settings
}

/// Устанавливает соединение с базой данных
async fn initialize_database_connection(settings: Arc<AppSettings>) -> PostgresService {
    info!("Initializing database connection...");

    match PostgresService::new(&settings).await {
        Ok(service) => {
            info!("PostgreSQL connection established successfully");
            service
        }
        Err(err) => {
            error!("Failed to connect to PostgreSQL: {}", err);
            panic!("Cannot continue without PostgreSQL connection");
        }
    }
}

/// Собирает конвейер: HTTP клиент, каталог компаний, адреса источника и приёмника
fn initialize_moneycontrol_service(
    settings: &AppSettings,
    postgres_service: &PostgresService,
) -> MoneycontrolService {
    let transport = match ReqwestTransport::new(&settings.app_config.http) {
        Ok(transport) => transport,
        Err(err) => {
            error!("Failed to build HTTP client: {}", err);
            panic!("Cannot continue without HTTP client: {}", err);
        }
    };

    MoneycontrolService::new(
        postgres_service.repository_company.clone(),
        Arc::new(transport),
        settings.app_config.scraper.clone(),
        Endpoints::from(&settings.app_env),
    )
}

/// Создает API роутер со всеми эндпоинтами и middleware
fn create_application_router(app_state: Arc<AppState>) -> Router {
    let api_key = Arc::new(app_state.settings.app_env.api_key.clone());

    let api_v1 = Router::new()
        .route(
            "/collectCompanySymbols",
            get(api::collect_company_symbols),
        )
        .route(
            "/scrapeDividendHistory",
            get(api::scrape_dividend_history),
        )
        .route(
            "/collectHistoricalData",
            get(api::collect_historical_data),
        )
        .route("/stockPrice", get(api::stock_price))
        .route("/technicals", get(api::technical_indicators))
        .route("/movingAverages", get(api::moving_averages))
        .route("/pivotLevels", get(api::pivot_levels))
        .route_layer(middleware::from_fn_with_state(api_key, api::require_api_key));

    Router::new()
        .route("/api-health", get(api::health_api))
        .route("/db-health", get(api::health_db))
        .route("/status", get(api::app_status))
        .nest("/api/v1", api_v1)
        .layer(axum::Extension(app_state.clone()))
        .layer(create_cors())
        .layer(create_trace())
}

/// Запускает HTTP сервер на указанном адресе
async fn start_http_server(app: Router, addr: SocketAddr) {
    info!("Starting HTTP server on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind to address {}: {}", addr, err);
            panic!("Cannot start server: {}", err);
        }
    };

    info!("Server started successfully, now accepting connections");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
        panic!("Server failed: {}", err);
    }
}

/// Ожидает Ctrl+C для корректной остановки
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
