mod auth;
mod health_api;
mod health_db;
mod models;
mod moneycontrol;
mod status;

pub use auth::require_api_key;
pub use health_api::health_api;
pub use health_db::health_db;
pub use moneycontrol::{
    collect_company_symbols, collect_historical_data, moving_averages, pivot_levels,
    scrape_dividend_history, stock_price, technical_indicators,
};
pub use status::app_status;
