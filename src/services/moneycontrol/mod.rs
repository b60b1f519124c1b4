//! Moneycontrol collection pipeline.
//!
//! Symbols are crawled from the alphabetical listing pages, stored, then
//! enriched one by one in the background. Dividend tables and raw price
//! history are fetched per company on demand and relayed to the MoneyBS sink.
//! The daily technical-analysis page is read on demand and returned as is.

pub mod crawler;
pub mod dividends;
pub mod downstream;
pub mod enrichment;
pub mod errors;
pub mod historical;
pub mod html;
pub mod service;
pub mod technicals;
pub mod transport;

use crate::env_config::models::app_env::AppEnv;

/// Remote locations used by the pipeline. Templates take `{name}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    /// Listing page prefix; the index letter is appended
    pub symbol_url: String,
    /// `{company_name}`, `{symbol}`
    pub dividend_url: String,
    /// `{symbol}`
    pub comp_details_url: String,
    /// `{nse_id}`, `{timestamp}`
    pub historical_data_url: String,
    /// `{company_name}`, `{symbol}`; the daily technical-analysis page
    pub technical_url: String,

    pub sink_base_url: String,
    pub sink_api_key: String,
    pub sink_auth_endpoint: String,
    /// `{key}`, appended to `sink_base_url`
    pub sink_historical_data_endpoint: String,
    /// `{key}`, appended to `sink_base_url`
    pub sink_dividend_endpoint: String,
}

impl From<&AppEnv> for Endpoints {
    fn from(env: &AppEnv) -> Self {
        Self {
            symbol_url: env.moneycontrol_symbol_url.clone(),
            dividend_url: env.moneycontrol_dividend_url.clone(),
            comp_details_url: env.moneycontrol_comp_details_url.clone(),
            historical_data_url: env.moneycontrol_historical_data_url.clone(),
            technical_url: env.moneycontrol_technical_url.clone(),
            sink_base_url: env.moneybs_base_url.clone(),
            sink_api_key: env.moneybs_api_key.clone(),
            sink_auth_endpoint: env.moneybs_auth_endpoint.clone(),
            sink_historical_data_endpoint: env.moneybs_historical_data_endpoint.clone(),
            sink_dividend_endpoint: env.moneybs_historical_dividend_data_endpoint.clone(),
        }
    }
}
