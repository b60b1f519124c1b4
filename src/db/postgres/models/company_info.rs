use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One tracked company in the `company_infos` catalog. `symbol` is unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CompanyInfo {
    /// Assigned by the database; zero until persisted
    pub id: i64,
    /// Anchor text as shown on the listing page
    pub display_name: String,
    /// Lowercase lookup key
    pub company: String,
    pub sector: String,
    /// Company slug used in source-site URLs
    pub company_name: String,
    /// Source-site symbol
    pub symbol: String,

    // Filled in by the enrichment worker
    pub nse_id: String,
    pub bse_id: String,
    pub market_cap: f64,
    pub main_sector_details: String,
    pub sub_sector_details: String,
}

impl CompanyInfo {
    pub fn new(display_name: &str, sector: &str, company_name: &str, symbol: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            company: display_name.to_lowercase(),
            sector: sector.to_string(),
            company_name: company_name.to_string(),
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    /// A record needs a lookup key and a symbol before it may be stored.
    pub fn is_insertable(&self) -> bool {
        !self.company.trim().is_empty() && !self.symbol.trim().is_empty()
    }
}
