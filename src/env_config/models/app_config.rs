use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct PostgresConfig {
    pub timeout: u64,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) moneycontrol-scraper/0.1".to_string(),
        }
    }
}

/// Tunables for the scraping pipeline. The selectors and column offsets are
/// positional contracts with the source site's markup, so they live here
/// rather than in code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Delay before every metadata request of the enrichment worker
    pub pacing_seconds: u64,
    /// Listing index, one page per entry. Repeated entries are fetched again.
    pub alphabet: Vec<String>,
    pub listing_anchor_selector: String,
    pub anchor_layout: AnchorLayout,
    pub dividend_row_selector: String,
    pub dividend_columns: DividendColumns,
    /// chrono format string for dividend dates
    pub date_format: String,
    pub technical: TechnicalSelectors,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        // "E" is listed twice in the source index; the page is simply fetched again
        let alphabet = [
            "A", "B", "C", "D", "E", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P",
            "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
        ]
        .iter()
        .map(|letter| letter.to_string())
        .collect();

        Self {
            pacing_seconds: 5,
            alphabet,
            listing_anchor_selector: ".bl_12".to_string(),
            anchor_layout: AnchorLayout::default(),
            dividend_row_selector: "table.mctable1>tbody>tr".to_string(),
            dividend_columns: DividendColumns::default(),
            date_format: "%d-%m-%Y".to_string(),
            technical: TechnicalSelectors::default(),
        }
    }
}

/// Indices into `href.split('/')` of a listing anchor.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnchorLayout {
    pub sector: usize,
    pub company_name: usize,
    pub symbol: usize,
}

impl AnchorLayout {
    /// Number of `/`-separated segments an anchor needs to be accepted.
    pub fn min_segments(&self) -> usize {
        self.sector.max(self.company_name).max(self.symbol) + 1
    }
}

impl Default for AnchorLayout {
    fn default() -> Self {
        Self {
            sector: 5,
            company_name: 6,
            symbol: 7,
        }
    }
}

/// Zero-based cell positions inside one dividend table row.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DividendColumns {
    pub announcement_date: usize,
    pub ex_date: usize,
    pub dividend_type: usize,
    pub percentage: usize,
    pub amount: usize,
    pub remark: usize,
}

impl DividendColumns {
    pub fn max_index(&self) -> usize {
        [
            self.announcement_date,
            self.ex_date,
            self.dividend_type,
            self.percentage,
            self.amount,
            self.remark,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }
}

impl Default for DividendColumns {
    fn default() -> Self {
        Self {
            announcement_date: 0,
            ex_date: 1,
            dividend_type: 2,
            percentage: 3,
            amount: 4,
            remark: 5,
        }
    }
}

/// Selectors for the daily technical-analysis page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TechnicalSelectors {
    pub bse_block: String,
    pub nse_block: String,
    pub price: String,
    pub previous_close: String,
    pub open: String,
    /// Text shaped like `12.35 (0.52%)`
    pub change: String,
    pub volume: String,
    pub indicator_rows: String,
    pub moving_average_rows: String,
    pub pivot_rows: String,
}

impl Default for TechnicalSelectors {
    fn default() -> Self {
        Self {
            bse_block: ".bsedata_bx".to_string(),
            nse_block: ".nsedata_bx".to_string(),
            price: ".span_price_wrap".to_string(),
            previous_close: ".priceprevclose".to_string(),
            open: ".priceopen".to_string(),
            change: ".span_price_change_prcnt".to_string(),
            volume: ".volume_data".to_string(),
            indicator_rows: "#techindd tbody tr".to_string(),
            moving_average_rows: "#movingavgd tbody tr".to_string(),
            pivot_rows: "#pevotld table:first-of-type tbody tr".to_string(),
        }
    }
}
