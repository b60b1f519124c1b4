use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Dev,
    Prod,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Env::Local),
            "dev" => Ok(Env::Dev),
            "prod" => Ok(Env::Prod),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Env::Local => write!(f, "local"),
            Env::Dev => write!(f, "dev"),
            Env::Prod => write!(f, "prod"),
        }
    }
}

/// Values read from the process environment: listen address, database
/// credentials, and every remote endpoint the pipeline talks to.
#[derive(Debug, Clone)]
pub struct AppEnv {
    pub env: Env,
    pub server_port: u16,
    pub server_address: String,

    pub postgres_host: String,
    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_database: String,

    /// Key expected in the `x-api-key` header of inbound trigger requests
    pub api_key: String,

    // Source site
    pub moneycontrol_symbol_url: String,
    pub moneycontrol_dividend_url: String,
    pub moneycontrol_comp_details_url: String,
    pub moneycontrol_historical_data_url: String,
    pub moneycontrol_technical_url: String,

    // Downstream sink
    pub moneybs_api_key: String,
    pub moneybs_base_url: String,
    pub moneybs_auth_endpoint: String,
    pub moneybs_historical_data_endpoint: String,
    pub moneybs_historical_dividend_data_endpoint: String,
}

impl AppEnv {
    pub fn is_local(&self) -> bool {
        self.env == Env::Local
    }
}
