use super::models::app_config::AppConfig;
use super::models::app_env::{AppEnv, Env};
use std::env;
use std::str::FromStr;

impl AppEnv {
    pub fn new() -> AppEnv {
        AppEnv {
            env: Env::from_str(&get_env_var("ENV")).unwrap_or_else(|e| panic!("ENV -> ENV: {}", e)),
            server_port: get_env_var("SERVER_PORT")
                .parse()
                .expect("PORT must be a number"),
            server_address: get_env_var("SERVER_ADDRESS"),
            postgres_host: get_env_var("POSTGRES_HOST"),
            postgres_user: get_env_var("POSTGRES_USER"),
            postgres_password: get_env_var("POSTGRES_PASSWORD"),
            postgres_database: get_env_var("POSTGRES_DATABASE"),
            api_key: get_env_var("API_KEY"),
            moneycontrol_symbol_url: get_env_var("MONEYCONTROL_SYMBOL_URL"),
            moneycontrol_dividend_url: get_env_var("MONEYCONTROL_DIVIDEND_URL"),
            moneycontrol_comp_details_url: get_env_var("MONEYCONTROL_COMP_DETAILS_URL"),
            moneycontrol_historical_data_url: get_env_var("MONEYCONTROL_HISTORICAL_DATA_URL"),
            moneycontrol_technical_url: get_env_var("MONEYCONTROL_TECHNICAL_URL"),
            moneybs_api_key: get_env_var("MONEYBS_API_KEY"),
            moneybs_base_url: get_env_var("MONEYBS_BASE_URL"),
            moneybs_auth_endpoint: get_env_var("MONEYBS_AUTH_ENDPOINT"),
            moneybs_historical_data_endpoint: get_env_var("MONEYBS_HISTORICAL_DATA_ENDPOINT"),
            moneybs_historical_dividend_data_endpoint: get_env_var(
                "MONEYBS_HISTORICAL_DIVIDEND_DATA_ENDPOINT",
            ),
        }
    }
}

impl Default for AppEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Loads `config/<env>.toml`. The directory can be moved with `CONFIG_DIR`.
    pub fn new(env: &Env) -> AppConfig {
        let dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        let path = format!("{}/{}.toml", dir, env);
        let raw = std::fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("CONFIG -> failed to read {}: {}", path, err));

        toml::from_str(&raw).unwrap_or_else(|err| panic!("CONFIG -> invalid {}: {}", path, err))
    }
}

fn get_env_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("ENV -> {} is not set", name))
}
