use std::path::PathBuf;

const EOD_ENDPOINT: &str = "http://api.marketstack.com/v1/eod";
const DEFAULT_SYMBOL: &str = "JBSS3.BVMF";
const DEFAULT_ACCESS_KEY: &str = "461179b825c645877648bd3fd25d9a7f";
const LOOKBACK_DAYS: i64 = 3;

/// Environment variable that overrides the built-in Marketstack access key.
pub const ACCESS_KEY_ENV: &str = "MARKETSTACK_ACCESS_KEY";

/// Connection settings handed to the fetcher at construction.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub access_key: String,
    pub symbol: String,
    pub lookback_days: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn builtin() -> Self {
        let access_key = std::env::var(ACCESS_KEY_ENV)
            .unwrap_or_else(|_| DEFAULT_ACCESS_KEY.to_string());

        Self {
            api: ApiConfig {
                base_url: EOD_ENDPOINT.to_string(),
                access_key,
                symbol: DEFAULT_SYMBOL.to_string(),
                lookback_days: LOOKBACK_DAYS,
            },
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
        }
    }
}
