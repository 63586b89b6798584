use chrono::{Duration, Local, NaiveDate};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::ApiConfig;

use super::RawTable;

/// Fetches the trailing end-of-day window for the configured symbol.
pub struct QuoteFetcher {
    config: ApiConfig,
    client: Client,
}

impl QuoteFetcher {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Issue the quote request. Every failure mode collapses to an empty
    /// table after an error log; callers treat emptiness as the no-data
    /// signal rather than an error.
    pub fn fetch_quotes(&self) -> RawTable {
        let today = Local::now().date_naive();
        let (date_from, date_to) = request_window(today, self.config.lookback_days);

        let params = [
            ("access_key", self.config.access_key.clone()),
            ("symbols", self.config.symbol.clone()),
            ("date_from", date_from.format("%Y-%m-%d").to_string()),
            ("date_to", date_to.format("%Y-%m-%d").to_string()),
        ];

        let response = match self.client.get(&self.config.base_url).query(&params).send() {
            Ok(response) => response,
            Err(err) => {
                log::error!("Quote request failed: {}", err);
                return RawTable::empty();
            }
        };

        if !response.status().is_success() {
            log::error!("Failed to fetch data: {}", response.status());
            return RawTable::empty();
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                log::error!("Failed to read quote response body: {}", err);
                return RawTable::empty();
            }
        };

        match decode_response(&body) {
            Ok(Some(table)) => {
                log::info!("Data fetched successfully for {}", self.config.symbol);
                table
            }
            Ok(None) => {
                log::error!("No data in response");
                RawTable::empty()
            }
            Err(err) => {
                log::error!("Failed to decode quote response: {}", err);
                RawTable::empty()
            }
        }
    }
}

/// `None` means the body parsed but carried no `data` array.
fn decode_response(body: &str) -> serde_json::Result<Option<RawTable>> {
    let root: Value = serde_json::from_str(body)?;

    Ok(root
        .get("data")
        .and_then(Value::as_array)
        .map(|rows| RawTable::from_json_rows(rows)))
}

fn request_window(today: NaiveDate, lookback_days: i64) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(lookback_days), today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_spans_lookback_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        let (from, to) = request_window(today, 3);

        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(to, today);
    }

    #[test]
    fn decodes_data_array() {
        let body = r#"{"data": [{"date": "2024-03-05T00:00:00+0000", "open": 10.5}]}"#;

        let table = decode_response(body).unwrap().expect("data array present");

        assert_eq!(table.len(), 1);
        assert_eq!(table.columns(), &["date", "open"]);
    }

    #[test]
    fn missing_data_key_is_none() {
        assert!(decode_response("{}").unwrap().is_none());
        assert!(decode_response(r#"{"error": "rate limit"}"#).unwrap().is_none());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(decode_response("not json").is_err());
    }
}
