use crate::config::Config;
use crate::error::Result;
use crate::fetch::QuoteFetcher;
use crate::records::Outputs;
use crate::transform;

/// Result of a pipeline run that finished without a fatal error.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// All three artifacts were written.
    Completed { rows: usize },
    /// The fetch came back empty; nothing was written.
    NoData,
}

/// Run fetch -> transform -> persist once.
///
/// An empty fetch short-circuits to `NoData` before any file is touched.
/// Transform and persistence failures propagate as fatal errors.
pub fn run(config: &Config) -> Result<PipelineOutcome> {
    log::info!("Pipeline started...");

    log::info!("Fetching stock market data...");
    let fetcher = QuoteFetcher::new(config.api.clone());
    let raw = fetcher.fetch_quotes();

    if raw.is_empty() {
        log::warn!("No data fetched, skipping transformation.");
        return Ok(PipelineOutcome::NoData);
    }

    let outputs = Outputs::new(&config.data_dir);
    outputs.prepare()?;

    // Raw persistence happens before any normalization.
    let raw_path = outputs.write_raw_csv(&raw)?;
    log::info!("Raw market data saved to {}", raw_path.display());
    println!("Raw data saved to {}", raw_path.display());

    log::info!("Transforming stock market data...");
    let records = transform::normalize(&raw)?;

    let canonical_path = outputs.write_canonical_csv(&records)?;
    log::info!("Transformed data saved to {}", canonical_path.display());
    println!("Transformed data saved to {}", canonical_path.display());

    let workbook_path = outputs.write_workbook(&records)?;
    log::info!("Transformed data saved to Excel: {}", workbook_path.display());
    println!("Data saved to {}", workbook_path.display());

    Ok(PipelineOutcome::Completed {
        rows: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn empty_fetch_short_circuits_without_writes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api: ApiConfig {
                // Nothing listens here; the fetch fails fast and comes back empty.
                base_url: "http://127.0.0.1:9".to_string(),
                access_key: "test".to_string(),
                symbol: "TEST".to_string(),
                lookback_days: 3,
            },
            data_dir: dir.path().join("data"),
            log_dir: dir.path().join("logs"),
        };

        let outcome = run(&config).unwrap();

        assert!(matches!(outcome, PipelineOutcome::NoData));
        assert!(!config.data_dir.exists());
    }
}
