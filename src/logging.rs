use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;
use env_logger::Target;
use log::LevelFilter;

use crate::error::{AppError, Context, Result};

pub const LOG_FILE: &str = "pipeline.log";

/// Route `log` output to an append-mode file under `log_dir`, one
/// "timestamp - LEVEL - message" line per entry. The file accumulates
/// across runs; each run only appends.
pub fn init(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let path = log_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|err| AppError::message(format!("Failed to install logger: {}", err)))?;

    Ok(())
}
