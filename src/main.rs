use eod_pipeline::config::Config;
use eod_pipeline::pipeline::{self, PipelineOutcome};
use eod_pipeline::{logging, Result};

fn main() -> Result<()> {
    let config = Config::builtin();
    logging::init(&config.log_dir)?;

    match pipeline::run(&config)? {
        PipelineOutcome::Completed { .. } => {
            println!("Pipeline completed successfully! 🚀");
        }
        PipelineOutcome::NoData => {
            println!("No data fetched. Please check the logs for more information.");
        }
    }

    Ok(())
}
