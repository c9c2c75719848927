pub mod hourly;
pub mod three_hourly;

use std::{fs, time::Instant};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::info;

pub use hourly::hourly;
pub use three_hourly::three_hourly;

use crate::{
    config::FetchConfig,
    download::HttpFetcher,
    fetch::{self, RunSummary},
    run_log::RunLog,
    timeseries::time_steps,
};

/// Summary of a finished run, for the final message.
#[derive(Debug)]
pub struct Report {
    pub summary: RunSummary,
    pub minutes: f64,
}

/// Runs one cadence job: output directory, log, timesteps, then the download loop.
async fn execute(config: &FetchConfig, progress: &ProgressBar) -> Result<Report> {
    let started = Instant::now();
    let steps = time_steps(config.start, config.days, config.cadence);

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory `{}`",
            config.output_dir.display()
        )
    })?;
    let mut log = RunLog::create(&config.output_dir)?;

    let label = config.dataset_label();
    log.header(&label)?;
    progress.suspend(|| println!("** Working on {} **", label));
    info!(
        dataset = %label,
        steps = steps.len(),
        output_dir = %config.output_dir.display(),
        "Starting run"
    );

    let fetcher = HttpFetcher::new(config.timeout)?;
    progress.set_length(steps.len() as u64);
    let summary = fetch::run(config, &fetcher, &steps, &mut log, progress).await?;
    progress.finish_with_message("Downloads complete");

    Ok(Report {
        summary,
        minutes: started.elapsed().as_secs_f64() / 60.0,
    })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use std::net::TcpListener;

    use crate::cli::{Cli, Commands, FetchArgs};
    use clap::Parser;

    /// Binds and drops a listener so nothing answers on the port.
    pub(crate) fn dead_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://127.0.0.1:{}/thredds/ncss/", listener.local_addr().unwrap().port())
    }

    pub(crate) fn parse_args(args: &[&str]) -> FetchArgs {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Hourly(args) | Commands::ThreeHourly(args) => args,
        }
    }
}
