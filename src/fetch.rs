//! The download loop: one file per timestep, fetched in order with a bounded number of
//! attempts each.

use std::{
    fmt,
    fs,
    io::Write,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use tracing::{debug, error, info, warn};

use crate::{
    config::FetchConfig,
    download::{AttemptError, Fetch},
    request::{build_url, output_path, time_stamp},
    run_log::RunLog,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Fail => write!(f, "fail"),
        }
    }
}

/// Result of fetching one timestep.
#[derive(Debug)]
pub struct DownloadAttempt {
    pub path: PathBuf,
    pub time: DateTime<Utc>,
    pub outcome: Outcome,
    pub attempts: u32,
    pub elapsed: Duration,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Fetches every timestep in `steps`, in order.
///
/// Existing files are skipped unless the config asks for overwrite, in which case they are
/// removed before the first attempt. Each fetched timestep adds one line to `log`. Only
/// filesystem errors on the output directory or the log end the run early.
pub async fn run<F: Fetch, W: Write>(
    config: &FetchConfig,
    fetcher: &F,
    steps: &[DateTime<Utc>],
    log: &mut RunLog<W>,
    progress: &ProgressBar,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for &time in steps {
        let path = output_path(&config.output_dir, time);
        progress.set_message(time_stamp(time));

        if path.is_file() {
            if config.overwrite {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove `{}`", path.display()))?;
                debug!(path = %path.display(), "Removed existing file");
            } else {
                debug!(path = %path.display(), "File already exists, skipping");
                summary.skipped += 1;
                progress.inc(1);
                continue;
            }
        }

        let attempt = fetch_step(config, fetcher, time, path).await;
        log.record(&attempt)?;
        info!(
            time = %time_stamp(time),
            outcome = %attempt.outcome,
            attempts = attempt.attempts,
            elapsed_secs = attempt.elapsed.as_secs_f64(),
            path = %attempt.path.display(),
            "Timestep finished"
        );

        match attempt.outcome {
            Outcome::Success => summary.succeeded += 1,
            Outcome::Fail => summary.failed += 1,
        }
        progress.inc(1);
    }

    Ok(summary)
}

/// Tries one timestep up to `max_attempts` times, stopping at the first success.
pub async fn fetch_step<F: Fetch>(
    config: &FetchConfig,
    fetcher: &F,
    time: DateTime<Utc>,
    path: PathBuf,
) -> DownloadAttempt {
    let url = build_url(config, time);
    let started = Instant::now();
    let mut attempts = 0;
    let mut outcome = Outcome::Fail;

    debug!(time = %time_stamp(time), path = %path.display(), "Fetching");
    debug!(url = %url, "Request url");

    while attempts < config.max_attempts {
        if attempts > 0 && !config.retry_delay.is_zero() {
            tokio::time::sleep(config.retry_delay).await;
        }
        attempts += 1;

        debug!(attempt = attempts, "Attempting to get data");
        let attempt_started = Instant::now();
        let result = fetcher.fetch(&url, &path).await;
        let secs = attempt_started.elapsed().as_secs_f64();

        match result {
            Ok(bytes) => {
                info!(attempt = attempts, bytes, elapsed_secs = secs, "Downloaded data");
                outcome = Outcome::Success;
                break;
            }
            Err(e) => log_failure(&e, attempts, config.max_attempts, secs),
        }
    }

    if outcome == Outcome::Fail {
        error!(time = %time_stamp(time), attempts, "Giving up on timestep");
    }

    DownloadAttempt {
        path,
        time,
        outcome,
        attempts,
        elapsed: started.elapsed(),
    }
}

fn log_failure(e: &AttemptError, attempt: u32, max_attempts: u32, secs: f64) {
    match e {
        AttemptError::Rejected(status) => warn!(
            kind = e.kind(),
            status = status.as_u16(),
            attempt,
            max_attempts,
            elapsed_secs = secs,
            "Server could not fulfill the request"
        ),
        _ => warn!(
            kind = e.kind(),
            error = %e,
            attempt,
            max_attempts,
            elapsed_secs = secs,
            "Attempt failed"
        ),
    }
}

// -- Tests -------------------------------------------------------------------
