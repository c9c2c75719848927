//! Hourly surface diagnostics (`sur` dataset).

use anyhow::Result;
use indicatif::ProgressBar;

use crate::{cli::FetchArgs, config::Cadence};

use super::{execute, Report};

pub async fn hourly(args: &FetchArgs, progress: &ProgressBar) -> Result<Report> {
    let config = args.to_config(Cadence::Hourly)?;

    execute(&config, progress).await
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        cli::command::test::{dead_base_url, parse_args},
        config::ConfigError,
        run_log::LOG_FILE_NAME,
    };
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn should_reject_zero_days_before_touching_disk() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("1hr");
        let args = parse_args(&[
            "hycom-fetch",
            "hourly",
            "--days",
            "0",
            "--output-dir",
            output_dir.to_str().unwrap(),
        ]);

        let err = hourly(&args, &ProgressBar::hidden()).await.unwrap_err();

        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::ZeroDays));
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn should_log_every_failed_hour() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("1hr");
        let base_url = dead_base_url();
        let args = parse_args(&[
            "hycom-fetch",
            "hourly",
            "--start",
            "2020-01-01 00:00:00",
            "--max-attempts",
            "1",
            "--timeout-secs",
            "5",
            "--base-url",
            &base_url,
            "--output-dir",
            output_dir.to_str().unwrap(),
        ]);

        let report = hourly(&args, &ProgressBar::hidden()).await.unwrap();

        assert_eq!(report.summary.failed, 24);
        assert_eq!(report.summary.succeeded, 0);

        let log = fs::read_to_string(output_dir.join(LOG_FILE_NAME)).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 25);
        assert_eq!(lines[0], "** Working on GLBy0.08/expt_93.0 **");
        assert_eq!(lines[1], " 20200101_00 fail");
        assert_eq!(lines[24], " 20200101_23 fail");

        // only the log is left behind
        assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 1);
    }
}
