//! 3-hourly fields from the experiment root dataset.

use anyhow::Result;
use indicatif::ProgressBar;

use crate::{cli::FetchArgs, config::Cadence};

use super::{execute, Report};

pub async fn three_hourly(args: &FetchArgs, progress: &ProgressBar) -> Result<Report> {
    let config = args.to_config(Cadence::ThreeHourly)?;

    execute(&config, progress).await
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        cli::command::test::{dead_base_url, parse_args},
        config::ConfigError,
        request::output_path,
    };
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn should_reject_off_cycle_start() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("3hr");
        let args = parse_args(&[
            "hycom-fetch",
            "three-hourly",
            "--start",
            "2020-01-01 04:00:00",
            "--output-dir",
            output_dir.to_str().unwrap(),
        ]);

        let err = three_hourly(&args, &ProgressBar::hidden()).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MisalignedStart(4))
        );
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn should_skip_files_already_present() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("3hr");
        fs::create_dir_all(&output_dir).unwrap();
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
        for step in 0..8 {
            let time = start + chrono::TimeDelta::hours(3 * step);
            fs::write(output_path(&output_dir, time), b"CDF").unwrap();
        }
        let base_url = dead_base_url();
        let args = parse_args(&[
            "hycom-fetch",
            "three-hourly",
            "--base-url",
            &base_url,
            "--output-dir",
            output_dir.to_str().unwrap(),
        ]);

        let report = three_hourly(&args, &ProgressBar::hidden()).await.unwrap();

        assert_eq!(report.summary.skipped, 8);
        assert_eq!(report.summary.failed, 0);
        assert_eq!(
            fs::read_to_string(output_dir.join("log.txt")).unwrap(),
            "** Working on GLBy0.08/expt_93.0 **\n"
        );
    }
}
