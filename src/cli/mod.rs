//! Command line interface.

pub mod command;

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::{
    BoundingBox, Cadence, FetchConfig, FetchOptions, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get hourly surface diagnostics
    Hourly(FetchArgs),
    /// Get 3-hourly fields
    ThreeHourly(FetchArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Options shared by both cadences.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// First timestep in UTC, e.g. "2020-01-01 12:00:00"
    #[arg(long, value_parser = parse_start, default_value = "2020-01-01 12:00:00")]
    pub start: DateTime<Utc>,

    /// Number of days to download
    #[arg(long, default_value_t = 1)]
    pub days: u32,

    /// Comma-separated variables [default depends on the cadence]
    #[arg(long, value_delimiter = ',')]
    pub vars: Option<Vec<String>>,

    /// Northern edge, degrees north
    #[arg(long, default_value_t = 53.0, allow_negative_numbers = true)]
    pub north: f64,

    /// Southern edge, degrees north
    #[arg(long, default_value_t = 39.0, allow_negative_numbers = true)]
    pub south: f64,

    /// Western edge, degrees east (-180 to 360)
    #[arg(long, default_value_t = -131.0, allow_negative_numbers = true)]
    pub west: f64,

    /// Eastern edge, degrees east (-180 to 360)
    #[arg(long, default_value_t = -121.0, allow_negative_numbers = true)]
    pub east: f64,

    /// HYCOM grid code
    #[arg(long, default_value = "GLBy0.08")]
    pub grid: String,

    /// HYCOM experiment code
    #[arg(long, default_value = "93.0")]
    pub expt: String,

    /// Where files and log.txt are written [default: ~/hycom/1hr or ~/hycom/3hr]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Delete and download again any file that already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Attempts per timestep before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Pause between attempts, in seconds
    #[arg(long, default_value_t = 0)]
    pub retry_delay_secs: u64,

    /// Request timeout, in seconds [default: none]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Root of the subset service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

impl FetchArgs {
    /// Fills cadence defaults and validates.
    pub fn to_config(&self, cadence: Cadence) -> Result<FetchConfig> {
        let variables = match &self.vars {
            Some(vars) => vars.clone(),
            None => cadence
                .default_variables()
                .iter()
                .map(|v| v.to_string())
                .collect(),
        };
        let output_dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir(cadence)?,
        };

        let options = FetchOptions {
            cadence,
            grid: self.grid.clone(),
            expt: self.expt.clone(),
            variables,
            bbox: BoundingBox::new(self.north, self.south, self.west, self.east)?,
            output_dir,
            start: self.start,
            days: self.days,
            overwrite: self.overwrite,
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            timeout: self.timeout_secs.map(Duration::from_secs),
            base_url: self.base_url.clone(),
        };

        Ok(FetchConfig::new(options)?)
    }
}

fn default_output_dir(cadence: Cadence) -> Result<PathBuf> {
    let home = dirs::home_dir().context("No home directory; pass --output-dir")?;

    Ok(home.join("hycom").join(cadence.label()))
}

/// Parses a UTC start instant written as `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`.
fn parse_start(s: &str) -> Result<DateTime<Utc>, String> {
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s.trim(), format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("`{}` is not a date like 2020-01-01 12:00:00", s))
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}

/// Log output that hides `bar` while each line is written, so events don't tear it.
pub struct BarWriter<M> {
    bar: ProgressBar,
    inner: M,
}

impl<M> BarWriter<M> {
    pub fn new(bar: ProgressBar, inner: M) -> Self {
        BarWriter { bar, inner }
    }
}

pub struct SuspendedWriter<'a, W> {
    bar: &'a ProgressBar,
    inner: W,
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for BarWriter<M> {
    type Writer = SuspendedWriter<'a, M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedWriter {
            bar: &self.bar,
            inner: self.inner.make_writer(),
        }
    }
}

impl<W: Write> Write for SuspendedWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.flush())
    }
}

// -- Tests -------------------------------------------------------------------
