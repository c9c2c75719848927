//! Run configuration.
//!
//! Everything a run needs is collected into a [`FetchConfig`] once, validated, and then passed
//! by reference to the time-series generator and the download loop. Nothing is changed after
//! construction.

use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use thiserror::Error;

/// Experiment code whose files live under a per-year `data/<YYYY>` path on the server.
pub const LEGACY_EXPT: &str = "53.X";

/// Root of the HYCOM NetCDF subset service.
pub const DEFAULT_BASE_URL: &str = "http://ncss.hycom.org/thredds/ncss/";

/// Default number of attempts per timestep.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Longest run accepted, in days (a century of output).
pub const MAX_DAYS: u32 = 36_525;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("day count must be at least 1")]
    ZeroDays,
    #[error("day count {0} exceeds the limit of {}", MAX_DAYS)]
    TooManyDays(u32),
    #[error("run starting at {0} ends past the last representable date")]
    EndOutOfRange(DateTime<Utc>),
    #[error("at least one attempt per timestep is required")]
    ZeroAttempts,
    #[error("variable list is empty")]
    NoVariables,
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),
    #[error("start hour {0:02} is not a 3-hourly output time (00, 03, 06, 09, 12, 15, 18 or 21)")]
    MisalignedStart(u32),
    #[error("start instant {0} is not on the hour")]
    PartialHour(DateTime<Utc>),
    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),
    #[error("north ({north}) must be greater than south ({south})")]
    LatitudeOrder { north: f64, south: f64 },
    #[error("longitude {0} is outside -180..=360")]
    Longitude(f64),
}

/// Spacing between consecutive timesteps, one per batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Hourly surface diagnostics.
    Hourly,
    /// 3-hourly 3D fields.
    ThreeHourly,
}

impl Cadence {
    pub fn step_hours(self) -> i64 {
        match self {
            Cadence::Hourly => 1,
            Cadence::ThreeHourly => 3,
        }
    }

    pub fn steps_per_day(self) -> usize {
        (24 / self.step_hours()) as usize
    }

    /// Dataset name appended to the request path.
    pub fn dataset_suffix(self) -> &'static str {
        match self {
            Cadence::Hourly => "/sur",
            Cadence::ThreeHourly => "",
        }
    }

    pub fn default_variables(self) -> &'static [&'static str] {
        match self {
            Cadence::Hourly => &[
                "emp",
                "mixed_layer_thickness",
                "qtot",
                "ssh",
                "steric_ssh",
                "surface_boundary_layer_thickness",
                "u_barotropic_velocity",
                "v_barotropic_velocity",
            ],
            Cadence::ThreeHourly => &["surf_el", "water_temp", "salinity", "water_u", "water_v"],
        }
    }

    /// Short label used for default output directories.
    pub fn label(self) -> &'static str {
        match self {
            Cadence::Hourly => "1hr",
            Cadence::ThreeHourly => "3hr",
        }
    }
}

/// Spatial subset in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, west: f64, east: f64) -> Result<Self, ConfigError> {
        for lat in [north, south] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ConfigError::Latitude(lat));
            }
        }
        if north <= south {
            return Err(ConfigError::LatitudeOrder { north, south });
        }
        for lon in [west, east] {
            if !(-180.0..=360.0).contains(&lon) {
                return Err(ConfigError::Longitude(lon));
            }
        }

        Ok(BoundingBox {
            north,
            south,
            west,
            east,
        })
    }

    /// West edge in degrees east, 0 to 360.
    pub fn west_360(&self) -> f64 {
        to_degrees_east(self.west)
    }

    /// East edge in degrees east, 0 to 360.
    pub fn east_360(&self) -> f64 {
        to_degrees_east(self.east)
    }
}

impl Default for BoundingBox {
    // LiveOcean boundary box
    fn default() -> Self {
        BoundingBox {
            north: 53.0,
            south: 39.0,
            west: -131.0,
            east: -121.0,
        }
    }
}

fn to_degrees_east(lon: f64) -> f64 {
    if lon < 0.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Unvalidated run settings, as collected from the command line.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub cadence: Cadence,
    pub grid: String,
    pub expt: String,
    pub variables: Vec<String>,
    pub bbox: BoundingBox,
    pub output_dir: PathBuf,
    pub start: DateTime<Utc>,
    pub days: u32,
    pub overwrite: bool,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Option<Duration>,
    pub base_url: String,
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub cadence: Cadence,
    pub grid: String,
    pub expt: String,
    pub variables: Vec<String>,
    pub bbox: BoundingBox,
    pub output_dir: PathBuf,
    pub start: DateTime<Utc>,
    pub days: u32,
    pub overwrite: bool,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Option<Duration>,
    pub base_url: String,
}

impl FetchConfig {
    pub fn new(options: FetchOptions) -> Result<Self, ConfigError> {
        if options.days == 0 {
            return Err(ConfigError::ZeroDays);
        }
        if options.days > MAX_DAYS {
            return Err(ConfigError::TooManyDays(options.days));
        }
        if options.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if options.grid.trim().is_empty() {
            return Err(ConfigError::EmptyIdentifier("grid"));
        }
        if options.expt.trim().is_empty() {
            return Err(ConfigError::EmptyIdentifier("experiment"));
        }
        if options.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyIdentifier("base url"));
        }

        let variables: Vec<String> = options
            .variables
            .iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if variables.is_empty() {
            return Err(ConfigError::NoVariables);
        }

        let start = options.start;
        if start.minute() != 0 || start.second() != 0 || start.nanosecond() != 0 {
            return Err(ConfigError::PartialHour(start));
        }
        if start.hour() as i64 % options.cadence.step_hours() != 0 {
            return Err(ConfigError::MisalignedStart(start.hour()));
        }
        if start
            .checked_add_signed(TimeDelta::days(options.days as i64))
            .is_none()
        {
            return Err(ConfigError::EndOutOfRange(start));
        }

        // Re-run the range checks in case the box was built by hand.
        let bbox = BoundingBox::new(
            options.bbox.north,
            options.bbox.south,
            options.bbox.west,
            options.bbox.east,
        )?;

        Ok(FetchConfig {
            cadence: options.cadence,
            grid: options.grid.trim().to_string(),
            expt: options.expt.trim().to_string(),
            variables,
            bbox,
            output_dir: options.output_dir,
            start,
            days: options.days,
            overwrite: options.overwrite,
            max_attempts: options.max_attempts,
            retry_delay: options.retry_delay,
            timeout: options.timeout,
            base_url: options.base_url,
        })
    }

    /// Whether the experiment uses the year-partitioned request path.
    pub fn is_legacy_expt(&self) -> bool {
        self.expt == LEGACY_EXPT
    }

    pub fn variable_list(&self) -> String {
        self.variables.join(",")
    }

    /// Label written at the top of the run log.
    pub fn dataset_label(&self) -> String {
        format!("{}/expt_{}", self.grid, self.expt)
    }
}

// -- Tests -------------------------------------------------------------------
