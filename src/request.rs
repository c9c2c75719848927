//! Request URLs and output paths for a single timestep.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::FetchConfig;

/// Extension of the NetCDF4 files returned with `accept=netcdf4`.
pub const NETCDF_EXTENSION: &str = "nc";

/// Time as the subset service expects it, e.g. `2020-01-01-T12:00:00Z`.
pub fn time_param(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d-T%H:00:00Z").to_string()
}

/// `YYYYMMDD_HH` name used for output files and log lines.
pub fn time_stamp(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d_%H").to_string()
}

pub fn output_path(output_dir: &Path, time: DateTime<Utc>) -> PathBuf {
    output_dir.join(format!("{}.{}", time_stamp(time), NETCDF_EXTENSION))
}

/// Builds the subset request for one timestep.
pub fn build_url(config: &FetchConfig, time: DateTime<Utc>) -> String {
    let mut url = format!(
        "{}/{}/expt_{}",
        config.base_url.trim_end_matches('/'),
        config.grid,
        config.expt
    );
    if config.is_legacy_expt() {
        url.push_str(&format!("/data/{}", time.format("%Y")));
    }
    url.push_str(config.cadence.dataset_suffix());

    let t = time_param(time);
    let bbox = &config.bbox;
    url.push_str(&format!(
        "?var={}&north={}&south={}&west={}&east={}\
         &disableProjSubset=on&horizStride=1\
         &time_start={}&time_end={}&timeStride=8\
         &vertCoord=&addLatLon=true&accept=netcdf4",
        config.variable_list(),
        bbox.north,
        bbox.south,
        bbox.west_360(),
        bbox.east_360(),
        t,
        t
    ));

    url
}

// -- Tests -------------------------------------------------------------------
