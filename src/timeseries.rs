//! Generates the timesteps requested during a run.

use chrono::{DateTime, TimeDelta, Timelike, Utc};

use crate::config::Cadence;

/// Number of timesteps in a run of `days` days.
///
/// A run starting at 12Z that covers a year or more is half a day shorter: the upstream
/// archive only holds a partial record for the final day in that case.
pub fn step_count(start: DateTime<Utc>, days: u32, cadence: Cadence) -> usize {
    let per_day = cadence.steps_per_day();
    let full = days as usize * per_day;

    if start.hour() == 12 && days >= 365 {
        full - per_day / 2
    } else {
        full
    }
}

/// Ordered timesteps from `start`, spaced by the cadence interval.
pub fn time_steps(start: DateTime<Utc>, days: u32, cadence: Cadence) -> Vec<DateTime<Utc>> {
    let step_hours = cadence.step_hours();

    (0..step_count(start, days, cadence))
        .map(|i| start + TimeDelta::hours(step_hours * i as i64))
        .collect()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn should_generate_one_hourly_day() {
        let start = at(2020, 1, 1, 0);
        let steps = time_steps(start, 1, Cadence::Hourly);

        assert_eq!(steps.len(), 24);
        assert_eq!(steps[0], start);
        assert_eq!(steps[23], start + TimeDelta::hours(23));
    }

    #[test]
    fn should_space_steps_evenly() {
        let start = at(2019, 12, 31, 21);
        let steps = time_steps(start, 3, Cadence::ThreeHourly);

        assert_eq!(steps.len(), 24);
        for pair in steps.windows(2) {
            assert_eq!(pair[1] - pair[0], TimeDelta::hours(3));
        }
        assert_eq!(steps[1], at(2020, 1, 1, 0));
    }

    #[test]
    fn should_shorten_year_starting_at_noon() {
        let start = at(2020, 1, 1, 12);

        assert_eq!(step_count(start, 365, Cadence::ThreeHourly), 2916);
        assert_eq!(step_count(start, 365, Cadence::Hourly), 365 * 24 - 12);
        assert_eq!(step_count(start, 400, Cadence::ThreeHourly), 400 * 8 - 4);
    }

    #[test]
    fn should_not_shorten_otherwise() {
        assert_eq!(step_count(at(2020, 1, 1, 12), 364, Cadence::ThreeHourly), 364 * 8);
        assert_eq!(step_count(at(2020, 1, 1, 9), 365, Cadence::ThreeHourly), 365 * 8);
        assert_eq!(step_count(at(2020, 1, 1, 0), 365, Cadence::Hourly), 365 * 24);
    }

    #[test]
    fn should_reach_the_end_of_a_century_run() {
        let start = at(2000, 1, 1, 0);
        let days = crate::config::MAX_DAYS;
        let steps = time_steps(start, days, Cadence::Hourly);

        assert_eq!(steps.len(), days as usize * 24);
        assert_eq!(
            *steps.last().unwrap(),
            start + TimeDelta::days(days as i64) - TimeDelta::hours(1)
        );
    }

    #[test]
    fn should_end_half_a_day_early_for_noon_year() {
        let start = at(2020, 1, 1, 12);
        let steps = time_steps(start, 365, Cadence::ThreeHourly);

        assert_eq!(steps.len(), 2916);
        assert_eq!(*steps.last().unwrap(), at(2020, 12, 30, 21));
        assert!(steps.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
