//! Daily alignment of sub-daily weather series.
//!
//! The recurrence consumes one record per cell per calendar day: the
//! instantaneous temperature, humidity and wind at the day's reference
//! instant, and the trailing 24-hour precipitation sum ending there. This
//! module extracts those records from arbitrarily sampled input series and
//! applies the all-or-nothing mask: a cell-day missing any one of the four
//! variables is missing all four.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FwiError;
use crate::series::TimeSeries;

/// One aligned cell-day of weather, after masking.
///
/// Either all four fields are finite or all four are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyWeatherRecord {
    /// Air temperature at the reference instant (°C).
    pub temperature: f64,
    /// Relative humidity at the reference instant (0-100).
    pub rel_hum: f64,
    /// Wind speed at the reference instant (km/h).
    pub wind_speed: f64,
    /// Precipitation over the trailing 24 hours (mm).
    pub precip: f64,
}

/// Aligned daily weather for a run: four day-major planes over a shared
/// date axis.
#[derive(Debug, Clone)]
pub struct AlignedWeather {
    dates: Vec<NaiveDate>,
    cells: usize,
    temperature: Vec<f64>,
    rel_hum: Vec<f64>,
    wind_speed: Vec<f64>,
    precip: Vec<f64>,
}

impl AlignedWeather {
    /// Number of aligned days.
    pub fn days(&self) -> usize {
        self.dates.len()
    }

    /// Number of cells per day.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// True if the requested range clipped to nothing.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The aligned date axis.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// The aligned record for a day/cell pair.
    ///
    /// # Panics
    /// Panics if `day` or `cell` is out of bounds.
    pub fn record(&self, day: usize, cell: usize) -> DailyWeatherRecord {
        assert!(
            day < self.dates.len() && cell < self.cells,
            "day/cell out of bounds"
        );
        let i = day * self.cells + cell;
        DailyWeatherRecord {
            temperature: self.temperature[i],
            rel_hum: self.rel_hum[i],
            wind_speed: self.wind_speed[i],
            precip: self.precip[i],
        }
    }

    /// True if the cell has at least one unmasked day in the range.
    pub(crate) fn cell_has_data(&self, cell: usize) -> bool {
        (0..self.dates.len()).any(|day| !self.temperature[day * self.cells + cell].is_nan())
    }

    /// Convert the wind plane in place, e.g. m/s to km/h.
    pub(crate) fn scale_wind(&mut self, factor: f64) {
        for w in &mut self.wind_speed {
            *w *= factor;
        }
    }

    fn empty(cells: usize) -> Self {
        Self {
            dates: Vec::new(),
            cells,
            temperature: Vec::new(),
            rel_hum: Vec::new(),
            wind_speed: Vec::new(),
            precip: Vec::new(),
        }
    }
}

/// First calendar day whose midnight reference instant is at or after
/// `instant`.
fn first_day_on_or_after(instant: NaiveDateTime) -> NaiveDate {
    let date = instant.date();
    if instant.time() == NaiveTime::MIN {
        date
    } else {
        date.succ_opt().unwrap_or(NaiveDate::MAX)
    }
}

/// Align four sub-daily series into one weather record per day.
///
/// Days run from one day after the first precipitation sample (never
/// earlier, even if `start_date` asks for it) to the last precipitation
/// sample (never later). Temperature, humidity and wind take the sample
/// exactly at each day's midnight reference instant, with no interpolation;
/// humidity is capped at 100. Precipitation is the NaN-skipping sum over
/// the trailing 24-hour window; a window with no finite sample is missing.
///
/// An empty precipitation series or a range that clips to nothing yields an
/// empty container, not an error.
///
/// # Errors
/// Returns [`FwiError::ShapeMismatch`] if the four series disagree on cell
/// count.
pub fn align_daily(
    temperature: &TimeSeries,
    rel_hum: &TimeSeries,
    wind_speed: &TimeSeries,
    precip: &TimeSeries,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<AlignedWeather, FwiError> {
    let cells = precip.cells();
    for (series, what) in [
        (temperature, "temperature cell count"),
        (rel_hum, "relative humidity cell count"),
        (wind_speed, "wind speed cell count"),
    ] {
        if series.cells() != cells {
            return Err(FwiError::ShapeMismatch {
                what,
                expected: cells,
                actual: series.cells(),
            });
        }
    }

    let Some(&first_instant) = precip.times().first() else {
        return Ok(AlignedWeather::empty(cells));
    };
    let last_instant = *precip.times().last().unwrap_or(&first_instant);

    // The first full trailing window ends one day after the first sample;
    // earlier requests are clipped to it, never honored.
    let mut start = first_day_on_or_after(first_instant + Duration::days(1));
    let mut end = last_instant.date();
    if let Some(requested) = start_date {
        if requested > start {
            start = requested;
        }
    }
    if let Some(requested) = end_date {
        if requested < end {
            end = requested;
        }
    }
    if start > end {
        return Ok(AlignedWeather::empty(cells));
    }

    let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
    let days = dates.len();
    let mut aligned = AlignedWeather {
        dates,
        cells,
        temperature: vec![f64::NAN; days * cells],
        rel_hum: vec![f64::NAN; days * cells],
        wind_speed: vec![f64::NAN; days * cells],
        precip: vec![f64::NAN; days * cells],
    };

    for day in 0..days {
        let reference = aligned.dates[day].and_time(NaiveTime::MIN);
        let row = day * cells;

        // Instantaneous variables: exact match at the reference instant.
        for (series, plane) in [
            (temperature, &mut aligned.temperature),
            (rel_hum, &mut aligned.rel_hum),
            (wind_speed, &mut aligned.wind_speed),
        ] {
            if let Some(t) = series.exact_index(reference) {
                plane[row..row + cells].copy_from_slice(series.row(t));
            }
        }

        // Trailing 24-hour precipitation sum, skipping missing samples; a
        // window with nothing finite stays missing.
        let window = precip.index_range(reference - Duration::hours(24), reference);
        for cell in 0..cells {
            let mut sum = 0.0;
            let mut seen = false;
            for t in window.clone() {
                let value = precip.row(t)[cell];
                if !value.is_nan() {
                    sum += value;
                    seen = true;
                }
            }
            if seen {
                aligned.precip[row + cell] = sum;
            }
        }
    }

    // Cap humidity at saturation; comparison form keeps NaN missing.
    for rh in &mut aligned.rel_hum {
        if *rh > 100.0 {
            *rh = 100.0;
        }
    }

    // All-or-nothing mask: one missing variable hides the whole cell-day.
    let mut masked = 0usize;
    for i in 0..days * cells {
        if aligned.temperature[i].is_nan()
            || aligned.rel_hum[i].is_nan()
            || aligned.wind_speed[i].is_nan()
            || aligned.precip[i].is_nan()
        {
            if !aligned.temperature[i].is_nan()
                || !aligned.rel_hum[i].is_nan()
                || !aligned.wind_speed[i].is_nan()
                || !aligned.precip[i].is_nan()
            {
                masked += 1;
            }
            aligned.temperature[i] = f64::NAN;
            aligned.rel_hum[i] = f64::NAN;
            aligned.wind_speed[i] = f64::NAN;
            aligned.precip[i] = f64::NAN;
        }
    }
    debug!(
        days,
        cells, masked, "aligned daily weather records"
    );

    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    fn hourly_times(days: i64) -> Vec<NaiveDateTime> {
        let base = date(1).and_time(NaiveTime::MIN);
        (0..days * 24)
            .map(|h| base + Duration::hours(h))
            .collect()
    }

    fn constant_series(times: &[NaiveDateTime], cells: usize, value: f64) -> TimeSeries {
        TimeSeries::new(times.to_vec(), cells, vec![value; times.len() * cells]).unwrap()
    }

    fn align_constant(
        cells: usize,
        temperature: f64,
        rel_hum: f64,
        wind: f64,
        hourly_precip: f64,
    ) -> AlignedWeather {
        let times = hourly_times(4);
        align_daily(
            &constant_series(&times, cells, temperature),
            &constant_series(&times, cells, rel_hum),
            &constant_series(&times, cells, wind),
            &constant_series(&times, cells, hourly_precip),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_default_range_skips_first_partial_window() {
        // Hourly samples over Jan 1-4: the first full trailing window ends
        // Jan 2, and the last sample (Jan 4 23:00) caps the range at Jan 4.
        let aligned = align_constant(1, 20.0, 50.0, 10.0, 0.5);
        assert_eq!(aligned.dates(), &[date(2), date(3), date(4)]);
    }

    #[test]
    fn test_trailing_precip_sum() {
        // 0.5 mm every hour: each trailing window holds 24 samples.
        let aligned = align_constant(2, 20.0, 50.0, 10.0, 0.5);
        for day in 0..aligned.days() {
            for cell in 0..2 {
                assert_relative_eq!(aligned.record(day, cell).precip, 12.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_requested_start_before_data_is_clipped() {
        let times = hourly_times(4);
        let aligned = align_daily(
            &constant_series(&times, 1, 20.0),
            &constant_series(&times, 1, 50.0),
            &constant_series(&times, 1, 10.0),
            &constant_series(&times, 1, 0.5),
            Some(NaiveDate::from_ymd_opt(2020, 12, 1).unwrap()),
            None,
        )
        .unwrap();
        assert_eq!(aligned.dates()[0], date(2));
    }

    #[test]
    fn test_requested_subrange_is_honored() {
        let times = hourly_times(6);
        let aligned = align_daily(
            &constant_series(&times, 1, 20.0),
            &constant_series(&times, 1, 50.0),
            &constant_series(&times, 1, 10.0),
            &constant_series(&times, 1, 0.5),
            Some(date(3)),
            Some(date(4)),
        )
        .unwrap();
        assert_eq!(aligned.dates(), &[date(3), date(4)]);
    }

    #[test]
    fn test_humidity_capped_at_saturation() {
        let aligned = align_constant(1, 20.0, 104.0, 10.0, 0.5);
        assert_eq!(aligned.record(0, 0).rel_hum, 100.0);
    }

    #[test]
    fn test_missing_reference_sample_masks_day() {
        // Temperature sampled 30 minutes off the hour never hits midnight:
        // every day lacks its reference instant and is masked.
        let times = hourly_times(4);
        let offset_times: Vec<NaiveDateTime> = times
            .iter()
            .map(|t| *t + Duration::minutes(30))
            .collect();
        let aligned = align_daily(
            &constant_series(&offset_times, 1, 20.0),
            &constant_series(&times, 1, 50.0),
            &constant_series(&times, 1, 10.0),
            &constant_series(&times, 1, 0.5),
            None,
            None,
        )
        .unwrap();
        for day in 0..aligned.days() {
            let record = aligned.record(day, 0);
            assert!(record.temperature.is_nan());
            assert!(record.rel_hum.is_nan());
            assert!(record.wind_speed.is_nan());
            assert!(record.precip.is_nan());
        }
    }

    #[test]
    fn test_all_nan_precip_window_masks_cell_day() {
        // Cell 1 has no finite precipitation in the Jan 3 window; the other
        // three variables are present but must be masked with it.
        let times = hourly_times(4);
        let mut precip_values = vec![0.5; times.len() * 2];
        for (t, instant) in times.iter().enumerate() {
            if instant.date() == date(2) {
                precip_values[t * 2 + 1] = f64::NAN;
            }
        }
        let precip = TimeSeries::new(times.clone(), 2, precip_values).unwrap();
        let aligned = align_daily(
            &constant_series(&times, 2, 20.0),
            &constant_series(&times, 2, 50.0),
            &constant_series(&times, 2, 10.0),
            &precip,
            None,
            None,
        )
        .unwrap();

        let day3 = aligned
            .dates()
            .iter()
            .position(|d| *d == date(3))
            .unwrap();
        let gap = aligned.record(day3, 1);
        assert!(gap.temperature.is_nan() && gap.rel_hum.is_nan());
        assert!(gap.wind_speed.is_nan() && gap.precip.is_nan());

        // Cell 0 and the other days are untouched.
        let ok = aligned.record(day3, 0);
        assert_eq!(ok.temperature, 20.0);
        assert_relative_eq!(ok.precip, 12.0, epsilon = 1e-12);
        assert!(!aligned.record(0, 1).precip.is_nan());
    }

    #[test]
    fn test_partial_nan_window_sums_remaining_samples() {
        // A window with some missing hourly samples still sums the rest.
        let times = hourly_times(2);
        let mut values = vec![0.5; times.len()];
        values[6] = f64::NAN;
        let precip = TimeSeries::new(times.clone(), 1, values).unwrap();
        let aligned = align_daily(
            &constant_series(&times, 1, 20.0),
            &constant_series(&times, 1, 50.0),
            &constant_series(&times, 1, 10.0),
            &precip,
            None,
            None,
        )
        .unwrap();
        assert_relative_eq!(aligned.record(0, 0).precip, 11.5, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_inputs_align_to_empty() {
        let empty = TimeSeries::new(Vec::new(), 3, Vec::new()).unwrap();
        let aligned = align_daily(&empty, &empty, &empty, &empty, None, None).unwrap();
        assert!(aligned.is_empty());
        assert_eq!(aligned.cells(), 3);
    }

    #[test]
    fn test_mismatched_cell_counts_rejected() {
        let times = hourly_times(2);
        let err = align_daily(
            &constant_series(&times, 2, 20.0),
            &constant_series(&times, 1, 50.0),
            &constant_series(&times, 1, 10.0),
            &constant_series(&times, 1, 0.5),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, FwiError::ShapeMismatch { .. }));
    }
}
