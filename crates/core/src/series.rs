//! Time-indexed value containers shared by the alignment layer and the
//! stepping driver.
//!
//! Both containers store their values as a flat `Vec<f64>` in time-major
//! order (`values[t * cells + cell]`). Cells are opaque indices into a grid
//! or station set; the engine never relates one cell to another.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::FwiError;

/// A sub-daily input series: one value per sample instant per cell.
///
/// Sample instants must be strictly increasing. NaN marks a missing sample.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    times: Vec<NaiveDateTime>,
    values: Vec<f64>,
    cells: usize,
}

impl TimeSeries {
    /// Create a series from a time axis and a time-major value plane.
    ///
    /// # Errors
    /// Returns [`FwiError::ShapeMismatch`] if `values.len()` is not
    /// `times.len() * cells`, and [`FwiError::NonMonotonicTimes`] if the
    /// time axis is not strictly increasing.
    pub fn new(
        times: Vec<NaiveDateTime>,
        cells: usize,
        values: Vec<f64>,
    ) -> Result<Self, FwiError> {
        if values.len() != times.len() * cells {
            return Err(FwiError::ShapeMismatch {
                what: "time series value plane",
                expected: times.len() * cells,
                actual: values.len(),
            });
        }
        if times.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FwiError::NonMonotonicTimes("time series"));
        }
        Ok(Self {
            times,
            values,
            cells,
        })
    }

    /// Number of cells per sample instant.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// The sample time axis.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// All values of one sample instant.
    pub(crate) fn row(&self, t: usize) -> &[f64] {
        &self.values[t * self.cells..(t + 1) * self.cells]
    }

    /// Index of the sample taken exactly at `instant`, if any.
    pub(crate) fn exact_index(&self, instant: NaiveDateTime) -> Option<usize> {
        self.times.binary_search(&instant).ok()
    }

    /// Indices of all samples with instant in `[from, to)`.
    pub(crate) fn index_range(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> std::ops::Range<usize> {
        let lo = self.times.partition_point(|t| *t < from);
        let hi = self.times.partition_point(|t| *t < to);
        lo..hi
    }
}

/// A daily output series: one value per aligned day per cell.
///
/// All six sub-index series of a run share the same date axis and cell
/// count. NaN marks a day left undefined by missing weather.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    cells: usize,
}

impl DailySeries {
    /// Create a series over `dates` with every value set to NaN.
    pub(crate) fn filled(dates: Vec<NaiveDate>, cells: usize) -> Self {
        let values = vec![f64::NAN; dates.len() * cells];
        Self {
            dates,
            values,
            cells,
        }
    }

    /// Value for a day/cell pair.
    ///
    /// # Panics
    /// Panics if `day` or `cell` is out of bounds.
    pub fn get(&self, day: usize, cell: usize) -> f64 {
        assert!(
            day < self.dates.len() && cell < self.cells,
            "day/cell out of bounds"
        );
        self.values[day * self.cells + cell]
    }

    /// All values of one day.
    pub fn day_row(&self, day: usize) -> &[f64] {
        &self.values[day * self.cells..(day + 1) * self.cells]
    }

    pub(crate) fn day_row_mut(&mut self, day: usize) -> &mut [f64] {
        &mut self.values[day * self.cells..(day + 1) * self.cells]
    }

    /// The aligned date axis.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of days in the series.
    pub fn days(&self) -> usize {
        self.dates.len()
    }

    /// Number of cells per day.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// The whole day-major value plane.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
