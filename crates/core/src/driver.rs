//! Temporal stepping driver.
//!
//! Iterates aligned daily records in chronological order, carrying one
//! `{FFMC, DMC, DC}` state per cell. Within a day every cell is independent
//! and the step runs as a parallel map; the collected results are
//! materialized before the next day starts, which is the required barrier
//! between days. After each step the persistence policy holds a moisture
//! code at its last known value when missing weather left the fresh value
//! undefined, so the recurrence self-heals across data gaps.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alignment::{align_daily, AlignedWeather, DailyWeatherRecord};
use crate::error::FwiError;
use crate::indices::{
    buildup_index, drought_code, duff_moisture_code, fine_fuel_moisture_code, fire_weather_index,
    initial_spread_index,
};
use crate::series::{DailySeries, TimeSeries};

/// Unit of the wind-speed input series.
///
/// Wind must be declared explicitly; the engine works in km/h and converts
/// m/s by the factor 3.6. No other unit is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindSpeedUnit {
    /// Metres per second, converted internally.
    MetersPerSecond,
    /// Kilometres per hour, used as-is.
    KilometersPerHour,
}

impl WindSpeedUnit {
    pub(crate) fn to_kmh_factor(self) -> f64 {
        match self {
            WindSpeedUnit::MetersPerSecond => 3.6,
            WindSpeedUnit::KilometersPerHour => 1.0,
        }
    }
}

impl FromStr for WindSpeedUnit {
    type Err = FwiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m/s" => Ok(WindSpeedUnit::MetersPerSecond),
            "km/h" => Ok(WindSpeedUnit::KilometersPerHour),
            other => Err(FwiError::InvalidWindUnit(other.to_string())),
        }
    }
}

/// Per-cell moisture-code state carried day over day.
///
/// Created once from initial values, then superseded by each day's step;
/// serializable so a caller can persist it and continue a run later.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoistureCodes {
    /// Fine Fuel Moisture Code.
    pub ffmc: f64,
    /// Duff Moisture Code.
    pub dmc: f64,
    /// Drought Code.
    pub dc: f64,
}

impl Default for MoistureCodes {
    /// The canonical start-of-season values.
    fn default() -> Self {
        Self {
            ffmc: 85.0,
            dmc: 6.0,
            dc: 15.0,
        }
    }
}

impl MoistureCodes {
    /// State for a cell with no valid data anywhere.
    pub(crate) const MISSING: Self = Self {
        ffmc: f64::NAN,
        dmc: f64::NAN,
        dc: f64::NAN,
    };

    pub fn new(ffmc: f64, dmc: f64, dc: f64) -> Self {
        Self { ffmc, dmc, dc }
    }

    /// Advance this cell by one day.
    ///
    /// Returns the freshly computed sub-indices for the day (NaN where the
    /// weather was missing) together with the state to carry into the next
    /// day. A missing fresh code reverts to its previous value; the derived
    /// indices are never persisted.
    pub fn step(&self, weather: DailyWeatherRecord, month: u32) -> DayStep {
        let ffmc = fine_fuel_moisture_code(
            weather.temperature,
            weather.rel_hum,
            weather.wind_speed,
            weather.precip,
            self.ffmc,
        );
        let dmc = duff_moisture_code(
            weather.temperature,
            weather.rel_hum,
            weather.precip,
            self.dmc,
            month,
        );
        let dc = drought_code(weather.temperature, weather.precip, self.dc, month);

        let isi = initial_spread_index(weather.wind_speed, ffmc);
        let bui = buildup_index(dmc, dc);
        let fwi = fire_weather_index(isi, bui);

        let carried = MoistureCodes {
            ffmc: if ffmc.is_nan() { self.ffmc } else { ffmc },
            dmc: if dmc.is_nan() { self.dmc } else { dmc },
            dc: if dc.is_nan() { self.dc } else { dc },
        };

        DayStep {
            ffmc,
            dmc,
            dc,
            isi,
            bui,
            fwi,
            carried,
        }
    }
}

/// One day's freshly computed sub-indices plus the carried state.
#[derive(Debug, Clone, Copy)]
pub struct DayStep {
    pub ffmc: f64,
    pub dmc: f64,
    pub dc: f64,
    pub isi: f64,
    pub bui: f64,
    pub fwi: f64,
    /// State for the next day, after the persistence policy.
    pub carried: MoistureCodes,
}

/// Initial moisture-code state for the first day of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InitialConditions {
    /// The same codes broadcast to every cell that has any valid data in
    /// the aligned range; cells with none stay undefined throughout.
    Uniform(MoistureCodes),
    /// Explicit per-cell state, e.g. the `final_state` of a previous run.
    /// Used as given, without the valid-data broadcast mask.
    PerCell(Vec<MoistureCodes>),
}

impl Default for InitialConditions {
    fn default() -> Self {
        InitialConditions::Uniform(MoistureCodes::default())
    }
}

/// Configuration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FwiOptions {
    /// Unit of the wind-speed input series.
    pub wind_speed_unit: WindSpeedUnit,
    /// Initial moisture-code state.
    pub initial: InitialConditions,
    /// Inclusive first day; clipped to the available precipitation span.
    pub start_date: Option<NaiveDate>,
    /// Inclusive last day; clipped to the available precipitation span.
    pub end_date: Option<NaiveDate>,
}

impl FwiOptions {
    pub fn new(wind_speed_unit: WindSpeedUnit) -> Self {
        Self {
            wind_speed_unit,
            initial: InitialConditions::default(),
            start_date: None,
            end_date: None,
        }
    }

    /// Broadcast these codes instead of the canonical defaults.
    pub fn with_initial_codes(mut self, codes: MoistureCodes) -> Self {
        self.initial = InitialConditions::Uniform(codes);
        self
    }

    /// Continue from explicit per-cell state.
    pub fn with_per_cell_state(mut self, state: Vec<MoistureCodes>) -> Self {
        self.initial = InitialConditions::PerCell(state);
        self
    }

    /// Restrict the run to an inclusive date range.
    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
}

/// Output of a run: six equally shaped day-by-cell series sharing the
/// aligned date axis, plus the final carried state for continuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FwiOutput {
    pub ffmc: DailySeries,
    pub dmc: DailySeries,
    pub dc: DailySeries,
    pub isi: DailySeries,
    pub bui: DailySeries,
    pub fwi: DailySeries,
    /// Per-cell state after the last day, ready to seed a follow-up run.
    pub final_state: Vec<MoistureCodes>,
}

/// Align the four input series and run the recurrence over the result.
///
/// # Errors
/// Returns [`FwiError::ShapeMismatch`] if the series disagree on cell
/// count and [`FwiError::InitialStateLength`] if a per-cell initial state
/// does not match it. Missing weather is not an error; it yields NaN
/// outputs under the persistence policy.
pub fn compute_fwi(
    temperature: &TimeSeries,
    rel_hum: &TimeSeries,
    wind_speed: &TimeSeries,
    precip: &TimeSeries,
    options: &FwiOptions,
) -> Result<FwiOutput, FwiError> {
    let mut aligned = align_daily(
        temperature,
        rel_hum,
        wind_speed,
        precip,
        options.start_date,
        options.end_date,
    )?;
    let factor = options.wind_speed_unit.to_kmh_factor();
    if factor != 1.0 {
        aligned.scale_wind(factor);
    }
    run_recurrence(&aligned, &options.initial)
}

/// Run the day-over-day recurrence on already aligned weather.
///
/// # Errors
/// Returns [`FwiError::InitialStateLength`] if a per-cell initial state
/// does not match the aligned cell count.
pub fn run_recurrence(
    aligned: &AlignedWeather,
    initial: &InitialConditions,
) -> Result<FwiOutput, FwiError> {
    let cells = aligned.cells();
    let mut state: Vec<MoistureCodes> = match initial {
        InitialConditions::Uniform(codes) => (0..cells)
            .map(|cell| {
                if aligned.cell_has_data(cell) {
                    *codes
                } else {
                    MoistureCodes::MISSING
                }
            })
            .collect(),
        InitialConditions::PerCell(given) => {
            if given.len() != cells {
                return Err(FwiError::InitialStateLength {
                    cells,
                    provided: given.len(),
                });
            }
            given.clone()
        }
    };

    let dates = aligned.dates().to_vec();
    let mut output = FwiOutput {
        ffmc: DailySeries::filled(dates.clone(), cells),
        dmc: DailySeries::filled(dates.clone(), cells),
        dc: DailySeries::filled(dates.clone(), cells),
        isi: DailySeries::filled(dates.clone(), cells),
        bui: DailySeries::filled(dates.clone(), cells),
        fwi: DailySeries::filled(dates, cells),
        final_state: Vec::new(),
    };

    info!(
        cells,
        days = aligned.days(),
        start = ?aligned.dates().first(),
        end = ?aligned.dates().last(),
        "starting fire weather index run"
    );

    for day in 0..aligned.days() {
        let date = aligned.dates()[day];
        let month = date.month();

        // Parallel map over cells; collecting materializes every cell's
        // result before any state is written, the barrier between days.
        let steps: Vec<DayStep> = (0..cells)
            .into_par_iter()
            .map(|cell| state[cell].step(aligned.record(day, cell), month))
            .collect();

        let mut valid = 0usize;
        for (cell, step) in steps.iter().enumerate() {
            state[cell] = step.carried;
            output.ffmc.day_row_mut(day)[cell] = step.ffmc;
            output.dmc.day_row_mut(day)[cell] = step.dmc;
            output.dc.day_row_mut(day)[cell] = step.dc;
            output.isi.day_row_mut(day)[cell] = step.isi;
            output.bui.day_row_mut(day)[cell] = step.bui;
            output.fwi.day_row_mut(day)[cell] = step.fwi;
            if !step.ffmc.is_nan() {
                valid += 1;
            }
        }
        debug!(%date, month, valid, "stepped day");
    }

    output.final_state = state;
    Ok(output)
}
