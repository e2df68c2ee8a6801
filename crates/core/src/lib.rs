//! Fire Weather Index Recurrence Engine
//!
//! Computes the daily Fire Weather Index family of sub-indices (FFMC, DMC,
//! DC, ISI, BUI, FWI) for gridded or point weather data, using the New
//! Zealand latitude-band adjustment of the Canadian Forest Fire Weather
//! Index System.
//!
//! Every sub-index is a recurrence: today's value depends on yesterday's
//! value plus today's weather. The crate is organized around that:
//!
//! - Pure formula library with the published piecewise equations and clamps
//! - Fixed monthly day-length tables for the duff moisture and drought codes
//! - Daily alignment of sub-daily series into noon snapshots and trailing
//!   24-hour precipitation sums, with all-or-nothing masking of gaps
//! - A stepping driver that carries per-cell `{FFMC, DMC, DC}` state across
//!   days, parallel over cells within a day, and holds the last known state
//!   through data gaps

pub mod alignment;
pub mod driver;
pub mod error;
pub mod indices;
pub mod series;

pub use alignment::{align_daily, AlignedWeather, DailyWeatherRecord};
pub use driver::{
    compute_fwi, run_recurrence, DayStep, FwiOptions, FwiOutput, InitialConditions, MoistureCodes,
    WindSpeedUnit,
};
pub use error::FwiError;
pub use indices::{
    buildup_index, drought_code, duff_moisture_code, fine_fuel_moisture_code, fire_weather_index,
    initial_spread_index, wind_speed_from_components,
};
pub use series::{DailySeries, TimeSeries};
