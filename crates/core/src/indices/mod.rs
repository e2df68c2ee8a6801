//! Pure formula library of the Fire Weather Index System.
//!
//! Every function here is a deterministic, elementwise scalar transform:
//! applying one to a batch of cells gives results identical to applying it
//! cell by cell, which is what lets the stepping driver parallelize freely
//! within a day.

pub mod day_length;
pub mod fire_behavior;
pub mod moisture_codes;

pub use day_length::{
    dc_day_length_factor, dmc_day_length_factor, DC_DAY_LENGTH_FACTORS, DMC_DAY_LENGTH_FACTORS,
};
pub use fire_behavior::{
    buildup_index, fire_weather_index, initial_spread_index, wind_speed_from_components,
};
pub use moisture_codes::{drought_code, duff_moisture_code, fine_fuel_moisture_code};
