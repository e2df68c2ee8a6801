//! Moisture-code recurrences of the Fire Weather Index System.
//!
//! Each code tracks the moisture content of one fuel layer as a day-over-day
//! recurrence: today's code is a function of yesterday's code and today's
//! noon weather. The equations are the published empirical forms with their
//! exact thresholds and clamps; equation numbers follow Van Wagner & Pickett
//! (1985), with the day-length terms adjusted per Lawson et al. (2008).
//!
//! Missing weather is NaN and must propagate: every clamp here is written as
//! an explicit comparison (false for NaN) rather than `f64::max`/`min`,
//! which would silently replace NaN with the bound.
//!
//! # Scientific References
//! - Van Wagner, C.E. & Pickett, T.L. (1985). "Equations and FORTRAN program
//!   for the Canadian Forest Fire Weather Index System." For. Tech. Rep. 33
//! - Wang, Y., Anderson, K.R. & Suddaby, R.M. (2015). "Updated source code
//!   for calculating fire danger indices in the Canadian Forest Fire Weather
//!   Index System." Inf. Rep. NOR-X-424
//! - Lawson, B.D. & Armitage, O.B. (2008). "Weather guide for the Canadian
//!   Forest Fire Danger Rating System"

use super::day_length::{dc_day_length_factor, dmc_day_length_factor};

/// Fine Fuel Moisture Code update: moisture of fast-drying surface litter.
///
/// Converts yesterday's code to a moisture content, applies rain absorption
/// for precipitation above 0.5 mm, then moves the moisture toward the
/// drying or wetting equilibrium for the day's temperature, humidity and
/// wind before converting back to code scale.
///
/// # Arguments
/// * `temperature` - Noon air temperature (°C)
/// * `rel_hum` - Noon relative humidity (0-100)
/// * `wind_speed` - Noon wind speed (km/h)
/// * `precip` - Trailing 24-hour precipitation (mm); NaN yields NaN
/// * `ffmc_prev` - Yesterday's FFMC
///
/// # Returns
/// Today's FFMC, clamped to `[0, 101]`, or NaN on missing weather.
pub fn fine_fuel_moisture_code(
    temperature: f64,
    rel_hum: f64,
    wind_speed: f64,
    precip: f64,
    ffmc_prev: f64,
) -> f64 {
    let mut mo = 147.2 * (101.0 - ffmc_prev) / (59.5 + ffmc_prev); // Eq. 1

    if precip > 0.5 {
        let rf = precip - 0.5; // Eq. 2
        if mo > 150.0 {
            // Eq. 3b: saturated litter absorbs less, with a surcharge term
            mo += 42.5 * rf * (-100.0 / (251.0 - mo)).exp() * (1.0 - (-6.93 / rf).exp())
                + 0.0015 * (mo - 150.0).powi(2) * rf.sqrt();
        } else {
            // Eq. 3a
            mo += 42.5 * rf * (-100.0 / (251.0 - mo)).exp() * (1.0 - (-6.93 / rf).exp());
        }
        if mo > 250.0 {
            mo = 250.0;
        }
    } else if precip.is_nan() {
        mo = f64::NAN;
    }

    // Eq. 4: drying equilibrium moisture content
    let ed = 0.942 * rel_hum.powf(0.679)
        + 11.0 * ((rel_hum - 100.0) / 10.0).exp()
        + 0.18 * (21.1 - temperature) * (1.0 - (-0.115 * rel_hum).exp());

    let m = if mo < ed {
        // Eq. 5: wetting equilibrium moisture content
        let ew = 0.618 * rel_hum.powf(0.753)
            + 10.0 * ((rel_hum - 100.0) / 10.0).exp()
            + 0.18 * (21.1 - temperature) * (1.0 - (-0.115 * rel_hum).exp());
        if mo <= ew {
            // Eqs. 7a, 7b, 9: wetting from below both equilibria
            let kl = 0.424 * (1.0 - ((100.0 - rel_hum) / 100.0).powf(1.7))
                + 0.0694 * wind_speed.sqrt() * (1.0 - ((100.0 - rel_hum) / 100.0).powi(8));
            let kw = kl * 0.581 * (0.0365 * temperature).exp();
            ew - (ew - mo) / 10.0_f64.powf(kw)
        } else {
            // Between ew and ed: no change
            mo
        }
    } else if mo > ed {
        // Eqs. 6a, 6b, 8: drying toward ed
        let kl = 0.424 * (1.0 - (rel_hum / 100.0).powf(1.7))
            + 0.0694 * wind_speed.sqrt() * (1.0 - (rel_hum / 100.0).powi(8));
        let kw = kl * 0.581 * (0.0365 * temperature).exp();
        ed + (mo - ed) / 10.0_f64.powf(kw)
    } else {
        // mo == ed, or mo is NaN from missing precipitation
        mo
    };

    let ffmc = 59.5 * (250.0 - m) / (147.2 + m); // Eq. 10
    if ffmc > 101.0 {
        101.0
    } else if ffmc <= 0.0 {
        0.0
    } else {
        ffmc
    }
}

/// Duff Moisture Code update: moisture of loosely compacted organic layers.
///
/// The drying term `rk` uses the month's day-length factor; rain above
/// 1.5 mm routes through the moisture-release parameter `b`, selected by
/// the previous code's band (Eqs. 13a-13c).
///
/// # Arguments
/// * `temperature` - Noon air temperature (°C), floored at -1.1
/// * `rel_hum` - Noon relative humidity (0-100)
/// * `precip` - Trailing 24-hour precipitation (mm); NaN yields NaN
/// * `dmc_prev` - Yesterday's DMC
/// * `month` - Calendar month 1-12 of the day being processed
///
/// # Returns
/// Today's DMC, never below 1.0, or NaN on missing weather.
pub fn duff_moisture_code(
    temperature: f64,
    rel_hum: f64,
    precip: f64,
    dmc_prev: f64,
    month: u32,
) -> f64 {
    let mut t = temperature;
    if t < -1.1 {
        t = -1.1;
    }
    // Eqs. 16 and 17
    let rk = 1.894 * (t + 1.1) * (100.0 - rel_hum) * (dmc_day_length_factor(month) * 0.0001);

    let mut pr = if precip > 1.5 {
        let rw = 0.92 * precip - 1.27; // Eq. 11
        let wmi = 20.0 + 280.0 / (0.023 * dmc_prev).exp(); // Eq. 12
        let b = if dmc_prev <= 33.0 {
            100.0 / (0.5 + 0.3 * dmc_prev) // Eq. 13a
        } else if dmc_prev <= 65.0 {
            14.0 - 1.3 * dmc_prev.ln() // Eq. 13b
        } else {
            6.2 * dmc_prev.ln() - 17.2 // Eq. 13c
        };
        let wmr = wmi + 1000.0 * rw / (48.77 + b * rw); // Eq. 14
        43.43 * (5.6348 - (wmr - 20.0).ln()) // Eq. 15
    } else if precip.is_nan() {
        f64::NAN
    } else {
        dmc_prev
    };
    if pr < 0.0 {
        pr = 0.0;
    }

    let dmc = pr + rk;
    if dmc <= 1.0 {
        1.0
    } else {
        dmc
    }
}

/// Drought Code update: moisture of deep, compact organic layers.
///
/// # Arguments
/// * `temperature` - Noon air temperature (°C), floored at -2.8
/// * `precip` - Trailing 24-hour precipitation (mm); NaN yields NaN
/// * `dc_prev` - Yesterday's DC
/// * `month` - Calendar month 1-12 of the day being processed
///
/// # Returns
/// Today's DC, or NaN on missing weather.
pub fn drought_code(temperature: f64, precip: f64, dc_prev: f64, month: u32) -> f64 {
    let mut t = temperature;
    if t < -2.8 {
        t = -2.8;
    }
    // Eq. 22: evapotranspiration, floored at zero
    let mut pe = (0.36 * (t + 2.8) + dc_day_length_factor(month)) / 2.0;
    if pe <= 0.0 {
        pe = 0.0;
    }

    if precip > 2.8 {
        let rw = 0.83 * precip - 1.27; // Eq. 18
        let smi = 800.0 * (-dc_prev / 400.0).exp(); // Eq. 19
        let dr = dc_prev - 400.0 * (1.0 + 3.937 * rw / smi).ln(); // Eqs. 20 and 21
        if dr > 0.0 {
            dr + pe
        } else {
            // The published rain branch leaves dr <= 0 without a defined
            // value (heavy rain on a near-zero code). Fall back to the
            // dry-day update so the recurrence stays defined.
            dc_prev + pe
        }
    } else if precip.is_nan() {
        f64::NAN
    } else {
        dc_prev + pe
    }
}
