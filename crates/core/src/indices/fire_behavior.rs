//! Derived fire-behavior indices.
//!
//! Unlike the moisture codes these carry no day-over-day state: each is
//! computed fresh from the day's codes and weather and never feeds back
//! into the recurrence.
//!
//! # Scientific References
//! - Van Wagner, C.E. & Pickett, T.L. (1985). "Equations and FORTRAN program
//!   for the Canadian Forest Fire Weather Index System." For. Tech. Rep. 33

/// Initial Spread Index: fine-fuel moisture and wind combined into a
/// rate-of-spread potential. Closed form, no branching.
pub fn initial_spread_index(wind_speed: f64, ffmc: f64) -> f64 {
    let mo = 147.2 * (101.0 - ffmc) / (59.5 + ffmc); // Eq. 1
    let ff = 19.115 * (-0.1386 * mo).exp() * (1.0 + mo.powf(5.31) / 49300000.0); // Eq. 25
    ff * (0.05039 * wind_speed).exp() // Eq. 26
}

/// Buildup Index: duff moisture and drought codes combined into a measure
/// of fuel available for consumption. Never negative.
pub fn buildup_index(dmc: f64, dc: f64) -> f64 {
    let bui = if dmc <= 0.4 * dc {
        0.8 * dc * dmc / (dmc + 0.4 * dc) // Eq. 27a
    } else {
        dmc - (1.0 - 0.8 * dc / (dmc + 0.4 * dc)) * (0.92 + (0.0114 * dmc).powf(1.7)) // Eq. 27b
    };
    if bui < 0.0 {
        0.0
    } else {
        bui
    }
}

/// Fire Weather Index: spread and buildup combined into the overall
/// intensity rating. The buildup branch boundary is inclusive at 80.
pub fn fire_weather_index(isi: f64, bui: f64) -> f64 {
    let bb = if bui <= 80.0 {
        0.1 * isi * (0.626 * bui.powf(0.809) + 2.0) // Eq. 28a
    } else {
        0.1 * isi * (1000.0 / (25.0 + 108.64 / (0.023 * bui).exp())) // Eq. 28b
    };
    if bb <= 1.0 {
        bb // Eq. 30b
    } else {
        (2.72 * (0.434 * bb.ln()).powf(0.647)).exp() // Eq. 30a
    }
}

/// Wind speed (m/s) from zonal and meridional components, for inputs that
/// provide u/v instead of scalar speed.
pub fn wind_speed_from_components(u: f64, v: f64) -> f64 {
    (u * u + v * v).sqrt()
}
