//! Weather formulas used for derived record fields. All inputs and outputs
//! are metric unless the name says otherwise.

pub fn c_to_f(t_c: f64) -> f64 {
    t_c * 9.0 / 5.0 + 32.0
}

pub fn f_to_c(t_f: f64) -> f64 {
    (t_f - 32.0) * 5.0 / 9.0
}

/// Dewpoint in °C from temperature (°C) and relative humidity (%).
///
/// Undefined at 0% humidity.
pub fn dewpoint_c(t_c: f64, rh: f64) -> Option<f64> {
    if rh <= 0.0 {
        return None;
    }
    let gamma = 17.27 * t_c / (237.7 + t_c) + (rh / 100.0).ln();
    let dewpoint = 237.7 * gamma / (17.27 - gamma);
    dewpoint.is_finite().then_some(dewpoint)
}

/// Heat index in °F (Rothfusz regression).
///
/// Only meaningful in hot, humid air; elsewhere the temperature itself is
/// returned, and the result is never below the temperature.
pub fn heatindex_f(t_f: f64, rh: f64) -> f64 {
    if t_f < 80.0 || rh < 40.0 {
        return t_f;
    }
    let hi_f = -42.379 + 2.04901523 * t_f + 10.14333127 * rh
        - 0.22475541 * t_f * rh
        - 6.83783e-3 * t_f.powi(2)
        - 5.481717e-2 * rh.powi(2)
        + 1.22874e-3 * t_f.powi(2) * rh
        + 8.5282e-4 * t_f * rh.powi(2)
        - 1.99e-6 * t_f.powi(2) * rh.powi(2);
    hi_f.max(t_f)
}

pub fn heatindex_c(t_c: f64, rh: f64) -> f64 {
    f_to_c(heatindex_f(c_to_f(t_c), rh))
}

/// Wind chill in °C from temperature (°C) and wind speed (km/h).
///
/// Only defined below 10°C with wind above 4.8 km/h; otherwise the
/// temperature is returned unchanged.
pub fn windchill_c(t_c: f64, v_kph: f64) -> f64 {
    if t_c >= 10.0 || v_kph <= 4.8 {
        return t_c;
    }
    let v = v_kph.powf(0.16);
    13.12 + 0.6215 * t_c + (-11.37 + 0.3965 * t_c) * v
}

/// Altimeter setting in mbar from station pressure (mbar) and station
/// elevation (meters), NOAA algorithm.
pub fn altimeter_pressure_metric(sp_mbar: f64, elevation_m: f64) -> Option<f64> {
    if sp_mbar <= 0.3 {
        return None;
    }
    const K: f64 = 0.190284;
    let p = sp_mbar - 0.3;
    let ratio = 1013.25_f64.powf(K) * 0.0065 / 288.0;
    Some(p * (1.0 + ratio * (elevation_m / p.powf(K))).powf(1.0 / K))
}
