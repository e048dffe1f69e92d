//! Sexagesimal rendering of right ascension and declination.
use crate::constants::{Radian, DPI};

/// Split a non-negative value in units `U` into `(U, U/60, U/3600)` with the
/// seconds rounded to `prec` digits and the rounding carried upward.
fn sexagesimal(value: f64, prec: usize) -> (u32, u32, f64) {
    let scale = 10f64.powi(prec as i32);
    let total_seconds = (value * 3600.0 * scale).round() / scale;

    let units = (total_seconds / 3600.0).floor();
    let rest = total_seconds - units * 3600.0;
    let minutes = (rest / 60.0).floor();
    let seconds = rest - minutes * 60.0;

    (units as u32, minutes as u32, seconds.max(0.0))
}

/// Right ascension as `(hours, minutes, seconds)`.
///
/// Arguments
/// ---------
/// * `ra`: right ascension in **radians** (any value, reduced to `[0, 2π)`).
/// * `prec`: number of fractional digits kept on the seconds.
///
/// Returns
/// -------
/// * `(h, m, s)` with `h ∈ [0, 24)`; a value rounding up to 24h wraps to `0h`.
pub fn ra_hms_prec(ra: Radian, prec: usize) -> (u32, u32, f64) {
    let hours = ra.rem_euclid(DPI) * 24.0 / DPI;
    let (h, m, s) = sexagesimal(hours, prec);
    (h % 24, m, s)
}

/// Declination as `(sign, degrees, arcminutes, arcseconds)`.
///
/// Arguments
/// ---------
/// * `dec`: declination in **radians**.
/// * `prec`: number of fractional digits kept on the arcseconds.
pub fn dec_sdms_prec(dec: Radian, prec: usize) -> (char, u32, u32, f64) {
    let sign = if dec < 0.0 { '-' } else { '+' };
    let (d, m, s) = sexagesimal(dec.abs().to_degrees(), prec);
    (sign, d, m, s)
}

/// `HH MM SS.sss` string of a right ascension in radians.
pub fn fmt_ra(ra: Radian, prec: usize) -> String {
    let (h, m, s) = ra_hms_prec(ra, prec);
    format!("{h:02} {m:02} {}", fmt_ss(s, prec))
}

/// `±DD MM SS.ss` string of a declination in radians.
pub fn fmt_dec(dec: Radian, prec: usize) -> String {
    let (sign, d, m, s) = dec_sdms_prec(dec, prec);
    format!("{sign}{d:02} {m:02} {}", fmt_ss(s, prec))
}

/// Seconds with a two-digit integer part, e.g. `"07.250"`.
fn fmt_ss(seconds: f64, prec: usize) -> String {
    let width = if prec == 0 { 2 } else { prec + 3 };
    format!("{seconds:0width$.prec$}")
}
