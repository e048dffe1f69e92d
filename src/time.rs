//! # Time helpers
//!
//! The numerical core works on plain Julian days in the **TDB** time scale
//! ([`JulianDate`]); public entry points accept [`hifitime::Epoch`] values and
//! convert them here. Time-scale conversion itself (UTC/TT/TDB) is delegated to
//! hifitime.
use hifitime::Epoch;

use crate::{
    constants::{Days, JulianDate, DAYS_PER_JULIAN_CENTURY, DAYS_PER_JULIAN_YEAR, DPI, J2000_JD,
        JDTOMJD},
    ephem_errors::EphemError,
};

/// Julian day (TDB) of an epoch.
pub fn jd_tdb(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_tdb_days()
}

/// Epoch from a Julian day expressed in TDB.
pub fn epoch_from_jd_tdb(jd: JulianDate) -> Epoch {
    Epoch::from_jde_tdb(jd)
}

/// Julian centuries elapsed since J2000.0.
pub fn julian_centuries_since_j2000(jd: JulianDate) -> f64 {
    (jd - J2000_JD) / DAYS_PER_JULIAN_CENTURY
}

/// Decimal (Julian) year of a Julian day, e.g. `2000.0` at J2000.0.
///
/// This is the year used to pick a validity window of the planetary tables;
/// it differs from the Gregorian calendar year by less than a day.
pub fn julian_year(jd: JulianDate) -> f64 {
    2000.0 + (jd - J2000_JD) / DAYS_PER_JULIAN_YEAR
}

/// Build the list of Julian days `start, start + step, …` up to `end`.
///
/// `end` is included when it falls on a step (within a microsecond).
///
/// Errors
/// ------
/// * [`EphemError::InvalidConfiguration`] if `step` is not strictly positive
///   or `end < start`.
pub fn date_range(start: JulianDate, end: JulianDate, step: Days) -> Result<Vec<JulianDate>, EphemError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(EphemError::InvalidConfiguration(format!(
            "date range step must be positive, got {step}"
        )));
    }
    if end < start {
        return Err(EphemError::InvalidConfiguration(
            "date range end is before its start".into(),
        ));
    }

    let tolerance = 1e-6 / 86_400.0;
    let count = ((end - start) / step + tolerance).floor() as usize;
    Ok((0..=count).map(|i| start + i as f64 * step).collect())
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// IAU 1982 polynomial for the mean sidereal time at 0h UT1, plus the
/// fractional-day correction due to Earth's rotation rate.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (MJD, UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
pub fn gmst(tjm: f64) -> f64 {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    let itjm = tjm.floor();
    let t = (itjm + JDTOMJD - J2000_JD) / DAYS_PER_JULIAN_CENTURY;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / 86400.0;

    let h = tjm.fract() * DPI;
    (gmst0 + h * RAP).rem_euclid(DPI)
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_julian_centuries() {
        assert_eq!(julian_centuries_since_j2000(J2000_JD), 0.0);
        assert_eq!(julian_centuries_since_j2000(J2000_JD + 36525.0), 1.0);
    }

    #[test]
    fn test_julian_year() {
        assert_eq!(julian_year(J2000_JD), 2000.0);
        assert_abs_diff_eq!(julian_year(J2000_JD - 200.0 * 365.25), 1800.0, epsilon = 1e-12);
    }

    #[test]
    fn test_epoch_round_trip() {
        let jd = 2_460_000.25;
        let epoch = epoch_from_jd_tdb(jd);
        assert_abs_diff_eq!(jd_tdb(&epoch), jd, epsilon = 1e-8);
    }

    #[test]
    fn test_date_range() {
        let range = date_range(10.0, 12.0, 0.5).unwrap();
        assert_eq!(range, vec![10.0, 10.5, 11.0, 11.5, 12.0]);

        let range = date_range(10.0, 11.9, 0.5).unwrap();
        assert_eq!(range.len(), 4);

        assert!(date_range(10.0, 12.0, 0.0).is_err());
        assert!(date_range(12.0, 10.0, 1.0).is_err());
    }

    #[test]
    fn test_gmst() {
        let tut = 57028.478514610404;
        assert_abs_diff_eq!(gmst(tut), 4.851925725092499, epsilon = 1e-9);

        let tut = 51544.5;
        assert_abs_diff_eq!(gmst(tut), 4.894961212789145, epsilon = 1e-9);
    }
}
