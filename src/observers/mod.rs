//! # Observer sites
//!
//! An [`Observer`] is a location on the Earth's surface. Its geocentric
//! position at a given time is added to the Earth's heliocentric position to
//! obtain topocentric ephemerides.
//!
//! ## Frames & conventions
//!
//! - Site coordinates are geodetic on the WGS84 ellipsoid and converted to
//!   geocentric parallax constants `(ρ·cosφ', ρ·sinφ')` in Earth radii.
//! - Earth rotation uses the mean sidereal time [`gmst`]; precession,
//!   nutation and polar motion are neglected, UT1 is approximated by UTC.
//! - Output states are in the mean ecliptic J2000 frame, AU and AU/day.
use nalgebra::Vector3;

use crate::{
    constants::{Degree, JulianDate, DPI, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, ERAU, RADEG},
    ephem_errors::EphemError,
    ref_system::{rotmt, Axis, ReferenceFrame},
    state_vector::StateVector,
    time::{epoch_from_jd_tdb, gmst},
};

/// Sidereal rotation rate of the Earth (rad/day).
const EARTH_ROTATION_RATE: f64 = DPI * 1.00273790934;

#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    /// Optional human-readable site name.
    pub name: Option<String>,

    /// Geodetic longitude in **degrees** east of Greenwich.
    pub longitude: Degree,

    /// ρ·cosφ (geocentric latitude φ), in **Earth radii**.
    pub rho_cos_phi: f64,

    /// ρ·sinφ (geocentric latitude φ), in **Earth radii**.
    pub rho_sin_phi: f64,

    /// Body-fixed position of the site (AU).
    body_fixed: Vector3<f64>,
}

impl Observer {
    /// Site from geodetic coordinates.
    ///
    /// Arguments
    /// -----------------
    /// * `longitude`: Geodetic longitude in **degrees** (east positive).
    /// * `latitude`: Geodetic latitude in **degrees**.
    /// * `elevation`: Height above the reference ellipsoid in **meters**.
    /// * `name`: Optional site name.
    ///
    /// Errors
    /// -----------------
    /// * [`EphemError::InvalidConfiguration`] for non-finite values or a
    ///   latitude outside `[−90°, 90°]`.
    pub fn new(
        longitude: Degree,
        latitude: Degree,
        elevation: f64,
        name: Option<String>,
    ) -> Result<Self, EphemError> {
        if !(longitude.is_finite() && elevation.is_finite()) || !(-90.0..=90.0).contains(&latitude)
        {
            return Err(EphemError::InvalidConfiguration(format!(
                "invalid observer location (lon {longitude}°, lat {latitude}°, h {elevation} m)"
            )));
        }
        let (rho_cos_phi, rho_sin_phi) = lat_alt_to_parallax(latitude * RADEG, elevation);
        Ok(Observer::from_parallax(longitude, rho_cos_phi, rho_sin_phi, name))
    }

    /// Site from its parallax constants (as published in observatory lists).
    pub fn from_parallax(
        longitude: Degree,
        rho_cos_phi: f64,
        rho_sin_phi: f64,
        name: Option<String>,
    ) -> Self {
        let lon = longitude * RADEG;
        let body_fixed = Vector3::new(
            ERAU * rho_cos_phi * lon.cos(),
            ERAU * rho_cos_phi * lon.sin(),
            ERAU * rho_sin_phi,
        );
        Observer {
            name,
            longitude,
            rho_cos_phi,
            rho_sin_phi,
            body_fixed,
        }
    }

    /// Geocentric state of the site at `t` (JD, TDB), ecliptic J2000.
    pub fn geocentric(&self, t: JulianDate) -> StateVector {
        let tut = epoch_from_jd_tdb(t).to_mjd_utc_days();
        let earth_rotation = rotmt(gmst(tut), Axis::Z);

        let position = earth_rotation * self.body_fixed;
        let velocity = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE).cross(&position);

        StateVector::new(position, ReferenceFrame::EquatorialJ2000, t)
            .with_velocity(velocity)
            .to_frame(ReferenceFrame::EclipticJ2000)
    }
}

/// Convert geodetic latitude and height into normalized parallax coordinates.
///
/// Arguments
/// ---------
/// * `lat` - Geodetic latitude in **radians**.
/// * `height` - Height above the reference ellipsoid in **meters**.
///
/// Returns
/// -------
/// A tuple `(rho_cos_phi, rho_sin_phi)` in Earth equatorial radii.
pub fn lat_alt_to_parallax(lat: f64, height: f64) -> (f64, f64) {
    // Ratio of the Earth's minor to major axis
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // Parametric (reduced) latitude
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}
