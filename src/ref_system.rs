//! # Reference frames and rotations
//!
//! The propagator produces heliocentric vectors in the **mean ecliptic and
//! equinox of J2000**, the frame in which JPL states both planetary and
//! small-body elements. This module provides the rotations needed to reach the
//! **mean equator of J2000** and to reduce an equatorial vector to right
//! ascension / declination.
//!
//! Precession, nutation and aberration are not applied here.
use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{JulianDate, Radian, DAYS_PER_JULIAN_CENTURY, DPI, J2000_JD, RADSEC};

/// Reference frame attached to a [`crate::state_vector::StateVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceFrame {
    /// Mean ecliptic and equinox of J2000.
    EclipticJ2000,
    /// Mean equator and equinox of J2000.
    EquatorialJ2000,
}

/// Mean obliquity of the ecliptic (IAU 1976), in radians.
///
/// # Arguments
/// * `jd` - Julian Date (TT/TDB).
pub fn obleq(jd: JulianDate) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.0006 * RADSEC;
    let ob3 = 0.00181 * RADSEC;

    let t = (jd - J2000_JD) / DAYS_PER_JULIAN_CENTURY;

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// Coordinate axis of a [`rotmt`] rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Active right-handed rotation by `alpha` around `axis`.
pub fn rotmt(alpha: f64, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Rotation taking perifocal coordinates (x toward perihelion, z along the
/// orbital angular momentum) to the reference frame of the elements.
///
/// `R = Rz(Ω) · Rx(i) · Rz(ω)`; its first two columns are the Gauss vectors
/// `P` and `Q`.
pub fn perifocal_rotation(inclination: Radian, periapsis_argument: Radian, node: Radian) -> Matrix3<f64> {
    rotmt(node, Axis::Z) * rotmt(inclination, Axis::X) * rotmt(periapsis_argument, Axis::Z)
}

/// Gauss vectors `(P, Q)`: unit vectors toward perihelion and 90° ahead of it
/// in the orbital plane, expressed in the reference frame of the elements.
pub fn gauss_vectors(
    inclination: Radian,
    periapsis_argument: Radian,
    node: Radian,
) -> (Vector3<f64>, Vector3<f64>) {
    let rot = perifocal_rotation(inclination, periapsis_argument, node);
    (rot.column(0).into_owned(), rot.column(1).into_owned())
}

/// Rotation from one J2000 frame to the other (identity when equal).
pub fn frame_rotation(from: ReferenceFrame, to: ReferenceFrame) -> Matrix3<f64> {
    let eps = obleq(J2000_JD);
    match (from, to) {
        (ReferenceFrame::EclipticJ2000, ReferenceFrame::EquatorialJ2000) => rotmt(eps, Axis::X),
        (ReferenceFrame::EquatorialJ2000, ReferenceFrame::EclipticJ2000) => rotmt(-eps, Axis::X),
        _ => Matrix3::identity(),
    }
}

/// Convert a cartesian vector to `(α, δ, ρ)`.
///
/// * `α` – right ascension (or longitude) in `[0, 2π)`.
/// * `δ` – declination (or latitude) in `[−π/2, π/2]`.
/// * `ρ` – norm of the vector.
///
/// A zero vector yields `(0, 0, 0)`.
pub fn cartesian_to_radec(cartesian_position: &Vector3<f64>) -> (Radian, Radian, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0. {
        return (0.0, 0.0, pos_norm);
    }

    let delta = (cartesian_position.z / pos_norm).asin();
    let alpha = cartesian_position.y.atan2(cartesian_position.x);
    let alpha = if alpha < 0.0 { alpha + DPI } else { alpha };
    (alpha, delta, pos_norm)
}
