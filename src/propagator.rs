//! # Two-body orbit propagation
//!
//! [`position_at`] moves a set of [`OrbitalElements`] to an arbitrary instant.
//! The solver is picked from the [`OrbitClass`] at each call:
//!
//! | class | solver |
//! |---|---|
//! | elliptic, `e < 0.98` | Newton iteration on Kepler's equation ([`solve_kepler_elliptic`]) |
//! | near-parabolic, `0.98 ≤ e < 1` | Landgraf universal time of flight ([`landgraf`]) |
//! | parabolic, `e = 1` | closed-form Barker solution ([`solve_parabolic`]) |
//! | hyperbolic, `e > 1` | Landgraf universal time of flight ([`landgraf`]) |
//!
//! The perifocal position `(r cos ν, r sin ν, 0)` and velocity are then rotated
//! into the ecliptic J2000 frame with the Gauss vectors of the elements.
use log::trace;

use crate::{
    constants::{AstronomicalUnit, JulianDate, Radian, GAUSS_GRAV_SQUARED},
    ephem_errors::EphemError,
    kepler::{
        anomalies_from_true, landgraf, solve_kepler_elliptic, solve_parabolic,
        true_anomaly_from_eccentric, LandgrafLimits,
    },
    orbit_type::{OrbitClass, OrbitalElements},
    ref_system::ReferenceFrame,
    state_vector::StateVector,
};

/// Result of a propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitPosition {
    /// True anomaly `ν` in `[0, 2π)` (rad).
    pub true_anomaly: Radian,
    /// Heliocentric distance `r` (AU).
    pub radius: AstronomicalUnit,
    /// Mean anomaly `M` (rad). For the elliptic branch this is the unreduced
    /// value fed to Kepler's equation; `None` for a parabola.
    pub mean_anomaly: Option<Radian>,
    /// Eccentric anomaly `E`, or `H` on a hyperbola (rad); `None` for a parabola.
    pub eccentric_anomaly: Option<Radian>,
    /// Heliocentric position and velocity, ecliptic J2000, epoch `t`.
    pub state: StateVector,
}

/// Position of a body on its orbit at time `t`.
///
/// Arguments
/// -----------------
/// * `elements` – Orbital elements of the body.
/// * `t` – Target instant, Julian date in the TDB scale of the elements.
/// * `limits` – Tolerance and caps of the Landgraf solver.
///
/// Return
/// ----------
/// * An [`OrbitPosition`] with `(ν, r)`, the anomalies and the state vector.
///   At the time of perihelion every class yields `ν = 0` and `r = q`.
///
/// Errors
/// ----------
/// * [`EphemError::NumericalDivergence`] if the solver of the branch does not
///   converge, or if the result is not finite.
pub fn position_at(
    elements: &OrbitalElements,
    t: JulianDate,
    limits: &LandgrafLimits,
) -> Result<OrbitPosition, EphemError> {
    let e = elements.eccentricity();
    let q = elements.perihelion_distance();
    let class = elements.orbit_class();

    let (true_anomaly, radius, mean_anomaly, eccentric_anomaly) = match class {
        OrbitClass::Elliptic => {
            let mean_anomaly = elements.mean_anomaly_at(t).ok_or_else(|| {
                EphemError::InvalidElements("elliptic orbit without a mean motion".into())
            })?;
            let a = q / (1.0 - e);
            let ecc_anomaly = solve_kepler_elliptic(mean_anomaly, e)?;
            let nu = true_anomaly_from_eccentric(ecc_anomaly, e);
            (
                nu,
                a * (1.0 - e * ecc_anomaly.cos()),
                Some(mean_anomaly),
                Some(ecc_anomaly),
            )
        }
        OrbitClass::NearParabolic | OrbitClass::Hyperbolic => {
            let (nu, r) = landgraf(q, e, elements.time_since_perihelion(t), limits)?;
            let anomalies = anomalies_from_true(nu, e);
            (nu, r, anomalies.map(|(m, _)| m), anomalies.map(|(_, h)| h))
        }
        OrbitClass::Parabolic => {
            let (nu, r) = solve_parabolic(q, elements.time_since_perihelion(t));
            (nu, r, None, None)
        }
    };

    let (p_vec, q_vec) = elements.gauss_vectors();
    let (sin_nu, cos_nu) = true_anomaly.sin_cos();

    let position = radius * (cos_nu * p_vec + sin_nu * q_vec);
    let speed_factor = (GAUSS_GRAV_SQUARED / elements.semi_latus_rectum()).sqrt();
    let velocity = speed_factor * (-sin_nu * p_vec + (e + cos_nu) * q_vec);

    if !(position.iter().all(|x| x.is_finite()) && velocity.iter().all(|x| x.is_finite())) {
        return Err(EphemError::divergence("orbit propagator", 0));
    }

    trace!("{class} propagation to JD {t}: ν = {true_anomaly}, r = {radius}");

    Ok(OrbitPosition {
        true_anomaly,
        radius,
        mean_anomaly,
        eccentric_anomaly,
        state: StateVector::new(position, ReferenceFrame::EclipticJ2000, t).with_velocity(velocity),
    })
}
