use std::f64::consts::SQRT_2;

use nalgebra::Vector3;

use crate::{
    constants::{AstronomicalUnit, JulianDate, Radian, GAUSS_GRAV, GAUSS_GRAV_SQUARED},
    ephem_errors::EphemError,
    kepler::{angle_diff, anomalies_from_true, principal_angle},
    orbit_type::OrbitalElements,
    ref_system::ReferenceFrame,
    state_vector::StateVector,
};

/// Eccentricities closer to 1 than this are snapped to a parabola.
const PARABOLIC_EPS: f64 = 5e-15;

/// # Cometary orbital elements
///
/// Perihelion-based elements `(q, e, i, Ω, ω, ν)` of an osculating conic,
/// valid for every eccentricity. They are the result of the inverse problem
/// (heliocentric state vector → elements) and convert back into propagatable
/// [`OrbitalElements`] with [`CometaryElements::to_orbital_elements`].
///
/// Units & conventions
/// --------------------
/// - Distances in **AU**; angles in **radians**; epochs in **JD (TDB)**.
/// - Angles refer to the frame of the state vector they were built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CometaryElements {
    /// Reference epoch of the element set (JD, TDB).
    pub reference_epoch: JulianDate,

    /// Perihelion distance `q` (AU).
    pub perihelion_distance: AstronomicalUnit,

    /// Eccentricity `e`.
    pub eccentricity: f64,

    /// Inclination `i` (rad).
    pub inclination: Radian,

    /// Longitude of the ascending node `Ω` (rad).
    pub ascending_node_longitude: Radian,

    /// Argument of periapsis `ω` (rad).
    pub periapsis_argument: Radian,

    /// True anomaly `ν` at the reference epoch (rad).
    pub true_anomaly: Radian,

    /// Frame of the angles.
    pub frame: ReferenceFrame,
}

impl CometaryElements {
    /// Osculating elements of a heliocentric state vector.
    ///
    /// Uses the angular momentum `h = r × v` for the orbital plane and the
    /// Laplace–Runge–Lenz vector `e = (v × h)/μ − r/|r|` for the perihelion
    /// direction, with `μ = k²`.
    ///
    /// When the orbit is equatorial the node is set to zero; when it is
    /// circular the argument of perihelion is set to zero and `ν` is measured
    /// from the node.
    ///
    /// Errors
    /// ----------
    /// * [`EphemError::InvalidElements`] if the state has no velocity, or if
    ///   the angular momentum vanishes (rectilinear motion).
    pub fn from_state(state: &StateVector) -> Result<Self, EphemError> {
        let velocity = state.velocity.ok_or_else(|| {
            EphemError::InvalidElements("state vector carries no velocity".into())
        })?;
        let position = state.position;

        let angular_momentum = position.cross(&velocity);
        let h_norm = angular_momentum.norm();
        let r_norm = position.norm();
        if h_norm == 0.0 || r_norm == 0.0 || !h_norm.is_finite() {
            return Err(EphemError::InvalidElements(
                "degenerate state vector: zero angular momentum".into(),
            ));
        }
        let h_unit = angular_momentum / h_norm;

        let lenz_vector = velocity.cross(&angular_momentum) / GAUSS_GRAV_SQUARED - position / r_norm;
        let mut eccentricity = lenz_vector.norm();
        if (eccentricity - 1.0).abs() < PARABOLIC_EPS {
            eccentricity = 1.0;
        }

        let semi_latus_rectum = h_norm * h_norm / GAUSS_GRAV_SQUARED;
        let perihelion_distance = semi_latus_rectum / (1.0 + eccentricity);

        // Orbital inclination and longitude of the node
        let sini = (h_unit.x * h_unit.x + h_unit.y * h_unit.y).sqrt();
        let inclination = sini.atan2(h_unit.z);
        let ascending_node_longitude = if sini == 0.0 {
            0.0
        } else {
            principal_angle(h_unit.x.atan2(-h_unit.y))
        };

        let node_dir = Vector3::new(
            ascending_node_longitude.cos(),
            ascending_node_longitude.sin(),
            0.0,
        );

        // angle from `from` to `to`, measured in the orbital plane
        let plane_angle = |from: &Vector3<f64>, to: &Vector3<f64>| {
            from.cross(to).dot(&h_unit).atan2(from.dot(to))
        };

        let (periapsis_argument, true_anomaly) = if eccentricity > PARABOLIC_EPS {
            (
                principal_angle(plane_angle(&node_dir, &lenz_vector)),
                principal_angle(plane_angle(&lenz_vector, &position)),
            )
        } else {
            (0.0, principal_angle(plane_angle(&node_dir, &position)))
        };

        Ok(CometaryElements {
            reference_epoch: state.epoch,
            perihelion_distance,
            eccentricity,
            inclination,
            ascending_node_longitude,
            periapsis_argument,
            true_anomaly,
            frame: state.frame,
        })
    }

    /// Signed time from perihelion passage to the reference epoch (days).
    ///
    /// Errors
    /// ----------
    /// * [`EphemError::InvalidElements`] if `ν` lies beyond the asymptotes of
    ///   a hyperbola.
    pub fn time_since_perihelion(&self) -> Result<f64, EphemError> {
        let q = self.perihelion_distance;
        let e = self.eccentricity;

        if e == 1.0 {
            // Barker: s³ + 3s = 3k/√2 · τ / q^{3/2}
            let s = (0.5 * angle_diff(self.true_anomaly, 0.0)).tan();
            return Ok((s * s * s + 3.0 * s) * SQRT_2 * q * q.sqrt() / (3.0 * GAUSS_GRAV));
        }

        let (mean_anomaly, _) = anomalies_from_true(self.true_anomaly, e).ok_or_else(|| {
            EphemError::InvalidElements(format!(
                "true anomaly {} is beyond the asymptotes of a hyperbola with e = {e}",
                self.true_anomaly
            ))
        })?;
        let a = (q / (1.0 - e)).abs();
        let n = GAUSS_GRAV / (a * a.sqrt());
        let mean_anomaly = if e < 1.0 {
            angle_diff(mean_anomaly, 0.0)
        } else {
            mean_anomaly
        };
        Ok(mean_anomaly / n)
    }

    /// Propagatable elements with the same epoch and shape.
    ///
    /// The time of perihelion is the passage nearest to the reference epoch.
    pub fn to_orbital_elements(&self) -> Result<OrbitalElements, EphemError> {
        let tau = self.time_since_perihelion()?;
        OrbitalElements::comet_jd(
            self.reference_epoch,
            self.perihelion_distance,
            self.eccentricity,
            self.inclination,
            self.periapsis_argument,
            self.ascending_node_longitude,
            self.reference_epoch - tau,
        )
    }
}

#[cfg(test)]
mod cometary_elements_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_circular_equatorial_orbit() {
        // circular orbit at 1 AU: v = k
        let state = StateVector::new(Vector3::new(0.0, 1.0, 0.0), ReferenceFrame::EclipticJ2000, 0.0)
            .with_velocity(Vector3::new(-GAUSS_GRAV, 0.0, 0.0));
        let elem = CometaryElements::from_state(&state).unwrap();

        assert_abs_diff_eq!(elem.eccentricity, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(elem.perihelion_distance, 1.0, epsilon = 1e-12);
        assert_eq!(elem.inclination, 0.0);
        assert_eq!(elem.ascending_node_longitude, 0.0);
        assert_abs_diff_eq!(elem.true_anomaly, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_state_at_perihelion() {
        // perihelion at q = 0.5 on the +x axis, e = 0.3, prograde in the xy plane
        let (q, e) = (0.5, 0.3);
        let v = (GAUSS_GRAV_SQUARED * (1.0 + e) / q).sqrt();
        let state = StateVector::new(Vector3::new(q, 0.0, 0.0), ReferenceFrame::EclipticJ2000, 100.0)
            .with_velocity(Vector3::new(0.0, v, 0.0));
        let elem = CometaryElements::from_state(&state).unwrap();

        assert_abs_diff_eq!(elem.eccentricity, e, epsilon = 1e-12);
        assert_abs_diff_eq!(elem.perihelion_distance, q, epsilon = 1e-12);
        assert_abs_diff_eq!(angle_diff(elem.true_anomaly, 0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(elem.time_since_perihelion().unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_velocity_and_degenerate_state() {
        let no_vel = StateVector::new(Vector3::new(1.0, 0.0, 0.0), ReferenceFrame::EclipticJ2000, 0.0);
        assert!(matches!(
            CometaryElements::from_state(&no_vel),
            Err(EphemError::InvalidElements(_))
        ));

        let radial = no_vel.with_velocity(Vector3::new(0.01, 0.0, 0.0));
        assert!(matches!(
            CometaryElements::from_state(&radial),
            Err(EphemError::InvalidElements(_))
        ));
    }
}
