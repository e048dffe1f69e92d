//! # Orbital elements
//!
//! [`OrbitalElements`] holds a conic orbit referred to the mean ecliptic and
//! equinox of J2000, in one of two parameterizations:
//!
//! - [`Parameterization::MeanLongitude`]: semi-major axis and mean longitude
//!   at the epoch, the form in which JPL publishes planetary elements.
//! - [`Parameterization::PerihelionTime`]: perihelion distance and time of
//!   perihelion passage, the form used for comets and for any `e ≥ 1` orbit.
//!
//! The [`OrbitClass`] is a pure function of the eccentricity and selects the
//! propagation branch in [`crate::propagator::position_at`].
//!
//! Quantities that depend on the epoch (anomalies and radius at the epoch) are
//! computed on first access and cached; [`OrbitalElements::set_epoch`] is the
//! only operation that clears the cache.
//!
//! ## Example
//!
//! ```rust
//! use ephemkit::orbit_type::{OrbitClass, OrbitalElements};
//! use hifitime::Epoch;
//!
//! let epoch = Epoch::from_jde_tdb(2_460_000.5);
//! let comet = OrbitalElements::comet(epoch, 1.0, 0.995, 0.0, 0.0, 0.0, epoch).unwrap();
//! assert_eq!(comet.orbit_class(), OrbitClass::NearParabolic);
//! assert_eq!(comet.perihelion_distance(), 1.0);
//! ```
use std::fmt;

use hifitime::Epoch;
use nalgebra::Vector3;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        AstronomicalUnit, Days, Degree, JulianDate, Radian, DPI, GAUSS_GRAV,
        MEAN_MOTION_DEG_PER_DAY, NEAR_PARABOLIC_LOWER_BOUND, RADEG,
    },
    ephem_errors::EphemError,
    kepler::{angle_diff, principal_angle, LandgrafLimits},
    propagator::position_at,
    ref_system::gauss_vectors,
    time::{epoch_from_jd_tdb, jd_tdb},
};

/// Cometary (perihelion-based) elements reconstructed from a state vector.
pub mod cometary_element;

/// Conic class of an orbit, a pure function of the eccentricity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitClass {
    /// `e < 0.98`
    Elliptic,
    /// `0.98 ≤ e < 1`
    NearParabolic,
    /// `e = 1`
    Parabolic,
    /// `e > 1`
    Hyperbolic,
}

impl OrbitClass {
    pub fn classify(eccentricity: f64) -> Self {
        if eccentricity < NEAR_PARABOLIC_LOWER_BOUND {
            OrbitClass::Elliptic
        } else if eccentricity < 1.0 {
            OrbitClass::NearParabolic
        } else if eccentricity == 1.0 {
            OrbitClass::Parabolic
        } else {
            OrbitClass::Hyperbolic
        }
    }
}

impl fmt::Display for OrbitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrbitClass::Elliptic => "elliptic",
            OrbitClass::NearParabolic => "near-parabolic",
            OrbitClass::Parabolic => "parabolic",
            OrbitClass::Hyperbolic => "hyperbolic",
        };
        write!(f, "{name}")
    }
}

/// Which pair of elements fixes the size of the orbit and the position of the
/// body on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parameterization {
    MeanLongitude {
        /// Semi-major axis `a` (AU).
        semi_major_axis: AstronomicalUnit,
        /// Mean longitude `L = ϖ + M` at the epoch (rad).
        mean_longitude: Radian,
    },
    PerihelionTime {
        /// Perihelion distance `q` (AU).
        perihelion_distance: AstronomicalUnit,
        /// Time of perihelion passage (Julian date, TDB).
        perihelion_time: JulianDate,
    },
}

/// Anomalies and heliocentric distance at the epoch of the elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochAnomalies {
    /// Mean anomaly (rad); `None` for a parabola.
    pub mean_anomaly: Option<Radian>,
    /// Eccentric anomaly, or hyperbolic anomaly `H` when `e > 1` (rad); `None` for a parabola.
    pub eccentric_anomaly: Option<Radian>,
    /// True anomaly in `[0, 2π)` (rad).
    pub true_anomaly: Radian,
    /// Heliocentric distance (AU).
    pub radius: AstronomicalUnit,
}

/// Heliocentric conic orbit in the mean ecliptic and equinox of J2000.
///
/// Built with [`OrbitalElements::planet`] or [`OrbitalElements::comet`]; both
/// reject invalid input with [`EphemError::InvalidElements`], so every value
/// of this type can be propagated.
///
/// See also
/// ------------
/// * [`crate::propagator::position_at`] – Position and velocity at any time.
/// * [`cometary_element::CometaryElements::from_state`] – Inverse problem, state → elements.
#[derive(Debug, Clone)]
pub struct OrbitalElements {
    epoch: JulianDate,
    eccentricity: f64,
    inclination: Radian,
    periapsis_argument: Radian,
    ascending_node: Radian,
    parameterization: Parameterization,
    gauss_p: Vector3<f64>,
    gauss_q: Vector3<f64>,
    at_epoch: OnceCell<EpochAnomalies>,
}

impl PartialEq for OrbitalElements {
    fn eq(&self, other: &Self) -> bool {
        self.epoch == other.epoch
            && self.eccentricity == other.eccentricity
            && self.inclination == other.inclination
            && self.periapsis_argument == other.periapsis_argument
            && self.ascending_node == other.ascending_node
            && self.parameterization == other.parameterization
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), EphemError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EphemError::InvalidElements(format!("{name} must be finite, got {value}")))
    }
}

impl OrbitalElements {
    fn build(
        epoch: JulianDate,
        eccentricity: f64,
        inclination: Radian,
        periapsis_argument: Radian,
        ascending_node: Radian,
        parameterization: Parameterization,
    ) -> Result<Self, EphemError> {
        check_finite("epoch", epoch)?;
        check_finite("eccentricity", eccentricity)?;
        check_finite("inclination", inclination)?;
        check_finite("argument of perihelion", periapsis_argument)?;
        check_finite("longitude of the ascending node", ascending_node)?;

        if eccentricity < 0.0 {
            return Err(EphemError::InvalidElements(format!(
                "eccentricity must be non-negative, got {eccentricity}"
            )));
        }

        match parameterization {
            Parameterization::MeanLongitude {
                semi_major_axis,
                mean_longitude,
            } => {
                check_finite("mean longitude", mean_longitude)?;
                if !(semi_major_axis > 0.0) || !semi_major_axis.is_finite() {
                    return Err(EphemError::InvalidElements(format!(
                        "semi-major axis must be positive, got {semi_major_axis}"
                    )));
                }
                if eccentricity >= 1.0 {
                    return Err(EphemError::InvalidElements(format!(
                        "mean-longitude elements need a closed orbit, got e = {eccentricity}"
                    )));
                }
            }
            Parameterization::PerihelionTime {
                perihelion_distance,
                perihelion_time,
            } => {
                check_finite("time of perihelion", perihelion_time)?;
                if !(perihelion_distance > 0.0) || !perihelion_distance.is_finite() {
                    return Err(EphemError::InvalidElements(format!(
                        "perihelion distance must be positive, got {perihelion_distance}"
                    )));
                }
            }
        }

        let (gauss_p, gauss_q) = gauss_vectors(inclination, periapsis_argument, ascending_node);

        Ok(OrbitalElements {
            epoch,
            eccentricity,
            inclination,
            periapsis_argument,
            ascending_node,
            parameterization,
            gauss_p,
            gauss_q,
            at_epoch: OnceCell::new(),
        })
    }

    /// Elements in the planetary form published by JPL.
    ///
    /// Arguments
    /// -----------------
    /// * `epoch` – Epoch of the elements.
    /// * `semi_major_axis` – `a` (AU, > 0).
    /// * `eccentricity` – `e`, `0 ≤ e < 1`.
    /// * `inclination` – `i` (rad).
    /// * `longitude_of_perihelion` – `ϖ = Ω + ω` (rad).
    /// * `ascending_node` – `Ω` (rad).
    /// * `mean_longitude` – `L = ϖ + M` (rad).
    ///
    /// Errors
    /// ----------
    /// * [`EphemError::InvalidElements`] on a non-positive axis, `e ∉ [0, 1)` or a
    ///   non-finite value.
    pub fn planet(
        epoch: Epoch,
        semi_major_axis: AstronomicalUnit,
        eccentricity: f64,
        inclination: Radian,
        longitude_of_perihelion: Radian,
        ascending_node: Radian,
        mean_longitude: Radian,
    ) -> Result<Self, EphemError> {
        OrbitalElements::planet_jd(
            jd_tdb(&epoch),
            semi_major_axis,
            eccentricity,
            inclination,
            longitude_of_perihelion,
            ascending_node,
            mean_longitude,
        )
    }

    /// [`OrbitalElements::planet`] with the epoch given as a Julian date (TDB).
    pub fn planet_jd(
        epoch: JulianDate,
        semi_major_axis: AstronomicalUnit,
        eccentricity: f64,
        inclination: Radian,
        longitude_of_perihelion: Radian,
        ascending_node: Radian,
        mean_longitude: Radian,
    ) -> Result<Self, EphemError> {
        OrbitalElements::build(
            epoch,
            eccentricity,
            inclination,
            principal_angle(longitude_of_perihelion - ascending_node),
            principal_angle(ascending_node),
            Parameterization::MeanLongitude {
                semi_major_axis,
                mean_longitude: principal_angle(mean_longitude),
            },
        )
    }

    /// Elements in the perihelion form used for comets, valid for every
    /// eccentricity.
    ///
    /// Arguments
    /// -----------------
    /// * `epoch` – Epoch of the elements.
    /// * `perihelion_distance` – `q` (AU, > 0).
    /// * `eccentricity` – `e ≥ 0`.
    /// * `inclination` – `i` (rad).
    /// * `periapsis_argument` – `ω` (rad).
    /// * `ascending_node` – `Ω` (rad).
    /// * `perihelion_time` – Time of perihelion passage `T`.
    ///
    /// Errors
    /// ----------
    /// * [`EphemError::InvalidElements`] on `q ≤ 0`, `e < 0` or a non-finite value.
    pub fn comet(
        epoch: Epoch,
        perihelion_distance: AstronomicalUnit,
        eccentricity: f64,
        inclination: Radian,
        periapsis_argument: Radian,
        ascending_node: Radian,
        perihelion_time: Epoch,
    ) -> Result<Self, EphemError> {
        OrbitalElements::comet_jd(
            jd_tdb(&epoch),
            perihelion_distance,
            eccentricity,
            inclination,
            periapsis_argument,
            ascending_node,
            jd_tdb(&perihelion_time),
        )
    }

    /// [`OrbitalElements::comet`] with both instants given as Julian dates (TDB).
    pub fn comet_jd(
        epoch: JulianDate,
        perihelion_distance: AstronomicalUnit,
        eccentricity: f64,
        inclination: Radian,
        periapsis_argument: Radian,
        ascending_node: Radian,
        perihelion_time: JulianDate,
    ) -> Result<Self, EphemError> {
        OrbitalElements::build(
            epoch,
            eccentricity,
            inclination,
            principal_angle(periapsis_argument),
            principal_angle(ascending_node),
            Parameterization::PerihelionTime {
                perihelion_distance,
                perihelion_time,
            },
        )
    }

    pub fn epoch(&self) -> Epoch {
        epoch_from_jd_tdb(self.epoch)
    }

    /// Epoch of the elements as a Julian date (TDB).
    pub fn epoch_jd(&self) -> JulianDate {
        self.epoch
    }

    /// Move the epoch of the elements, keeping the same physical orbit.
    ///
    /// For mean-longitude elements the mean longitude is advanced by
    /// `n·(new − old)`. Clears the cached epoch anomalies.
    pub fn set_epoch(&mut self, epoch: Epoch) {
        let new_epoch = jd_tdb(&epoch);
        if let Parameterization::MeanLongitude {
            semi_major_axis,
            mean_longitude,
        } = self.parameterization
        {
            let n = GAUSS_GRAV / (semi_major_axis * semi_major_axis.sqrt());
            self.parameterization = Parameterization::MeanLongitude {
                semi_major_axis,
                mean_longitude: principal_angle(mean_longitude + n * (new_epoch - self.epoch)),
            };
        }
        self.epoch = new_epoch;
        self.at_epoch = OnceCell::new();
    }

    pub fn orbit_class(&self) -> OrbitClass {
        OrbitClass::classify(self.eccentricity)
    }

    pub fn parameterization(&self) -> &Parameterization {
        &self.parameterization
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn inclination(&self) -> Radian {
        self.inclination
    }

    /// Argument of perihelion `ω` (rad).
    pub fn periapsis_argument(&self) -> Radian {
        self.periapsis_argument
    }

    /// Longitude of the ascending node `Ω` (rad).
    pub fn ascending_node(&self) -> Radian {
        self.ascending_node
    }

    /// Longitude of perihelion `ϖ = Ω + ω`, in `[0, 2π)`.
    pub fn longitude_of_perihelion(&self) -> Radian {
        principal_angle(self.ascending_node + self.periapsis_argument)
    }

    /// Gauss vectors `(P, Q)` of the orbital plane, ecliptic J2000.
    pub fn gauss_vectors(&self) -> (&Vector3<f64>, &Vector3<f64>) {
        (&self.gauss_p, &self.gauss_q)
    }

    pub fn perihelion_distance(&self) -> AstronomicalUnit {
        match self.parameterization {
            Parameterization::MeanLongitude {
                semi_major_axis, ..
            } => semi_major_axis * (1.0 - self.eccentricity),
            Parameterization::PerihelionTime {
                perihelion_distance,
                ..
            } => perihelion_distance,
        }
    }

    /// Semi-latus rectum `p = q(1 + e)` (AU).
    pub fn semi_latus_rectum(&self) -> AstronomicalUnit {
        self.perihelion_distance() * (1.0 + self.eccentricity)
    }

    /// Semi-major axis `a` (AU): negative for a hyperbola, `None` for a parabola.
    pub fn semi_major_axis(&self) -> Option<AstronomicalUnit> {
        match self.parameterization {
            Parameterization::MeanLongitude {
                semi_major_axis, ..
            } => Some(semi_major_axis),
            Parameterization::PerihelionTime {
                perihelion_distance,
                ..
            } => (self.eccentricity != 1.0).then(|| perihelion_distance / (1.0 - self.eccentricity)),
        }
    }

    /// Semi-minor axis `b = a·√(1 − e²)` (AU), closed orbits only.
    pub fn semi_minor_axis(&self) -> Option<AstronomicalUnit> {
        let a = self.semi_major_axis()?;
        (self.eccentricity < 1.0).then(|| a * (1.0 - self.eccentricity * self.eccentricity).sqrt())
    }

    /// Aphelion distance `a(1 + e)` (AU), closed orbits only.
    pub fn aphelion_distance(&self) -> Option<AstronomicalUnit> {
        let a = self.semi_major_axis()?;
        (self.eccentricity < 1.0).then(|| a * (1.0 + self.eccentricity))
    }

    /// Mean motion `n = k / |a|^{3/2}` (rad/day); `None` for a parabola.
    pub fn mean_motion(&self) -> Option<f64> {
        self.semi_major_axis()
            .map(|a| GAUSS_GRAV / (a.abs() * a.abs().sqrt()))
    }

    /// Mean motion in degrees per day, `0.9856076686 / |a|^{3/2}`.
    pub fn mean_motion_deg(&self) -> Option<Degree> {
        self.semi_major_axis()
            .map(|a| MEAN_MOTION_DEG_PER_DAY / (a.abs() * a.abs().sqrt()))
    }

    /// Orbital period (days), closed orbits only.
    pub fn orbital_period(&self) -> Option<Days> {
        if self.eccentricity >= 1.0 {
            return None;
        }
        self.mean_motion().map(|n| DPI / n)
    }

    /// Time of perihelion passage (Julian date, TDB).
    ///
    /// For mean-longitude elements this is the passage nearest to the epoch.
    pub fn perihelion_time(&self) -> JulianDate {
        self.epoch - self.time_since_perihelion(self.epoch)
    }

    /// Signed time elapsed since perihelion passage at `t` (days).
    pub fn time_since_perihelion(&self, t: JulianDate) -> Days {
        match self.parameterization {
            Parameterization::MeanLongitude {
                semi_major_axis,
                mean_longitude,
            } => {
                let n = GAUSS_GRAV / (semi_major_axis * semi_major_axis.sqrt());
                let m0 = angle_diff(mean_longitude, self.longitude_of_perihelion());
                (t - self.epoch) + m0 / n
            }
            Parameterization::PerihelionTime {
                perihelion_time, ..
            } => t - perihelion_time,
        }
    }

    /// Mean anomaly at `t` (rad, not reduced); `None` for a parabola.
    pub fn mean_anomaly_at(&self, t: JulianDate) -> Option<Radian> {
        match self.parameterization {
            Parameterization::MeanLongitude {
                semi_major_axis,
                mean_longitude,
            } => {
                let n = GAUSS_GRAV / (semi_major_axis * semi_major_axis.sqrt());
                Some(mean_longitude - self.longitude_of_perihelion() + n * (t - self.epoch))
            }
            Parameterization::PerihelionTime {
                perihelion_time, ..
            } => self.mean_motion().map(|n| n * (t - perihelion_time)),
        }
    }

    /// Mean longitude `L = ϖ + M` at the epoch, closed orbits only.
    pub fn mean_longitude(&self) -> Option<Radian> {
        match self.parameterization {
            Parameterization::MeanLongitude { mean_longitude, .. } => Some(mean_longitude),
            Parameterization::PerihelionTime { .. } => {
                if self.eccentricity >= 1.0 {
                    return None;
                }
                let m = self.mean_anomaly_at(self.epoch)?;
                Some(principal_angle(self.longitude_of_perihelion() + m))
            }
        }
    }

    /// Perihelion passage `n` revolutions after (or before, `n < 0`) the one
    /// returned by [`OrbitalElements::perihelion_time`]; closed orbits only.
    pub fn perihelion(&self, n: i32) -> Option<JulianDate> {
        self.orbital_period()
            .map(|period| self.perihelion_time() + f64::from(n) * period)
    }

    /// Anomalies and radius at the epoch, computed once and cached.
    ///
    /// Errors
    /// ----------
    /// * [`EphemError::NumericalDivergence`] if propagation to the epoch fails.
    pub fn at_epoch(&self) -> Result<&EpochAnomalies, EphemError> {
        self.at_epoch.get_or_try_init(|| {
            let pos = position_at(self, self.epoch, &LandgrafLimits::default())?;
            Ok(EpochAnomalies {
                mean_anomaly: pos.mean_anomaly.map(principal_angle),
                eccentric_anomaly: pos.eccentric_anomaly,
                true_anomaly: pos.true_anomaly,
                radius: pos.radius,
            })
        })
    }

    /// Mean anomaly at the epoch in `[0, 2π)`; `None` for a parabola.
    pub fn mean_anomaly(&self) -> Result<Option<Radian>, EphemError> {
        Ok(self.at_epoch()?.mean_anomaly)
    }

    /// Eccentric (or hyperbolic) anomaly at the epoch; `None` for a parabola.
    pub fn eccentric_anomaly(&self) -> Result<Option<Radian>, EphemError> {
        Ok(self.at_epoch()?.eccentric_anomaly)
    }

    /// True anomaly at the epoch, in `[0, 2π)`.
    pub fn true_anomaly(&self) -> Result<Radian, EphemError> {
        Ok(self.at_epoch()?.true_anomaly)
    }

    /// Heliocentric distance at the epoch (AU).
    pub fn radius(&self) -> Result<AstronomicalUnit, EphemError> {
        Ok(self.at_epoch()?.radius)
    }
}

impl fmt::Display for OrbitalElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 1.0 / RADEG;
        writeln!(
            f,
            "{} orbit @ epoch (JD TDB): {:.6}",
            self.orbit_class(),
            self.epoch
        )?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  q   (perihelion distance)   = {:.8} AU",
            self.perihelion_distance()
        )?;
        if let Some(a) = self.semi_major_axis() {
            writeln!(f, "  a   (semi-major axis)       = {a:.8} AU")?;
        }
        if let Some(aphelion) = self.aphelion_distance() {
            writeln!(f, "  Q   (aphelion distance)     = {aphelion:.8} AU")?;
        }
        writeln!(f, "  e   (eccentricity)          = {:.8}", self.eccentricity)?;
        writeln!(
            f,
            "  i   (inclination)           = {:.8}°",
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of perihelion) = {:.8}°",
            self.periapsis_argument * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.8}°",
            self.ascending_node * rad_to_deg
        )?;
        writeln!(
            f,
            "  ϖ   (longitude of perihelion) = {:.8}°",
            self.longitude_of_perihelion() * rad_to_deg
        )?;
        if let Some(lon) = self.mean_longitude() {
            writeln!(f, "  L   (mean longitude)        = {:.8}°", lon * rad_to_deg)?;
        }
        if let Some(n) = self.mean_motion_deg() {
            writeln!(f, "  n   (mean motion)           = {n:.8}°/day")?;
        }
        if let Some(period) = self.orbital_period() {
            writeln!(f, "  P   (period)                = {period:.4} days")?;
        }
        write!(
            f,
            "  T   (perihelion, JD TDB)    = {:.6}",
            self.perihelion_time()
        )
    }
}

#[cfg(test)]
mod orbital_elements_test {
    use super::*;
    use approx::assert_relative_eq;

    fn jd(jd: f64) -> Epoch {
        epoch_from_jd_tdb(jd)
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(OrbitClass::classify(0.0), OrbitClass::Elliptic);
        assert_eq!(OrbitClass::classify(0.9799999), OrbitClass::Elliptic);
        assert_eq!(OrbitClass::classify(0.98), OrbitClass::NearParabolic);
        assert_eq!(OrbitClass::classify(0.9999999), OrbitClass::NearParabolic);
        assert_eq!(OrbitClass::classify(1.0), OrbitClass::Parabolic);
        assert_eq!(OrbitClass::classify(1.0000001), OrbitClass::Hyperbolic);
    }

    #[test]
    fn test_invalid_elements_rejected() {
        let t = jd(2_451_545.0);
        assert!(matches!(
            OrbitalElements::comet(t, 1.0, -0.1, 0.0, 0.0, 0.0, t),
            Err(EphemError::InvalidElements(_))
        ));
        assert!(matches!(
            OrbitalElements::comet(t, 0.0, 0.5, 0.0, 0.0, 0.0, t),
            Err(EphemError::InvalidElements(_))
        ));
        assert!(matches!(
            OrbitalElements::planet(t, 1.0, 1.2, 0.0, 0.0, 0.0, 0.0),
            Err(EphemError::InvalidElements(_))
        ));
        assert!(matches!(
            OrbitalElements::comet(t, 1.0, 0.5, f64::NAN, 0.0, 0.0, t),
            Err(EphemError::InvalidElements(_))
        ));
    }

    #[test]
    fn test_derived_quantities_elliptic_comet() {
        let epoch = 2_451_545.0;
        let elem = OrbitalElements::comet_jd(epoch, 1.5, 0.5, 0.1, 0.2, 0.3, epoch - 100.0).unwrap();

        assert_relative_eq!(elem.semi_major_axis().unwrap(), 3.0, max_relative = 1e-15);
        assert_relative_eq!(elem.aphelion_distance().unwrap(), 4.5, max_relative = 1e-15);
        assert_relative_eq!(
            elem.semi_minor_axis().unwrap(),
            3.0 * 0.75_f64.sqrt(),
            max_relative = 1e-15
        );
        assert_relative_eq!(elem.longitude_of_perihelion(), 0.5, max_relative = 1e-15);
        assert_relative_eq!(
            elem.mean_motion_deg().unwrap(),
            MEAN_MOTION_DEG_PER_DAY / 3.0_f64.powf(1.5),
            max_relative = 1e-14
        );
        assert_relative_eq!(
            elem.orbital_period().unwrap(),
            DPI * 3.0_f64.powf(1.5) / GAUSS_GRAV,
            max_relative = 1e-14
        );
        assert_relative_eq!(elem.time_since_perihelion(epoch), 100.0);
        assert_relative_eq!(
            elem.perihelion(1).unwrap() - elem.perihelion(0).unwrap(),
            elem.orbital_period().unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_open_orbits_have_no_period() {
        let t = jd(2_451_545.0);
        let parabola = OrbitalElements::comet(t, 1.0, 1.0, 0.0, 0.0, 0.0, t).unwrap();
        assert_eq!(parabola.semi_major_axis(), None);
        assert_eq!(parabola.mean_motion(), None);
        assert_eq!(parabola.orbital_period(), None);
        assert_eq!(parabola.perihelion(1), None);
        assert_eq!(parabola.mean_longitude(), None);

        let hyperbola = OrbitalElements::comet(t, 1.0, 1.5, 0.0, 0.0, 0.0, t).unwrap();
        assert_relative_eq!(hyperbola.semi_major_axis().unwrap(), -2.0);
        assert_eq!(hyperbola.aphelion_distance(), None);
        assert_eq!(hyperbola.orbital_period(), None);
    }

    #[test]
    fn test_planet_parameterization() {
        let epoch = 2_451_545.0;
        let (a, e) = (1.5, 0.1);
        let (lon_peri, node, mean_lon) = (1.0, 0.4, 1.3);
        let elem =
            OrbitalElements::planet(jd(epoch), a, e, 0.03, lon_peri, node, mean_lon).unwrap();

        assert_relative_eq!(elem.periapsis_argument(), 0.6, max_relative = 1e-12);
        assert_relative_eq!(elem.perihelion_distance(), 1.35, max_relative = 1e-15);
        assert_relative_eq!(elem.mean_longitude().unwrap(), 1.3, max_relative = 1e-12);

        // M = L − ϖ = 0.3 rad after perihelion
        let n = elem.mean_motion().unwrap();
        assert_relative_eq!(elem.time_since_perihelion(epoch), 0.3 / n, max_relative = 1e-9);
        assert_relative_eq!(elem.mean_anomaly().unwrap().unwrap(), 0.3, max_relative = 1e-9);
    }

    #[test]
    fn test_set_epoch_invalidates_cache() {
        let epoch = 2_451_545.0;
        let mut elem =
            OrbitalElements::comet_jd(epoch, 1.0, 0.2, 0.0, 0.0, 0.0, epoch).unwrap();
        assert_eq!(elem.true_anomaly().unwrap(), 0.0);
        assert_eq!(elem.radius().unwrap(), 1.0);

        elem.set_epoch(jd(epoch + 50.0));
        assert!(elem.true_anomaly().unwrap() > 0.0);
        assert!(elem.radius().unwrap() > 1.0);
        assert_eq!(elem.perihelion_time(), epoch);
    }

    #[test]
    fn test_set_epoch_keeps_planet_orbit() {
        let epoch = 2_451_545.0;
        let mut elem = OrbitalElements::planet(jd(epoch), 2.0, 0.1, 0.0, 0.5, 0.0, 1.0).unwrap();
        let tp = elem.perihelion_time();
        elem.set_epoch(jd(epoch + 30.0));
        approx::assert_abs_diff_eq!(elem.perihelion_time(), tp, epsilon = 1e-6);
    }

    #[test]
    fn test_display() {
        let t = jd(2_451_545.0);
        let elem = OrbitalElements::comet(t, 1.0, 0.995, 0.0, 0.0, 0.0, t).unwrap();
        let text = format!("{elem}");
        assert!(text.starts_with("near-parabolic orbit"));
        assert!(text.contains("q   (perihelion distance)   = 1.00000000 AU"));
    }
}
