//! # Tabulated planetary ephemerides
//!
//! [`TabulatedEphemeris`] is the seam through which planetary positions enter
//! the crate. A reader of a binary JPL ephemeris can implement it; the crate
//! ships [`ApproxPlanetEphemeris`], which evaluates the JPL approximate
//! Keplerian elements of [`crate::planetary_terms`] and propagates them with
//! [`crate::propagator::position_at`].
//!
//! Handles are shared as `Arc<dyn TabulatedEphemeris>`: the trait requires
//! `Send + Sync` and implementations must not mutate themselves after
//! construction.
use std::fmt;

use crate::{
    config::EphemConfig,
    constants::JulianDate,
    ephem_errors::EphemError,
    kepler::LandgrafLimits,
    light_time::{self, LightTimeSettings, LightTimeSolution},
    planetary_terms::{planet_elements, Planet},
    propagator::position_at,
    ref_system::ReferenceFrame,
    state_vector::StateVector,
};

pub trait TabulatedEphemeris: fmt::Debug + Send + Sync {
    /// Short description of the data source.
    fn name(&self) -> &str;

    /// Heliocentric ecliptic J2000 state of `body` at `t` (JD, TDB).
    fn position(&self, body: Planet, t: JulianDate) -> Result<StateVector, EphemError>;

    /// Apparent (light-time corrected) vector from `center` to `target` at `t`.
    ///
    /// The default implementation iterates [`light_time::solve`] over
    /// [`TabulatedEphemeris::position`]; readers with their own apparent-place
    /// routine override it.
    fn observe(
        &self,
        target: Planet,
        center: Planet,
        t: JulianDate,
        config: &EphemConfig,
    ) -> Result<LightTimeSolution, EphemError> {
        light_time::solve(
            |te| self.position(target, te),
            |tc| self.position(center, tc),
            t,
            &LightTimeSettings::from(config),
        )
    }
}

/// Planet positions from the JPL approximate Keplerian elements (Standish).
///
/// Accuracy is at the level of arc-minutes for the inner planets over
/// 1800–2050 and degrades outside it; valid from 3000 BC to 3000 AD.
#[derive(Debug, Clone, Default)]
pub struct ApproxPlanetEphemeris {
    limits: LandgrafLimits,
}

impl ApproxPlanetEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propagate the planetary elements with the given Landgraf limits.
    pub fn with_limits(limits: LandgrafLimits) -> Self {
        ApproxPlanetEphemeris { limits }
    }

    pub fn limits(&self) -> &LandgrafLimits {
        &self.limits
    }
}

impl TabulatedEphemeris for ApproxPlanetEphemeris {
    fn name(&self) -> &str {
        "JPL approximate planetary elements"
    }

    fn position(&self, body: Planet, t: JulianDate) -> Result<StateVector, EphemError> {
        if body == Planet::Sun {
            return Ok(StateVector::origin(ReferenceFrame::EclipticJ2000, t));
        }
        let elements = planet_elements(body, t)?;
        Ok(position_at(&elements, t, &self.limits)?.state)
    }
}

#[cfg(test)]
mod jpl_ephem_test {
    use super::*;
    use crate::constants::J2000_JD;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sun_is_origin() {
        let eph = ApproxPlanetEphemeris::new();
        let sun = eph.position(Planet::Sun, J2000_JD).unwrap();
        assert_eq!(sun.distance(), 0.0);
    }

    #[test]
    fn test_earth_near_one_au() {
        let eph = ApproxPlanetEphemeris::new();
        let earth = eph.position(Planet::Earth, J2000_JD).unwrap();
        assert!((earth.distance() - 1.0).abs() < 0.02);
        // EM barycenter stays in the ecliptic
        assert!(earth.position.z.abs() < 1e-5);

        // at J2000.0 the Earth is at heliocentric longitude ≈ 100.4°
        let lon = earth.position.y.atan2(earth.position.x).to_degrees();
        assert_abs_diff_eq!(lon, 100.4, epsilon = 0.5);
    }

    #[test]
    fn test_observe_sun_from_earth() {
        let eph = ApproxPlanetEphemeris::new();
        let sol = eph
            .observe(Planet::Sun, Planet::Earth, J2000_JD, &EphemConfig::default())
            .unwrap();
        // about 8.2 minutes
        assert_abs_diff_eq!(sol.light_time * 1440.0, 8.2, epsilon = 0.2);
    }

    #[test]
    fn test_limits_are_carried() {
        let limits = LandgrafLimits {
            tolerance: 1e-11,
            max_terms: 80,
            max_iterations: 20,
        };
        let eph = ApproxPlanetEphemeris::with_limits(limits);
        assert_eq!(eph.limits(), &limits);
        assert_eq!(ApproxPlanetEphemeris::new().limits(), &LandgrafLimits::default());
    }

    #[test]
    fn test_out_of_range_date() {
        let eph = ApproxPlanetEphemeris::new();
        let res = eph.position(Planet::Mars, J2000_JD + 1500.0 * 365.25);
        assert!(matches!(res, Err(EphemError::DateOutOfRange { .. })));
    }
}
