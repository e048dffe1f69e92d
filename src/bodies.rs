//! # Solar-system bodies
//!
//! A [`Body`] is either a planet served by a [`TabulatedEphemeris`] or a body
//! described by [`OrbitalElements`]. Both answer [`PositionProvider::position_at`]
//! with a heliocentric ecliptic J2000 [`StateVector`].
use std::{fmt, sync::Arc};

use crate::{
    constants::JulianDate,
    ephem_errors::EphemError,
    jpl_ephem::TabulatedEphemeris,
    kepler::LandgrafLimits,
    orbit_type::OrbitalElements,
    planetary_terms::Planet,
    propagator::position_at,
    state_vector::StateVector,
};

/// Anything that can report its heliocentric state at a given time.
pub trait PositionProvider {
    /// Heliocentric ecliptic J2000 state at `t` (JD, TDB).
    fn position_at(&self, t: JulianDate) -> Result<StateVector, EphemError>;
}

/// A body propagated from its orbital elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBody {
    pub name: String,
    pub elements: OrbitalElements,
    pub limits: LandgrafLimits,
}

#[derive(Debug, Clone)]
pub enum Body {
    TabulatedPlanet {
        planet: Planet,
        ephemeris: Arc<dyn TabulatedEphemeris>,
    },
    OrbitalElementBody(ElementBody),
}

impl Body {
    pub fn planet(planet: Planet, ephemeris: Arc<dyn TabulatedEphemeris>) -> Self {
        Body::TabulatedPlanet { planet, ephemeris }
    }

    pub fn from_elements(name: impl Into<String>, elements: OrbitalElements) -> Self {
        Body::OrbitalElementBody(ElementBody {
            name: name.into(),
            elements,
            limits: LandgrafLimits::default(),
        })
    }

    /// Replace the Landgraf limits of an element body; no effect on planets.
    pub fn with_landgraf_limits(mut self, new_limits: LandgrafLimits) -> Self {
        if let Body::OrbitalElementBody(ElementBody { limits, .. }) = &mut self {
            *limits = new_limits;
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            Body::TabulatedPlanet { planet, .. } => planet.name(),
            Body::OrbitalElementBody(body) => &body.name,
        }
    }

    /// The planet behind a tabulated body.
    pub fn as_planet(&self) -> Option<Planet> {
        match self {
            Body::TabulatedPlanet { planet, .. } => Some(*planet),
            Body::OrbitalElementBody(_) => None,
        }
    }

    pub fn is_tabulated(&self) -> bool {
        self.as_planet().is_some()
    }
}

impl PositionProvider for Body {
    fn position_at(&self, t: JulianDate) -> Result<StateVector, EphemError> {
        match self {
            Body::TabulatedPlanet { planet, ephemeris } => ephemeris.position(*planet, t),
            Body::OrbitalElementBody(body) => {
                Ok(position_at(&body.elements, t, &body.limits)?.state)
            }
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::TabulatedPlanet { planet, ephemeris } => {
                write!(f, "{planet} ({})", ephemeris.name())
            }
            Body::OrbitalElementBody(body) => {
                write!(f, "{} ({} orbit)", body.name, body.elements.orbit_class())
            }
        }
    }
}

#[cfg(test)]
mod bodies_test {
    use super::*;
    use crate::{constants::J2000_JD, jpl_ephem::ApproxPlanetEphemeris};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_body_dispatch() {
        let eph: Arc<dyn TabulatedEphemeris> = Arc::new(ApproxPlanetEphemeris::new());
        let earth = Body::planet(Planet::Earth, eph);
        assert_eq!(earth.name(), "Earth");
        assert!(earth.is_tabulated());
        assert!(earth.position_at(J2000_JD).unwrap().distance() > 0.98);

        let elements =
            OrbitalElements::comet_jd(J2000_JD, 0.5, 1.0, 0.0, 0.0, 0.0, J2000_JD).unwrap();
        let comet = Body::from_elements("C/Test", elements);
        assert_eq!(comet.as_planet(), None);
        assert_abs_diff_eq!(comet.position_at(J2000_JD).unwrap().distance(), 0.5, epsilon = 1e-15);
        assert_eq!(comet.to_string(), "C/Test (parabolic orbit)");
    }
}
