#![allow(dead_code)]

use std::sync::Arc;

use approx::assert_relative_eq;
use ephemkit::bodies::Body;
use ephemkit::constants::J2000_JD;
use ephemkit::jpl_ephem::{ApproxPlanetEphemeris, TabulatedEphemeris};
use ephemkit::orbit_type::cometary_element::CometaryElements;
use ephemkit::orbit_type::OrbitalElements;
use ephemkit::planetary_terms::Planet;

/// Shared planetary ephemeris for the integration tests.
pub fn approx_ephemeris() -> Arc<dyn TabulatedEphemeris> {
    Arc::new(ApproxPlanetEphemeris::new())
}

pub fn planet(p: Planet) -> Body {
    Body::planet(p, approx_ephemeris())
}

/// Comet elements with perihelion passage at J2000.0.
pub fn comet(q: f64, e: f64, i_deg: f64, peri_deg: f64, node_deg: f64) -> OrbitalElements {
    OrbitalElements::comet_jd(
        J2000_JD,
        q,
        e,
        i_deg.to_radians(),
        peri_deg.to_radians(),
        node_deg.to_radians(),
        J2000_JD,
    )
    .unwrap()
}

/// Compare the shape and orientation of a reconstructed element set.
pub fn assert_shape_close(actual: &CometaryElements, expected: &OrbitalElements, max_relative: f64) {
    assert_relative_eq!(
        actual.perihelion_distance,
        expected.perihelion_distance(),
        max_relative = max_relative
    );
    assert_relative_eq!(
        actual.eccentricity,
        expected.eccentricity(),
        max_relative = max_relative
    );
    assert_relative_eq!(
        actual.inclination,
        expected.inclination(),
        max_relative = max_relative
    );
}
