mod common;

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use ephemkit::constants::J2000_JD;
use ephemkit::kepler::{angle_diff, landgraf, solve_kepler_elliptic, LandgrafLimits};
use ephemkit::orbit_type::cometary_element::CometaryElements;
use ephemkit::orbit_type::{OrbitClass, OrbitalElements};
use ephemkit::propagator::position_at;

use crate::common::{assert_shape_close, comet};

#[test]
fn test_state_round_trip_every_class() {
    let limits = LandgrafLimits::default();
    let cases = [
        (OrbitClass::Elliptic, comet(1.3, 0.25, 12.0, 40.0, 80.0), 150.0),
        (OrbitClass::NearParabolic, comet(0.6, 0.99, 35.0, 200.0, 15.0), 50.0),
        (OrbitClass::Parabolic, comet(0.9, 1.0, 120.0, 10.0, 300.0), -75.0),
        (OrbitClass::Hyperbolic, comet(0.8, 1.05, 60.0, 95.0, 170.0), 60.0),
    ];

    for (class, elements, dt) in cases {
        assert_eq!(elements.orbit_class(), class);
        let pos = position_at(&elements, J2000_JD + dt, &limits).unwrap();
        let back = CometaryElements::from_state(&pos.state).unwrap();
        assert_shape_close(&back, &elements, 1e-6);
        assert_abs_diff_eq!(angle_diff(back.true_anomaly, pos.true_anomaly), 0.0, epsilon = 1e-6);

        // and the reconstructed set propagates back to the same place
        let again = back.to_orbital_elements().unwrap();
        let pos_again = position_at(&again, J2000_JD + dt, &limits).unwrap();
        assert_abs_diff_eq!(
            (pos_again.state.position - pos.state.position).norm(),
            0.0,
            epsilon = 1e-8
        );
    }
}

#[test]
fn test_perihelion_for_every_class() {
    let limits = LandgrafLimits::default();
    for e in [0.0, 0.5, 0.98, 0.999, 1.0, 1.3] {
        let elements = comet(0.7, e, 20.0, 30.0, 40.0);
        let pos = position_at(&elements, J2000_JD, &limits).unwrap();
        assert_abs_diff_eq!(pos.true_anomaly, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pos.radius, 0.7, epsilon = 1e-12);
    }
}

#[test]
fn test_branch_routing_at_boundaries() {
    let limits = LandgrafLimits::default();
    let t = J2000_JD + 20.0;

    let at_bound = comet(1.0, 0.98, 0.0, 0.0, 0.0);
    assert_eq!(at_bound.orbit_class(), OrbitClass::NearParabolic);
    let pos = position_at(&at_bound, t, &limits).unwrap();
    let (nu, r) = landgraf(1.0, 0.98, 20.0, &limits).unwrap();
    assert_abs_diff_eq!(pos.true_anomaly, nu, epsilon = 1e-15);
    assert_abs_diff_eq!(pos.radius, r, epsilon = 1e-15);

    let parabola = comet(1.0, 1.0, 0.0, 0.0, 0.0);
    assert_eq!(parabola.orbit_class(), OrbitClass::Parabolic);
    let pos = position_at(&parabola, t, &limits).unwrap();
    assert_eq!(pos.mean_anomaly, None);
    assert_eq!(pos.eccentric_anomaly, None);

    let just_below = comet(1.0, 0.98 - 1e-12, 0.0, 0.0, 0.0);
    assert_eq!(just_below.orbit_class(), OrbitClass::Elliptic);
}

#[test]
fn test_comet_outbound_leg() {
    let elements = comet(1.0, 0.995, 0.0, 0.0, 0.0);
    let pos = position_at(&elements, J2000_JD + 30.0, &LandgrafLimits::default()).unwrap();
    assert!(pos.radius > 1.0);
    assert!(pos.true_anomaly > 0.0 && pos.true_anomaly < PI);
}

#[test]
fn test_planet_parameterization() {
    // a = 2 AU, e = 0.1, perihelion longitude 50°, mean longitude 80° at epoch
    let elements = OrbitalElements::planet_jd(
        J2000_JD,
        2.0,
        0.1,
        5f64.to_radians(),
        50f64.to_radians(),
        20f64.to_radians(),
        80f64.to_radians(),
    )
    .unwrap();
    let pos = position_at(&elements, J2000_JD, &LandgrafLimits::default()).unwrap();

    let m = pos.mean_anomaly.unwrap();
    assert_abs_diff_eq!(m.rem_euclid(2.0 * PI), 30f64.to_radians(), epsilon = 1e-12);
    let ecc = solve_kepler_elliptic(m, 0.1).unwrap();
    assert_abs_diff_eq!(pos.radius, 2.0 * (1.0 - 0.1 * ecc.cos()), epsilon = 1e-12);

    // one full period later the body is back
    let period = elements.orbital_period().unwrap();
    let later = position_at(&elements, J2000_JD + period, &LandgrafLimits::default()).unwrap();
    assert_abs_diff_eq!(
        (later.state.position - pos.state.position).norm(),
        0.0,
        epsilon = 1e-9
    );
}
