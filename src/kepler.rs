//! # Kepler-equation and time-of-flight solvers
//!
//! Scalar numerics shared by the orbit propagator:
//!
//! - [`solve_kepler_elliptic`] – Newton iteration on `M = E − e·sin E` (`e < 1`).
//! - [`true_anomaly_from_eccentric`] – `E → ν` on an ellipse.
//! - [`landgraf`] – universal time-of-flight solver for near-parabolic and
//!   hyperbolic orbits, parameterized by perihelion distance and time since
//!   perihelion.
//! - [`solve_parabolic`] – closed-form (Barker) solution for `e = 1`.
//!
//! All angles are in radians, distances in AU and times in days.
use std::f64::consts::PI;

use log::debug;

use crate::{
    constants::{AstronomicalUnit, Days, Radian, DPI, GAUSS_GRAV},
    ephem_errors::EphemError,
};

/// Hard cap on the elliptic Newton loop. Convergence is quadratic for `e < 1`,
/// so reaching it means the inputs were not finite.
const KEPLER_MAX_ITER: usize = 100;

/// Principal value of an angle, in `[0, 2π)`.
pub fn principal_angle(a: f64) -> f64 {
    a.rem_euclid(DPI)
}

/// Difference `a − b` reduced to `[-π, π]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let mut diff = principal_angle(a) - principal_angle(b);

    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }

    diff
}

/// Solve Kepler's equation `M = E − e·sin E` for the eccentric anomaly.
///
/// Newton iteration seeded with `E₀ = M + e·sin M`, stopped when the
/// correction is at machine precision. The mean anomaly is first reduced to
/// `(-π, π]` and the removed multiple of `2π` is added back to the result, so
/// the returned `E` satisfies Kepler's equation for the *unreduced* `M`.
///
/// Arguments
/// -----------------
/// * `mean_anomaly` – Mean anomaly `M` (rad, any value).
/// * `e` – Eccentricity, `0 ≤ e < 1`.
///
/// Return
/// ----------
/// * Eccentric anomaly `E` (rad).
///
/// Errors
/// ----------
/// * [`EphemError::InvalidElements`] if `e` is outside `[0, 1)`.
/// * [`EphemError::NumericalDivergence`] if the iteration produces a non-finite
///   value or does not settle within its cap.
pub fn solve_kepler_elliptic(mean_anomaly: Radian, e: f64) -> Result<Radian, EphemError> {
    if !(0.0..1.0).contains(&e) {
        return Err(EphemError::InvalidElements(format!(
            "elliptic Kepler equation requires 0 <= e < 1, got {e}"
        )));
    }
    if !mean_anomaly.is_finite() {
        return Err(EphemError::divergence("elliptic Kepler solver", 0));
    }

    let reduced = angle_diff(mean_anomaly, 0.0);
    let offset = mean_anomaly - reduced;

    let mut ecc_anomaly = reduced + e * reduced.sin();
    let mut last_step = f64::INFINITY;

    for iter in 1..=KEPLER_MAX_ITER {
        let step = (reduced - (ecc_anomaly - e * ecc_anomaly.sin())) / (1.0 - e * ecc_anomaly.cos());
        ecc_anomaly += step;

        if !ecc_anomaly.is_finite() {
            return Err(EphemError::divergence("elliptic Kepler solver", iter));
        }

        let step = step.abs();
        // machine precision reached, or rounding noise no longer shrinks
        if step <= f64::EPSILON * ecc_anomaly.abs().max(1.0) || (step >= last_step && step < 1e-12)
        {
            return Ok(ecc_anomaly + offset);
        }
        last_step = step;
    }

    Err(EphemError::divergence("elliptic Kepler solver", KEPLER_MAX_ITER))
}

/// True anomaly from the eccentric anomaly on an ellipse,
/// `tan(ν/2) = sqrt((1+e)/(1−e))·tan(E/2)`, normalized to `[0, 2π)`.
pub fn true_anomaly_from_eccentric(ecc_anomaly: Radian, e: f64) -> Radian {
    let half = 0.5 * ecc_anomaly;
    principal_angle(2.0 * ((1.0 + e).sqrt() * half.sin()).atan2((1.0 - e).sqrt() * half.cos()))
}

/// Tolerance and caps of the Landgraf iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandgrafLimits {
    /// Absolute tolerance on series terms and on the auxiliary variable `s`.
    pub tolerance: f64,
    /// Maximum number of series terms per outer iteration.
    pub max_terms: usize,
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
}

impl Default for LandgrafLimits {
    fn default() -> Self {
        LandgrafLimits {
            tolerance: 1e-9,
            max_terms: 50,
            max_iterations: 50,
        }
    }
}

/// Series terms larger than this mean the expansion in `g·s²` diverges.
const LANDGRAF_TERM_OVERFLOW: f64 = 1e4;

/// Universal time-of-flight solver (Landgraf) for `e ≥ 0.98`.
///
/// Solves for the auxiliary variable `s = tan(ν/2)` given the perihelion
/// distance, eccentricity and time since perihelion. Starts from the parabolic
/// solution and corrects it with a series in `g = (1−e)/(1+e)`; for `e = 1`
/// the correction vanishes and the parabolic start value is returned.
///
/// Arguments
/// -----------------
/// * `q` – Perihelion distance (AU, > 0).
/// * `e` – Eccentricity.
/// * `tau` – Time since perihelion passage (days, signed).
/// * `limits` – Tolerance and iteration caps.
///
/// Return
/// ----------
/// * `(ν, r)`: true anomaly in `[0, 2π)` and heliocentric distance (AU).
///   At `tau = 0` exactly, `(0, q)`.
///
/// Errors
/// ----------
/// * [`EphemError::NumericalDivergence`] if the series needs more than
///   `max_terms` terms, a term overflows, or the outer loop exceeds
///   `max_iterations`.
pub fn landgraf(
    q: AstronomicalUnit,
    e: f64,
    tau: Days,
    limits: &LandgrafLimits,
) -> Result<(Radian, AstronomicalUnit), EphemError> {
    if tau == 0.0 {
        return Ok((0.0, q));
    }

    let d = limits.tolerance;
    let q1 = GAUSS_GRAV * ((1.0 + e) / q).sqrt() / (2.0 * q);
    let g = (1.0 - e) / (1.0 + e);
    let q2 = q1 * tau;

    // parabolic start value
    let s = 2.0 / (3.0 * q2.abs());
    let mut s = 2.0 / (2.0 * ((s.atan() / 2.0).tan().cbrt()).atan()).tan();
    if tau < 0.0 {
        s = -s;
    }

    if e != 1.0 {
        let mut outer = 0;
        loop {
            let s0 = s;
            let y = s * s;
            let mut g1 = -y * s;
            let mut q3 = q2 + 2.0 * g * s * y / 3.0;

            let mut z = 1.0;
            loop {
                z += 1.0;
                g1 = -g1 * g * y;
                let z1 = (z - (z + 1.0) * g) / (2.0 * z + 1.0);
                let f = z1 * g1;
                q3 += f;

                if z > limits.max_terms as f64 || f.abs() > LANDGRAF_TERM_OVERFLOW || !f.is_finite()
                {
                    return Err(EphemError::divergence("Landgraf series", z as usize));
                }
                if f.abs() <= d {
                    break;
                }
            }

            outer += 1;
            if outer > limits.max_iterations {
                return Err(EphemError::divergence("Landgraf iteration", outer));
            }

            let mut inner = 0;
            loop {
                let s1 = s;
                s = (2.0 * s * s * s / 3.0 + q3) / (s * s + 1.0);
                inner += 1;
                if (s - s1).abs() <= d {
                    break;
                }
                if inner > limits.max_iterations || !s.is_finite() {
                    return Err(EphemError::divergence("Landgraf s iteration", inner));
                }
            }

            if (s - s0).abs() <= d {
                break;
            }
        }
        debug!("Landgraf converged in {outer} outer iterations (e = {e}, tau = {tau})");
    }

    let nu = principal_angle(2.0 * s.atan());
    let r = q * (1.0 + e) / (1.0 + e * nu.cos());
    if !r.is_finite() || r <= 0.0 {
        return Err(EphemError::divergence("Landgraf iteration", 0));
    }
    Ok((nu, r))
}

/// Closed-form solution of the parabolic (`e = 1`) time-of-flight equation.
///
/// Barker's equation `s³ + 3s = W`, with `W = 3k/√2 · τ / q^{3/2}` and
/// `s = tan(ν/2)`, solved as `s = 2·sinh(asinh(W/2)/3)`.
///
/// Return
/// ----------
/// * `(ν, r)` with `ν ∈ [0, 2π)` and `r = q(1 + s²)`.
pub fn solve_parabolic(q: AstronomicalUnit, tau: Days) -> (Radian, AstronomicalUnit) {
    if tau == 0.0 {
        return (0.0, q);
    }
    let w = 3.0 * GAUSS_GRAV / std::f64::consts::SQRT_2 / (q * q.sqrt()) * tau;
    let s = 2.0 * ((0.5 * w).asinh() / 3.0).sinh();

    (principal_angle(2.0 * s.atan()), q * (1.0 + s * s))
}

/// Mean and eccentric (or hyperbolic) anomaly matching a true anomaly.
///
/// * `e < 1`: `E = 2·atan2(√(1−e)·sin(ν/2), √(1+e)·cos(ν/2))`, `M = E − e·sin E`,
///   both in `[0, 2π)`.
/// * `e > 1`: `tanh(H/2) = √((e−1)/(e+1))·tan(ν/2)`, `M = e·sinh H − H`, signed.
/// * `e = 1`: no mean or eccentric anomaly is defined, returns `None`.
///
/// Also returns `None` when `ν` lies beyond the asymptotes of a hyperbola.
pub fn anomalies_from_true(true_anomaly: Radian, e: f64) -> Option<(Radian, Radian)> {
    let half = 0.5 * angle_diff(true_anomaly, 0.0);

    if e < 1.0 {
        let ecc_anomaly = principal_angle(
            2.0 * ((1.0 - e).sqrt() * half.sin()).atan2((1.0 + e).sqrt() * half.cos()),
        );
        let mean_anomaly = ecc_anomaly - e * ecc_anomaly.sin();
        Some((mean_anomaly, ecc_anomaly))
    } else if e > 1.0 {
        let h = 2.0 * (((e - 1.0) / (e + 1.0)).sqrt() * half.tan()).atanh();
        if !h.is_finite() {
            return None;
        }
        Some((e * h.sinh() - h, h))
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) mod kepler_test {
    use super::*;
    use crate::constants::GAUSS_GRAV_SQUARED;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    /// Reference hyperbolic solution through `M = e·sinh H − H`.
    pub(crate) fn hyperbolic_reference(q: f64, e: f64, tau: f64) -> (f64, f64) {
        let a = q / (e - 1.0);
        let n = (GAUSS_GRAV_SQUARED / (a * a * a)).sqrt();
        let m = n * tau;
        let mut h = (2.0 * m / e).asinh();
        for _ in 0..100 {
            let dh = (e * h.sinh() - h - m) / (e * h.cosh() - 1.0);
            h -= dh;
            if dh.abs() < 1e-15 {
                break;
            }
        }
        let nu = 2.0 * (((e + 1.0) / (e - 1.0)).sqrt() * (0.5 * h).tanh()).atan();
        (principal_angle(nu), a * (e * h.cosh() - 1.0))
    }

    #[test]
    fn test_principal_angle() {
        assert_eq!(principal_angle(-PI / 2.0), 1.5 * PI);
        assert_eq!(principal_angle(DPI), 0.0);
        assert_abs_diff_eq!(angle_diff(0.1, DPI - 0.1), 0.2, epsilon = 1e-15);
        assert_abs_diff_eq!(angle_diff(DPI - 0.1, 0.1), -0.2, epsilon = 1e-15);
    }

    #[test]
    fn test_kepler_circular() {
        let e_anom = solve_kepler_elliptic(1.234, 0.0).unwrap();
        assert_abs_diff_eq!(e_anom, 1.234, epsilon = 1e-15);
    }

    #[test]
    fn test_kepler_rejects_bad_eccentricity() {
        assert!(matches!(
            solve_kepler_elliptic(1.0, -0.1),
            Err(EphemError::InvalidElements(_))
        ));
        assert!(matches!(
            solve_kepler_elliptic(1.0, 1.0),
            Err(EphemError::InvalidElements(_))
        ));
    }

    #[test]
    fn test_kepler_non_finite_mean_anomaly() {
        assert!(matches!(
            solve_kepler_elliptic(f64::NAN, 0.5),
            Err(EphemError::NumericalDivergence { .. })
        ));
    }

    #[test]
    fn test_true_anomaly_quadrants() {
        assert_abs_diff_eq!(true_anomaly_from_eccentric(0.0, 0.5), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(true_anomaly_from_eccentric(PI, 0.5), PI, epsilon = 1e-12);
        // E slightly past π stays on the inbound half
        assert!(true_anomaly_from_eccentric(PI + 0.1, 0.3) > PI);
    }

    #[test]
    fn test_landgraf_at_perihelion() {
        let limits = LandgrafLimits::default();
        assert_eq!(landgraf(0.5, 0.99, 0.0, &limits).unwrap(), (0.0, 0.5));
        assert_eq!(solve_parabolic(0.5, 0.0), (0.0, 0.5));
    }

    #[test]
    fn test_landgraf_matches_elliptic_solution() {
        let limits = LandgrafLimits::default();
        let (q, e) = (1.2, 0.985);
        let a = q / (1.0 - e);
        let n = (GAUSS_GRAV_SQUARED / (a * a * a)).sqrt();

        for tau in [-60.0, -5.0, 3.0, 45.0, 120.0] {
            let (nu, r) = landgraf(q, e, tau, &limits).unwrap();
            let ecc = solve_kepler_elliptic(n * tau, e).unwrap();
            let nu_ref = true_anomaly_from_eccentric(ecc, e);
            let r_ref = a * (1.0 - e * ecc.cos());

            assert_abs_diff_eq!(angle_diff(nu, nu_ref), 0.0, epsilon = 1e-7);
            assert_abs_diff_eq!(r, r_ref, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_landgraf_matches_hyperbolic_solution() {
        let limits = LandgrafLimits::default();
        let (q, e) = (0.8, 1.05);
        for tau in [-40.0, 10.0, 80.0] {
            let (nu, r) = landgraf(q, e, tau, &limits).unwrap();
            let (nu_ref, r_ref) = hyperbolic_reference(q, e, tau);
            assert_abs_diff_eq!(angle_diff(nu, nu_ref), 0.0, epsilon = 1e-7);
            assert_abs_diff_eq!(r, r_ref, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_parabolic_matches_landgraf_start_value() {
        let limits = LandgrafLimits::default();
        for tau in [-100.0, -1.0, 2.5, 30.0, 400.0] {
            let (nu, r) = solve_parabolic(1.0, tau);
            let (nu_l, r_l) = landgraf(1.0, 1.0, tau, &limits).unwrap();
            assert_abs_diff_eq!(angle_diff(nu, nu_l), 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(r, r_l, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_parabolic_barker_equation() {
        let (q, tau) = (0.7, 25.0);
        let (nu, _) = solve_parabolic(q, tau);
        let s = (0.5 * nu).tan();
        let w = 3.0 * GAUSS_GRAV / std::f64::consts::SQRT_2 / (q * q.sqrt()) * tau;
        assert_abs_diff_eq!(s * s * s + 3.0 * s, w, epsilon = 1e-12);
    }

    #[test]
    fn test_landgraf_diverges_far_on_hyperbola() {
        // g·s² far outside the series radius
        let limits = LandgrafLimits::default();
        let res = landgraf(0.1, 3.0, 5000.0, &limits);
        assert!(matches!(res, Err(EphemError::NumericalDivergence { .. })));
    }

    #[test]
    fn test_landgraf_term_cap() {
        // g·s² ≈ 0.01: the series needs several terms to reach 1e-9
        let tight = LandgrafLimits {
            max_terms: 3,
            ..LandgrafLimits::default()
        };
        let res = landgraf(1.0, 0.98, 100.0, &tight);
        assert!(matches!(
            res,
            Err(EphemError::NumericalDivergence {
                solver: "Landgraf series",
                ..
            })
        ));
        assert!(landgraf(1.0, 0.98, 100.0, &LandgrafLimits::default()).is_ok());
    }

    #[test]
    fn test_anomalies_from_true() {
        let e = 0.4;
        let ecc = solve_kepler_elliptic(2.0, e).unwrap();
        let nu = true_anomaly_from_eccentric(ecc, e);
        let (m, ecc_back) = anomalies_from_true(nu, e).unwrap();
        assert_abs_diff_eq!(ecc_back, ecc, epsilon = 1e-12);
        assert_abs_diff_eq!(m, 2.0, epsilon = 1e-12);

        assert_eq!(anomalies_from_true(0.3, 1.0), None);

        // inbound leg of a hyperbola gives a negative mean anomaly
        let (m_h, h) = anomalies_from_true(-0.5, 1.5).unwrap();
        assert!(m_h < 0.0 && h < 0.0);
        assert_abs_diff_eq!(m_h, 1.5 * h.sinh() - h, epsilon = 1e-15);

        // beyond the asymptote (ν∞ = acos(−1/e) ≈ 131.8° for e = 1.5)
        assert_eq!(anomalies_from_true(2.5, 1.5), None);
    }

    proptest! {
        #[test]
        fn prop_kepler_equation_residual(e in 0.0f64..=0.95, m in -50.0f64..50.0) {
            let ecc = solve_kepler_elliptic(m, e).unwrap();
            prop_assert!((ecc - e * ecc.sin() - m).abs() < 1e-9);
        }
    }
}
