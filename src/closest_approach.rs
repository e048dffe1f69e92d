//! # Closest approach between two bodies
//!
//! Derivative-free search for the minimum of a separation function `f(t)` on
//! an interval. Each refinement samples `f` at five evenly spaced points of
//! the current bracket (ends included), fits the five-point interpolating
//! polynomial ([`Interp5`]) and locates its extremum. The candidate is
//! accepted when the fourth difference of the samples is below a threshold,
//! the candidate lies inside the bracket, the polynomial curves upward there
//! and the separation at the candidate is no larger than any sample; otherwise
//! the bracket shrinks to one sample spacing on each side of the smallest
//! sample.
//!
//! When the refinement budget runs out the best sample seen so far is
//! returned with [`ConvergenceStatus::Degraded`] instead of an error.
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    config::{EphemConfig, APPROACH_SAMPLES},
    constants::{AstronomicalUnit, JulianDate},
    ephem_errors::EphemError,
};

/// Maximum iterations of the extremum fixed point inside one bracket.
const EXTREMUM_MAX_ITER: usize = 50;

/// Five-point interpolation on equally spaced abscissae
/// `x₃ + n·h`, `n ∈ {−2, −1, 0, 1, 2}` (Meeus, *Astronomical Algorithms*, ch. 3).
#[derive(Debug, Clone, PartialEq)]
pub struct Interp5 {
    /// Central abscissa `x₃`.
    pub center: f64,
    /// Spacing `h`.
    pub step: f64,
    /// Samples `y₁ … y₅`.
    pub y: [f64; 5],
}

/// Successive differences of the five samples.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Differences {
    b: f64,
    c: f64,
    f: f64,
    h: f64,
    j: f64,
    k: f64,
}

impl Interp5 {
    pub fn new(center: f64, step: f64, y: [f64; 5]) -> Self {
        Interp5 { center, step, y }
    }

    fn differences(&self) -> Differences {
        let [y1, y2, y3, y4, y5] = self.y;
        let (a, b, c, d) = (y2 - y1, y3 - y2, y4 - y3, y5 - y4);
        let (e, f, g) = (b - a, c - b, d - c);
        let (h, j) = (f - e, g - f);
        Differences {
            b,
            c,
            f,
            h,
            j,
            k: j - h,
        }
    }

    /// Fourth difference `K` of the samples.
    pub fn fourth_difference(&self) -> f64 {
        self.differences().k
    }

    /// Value of the interpolating polynomial at `x₃ + n·h`.
    pub fn interpolate(&self, n: f64) -> f64 {
        let d = self.differences();
        let n2 = n * n;
        self.y[2]
            + 0.5 * n * (d.b + d.c)
            + 0.5 * n2 * d.f
            + n * (n2 - 1.0) / 12.0 * (d.h + d.j)
            + n2 * (n2 - 1.0) / 24.0 * d.k
    }

    /// Second derivative `d²y/dx²` of the interpolating polynomial at `x₃ + n·h`.
    pub fn curvature(&self, n: f64) -> f64 {
        let d = self.differences();
        (d.f + 0.5 * n * (d.h + d.j) + (6.0 * n * n - 1.0) / 12.0 * d.k) / (self.step * self.step)
    }

    /// Interpolating factor `n` of the extremum nearest to the center.
    ///
    /// Iterates `n = (6B + 6C − H − J + 3n²(H + J) + 2n³K) / (K − 12F)` from
    /// `n = 0`. Returns `None` when the iteration produces a non-finite value
    /// or does not settle.
    pub fn extremum(&self) -> Option<f64> {
        let d = self.differences();
        let denom = d.k - 12.0 * d.f;
        let mut n = 0.0_f64;

        for _ in 0..EXTREMUM_MAX_ITER {
            let n2 = n * n;
            let next = (6.0 * d.b + 6.0 * d.c - d.h - d.j
                + 3.0 * n2 * (d.h + d.j)
                + 2.0 * n2 * n * d.k)
                / denom;
            if !next.is_finite() {
                return None;
            }
            if (next - n).abs() <= 1e-12 {
                return Some(next);
            }
            n = next;
        }
        None
    }

    /// Abscissa of [`Interp5::extremum`].
    pub fn extremum_abscissa(&self) -> Option<f64> {
        self.extremum().map(|n| self.center + n * self.step)
    }
}

/// Whether the search met its convergence test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    Converged,
    /// Budget exhausted; the result is the best sample and should be treated
    /// as approximate.
    Degraded,
}

/// Outcome of [`find_closest_approach`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestApproach {
    /// Time of minimum separation (JD, TDB).
    pub time: JulianDate,
    /// Separation at `time`, evaluated directly (AU).
    pub distance: AstronomicalUnit,
    /// Bracket refinements performed.
    pub iterations: usize,
    pub status: ConvergenceStatus,
}

impl ClosestApproach {
    pub fn is_converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }
}

/// Refinement budget and acceptance threshold of the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachSettings {
    /// Samples per bracket; the interpolation needs exactly five.
    pub samples: usize,
    pub max_iterations: usize,
    pub curvature_threshold: f64,
}

impl Default for ApproachSettings {
    fn default() -> Self {
        ApproachSettings::from(&EphemConfig::default())
    }
}

impl From<&EphemConfig> for ApproachSettings {
    fn from(config: &EphemConfig) -> Self {
        ApproachSettings {
            samples: config.approach_samples,
            max_iterations: config.approach_max_iterations,
            curvature_threshold: config.approach_curvature_threshold,
        }
    }
}

/// Time and value of the minimum of `separation` on `[t_lo, t_hi]`.
///
/// Arguments
/// -----------------
/// * `separation` – Distance between the two bodies at a given time (AU).
/// * `t_lo`, `t_hi` – Search interval (JD, TDB), `t_lo < t_hi`.
/// * `settings` – Refinement budget and threshold on the fourth difference.
///
/// Return
/// ----------
/// * A [`ClosestApproach`]; its `status` is [`ConvergenceStatus::Degraded`]
///   when no candidate passed the convergence test within the budget, in which
///   case `time`/`distance` are those of the smallest sample evaluated.
///
/// Errors
/// ----------
/// * [`EphemError::InvalidConfiguration`] if the interval is empty or not
///   finite, or if `settings.samples` is not five.
/// * Any error raised by `separation`.
pub fn find_closest_approach<F>(
    mut separation: F,
    t_lo: JulianDate,
    t_hi: JulianDate,
    settings: &ApproachSettings,
) -> Result<ClosestApproach, EphemError>
where
    F: FnMut(JulianDate) -> Result<AstronomicalUnit, EphemError>,
{
    if !(t_lo < t_hi) || !t_lo.is_finite() || !t_hi.is_finite() {
        return Err(EphemError::InvalidConfiguration(format!(
            "closest-approach interval [{t_lo}, {t_hi}] is empty"
        )));
    }

    if settings.samples != APPROACH_SAMPLES {
        return Err(EphemError::InvalidConfiguration(format!(
            "closest-approach search needs {APPROACH_SAMPLES} samples per bracket, got {}",
            settings.samples
        )));
    }

    let (mut lo, mut hi) = (t_lo, t_hi);
    let mut best = (f64::NAN, f64::INFINITY);
    let intervals = (settings.samples - 1) as f64;

    for iteration in 1..=settings.max_iterations {
        let step = (hi - lo) / intervals;
        let times: [f64; APPROACH_SAMPLES] = std::array::from_fn(|i| lo + i as f64 * step);
        let mut y = [0.0; APPROACH_SAMPLES];
        for (yi, &ti) in y.iter_mut().zip(times.iter()) {
            *yi = separation(ti)?;
        }

        let min_idx = y.iter().position_min_by(|a, b| a.total_cmp(b)).unwrap_or(2);
        if y[min_idx] < best.1 {
            best = (times[min_idx], y[min_idx]);
        }

        let interp = Interp5::new(times[2], step, y);
        let k = interp.fourth_difference();

        if k.abs() < settings.curvature_threshold {
            let minimum = interp
                .extremum()
                .filter(|&n| interp.curvature(n) > 0.0)
                .map(|n| interp.center + n * interp.step)
                .filter(|t| (lo..=hi).contains(t));
            if let Some(t_star) = minimum {
                let distance = separation(t_star)?;
                // rounding slack when the best sample already sits on the minimum
                if distance.is_finite() && distance <= best.1 * (1.0 + 4.0 * f64::EPSILON) {
                    debug!("closest approach converged after {iteration} refinements");
                    return Ok(ClosestApproach {
                        time: t_star,
                        distance,
                        iterations: iteration,
                        status: ConvergenceStatus::Converged,
                    });
                }
            }
        }

        // keep a sample on each side of the minimum
        let center = min_idx.clamp(1, 3);
        lo = times[center] - step;
        hi = times[center] + step;
    }

    warn!(
        "closest approach not converged after {} refinements, best sample at JD {} ({} AU)",
        settings.max_iterations, best.0, best.1
    );
    Ok(ClosestApproach {
        time: best.0,
        distance: best.1,
        iterations: settings.max_iterations,
        status: ConvergenceStatus::Degraded,
    })
}

#[cfg(test)]
mod closest_approach_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_interp5_quadratic_extremum() {
        // y = (x − 10.3)² sampled at 8, 9, 10, 11, 12
        let f = |x: f64| (x - 10.3) * (x - 10.3);
        let interp = Interp5::new(10.0, 1.0, [f(8.0), f(9.0), f(10.0), f(11.0), f(12.0)]);

        assert_abs_diff_eq!(interp.fourth_difference(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.extremum().unwrap(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.extremum_abscissa().unwrap(), 10.3, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.interpolate(0.5), f(10.5), epsilon = 1e-12);
    }

    #[test]
    fn test_interp5_quartic_is_exact() {
        let f = |x: f64| 0.5 * x.powi(4) - x.powi(3) + 2.0 * x - 1.0;
        let interp = Interp5::new(0.0, 0.5, [f(-1.0), f(-0.5), f(0.0), f(0.5), f(1.0)]);
        for n in [-1.7, -0.3, 0.8, 1.9] {
            assert_abs_diff_eq!(interp.interpolate(n), f(0.5 * n), epsilon = 1e-12);
        }
        // fourth difference of a quartic: 4!·a·h⁴
        assert_abs_diff_eq!(interp.fourth_difference(), 24.0 * 0.5 * 0.0625, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_flyby() {
        // relative motion on a straight line: d(t)² = d0² + v²(t − t0)²
        let (d0, v, t0) = (0.05, 0.012, 2_460_010.37);
        let sep = |t: f64| Ok((d0 * d0 + v * v * (t - t0) * (t - t0)).sqrt());

        let ca = find_closest_approach(sep, 2_460_000.0, 2_460_020.0, &ApproachSettings::default())
            .unwrap();
        assert_eq!(ca.status, ConvergenceStatus::Converged);
        assert_abs_diff_eq!(ca.time, t0, epsilon = 1e-6);
        assert_abs_diff_eq!(ca.distance, d0, epsilon = 1e-6);
    }

    #[test]
    fn test_interp5_curvature() {
        let f = |x: f64| 3.0 - 0.5 * (x - 1.0) * (x - 1.0);
        let interp = Interp5::new(0.0, 0.5, [f(-1.0), f(-0.5), f(0.0), f(0.5), f(1.0)]);
        assert_abs_diff_eq!(interp.curvature(0.0), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.curvature(1.3), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_concave_separation_is_not_a_minimum() {
        // the parabola peaks at t = 5: the smallest separations are at the ends
        let sep = |t: f64| Ok(2.0 - (t - 5.0) * (t - 5.0) / 100.0);
        let ca = find_closest_approach(sep, 0.0, 10.0, &ApproachSettings::default()).unwrap();

        assert_eq!(ca.status, ConvergenceStatus::Degraded);
        assert_eq!(ca.time, 0.0);
        assert_eq!(ca.distance, 1.75);
    }

    #[test]
    fn test_sample_count_is_checked() {
        let sep = |t: f64| Ok(t * t);
        let settings = ApproachSettings {
            samples: 7,
            ..ApproachSettings::default()
        };
        assert!(matches!(
            find_closest_approach(sep, -1.0, 1.0, &settings),
            Err(EphemError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_monotonic_separation_is_degraded() {
        let sep = |t: f64| Ok(1.0 + (t - 100.0));
        let ca = find_closest_approach(sep, 100.0, 110.0, &ApproachSettings::default()).unwrap();
        assert_eq!(ca.status, ConvergenceStatus::Degraded);
        assert!(!ca.is_converged());
        assert_eq!(ca.time, 100.0);
        assert_eq!(ca.distance, 1.0);
        assert_eq!(ca.iterations, 18);
    }

    #[test]
    fn test_invalid_interval() {
        let sep = |_t: f64| Ok(1.0);
        assert!(matches!(
            find_closest_approach(sep, 5.0, 5.0, &ApproachSettings::default()),
            Err(EphemError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_separation_errors_propagate() {
        let sep = |t: f64| {
            if t > 3.0 {
                Err(EphemError::DateOutOfRange {
                    julian_date: t,
                    valid: "test window",
                })
            } else {
                Ok(t)
            }
        };
        assert!(matches!(
            find_closest_approach(sep, 0.0, 4.0, &ApproachSettings::default()),
            Err(EphemError::DateOutOfRange { .. })
        ));
    }
}
