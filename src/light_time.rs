//! # Light-time correction
//!
//! The astrometric position of a target is where it was when the light now
//! reaching the observer left it. [`solve`] finds the light time `τ` as the
//! fixed point of
//!
//! ```text
//! τ = k · | target(t − τ) − center(t − τ) |,   k = 0.0057755183 day/AU
//! ```
//!
//! seeded with the geometric estimate `τ₀ = k · |target(t) − center(t)|`. Both
//! bodies are re-propagated to the emission time on every iteration.
use log::debug;

use crate::{
    config::EphemConfig,
    constants::{Days, JulianDate, LIGHT_TIME_PER_AU},
    ephem_errors::EphemError,
    state_vector::StateVector,
};

/// Changes of light time below this are at the resolution of the iteration.
const LIGHT_TIME_FLOOR: Days = 1e-15;

/// Output of [`solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct LightTimeSolution {
    /// Geometric vector `target(t) − center(t)`.
    pub true_vector: StateVector,
    /// Light-time corrected vector `target(t − τ) − center(t − τ)`, tagged with epoch `t`.
    pub astrometric_vector: StateVector,
    /// Light time `τ` (days).
    pub light_time: Days,
    /// Fixed-point iterations performed.
    pub iterations: usize,
}

/// Cap and tolerance of the fixed-point iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTimeSettings {
    pub max_iterations: usize,
    /// Absolute tolerance on successive values of `τ` (days).
    pub tolerance: Days,
}

impl Default for LightTimeSettings {
    fn default() -> Self {
        LightTimeSettings::from(&EphemConfig::default())
    }
}

impl From<&EphemConfig> for LightTimeSettings {
    fn from(config: &EphemConfig) -> Self {
        LightTimeSettings {
            max_iterations: config.light_time_max_iterations,
            tolerance: config.light_time_tolerance,
        }
    }
}

/// Solve the light-time equation between two moving bodies.
///
/// Arguments
/// -----------------
/// * `target` – Position of the observed body at a given Julian date (TDB).
/// * `center` – Position of the observer at a given Julian date (TDB).
/// * `t` – Observation time.
/// * `settings` – Iteration cap and tolerance.
///
/// Return
/// ----------
/// * The true and astrometric relative vectors and the light time. For a
///   stationary pair at distance `d` the light time is `k·d` after one
///   iteration.
///
/// Errors
/// ----------
/// * [`EphemError::NumericalDivergence`] if `τ` has not settled after
///   `settings.max_iterations` iterations.
/// * Any error raised by the position functions.
pub fn solve<T, C>(
    mut target: T,
    mut center: C,
    t: JulianDate,
    settings: &LightTimeSettings,
) -> Result<LightTimeSolution, EphemError>
where
    T: FnMut(JulianDate) -> Result<StateVector, EphemError>,
    C: FnMut(JulianDate) -> Result<StateVector, EphemError>,
{
    let true_vector = target(t)?.relative_to(&center(t)?).with_epoch(t);

    let tolerance = settings.tolerance.max(LIGHT_TIME_FLOOR);
    let mut light_time = LIGHT_TIME_PER_AU * true_vector.distance();

    for iteration in 1..=settings.max_iterations {
        let emission = t - light_time;
        let astrometric_vector = target(emission)?
            .relative_to(&center(emission)?)
            .with_epoch(t);
        let next = LIGHT_TIME_PER_AU * astrometric_vector.distance();

        if !next.is_finite() {
            return Err(EphemError::divergence("light-time iteration", iteration));
        }
        if (next - light_time).abs() <= tolerance {
            debug!("light time converged in {iteration} iterations: {next} d");
            return Ok(LightTimeSolution {
                true_vector,
                astrometric_vector,
                light_time: next,
                iterations: iteration,
            });
        }
        light_time = next;
    }

    Err(EphemError::divergence(
        "light-time iteration",
        settings.max_iterations,
    ))
}
