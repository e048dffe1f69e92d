//! # Solver configuration
//!
//! [`EphemConfig`] gathers the iteration caps and tolerances of the light-time
//! solver, the closest-approach search and the Landgraf propagator. The
//! defaults reproduce the reference behaviour; use [`EphemConfig::builder`] to
//! override them with validation.
use std::cmp::Ordering::{Equal, Greater};

use serde::{Deserialize, Serialize};

use crate::{ephem_errors::EphemError, kepler::LandgrafLimits};

/// Number of samples per closest-approach bracket. The interpolation is the
/// five-point formula, so this is the only accepted value.
pub const APPROACH_SAMPLES: usize = 5;

/// Iteration caps and tolerances.
///
/// Defaults
/// -----------------
/// * `light_time_max_iterations`: 100
/// * `light_time_tolerance`: 0.0 day (iterate to the floating-point fixed point)
/// * `approach_samples`: 5
/// * `approach_max_iterations`: 18
/// * `approach_curvature_threshold`: 1e-9
/// * `landgraf_tolerance`: 1e-9
/// * `landgraf_max_terms`: 50
/// * `landgraf_max_iterations`: 50
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemConfig {
    // --- Light time ---
    /// Maximum fixed-point iterations before a divergence error.
    pub light_time_max_iterations: usize,
    /// Absolute tolerance on successive light-time values (days).
    pub light_time_tolerance: f64,

    // --- Closest approach ---
    /// Samples per bracket.
    pub approach_samples: usize,
    /// Outer refinements before the result is reported as degraded.
    pub approach_max_iterations: usize,
    /// Fourth difference below which the interpolated extremum is accepted.
    pub approach_curvature_threshold: f64,

    // --- Landgraf ---
    pub landgraf_tolerance: f64,
    pub landgraf_max_terms: usize,
    pub landgraf_max_iterations: usize,
}

impl EphemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fluent, validated construction.
    ///
    /// ```rust
    /// use ephemkit::config::EphemConfig;
    ///
    /// let config = EphemConfig::builder()
    ///     .approach_max_iterations(25)
    ///     .light_time_max_iterations(50)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.approach_max_iterations, 25);
    /// ```
    pub fn builder() -> EphemConfigBuilder {
        EphemConfigBuilder::new()
    }

    /// Landgraf solver limits carried by this configuration.
    pub fn landgraf_limits(&self) -> LandgrafLimits {
        LandgrafLimits {
            tolerance: self.landgraf_tolerance,
            max_terms: self.landgraf_max_terms,
            max_iterations: self.landgraf_max_iterations,
        }
    }
}

impl Default for EphemConfig {
    fn default() -> Self {
        let landgraf = LandgrafLimits::default();
        EphemConfig {
            light_time_max_iterations: 100,
            light_time_tolerance: 0.0,

            approach_samples: APPROACH_SAMPLES,
            approach_max_iterations: 18,
            approach_curvature_threshold: 1e-9,

            landgraf_tolerance: landgraf.tolerance,
            landgraf_max_terms: landgraf.max_terms,
            landgraf_max_iterations: landgraf.max_iterations,
        }
    }
}

/// Builder for [`EphemConfig`], with validation.
#[derive(Debug, Clone, Default)]
pub struct EphemConfigBuilder {
    config: EphemConfig,
}

impl EphemConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EphemConfig::default(),
        }
    }

    pub fn light_time_max_iterations(mut self, v: usize) -> Self {
        self.config.light_time_max_iterations = v;
        self
    }
    pub fn light_time_tolerance(mut self, v: f64) -> Self {
        self.config.light_time_tolerance = v;
        self
    }
    pub fn approach_samples(mut self, v: usize) -> Self {
        self.config.approach_samples = v;
        self
    }
    pub fn approach_max_iterations(mut self, v: usize) -> Self {
        self.config.approach_max_iterations = v;
        self
    }
    pub fn approach_curvature_threshold(mut self, v: f64) -> Self {
        self.config.approach_curvature_threshold = v;
        self
    }
    pub fn landgraf_tolerance(mut self, v: f64) -> Self {
        self.config.landgraf_tolerance = v;
        self
    }
    pub fn landgraf_max_terms(mut self, v: usize) -> Self {
        self.config.landgraf_max_terms = v;
        self
    }
    pub fn landgraf_max_iterations(mut self, v: usize) -> Self {
        self.config.landgraf_max_iterations = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Validate and produce the configuration.
    ///
    /// Validation rules
    /// -----------------
    /// * every iteration cap `≥ 1`;
    /// * `light_time_tolerance ≥ 0`, finite;
    /// * `approach_samples == 5`;
    /// * `approach_curvature_threshold > 0`, `landgraf_tolerance > 0`.
    ///
    /// Errors
    /// -----------------
    /// * [`EphemError::InvalidConfiguration`] naming the first failing rule.
    pub fn build(self) -> Result<EphemConfig, EphemError> {
        let c = &self.config;

        if c.light_time_max_iterations == 0
            || c.approach_max_iterations == 0
            || c.landgraf_max_terms == 0
            || c.landgraf_max_iterations == 0
        {
            return Err(EphemError::InvalidConfiguration(
                "iteration caps must be at least 1".into(),
            ));
        }
        if !Self::ge0(c.light_time_tolerance) || !c.light_time_tolerance.is_finite() {
            return Err(EphemError::InvalidConfiguration(
                "light_time_tolerance must be a finite, non-negative number of days".into(),
            ));
        }
        if c.approach_samples != APPROACH_SAMPLES {
            return Err(EphemError::InvalidConfiguration(format!(
                "approach_samples must be {APPROACH_SAMPLES}, got {}",
                c.approach_samples
            )));
        }
        if !Self::gt0(c.approach_curvature_threshold) {
            return Err(EphemError::InvalidConfiguration(
                "approach_curvature_threshold must be > 0".into(),
            ));
        }
        if !Self::gt0(c.landgraf_tolerance) {
            return Err(EphemError::InvalidConfiguration(
                "landgraf_tolerance must be > 0".into(),
            ));
        }

        Ok(self.config)
    }
}
