//! # Ephemeris engine
//!
//! [`Ephemerides`] ties the pieces together: it owns the injected
//! [`TabulatedEphemeris`] handle and an [`EphemConfig`], builds [`Body`]
//! values, evaluates [`ObservationRequest`]s (sequentially or over a rayon
//! pool) and runs closest-approach searches.
//!
//! ## Routing
//!
//! * Two planets served by the same tabulated ephemeris, observed
//!   geocentrically: the ephemeris' own [`TabulatedEphemeris::observe`].
//! * Any other pair, or a topocentric request: [`light_time::solve`] over the
//!   bodies' [`PositionProvider::position_at`], with the observer's geocentric
//!   offset added to the center.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ephemkit::ephemerides::Ephemerides;
//! use ephemkit::observations::ObservationRequest;
//! use ephemkit::planetary_terms::Planet;
//! use hifitime::Epoch;
//!
//! let engine = Ephemerides::default();
//! let request = ObservationRequest::from_range(
//!     engine.planet(Planet::Mars),
//!     engine.planet(Planet::Earth),
//!     Epoch::from_jde_tdb(2_460_000.5),
//!     Epoch::from_jde_tdb(2_460_010.5),
//!     1.0,
//! )?;
//! let ephemeris = engine.observe(&request)?;
//! println!("{ephemeris}");
//! # Ok::<(), ephemkit::ephem_errors::EphemError>(())
//! ```
use std::sync::Arc;

use hifitime::Epoch;
use log::debug;
use rayon::prelude::*;

use crate::{
    bodies::{Body, PositionProvider},
    closest_approach::{find_closest_approach, ApproachSettings, ClosestApproach},
    config::EphemConfig,
    constants::JulianDate,
    ephem_errors::EphemError,
    jpl_ephem::{ApproxPlanetEphemeris, TabulatedEphemeris},
    light_time::{self, LightTimeSettings, LightTimeSolution},
    observations::{Ephemeris, EphemerisItem, ObservationRequest},
    observers::Observer,
    orbit_type::OrbitalElements,
    planetary_terms::Planet,
    state_vector::StateVector,
    time::jd_tdb,
};

#[derive(Debug, Clone)]
pub struct Ephemerides {
    ephemeris: Arc<dyn TabulatedEphemeris>,
    config: EphemConfig,
}

impl Default for Ephemerides {
    /// JPL approximate planetary elements with the default configuration.
    fn default() -> Self {
        Ephemerides::with_config(EphemConfig::default())
    }
}

impl Ephemerides {
    pub fn new(ephemeris: Arc<dyn TabulatedEphemeris>, config: EphemConfig) -> Self {
        Ephemerides { ephemeris, config }
    }

    /// JPL approximate planetary elements propagated with the Landgraf limits
    /// of `config`.
    pub fn with_config(config: EphemConfig) -> Self {
        let ephemeris = ApproxPlanetEphemeris::with_limits(config.landgraf_limits());
        Ephemerides::new(Arc::new(ephemeris), config)
    }

    pub fn config(&self) -> &EphemConfig {
        &self.config
    }

    pub fn ephemeris(&self) -> &Arc<dyn TabulatedEphemeris> {
        &self.ephemeris
    }

    /// Planet served by this engine's tabulated ephemeris.
    pub fn planet(&self, planet: Planet) -> Body {
        Body::planet(planet, Arc::clone(&self.ephemeris))
    }

    /// Planet looked up by name (case-insensitive).
    ///
    /// Errors
    /// -----------------
    /// * [`EphemError::BodyNotFound`] for an unknown name.
    pub fn planet_by_name(&self, name: &str) -> Result<Body, EphemError> {
        Planet::from_name(name)
            .map(|p| self.planet(p))
            .ok_or_else(|| EphemError::BodyNotFound(name.to_string()))
    }

    /// Body propagated from `elements` with this engine's Landgraf limits.
    pub fn body_from_elements(&self, name: impl Into<String>, elements: OrbitalElements) -> Body {
        Body::from_elements(name, elements).with_landgraf_limits(self.config.landgraf_limits())
    }

    /// Observe `target` from `center` at `t` (JD, TDB).
    ///
    /// Arguments
    /// -----------------
    /// * `target`, `center` – Observed body and observing body.
    /// * `t` – Observation time.
    /// * `observer` – Optional site; its geocentric offset is added to `center`.
    ///
    /// Errors
    /// -----------------
    /// * Any propagation, table range or light-time divergence error.
    pub fn observe_at(
        &self,
        target: &Body,
        center: &Body,
        t: JulianDate,
        observer: Option<&Observer>,
    ) -> Result<EphemerisItem, EphemError> {
        let solution = self.solve_light_time(target, center, t, observer)?;
        Ok(EphemerisItem::from_solution(t, solution, observer.is_some()))
    }

    fn solve_light_time(
        &self,
        target: &Body,
        center: &Body,
        t: JulianDate,
        observer: Option<&Observer>,
    ) -> Result<LightTimeSolution, EphemError> {
        if observer.is_none() {
            if let (
                Body::TabulatedPlanet {
                    planet: target_planet,
                    ephemeris,
                },
                Body::TabulatedPlanet {
                    planet: center_planet,
                    ephemeris: center_ephemeris,
                },
            ) = (target, center)
            {
                if Arc::ptr_eq(ephemeris, center_ephemeris) {
                    return ephemeris.observe(*target_planet, *center_planet, t, &self.config);
                }
            }
        }

        let center_at = |tc: JulianDate| -> Result<StateVector, EphemError> {
            let state = center.position_at(tc)?;
            Ok(match observer {
                Some(site) => &state + &site.geocentric(tc),
                None => state,
            })
        };
        light_time::solve(
            |te| target.position_at(te),
            center_at,
            t,
            &LightTimeSettings::from(&self.config),
        )
    }

    /// Evaluate every epoch of `request`, in order.
    pub fn observe(&self, request: &ObservationRequest) -> Result<Ephemeris, EphemError> {
        let items = request
            .epochs()
            .iter()
            .map(|&t| self.observe_at(&request.target, &request.center, t, request.observer()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "ephemeris of {} from {}: {} epochs",
            request.target.name(),
            request.center.name(),
            items.len()
        );
        Ok(Ephemeris::new(request.target.name(), request.center.name(), items))
    }

    /// [`Ephemerides::observe`] with the epochs spread over the rayon pool.
    ///
    /// The result is identical to the sequential evaluation, items in epoch order.
    pub fn observe_parallel(&self, request: &ObservationRequest) -> Result<Ephemeris, EphemError> {
        let items = request
            .epochs()
            .par_iter()
            .map(|&t| self.observe_at(&request.target, &request.center, t, request.observer()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Ephemeris::new(request.target.name(), request.center.name(), items))
    }

    /// Time and distance of the closest approach between `a` and `b` in
    /// `[start, end]`; any [`PositionProvider`] works, [`Body`] included.
    ///
    /// See also
    /// ------------
    /// * [`find_closest_approach`] – the search itself; the returned
    ///   [`ClosestApproach`] may be flagged as degraded.
    pub fn closest_approach<A, B>(
        &self,
        a: &A,
        b: &B,
        start: Epoch,
        end: Epoch,
    ) -> Result<ClosestApproach, EphemError>
    where
        A: PositionProvider + ?Sized,
        B: PositionProvider + ?Sized,
    {
        self.closest_approach_jd(a, b, jd_tdb(&start), jd_tdb(&end))
    }

    /// [`Ephemerides::closest_approach`] on Julian dates (TDB).
    pub fn closest_approach_jd<A, B>(
        &self,
        a: &A,
        b: &B,
        t_lo: JulianDate,
        t_hi: JulianDate,
    ) -> Result<ClosestApproach, EphemError>
    where
        A: PositionProvider + ?Sized,
        B: PositionProvider + ?Sized,
    {
        let separation = |t: JulianDate| -> Result<f64, EphemError> {
            Ok(a.position_at(t)?.relative_to(&b.position_at(t)?).distance())
        };
        find_closest_approach(separation, t_lo, t_hi, &ApproachSettings::from(&self.config))
    }
}
