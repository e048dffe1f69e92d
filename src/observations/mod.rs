//! # Observation requests and ephemeris tables
//!
//! An [`ObservationRequest`] pairs a target [`Body`] with a center body, a
//! sorted list of epochs and an optional topocentric [`Observer`]. Evaluating
//! it (see [`crate::ephemerides::Ephemerides::observe`]) yields an
//! [`Ephemeris`]: one [`EphemerisItem`] per epoch.
//!
//! ## Units & conventions
//!
//! - Epochs are Julian days in **TDB**.
//! - Vectors are heliocentric-frame differences in the **ecliptic J2000** frame,
//!   in AU.
//! - Right ascension and declination are **equatorial J2000**, radians in the
//!   structs and degrees in the CSV export.
//! - Light time is in **days**.
use std::{fmt, fs::File, io::Write};

use camino::Utf8Path;
use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::{
    bodies::Body,
    constants::{AstronomicalUnit, Days, JulianDate, Radian},
    conversion::{fmt_dec, fmt_ra},
    ephem_errors::EphemError,
    light_time::LightTimeSolution,
    observers::Observer,
    planetary_terms::Planet,
    state_vector::StateVector,
    time::{date_range, jd_tdb},
};

/// What to observe, from where and when.
#[derive(Debug, Clone)]
pub struct ObservationRequest {
    pub target: Body,
    pub center: Body,
    epochs: Vec<JulianDate>,
    observer: Option<Observer>,
}

impl ObservationRequest {
    /// Request over an explicit list of epochs.
    ///
    /// The epochs are sorted in ascending order; duplicates are kept.
    ///
    /// Errors
    /// -----------------
    /// * [`EphemError::EmptyObservationRequest`] if `epochs` is empty.
    pub fn new(target: Body, center: Body, epochs: &[Epoch]) -> Result<Self, EphemError> {
        Self::from_julian_dates(target, center, epochs.iter().map(jd_tdb).collect())
    }

    /// Same as [`ObservationRequest::new`] with Julian days (TDB).
    pub fn from_julian_dates(
        target: Body,
        center: Body,
        mut epochs: Vec<JulianDate>,
    ) -> Result<Self, EphemError> {
        if epochs.is_empty() {
            return Err(EphemError::EmptyObservationRequest);
        }
        if epochs.iter().any(|t| !t.is_finite()) {
            return Err(EphemError::InvalidConfiguration(
                "observation epochs must be finite".into(),
            ));
        }
        epochs.sort_by(f64::total_cmp);

        Ok(ObservationRequest {
            target,
            center,
            epochs,
            observer: None,
        })
    }

    /// Request over `start, start + step, …, end`.
    ///
    /// `end` is part of the range when it falls on a step.
    ///
    /// Errors
    /// -----------------
    /// * [`EphemError::InvalidConfiguration`] for a non-positive step or
    ///   `end < start`.
    pub fn from_range(
        target: Body,
        center: Body,
        start: Epoch,
        end: Epoch,
        step: Days,
    ) -> Result<Self, EphemError> {
        let epochs = date_range(jd_tdb(&start), jd_tdb(&end), step)?;
        Self::from_julian_dates(target, center, epochs)
    }

    /// Observe from a site on the Earth's surface.
    ///
    /// Errors
    /// -----------------
    /// * [`EphemError::InvalidConfiguration`] unless the center is the Earth.
    pub fn with_observer(mut self, observer: Observer) -> Result<Self, EphemError> {
        if self.center.as_planet() != Some(Planet::Earth) {
            return Err(EphemError::InvalidConfiguration(format!(
                "a topocentric observer needs the Earth as center, got {}",
                self.center.name()
            )));
        }
        self.observer = Some(observer);
        Ok(self)
    }

    pub fn epochs(&self) -> &[JulianDate] {
        &self.epochs
    }

    pub fn observer(&self) -> Option<&Observer> {
        self.observer.as_ref()
    }

    pub fn is_topocentric(&self) -> bool {
        self.observer.is_some()
    }
}

/// Ephemeris entry at one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisItem {
    /// Observation time (JD, TDB).
    pub epoch: JulianDate,
    /// Geometric vector center → target at `epoch`.
    pub true_vector: StateVector,
    /// Light-time corrected vector center → target.
    pub astrometric_vector: StateVector,
    pub light_time: Days,
    pub true_distance: AstronomicalUnit,
    pub astrometric_distance: AstronomicalUnit,
    /// Astrometric right ascension, equatorial J2000 (rad).
    pub right_ascension: Radian,
    /// Astrometric declination, equatorial J2000 (rad).
    pub declination: Radian,
    /// Whether the center includes a topocentric offset.
    pub topocentric: bool,
}

impl EphemerisItem {
    pub fn from_solution(epoch: JulianDate, solution: LightTimeSolution, topocentric: bool) -> Self {
        let (right_ascension, declination, astrometric_distance) =
            solution.astrometric_vector.radec();
        EphemerisItem {
            epoch,
            true_distance: solution.true_vector.distance(),
            astrometric_distance,
            right_ascension,
            declination,
            light_time: solution.light_time,
            true_vector: solution.true_vector,
            astrometric_vector: solution.astrometric_vector,
            topocentric,
        }
    }
}

/// Flat CSV record of an [`EphemerisItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisRow {
    pub jd_tdb: f64,
    pub x_au: f64,
    pub y_au: f64,
    pub z_au: f64,
    pub light_time_day: f64,
    pub true_distance_au: f64,
    pub astrometric_distance_au: f64,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub topocentric: bool,
}

impl From<&EphemerisItem> for EphemerisRow {
    fn from(item: &EphemerisItem) -> Self {
        let p = &item.astrometric_vector.position;
        EphemerisRow {
            jd_tdb: item.epoch,
            x_au: p.x,
            y_au: p.y,
            z_au: p.z,
            light_time_day: item.light_time,
            true_distance_au: item.true_distance,
            astrometric_distance_au: item.astrometric_distance,
            ra_deg: item.right_ascension.to_degrees(),
            dec_deg: item.declination.to_degrees(),
            topocentric: item.topocentric,
        }
    }
}

/// Result of an [`ObservationRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    pub target: String,
    pub center: String,
    pub items: Vec<EphemerisItem>,
}

impl Ephemeris {
    pub fn new(target: impl Into<String>, center: impl Into<String>, items: Vec<EphemerisItem>) -> Self {
        Ephemeris {
            target: target.into(),
            center: center.into(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EphemerisItem> {
        self.items.iter()
    }

    /// Entry with the smallest astrometric distance.
    pub fn nearest(&self) -> Option<&EphemerisItem> {
        self.items
            .iter()
            .min_by(|a, b| a.astrometric_distance.total_cmp(&b.astrometric_distance))
    }

    /// Write the table as CSV (header + one [`EphemerisRow`] per item).
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), EphemError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for item in &self.items {
            wtr.serialize(EphemerisRow::from(item))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table as CSV to `path`, replacing any existing file.
    pub fn write_csv(&self, path: &Utf8Path) -> Result<(), EphemError> {
        let file = File::create(path)?;
        self.to_csv_writer(file)
    }
}

impl<'a> IntoIterator for &'a Ephemeris {
    type Item = &'a EphemerisItem;
    type IntoIter = std::slice::Iter<'a, EphemerisItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Ephemeris {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ephemeris of {} from {}", self.target, self.center)?;
        writeln!(
            f,
            "{:>15}  {:>12}  {:>12}  {:>13}  {:>13}  {:>10}",
            "JD (TDB)", "RA (J2000)", "DEC (J2000)", "Δ astr. [AU]", "Δ true [AU]", "LT [min]"
        )?;
        for item in &self.items {
            writeln!(
                f,
                "{:>15.5}  {:>12}  {:>12}  {:>13.9}  {:>13.9}  {:>10.4}{}",
                item.epoch,
                fmt_ra(item.right_ascension, 2),
                fmt_dec(item.declination, 1),
                item.astrometric_distance,
                item.true_distance,
                item.light_time * 1440.0,
                if item.topocentric { "  topo" } else { "" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod observations_test {
    use std::sync::Arc;

    use super::*;
    use crate::{
        jpl_ephem::{ApproxPlanetEphemeris, TabulatedEphemeris},
        ref_system::ReferenceFrame,
    };
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    fn planet(p: Planet) -> Body {
        let eph: Arc<dyn TabulatedEphemeris> = Arc::new(ApproxPlanetEphemeris::new());
        Body::planet(p, eph)
    }

    fn item(epoch: f64, x: f64) -> EphemerisItem {
        let v = StateVector::new(Vector3::new(x, 0.0, 0.0), ReferenceFrame::EclipticJ2000, epoch);
        EphemerisItem::from_solution(
            epoch,
            LightTimeSolution {
                true_vector: v.clone(),
                astrometric_vector: v,
                light_time: 0.0057755183 * x,
                iterations: 1,
            },
            false,
        )
    }

    #[test]
    fn test_request_sorts_epochs() {
        let req = ObservationRequest::from_julian_dates(
            planet(Planet::Mars),
            planet(Planet::Earth),
            vec![3.0, 1.0, 2.0],
        )
        .unwrap();
        assert_eq!(req.epochs(), &[1.0, 2.0, 3.0]);
        assert!(!req.is_topocentric());
    }

    #[test]
    fn test_empty_request() {
        let res = ObservationRequest::from_julian_dates(planet(Planet::Mars), planet(Planet::Earth), vec![]);
        assert_eq!(res.unwrap_err(), EphemError::EmptyObservationRequest);
    }

    #[test]
    fn test_range_request() {
        let start = Epoch::from_jde_tdb(2_460_000.5);
        let end = Epoch::from_jde_tdb(2_460_002.5);
        let req = ObservationRequest::from_range(planet(Planet::Mars), planet(Planet::Earth), start, end, 0.5)
            .unwrap();
        assert_eq!(req.epochs().len(), 5);
        assert_abs_diff_eq!(req.epochs()[4], 2_460_002.5, epsilon = 1e-6);
    }

    #[test]
    fn test_observer_requires_earth() {
        let site = Observer::new(2.35, 48.85, 35.0, None).unwrap();
        let req = ObservationRequest::from_julian_dates(planet(Planet::Mars), planet(Planet::Venus), vec![1.0])
            .unwrap();
        assert!(req.with_observer(site.clone()).is_err());

        let req = ObservationRequest::from_julian_dates(planet(Planet::Mars), planet(Planet::Earth), vec![1.0])
            .unwrap()
            .with_observer(site)
            .unwrap();
        assert!(req.is_topocentric());
    }

    #[test]
    fn test_item_and_display() {
        let eph = Ephemeris::new("Mars", "Earth", vec![item(2_460_000.5, 2.0), item(2_460_001.5, 1.5)]);
        assert_eq!(eph.len(), 2);
        assert_eq!(eph.nearest().unwrap().epoch, 2_460_001.5);

        let first = &eph.items[0];
        assert_eq!(first.right_ascension, 0.0);
        assert_eq!(first.astrometric_distance, 2.0);

        let text = eph.to_string();
        assert!(text.starts_with("Ephemeris of Mars from Earth"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_csv_export() {
        let eph = Ephemeris::new("Mars", "Earth", vec![item(2_460_000.5, 2.0)]);
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("mars.csv")).unwrap();
        eph.write_csv(&path).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<EphemerisRow> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], EphemerisRow::from(&eph.items[0]));
    }
}
