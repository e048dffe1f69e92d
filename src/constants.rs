//! # Constants and type definitions for ephemkit
//!
//! This module centralizes the **physical constants**, **conversion factors** and
//! **type aliases** shared by the propagator, the light-time solver and the
//! closest-approach search.
//!
//! ## Overview
//!
//! - Gaussian gravitational constant and the derived mean-motion / light-time factors
//! - Orbit classification thresholds
//! - Julian-date anchors (J2000, Julian century)
//! - Unit conversions (degrees ↔ radians, AU ↔ km)
//!
//! The numeric constants marked *contract* below are part of the observable
//! behaviour of the crate and must not be rounded or re-derived.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Earth equatorial radius in meters (GRS1980/WGS84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Earth polar radius in meters (GRS1980/WGS84)
pub const EARTH_MINOR_AXIS: f64 = 6_356_752.3;

/// Earth radius expressed in astronomical units
pub const ERAU: f64 = (EARTH_MAJOR_AXIS / 1000.) / AU;

/// Gaussian gravitational constant k, rad/day (contract)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// k², the heliocentric gravitational parameter in AU³/day²
pub const GAUSS_GRAV_SQUARED: f64 = GAUSS_GRAV * GAUSS_GRAV;

/// Mean motion of a body with a = 1 AU, in degrees per day (contract)
pub const MEAN_MOTION_DEG_PER_DAY: f64 = 0.9856076686;

/// First-order light travel time per astronomical unit, in days (contract)
pub const LIGHT_TIME_PER_AU: f64 = 0.0057755183;

/// Lower eccentricity bound of the near-parabolic regime (contract)
pub const NEAR_PARABOLIC_LOWER_BOUND: f64 = 0.98;

/// Julian Date of J2000.0 (2000-01-01 12:00:00 TDB)
pub const J2000_JD: f64 = 2_451_545.0;

/// Days per Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Days per Julian year
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2_400_000.5;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Julian Date in the TDB time scale (days)
pub type JulianDate = f64;
/// Time interval in days
pub type Days = f64;
