//! Positions, light-time corrected ephemerides and close approaches of
//! solar-system bodies, from JPL approximate planetary elements or from the
//! orbital elements of comets and asteroids.
pub mod bodies;
pub mod closest_approach;
pub mod config;
pub mod constants;
pub mod conversion;
pub mod ephem_errors;
pub mod ephemerides;
pub mod jpl_ephem;
pub mod kepler;
pub mod light_time;
pub mod observations;
pub mod observers;
pub mod orbit_type;
pub mod planetary_terms;
pub mod propagator;
pub mod ref_system;
pub mod small_body_db;
pub mod state_vector;
pub mod time;
