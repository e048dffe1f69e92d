//! # Cartesian state vectors
//!
//! A [`StateVector`] is a position (AU) with an optional velocity (AU/day),
//! tagged with the [`ReferenceFrame`] it is expressed in and the Julian date
//! (TDB) it refers to. Relative vectors such as *target − center* are formed
//! with [`StateVector::relative_to`] or the `-` operator; the center is rotated
//! into the target's frame first when the two frames differ.
use std::ops::{Add, Sub};

use nalgebra::Vector3;

use crate::{
    constants::{AstronomicalUnit, JulianDate, Radian},
    ref_system::{cartesian_to_radec, frame_rotation, ReferenceFrame},
};

#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    /// Position (AU).
    pub position: Vector3<f64>,
    /// Velocity (AU/day), when the producer computes it.
    pub velocity: Option<Vector3<f64>>,
    /// Frame of `position` and `velocity`.
    pub frame: ReferenceFrame,
    /// Julian date (TDB) of the state.
    pub epoch: JulianDate,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, frame: ReferenceFrame, epoch: JulianDate) -> Self {
        StateVector {
            position,
            velocity: None,
            frame,
            epoch,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_epoch(mut self, epoch: JulianDate) -> Self {
        self.epoch = epoch;
        self
    }

    /// The origin of `frame` at `epoch` (the Sun for heliocentric frames).
    pub fn origin(frame: ReferenceFrame, epoch: JulianDate) -> Self {
        StateVector::new(Vector3::zeros(), frame, epoch).with_velocity(Vector3::zeros())
    }

    /// Norm of the position vector (AU).
    pub fn distance(&self) -> AstronomicalUnit {
        self.position.norm()
    }

    /// Express this state in another J2000 frame.
    pub fn to_frame(&self, frame: ReferenceFrame) -> StateVector {
        if frame == self.frame {
            return self.clone();
        }
        let rot = frame_rotation(self.frame, frame);
        StateVector {
            position: rot * self.position,
            velocity: self.velocity.map(|v| rot * v),
            frame,
            epoch: self.epoch,
        }
    }

    /// Vector from `center` to `self`, in the frame of `self`.
    ///
    /// The velocity is kept only when both states carry one. The epoch of the
    /// result is the epoch of `self`.
    pub fn relative_to(&self, center: &StateVector) -> StateVector {
        let center = center.to_frame(self.frame);
        StateVector {
            position: self.position - center.position,
            velocity: self.velocity.zip(center.velocity).map(|(v, w)| v - w),
            frame: self.frame,
            epoch: self.epoch,
        }
    }

    /// Equatorial J2000 right ascension, declination and distance of the
    /// position vector.
    ///
    /// Return
    /// ----------
    /// * `(α, δ, ρ)` with `α ∈ [0, 2π)` (rad), `δ ∈ [−π/2, π/2]` (rad), `ρ` in AU.
    pub fn radec(&self) -> (Radian, Radian, AstronomicalUnit) {
        let equatorial = self.to_frame(ReferenceFrame::EquatorialJ2000);
        cartesian_to_radec(&equatorial.position)
    }
}

impl Sub for &StateVector {
    type Output = StateVector;

    fn sub(self, rhs: &StateVector) -> StateVector {
        self.relative_to(rhs)
    }
}

impl Sub for StateVector {
    type Output = StateVector;

    fn sub(self, rhs: StateVector) -> StateVector {
        self.relative_to(&rhs)
    }
}

impl Add for &StateVector {
    type Output = StateVector;

    fn add(self, rhs: &StateVector) -> StateVector {
        let rhs = rhs.to_frame(self.frame);
        StateVector {
            position: self.position + rhs.position,
            velocity: self.velocity.zip(rhs.velocity).map(|(v, w)| v + w),
            frame: self.frame,
            epoch: self.epoch,
        }
    }
}
