//! # Continuous trajectory of a massive body
//!
//! The ephemeris integrates massive bodies with a fixed step and records one node
//! `(instant, position, velocity)` per step. Between two nodes the motion is the
//! cubic Hermite interpolant matching both positions and both velocities, so the
//! trajectory is C¹ and can be evaluated at any instant of `[t_min, t_max]`.
//!
//! Nodes may only be appended after the last one; the solution is never rewound.

use hifitime::Duration;
use nalgebra::Vector3;

use crate::geometry::{Barycentric, DegreesOfFreedom};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

#[derive(Debug, Clone)]
pub struct ContinuousTrajectory {
    times: Vec<Instant>,
    states: Vec<DegreesOfFreedom<Barycentric>>,
}

impl ContinuousTrajectory {
    /// Create a trajectory covering the single instant `time`.
    pub fn new(time: Instant, degrees_of_freedom: DegreesOfFreedom<Barycentric>) -> Self {
        ContinuousTrajectory {
            times: vec![time],
            states: vec![degrees_of_freedom],
        }
    }

    /// Append a node. Fails with [`GravitasError::OutOfOrder`] unless `time` is after
    /// [`ContinuousTrajectory::t_max`].
    pub fn append(
        &mut self,
        time: Instant,
        degrees_of_freedom: DegreesOfFreedom<Barycentric>,
    ) -> Result<(), GravitasError> {
        let last = self.t_max();
        if time <= last {
            return Err(GravitasError::OutOfOrder { time, last });
        }
        self.times.push(time);
        self.states.push(degrees_of_freedom);
        Ok(())
    }

    pub fn t_min(&self) -> Instant {
        self.times[0]
    }

    pub fn t_max(&self) -> Instant {
        self.times[self.times.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn last_degrees_of_freedom(&self) -> DegreesOfFreedom<Barycentric> {
        self.states[self.states.len() - 1]
    }

    /// The integration nodes, in increasing time order.
    pub fn nodes(&self) -> impl Iterator<Item = (Instant, DegreesOfFreedom<Barycentric>)> + '_ {
        self.times.iter().copied().zip(self.states.iter().copied())
    }

    /// Evaluate the position and velocity at `time`.
    ///
    /// Arguments
    /// ---------
    /// * `time`: an instant within `[t_min, t_max]`.
    ///
    /// Return
    /// ----------
    /// * The node itself when `time` is a node, the Hermite interpolant otherwise, or
    ///   [`GravitasError::NotCovered`] outside the covered interval.
    pub fn evaluate_degrees_of_freedom(
        &self,
        time: Instant,
    ) -> Result<DegreesOfFreedom<Barycentric>, GravitasError> {
        if time < self.t_min() || time > self.t_max() {
            return Err(GravitasError::NotCovered {
                time,
                t_min: self.t_min(),
                t_max: self.t_max(),
            });
        }

        Ok(self.evaluate_or_extrapolate(time))
    }

    /// Like [`ContinuousTrajectory::evaluate_degrees_of_freedom`], but extends the
    /// first and last cubic beyond the covered interval instead of failing.
    ///
    /// Composition integrators evaluate forces at substep instants slightly outside
    /// the step they take, which may fall before `t_min`.
    pub(crate) fn evaluate_or_extrapolate(&self, time: Instant) -> DegreesOfFreedom<Barycentric> {
        if self.times.len() < 2 {
            return self.states[0];
        }
        if time < self.t_min() {
            return hermite(
                self.times[1] - self.times[0],
                time - self.times[0],
                &self.states[0],
                &self.states[1],
            );
        }
        let last = self.times.len() - 1;
        if time > self.t_max() {
            return hermite(
                self.times[last] - self.times[last - 1],
                time - self.times[last - 1],
                &self.states[last - 1],
                &self.states[last],
            );
        }
        // First node at or after `time`.
        let upper = self.times.partition_point(|node| *node < time);
        if self.times[upper] == time {
            return self.states[upper];
        }
        hermite(
            self.times[upper] - self.times[upper - 1],
            time - self.times[upper - 1],
            &self.states[upper - 1],
            &self.states[upper],
        )
    }

    pub fn evaluate_position(&self, time: Instant) -> Result<Vector3<f64>, GravitasError> {
        Ok(self.evaluate_degrees_of_freedom(time)?.position)
    }

    pub fn evaluate_velocity(&self, time: Instant) -> Result<Vector3<f64>, GravitasError> {
        Ok(self.evaluate_degrees_of_freedom(time)?.velocity)
    }
}

/// Cubic Hermite interpolation on one interval of length `interval`, at `elapsed`
/// from its start.
fn hermite(
    interval: Duration,
    elapsed: Duration,
    start: &DegreesOfFreedom<Barycentric>,
    end: &DegreesOfFreedom<Barycentric>,
) -> DegreesOfFreedom<Barycentric> {
    let h = interval.to_seconds();
    let s = elapsed.to_seconds() / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    let position = start.position * h00
        + start.velocity * (h * h10)
        + end.position * h01
        + end.velocity * (h * h11);

    let dh00 = 6.0 * s2 - 6.0 * s;
    let dh10 = 3.0 * s2 - 4.0 * s + 1.0;
    let dh01 = -dh00;
    let dh11 = 3.0 * s2 - 2.0 * s;
    let velocity = (start.position * dh00 + end.position * dh01) / h
        + start.velocity * dh10
        + end.velocity * dh11;

    DegreesOfFreedom::new(position, velocity)
}
