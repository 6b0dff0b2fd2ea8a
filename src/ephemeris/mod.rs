//! # N-body ephemeris
//!
//! The [`Ephemeris`] owns a fixed set of [`MassiveBody`] values and one
//! [`ContinuousTrajectory`] per body. It integrates the bodies together with a
//! fixed-step symplectic integrator (mutual point-mass attraction plus the J2 terms
//! of oblate bodies) and exposes the resulting gravitational field.
//!
//! ## Overview
//!
//! - [`Ephemeris::prolong`]: extend the massive-body solution forward. This is the
//!   only mutator of massive-body state; the solution is never rewound.
//! - [`Ephemeris::compute_gravitational_acceleration_on_massive_body`] and
//!   [`Ephemeris::compute_gravitational_acceleration_on_massless_body`]: pure queries
//!   of the field. They require the instant to be covered and fail with
//!   [`GravitasError::NotCovered`] otherwise; they never prolong.
//! - [`Ephemeris::flow_with_fixed_step`]: advance massless trajectory segments with the
//!   ephemeris' own integrator and step.
//! - [`Ephemeris::flow_with_adaptive_step`]: advance one massless trajectory segment
//!   with the Dormand–Prince 5(4) integrator, under position and speed tolerances.
//!
//! Flows take `&mut self` and prolong the ephemeris as needed before integrating.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gravitas::body::MassiveBody;
//! use gravitas::ephemeris::{Ephemeris, FixedStepParameters};
//! use gravitas::geometry::DegreesOfFreedom;
//! use gravitas::time::Instant;
//! use hifitime::Duration;
//! use nalgebra::Vector3;
//!
//! let bodies = vec![
//!     Arc::new(MassiveBody::new("Big", 5.0).unwrap()),
//!     Arc::new(MassiveBody::new("Small", 2.0).unwrap()),
//! ];
//! let states = vec![
//!     DegreesOfFreedom::new(Vector3::new(-10.0 / 7.0, 0.0, 0.0), Vector3::zeros()),
//!     DegreesOfFreedom::new(Vector3::new(25.0 / 7.0, 0.0, 0.0), Vector3::zeros()),
//! ];
//! let mut ephemeris =
//!     Ephemeris::new(bodies, states, Instant::j2000(), FixedStepParameters::default()).unwrap();
//! ephemeris.prolong(Instant::j2000() + Duration::from_seconds(3_600.0)).unwrap();
//! ```

mod gravity;
mod parameters;

use std::collections::BTreeMap;
use std::sync::Arc;

use hifitime::Duration;
use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::body::MassiveBody;
use crate::geometry::{Barycentric, DegreesOfFreedom};
use crate::gravitas_errors::GravitasError;
use crate::integrators::{embedded, FlowOutcome, NewtonianState, NewtonianSystem};
use crate::time::Instant;
use crate::trajectory::{ContinuousTrajectory, DiscreteTrajectory, SegmentId};

use gravity::{massive_body_accelerations, massless_body_acceleration, GravitySource};

pub use gravity::{j2_acceleration, point_mass_acceleration};
pub use parameters::{AdaptiveStepParameters, FixedStepParameters};

pub struct Ephemeris {
    bodies: Vec<Arc<MassiveBody>>,
    sources: Vec<GravitySource>,
    trajectories: Vec<ContinuousTrajectory>,
    parameters: FixedStepParameters,
    epoch: Instant,
    /// Integration state at `t_max`.
    state: NewtonianState,
    /// Accelerations at `state`, reused by the first kick of the next step.
    accelerations: Vec<Vector3<f64>>,
}

impl std::fmt::Debug for Ephemeris {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ephemeris")
            .field(
                "bodies",
                &self.bodies.iter().map(|body| body.name()).collect::<Vec<_>>(),
            )
            .field("parameters", &self.parameters)
            .field("t_min", &self.t_min())
            .field("t_max", &self.t_max())
            .finish()
    }
}

impl Ephemeris {
    /// Create an ephemeris covering only `epoch`.
    ///
    /// Arguments
    /// ---------
    /// * `bodies`: the massive bodies, at least one, with distinct names.
    /// * `initial_states`: their barycentric degrees of freedom at `epoch`, in the same
    ///   order as `bodies`.
    /// * `epoch`: the initial instant, which becomes `t_min`.
    /// * `parameters`: integrator and step used by [`Ephemeris::prolong`].
    ///
    /// Return
    /// ----------
    /// * The ephemeris, or [`GravitasError::InvalidBody`] if the inputs are
    ///   inconsistent (empty, mismatched lengths, duplicate names, non-positive step).
    pub fn new(
        bodies: Vec<Arc<MassiveBody>>,
        initial_states: Vec<DegreesOfFreedom<Barycentric>>,
        epoch: Instant,
        parameters: FixedStepParameters,
    ) -> Result<Self, GravitasError> {
        if bodies.is_empty() {
            return Err(GravitasError::InvalidBody(
                "an ephemeris needs at least one massive body".into(),
            ));
        }
        if bodies.len() != initial_states.len() {
            return Err(GravitasError::InvalidBody(format!(
                "{} bodies but {} initial states",
                bodies.len(),
                initial_states.len()
            )));
        }
        for (index, body) in bodies.iter().enumerate() {
            if bodies[..index].iter().any(|other| other.name() == body.name()) {
                return Err(GravitasError::InvalidBody(format!(
                    "duplicate body name {}",
                    body.name()
                )));
            }
        }
        if parameters.step <= Duration::ZERO {
            return Err(GravitasError::InvalidBody(format!(
                "integration step must be positive, got {}",
                parameters.step
            )));
        }

        let sources: Vec<GravitySource> = bodies.iter().map(|body| GravitySource::from(&**body)).collect();
        let trajectories = initial_states
            .iter()
            .map(|dof| ContinuousTrajectory::new(epoch, *dof))
            .collect();
        let state = NewtonianState::new(
            epoch,
            initial_states.iter().map(|dof| dof.position).collect(),
            initial_states.iter().map(|dof| dof.velocity).collect(),
        );
        let mut accelerations = vec![Vector3::zeros(); bodies.len()];
        massive_body_accelerations(&sources, &state.positions, &mut accelerations);

        debug!(bodies = bodies.len(), %epoch, ?parameters, "created ephemeris");
        Ok(Ephemeris {
            bodies,
            sources,
            trajectories,
            parameters,
            epoch,
            state,
            accelerations,
        })
    }

    pub fn bodies(&self) -> &[Arc<MassiveBody>] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Result<&Arc<MassiveBody>, GravitasError> {
        self.bodies
            .get(index)
            .ok_or(GravitasError::UnresolvedReference(index))
    }

    pub fn body_index(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|body| body.name() == name)
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    pub fn parameters(&self) -> &FixedStepParameters {
        &self.parameters
    }

    pub fn t_min(&self) -> Instant {
        self.epoch
    }

    pub fn t_max(&self) -> Instant {
        self.state.time
    }

    /// The continuous solution of the body at `index`.
    pub fn trajectory(&self, index: usize) -> Result<&ContinuousTrajectory, GravitasError> {
        self.trajectories
            .get(index)
            .ok_or(GravitasError::UnresolvedReference(index))
    }

    /// Integrate the massive bodies until `t_max() >= time`. Does nothing if `time` is
    /// already covered.
    pub fn prolong(&mut self, time: Instant) -> Result<(), GravitasError> {
        if time <= self.t_max() {
            return Ok(());
        }
        let start = self.t_max();
        let mut steps = 0_usize;
        let mut field = MassiveBodiesField {
            sources: &self.sources,
        };
        while self.state.time < time {
            self.parameters.integrator.step(
                &mut field,
                &mut self.state,
                &mut self.accelerations,
                self.parameters.step,
            )?;
            for ((trajectory, position), velocity) in self
                .trajectories
                .iter_mut()
                .zip(&self.state.positions)
                .zip(&self.state.velocities)
            {
                trajectory.append(self.state.time, DegreesOfFreedom::new(*position, *velocity))?;
            }
            steps += 1;
        }
        debug!(from = %start, to = %self.state.time, steps, "prolonged ephemeris");
        Ok(())
    }

    /// Gravitational acceleration of the massive body at `body_index` at `time`, due to
    /// all other bodies (including the J2 terms and their reactions).
    pub fn compute_gravitational_acceleration_on_massive_body(
        &self,
        body_index: usize,
        time: Instant,
    ) -> Result<Vector3<f64>, GravitasError> {
        self.body(body_index)?;
        let positions = self.positions_at(time)?;
        let mut accelerations = vec![Vector3::zeros(); self.bodies.len()];
        massive_body_accelerations(&self.sources, &positions, &mut accelerations);
        Ok(accelerations[body_index])
    }

    /// Gravitational acceleration of a massless particle at `position` at `time`.
    pub fn compute_gravitational_acceleration_on_massless_body(
        &self,
        position: &Vector3<f64>,
        time: Instant,
    ) -> Result<Vector3<f64>, GravitasError> {
        let positions = self.positions_at(time)?;
        Ok(massless_body_acceleration(&self.sources, &positions, position))
    }

    /// Advance massless trajectory segments with the ephemeris integrator and step.
    ///
    /// Each segment is integrated from its last sample, with the gravitational field
    /// plus its own intrinsic acceleration. One sample is appended per step, the last
    /// step being shortened to end exactly at `time`. Segments whose last sample is at
    /// or after `time` are left untouched. Segments sharing their last instant are
    /// integrated together.
    ///
    /// Arguments
    /// ---------
    /// * `trajectory`: the tree holding the segments; its body must be massless.
    /// * `segments`: the segments to advance.
    /// * `time`: the final instant.
    ///
    /// Return
    /// ----------
    /// * [`GravitasError::WrongBodyKind`] for a massive body, [`GravitasError::Empty`]
    ///   for a segment without any sample, [`GravitasError::NotCovered`] for a segment
    ///   ending before the epoch. Nothing is appended when an error occurs.
    pub fn flow_with_fixed_step(
        &mut self,
        trajectory: &mut DiscreteTrajectory,
        segments: &[SegmentId],
        time: Instant,
    ) -> Result<(), GravitasError> {
        if !trajectory.body().is_massless() {
            return Err(GravitasError::WrongBodyKind);
        }
        let mut groups: BTreeMap<Instant, Vec<(SegmentId, DegreesOfFreedom<Barycentric>)>> =
            BTreeMap::new();
        for (index, segment) in segments.iter().enumerate() {
            if segments[..index].contains(segment) {
                continue;
            }
            let (last_time, dof) = trajectory.last_degrees_of_freedom(*segment)?;
            if last_time < time {
                self.check_flow_start(last_time)?;
                groups.entry(last_time).or_default().push((*segment, dof));
            }
        }
        if groups.is_empty() {
            return Ok(());
        }

        // Substeps of composition methods reach past the end of a step.
        let FixedStepParameters { integrator, step } = self.parameters;
        self.prolong(time + step + step)?;

        let mut appended = Vec::new();
        for (start, group) in &groups {
            let ids: Vec<SegmentId> = group.iter().map(|(segment, _)| *segment).collect();
            let mut field = MasslessField {
                ephemeris: &*self,
                trajectory: &*trajectory,
                segments: &ids,
                extra_acceleration: None,
            };
            let mut state = NewtonianState::new(
                *start,
                group.iter().map(|(_, dof)| dof.position).collect(),
                group.iter().map(|(_, dof)| dof.velocity).collect(),
            );
            let mut accelerations = vec![Vector3::zeros(); group.len()];
            field.accelerations(state.time, &state.positions, &mut accelerations)?;

            let mut samples = Vec::new();
            while state.time < time {
                let this_step = if time - state.time < step {
                    time - state.time
                } else {
                    step
                };
                integrator.step(&mut field, &mut state, &mut accelerations, this_step)?;
                samples.push(state.clone());
            }
            appended.push((ids, samples));
        }

        let mut count = 0;
        for (ids, samples) in appended {
            for sample in samples {
                for (index, segment) in ids.iter().enumerate() {
                    trajectory.append(
                        *segment,
                        sample.time,
                        DegreesOfFreedom::new(sample.positions[index], sample.velocities[index]),
                    )?;
                    count += 1;
                }
            }
        }
        debug!(segments = segments.len(), samples = count, to = %time, "fixed-step flow");
        Ok(())
    }

    /// Advance one massless trajectory segment with an adaptive step.
    ///
    /// Arguments
    /// ---------
    /// * `trajectory`: the tree holding the segment; its body must be massless.
    /// * `segment`: the segment to advance from its last sample.
    /// * `intrinsic_acceleration`: added to the gravitational field and to the
    ///   segment's own intrinsic acceleration.
    /// * `time`: the final instant.
    /// * `parameters`: tolerances, maximum number of steps and safety factor.
    ///
    /// Return
    /// ----------
    /// * [`FlowOutcome::Reached`] once the segment ends at `time`, or
    ///   [`FlowOutcome::MaxStepsExhausted`] if `max_steps` steps were appended first;
    ///   the caller may flow again from there.
    /// * [`GravitasError::Divergence`] if the step size underflows,
    ///   [`GravitasError::NotCovered`] if the segment ends before the epoch. Nothing is
    ///   appended when an error occurs.
    pub fn flow_with_adaptive_step(
        &mut self,
        trajectory: &mut DiscreteTrajectory,
        segment: SegmentId,
        intrinsic_acceleration: Option<&dyn Fn(Instant) -> Vector3<f64>>,
        time: Instant,
        parameters: &AdaptiveStepParameters,
    ) -> Result<FlowOutcome, GravitasError> {
        if !trajectory.body().is_massless() {
            return Err(GravitasError::WrongBodyKind);
        }
        let (start, dof) = trajectory.last_degrees_of_freedom(segment)?;
        if start >= time {
            return Ok(FlowOutcome::Reached);
        }
        self.check_flow_start(start)?;
        self.prolong(time)?;

        let first_step = self.parameters.step;
        let ids = [segment];
        let mut field = MasslessField {
            ephemeris: &*self,
            trajectory: &*trajectory,
            segments: &ids,
            extra_acceleration: intrinsic_acceleration,
        };
        let mut state = NewtonianState::new(start, vec![dof.position], vec![dof.velocity]);
        let mut samples = Vec::new();
        let outcome = embedded::integrate(
            &mut field,
            &mut state,
            time,
            first_step,
            &parameters.step_controller(),
            parameters.max_steps,
            |step| {
                samples.push((step.time, DegreesOfFreedom::new(step.positions[0], step.velocities[0])));
                Ok(())
            },
        )?;

        let count = samples.len();
        for (sample_time, sample) in samples {
            trajectory.append(segment, sample_time, sample)?;
        }
        match outcome {
            FlowOutcome::Reached => {
                debug!(steps = count, to = %time, "adaptive flow reached its final time");
            }
            FlowOutcome::MaxStepsExhausted { last_time } => {
                warn!(
                    max_steps = parameters.max_steps,
                    %last_time,
                    target = %time,
                    "adaptive flow exhausted its steps"
                );
            }
        }
        Ok(outcome)
    }

    /// Flows may only start inside or after the covered interval, never before the epoch.
    fn check_flow_start(&self, start: Instant) -> Result<(), GravitasError> {
        if start < self.t_min() {
            return Err(GravitasError::NotCovered {
                time: start,
                t_min: self.t_min(),
                t_max: self.t_max(),
            });
        }
        Ok(())
    }

    /// Positions of all massive bodies at a covered instant.
    fn positions_at(&self, time: Instant) -> Result<Vec<Vector3<f64>>, GravitasError> {
        self.trajectories
            .iter()
            .map(|trajectory| trajectory.evaluate_position(time))
            .collect()
    }
}

/// The massive bodies, integrated together.
struct MassiveBodiesField<'a> {
    sources: &'a [GravitySource],
}

impl NewtonianSystem for MassiveBodiesField<'_> {
    fn accelerations(
        &mut self,
        _time: Instant,
        positions: &[Vector3<f64>],
        accelerations: &mut [Vector3<f64>],
    ) -> Result<(), GravitasError> {
        massive_body_accelerations(self.sources, positions, accelerations);
        Ok(())
    }
}

/// Massless particles in the field of the ephemeris, with intrinsic accelerations.
struct MasslessField<'a> {
    ephemeris: &'a Ephemeris,
    trajectory: &'a DiscreteTrajectory,
    segments: &'a [SegmentId],
    extra_acceleration: Option<&'a dyn Fn(Instant) -> Vector3<f64>>,
}

impl NewtonianSystem for MasslessField<'_> {
    fn accelerations(
        &mut self,
        time: Instant,
        positions: &[Vector3<f64>],
        accelerations: &mut [Vector3<f64>],
    ) -> Result<(), GravitasError> {
        let source_positions: Vec<Vector3<f64>> = self
            .ephemeris
            .trajectories
            .iter()
            .map(|trajectory| trajectory.evaluate_or_extrapolate(time).position)
            .collect();
        let extra = self
            .extra_acceleration
            .map_or_else(Vector3::zeros, |acceleration| acceleration(time));

        for ((acceleration, position), segment) in accelerations
            .iter_mut()
            .zip(positions)
            .zip(self.segments)
        {
            *acceleration = massless_body_acceleration(&self.ephemeris.sources, &source_positions, position)
                + self.trajectory.evaluate_intrinsic_acceleration(*segment, time)?
                + extra;
        }
        Ok(())
    }
}
