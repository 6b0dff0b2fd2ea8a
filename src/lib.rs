//! # gravitas
//!
//! Gravitational N-body ephemerides, forking trajectory trees and dynamic reference
//! frames.
//!
//! ## Overview
//!
//! - [`ephemeris::Ephemeris`]: integrates a fixed set of [`body::MassiveBody`] values
//!   with a fixed-step symplectic integrator, answers gravitational field queries and
//!   flows massless trajectories with a fixed or adaptive step.
//! - [`trajectory::DiscreteTrajectory`]: an append-only tree of time series. Forks
//!   share their history up to the fork instant with their parent.
//! - [`dynamic_frame::DynamicFrame`]: non-inertial frames following one or two bodies,
//!   with the fictitious accelerations they induce.
//! - [`solar_system::SolarSystem`]: builds an ephemeris from named bodies.
//!
//! All quantities are SI `f64`s ([`constants`]); time is an exact [`time::Instant`].
//! Every fallible operation returns a [`gravitas_errors::GravitasError`]; a failed
//! operation appends nothing to the trajectories it was given.

pub mod body;
pub mod constants;
pub mod dynamic_frame;
pub mod ephemeris;
pub mod geometry;
pub mod gravitas_errors;
pub mod integrators;
pub mod solar_system;
pub mod time;
pub mod trajectory;
