//! # Trajectories
//!
//! Two representations of the motion of a body:
//!
//! - [`discrete::DiscreteTrajectory`]: the forking trajectory store. A tree of
//!   segments of time-ordered samples, supporting append, fork at an existing
//!   sample, fork deletion and truncation on either side. Forks share their
//!   history up to the fork instant with their ancestors.
//! - [`continuous::ContinuousTrajectory`]: the integrated solution of one massive
//!   body, evaluable at any instant it covers.
//!
//! [`message`] holds the serialized form of a discrete trajectory tree.

pub mod continuous;
pub mod discrete;
pub mod message;

pub use continuous::ContinuousTrajectory;
pub use discrete::{DiscreteTrajectory, IntrinsicAcceleration, SegmentId};
pub use message::TrajectoryMessage;
