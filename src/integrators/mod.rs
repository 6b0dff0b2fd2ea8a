//! # Integrators for Newtonian systems
//!
//! Two integration modes are used by the [`crate::ephemeris::Ephemeris`]:
//!
//! - [`symplectic`]: fixed-step symplectic compositions of the kick-drift-kick
//!   leapfrog (orders 2, 4 and 6). Used for the massive bodies, which move together,
//!   and for fixed-step flows of massless trajectories.
//! - [`embedded`]: the Dormand–Prince 5(4) embedded Runge–Kutta pair with step-size
//!   control. Used for massless trajectories flowed with an adaptive step.
//!
//! Both integrate a [`NewtonianSystem`]: a set of points whose accelerations depend
//! on time and positions only.

pub mod embedded;
pub mod symplectic;

use nalgebra::Vector3;

use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

pub use embedded::{FlowOutcome, StepController};
pub use symplectic::SymplecticIntegrator;

/// Second-order system `q̈ = a(t, q)` over a fixed number of points.
pub trait NewtonianSystem {
    /// Write the acceleration of every point of `positions` at `time` into
    /// `accelerations`. Both slices have the same length.
    fn accelerations(
        &mut self,
        time: Instant,
        positions: &[Vector3<f64>],
        accelerations: &mut [Vector3<f64>],
    ) -> Result<(), GravitasError>;
}

/// Positions and velocities of the points of a [`NewtonianSystem`] at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonianState {
    pub time: Instant,
    pub positions: Vec<Vector3<f64>>,
    pub velocities: Vec<Vector3<f64>>,
}

impl NewtonianState {
    pub fn new(time: Instant, positions: Vec<Vector3<f64>>, velocities: Vec<Vector3<f64>>) -> Self {
        NewtonianState {
            time,
            positions,
            velocities,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
