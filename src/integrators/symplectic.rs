//! Fixed-step symplectic integrators.
//!
//! Every method is a composition of the kick-drift-kick leapfrog with substeps
//! `wᵢ·h`: the leapfrog itself (order 2), the triple-jump composition of order 4,
//! and Yoshida's solution A of order 6. The acceleration computed at the end of a
//! substep is reused for the first kick of the next one, so a step costs one force
//! evaluation per substage.

use hifitime::Duration;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::gravitas_errors::GravitasError;

use super::{NewtonianState, NewtonianSystem};

const LEAPFROG_WEIGHTS: [f64; 1] = [1.0];

// w₁ = 1 / (2 − 2^{1/3}), w₀ = −2^{1/3} / (2 − 2^{1/3})
const ORDER_4_WEIGHTS: [f64; 3] = [
    1.351_207_191_959_657_8,
    -1.702_414_383_919_315_5,
    1.351_207_191_959_657_8,
];

// Yoshida (1990), solution A.
const W1: f64 = 0.784_513_610_477_557_263_82;
const W2: f64 = 0.235_573_213_359_358_133_68;
const W3: f64 = -1.177_679_984_178_871_006_95;
const W0: f64 = 1.315_186_320_683_911_218_89;
const ORDER_6_WEIGHTS: [f64; 7] = [W3, W2, W1, W0, W1, W2, W3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SymplecticIntegrator {
    Leapfrog,
    Order4,
    #[default]
    Order6,
}

impl SymplecticIntegrator {
    pub fn order(&self) -> usize {
        match self {
            SymplecticIntegrator::Leapfrog => 2,
            SymplecticIntegrator::Order4 => 4,
            SymplecticIntegrator::Order6 => 6,
        }
    }

    fn weights(&self) -> &'static [f64] {
        match self {
            SymplecticIntegrator::Leapfrog => &LEAPFROG_WEIGHTS,
            SymplecticIntegrator::Order4 => &ORDER_4_WEIGHTS,
            SymplecticIntegrator::Order6 => &ORDER_6_WEIGHTS,
        }
    }

    /// Advance `state` by `step`.
    ///
    /// Arguments
    /// ---------
    /// * `system`: the force model.
    /// * `state`: positions and velocities, advanced in place. On return its time is
    ///   exactly `state.time + step`.
    /// * `accelerations`: the accelerations at the current state. On return they hold
    ///   the accelerations at the new state, ready for the next call.
    /// * `step`: the step, which may differ between calls.
    pub fn step<S: NewtonianSystem + ?Sized>(
        &self,
        system: &mut S,
        state: &mut NewtonianState,
        accelerations: &mut [Vector3<f64>],
        step: Duration,
    ) -> Result<(), GravitasError> {
        let start = state.time;
        let h = step.to_seconds();
        let weights = self.weights();
        let mut elapsed = 0.0;

        for (stage, weight) in weights.iter().enumerate() {
            let half_kick = 0.5 * weight * h;
            let drift = weight * h;

            for (velocity, acceleration) in state.velocities.iter_mut().zip(accelerations.iter()) {
                *velocity += acceleration * half_kick;
            }
            for (position, velocity) in state.positions.iter_mut().zip(state.velocities.iter()) {
                *position += velocity * drift;
            }

            elapsed += drift;
            let time = if stage + 1 == weights.len() {
                start + step
            } else {
                start + Duration::from_seconds(elapsed)
            };
            system.accelerations(time, &state.positions, accelerations)?;

            for (velocity, acceleration) in state.velocities.iter_mut().zip(accelerations.iter()) {
                *velocity += acceleration * half_kick;
            }
        }

        state.time = start + step;
        Ok(())
    }
}
