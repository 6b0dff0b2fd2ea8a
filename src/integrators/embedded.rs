//! Embedded explicit Runge–Kutta integration with step-size control.
//!
//! The method is the Dormand–Prince 5(4) pair: the fifth-order solution is
//! propagated and the difference with the embedded fourth-order solution estimates
//! the local error. The last stage of an accepted step is the first stage of the
//! next one.
//!
//! The error of a step is measured per point as
//! `max(|Δposition| / length_tolerance, |Δvelocity| / speed_tolerance)`;
//! the step is accepted when the largest of these ratios is at most 1.

use hifitime::Duration;
use nalgebra::Vector3;
use tracing::trace;

use crate::constants::{Meter, MeterPerSecond};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

use super::{NewtonianState, NewtonianSystem};

const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19_372.0 / 6_561.0,
        -25_360.0 / 2_187.0,
        64_448.0 / 6_561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9_017.0 / 3_168.0,
        -355.0 / 33.0,
        46_732.0 / 5_247.0,
        49.0 / 176.0,
        -5_103.0 / 18_656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1_113.0,
        125.0 / 192.0,
        -2_187.0 / 6_784.0,
        11.0 / 84.0,
    ],
];

// Fifth-order weights minus fourth-order weights.
const ERROR: [f64; 7] = [
    71.0 / 57_600.0,
    0.0,
    -71.0 / 16_695.0,
    71.0 / 1_920.0,
    -17_253.0 / 339_200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const STAGES: usize = 7;
const MINIMUM_SHRINK: f64 = 0.2;
const MAXIMUM_GROWTH: f64 = 5.0;

/// How an adaptive integration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The requested final instant was reached.
    Reached,
    /// `max_steps` steps were taken before reaching the final instant. The state
    /// was advanced to `last_time`; the caller may resume from there.
    MaxStepsExhausted { last_time: Instant },
}

/// Error tolerances and step-size policy of the adaptive integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepController {
    pub length_tolerance: Meter,
    pub speed_tolerance: MeterPerSecond,
    pub safety_factor: f64,
}

impl StepController {
    /// Ratio of the estimated error to the tolerance; the step is acceptable when ≤ 1.
    fn error_ratio(&self, position_errors: &[Vector3<f64>], velocity_errors: &[Vector3<f64>]) -> f64 {
        position_errors
            .iter()
            .zip(velocity_errors)
            .map(|(dq, dv)| {
                let position_ratio = dq.norm() / self.length_tolerance;
                let speed_ratio = dv.norm() / self.speed_tolerance;
                if position_ratio.is_nan() || speed_ratio.is_nan() {
                    f64::INFINITY
                } else {
                    position_ratio.max(speed_ratio)
                }
            })
            .fold(0.0, f64::max)
    }

    /// Factor by which to multiply the step after a step with the given error ratio.
    fn step_factor(&self, error_ratio: f64) -> f64 {
        if error_ratio == 0.0 {
            return MAXIMUM_GROWTH;
        }
        (self.safety_factor * error_ratio.powf(-1.0 / 5.0)).clamp(MINIMUM_SHRINK, MAXIMUM_GROWTH)
    }
}

/// Integrate `state` up to `t_final` with Dormand–Prince 5(4).
///
/// Arguments
/// ---------
/// * `system`: the force model.
/// * `state`: the initial state, advanced in place.
/// * `t_final`: the instant to reach, after `state.time`.
/// * `first_step`: the initial trial step; it is shortened if it overshoots `t_final`.
/// * `controller`: tolerances and safety factor.
/// * `max_steps`: maximum number of accepted steps.
/// * `on_step`: called with the state after every accepted step.
///
/// Return
/// ----------
/// * [`FlowOutcome::Reached`] when `state.time == t_final`,
///   [`FlowOutcome::MaxStepsExhausted`] when `max_steps` steps were accepted first.
/// * [`GravitasError::Divergence`] when the step size underflows one nanosecond.
pub fn integrate<S, F>(
    system: &mut S,
    state: &mut NewtonianState,
    t_final: Instant,
    first_step: Duration,
    controller: &StepController,
    max_steps: usize,
    mut on_step: F,
) -> Result<FlowOutcome, GravitasError>
where
    S: NewtonianSystem + ?Sized,
    F: FnMut(&NewtonianState) -> Result<(), GravitasError>,
{
    let n = state.len();
    let mut k_position = vec![vec![Vector3::<f64>::zeros(); n]; STAGES];
    let mut k_velocity = vec![vec![Vector3::<f64>::zeros(); n]; STAGES];
    let mut stage_positions = vec![Vector3::<f64>::zeros(); n];
    let mut stage_velocities = vec![Vector3::<f64>::zeros(); n];
    let mut position_errors = vec![Vector3::<f64>::zeros(); n];
    let mut velocity_errors = vec![Vector3::<f64>::zeros(); n];

    // First stage: derivative at the initial state.
    k_position[0].copy_from_slice(&state.velocities);
    system.accelerations(state.time, &state.positions, &mut k_velocity[0])?;

    let mut step_seconds = first_step.to_seconds().abs();
    let mut accepted = 0;

    while state.time < t_final {
        if accepted == max_steps {
            return Ok(FlowOutcome::MaxStepsExhausted {
                last_time: state.time,
            });
        }

        let remaining = t_final - state.time;
        let mut step = Duration::from_seconds(step_seconds);
        let last_step = step >= remaining;
        if last_step {
            step = remaining;
        }
        if step <= Duration::ZERO {
            return Err(GravitasError::Divergence {
                time: state.time,
                step: step_seconds,
            });
        }
        let h = step.to_seconds();

        for stage in 1..STAGES {
            for point in 0..n {
                let mut dq = Vector3::<f64>::zeros();
                let mut dv = Vector3::<f64>::zeros();
                for previous in 0..stage {
                    let a = A[stage][previous];
                    if a != 0.0 {
                        dq += k_position[previous][point] * a;
                        dv += k_velocity[previous][point] * a;
                    }
                }
                stage_positions[point] = state.positions[point] + dq * h;
                stage_velocities[point] = state.velocities[point] + dv * h;
            }
            let stage_time = if stage + 1 == STAGES {
                state.time + step
            } else {
                state.time + Duration::from_seconds(C[stage] * h)
            };
            k_position[stage].copy_from_slice(&stage_velocities);
            system.accelerations(stage_time, &stage_positions, &mut k_velocity[stage])?;
        }

        // The last stage was evaluated at the fifth-order solution, now in the stage buffers.
        for point in 0..n {
            let mut dq = Vector3::<f64>::zeros();
            let mut dv = Vector3::<f64>::zeros();
            for stage in 0..STAGES {
                dq += k_position[stage][point] * ERROR[stage];
                dv += k_velocity[stage][point] * ERROR[stage];
            }
            position_errors[point] = dq * h;
            velocity_errors[point] = dv * h;
        }

        let error_ratio = controller.error_ratio(&position_errors, &velocity_errors);
        let factor = controller.step_factor(error_ratio);

        if error_ratio <= 1.0 {
            state.positions.copy_from_slice(&stage_positions);
            state.velocities.copy_from_slice(&stage_velocities);
            state.time = if last_step { t_final } else { state.time + step };
            accepted += 1;
            on_step(state)?;

            k_position.swap(0, STAGES - 1);
            k_velocity.swap(0, STAGES - 1);
            step_seconds = h * factor;
        } else {
            trace!(
                time = %state.time,
                step = h,
                error_ratio,
                "rejected adaptive step"
            );
            step_seconds = h * factor;
        }
    }

    Ok(FlowOutcome::Reached)
}

#[cfg(test)]
mod embedded_test {
    use super::*;
    use approx::assert_relative_eq;

    /// Point mass of unit gravitational parameter at the origin.
    struct Kepler;

    impl NewtonianSystem for Kepler {
        fn accelerations(
            &mut self,
            _time: Instant,
            positions: &[Vector3<f64>],
            accelerations: &mut [Vector3<f64>],
        ) -> Result<(), GravitasError> {
            for (acceleration, position) in accelerations.iter_mut().zip(positions) {
                *acceleration = -position / position.norm().powi(3);
            }
            Ok(())
        }
    }

    fn controller() -> StepController {
        StepController {
            length_tolerance: 1e-10,
            speed_tolerance: 1e-10,
            safety_factor: 0.9,
        }
    }

    fn circular_state() -> NewtonianState {
        NewtonianState::new(Instant::j2000(), vec![Vector3::x()], vec![Vector3::y()])
    }

    #[test]
    fn test_circular_orbit_period() {
        let mut state = circular_state();
        let period = 2.0 * std::f64::consts::PI;
        let t_final = Instant::j2000() + Duration::from_seconds(period);
        let mut times = Vec::new();

        let outcome = integrate(
            &mut Kepler,
            &mut state,
            t_final,
            Duration::from_seconds(0.1),
            &controller(),
            10_000,
            |step| {
                times.push(step.time);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(outcome, FlowOutcome::Reached);
        assert_eq!(state.time, t_final);
        assert_eq!(times.last(), Some(&t_final));
        assert!(times.windows(2).all(|pair| pair[0] < pair[1]));

        let elapsed = (t_final - Instant::j2000()).to_seconds();
        assert_relative_eq!(
            state.positions[0],
            Vector3::new(elapsed.cos(), elapsed.sin(), 0.0),
            epsilon = 1e-7
        );
    }

    #[test]
    fn test_max_steps() {
        let mut state = circular_state();
        let t_final = Instant::j2000() + Duration::from_seconds(100.0);
        let mut count = 0;
        let outcome = integrate(
            &mut Kepler,
            &mut state,
            t_final,
            Duration::from_seconds(0.01),
            &controller(),
            5,
            |_| {
                count += 1;
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(count, 5);
        assert_eq!(
            outcome,
            FlowOutcome::MaxStepsExhausted {
                last_time: state.time
            }
        );
        assert!(state.time < t_final);
    }

    #[test]
    fn test_divergence() {
        // Starting at the singularity: the error estimate is not finite, so every
        // step is rejected until it underflows.
        let mut state = NewtonianState::new(
            Instant::j2000(),
            vec![Vector3::new(1e-300, 0.0, 0.0)],
            vec![Vector3::zeros()],
        );
        let result = integrate(
            &mut Kepler,
            &mut state,
            Instant::j2000() + Duration::from_seconds(1.0),
            Duration::from_seconds(0.1),
            &controller(),
            100,
            |_| Ok(()),
        );
        assert!(matches!(result, Err(GravitasError::Divergence { .. })));
    }
}
