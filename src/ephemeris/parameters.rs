//! Integration parameters of an [`super::Ephemeris`] and of its flows.

use hifitime::Duration;
use serde::{Deserialize, Serialize};

use crate::constants::{Meter, MeterPerSecond};
use crate::integrators::{StepController, SymplecticIntegrator};
use crate::time::duration_parts;

/// Fixed-step symplectic integration of the massive bodies.
///
/// The same integrator and step are used by
/// [`super::Ephemeris::flow_with_fixed_step`] for massless trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStepParameters {
    pub integrator: SymplecticIntegrator,
    #[serde(with = "duration_parts")]
    pub step: Duration,
}

impl FixedStepParameters {
    pub fn new(integrator: SymplecticIntegrator, step: Duration) -> Self {
        FixedStepParameters { integrator, step }
    }
}

impl Default for FixedStepParameters {
    fn default() -> Self {
        FixedStepParameters {
            integrator: SymplecticIntegrator::Order6,
            step: Duration::from_seconds(600.0),
        }
    }
}

/// Adaptive-step integration of one massless trajectory.
///
/// * `length_tolerance`: maximum position error per step.
/// * `speed_tolerance`: maximum velocity error per step.
/// * `max_steps`: number of accepted steps after which a flow gives up and reports
///   [`crate::integrators::FlowOutcome::MaxStepsExhausted`].
/// * `safety_factor`: fraction of the optimal step actually attempted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveStepParameters {
    pub length_tolerance: Meter,
    pub speed_tolerance: MeterPerSecond,
    pub max_steps: usize,
    pub safety_factor: f64,
}

impl AdaptiveStepParameters {
    pub fn new(length_tolerance: Meter, speed_tolerance: MeterPerSecond, max_steps: usize) -> Self {
        AdaptiveStepParameters {
            length_tolerance,
            speed_tolerance,
            max_steps,
            ..Default::default()
        }
    }

    pub(crate) fn step_controller(&self) -> StepController {
        StepController {
            length_tolerance: self.length_tolerance,
            speed_tolerance: self.speed_tolerance,
            safety_factor: self.safety_factor,
        }
    }
}

impl Default for AdaptiveStepParameters {
    fn default() -> Self {
        AdaptiveStepParameters {
            length_tolerance: 1.0,
            speed_tolerance: 1e-3,
            max_steps: 10_000,
            safety_factor: 0.9,
        }
    }
}

#[cfg(test)]
mod parameters_test {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let parameters = FixedStepParameters::new(
            SymplecticIntegrator::Order4,
            Duration::from_seconds(12.345_678_9),
        );
        let json = serde_json::to_string(&parameters).unwrap();
        let back: FixedStepParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, parameters);

        let adaptive = AdaptiveStepParameters::new(1e-3, 1e-6, 500);
        assert_eq!(adaptive.safety_factor, 0.9);
        let json = serde_json::to_string(&adaptive).unwrap();
        assert_eq!(
            serde_json::from_str::<AdaptiveStepParameters>(&json).unwrap(),
            adaptive
        );
    }
}
