#![allow(dead_code)]

use approx::assert_relative_eq;
use gravitas::body::{MassiveBody, RotationState};
use gravitas::ephemeris::{Ephemeris, FixedStepParameters};
use gravitas::geometry::{degrees, Barycentric, DegreesOfFreedom};
use gravitas::integrators::SymplecticIntegrator;
use gravitas::solar_system::SolarSystem;
use gravitas::time::Instant;
use hifitime::Duration;
use nalgebra::Vector3;

/// Gravitational parameters of the two bodies and their separation.
pub const BIG_MU: f64 = 5.0;
pub const SMALL_MU: f64 = 2.0;
pub const SEPARATION: f64 = 5.0;

/// Angular frequency of the circular two-body orbit, √(μ / d³).
pub fn angular_frequency() -> f64 {
    ((BIG_MU + SMALL_MU) / SEPARATION.powi(3)).sqrt()
}

pub fn period() -> f64 {
    2.0 * std::f64::consts::PI / angular_frequency()
}

pub fn t(seconds: f64) -> Instant {
    Instant::j2000() + Duration::from_seconds(seconds)
}

/// "Big" at (−10/7, 0, 0) and "Small" at (25/7, 0, 0) on a circular orbit around the
/// origin, counter-clockwise in the xy plane.
pub fn two_body_system() -> SolarSystem {
    let omega = angular_frequency();
    let big_x = -SEPARATION * SMALL_MU / (BIG_MU + SMALL_MU);
    let small_x = SEPARATION * BIG_MU / (BIG_MU + SMALL_MU);
    SolarSystem::new(Instant::j2000())
        .with_body(
            MassiveBody::new("Big", BIG_MU).unwrap(),
            DegreesOfFreedom::new(Vector3::new(big_x, 0.0, 0.0), Vector3::new(0.0, big_x * omega, 0.0)),
        )
        .unwrap()
        .with_body(
            MassiveBody::new("Small", SMALL_MU).unwrap(),
            DegreesOfFreedom::new(
                Vector3::new(small_x, 0.0, 0.0),
                Vector3::new(0.0, small_x * omega, 0.0),
            ),
        )
        .unwrap()
}

/// The same system with "Big" spinning about a tilted pole.
pub fn rotating_two_body_ephemeris(step: f64) -> Ephemeris {
    let binary = two_body_system();
    let mut system = SolarSystem::new(binary.epoch());
    for name in binary.names() {
        let body = binary.massive_body(name).unwrap().as_ref().clone();
        let state = binary.initial_state(name).unwrap();
        let body = if name == "Big" {
            body.with_rotation(RotationState {
                mean_radius: 0.5,
                axis_right_ascension: degrees(30.0),
                axis_declination: degrees(60.0),
                reference_angle: degrees(10.0),
                reference_instant: Instant::j2000(),
                angular_frequency: 0.75,
            })
        } else {
            body
        };
        system.add_body(body, state).unwrap();
    }
    system
        .make_ephemeris(FixedStepParameters::new(
            SymplecticIntegrator::Order6,
            Duration::from_seconds(step),
        ))
        .unwrap()
}

pub fn two_body_ephemeris(step: f64) -> Ephemeris {
    two_body_system()
        .make_ephemeris(FixedStepParameters::new(
            SymplecticIntegrator::Order6,
            Duration::from_seconds(step),
        ))
        .unwrap()
}

pub fn dof(position: [f64; 3], velocity: [f64; 3]) -> DegreesOfFreedom<Barycentric> {
    DegreesOfFreedom::new(Vector3::from(position), Vector3::from(velocity))
}

pub fn assert_dof_close<F: gravitas::geometry::Frame>(
    actual: &DegreesOfFreedom<F>,
    expected: &DegreesOfFreedom<F>,
    epsilon: f64,
) {
    assert_relative_eq!(actual.position, expected.position, epsilon = epsilon);
    assert_relative_eq!(actual.velocity, expected.velocity, epsilon = epsilon);
}
