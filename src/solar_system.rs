//! # Solar system builder
//!
//! Collects named massive bodies with their initial barycentric state at a common
//! epoch, then builds an [`Ephemeris`] from them.
//!
//! ## Overview
//!
//! Bodies keep their insertion order: the `n`-th body added is body `n` of the
//! ephemeris, which is also the index used by dynamic frames and their messages.
//!
//! ```rust,no_run
//! use gravitas::body::MassiveBody;
//! use gravitas::constants::{EARTH_GRAVITATIONAL_PARAMETER, SUN_GRAVITATIONAL_PARAMETER};
//! use gravitas::ephemeris::FixedStepParameters;
//! use gravitas::geometry::DegreesOfFreedom;
//! use gravitas::solar_system::SolarSystem;
//! use gravitas::time::Instant;
//! use nalgebra::Vector3;
//!
//! let solar_system = SolarSystem::new(Instant::j2000())
//!     .with_body(
//!         MassiveBody::new("Sun", SUN_GRAVITATIONAL_PARAMETER).unwrap(),
//!         DegreesOfFreedom::origin(),
//!     )
//!     .unwrap()
//!     .with_body(
//!         MassiveBody::new("Earth", EARTH_GRAVITATIONAL_PARAMETER).unwrap(),
//!         DegreesOfFreedom::new(Vector3::new(1.496e11, 0.0, 0.0), Vector3::new(0.0, 29_780.0, 0.0)),
//!     )
//!     .unwrap();
//! let ephemeris = solar_system.make_ephemeris(FixedStepParameters::default()).unwrap();
//! assert_eq!(ephemeris.body_index("Earth"), Some(1));
//! ```

use std::sync::Arc;

use crate::body::MassiveBody;
use crate::constants::GravitationalParameter;
use crate::ephemeris::{Ephemeris, FixedStepParameters};
use crate::geometry::{barycentre, Barycentric, DegreesOfFreedom};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;
use crate::trajectory::ContinuousTrajectory;

#[derive(Debug, Clone)]
pub struct SolarSystem {
    epoch: Instant,
    bodies: Vec<Arc<MassiveBody>>,
    initial_states: Vec<DegreesOfFreedom<Barycentric>>,
}

impl SolarSystem {
    pub fn new(epoch: Instant) -> Self {
        SolarSystem {
            epoch,
            bodies: Vec::new(),
            initial_states: Vec::new(),
        }
    }

    /// Add a body with its barycentric state at the epoch.
    ///
    /// Return
    /// ----------
    /// * [`GravitasError::InvalidBody`] if a body of the same name was already added.
    pub fn add_body(
        &mut self,
        body: MassiveBody,
        initial_state: DegreesOfFreedom<Barycentric>,
    ) -> Result<usize, GravitasError> {
        if self.index(body.name()).is_some() {
            return Err(GravitasError::InvalidBody(format!(
                "duplicate body name {}",
                body.name()
            )));
        }
        self.bodies.push(Arc::new(body));
        self.initial_states.push(initial_state);
        Ok(self.bodies.len() - 1)
    }

    /// Chainable form of [`SolarSystem::add_body`].
    pub fn with_body(
        mut self,
        body: MassiveBody,
        initial_state: DegreesOfFreedom<Barycentric>,
    ) -> Result<Self, GravitasError> {
        self.add_body(body, initial_state)?;
        Ok(self)
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bodies.iter().map(|body| body.name())
    }

    /// Index of the body called `name`, in the solar system and in its ephemeris.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|body| body.name() == name)
    }

    pub fn massive_body(&self, name: &str) -> Option<&Arc<MassiveBody>> {
        self.index(name).map(|index| &self.bodies[index])
    }

    pub fn initial_state(&self, name: &str) -> Option<DegreesOfFreedom<Barycentric>> {
        self.index(name).map(|index| self.initial_states[index])
    }

    pub fn gravitational_parameter(&self, name: &str) -> Option<GravitationalParameter> {
        self.massive_body(name)
            .map(|body| body.gravitational_parameter())
    }

    /// Barycentre of the initial states, weighted by gravitational parameter.
    pub fn barycentre(&self) -> Option<DegreesOfFreedom<Barycentric>> {
        barycentre(
            self.initial_states
                .iter()
                .zip(&self.bodies)
                .map(|(state, body)| (*state, body.gravitational_parameter())),
        )
    }

    /// Build an ephemeris covering the epoch, with the bodies in insertion order.
    pub fn make_ephemeris(&self, parameters: FixedStepParameters) -> Result<Ephemeris, GravitasError> {
        Ephemeris::new(
            self.bodies.clone(),
            self.initial_states.clone(),
            self.epoch,
            parameters,
        )
    }

    /// The continuous trajectory of the body called `name` in `ephemeris`.
    pub fn trajectory<'e>(
        &self,
        ephemeris: &'e Ephemeris,
        name: &str,
    ) -> Result<&'e ContinuousTrajectory, GravitasError> {
        let index = self
            .index(name)
            .ok_or_else(|| GravitasError::InvalidBody(format!("unknown body {name}")))?;
        ephemeris.trajectory(index)
    }
}

#[cfg(test)]
mod solar_system_test {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_builder() {
        let mut solar_system = SolarSystem::new(Instant::j2000())
            .with_body(
                MassiveBody::new("Big", 5.0).unwrap(),
                DegreesOfFreedom::new(Vector3::new(0.8, -0.6, 0.0), Vector3::new(-16.0, 12.0, 0.0)),
            )
            .unwrap();
        assert_eq!(
            solar_system
                .add_body(
                    MassiveBody::new("Small", 2.0).unwrap(),
                    DegreesOfFreedom::new(Vector3::new(5.0, 5.0, 0.0), Vector3::new(40.0, -30.0, 0.0)),
                )
                .unwrap(),
            1
        );
        assert!(matches!(
            solar_system.add_body(MassiveBody::new("Big", 1.0).unwrap(), DegreesOfFreedom::origin()),
            Err(GravitasError::InvalidBody(_))
        ));

        assert_eq!(solar_system.len(), 2);
        assert_eq!(solar_system.names().collect::<Vec<_>>(), ["Big", "Small"]);
        assert_eq!(solar_system.gravitational_parameter("Small"), Some(2.0));
        assert_eq!(solar_system.index("Medium"), None);

        let barycentre = solar_system.barycentre().unwrap();
        assert_eq!(barycentre.position, Vector3::new(2.0, 1.0, 0.0));
        assert_eq!(barycentre.velocity, Vector3::zeros());

        let ephemeris = solar_system
            .make_ephemeris(FixedStepParameters::default())
            .unwrap();
        assert_eq!(ephemeris.body_index("Small"), Some(1));
        assert_eq!(
            solar_system
                .trajectory(&ephemeris, "Big")
                .unwrap()
                .evaluate_degrees_of_freedom(Instant::j2000())
                .unwrap(),
            solar_system.initial_state("Big").unwrap()
        );
    }
}
