//! # Rigid motions between reference frames
//!
//! A [`RigidMotion<From, To>`] describes, at one instant, how the frame `To` moves with
//! respect to the frame `From`:
//!
//! * `rotation` maps `From` coordinates onto `To` axes,
//! * `origin` and `origin_velocity` are the position and velocity of the `To` origin,
//!   expressed in `From`,
//! * `angular_velocity` is the angular velocity of the `To` axes relative to `From`,
//!   expressed in `From`.
//!
//! Degrees of freedom are carried across with
//!
//! ```text
//! r' = R (r − o)
//! v' = R (v − ȯ − Ω × (r − o))
//! ```
//!
//! and [`RigidMotion::inverse`] is the exact algebraic inverse.
//!
//! [`AcceleratedRigidMotion`] adds the second derivatives (angular acceleration and
//! origin acceleration) needed to compute fictitious forces.

use std::marker::PhantomData;

use nalgebra::{Rotation3, Vector3};

use super::{DegreesOfFreedom, Frame, Vector};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidMotion<From: Frame, To: Frame> {
    rotation: Rotation3<f64>,
    origin: Vector3<f64>,
    origin_velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    frames: PhantomData<(From, To)>,
}

impl<From: Frame, To: Frame> RigidMotion<From, To> {
    /// Build a rigid motion from its instantaneous components.
    ///
    /// Arguments
    /// ---------
    /// * `rotation`: maps `From` coordinates onto the `To` axes.
    /// * `origin`: position of the `To` origin, in `From`.
    /// * `origin_velocity`: velocity of the `To` origin, in `From`.
    /// * `angular_velocity`: angular velocity of the `To` axes, in `From`.
    pub fn new(
        rotation: Rotation3<f64>,
        origin: Vector3<f64>,
        origin_velocity: Vector3<f64>,
        angular_velocity: Vector3<f64>,
    ) -> Self {
        RigidMotion {
            rotation,
            origin,
            origin_velocity,
            angular_velocity,
            frames: PhantomData,
        }
    }

    pub fn identity() -> Self {
        Self::new(
            Rotation3::identity(),
            Vector3::zeros(),
            Vector3::zeros(),
            Vector3::zeros(),
        )
    }

    pub fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    pub fn origin(&self) -> &Vector3<f64> {
        &self.origin
    }

    pub fn origin_velocity(&self) -> &Vector3<f64> {
        &self.origin_velocity
    }

    pub fn angular_velocity(&self) -> &Vector3<f64> {
        &self.angular_velocity
    }

    /// Angular velocity of the `To` axes, expressed in `To`.
    pub fn angular_velocity_in_target(&self) -> Vector<To> {
        Vector::new(self.rotation * self.angular_velocity)
    }

    pub fn apply(&self, dof: &DegreesOfFreedom<From>) -> DegreesOfFreedom<To> {
        let relative_position = dof.position - self.origin;
        let relative_velocity = dof.velocity
            - self.origin_velocity
            - self.angular_velocity.cross(&relative_position);
        DegreesOfFreedom::new(
            self.rotation * relative_position,
            self.rotation * relative_velocity,
        )
    }

    /// Rotate a free vector into `To`. Translation does not apply to free vectors.
    pub fn rotate(&self, vector: &Vector<From>) -> Vector<To> {
        Vector::new(self.rotation * vector.coordinates)
    }

    pub fn inverse(&self) -> RigidMotion<To, From> {
        // Origin of `From` seen from `To`: apply the motion to the `From` origin at rest.
        let from_origin = self.apply(&DegreesOfFreedom::origin());
        RigidMotion::new(
            self.rotation.inverse(),
            from_origin.position,
            from_origin.velocity,
            -(self.rotation * self.angular_velocity),
        )
    }
}

/// A [`RigidMotion`] together with the second derivatives of the frame motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcceleratedRigidMotion<From: Frame, To: Frame> {
    rigid_motion: RigidMotion<From, To>,
    angular_acceleration: Vector3<f64>,
    origin_acceleration: Vector3<f64>,
}

impl<From: Frame, To: Frame> AcceleratedRigidMotion<From, To> {
    /// Arguments
    /// ---------
    /// * `rigid_motion`: the instantaneous rigid motion.
    /// * `angular_acceleration`: time derivative of the angular velocity, in `From`.
    /// * `origin_acceleration`: acceleration of the `To` origin, in `From`.
    pub fn new(
        rigid_motion: RigidMotion<From, To>,
        angular_acceleration: Vector3<f64>,
        origin_acceleration: Vector3<f64>,
    ) -> Self {
        AcceleratedRigidMotion {
            rigid_motion,
            angular_acceleration,
            origin_acceleration,
        }
    }

    pub fn rigid_motion(&self) -> &RigidMotion<From, To> {
        &self.rigid_motion
    }

    pub fn angular_acceleration(&self) -> &Vector3<f64> {
        &self.angular_acceleration
    }

    pub fn origin_acceleration(&self) -> &Vector3<f64> {
        &self.origin_acceleration
    }
}
