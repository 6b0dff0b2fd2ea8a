//! # Dynamic reference frames
//!
//! A [`DynamicFrame`] is a reference frame whose origin and axes follow one or two
//! massive bodies of an [`Ephemeris`]. At any covered instant it yields the rigid
//! motion from the inertial [`Barycentric`] frame to the [`Navigation`] frame, and the
//! fictitious accelerations a point moving in the frame experiences.
//!
//! ## Overview
//!
//! The frame kinds form a closed set, see [`FrameDefinition`]:
//!
//! | Kind | Origin | Axes |
//! |------|--------|------|
//! | [`BarycentricRotating`] | barycentre of two bodies | x towards the secondary, z along their relative angular momentum |
//! | [`BodyCentredBodyDirection`] | primary body | as above |
//! | [`BodyCentredNonRotating`] | centre body | inertial axes |
//! | [`BodySurface`] | centre body | body-fixed axes of a rotating body |
//!
//! Every query is a pure function of the ephemeris at the requested instant; the
//! frame holds no state besides the body indices. All derivatives (angular velocity,
//! angular acceleration, origin acceleration) are analytic, computed from positions,
//! velocities and gravitational accelerations of the reference bodies.
//!
//! ## Geometric acceleration
//!
//! For a point at `r` with velocity `v` in the frame, with `Ω` the angular velocity
//! of the frame and `a₀` the acceleration of its origin:
//!
//! ```text
//! linear      = −a₀
//! centrifugal = −Ω × (Ω × r)
//! Coriolis    = −2 Ω × v
//! Euler       = −(dΩ/dt) × r
//! ```
//!
//! all expressed in the frame. [`DynamicFrame::fictitious_accelerations`] exposes the
//! four terms, [`DynamicFrame::geometric_acceleration`] their sum and
//! [`DynamicFrame::total_acceleration`] adds the gravitational field.
//!
//! ## Serialization
//!
//! [`DynamicFrame::write_to_message`] produces a [`DynamicFrameMessage`] carrying only
//! body indices; [`DynamicFrame::read_from_message`] resolves them against an
//! ephemeris.

mod barycentric_rotating;
mod body_centred_body_direction;
mod body_centred_non_rotating;
mod body_surface;
pub mod message;

use nalgebra::{Rotation3, Vector3};

use crate::body::MassiveBody;
use crate::ephemeris::Ephemeris;
use crate::geometry::{
    rotation_from_basis, AcceleratedRigidMotion, Barycentric, DegreesOfFreedom, Navigation,
    RigidMotion, Vector,
};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

pub use barycentric_rotating::BarycentricRotating;
pub use body_centred_body_direction::BodyCentredBodyDirection;
pub use body_centred_non_rotating::BodyCentredNonRotating;
pub use body_surface::BodySurface;
pub use message::DynamicFrameMessage;

/// What a dynamic frame needs to know about the massive bodies.
///
/// Implemented by [`Ephemeris`]; tests substitute fixed states.
pub trait FrameField {
    /// The massive body at `index`, or [`GravitasError::UnresolvedReference`].
    fn massive_body(&self, index: usize) -> Result<&MassiveBody, GravitasError>;

    fn body_degrees_of_freedom(
        &self,
        index: usize,
        time: Instant,
    ) -> Result<DegreesOfFreedom<Barycentric>, GravitasError>;

    fn acceleration_on_massive_body(
        &self,
        index: usize,
        time: Instant,
    ) -> Result<Vector3<f64>, GravitasError>;

    fn acceleration_on_massless_body(
        &self,
        position: &Vector3<f64>,
        time: Instant,
    ) -> Result<Vector3<f64>, GravitasError>;
}

impl FrameField for Ephemeris {
    fn massive_body(&self, index: usize) -> Result<&MassiveBody, GravitasError> {
        self.body(index).map(|body| &**body)
    }

    fn body_degrees_of_freedom(
        &self,
        index: usize,
        time: Instant,
    ) -> Result<DegreesOfFreedom<Barycentric>, GravitasError> {
        self.trajectory(index)?.evaluate_degrees_of_freedom(time)
    }

    fn acceleration_on_massive_body(
        &self,
        index: usize,
        time: Instant,
    ) -> Result<Vector3<f64>, GravitasError> {
        self.compute_gravitational_acceleration_on_massive_body(index, time)
    }

    fn acceleration_on_massless_body(
        &self,
        position: &Vector3<f64>,
        time: Instant,
    ) -> Result<Vector3<f64>, GravitasError> {
        self.compute_gravitational_acceleration_on_massless_body(position, time)
    }
}

/// The closed set of frame kinds, with the indices of their reference bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDefinition {
    BarycentricRotating(BarycentricRotating),
    BodyCentredBodyDirection(BodyCentredBodyDirection),
    BodyCentredNonRotating(BodyCentredNonRotating),
    BodySurface(BodySurface),
}

/// The four fictitious terms of the geometric acceleration, in the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FictitiousAccelerations {
    pub linear: Vector<Navigation>,
    pub centrifugal: Vector<Navigation>,
    pub coriolis: Vector<Navigation>,
    pub euler: Vector<Navigation>,
}

impl FictitiousAccelerations {
    pub fn total(&self) -> Vector<Navigation> {
        self.linear + self.centrifugal + self.coriolis + self.euler
    }
}

/// A dynamic frame bound to the field of massive bodies it follows.
///
/// The borrow ties the frame to its ephemeris: the ephemeris cannot be prolonged or
/// dropped while the frame is alive.
pub struct DynamicFrame<'e, E: FrameField = Ephemeris> {
    field: &'e E,
    definition: FrameDefinition,
}

impl<E: FrameField> Clone for DynamicFrame<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: FrameField> Copy for DynamicFrame<'_, E> {}

impl<E: FrameField> std::fmt::Debug for DynamicFrame<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicFrame")
            .field("definition", &self.definition)
            .finish()
    }
}

impl<'e, E: FrameField> DynamicFrame<'e, E> {
    /// Bind a frame definition to a field.
    ///
    /// Arguments
    /// ---------
    /// * `field`: the ephemeris (or any [`FrameField`]) providing the bodies.
    /// * `definition`: the frame kind and its body indices.
    ///
    /// Return
    /// ----------
    /// * The frame, or [`GravitasError::UnresolvedReference`] for an index with no
    ///   body, [`GravitasError::InvalidBody`] when the two reference bodies are the
    ///   same, [`GravitasError::BodyIsNotRotating`] for a body-surface frame around a
    ///   body without rotation state.
    pub fn new(field: &'e E, definition: FrameDefinition) -> Result<Self, GravitasError> {
        match &definition {
            FrameDefinition::BarycentricRotating(BarycentricRotating { primary, secondary })
            | FrameDefinition::BodyCentredBodyDirection(BodyCentredBodyDirection {
                primary,
                secondary,
            }) => {
                field.massive_body(*primary)?;
                field.massive_body(*secondary)?;
                if primary == secondary {
                    return Err(GravitasError::InvalidBody(format!(
                        "primary and secondary are both body {primary}"
                    )));
                }
            }
            FrameDefinition::BodyCentredNonRotating(BodyCentredNonRotating { centre }) => {
                field.massive_body(*centre)?;
            }
            FrameDefinition::BodySurface(BodySurface { centre }) => {
                let body = field.massive_body(*centre)?;
                if body.rotation().is_none() {
                    return Err(GravitasError::BodyIsNotRotating(body.name().to_string()));
                }
            }
        }
        Ok(DynamicFrame { field, definition })
    }

    pub fn barycentric_rotating(
        field: &'e E,
        primary: usize,
        secondary: usize,
    ) -> Result<Self, GravitasError> {
        Self::new(
            field,
            FrameDefinition::BarycentricRotating(BarycentricRotating { primary, secondary }),
        )
    }

    pub fn body_centred_body_direction(
        field: &'e E,
        primary: usize,
        secondary: usize,
    ) -> Result<Self, GravitasError> {
        Self::new(
            field,
            FrameDefinition::BodyCentredBodyDirection(BodyCentredBodyDirection {
                primary,
                secondary,
            }),
        )
    }

    pub fn body_centred_non_rotating(field: &'e E, centre: usize) -> Result<Self, GravitasError> {
        Self::new(
            field,
            FrameDefinition::BodyCentredNonRotating(BodyCentredNonRotating { centre }),
        )
    }

    pub fn body_surface(field: &'e E, centre: usize) -> Result<Self, GravitasError> {
        Self::new(field, FrameDefinition::BodySurface(BodySurface { centre }))
    }

    pub fn definition(&self) -> &FrameDefinition {
        &self.definition
    }

    /// Rigid motion carrying inertial degrees of freedom into this frame at `time`.
    pub fn to_this_frame_at_time(
        &self,
        time: Instant,
    ) -> Result<RigidMotion<Barycentric, Navigation>, GravitasError> {
        match &self.definition {
            FrameDefinition::BarycentricRotating(frame) => frame.rigid_motion(self.field, time),
            FrameDefinition::BodyCentredBodyDirection(frame) => frame.rigid_motion(self.field, time),
            FrameDefinition::BodyCentredNonRotating(frame) => frame.rigid_motion(self.field, time),
            FrameDefinition::BodySurface(frame) => frame.rigid_motion(self.field, time),
        }
    }

    /// Exact inverse of [`DynamicFrame::to_this_frame_at_time`].
    pub fn from_this_frame_at_time(
        &self,
        time: Instant,
    ) -> Result<RigidMotion<Navigation, Barycentric>, GravitasError> {
        Ok(self.to_this_frame_at_time(time)?.inverse())
    }

    /// The rigid motion at `time` together with the angular acceleration of the axes
    /// and the acceleration of the origin.
    pub fn motion_of_this_frame(
        &self,
        time: Instant,
    ) -> Result<AcceleratedRigidMotion<Barycentric, Navigation>, GravitasError> {
        match &self.definition {
            FrameDefinition::BarycentricRotating(frame) => frame.motion(self.field, time),
            FrameDefinition::BodyCentredBodyDirection(frame) => frame.motion(self.field, time),
            FrameDefinition::BodyCentredNonRotating(frame) => frame.motion(self.field, time),
            FrameDefinition::BodySurface(frame) => frame.motion(self.field, time),
        }
    }

    /// The four fictitious accelerations felt at `degrees_of_freedom` in this frame.
    pub fn fictitious_accelerations(
        &self,
        time: Instant,
        degrees_of_freedom: &DegreesOfFreedom<Navigation>,
    ) -> Result<FictitiousAccelerations, GravitasError> {
        let motion = self.motion_of_this_frame(time)?;
        let rigid_motion = motion.rigid_motion();
        let omega = rigid_motion.angular_velocity_in_target().coordinates;
        let omega_dot = rigid_motion.rotation() * motion.angular_acceleration();
        let origin_acceleration = rigid_motion.rotation() * motion.origin_acceleration();
        let r = &degrees_of_freedom.position;
        let v = &degrees_of_freedom.velocity;

        Ok(FictitiousAccelerations {
            linear: Vector::new(-origin_acceleration),
            centrifugal: Vector::new(-omega.cross(&omega.cross(r))),
            coriolis: Vector::new(-2.0 * omega.cross(v)),
            euler: Vector::new(-omega_dot.cross(r)),
        })
    }

    /// Acceleration to add, in this frame, to the gravitational acceleration of a point
    /// to account for the motion of the frame.
    ///
    /// Arguments
    /// ---------
    /// * `time`: an instant covered by the ephemeris.
    /// * `degrees_of_freedom`: the point, in this frame.
    ///
    /// Return
    /// ----------
    /// * linear + centrifugal + Coriolis + Euler, in this frame.
    pub fn geometric_acceleration(
        &self,
        time: Instant,
        degrees_of_freedom: &DegreesOfFreedom<Navigation>,
    ) -> Result<Vector<Navigation>, GravitasError> {
        Ok(self.fictitious_accelerations(time, degrees_of_freedom)?.total())
    }

    /// Gravitational acceleration of a massless point, transported into this frame,
    /// plus the geometric acceleration.
    pub fn total_acceleration(
        &self,
        time: Instant,
        degrees_of_freedom: &DegreesOfFreedom<Navigation>,
    ) -> Result<Vector<Navigation>, GravitasError> {
        let to_this_frame = self.to_this_frame_at_time(time)?;
        let inertial = to_this_frame.inverse().apply(degrees_of_freedom);
        let gravity = self
            .field
            .acceleration_on_massless_body(&inertial.position, time)?;
        let gravity = to_this_frame.rotate(&Vector::new(gravity));
        Ok(gravity + self.geometric_acceleration(time, degrees_of_freedom)?)
    }

    pub fn write_to_message(&self) -> DynamicFrameMessage {
        DynamicFrameMessage::from(self.definition)
    }

    /// Rebuild a frame from its message, resolving the body indices against `field`.
    pub fn read_from_message(
        field: &'e E,
        message: &DynamicFrameMessage,
    ) -> Result<Self, GravitasError> {
        Self::new(field, FrameDefinition::from(*message))
    }
}

/// Axes following two bodies: x from primary to secondary, z along their relative
/// angular momentum.
///
/// Arguments
/// ---------
/// * `time`: the instant, for error reporting.
/// * `r`, `r_dot`: position and velocity of the secondary relative to the primary.
///
/// Return
/// ----------
/// * The rotation onto the frame axes and the angular velocity `(r × ṙ) / |r|²`, or
///   [`GravitasError::DegenerateFrame`] when the relative motion is radial.
pub(crate) fn two_body_axes(
    time: Instant,
    r: &Vector3<f64>,
    r_dot: &Vector3<f64>,
) -> Result<(Rotation3<f64>, Vector3<f64>), GravitasError> {
    let angular_momentum = r.cross(r_dot);
    let i = r
        .try_normalize(0.0)
        .ok_or(GravitasError::DegenerateFrame(time))?;
    let k = angular_momentum
        .try_normalize(0.0)
        .ok_or(GravitasError::DegenerateFrame(time))?;
    let j = k.cross(&i);
    let angular_velocity = angular_momentum / r.norm_squared();
    Ok((rotation_from_basis(&i, &j, &k), angular_velocity))
}

/// Time derivative of `(r × ṙ) / |r|²`.
pub(crate) fn two_body_angular_acceleration(
    r: &Vector3<f64>,
    r_dot: &Vector3<f64>,
    r_ddot: &Vector3<f64>,
) -> Vector3<f64> {
    let r2 = r.norm_squared();
    r.cross(r_ddot) / r2 - r.cross(r_dot) * (2.0 * r.dot(r_dot) / (r2 * r2))
}

#[cfg(test)]
pub(crate) mod frame_test_support {
    use super::*;

    /// Bodies with fixed states, whatever the instant.
    #[derive(Debug)]
    pub(crate) struct FixedField {
        pub bodies: Vec<MassiveBody>,
        pub states: Vec<DegreesOfFreedom<Barycentric>>,
        pub accelerations: Vec<Vector3<f64>>,
        pub massless_acceleration: Vector3<f64>,
    }

    impl FrameField for FixedField {
        fn massive_body(&self, index: usize) -> Result<&MassiveBody, GravitasError> {
            self.bodies
                .get(index)
                .ok_or(GravitasError::UnresolvedReference(index))
        }

        fn body_degrees_of_freedom(
            &self,
            index: usize,
            _time: Instant,
        ) -> Result<DegreesOfFreedom<Barycentric>, GravitasError> {
            self.states
                .get(index)
                .copied()
                .ok_or(GravitasError::UnresolvedReference(index))
        }

        fn acceleration_on_massive_body(
            &self,
            index: usize,
            _time: Instant,
        ) -> Result<Vector3<f64>, GravitasError> {
            self.accelerations
                .get(index)
                .copied()
                .ok_or(GravitasError::UnresolvedReference(index))
        }

        fn acceleration_on_massless_body(
            &self,
            _position: &Vector3<f64>,
            _time: Instant,
        ) -> Result<Vector3<f64>, GravitasError> {
            Ok(self.massless_acceleration)
        }
    }
}
