//! Frame centred on a body, with the inertial axes.

use nalgebra::{Rotation3, Vector3};

use crate::geometry::{AcceleratedRigidMotion, Barycentric, Navigation, RigidMotion};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

use super::FrameField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyCentredNonRotating {
    pub centre: usize,
}

impl BodyCentredNonRotating {
    pub(super) fn rigid_motion<E: FrameField>(
        &self,
        field: &E,
        time: Instant,
    ) -> Result<RigidMotion<Barycentric, Navigation>, GravitasError> {
        let centre = field.body_degrees_of_freedom(self.centre, time)?;
        Ok(RigidMotion::new(
            Rotation3::identity(),
            centre.position,
            centre.velocity,
            Vector3::zeros(),
        ))
    }

    pub(super) fn motion<E: FrameField>(
        &self,
        field: &E,
        time: Instant,
    ) -> Result<AcceleratedRigidMotion<Barycentric, Navigation>, GravitasError> {
        Ok(AcceleratedRigidMotion::new(
            self.rigid_motion(field, time)?,
            Vector3::zeros(),
            field.acceleration_on_massive_body(self.centre, time)?,
        ))
    }
}
