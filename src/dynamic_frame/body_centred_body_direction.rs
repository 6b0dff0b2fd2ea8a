//! Frame centred on a primary body, with the x axis pointing at a secondary body.

use crate::geometry::{AcceleratedRigidMotion, Barycentric, Navigation, RigidMotion};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

use super::{two_body_angular_acceleration, two_body_axes, FrameField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyCentredBodyDirection {
    pub primary: usize,
    pub secondary: usize,
}

impl BodyCentredBodyDirection {
    pub(super) fn rigid_motion<E: FrameField>(
        &self,
        field: &E,
        time: Instant,
    ) -> Result<RigidMotion<Barycentric, Navigation>, GravitasError> {
        let primary = field.body_degrees_of_freedom(self.primary, time)?;
        let secondary = field.body_degrees_of_freedom(self.secondary, time)?;
        let (rotation, angular_velocity) = two_body_axes(
            time,
            &(secondary.position - primary.position),
            &(secondary.velocity - primary.velocity),
        )?;
        Ok(RigidMotion::new(
            rotation,
            primary.position,
            primary.velocity,
            angular_velocity,
        ))
    }

    pub(super) fn motion<E: FrameField>(
        &self,
        field: &E,
        time: Instant,
    ) -> Result<AcceleratedRigidMotion<Barycentric, Navigation>, GravitasError> {
        let rigid_motion = self.rigid_motion(field, time)?;
        let primary = field.body_degrees_of_freedom(self.primary, time)?;
        let secondary = field.body_degrees_of_freedom(self.secondary, time)?;
        let primary_acceleration = field.acceleration_on_massive_body(self.primary, time)?;
        let secondary_acceleration = field.acceleration_on_massive_body(self.secondary, time)?;

        let angular_acceleration = two_body_angular_acceleration(
            &(secondary.position - primary.position),
            &(secondary.velocity - primary.velocity),
            &(secondary_acceleration - primary_acceleration),
        );
        Ok(AcceleratedRigidMotion::new(
            rigid_motion,
            angular_acceleration,
            primary_acceleration,
        ))
    }
}

#[cfg(test)]
mod body_centred_body_direction_test {
    use super::super::frame_test_support::FixedField;
    use super::super::DynamicFrame;
    use crate::body::MassiveBody;
    use crate::geometry::DegreesOfFreedom;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::*;

    #[test]
    fn test_point_at_origin_feels_linear_and_euler() {
        // Secondary on a circle of radius 2 around the primary, speeding up.
        let field = FixedField {
            bodies: vec![
                MassiveBody::new("Primary", 4.0).unwrap(),
                MassiveBody::new("Secondary", 1.0).unwrap(),
            ],
            states: vec![
                DegreesOfFreedom::new(Vector3::new(1.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
                DegreesOfFreedom::new(Vector3::new(3.0, 1.0, 0.0), Vector3::new(0.0, 6.0, 1.0)),
            ],
            accelerations: vec![Vector3::new(0.0, 0.0, -2.0), Vector3::new(-18.0, 4.0, -2.0)],
            massless_acceleration: Vector3::zeros(),
        };
        let frame = DynamicFrame::body_centred_body_direction(&field, 0, 1).unwrap();
        let t = Instant::j2000();

        let to_frame = frame.to_this_frame_at_time(t).unwrap();
        let secondary = to_frame.apply(&field.states[1]);
        assert_relative_eq!(secondary.position, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-15);
        assert_relative_eq!(secondary.velocity, Vector3::zeros(), epsilon = 1e-15);

        let motion = frame.motion_of_this_frame(t).unwrap();
        assert_relative_eq!(*motion.rigid_motion().angular_velocity(), Vector3::new(0.0, 0.0, 3.0));
        // (r × r̈) / |r|² = (2 x × 4 y) / 4.
        assert_relative_eq!(*motion.angular_acceleration(), Vector3::new(0.0, 0.0, 2.0));

        let terms = frame
            .fictitious_accelerations(t, &DegreesOfFreedom::origin())
            .unwrap();
        assert_eq!(terms.centrifugal.coordinates, Vector3::zeros());
        assert_eq!(terms.coriolis.coordinates, Vector3::zeros());
        assert_eq!(terms.euler.coordinates, Vector3::zeros());
        assert_relative_eq!(terms.linear.coordinates, Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(
            frame
                .geometric_acceleration(t, &DegreesOfFreedom::origin())
                .unwrap(),
            terms.linear + terms.euler
        );
    }
}
