//! Frame rotating with two bodies, centred on their barycentre.
//!
//! The x axis points from the primary to the secondary, the z axis along their
//! relative angular momentum. Both bodies stay on the x axis of the frame; on a
//! circular orbit they are at rest in it.

use nalgebra::Vector3;

use crate::geometry::{barycentre, AcceleratedRigidMotion, Barycentric, Navigation, RigidMotion};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

use super::{two_body_angular_acceleration, two_body_axes, FrameField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarycentricRotating {
    pub primary: usize,
    pub secondary: usize,
}

impl BarycentricRotating {
    pub(super) fn rigid_motion<E: FrameField>(
        &self,
        field: &E,
        time: Instant,
    ) -> Result<RigidMotion<Barycentric, Navigation>, GravitasError> {
        let primary = field.body_degrees_of_freedom(self.primary, time)?;
        let secondary = field.body_degrees_of_freedom(self.secondary, time)?;
        let (mu_primary, mu_secondary) = self.gravitational_parameters(field)?;

        let centre = barycentre([(primary, mu_primary), (secondary, mu_secondary)])
            .ok_or(GravitasError::DegenerateFrame(time))?;
        let (rotation, angular_velocity) = two_body_axes(
            time,
            &(secondary.position - primary.position),
            &(secondary.velocity - primary.velocity),
        )?;
        Ok(RigidMotion::new(
            rotation,
            centre.position,
            centre.velocity,
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
        let (mu_primary, mu_secondary) = self.gravitational_parameters(field)?;

        let angular_acceleration = two_body_angular_acceleration(
            &(secondary.position - primary.position),
            &(secondary.velocity - primary.velocity),
            &(secondary_acceleration - primary_acceleration),
        );
        let origin_acceleration: Vector3<f64> = (primary_acceleration * mu_primary
            + secondary_acceleration * mu_secondary)
            / (mu_primary + mu_secondary);
        Ok(AcceleratedRigidMotion::new(
            rigid_motion,
            angular_acceleration,
            origin_acceleration,
        ))
    }

    fn gravitational_parameters<E: FrameField>(&self, field: &E) -> Result<(f64, f64), GravitasError> {
        Ok((
            field.massive_body(self.primary)?.gravitational_parameter(),
            field.massive_body(self.secondary)?.gravitational_parameter(),
        ))
    }
}

#[cfg(test)]
mod barycentric_rotating_test {
    use super::super::frame_test_support::FixedField;
    use super::super::DynamicFrame;
    use crate::body::MassiveBody;
    use crate::geometry::DegreesOfFreedom;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::*;

    /// Two bodies rotating at 10 rad/s about −z around a barycentre at rest at (2, 1, 0).
    fn rotating_pair(big_acceleration: Vector3<f64>, small_acceleration: Vector3<f64>) -> FixedField {
        FixedField {
            bodies: vec![
                MassiveBody::new("Big", 5.0).unwrap(),
                MassiveBody::new("Small", 2.0).unwrap(),
            ],
            states: vec![
                DegreesOfFreedom::new(Vector3::new(0.8, -0.6, 0.0), Vector3::new(-16.0, 12.0, 0.0)),
                DegreesOfFreedom::new(Vector3::new(5.0, 5.0, 0.0), Vector3::new(40.0, -30.0, 0.0)),
            ],
            accelerations: vec![big_acceleration, small_acceleration],
            massless_acceleration: Vector3::zeros(),
        }
    }

    fn centripetal() -> FixedField {
        rotating_pair(Vector3::new(120.0, 160.0, 0.0), Vector3::new(-300.0, -400.0, 0.0))
    }

    fn t0() -> Instant {
        Instant::j2000()
    }

    #[test]
    fn test_bodies_on_x_axis() {
        let field = centripetal();
        let frame = DynamicFrame::barycentric_rotating(&field, 0, 1).unwrap();
        let to_frame = frame.to_this_frame_at_time(t0()).unwrap();

        let big = to_frame.apply(&field.states[0]);
        let small = to_frame.apply(&field.states[1]);
        assert_relative_eq!(big.position, Vector3::new(-2.0, 0.0, 0.0), epsilon = 1e-14);
        assert_relative_eq!(small.position, Vector3::new(5.0, 0.0, 0.0), epsilon = 1e-14);
        assert_relative_eq!(big.velocity, Vector3::zeros(), epsilon = 1e-13);
        assert_relative_eq!(small.velocity, Vector3::zeros(), epsilon = 1e-13);
        assert_relative_eq!(
            to_frame.angular_velocity_in_target().coordinates,
            Vector3::new(0.0, 0.0, 10.0),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_coriolis_acceleration() {
        let field = centripetal();
        let frame = DynamicFrame::barycentric_rotating(&field, 0, 1).unwrap();
        // At the origin, moving against the rotation and away from the centre.
        let point = DegreesOfFreedom::new(Vector3::zeros(), Vector3::new(50.0, -100.0, 0.0));

        let terms = frame.fictitious_accelerations(t0(), &point).unwrap();
        assert_relative_eq!(terms.centrifugal.coordinates, Vector3::zeros());
        assert_relative_eq!(terms.euler.coordinates, Vector3::zeros());
        assert_relative_eq!(terms.linear.coordinates, Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(
            frame.geometric_acceleration(t0(), &point).unwrap().coordinates,
            Vector3::new(-2000.0, -1000.0, 0.0),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_centrifugal_acceleration() {
        let field = centripetal();
        let frame = DynamicFrame::barycentric_rotating(&field, 0, 1).unwrap();
        let point = DegreesOfFreedom::at_rest(Vector3::new(10.0, 20.0, 30.0));

        let terms = frame.fictitious_accelerations(t0(), &point).unwrap();
        assert_relative_eq!(
            terms.centrifugal.coordinates,
            Vector3::new(1000.0, 2000.0, 0.0),
            epsilon = 1e-10
        );
        assert_relative_eq!(
            frame.geometric_acceleration(t0(), &point).unwrap().coordinates,
            terms.centrifugal.coordinates,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_euler_acceleration() {
        // Tangential accelerations spin the pair up.
        let field = rotating_pair(
            Vector3::new(120.0 - 160.0, 160.0 + 120.0, 0.0),
            Vector3::new(-300.0 + 400.0, -400.0 - 300.0, 0.0),
        );
        let frame = DynamicFrame::barycentric_rotating(&field, 0, 1).unwrap();
        let point = DegreesOfFreedom::at_rest(Vector3::new(10.0, 20.0, 30.0));

        let terms = frame.fictitious_accelerations(t0(), &point).unwrap();
        assert_relative_eq!(
            terms.euler.coordinates,
            Vector3::new(2000.0, -1000.0, 0.0),
            epsilon = 1e-10
        );
        assert_relative_eq!(
            frame.geometric_acceleration(t0(), &point).unwrap().coordinates,
            Vector3::new(3000.0, 1000.0, 0.0),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_linear_acceleration() {
        // Both bodies share an extra acceleration (−160, 120, 300).
        let field = rotating_pair(
            Vector3::new(-160.0 + 120.0, 120.0 + 160.0, 300.0),
            Vector3::new(-160.0 - 300.0, 120.0 - 400.0, 300.0),
        );
        let frame = DynamicFrame::barycentric_rotating(&field, 0, 1).unwrap();
        let point = DegreesOfFreedom::at_rest(Vector3::new(10.0, 20.0, 30.0));

        let terms = frame.fictitious_accelerations(t0(), &point).unwrap();
        assert_relative_eq!(
            terms.linear.coordinates,
            Vector3::new(0.0, 200.0, 300.0),
            epsilon = 1e-10
        );
        assert_relative_eq!(
            frame.geometric_acceleration(t0(), &point).unwrap().coordinates,
            Vector3::new(1000.0, 2200.0, 300.0),
            epsilon = 1e-10
        );
    }
}
