//! Frame attached to the surface of a rotating body.
//!
//! The z axis is the rotation axis of the body, the x axis the prime meridian. A
//! point fixed on the surface is at rest in this frame.

use nalgebra::Vector3;

use crate::geometry::{AcceleratedRigidMotion, Barycentric, Navigation, RigidMotion};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

use super::FrameField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodySurface {
    pub centre: usize,
}

impl BodySurface {
    pub(super) fn rigid_motion<E: FrameField>(
        &self,
        field: &E,
        time: Instant,
    ) -> Result<RigidMotion<Barycentric, Navigation>, GravitasError> {
        let body = field.massive_body(self.centre)?;
        let rotation = body
            .rotation()
            .ok_or_else(|| GravitasError::BodyIsNotRotating(body.name().to_string()))?;
        let centre = field.body_degrees_of_freedom(self.centre, time)?;
        Ok(RigidMotion::new(
            rotation.body_fixed_rotation(time),
            centre.position,
            centre.velocity,
            rotation.angular_velocity(),
        ))
    }

    /// The rotation is uniform: no angular acceleration.
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

#[cfg(test)]
mod body_surface_test {
    use std::f64::consts::FRAC_PI_2;

    use hifitime::Duration;

    use super::super::frame_test_support::FixedField;
    use super::super::DynamicFrame;
    use crate::body::{MassiveBody, RotationState};
    use crate::geometry::{degrees, DegreesOfFreedom};
    use approx::assert_relative_eq;

    use super::*;

    const OMEGA: f64 = 1e-3;

    fn spinning_body() -> FixedField {
        let rotation = RotationState {
            mean_radius: 10.0,
            axis_right_ascension: degrees(30.0),
            axis_declination: degrees(60.0),
            reference_angle: 0.25,
            reference_instant: Instant::j2000(),
            angular_frequency: OMEGA,
        };
        FixedField {
            bodies: vec![MassiveBody::new("Spinner", 100.0)
                .unwrap()
                .with_rotation(rotation)],
            states: vec![DegreesOfFreedom::new(
                Vector3::new(7.0, -3.0, 2.0),
                Vector3::new(0.1, 0.2, 0.3),
            )],
            accelerations: vec![Vector3::zeros()],
            massless_acceleration: Vector3::zeros(),
        }
    }

    #[test]
    fn test_surface_point_is_at_rest() {
        let field = spinning_body();
        let frame = DynamicFrame::body_surface(&field, 0).unwrap();
        let t = Instant::j2000() + Duration::from_seconds(1234.5);

        let surface_point = DegreesOfFreedom::<Navigation>::at_rest(Vector3::new(10.0, 0.0, 0.0));
        let inertial = frame.from_this_frame_at_time(t).unwrap().apply(&surface_point);
        let centre = field.states[0];
        let pole = field.bodies[0].rotation().unwrap().pole();

        // Distance to the centre, on the equator, moving at ω R around the pole.
        assert_relative_eq!((inertial.position - centre.position).norm(), 10.0, epsilon = 1e-12);
        assert_relative_eq!((inertial.position - centre.position).dot(&pole), 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            inertial.velocity - centre.velocity,
            (pole * OMEGA).cross(&(inertial.position - centre.position)),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_prime_meridian_advances() {
        let field = spinning_body();
        let frame = DynamicFrame::body_surface(&field, 0).unwrap();
        let quarter_turn = Duration::from_seconds(FRAC_PI_2 / OMEGA);
        let t = Instant::j2000();

        // A point fixed in inertial space drifts westward, by a quarter turn here.
        let to_frame_at_t = frame.to_this_frame_at_time(t).unwrap();
        let to_frame_later = frame.to_this_frame_at_time(t + quarter_turn).unwrap();
        let fixed = to_frame_at_t
            .inverse()
            .apply(&DegreesOfFreedom::at_rest(Vector3::new(10.0, 0.0, 0.0)));
        let later = to_frame_later.apply(&DegreesOfFreedom::at_rest(fixed.position));
        assert_relative_eq!(later.position, Vector3::new(0.0, -10.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_centrifugal_on_the_equator() {
        let field = spinning_body();
        let frame = DynamicFrame::body_surface(&field, 0).unwrap();
        let point = DegreesOfFreedom::at_rest(Vector3::new(6.0, 8.0, 5.0));

        let acceleration = frame
            .geometric_acceleration(Instant::j2000(), &point)
            .unwrap();
        assert_relative_eq!(
            acceleration.coordinates,
            Vector3::new(6.0, 8.0, 0.0) * OMEGA * OMEGA,
            epsilon = 1e-15
        );
    }
}
