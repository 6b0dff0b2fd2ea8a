//! # Body models
//!
//! Immutable descriptions of the bodies whose motion the crate integrates.
//!
//! ## Overview
//!
//! - [`MassiveBody`]: a gravitational parameter μ, optionally a [`RotationState`]
//!   (rotating body) and an [`Oblateness`] (J2 body). Oblateness requires a rotation
//!   state, since the pole defines the symmetry axis of the J2 field.
//! - [`Body`]: either a shared massive body or a massless test particle. Trajectory
//!   trees record which kind they carry, because intrinsic accelerations are only
//!   allowed on massless bodies.
//!
//! Massive bodies are built once and shared as `Arc<MassiveBody>` between the
//! [`crate::ephemeris::Ephemeris`] and the trajectories that reference them.

use std::sync::Arc;

use nalgebra::{Rotation3, Vector3};

use crate::constants::{
    GravitationalParameter, Meter, Radian, RadianPerSecond, GRAVITATIONAL_CONSTANT,
};
use crate::geometry::{axes_rotation, equatorial_rotation, unit_vector_from_spherical};
use crate::gravitas_errors::GravitasError;
use crate::time::Instant;

/// Orientation of a uniformly rotating body.
///
/// The pole is fixed in the inertial frame at right ascension / declination
/// `(axis_right_ascension, axis_declination)`. The prime meridian is at
/// `reference_angle` from the ascending node of the body equator at
/// `reference_instant` and advances at `angular_frequency`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub mean_radius: Meter,
    pub axis_right_ascension: Radian,
    pub axis_declination: Radian,
    pub reference_angle: Radian,
    pub reference_instant: Instant,
    pub angular_frequency: RadianPerSecond,
}

impl RotationState {
    /// Unit vector along the rotation axis, in the inertial frame.
    pub fn pole(&self) -> Vector3<f64> {
        unit_vector_from_spherical(self.axis_right_ascension, self.axis_declination)
    }

    /// Angle of the prime meridian from the ascending node of the equator at `time`.
    pub fn angle_at(&self, time: Instant) -> Radian {
        self.reference_angle
            + self.angular_frequency * (time - self.reference_instant).to_seconds()
    }

    /// Angular velocity vector of the body, in the inertial frame.
    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.pole() * self.angular_frequency
    }

    /// Rotation mapping inertial coordinates onto body-fixed axes at `time`.
    ///
    /// The z axis is the pole and the x axis goes through the prime meridian.
    pub fn body_fixed_rotation(&self, time: Instant) -> Rotation3<f64> {
        axes_rotation(self.angle_at(time), &Vector3::z_axis())
            * equatorial_rotation(self.axis_right_ascension, self.axis_declination)
    }
}

/// Second zonal harmonic of an oblate body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oblateness {
    pub j2: f64,
    pub reference_radius: Meter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MassiveBody {
    name: String,
    gravitational_parameter: GravitationalParameter,
    rotation: Option<RotationState>,
    oblateness: Option<Oblateness>,
}

impl MassiveBody {
    /// Create a point-mass body.
    ///
    /// Arguments
    /// ---------
    /// * `name`: display name, used to look the body up in an ephemeris.
    /// * `gravitational_parameter`: μ in m³/s², strictly positive and finite.
    ///
    /// Return
    /// ----------
    /// * The body, or [`GravitasError::InvalidBody`] if μ is not a positive finite number.
    pub fn new(
        name: impl Into<String>,
        gravitational_parameter: GravitationalParameter,
    ) -> Result<Self, GravitasError> {
        let name = name.into();
        if !(gravitational_parameter.is_finite() && gravitational_parameter > 0.0) {
            return Err(GravitasError::InvalidBody(format!(
                "{name}: gravitational parameter must be positive, got {gravitational_parameter}"
            )));
        }
        Ok(MassiveBody {
            name,
            gravitational_parameter,
            rotation: None,
            oblateness: None,
        })
    }

    /// Create a point-mass body from its mass in kilograms.
    pub fn from_mass(name: impl Into<String>, mass: f64) -> Result<Self, GravitasError> {
        Self::new(name, mass * GRAVITATIONAL_CONSTANT)
    }

    pub fn with_rotation(mut self, rotation: RotationState) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Make the body oblate. Fails with [`GravitasError::InvalidBody`] if the body has
    /// no rotation state yet, or if the reference radius is not positive.
    pub fn with_oblateness(mut self, oblateness: Oblateness) -> Result<Self, GravitasError> {
        if self.rotation.is_none() {
            return Err(GravitasError::InvalidBody(format!(
                "{}: oblateness requires a rotation state",
                self.name
            )));
        }
        if !oblateness.reference_radius.is_finite() || oblateness.reference_radius <= 0.0 {
            return Err(GravitasError::InvalidBody(format!(
                "{}: reference radius must be positive",
                self.name
            )));
        }
        self.oblateness = Some(oblateness);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gravitational_parameter(&self) -> GravitationalParameter {
        self.gravitational_parameter
    }

    pub fn rotation(&self) -> Option<&RotationState> {
        self.rotation.as_ref()
    }

    pub fn oblateness(&self) -> Option<&Oblateness> {
        self.oblateness.as_ref()
    }

    pub fn is_oblate(&self) -> bool {
        self.oblateness.is_some()
    }

    pub fn mean_radius(&self) -> Option<Meter> {
        self.rotation.map(|r| r.mean_radius)
    }
}

/// The kind of body a trajectory describes.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Massive(Arc<MassiveBody>),
    Massless,
}

impl Body {
    pub fn is_massless(&self) -> bool {
        matches!(self, Body::Massless)
    }

    pub fn as_massive(&self) -> Option<&Arc<MassiveBody>> {
        match self {
            Body::Massive(body) => Some(body),
            Body::Massless => None,
        }
    }
}

impl From<Arc<MassiveBody>> for Body {
    fn from(body: Arc<MassiveBody>) -> Self {
        Body::Massive(body)
    }
}

#[cfg(test)]
mod body_test {
    use super::*;
    use crate::constants::EARTH_GRAVITATIONAL_PARAMETER;
    use crate::geometry::degrees;
    use approx::assert_relative_eq;
    use hifitime::Duration;

    fn earth_rotation() -> RotationState {
        RotationState {
            mean_radius: 6_371_000.0,
            axis_right_ascension: degrees(0.0),
            axis_declination: degrees(90.0),
            reference_angle: degrees(190.147),
            reference_instant: Instant::j2000(),
            angular_frequency: 7.292_115e-5,
        }
    }

    #[test]
    fn test_invalid_gravitational_parameter() {
        assert!(matches!(
            MassiveBody::new("Nothing", 0.0),
            Err(GravitasError::InvalidBody(_))
        ));
        assert!(MassiveBody::new("Nothing", f64::NAN).is_err());
        assert!(MassiveBody::new("Something", 1.0).is_ok());
    }

    #[test]
    fn test_from_mass() {
        let earth = MassiveBody::from_mass("Earth", 5.972_2e24).unwrap();
        assert_relative_eq!(
            earth.gravitational_parameter(),
            EARTH_GRAVITATIONAL_PARAMETER,
            max_relative = 1e-4
        );
        assert!(MassiveBody::from_mass("Nothing", -1.0).is_err());
    }

    #[test]
    fn test_oblateness_requires_rotation() {
        let oblateness = Oblateness {
            j2: 1.082_6e-3,
            reference_radius: 6_378_137.0,
        };
        let bare = MassiveBody::new("Earth", 3.986_004e14).unwrap();
        assert!(matches!(
            bare.clone().with_oblateness(oblateness),
            Err(GravitasError::InvalidBody(_))
        ));

        let earth = bare
            .with_rotation(earth_rotation())
            .with_oblateness(oblateness)
            .unwrap();
        assert!(earth.is_oblate());
        assert_eq!(earth.mean_radius(), Some(6_371_000.0));
    }

    #[test]
    fn test_rotation_state() {
        let rotation = earth_rotation();
        assert_relative_eq!(rotation.pole(), Vector3::z(), epsilon = 1e-15);

        let later = Instant::j2000() + Duration::from_seconds(1_000.0);
        assert_relative_eq!(
            rotation.angle_at(later) - rotation.angle_at(Instant::j2000()),
            7.292_115e-2,
            epsilon = 1e-12
        );

        // The body-fixed frame keeps the pole on its z axis.
        let fixed = rotation.body_fixed_rotation(later);
        assert_relative_eq!(fixed * rotation.pole(), Vector3::z(), epsilon = 1e-15);
    }

    #[test]
    fn test_body_kind() {
        let sun = Arc::new(MassiveBody::new("Sun", 1.327_124_4e20).unwrap());
        assert!(!Body::from(sun.clone()).is_massless());
        assert!(Body::Massless.is_massless());
        assert_eq!(Body::Massive(sun.clone()).as_massive(), Some(&sun));
    }
}
