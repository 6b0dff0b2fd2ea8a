//! # Frames, degrees of freedom and rigid motions
//!
//! Every position or velocity handled by the crate is tagged at the type level with
//! the reference frame it is expressed in. Frame tags are zero-sized marker types
//! implementing [`Frame`]; two quantities in different frames cannot be mixed
//! without going through a [`RigidMotion`].
//!
//! ## Overview
//!
//! - [`Frame`], [`Barycentric`], [`Navigation`]: frame tags.
//! - [`DegreesOfFreedom`]: a `(position, velocity)` pair in one frame.
//! - [`Vector`]: a free vector (acceleration, displacement) in one frame.
//! - [`RigidMotion`], [`AcceleratedRigidMotion`]: instantaneous change of frame and its
//!   time derivatives.
//! - [`barycentre`]: weighted mean of degrees of freedom.
//!
//! Users may declare their own frames:
//!
//! ```rust
//! use gravitas::geometry::Frame;
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
//! struct World;
//!
//! impl Frame for World {
//!     const NAME: &'static str = "World";
//! }
//! ```

pub mod rigid_motion;

use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

use crate::constants::{Radian, RADEG};

pub use rigid_motion::{AcceleratedRigidMotion, RigidMotion};

/// Marker trait for reference frame tags.
pub trait Frame: Copy + Clone + Debug + Default + PartialEq + 'static {
    const NAME: &'static str;
}

/// The inertial frame of the ephemeris, centred on the solar system barycentre.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Barycentric;

impl Frame for Barycentric {
    const NAME: &'static str = "Barycentric";
}

/// The frame a [`crate::dynamic_frame::DynamicFrame`] renders into. Generally non-inertial.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Navigation;

impl Frame for Navigation {
    const NAME: &'static str = "Navigation";
}

/// Position and velocity of a point, expressed in frame `F`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DegreesOfFreedom<F: Frame> {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    frame: PhantomData<F>,
}

impl<F: Frame> DegreesOfFreedom<F> {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        DegreesOfFreedom {
            position,
            velocity,
            frame: PhantomData,
        }
    }

    pub fn at_rest(position: Vector3<f64>) -> Self {
        Self::new(position, Vector3::zeros())
    }

    pub fn origin() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }
}

/// A free vector (acceleration, displacement, angular velocity, ...) in frame `F`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector<F: Frame> {
    pub coordinates: Vector3<f64>,
    frame: PhantomData<F>,
}

impl<F: Frame> Vector<F> {
    pub fn new(coordinates: Vector3<f64>) -> Self {
        Vector {
            coordinates,
            frame: PhantomData,
        }
    }

    pub fn zero() -> Self {
        Self::new(Vector3::zeros())
    }

    pub fn norm(&self) -> f64 {
        self.coordinates.norm()
    }
}

impl<F: Frame> Add for Vector<F> {
    type Output = Vector<F>;

    fn add(self, rhs: Self) -> Self::Output {
        Vector::new(self.coordinates + rhs.coordinates)
    }
}

impl<F: Frame> Sub for Vector<F> {
    type Output = Vector<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector::new(self.coordinates - rhs.coordinates)
    }
}

impl<F: Frame> Neg for Vector<F> {
    type Output = Vector<F>;

    fn neg(self) -> Self::Output {
        Vector::new(-self.coordinates)
    }
}

impl<F: Frame> Mul<f64> for Vector<F> {
    type Output = Vector<F>;

    fn mul(self, rhs: f64) -> Self::Output {
        Vector::new(self.coordinates * rhs)
    }
}

/// Weighted barycentre of a set of degrees of freedom.
///
/// Arguments
/// ---------
/// * `weighted`: pairs of `(degrees of freedom, weight)`, typically gravitational
///   parameters.
///
/// Return
/// ----------
/// * The weighted mean of positions and velocities, or `None` if the total weight
///   is zero (including the empty input).
pub fn barycentre<F: Frame>(
    weighted: impl IntoIterator<Item = (DegreesOfFreedom<F>, f64)>,
) -> Option<DegreesOfFreedom<F>> {
    let (position, velocity, total) = weighted.into_iter().fold(
        (Vector3::zeros(), Vector3::zeros(), 0.0),
        |(p, v, w), (dof, weight)| (p + dof.position * weight, v + dof.velocity * weight, w + weight),
    );
    if total == 0.0 {
        return None;
    }
    Some(DegreesOfFreedom::new(position / total, velocity / total))
}

/// Rotation of the coordinate axes by `alpha` about the unit vector `axis`.
///
/// Coordinates of a fixed vector in the rotated axes are obtained by applying the
/// returned rotation; this is the passive counterpart of
/// [`Rotation3::from_axis_angle`].
pub fn axes_rotation(alpha: Radian, axis: &Unit<Vector3<f64>>) -> Rotation3<f64> {
    Rotation3::from_axis_angle(axis, -alpha)
}

/// Rotation whose rows are the given orthonormal basis vectors.
///
/// Applying the result to a vector expressed in the parent axes yields its
/// components along `(i, j, k)`. The caller guarantees orthonormality.
pub fn rotation_from_basis(i: &Vector3<f64>, j: &Vector3<f64>, k: &Vector3<f64>) -> Rotation3<f64> {
    Rotation3::from_matrix_unchecked(Matrix3::from_rows(&[
        i.transpose(),
        j.transpose(),
        k.transpose(),
    ]))
}

/// Unit vector pointing at right ascension `alpha` and declination `delta`.
pub fn unit_vector_from_spherical(alpha: Radian, delta: Radian) -> Vector3<f64> {
    Vector3::new(
        delta.cos() * alpha.cos(),
        delta.cos() * alpha.sin(),
        delta.sin(),
    )
}

/// Equatorial axes of a body whose pole points at `(alpha, delta)`.
///
/// The x axis points at the ascending node of the body equator on the parent
/// xy plane, the z axis is the pole. The returned rotation maps parent coordinates
/// to equatorial coordinates.
pub fn equatorial_rotation(alpha: Radian, delta: Radian) -> Rotation3<f64> {
    let pole = unit_vector_from_spherical(alpha, delta);
    let node = Vector3::new(-alpha.sin(), alpha.cos(), 0.0);
    let ninety = pole.cross(&node);
    rotation_from_basis(&node, &ninety, &pole)
}

/// Convenience for tests and builders expressing angles in degrees.
pub fn degrees(value: f64) -> Radian {
    value * RADEG
}

#[cfg(test)]
mod geometry_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_barycentre() {
        let a = DegreesOfFreedom::<Barycentric>::new(
            Vector3::new(0.8, -0.6, 0.0),
            Vector3::new(-16.0, 12.0, 0.0),
        );
        let b = DegreesOfFreedom::<Barycentric>::new(
            Vector3::new(5.0, 5.0, 0.0),
            Vector3::new(40.0, -30.0, 0.0),
        );
        let centre = barycentre([(a, 5.0), (b, 2.0)]).unwrap();
        assert_relative_eq!(centre.position, Vector3::new(14.0 / 7.0, 7.0 / 7.0, 0.0), epsilon = 1e-15);
        assert_relative_eq!(centre.velocity, Vector3::new(0.0, 0.0, 0.0), epsilon = 1e-14);

        assert!(barycentre::<Barycentric>([]).is_none());
    }

    #[test]
    fn test_axes_rotation() {
        let rotation = axes_rotation(std::f64::consts::FRAC_PI_2, &Vector3::z_axis());
        // The new x axis is the old y axis: the old x axis is now at -y.
        assert_relative_eq!(
            rotation * Vector3::x(),
            -Vector3::y(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_equatorial_rotation() {
        let alpha = degrees(40.0);
        let delta = degrees(25.0);
        let rotation = equatorial_rotation(alpha, delta);
        let pole = unit_vector_from_spherical(alpha, delta);
        assert_relative_eq!(rotation * pole, Vector3::z(), epsilon = 1e-15);
        assert_relative_eq!(
            rotation.matrix() * rotation.matrix().transpose(),
            Matrix3::identity(),
            epsilon = 1e-15
        );
        assert_relative_eq!(rotation.matrix().determinant(), 1.0, epsilon = 1e-15);

        // Pole along the inertial z axis: equatorial axes are the inertial ones rotated by 90° + alpha
        let aligned = equatorial_rotation(0.0, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(aligned * Vector3::y(), Vector3::x(), epsilon = 1e-15);
    }
}
