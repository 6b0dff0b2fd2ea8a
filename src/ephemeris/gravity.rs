//! Gravitational field of the massive bodies.
//!
//! Point-mass terms between every pair of bodies, plus the J2 term of each oblate
//! body. The J2 field of a body `j` acting on a body `i` has a reaction on `j`, so
//! the total momentum of the massive bodies is conserved.

use nalgebra::Vector3;

use crate::body::MassiveBody;
use crate::constants::GravitationalParameter;

/// What the integration needs to know about one massive body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GravitySource {
    pub gravitational_parameter: GravitationalParameter,
    /// `(J2·μ·R², pole)` for oblate bodies.
    pub oblateness: Option<(f64, Vector3<f64>)>,
}

impl From<&MassiveBody> for GravitySource {
    fn from(body: &MassiveBody) -> Self {
        let oblateness = body.oblateness().zip(body.rotation()).map(|(oblateness, rotation)| {
            (
                oblateness.j2
                    * body.gravitational_parameter()
                    * oblateness.reference_radius.powi(2),
                rotation.pole(),
            )
        });
        GravitySource {
            gravitational_parameter: body.gravitational_parameter(),
            oblateness,
        }
    }
}

/// Acceleration of a test particle at `displacement` from a point mass, pointing
/// back at the point mass.
///
/// Arguments
/// ---------
/// * `gravitational_parameter`: μ of the attracting body.
/// * `displacement`: position of the test particle minus position of the body.
pub fn point_mass_acceleration(
    gravitational_parameter: GravitationalParameter,
    displacement: &Vector3<f64>,
) -> Vector3<f64> {
    let r2 = displacement.norm_squared();
    -displacement * (gravitational_parameter / (r2 * r2.sqrt()))
}

/// J2 acceleration of a test particle at `displacement` from an oblate body.
///
/// a = −(3/2)·J2·μ·R² / r⁵ · [(1 − 5 (r·k)² / r²) r + 2 (r·k) k]
///
/// Arguments
/// ---------
/// * `j2_mu_r2`: the product J2·μ·R² of the oblate body.
/// * `pole`: unit vector along the symmetry axis of the body.
/// * `displacement`: position of the test particle minus position of the body.
pub fn j2_acceleration(j2_mu_r2: f64, pole: &Vector3<f64>, displacement: &Vector3<f64>) -> Vector3<f64> {
    let r2 = displacement.norm_squared();
    let r = r2.sqrt();
    let r5 = r2 * r2 * r;
    let z = displacement.dot(pole);
    let radial = 1.0 - 5.0 * z * z / r2;
    -(displacement * radial + pole * (2.0 * z)) * (1.5 * j2_mu_r2 / r5)
}

/// Mutual accelerations of all massive bodies.
pub(crate) fn massive_body_accelerations(
    sources: &[GravitySource],
    positions: &[Vector3<f64>],
    accelerations: &mut [Vector3<f64>],
) {
    accelerations.fill(Vector3::zeros());
    for i in 0..sources.len() {
        for j in (i + 1)..sources.len() {
            // Displacement of i from j.
            let displacement = positions[i] - positions[j];
            let r2 = displacement.norm_squared();
            let inverse_r3 = 1.0 / (r2 * r2.sqrt());
            accelerations[i] -= displacement * (sources[j].gravitational_parameter * inverse_r3);
            accelerations[j] += displacement * (sources[i].gravitational_parameter * inverse_r3);

            if let Some((j2_mu_r2, pole)) = &sources[j].oblateness {
                let on_i = j2_acceleration(*j2_mu_r2, pole, &displacement);
                accelerations[i] += on_i;
                accelerations[j] -= on_i
                    * (sources[i].gravitational_parameter / sources[j].gravitational_parameter);
            }
            if let Some((j2_mu_r2, pole)) = &sources[i].oblateness {
                let on_j = j2_acceleration(*j2_mu_r2, pole, &-displacement);
                accelerations[j] += on_j;
                accelerations[i] -= on_j
                    * (sources[j].gravitational_parameter / sources[i].gravitational_parameter);
            }
        }
    }
}

/// Acceleration of a massless particle at `position` in the field of all sources.
pub(crate) fn massless_body_acceleration(
    sources: &[GravitySource],
    source_positions: &[Vector3<f64>],
    position: &Vector3<f64>,
) -> Vector3<f64> {
    sources
        .iter()
        .zip(source_positions)
        .map(|(source, source_position)| {
            let displacement = position - source_position;
            let mut acceleration =
                point_mass_acceleration(source.gravitational_parameter, &displacement);
            if let Some((j2_mu_r2, pole)) = &source.oblateness {
                acceleration += j2_acceleration(*j2_mu_r2, pole, &displacement);
            }
            acceleration
        })
        .sum()
}
