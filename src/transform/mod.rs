//! Rigid motions of the sphere.

use crate::error::{GeometryError, Result};
use crate::geometry::Point2S;
use crate::math::vector::normalize;
use crate::math::{Matrix3, Vector3};

/// Tolerance on `MᵀM - I` accepted by [`Transform2S::from_matrix`].
const ORTHOGONALITY_TOLERANCE: f64 = 1e-9;

/// A rotation, reflection or composition of both, acting on the sphere.
///
/// Backed by an orthogonal 3×3 matrix applied to point vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2S {
    matrix: Matrix3,
}

impl Transform2S {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Rotation by `angle` radians counterclockwise about the axis through
    /// `axis` (viewed from outside the sphere at `axis`).
    #[must_use]
    pub fn create_rotation(axis: &Point2S, angle: f64) -> Self {
        Self {
            matrix: rotation_matrix(axis.vector(), angle),
        }
    }

    /// Rotation about an arbitrary nonzero axis vector.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis` is zero or not finite.
    pub fn create_rotation_vector(axis: &Vector3, angle: f64) -> Result<Self> {
        let axis = normalize(axis)?;
        Ok(Self {
            matrix: rotation_matrix(&axis, angle),
        })
    }

    /// Reflection across the great circle whose pole is `point`.
    #[must_use]
    pub fn create_reflection(point: &Point2S) -> Self {
        Self {
            matrix: reflection_matrix(point.vector()),
        }
    }

    /// Reflection across the plane through the origin with normal `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if `normal` is zero or not finite.
    pub fn create_reflection_vector(normal: &Vector3) -> Result<Self> {
        let normal = normalize(normal)?;
        Ok(Self {
            matrix: reflection_matrix(&normal),
        })
    }

    /// Wraps an orthogonal matrix.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for non-finite entries and
    /// [`GeometryError::Degenerate`] if the matrix is not orthogonal.
    pub fn from_matrix(matrix: Matrix3) -> Result<Self> {
        if !matrix.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::NonFinite(format!("transform matrix {matrix}")).into());
        }
        let deviation = matrix.transpose() * matrix - Matrix3::identity();
        if deviation.amax() > ORTHOGONALITY_TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "transform matrix is not orthogonal: {matrix}"
            ))
            .into());
        }
        Ok(Self { matrix })
    }

    #[must_use]
    pub fn matrix(&self) -> &Matrix3 {
        &self.matrix
    }

    #[must_use]
    pub fn apply(&self, point: &Point2S) -> Point2S {
        Point2S::from_vector(&self.apply_vector(point.vector()))
    }

    #[must_use]
    pub fn apply_vector(&self, vector: &Vector3) -> Vector3 {
        self.matrix * vector
    }

    /// `self ∘ other`: applies `other` first, then `self`.
    #[must_use]
    pub fn multiply(&self, other: &Transform2S) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// `other ∘ self`: applies `self` first, then `other`.
    #[must_use]
    pub fn premultiply(&self, other: &Transform2S) -> Self {
        Self {
            matrix: other.matrix * self.matrix,
        }
    }

    /// This transform followed by a rotation.
    #[must_use]
    pub fn rotate(&self, axis: &Point2S, angle: f64) -> Self {
        self.premultiply(&Self::create_rotation(axis, angle))
    }

    /// This transform followed by a reflection.
    #[must_use]
    pub fn reflect(&self, point: &Point2S) -> Self {
        self.premultiply(&Self::create_reflection(point))
    }

    /// The inverse motion (the transpose, for an orthogonal matrix).
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            matrix: self.matrix.transpose(),
        }
    }

    /// `false` if the transform includes an odd number of reflections.
    #[must_use]
    pub fn preserves_orientation(&self) -> bool {
        self.matrix.determinant() > 0.0
    }

    /// Returns `true` if every matrix entry is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|c| c.is_finite())
    }
}

impl Default for Transform2S {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation about a unit axis (Rodrigues).
#[allow(clippy::many_single_char_names)]
fn rotation_matrix(axis: &Vector3, angle: f64) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    Matrix3::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,
    )
}

/// Householder reflection `I - 2nnᵀ` for a unit normal.
fn reflection_matrix(normal: &Vector3) -> Matrix3 {
    Matrix3::identity() - 2.0 * normal * normal.transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Precision;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn assert_point(actual: &Point2S, expected: &Point2S) {
        assert!(
            actual.approx_eq(expected, Precision::new(1e-10)),
            "{actual} != {expected}"
        );
    }

    #[test]
    fn rotation_about_k() {
        let t = Transform2S::create_rotation(&Point2S::plus_k(), FRAC_PI_2);
        assert_point(&t.apply(&Point2S::plus_i()), &Point2S::plus_j());
        assert_point(&t.apply(&Point2S::plus_j()), &Point2S::minus_i());
        assert_point(&t.apply(&Point2S::plus_k()), &Point2S::plus_k());
        assert!(t.preserves_orientation());
    }

    #[test]
    fn reflection_flips_orientation() {
        let t = Transform2S::create_reflection(&Point2S::plus_j());
        assert_point(&t.apply(&Point2S::plus_j()), &Point2S::minus_j());
        assert_point(&t.apply(&Point2S::plus_i()), &Point2S::plus_i());
        assert!(!t.preserves_orientation());
        assert!(t.reflect(&Point2S::plus_i()).preserves_orientation());
    }

    #[test]
    fn composition_order() {
        let rotate = Transform2S::create_rotation(&Point2S::plus_k(), FRAC_PI_2);
        let reflect = Transform2S::create_reflection(&Point2S::plus_i());

        // rotate first, then reflect: I -> J -> J
        let t = rotate.premultiply(&reflect);
        assert_point(&t.apply(&Point2S::plus_i()), &Point2S::plus_j());
        assert_eq!(t, reflect.multiply(&rotate));

        // reflect first, then rotate: I -> -I -> -J
        let t = Transform2S::identity()
            .reflect(&Point2S::plus_i())
            .rotate(&Point2S::plus_k(), FRAC_PI_2);
        assert_point(&t.apply(&Point2S::plus_i()), &Point2S::minus_j());
    }

    #[test]
    fn vector_constructors_validate() {
        assert!(Transform2S::create_rotation_vector(&Vector3::zeros(), 1.0).is_err());
        assert!(Transform2S::create_reflection_vector(&Vector3::new(f64::NAN, 0.0, 0.0)).is_err());
        let t = Transform2S::create_rotation_vector(&Vector3::new(0.0, 0.0, 5.0), PI).unwrap();
        assert_abs_diff_eq!(t.apply_vector(&Vector3::x()), -Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn from_matrix_requires_orthogonality() {
        assert!(Transform2S::from_matrix(Matrix3::identity() * 2.0).is_err());
        let t = Transform2S::from_matrix(Matrix3::new(
            0.0, -1.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0,
        ))
        .unwrap();
        assert_point(&t.apply(&Point2S::plus_i()), &Point2S::plus_j());
        assert!(t.is_finite());
    }

    #[test]
    fn inverse_round_trips_poles() {
        let t = Transform2S::create_rotation(&Point2S::of(0.3, 1.0), 2.1)
            .reflect(&Point2S::of(1.0, 0.5));
        let inverse = t.inverse();
        for p in [Point2S::plus_k(), Point2S::minus_k()] {
            assert_point(&inverse.apply(&t.apply(&p)), &p);
        }
    }

    proptest! {
        #[test]
        fn inverse_round_trip(
            azimuth in 0.0..TAU,
            polar in 0.0..=PI,
            axis_azimuth in 0.0..TAU,
            axis_polar in 0.0..=PI,
            angle in -TAU..TAU,
            reflect in any::<bool>(),
        ) {
            let point = Point2S::of(azimuth, polar);
            let axis = Point2S::of(axis_azimuth, axis_polar);
            let mut t = Transform2S::create_rotation(&axis, angle);
            if reflect {
                t = t.reflect(&axis);
            }
            let round_trip = t.inverse().apply(&t.apply(&point));
            prop_assert!(round_trip.approx_eq(&point, Precision::new(1e-10)));
        }
    }
}
