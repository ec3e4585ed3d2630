//! Unit-vector helpers for the Euclidean embedding of the sphere.

use crate::error::{GeometryError, Result};

use super::Vector3;

/// Returns `true` if every component of `v` is finite.
#[must_use]
pub fn is_finite(v: &Vector3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Normalizes `v`, failing on non-finite or zero-length input.
///
/// # Errors
///
/// Returns [`GeometryError::NonFinite`] or [`GeometryError::ZeroVector`].
pub fn normalize(v: &Vector3) -> Result<Vector3> {
    if !is_finite(v) {
        return Err(GeometryError::NonFinite(format!("vector {v:?}")).into());
    }
    let norm = v.norm();
    if norm == 0.0 {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(v / norm)
}

/// Angle in `[0, π]` between two vectors.
///
/// Uses `atan2(|a × b|, a · b)`, which stays accurate for nearly parallel
/// and nearly antiparallel inputs where `acos` loses precision.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Returns a unit vector orthogonal to `v`.
///
/// The component of `v` with the largest magnitude is left out of the
/// construction so the result is never degenerate for a nonzero input.
///
/// # Errors
///
/// Returns an error if `v` is zero-length or not finite.
pub fn orthogonal(v: &Vector3) -> Result<Vector3> {
    let v = normalize(v)?;
    let threshold = 0.6;
    let result = if v.x.abs() <= threshold {
        Vector3::new(0.0, v.z, -v.y)
    } else if v.y.abs() <= threshold {
        Vector3::new(-v.z, 0.0, v.x)
    } else {
        Vector3::new(v.y, -v.x, 0.0)
    };
    normalize(&result)
}

/// Returns the unit component of `v` orthogonal to `reference`.
///
/// # Errors
///
/// Returns an error if `v` is parallel to `reference` or either is degenerate.
pub fn orthogonal_to(reference: &Vector3, v: &Vector3) -> Result<Vector3> {
    let reference = normalize(reference)?;
    let rejected = v - reference * v.dot(&reference);
    if rejected.norm() < super::TOLERANCE {
        return Err(GeometryError::Degenerate(
            "vector is parallel to the reference direction".into(),
        )
        .into());
    }
    normalize(&rejected)
}
