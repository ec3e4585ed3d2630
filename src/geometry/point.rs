use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::hash::{Hash, Hasher};

use nalgebra::Unit;

use crate::math::angle::normalize_0_2pi;
use crate::math::vector::{angle_between, is_finite, orthogonal};
use crate::math::{Precision, Vector3};

/// A point on the unit sphere.
///
/// Stored both as spherical angles and as the equivalent unit vector:
/// `azimuth` in `[0, 2π)` measured in the x-y plane from +x toward +y,
/// `polar` in `[0, π]` measured from +z. Both poles compare equal
/// regardless of azimuth.
#[derive(Debug, Clone, Copy)]
pub struct Point2S {
    azimuth: f64,
    polar: f64,
    vector: Vector3,
}

impl Point2S {
    /// Creates a point from azimuth and polar angles (radians).
    ///
    /// Angles are normalized; a polar angle outside `[0, π]` is reflected
    /// through the pole with the azimuth moved to the opposite meridian.
    /// Any non-finite angle produces the NaN point.
    #[must_use]
    pub fn of(azimuth: f64, polar: f64) -> Self {
        if !azimuth.is_finite() || !polar.is_finite() {
            return Self::nan();
        }
        let mut polar = normalize_0_2pi(polar);
        let mut azimuth = azimuth;
        if polar > PI {
            polar = 2.0 * PI - polar;
            azimuth += PI;
        }
        let azimuth = normalize_0_2pi(azimuth);
        let (sin_polar, cos_polar) = polar.sin_cos();
        let vector = Vector3::new(
            azimuth.cos() * sin_polar,
            azimuth.sin() * sin_polar,
            cos_polar,
        );
        Self {
            azimuth,
            polar,
            vector,
        }
    }

    /// Creates a point from a 3D direction. Zero or non-finite input
    /// produces the NaN point.
    #[must_use]
    pub fn from_vector(v: &Vector3) -> Self {
        let norm = v.norm();
        if !is_finite(v) || norm == 0.0 {
            return Self::nan();
        }
        let vector = v / norm;
        let azimuth = normalize_0_2pi(vector.y.atan2(vector.x));
        let polar = vector.xy().norm().atan2(vector.z);
        Self {
            azimuth,
            polar,
            vector,
        }
    }

    /// `+x` on the equator.
    #[must_use]
    pub fn plus_i() -> Self {
        Self::from_axis(0.0, FRAC_PI_2, Vector3::x())
    }

    /// `-x` on the equator.
    #[must_use]
    pub fn minus_i() -> Self {
        Self::from_axis(PI, FRAC_PI_2, -Vector3::x())
    }

    /// `+y` on the equator.
    #[must_use]
    pub fn plus_j() -> Self {
        Self::from_axis(FRAC_PI_2, FRAC_PI_2, Vector3::y())
    }

    /// `-y` on the equator.
    #[must_use]
    pub fn minus_j() -> Self {
        Self::from_axis(1.5 * PI, FRAC_PI_2, -Vector3::y())
    }

    /// North pole.
    #[must_use]
    pub fn plus_k() -> Self {
        Self::from_axis(0.0, 0.0, Vector3::z())
    }

    /// South pole.
    #[must_use]
    pub fn minus_k() -> Self {
        Self::from_axis(0.0, PI, -Vector3::z())
    }

    /// Sentinel for undefined points.
    #[must_use]
    pub fn nan() -> Self {
        Self {
            azimuth: f64::NAN,
            polar: f64::NAN,
            vector: Vector3::new(f64::NAN, f64::NAN, f64::NAN),
        }
    }

    fn from_axis(azimuth: f64, polar: f64, vector: Vector3) -> Self {
        Self {
            azimuth,
            polar,
            vector,
        }
    }

    #[must_use]
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    #[must_use]
    pub fn polar(&self) -> f64 {
        self.polar
    }

    /// Unit vector of this point.
    #[must_use]
    pub fn vector(&self) -> &Vector3 {
        &self.vector
    }

    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.azimuth.is_nan() || self.polar.is_nan()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.azimuth.is_finite() && self.polar.is_finite()
    }

    fn is_pole(&self) -> bool {
        self.polar == 0.0 || self.polar == PI
    }

    /// Great-circle distance to `other`, in `[0, π]`.
    #[must_use]
    pub fn distance(&self, other: &Point2S) -> f64 {
        angle_between(&self.vector, &other.vector)
    }

    /// The point on the opposite side of the sphere.
    #[must_use]
    pub fn antipodal(&self) -> Self {
        Self::from_vector(&-self.vector)
    }

    /// Spherical linear interpolation toward `other`; `t = 0` gives `self`
    /// and `t = 1` gives `other`.
    ///
    /// For antipodal inputs the path runs through an arbitrary but
    /// deterministic great circle.
    #[must_use]
    pub fn slerp(&self, other: &Point2S, t: f64) -> Self {
        let start = Unit::new_unchecked(self.vector);
        let end = Unit::new_unchecked(other.vector);
        if let Some(result) = start.try_slerp(&end, t, 1e-12) {
            return Self::from_vector(&result);
        }
        match orthogonal(&self.vector) {
            Ok(normal) => {
                let angle = t * self.distance(other);
                Self::from_vector(&(self.vector * angle.cos() + normal * angle.sin()))
            }
            Err(_) => Self::nan(),
        }
    }

    /// Returns `true` if the points are within `precision` of each other.
    #[must_use]
    pub fn approx_eq(&self, other: &Point2S, precision: Precision) -> bool {
        precision.eq_zero(self.distance(other))
    }
}

impl PartialEq for Point2S {
    fn eq(&self, other: &Self) -> bool {
        if self.is_nan() || other.is_nan() {
            return self.is_nan() && other.is_nan();
        }
        if self.is_pole() && other.is_pole() {
            return self.polar == other.polar;
        }
        self.azimuth == other.azimuth && self.polar == other.polar
    }
}

impl Eq for Point2S {}

impl Hash for Point2S {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.is_nan() {
            u64::MAX.hash(state);
            return;
        }
        // adding 0.0 folds -0.0 into +0.0
        (self.polar + 0.0).to_bits().hash(state);
        if !self.is_pole() {
            (self.azimuth + 0.0).to_bits().hash(state);
        }
    }
}

impl fmt::Display for Point2S {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.azimuth, self.polar)
    }
}
