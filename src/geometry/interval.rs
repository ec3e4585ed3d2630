use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::angle::{above, normalize_0_2pi, normalize_signed};
use crate::math::Precision;
use crate::partition::{RegionLocation, Split};

/// A convex interval of angles on a great circle's 1D subspace.
///
/// Either the full circle, or `[min, max]` with `min` in `[0, 2π)` and
/// `max - min <= π` (within precision). A zero-length request is read as
/// the full circle, never as an empty interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularInterval {
    min: f64,
    max: f64,
    precision: Precision,
}

impl AngularInterval {
    /// The whole circle.
    #[must_use]
    pub fn full(precision: Precision) -> Self {
        Self {
            min: 0.0,
            max: TAU,
            precision,
        }
    }

    /// Creates the interval running counterclockwise from `min` to `max`.
    ///
    /// `max` is taken modulo 2π above `min`, so `of(1.5π, 0.5π)` spans the
    /// zero angle. Equivalent bounds produce the full interval.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for non-finite bounds and
    /// [`GeometryError::NonConvex`] if the interval is longer than π.
    pub fn of(min: f64, max: f64, precision: Precision) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GeometryError::NonFinite(format!("interval [{min}, {max}]")).into());
        }
        let width = if max - min >= TAU {
            TAU
        } else {
            above(max, min) - min
        };
        if precision.eq_zero(width) || precision.eq(width, TAU) {
            return Ok(Self::full(precision));
        }
        if precision.gt(width, PI) {
            return Err(GeometryError::NonConvex(format!(
                "interval [{min}, {max}] is longer than π"
            ))
            .into());
        }
        Ok(Self::bounded(min, width, precision))
    }

    fn bounded(min: f64, width: f64, precision: Precision) -> Self {
        let min = normalize_0_2pi(min);
        Self {
            min,
            max: min + width,
            precision,
        }
    }

    /// Returns the lower bound, in `[0, 2π)`.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound; may exceed 2π when the interval wraps past zero.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns the precision used for comparisons.
    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Returns the angular width of the interval.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Returns `true` if the interval covers the whole circle.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.size() >= TAU
    }

    /// Angle halfway between the bounds. `None` for the full interval.
    #[must_use]
    pub fn midpoint(&self) -> Option<f64> {
        (!self.is_full()).then(|| self.min + 0.5 * self.size())
    }

    /// Classifies an angle against the interval.
    #[must_use]
    pub fn classify(&self, angle: f64) -> RegionLocation {
        if self.is_full() {
            return RegionLocation::Inside;
        }
        let a = above(angle, self.min);
        let eps = self.precision;
        if eps.eq(a, self.min) || eps.eq(a, self.min + TAU) || eps.eq(a, self.max) {
            RegionLocation::Boundary
        } else if a < self.max {
            RegionLocation::Inside
        } else {
            RegionLocation::Outside
        }
    }

    /// Splits the interval at the 1D cut `cut`.
    ///
    /// Angles in `(cut, cut + π)` are on the plus side of the cut, angles
    /// in `(cut - π, cut)` on the minus side.
    #[must_use]
    pub fn split(&self, cut: f64) -> Split<Self> {
        let eps = self.precision;
        if self.is_full() {
            return Split::new(
                Some(Self::bounded(cut + PI, PI, eps)),
                Some(Self::bounded(cut, PI, eps)),
            );
        }
        let strictly_inside = |angle: f64| eps.lt(self.min, angle) && eps.lt(angle, self.max);

        let forward = above(cut, self.min);
        if strictly_inside(forward) {
            return Split::new(
                Some(Self::bounded(self.min, forward - self.min, eps)),
                Some(Self::bounded(forward, self.max - forward, eps)),
            );
        }
        let backward = above(cut + PI, self.min);
        if strictly_inside(backward) {
            return Split::new(
                Some(Self::bounded(backward, self.max - backward, eps)),
                Some(Self::bounded(self.min, backward - self.min, eps)),
            );
        }

        let mid = self.min + 0.5 * self.size();
        if normalize_signed(mid - cut) > 0.0 {
            Split::new(None, Some(*self))
        } else {
            Split::new(Some(*self), None)
        }
    }

    /// The interval covering the negated angles.
    #[must_use]
    pub fn reflect(&self) -> Self {
        if self.is_full() {
            return *self;
        }
        Self::bounded(-self.max, self.size(), self.precision)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn precision() -> Precision {
        Precision::new(1e-10)
    }

    #[test]
    fn equal_bounds_mean_full() {
        assert!(AngularInterval::of(1.0, 1.0, precision()).unwrap().is_full());
        assert!(AngularInterval::of(0.0, TAU, precision()).unwrap().is_full());
        assert!(AngularInterval::of(2.0, 2.0 + 1e-12, precision()).unwrap().is_full());
    }

    #[test]
    fn wraps_past_zero() {
        let interval = AngularInterval::of(1.5 * PI, 0.5 * PI, precision()).unwrap();
        assert_abs_diff_eq!(interval.size(), PI, epsilon = 1e-12);
        assert_eq!(interval.classify(0.0), RegionLocation::Inside);
        assert_eq!(interval.classify(PI), RegionLocation::Outside);
    }

    #[test]
    fn rejects_long_and_non_finite() {
        assert!(AngularInterval::of(0.0, 1.5 * PI, precision()).is_err());
        assert!(AngularInterval::of(f64::NAN, 1.0, precision()).is_err());
    }

    #[test]
    fn classify_bounds() {
        let interval = AngularInterval::of(0.0, FRAC_PI_2, precision()).unwrap();
        assert_eq!(interval.classify(0.0), RegionLocation::Boundary);
        assert_eq!(interval.classify(TAU - 1e-12), RegionLocation::Boundary);
        assert_eq!(interval.classify(FRAC_PI_2), RegionLocation::Boundary);
        assert_eq!(interval.classify(1.0), RegionLocation::Inside);
        assert_eq!(interval.classify(-1.0), RegionLocation::Outside);
    }

    #[test]
    fn split_full() {
        let split = AngularInterval::full(precision()).split(FRAC_PI_2);
        let minus = split.minus().unwrap();
        let plus = split.plus().unwrap();
        assert_abs_diff_eq!(minus.min(), 1.5 * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(minus.size(), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(plus.min(), FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(plus.size(), PI, epsilon = 1e-12);
    }

    #[test]
    fn split_at_cut_and_antipode() {
        let interval = AngularInterval::of(0.0, 2.0, precision()).unwrap();

        let split = interval.split(1.0);
        assert_abs_diff_eq!(split.minus().unwrap().max(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(split.plus().unwrap().min(), 1.0, epsilon = 1e-12);

        let split = interval.split(1.0 + PI);
        assert_abs_diff_eq!(split.plus().unwrap().max(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(split.minus().unwrap().min(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn split_without_crossing() {
        let interval = AngularInterval::of(1.0, 2.0, precision()).unwrap();
        assert_eq!(interval.split(0.5).location(), crate::partition::SplitLocation::Plus);
        assert_eq!(interval.split(2.5).location(), crate::partition::SplitLocation::Minus);
        // touching the cut at an endpoint does not split
        assert_eq!(interval.split(1.0).location(), crate::partition::SplitLocation::Plus);
    }

    #[test]
    fn reflect_negates() {
        let interval = AngularInterval::of(0.5, 1.0, precision()).unwrap();
        let reflected = interval.reflect();
        assert_abs_diff_eq!(reflected.min(), TAU - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(reflected.max(), TAU - 0.5, epsilon = 1e-12);
    }
}
