use std::cmp::Ordering;

use super::TOLERANCE;

/// Epsilon-based equivalence policy for floating-point comparisons.
///
/// Every geometric comparison in the crate goes through a `Precision`
/// rather than exact equality. Circles, arcs and regions carry the
/// instance they were built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Precision {
    epsilon: f64,
}

impl Precision {
    /// Creates a precision context with the given absolute epsilon.
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.abs(),
        }
    }

    /// Returns the absolute epsilon of this context.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns `true` if `a` and `b` differ by at most epsilon.
    #[must_use]
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.epsilon
    }

    /// Returns `true` if `a` is within epsilon of zero.
    #[must_use]
    pub fn eq_zero(&self, a: f64) -> bool {
        self.eq(a, 0.0)
    }

    /// Returns `true` if `a` is strictly less than `b` and not equivalent to it.
    #[must_use]
    pub fn lt(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Returns `true` if `a` is less than or equivalent to `b`.
    #[must_use]
    pub fn lte(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) != Ordering::Greater
    }

    /// Returns `true` if `a` is strictly greater than `b` and not equivalent to it.
    #[must_use]
    pub fn gt(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    /// Returns `true` if `a` is greater than or equivalent to `b`.
    #[must_use]
    pub fn gte(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) != Ordering::Less
    }

    /// Compares two values, treating values within epsilon as equal.
    ///
    /// NaN compares greater than everything so that it never counts as
    /// "equal" to a finite value.
    #[must_use]
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        if self.eq(a, b) {
            Ordering::Equal
        } else {
            a.partial_cmp(&b).unwrap_or(Ordering::Greater)
        }
    }

    /// Returns `-1`, `0` or `1` according to the sign of `a`, with values
    /// within epsilon of zero mapping to `0`.
    #[must_use]
    pub fn sign(&self, a: f64) -> i32 {
        match self.compare(a, 0.0) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::new(TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_within_epsilon() {
        let precision = Precision::new(1e-3);
        assert!(precision.eq(1.0, 1.0005));
        assert!(!precision.eq(1.0, 1.002));
        assert!(precision.eq_zero(-1e-4));
    }

    #[test]
    fn ordering_respects_epsilon() {
        let precision = Precision::new(1e-3);
        assert!(precision.lte(1.0005, 1.0));
        assert!(!precision.lt(1.0, 1.0005));
        assert!(precision.gt(1.01, 1.0));
        assert!(precision.gte(0.9995, 1.0));
        assert_eq!(precision.compare(2.0, 1.0), Ordering::Greater);
    }

    #[test]
    fn sign_collapses_small_values() {
        let precision = Precision::new(1e-6);
        assert_eq!(precision.sign(1e-8), 0);
        assert_eq!(precision.sign(-0.5), -1);
        assert_eq!(precision.sign(0.5), 1);
    }

    #[test]
    fn nan_is_never_equal() {
        let precision = Precision::default();
        assert!(!precision.eq(f64::NAN, 0.0));
        assert_eq!(precision.compare(f64::NAN, 0.0), Ordering::Greater);
    }

    #[test]
    fn negative_epsilon_is_made_positive() {
        assert!((Precision::new(-1e-4).epsilon() - 1e-4).abs() < f64::EPSILON);
    }
}
