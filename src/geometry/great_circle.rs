use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use crate::error::{GeometryError, Result};
use crate::geometry::{AngularInterval, GreatArc, Point2S};
use crate::math::angle::normalize_0_2pi;
use crate::math::vector::{angle_between, normalize, orthogonal, orthogonal_to};
use crate::math::{Precision, Vector3};
use crate::partition::{Hyperplane, HyperplaneLocation};
use crate::transform::Transform2S;

/// A great circle: the hyperplane of the sphere.
///
/// The circle is the set of points at 90° from `pole`. `u` and `v` span
/// the circle's plane with `pole = u × v`; the 1D subspace coordinate of
/// a point on the circle is its angle from `u` toward `v`. Points on the
/// pole's side of the circle are on the minus side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircle {
    pole: Vector3,
    u: Vector3,
    v: Vector3,
    precision: Precision,
}

impl GreatCircle {
    /// Creates a circle from its pole, choosing an arbitrary `u` axis.
    ///
    /// # Errors
    ///
    /// Returns an error if `pole` is zero or not finite.
    pub fn from_pole(pole: &Vector3, precision: Precision) -> Result<Self> {
        let u = orthogonal(pole)?;
        Self::from_pole_and_u(pole, &u, precision)
    }

    /// Creates a circle from its pole and a direction for the `u` axis.
    /// `u` only needs a component orthogonal to the pole.
    ///
    /// # Errors
    ///
    /// Returns an error if either vector is degenerate or they are parallel.
    pub fn from_pole_and_u(pole: &Vector3, u: &Vector3, precision: Precision) -> Result<Self> {
        let pole = normalize(pole)?;
        let u = orthogonal_to(&pole, u)?;
        let v = pole.cross(&u);
        Ok(Self::from_frame(pole, u, v, precision))
    }

    /// Creates the circle through `start` and `end`, oriented so that
    /// `start` has subspace coordinate 0 and `end` lies less than π ahead.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for non-finite points and
    /// [`GeometryError::Degenerate`] for equal or antipodal points.
    pub fn from_points(start: &Point2S, end: &Point2S, precision: Precision) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GeometryError::NonFinite(format!(
                "cannot create great circle from points {start} and {end}"
            ))
            .into());
        }
        let distance = start.distance(end);
        if precision.eq_zero(distance) || precision.eq(distance, PI) {
            return Err(GeometryError::Degenerate(format!(
                "cannot create great circle from equal or antipodal points {start} and {end}"
            ))
            .into());
        }
        let u = *start.vector();
        let pole = normalize(&u.cross(end.vector()))?;
        let v = pole.cross(&u);
        Ok(Self::from_frame(pole, u, v, precision))
    }

    fn from_frame(pole: Vector3, u: Vector3, v: Vector3, precision: Precision) -> Self {
        Self {
            pole: pole.normalize(),
            u: u.normalize(),
            v: v.normalize(),
            precision,
        }
    }

    /// Returns the unit pole; the minus side of the circle faces it.
    #[must_use]
    pub fn pole(&self) -> &Vector3 {
        &self.pole
    }

    /// The pole as a point on the sphere.
    #[must_use]
    pub fn pole_point(&self) -> Point2S {
        Point2S::from_vector(&self.pole)
    }

    /// Returns the unit axis at subspace angle 0.
    #[must_use]
    pub fn u(&self) -> &Vector3 {
        &self.u
    }

    /// Returns the unit axis at subspace angle π/2.
    #[must_use]
    pub fn v(&self) -> &Vector3 {
        &self.v
    }

    /// Returns the precision used for comparisons.
    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Signed angular offset of `point` from the circle's plane.
    /// The pole has offset `-π/2`, its antipode `+π/2`.
    #[must_use]
    pub fn offset(&self, point: &Point2S) -> f64 {
        self.offset_vector(point.vector())
    }

    /// [`offset`](Self::offset) for a raw direction vector.
    #[must_use]
    pub fn offset_vector(&self, vector: &Vector3) -> f64 {
        angle_between(&self.pole, vector) - FRAC_PI_2
    }

    /// Classifies a point as on the circle or on its minus or plus side.
    #[must_use]
    pub fn classify(&self, point: &Point2S) -> HyperplaneLocation {
        match self.precision.sign(self.offset(point)) {
            s if s < 0 => HyperplaneLocation::Minus,
            0 => HyperplaneLocation::On,
            _ => HyperplaneLocation::Plus,
        }
    }

    /// Returns `true` if `point` lies on the circle within precision.
    #[must_use]
    pub fn contains(&self, point: &Point2S) -> bool {
        self.classify(point) == HyperplaneLocation::On
    }

    /// Angle in `[0, 2π)` of the projection of `vector` onto the circle's
    /// plane, measured from `u` toward `v`.
    #[must_use]
    pub fn azimuth(&self, vector: &Vector3) -> f64 {
        normalize_0_2pi(vector.dot(&self.v).atan2(vector.dot(&self.u)))
    }

    /// Unit vector on the circle at the given subspace angle.
    #[must_use]
    pub fn vector_at(&self, azimuth: f64) -> Vector3 {
        let (sin, cos) = azimuth.sin_cos();
        self.u * cos + self.v * sin
    }

    /// Subspace coordinate of `point`.
    #[must_use]
    pub fn to_subspace(&self, point: &Point2S) -> f64 {
        self.azimuth(point.vector())
    }

    /// Point on the circle at subspace coordinate `azimuth`.
    #[must_use]
    pub fn to_space(&self, azimuth: f64) -> Point2S {
        Point2S::from_vector(&self.vector_at(azimuth))
    }

    /// Closest point on the circle to `point`. The poles project onto `u`.
    #[must_use]
    pub fn project(&self, point: &Point2S) -> Point2S {
        self.to_space(self.to_subspace(point))
    }

    /// Same point set, opposite orientation.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            pole: -self.pole,
            u: self.u,
            v: -self.v,
            precision: self.precision,
        }
    }

    /// Applies a rigid motion to the pole and `u`; `v` is recomputed so the
    /// frame stays right-handed.
    #[must_use]
    pub fn transform(&self, transform: &Transform2S) -> Self {
        let pole = transform.apply_vector(&self.pole);
        let u = transform.apply_vector(&self.u);
        let v = pole.cross(&u);
        Self::from_frame(pole, u, v, self.precision)
    }

    /// One of the two points where the circles cross: the direction of
    /// `self.pole × other.pole`. `None` if the circles coincide.
    #[must_use]
    pub fn intersection(&self, other: &GreatCircle) -> Option<Point2S> {
        let cross = self.pole.cross(&other.pole);
        if self.precision.eq_zero(cross.norm()) {
            None
        } else {
            Some(Point2S::from_vector(&cross))
        }
    }

    /// Unsigned angle in `[0, π]` between the two poles.
    #[must_use]
    pub fn angle(&self, other: &GreatCircle) -> f64 {
        angle_between(&self.pole, &other.pole)
    }

    /// Signed angle in `(-π, π]` from this circle's pole to `other`'s,
    /// positive when the rotation is counterclockwise seen from
    /// `reference`.
    #[must_use]
    pub fn angle_at(&self, other: &GreatCircle, reference: &Point2S) -> f64 {
        let cross = self.pole.cross(&other.pole);
        reference.vector().dot(&cross).atan2(self.pole.dot(&other.pole))
    }

    /// Returns `true` if the plus sides of the circles face the same way.
    #[must_use]
    pub fn similar_orientation(&self, other: &GreatCircle) -> bool {
        self.pole.dot(&other.pole) > 0.0
    }

    /// Returns `true` if both the poles and the `u` axes match within
    /// `precision`. Reversed circles are never equal.
    #[must_use]
    pub fn approx_eq(&self, other: &GreatCircle, precision: Precision) -> bool {
        precision.eq_zero(angle_between(&self.pole, &other.pole))
            && precision.eq_zero(angle_between(&self.u, &other.u))
    }

    /// Arc covering the whole circle.
    #[must_use]
    pub fn span(&self) -> GreatArc {
        GreatArc::new(*self, AngularInterval::full(self.precision))
    }

    /// Arc running from subspace angle `start` to `end`. Equivalent angles
    /// give the full circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc would be longer than π or an angle is
    /// not finite.
    pub fn arc(&self, start: f64, end: f64) -> Result<GreatArc> {
        let interval = AngularInterval::of(start, end, self.precision)?;
        Ok(GreatArc::new(*self, interval))
    }

    /// Arc running from the projection of `start` to that of `end`.
    ///
    /// # Errors
    ///
    /// See [`arc`](Self::arc).
    pub fn arc_from_points(&self, start: &Point2S, end: &Point2S) -> Result<GreatArc> {
        self.arc(self.to_subspace(start), self.to_subspace(end))
    }

    /// Creates an arc on this circle covering `interval`.
    #[must_use]
    pub fn arc_from_interval(&self, interval: AngularInterval) -> GreatArc {
        GreatArc::new(*self, interval)
    }
}

impl Hyperplane for GreatCircle {
    type Point = Point2S;
    type Subset = GreatArc;

    fn offset(&self, point: &Point2S) -> f64 {
        GreatCircle::offset(self, point)
    }

    fn classify(&self, point: &Point2S) -> HyperplaneLocation {
        GreatCircle::classify(self, point)
    }

    fn reverse(&self) -> Self {
        GreatCircle::reverse(self)
    }

    fn span(&self) -> GreatArc {
        GreatCircle::span(self)
    }

    fn similar_orientation(&self, other: &Self) -> bool {
        GreatCircle::similar_orientation(self, other)
    }
}

pub(crate) fn fmt_vector(v: &Vector3) -> String {
    format!("({}, {}, {})", v.x, v.y, v.z)
}

impl fmt::Display for GreatCircle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GreatCircle[pole= {}, u= {}, v= {}]",
            fmt_vector(self.pole()),
            fmt_vector(self.u()),
            fmt_vector(self.v())
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 1e-12;

    fn precision() -> Precision {
        Precision::new(1e-10)
    }

    #[test]
    fn from_points_builds_right_handed_frame() {
        let circle =
            GreatCircle::from_points(&Point2S::plus_i(), &Point2S::plus_j(), precision()).unwrap();
        assert_abs_diff_eq!(*circle.pole(), Vector3::z(), epsilon = EPS);
        assert_abs_diff_eq!(*circle.u(), Vector3::x(), epsilon = EPS);
        assert_abs_diff_eq!(*circle.v(), Vector3::y(), epsilon = EPS);
    }

    #[test]
    fn from_points_rejects_degenerate_input() {
        let p = Point2S::of(0.4, 1.2);
        assert!(GreatCircle::from_points(&p, &p, precision()).is_err());
        assert!(GreatCircle::from_points(&p, &p.antipodal(), precision()).is_err());
        assert!(GreatCircle::from_points(&p, &Point2S::nan(), precision()).is_err());
        assert!(GreatCircle::from_pole(&Vector3::zeros(), precision()).is_err());
    }

    #[test]
    fn from_pole_and_u_removes_pole_component() {
        let circle = GreatCircle::from_pole_and_u(
            &Vector3::new(0.0, 0.0, 2.0),
            &Vector3::new(1.0, 0.0, 5.0),
            precision(),
        )
        .unwrap();
        assert_abs_diff_eq!(*circle.u(), Vector3::x(), epsilon = EPS);
        assert_abs_diff_eq!(*circle.v(), Vector3::y(), epsilon = EPS);
    }

    #[test]
    fn offset_is_angle_from_plane() {
        let circle = GreatCircle::from_pole(&Vector3::z(), precision()).unwrap();
        assert_abs_diff_eq!(circle.offset(&Point2S::plus_k()), -FRAC_PI_2, epsilon = EPS);
        assert_abs_diff_eq!(circle.offset(&Point2S::minus_k()), FRAC_PI_2, epsilon = EPS);
        assert_abs_diff_eq!(circle.offset(&Point2S::of(1.0, PI / 4.0)), -PI / 4.0, epsilon = EPS);

        assert_eq!(circle.classify(&Point2S::plus_k()), HyperplaneLocation::Minus);
        assert_eq!(circle.classify(&Point2S::minus_k()), HyperplaneLocation::Plus);
        assert_eq!(circle.classify(&Point2S::of(2.0, FRAC_PI_2)), HyperplaneLocation::On);
    }

    #[test]
    fn subspace_round_trip() {
        let circle =
            GreatCircle::from_points(&Point2S::plus_j(), &Point2S::plus_k(), precision()).unwrap();
        assert_abs_diff_eq!(circle.to_subspace(&Point2S::plus_j()), 0.0, epsilon = EPS);
        assert_abs_diff_eq!(circle.to_subspace(&Point2S::plus_k()), FRAC_PI_2, epsilon = EPS);
        assert!(circle
            .to_space(PI)
            .approx_eq(&Point2S::minus_j(), precision()));
        // pole projects onto u
        assert!(circle
            .project(&Point2S::plus_i())
            .approx_eq(&Point2S::plus_j(), precision()));
    }

    #[test]
    fn arc_between_angles_on_jk_circle() {
        let circle =
            GreatCircle::from_points(&Point2S::plus_j(), &Point2S::plus_k(), precision()).unwrap();
        let arc = circle.arc(FRAC_PI_2, 1.5 * PI).unwrap();
        assert!(arc.start_point().unwrap().approx_eq(&Point2S::plus_k(), precision()));
        assert!(arc.end_point().unwrap().approx_eq(&Point2S::minus_k(), precision()));
        assert_abs_diff_eq!(
            arc.size(),
            Point2S::plus_k().distance(&Point2S::minus_k()),
            epsilon = EPS
        );
    }

    #[test]
    fn equal_angles_give_full_arc() {
        let circle = GreatCircle::from_pole(&Vector3::z(), precision()).unwrap();
        let arc = circle.arc(1.0, 1.0).unwrap();
        assert!(arc.is_full());
        assert!(arc.start_point().is_none());
        let arc = circle
            .arc_from_points(&Point2S::plus_i(), &Point2S::plus_i())
            .unwrap();
        assert!(arc.is_full());
    }

    #[test]
    fn intersection_follows_pole_cross_product() {
        let xy = GreatCircle::from_pole(&Vector3::z(), precision()).unwrap();
        let yz = GreatCircle::from_pole(&Vector3::x(), precision()).unwrap();
        let point = xy.intersection(&yz).unwrap();
        assert!(point.approx_eq(&Point2S::plus_j(), precision()));
        assert!(xy.intersection(&xy.reverse()).is_none());
    }

    #[test]
    fn angle_at_reference() {
        let xy = GreatCircle::from_pole(&Vector3::z(), precision()).unwrap();
        let yz = GreatCircle::from_pole(&Vector3::x(), precision()).unwrap();
        assert_abs_diff_eq!(xy.angle(&yz), FRAC_PI_2, epsilon = EPS);
        assert_abs_diff_eq!(xy.angle_at(&yz, &Point2S::plus_j()), FRAC_PI_2, epsilon = EPS);
        assert_abs_diff_eq!(xy.angle_at(&yz, &Point2S::minus_j()), -FRAC_PI_2, epsilon = EPS);
    }

    #[test]
    fn reverse_flips_sides_only() {
        let circle =
            GreatCircle::from_points(&Point2S::plus_i(), &Point2S::plus_j(), precision()).unwrap();
        let reversed = circle.reverse();
        assert_eq!(reversed.classify(&Point2S::plus_k()), HyperplaneLocation::Plus);
        assert_abs_diff_eq!(*reversed.u(), *circle.u(), epsilon = EPS);
        assert!(!circle.approx_eq(&reversed, precision()));
        assert!(circle.approx_eq(&reversed.reverse(), precision()));
        assert!(!circle.similar_orientation(&reversed));
    }

    #[test]
    fn display_lists_frame() {
        let circle = GreatCircle::from_pole(&Vector3::z(), precision()).unwrap();
        assert!(circle.to_string().starts_with("GreatCircle[pole= (0, 0, 1)"));
    }
}
