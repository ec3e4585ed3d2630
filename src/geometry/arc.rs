use std::fmt;

use crate::error::Result;
use crate::geometry::{AngularInterval, GreatCircle, Point2S};
use crate::math::Precision;
use crate::partition::{ConvexSubset, HyperplaneLocation, RegionLocation, Split};
use crate::transform::Transform2S;

/// A connected piece of a great circle.
///
/// Described by the circle and an [`AngularInterval`] in the circle's
/// subspace. Arcs are either the full circle or at most π long, so every
/// arc is convex and can serve as a BSP cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatArc {
    circle: GreatCircle,
    interval: AngularInterval,
}

impl GreatArc {
    /// Creates an arc from a circle and an interval in its subspace.
    #[must_use]
    pub fn new(circle: GreatCircle, interval: AngularInterval) -> Self {
        Self { circle, interval }
    }

    /// Creates the shorter arc from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are equal, antipodal or not finite.
    pub fn from_points(start: &Point2S, end: &Point2S, precision: Precision) -> Result<Self> {
        GreatCircle::from_points(start, end, precision)?.arc_from_points(start, end)
    }

    /// Returns the circle the arc lies on.
    #[must_use]
    pub fn circle(&self) -> &GreatCircle {
        &self.circle
    }

    /// Returns the subspace interval covered by the arc.
    #[must_use]
    pub fn interval(&self) -> &AngularInterval {
        &self.interval
    }

    /// Returns the precision used for comparisons.
    #[must_use]
    pub fn precision(&self) -> Precision {
        self.circle.precision()
    }

    /// Returns `true` if the arc covers the whole circle.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.interval.is_full()
    }

    /// Always `false`: a zero-length request produces the full arc.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Angular length; 2π for the full circle.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.interval.size()
    }

    /// `None` for the full arc.
    #[must_use]
    pub fn start_point(&self) -> Option<Point2S> {
        (!self.is_full()).then(|| self.circle.to_space(self.interval.min()))
    }

    /// `None` for the full arc.
    #[must_use]
    pub fn end_point(&self) -> Option<Point2S> {
        (!self.is_full()).then(|| self.circle.to_space(self.interval.max()))
    }

    /// Returns the point halfway along the arc. `None` for the full arc.
    #[must_use]
    pub fn midpoint(&self) -> Option<Point2S> {
        self.interval.midpoint().map(|a| self.circle.to_space(a))
    }

    /// Same as [`midpoint`](Self::midpoint); a full circle has no centroid.
    #[must_use]
    pub fn centroid(&self) -> Option<Point2S> {
        self.midpoint()
    }

    /// Start and end point, empty for the full arc.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point2S> {
        self.start_point().into_iter().chain(self.end_point()).collect()
    }

    /// Classifies a point as inside, outside or on an endpoint of the arc.
    #[must_use]
    pub fn classify(&self, point: &Point2S) -> RegionLocation {
        if self.circle.classify(point) == HyperplaneLocation::On {
            self.interval.classify(self.circle.to_subspace(point))
        } else {
            RegionLocation::Outside
        }
    }

    /// Returns `true` unless the point is outside.
    #[must_use]
    pub fn contains(&self, point: &Point2S) -> bool {
        self.classify(point) != RegionLocation::Outside
    }

    /// Closest point of the arc to `point`.
    #[must_use]
    pub fn closest(&self, point: &Point2S) -> Point2S {
        let azimuth = self.circle.to_subspace(point);
        if self.interval.classify(azimuth) != RegionLocation::Outside {
            return self.circle.to_space(azimuth);
        }
        match (self.start_point(), self.end_point()) {
            (Some(start), Some(end)) => {
                if point.distance(&start) <= point.distance(&end) {
                    start
                } else {
                    end
                }
            }
            _ => self.circle.project(point),
        }
    }

    /// Splits the arc by a great circle.
    ///
    /// The cut falls at `self.circle.intersection(splitter)`; an arc on a
    /// circle coinciding with the splitter (in either orientation) lies on
    /// neither side.
    #[must_use]
    pub fn split(&self, splitter: &GreatCircle) -> Split<Self> {
        let Some(intersection) = self.circle.intersection(splitter) else {
            return Split::neither();
        };
        let cut = self.circle.to_subspace(&intersection);
        let circle = self.circle;
        self.interval
            .split(cut)
            .map(|interval| Self::new(circle, interval))
    }

    /// Same points, opposite direction; start and end swap.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self::new(self.circle.reverse(), self.interval.reflect())
    }

    /// Applies a rigid motion. A reflection reverses the direction of
    /// travel, so the transformed arc runs from the image of the end point
    /// to the image of the start point.
    #[must_use]
    pub fn transform(&self, transform: &Transform2S) -> Self {
        let circle = self.circle.transform(transform);
        let interval = if transform.preserves_orientation() {
            self.interval
        } else {
            self.interval.reflect()
        };
        Self::new(circle, interval)
    }

    /// Convex pieces of the arc. Arcs are convex by construction, so this
    /// is always the arc itself.
    #[must_use]
    pub fn to_convex(&self) -> Vec<Self> {
        vec![*self]
    }
}

impl ConvexSubset for GreatArc {
    type Hyperplane = GreatCircle;

    fn hyperplane(&self) -> &GreatCircle {
        &self.circle
    }

    fn is_full(&self) -> bool {
        GreatArc::is_full(self)
    }

    fn size(&self) -> f64 {
        GreatArc::size(self)
    }

    fn classify(&self, point: &Point2S) -> RegionLocation {
        GreatArc::classify(self, point)
    }

    fn split(&self, splitter: &GreatCircle) -> Split<Self> {
        GreatArc::split(self, splitter)
    }

    fn reverse(&self) -> Self {
        GreatArc::reverse(self)
    }
}

impl fmt::Display for GreatArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start_point(), self.end_point()) {
            (Some(start), Some(end)) => write!(f, "GreatArc[start= {start}, end= {end}]"),
            _ => write!(f, "GreatArc[full= true, circle= {}]", self.circle),
        }
    }
}
