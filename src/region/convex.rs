use std::f64::consts::PI;
use std::fmt;

use crate::error::{GeometryError, PathError, Result};
use crate::geometry::{connect_minimized, GreatArc, GreatArcPath, GreatCircle, Point2S};
use crate::math::{Precision, Vector3};
use crate::partition::{HyperplaneLocation, RegionLocation, Split, SplitLocation};
use crate::region::RegionBSPTree2S;
use crate::transform::Transform2S;

/// Area of the whole sphere.
pub const FULL_SIZE: f64 = 4.0 * PI;

/// Area of a hemisphere.
pub const HALF_SIZE: f64 = 2.0 * PI;

/// Regions smaller than this (in steradians) compute their weighted
/// centroid from a triangle fan; the boundary sum cancels badly there.
const TRIANGLE_FAN_CENTROID_THRESHOLD: f64 = 1e-2;

/// A convex region of the sphere: the intersection of the minus sides of
/// a set of great circles.
///
/// Only the boundary arcs are stored: each bounding circle trimmed by all
/// the others. Circles that do not touch the region leave no arc behind.
/// The region with no boundaries is the full sphere.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConvexArea2S {
    boundaries: Vec<GreatArc>,
}

impl ConvexArea2S {
    /// The whole sphere.
    #[must_use]
    pub fn full() -> Self {
        Self::default()
    }

    /// Intersects the minus sides of `bounds`.
    ///
    /// Duplicate circles are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonConvex`] if two bounds coincide with
    /// opposite orientations, or if the bounds leave no region with a
    /// boundary (for example three circles meeting in a single point).
    pub fn from_bounds(bounds: impl IntoIterator<Item = GreatCircle>) -> Result<Self> {
        let bounds: Vec<GreatCircle> = bounds.into_iter().collect();
        let mut boundaries = Vec::with_capacity(bounds.len());
        for (i, bound) in bounds.iter().enumerate() {
            if let Some(arc) = trim_bound(&bounds, i, bound)? {
                boundaries.push(arc);
            }
        }
        if boundaries.is_empty() && !bounds.is_empty() {
            return Err(GeometryError::NonConvex(format!(
                "{} bounding circles do not produce a convex region",
                bounds.len()
            ))
            .into());
        }
        Ok(Self { boundaries })
    }

    /// Region bounded by the circles through consecutive vertices.
    /// Repeated consecutive vertices are skipped; with `close` the last
    /// vertex is also joined back to the first.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::TooFewVertices`] if fewer than three distinct
    /// vertices remain, or any error of [`from_bounds`](Self::from_bounds).
    pub fn from_vertices(vertices: &[Point2S], close: bool, precision: Precision) -> Result<Self> {
        let mut distinct: Vec<Point2S> = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            if !distinct
                .last()
                .is_some_and(|last| last.approx_eq(vertex, precision))
            {
                distinct.push(*vertex);
            }
        }
        if close && distinct.len() > 1 && distinct[0].approx_eq(&distinct[distinct.len() - 1], precision) {
            distinct.pop();
        }
        if distinct.len() < 3 {
            return Err(PathError::TooFewVertices(distinct.len()).into());
        }

        let mut bounds = Vec::with_capacity(distinct.len());
        for pair in distinct.windows(2) {
            bounds.push(GreatCircle::from_points(&pair[0], &pair[1], precision)?);
        }
        if close {
            bounds.push(GreatCircle::from_points(
                &distinct[distinct.len() - 1],
                &distinct[0],
                precision,
            )?);
        }
        Self::from_bounds(bounds)
    }

    /// [`from_vertices`](Self::from_vertices) for a closed loop.
    ///
    /// # Errors
    ///
    /// See [`from_vertices`](Self::from_vertices).
    pub fn from_vertex_loop(vertices: &[Point2S], precision: Precision) -> Result<Self> {
        Self::from_vertices(vertices, true, precision)
    }

    /// Region bounded by the circles of a path's arcs.
    ///
    /// # Errors
    ///
    /// See [`from_bounds`](Self::from_bounds).
    pub fn from_path(path: &GreatArcPath) -> Result<Self> {
        Self::from_bounds(path.arcs().iter().map(|arc| *arc.circle()))
    }

    fn from_boundaries(boundaries: Vec<GreatArc>) -> Self {
        Self { boundaries }
    }

    /// Boundary arcs, in no particular order.
    #[must_use]
    pub fn boundaries(&self) -> &[GreatArc] {
        &self.boundaries
    }

    /// Returns `true` for the whole sphere.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Always `false`; an empty intersection is rejected on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    fn precision(&self) -> Precision {
        self.boundaries
            .first()
            .map_or_else(Precision::default, GreatArc::precision)
    }

    /// Boundary arcs connected into a single path. Empty for the full
    /// sphere.
    #[must_use]
    pub fn boundary_path(&self) -> GreatArcPath {
        connect_minimized(self.boundaries.iter().copied())
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    /// Vertices of the boundary path; a closed loop repeats its first
    /// vertex at the end.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point2S> {
        self.boundary_path().vertices()
    }

    /// Interior angle at the end of each arc of the boundary path.
    #[must_use]
    pub fn interior_angles(&self) -> Vec<f64> {
        interior_angles(self.boundary_path().arcs())
    }

    /// Area, by Girard's theorem: angle sum minus `(n - 2)π`.
    #[must_use]
    pub fn size(&self) -> f64 {
        match self.boundaries.len() {
            0 => FULL_SIZE,
            1 => HALF_SIZE,
            _ => {
                let path = self.boundary_path();
                let angles = interior_angles(path.arcs());
                #[allow(clippy::cast_precision_loss)]
                let excess = angles.iter().sum::<f64>() - (angles.len() as f64 - 2.0) * PI;
                excess.max(0.0)
            }
        }
    }

    /// Total length of the boundary arcs.
    #[must_use]
    pub fn boundary_size(&self) -> f64 {
        self.boundaries.iter().map(GreatArc::size).sum()
    }

    /// Centroid direction scaled by twice the area, suitable for summing
    /// over disjoint pieces before normalizing.
    #[must_use]
    pub fn weighted_centroid_vector(&self) -> Vector3 {
        match self.boundaries.len() {
            0 => Vector3::zeros(),
            1 => self.boundaries[0].circle().pole() * HALF_SIZE,
            _ => {
                if self.size() < TRIANGLE_FAN_CENTROID_THRESHOLD {
                    triangle_fan_centroid(self.boundary_path().arcs())
                } else {
                    self.boundaries
                        .iter()
                        .map(|arc| arc.circle().pole() * arc.size())
                        .sum()
                }
            }
        }
    }

    /// Centroid of the region. `None` for the full sphere and for a
    /// hemisphere.
    #[must_use]
    pub fn centroid(&self) -> Option<Point2S> {
        if self.boundaries.len() < 2 {
            return None;
        }
        let weighted = self.weighted_centroid_vector();
        if self.precision().eq_zero(weighted.norm()) {
            None
        } else {
            Some(Point2S::from_vector(&weighted))
        }
    }

    /// Classifies a point as inside, outside or on the boundary.
    #[must_use]
    pub fn classify(&self, point: &Point2S) -> RegionLocation {
        let mut on_boundary = false;
        for arc in &self.boundaries {
            match arc.circle().classify(point) {
                HyperplaneLocation::Plus => return RegionLocation::Outside,
                HyperplaneLocation::On => on_boundary = true,
                HyperplaneLocation::Minus => {}
            }
        }
        if on_boundary {
            RegionLocation::Boundary
        } else {
            RegionLocation::Inside
        }
    }

    /// Returns `true` unless the point is outside.
    #[must_use]
    pub fn contains(&self, point: &Point2S) -> bool {
        self.classify(point) != RegionLocation::Outside
    }

    /// Closest boundary point to `point`. `None` for the full sphere.
    #[must_use]
    pub fn project(&self, point: &Point2S) -> Option<Point2S> {
        self.boundaries
            .iter()
            .map(|arc| arc.closest(point))
            .min_by(|a, b| point.distance(a).total_cmp(&point.distance(b)))
    }

    /// The part of `arc` inside the region, if any.
    #[must_use]
    pub fn trim(&self, arc: &GreatArc) -> Option<GreatArc> {
        let mut remaining = *arc;
        for boundary in &self.boundaries {
            remaining = *remaining.split(boundary.circle()).minus()?;
        }
        Some(remaining)
    }

    /// Splits the region by a great circle.
    ///
    /// When the circle crosses the interior both halves receive the
    /// crossing arc as a new boundary (reversed for the plus half).
    /// Otherwise the region is returned whole on the side it lies on.
    #[must_use]
    pub fn split(&self, splitter: &GreatCircle) -> Split<Self> {
        if self.is_full() {
            return Split::new(
                Some(Self::from_boundaries(vec![splitter.span()])),
                Some(Self::from_boundaries(vec![splitter.reverse().span()])),
            );
        }

        let Some(trimmed) = self.trim(&splitter.span()) else {
            return match self.side_of(splitter) {
                SplitLocation::Plus => Split::new(None, Some(self.clone())),
                _ => Split::new(Some(self.clone()), None),
            };
        };

        let mut minus = Vec::with_capacity(self.boundaries.len() + 1);
        let mut plus = Vec::with_capacity(self.boundaries.len() + 1);
        for arc in &self.boundaries {
            let (arc_minus, arc_plus) = arc.split(splitter).into_parts();
            minus.extend(arc_minus);
            plus.extend(arc_plus);
        }

        if !trimmed.is_full() {
            // the splitter was trimmed; confirm the boundaries really lie on both sides
            match (minus.is_empty(), plus.is_empty()) {
                (true, true) => {
                    tracing::debug!("convex area vanished while splitting");
                    return Split::neither();
                }
                (true, false) => return Split::new(None, Some(self.clone())),
                (false, true) => return Split::new(Some(self.clone()), None),
                (false, false) => {}
            }
        }

        minus.push(trimmed);
        plus.push(trimmed.reverse());
        Split::new(
            Some(Self::from_boundaries(minus)),
            Some(Self::from_boundaries(plus)),
        )
    }

    /// Side of `splitter` holding a region the splitter does not cross.
    fn side_of(&self, splitter: &GreatCircle) -> SplitLocation {
        for arc in &self.boundaries {
            match arc.split(splitter).location() {
                SplitLocation::Minus => return SplitLocation::Minus,
                SplitLocation::Plus => return SplitLocation::Plus,
                SplitLocation::Neither => {
                    return if arc.circle().similar_orientation(splitter) {
                        SplitLocation::Minus
                    } else {
                        SplitLocation::Plus
                    };
                }
                SplitLocation::Both => {}
            }
        }
        tracing::debug!("no boundary decided the side of a non-crossing splitter");
        SplitLocation::Minus
    }

    /// Applies a rigid motion.
    #[must_use]
    pub fn transform(&self, transform: &Transform2S) -> Self {
        Self::from_boundaries(
            self.boundaries
                .iter()
                .map(|arc| arc.transform(transform))
                .collect(),
        )
    }

    /// Converts the area into a region tree.
    #[must_use]
    pub fn to_tree(&self) -> RegionBSPTree2S {
        if self.is_full() {
            return RegionBSPTree2S::full();
        }
        RegionBSPTree2S::from_arcs(self.boundaries.iter().copied())
    }
}

/// Span of `bounds[index]` trimmed by every other bound, or `None` if
/// nothing of it touches the region.
fn trim_bound(bounds: &[GreatCircle], index: usize, bound: &GreatCircle) -> Result<Option<GreatArc>> {
    let mut remaining = bound.span();
    for (j, other) in bounds.iter().enumerate() {
        if j == index {
            continue;
        }
        let split = remaining.split(other);
        match split.location() {
            SplitLocation::Neither => {
                if !bound.similar_orientation(other) {
                    return Err(GeometryError::NonConvex(format!(
                        "bounds {bound} and {other} are coincident with opposite orientations"
                    ))
                    .into());
                }
                // keep only the first of a set of duplicates
                if j < index {
                    return Ok(None);
                }
            }
            _ => match split.into_parts().0 {
                Some(minus) => remaining = minus,
                None => return Ok(None),
            },
        }
    }
    Ok(Some(remaining))
}

fn interior_angles(arcs: &[GreatArc]) -> Vec<f64> {
    let count = arcs.len();
    if count < 2 {
        return Vec::new();
    }
    (0..count)
        .filter_map(|i| {
            let current = &arcs[i];
            let next = &arcs[(i + 1) % count];
            let vertex = current.end_point()?;
            Some(PI - current.circle().angle_at(next.circle(), &vertex))
        })
        .collect()
}

/// Weighted centroid accumulated over triangles fanned out from the first
/// vertex, scaled to match the boundary-sum weighting.
fn triangle_fan_centroid(arcs: &[GreatArc]) -> Vector3 {
    let Some(first) = arcs.first().and_then(GreatArc::start_point) else {
        return Vector3::zeros();
    };
    let v0 = first.vector();
    let mut sum = Vector3::zeros();
    for arc in arcs {
        let (Some(start), Some(end)) = (arc.start_point(), arc.end_point()) else {
            continue;
        };
        let precision = arc.precision();
        if start.approx_eq(&first, precision) || end.approx_eq(&first, precision) {
            continue;
        }
        let (v1, v2) = (start.vector(), end.vector());
        let numerator = v0.dot(&v1.cross(v2));
        let denominator = 1.0 + v0.dot(v1) + v1.dot(v2) + v2.dot(v0);
        let area = 2.0 * numerator.atan2(denominator);
        let direction = v0 + v1 + v2;
        let norm = direction.norm();
        if norm > 0.0 {
            sum += direction * (2.0 * area / norm);
        }
    }
    sum
}

impl fmt::Display for ConvexArea2S {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.boundaries.len() {
            0 => write!(f, "ConvexArea2S[full= true]"),
            1 => write!(f, "ConvexArea2S[boundaries= [{}]]", self.boundaries[0]),
            _ => {
                write!(f, "ConvexArea2S[vertices= [")?;
                for (i, vertex) in self.vertices().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{vertex}")?;
                }
                write!(f, "]]")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SphereError;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-10;

    fn precision() -> Precision {
        Precision::new(1e-10)
    }

    fn octant() -> ConvexArea2S {
        ConvexArea2S::from_vertex_loop(
            &[Point2S::plus_i(), Point2S::plus_j(), Point2S::plus_k()],
            precision(),
        )
        .unwrap()
    }

    fn circle(pole: Vector3) -> GreatCircle {
        GreatCircle::from_pole(&pole, precision()).unwrap()
    }

    #[test]
    fn no_bounds_is_full_sphere() {
        let area = ConvexArea2S::from_bounds([]).unwrap();
        assert!(area.is_full());
        assert!(!area.is_empty());
        assert_abs_diff_eq!(area.size(), 4.0 * PI);
        assert!(area.centroid().is_none());
        assert_abs_diff_eq!(area.boundary_size(), 0.0);
        assert_eq!(area.classify(&Point2S::of(1.0, 2.0)), RegionLocation::Inside);
        assert!(area.project(&Point2S::plus_i()).is_none());
        assert_eq!(area, ConvexArea2S::full());
    }

    #[test]
    fn single_bound_is_hemisphere() {
        let area = ConvexArea2S::from_bounds([circle(Vector3::z())]).unwrap();
        assert_abs_diff_eq!(area.size(), 2.0 * PI);
        assert_abs_diff_eq!(area.boundary_size(), 2.0 * PI, epsilon = EPS);
        assert!(area.centroid().is_none());
        assert_abs_diff_eq!(
            area.weighted_centroid_vector(),
            Vector3::z() * 2.0 * PI,
            epsilon = EPS
        );
        assert_eq!(area.classify(&Point2S::plus_k()), RegionLocation::Inside);
        assert_eq!(area.classify(&Point2S::plus_i()), RegionLocation::Boundary);
        assert_eq!(area.classify(&Point2S::minus_k()), RegionLocation::Outside);
    }

    #[test]
    fn lune_size_is_twice_its_angle() {
        let area = ConvexArea2S::from_bounds([circle(Vector3::z()), circle(Vector3::x())]).unwrap();
        assert_eq!(area.boundaries().len(), 2);
        assert_abs_diff_eq!(area.size(), PI, epsilon = EPS);
        assert_abs_diff_eq!(area.boundary_size(), 2.0 * PI, epsilon = EPS);
        let centroid = area.centroid().unwrap();
        assert!(centroid.approx_eq(&Point2S::from_vector(&Vector3::new(1.0, 0.0, 1.0)), precision()));
    }

    #[test]
    fn octant_girard() {
        let area = octant();
        assert_abs_diff_eq!(area.size(), FRAC_PI_2, epsilon = EPS);
        assert_abs_diff_eq!(area.boundary_size(), 1.5 * PI, epsilon = EPS);
        for angle in area.interior_angles() {
            assert_abs_diff_eq!(angle, FRAC_PI_2, epsilon = EPS);
        }
        let centroid = area.centroid().unwrap();
        assert!(centroid.approx_eq(&Point2S::from_vector(&Vector3::new(1.0, 1.0, 1.0)), precision()));
        assert_eq!(area.vertices().len(), 4);
        assert!(area.to_string().starts_with("ConvexArea2S[vertices= ["));
    }

    #[test]
    fn quadrant_from_vertices() {
        let area = ConvexArea2S::from_vertex_loop(
            &[Point2S::minus_k(), Point2S::plus_i(), Point2S::minus_j()],
            precision(),
        )
        .unwrap();
        assert_abs_diff_eq!(area.size(), FRAC_PI_2, epsilon = EPS);
        assert!(area.contains(&Point2S::from_vector(&Vector3::new(1.0, -1.0, -1.0))));
    }

    #[test]
    fn too_few_vertices() {
        let result = ConvexArea2S::from_vertex_loop(
            &[Point2S::plus_i(), Point2S::plus_j(), Point2S::plus_j(), Point2S::plus_i()],
            precision(),
        );
        assert!(matches!(
            result,
            Err(SphereError::Path(PathError::TooFewVertices(2)))
        ));
    }

    #[test]
    fn opposite_coincident_bounds_fail() {
        let c = circle(Vector3::z());
        assert!(matches!(
            ConvexArea2S::from_bounds([c, c.reverse()]),
            Err(SphereError::Geometry(GeometryError::NonConvex(_)))
        ));
    }

    #[test]
    fn duplicate_and_redundant_bounds_are_dropped() {
        let z = circle(Vector3::z());
        let x = circle(Vector3::x());
        let y = circle(Vector3::y());
        let area = ConvexArea2S::from_bounds([z, x, z, y]).unwrap();
        assert_eq!(area.boundaries().len(), 3);
        assert_abs_diff_eq!(area.size(), FRAC_PI_2, epsilon = EPS);

        // the minus side of this bound contains the whole octant
        let redundant = circle(Vector3::new(1.0, 1.0, 1.0));
        let area = ConvexArea2S::from_bounds([z, x, y, redundant]).unwrap();
        assert_eq!(area.boundaries().len(), 3);
    }

    #[test]
    fn trim_keeps_inside_part() {
        let area = octant();
        let arc = GreatArc::from_points(
            &Point2S::of(-0.5, FRAC_PI_2 / 2.0),
            &Point2S::of(2.0, FRAC_PI_2 / 2.0),
            precision(),
        )
        .unwrap();
        let trimmed = area.trim(&arc).unwrap();
        assert!(trimmed.size() < arc.size());
        assert!(area.contains(&trimmed.midpoint().unwrap()));

        let outside = GreatArc::from_points(&Point2S::minus_i(), &Point2S::minus_j(), precision()).unwrap();
        assert!(area.trim(&outside).is_none());
    }

    #[test]
    fn split_through_octant() {
        let area = octant();
        let splitter = GreatCircle::from_points(
            &Point2S::plus_k(),
            &Point2S::of(PI / 4.0, FRAC_PI_2),
            precision(),
        )
        .unwrap();
        let split = area.split(&splitter);
        assert_eq!(split.location(), SplitLocation::Both);
        let minus = split.minus().unwrap();
        let plus = split.plus().unwrap();
        assert_abs_diff_eq!(minus.size(), PI / 4.0, epsilon = EPS);
        assert_abs_diff_eq!(plus.size(), PI / 4.0, epsilon = EPS);
        assert_abs_diff_eq!(
            minus.weighted_centroid_vector() + plus.weighted_centroid_vector(),
            area.weighted_centroid_vector(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn split_missing_region() {
        let area = octant();
        // coincident with the equator boundary, opposite orientation
        let split = area.split(&circle(-Vector3::z()));
        assert_eq!(split.location(), SplitLocation::Plus);
        let split = area.split(&circle(Vector3::z()));
        assert_eq!(split.location(), SplitLocation::Minus);
        // passes only through the vertex +K
        let split = area.split(&circle(Vector3::new(-1.0, -1.0, 0.0)));
        assert_eq!(split.location(), SplitLocation::Plus);
    }

    #[test]
    fn split_full_gives_hemispheres() {
        let split = ConvexArea2S::full().split(&circle(Vector3::z()));
        assert_abs_diff_eq!(split.minus().unwrap().size(), 2.0 * PI);
        assert!(split.minus().unwrap().contains(&Point2S::plus_k()));
        assert!(split.plus().unwrap().contains(&Point2S::minus_k()));
    }

    #[test]
    fn project_onto_boundary() {
        let area = octant();
        let projected = area.project(&Point2S::of(PI / 4.0, 1.4)).unwrap();
        assert!(projected.approx_eq(&Point2S::of(PI / 4.0, FRAC_PI_2), precision()));
    }

    #[test]
    fn transform_moves_region() {
        let area = octant();
        let rotated = area.transform(&Transform2S::create_rotation(&Point2S::plus_k(), PI));
        assert_abs_diff_eq!(rotated.size(), FRAC_PI_2, epsilon = EPS);
        assert!(rotated.contains(&Point2S::from_vector(&Vector3::new(-1.0, -1.0, 1.0))));

        let reflected = area.transform(&Transform2S::create_reflection(&Point2S::plus_k()));
        assert_abs_diff_eq!(reflected.size(), FRAC_PI_2, epsilon = EPS);
        assert!(reflected.contains(&Point2S::from_vector(&Vector3::new(1.0, 1.0, -1.0))));
    }

    #[test]
    fn small_triangle_centroid() {
        let d = 1e-3;
        let area = ConvexArea2S::from_vertex_loop(
            &[
                Point2S::of(0.0, FRAC_PI_2),
                Point2S::of(d, FRAC_PI_2),
                Point2S::of(0.0, FRAC_PI_2 - d),
            ],
            precision(),
        )
        .unwrap();
        assert_abs_diff_eq!(area.size(), d * d / 2.0, epsilon = 1e-9);
        let centroid = area.centroid().unwrap();
        assert!(area.contains(&centroid));
        assert_abs_diff_eq!(
            area.weighted_centroid_vector().norm(),
            2.0 * area.size(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn to_tree_matches_area() {
        let tree = octant().to_tree();
        assert_abs_diff_eq!(tree.size(), FRAC_PI_2, epsilon = EPS);
        assert!(ConvexArea2S::full().to_tree().is_full());
    }
}
