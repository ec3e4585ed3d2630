use std::fmt;

use crate::error::{PathError, Result};
use crate::geometry::{GreatArc, Point2S};
use crate::math::Precision;
use crate::region::RegionBSPTree2S;
use crate::transform::Transform2S;

/// An ordered chain of connected arcs.
///
/// The end point of each arc equals the start point of the next within
/// the arcs' precision. A path is empty, a single full arc, or a chain of
/// bounded arcs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GreatArcPath {
    arcs: Vec<GreatArc>,
}

impl GreatArcPath {
    /// Creates a path with no arcs.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts a builder. Without a precision, the first appended arc
    /// supplies one.
    #[must_use]
    pub fn builder(precision: Option<Precision>) -> GreatArcPathBuilder {
        GreatArcPathBuilder::new(precision)
    }

    /// Path made of a single arc.
    #[must_use]
    pub fn from_arc(arc: GreatArc) -> Self {
        Self { arcs: vec![arc] }
    }

    /// Builds a path from arcs that must already be connected.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NotConnected`] if consecutive arcs do not share
    /// an end point, or [`PathError::AfterFullArc`] if a full arc is
    /// followed by another arc.
    pub fn from_arcs(arcs: impl IntoIterator<Item = GreatArc>) -> Result<Self> {
        let mut builder = GreatArcPathBuilder::new(None);
        for arc in arcs {
            builder = builder.append(arc)?;
        }
        Ok(builder.build())
    }

    /// Joins consecutive vertices with arcs, skipping repeated vertices.
    /// With `close`, an arc from the last vertex back to the first is added.
    ///
    /// # Errors
    ///
    /// Returns an error if two consecutive vertices are antipodal, or if
    /// `close` is requested and the vertices do not produce any arc.
    pub fn from_vertices(vertices: &[Point2S], close: bool, precision: Precision) -> Result<Self> {
        let builder = GreatArcPathBuilder::new(Some(precision)).append_vertices(vertices)?;
        if close {
            builder.build_closed()
        } else {
            Ok(builder.build())
        }
    }

    /// [`from_vertices`](Self::from_vertices) with `close` set.
    ///
    /// # Errors
    ///
    /// See [`from_vertices`](Self::from_vertices).
    pub fn from_vertex_loop(vertices: &[Point2S], precision: Precision) -> Result<Self> {
        Self::from_vertices(vertices, true, precision)
    }

    /// Wraps arcs known to be connected.
    pub(crate) fn from_connected(arcs: Vec<GreatArc>) -> Self {
        Self { arcs }
    }

    /// Returns the arcs in order.
    #[must_use]
    pub fn arcs(&self) -> &[GreatArc] {
        &self.arcs
    }

    /// Returns the first arc, if any.
    #[must_use]
    pub fn start_arc(&self) -> Option<&GreatArc> {
        self.arcs.first()
    }

    /// Returns the last arc, if any.
    #[must_use]
    pub fn end_arc(&self) -> Option<&GreatArc> {
        self.arcs.last()
    }

    /// `None` for an empty or full path.
    #[must_use]
    pub fn start_vertex(&self) -> Option<Point2S> {
        self.start_arc().and_then(GreatArc::start_point)
    }

    /// `None` for an empty or full path.
    #[must_use]
    pub fn end_vertex(&self) -> Option<Point2S> {
        self.end_arc().and_then(GreatArc::end_point)
    }

    /// The start point of every arc followed by the end point of the last
    /// one; a closed path therefore repeats its first vertex at the end.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point2S> {
        self.arcs
            .iter()
            .filter_map(GreatArc::start_point)
            .chain(self.end_vertex())
            .collect()
    }

    /// Returns `true` if the path has no arcs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Returns `true` for a path made of one full arc.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.arcs.len() == 1 && self.arcs[0].is_full()
    }

    /// Returns `true` if the last arc ends where the first one starts.
    /// Empty and full paths are not closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.end_arc(), self.start_vertex(), self.end_vertex()) {
            (Some(end_arc), Some(start), Some(end)) => start.approx_eq(&end, end_arc.precision()),
            _ => false,
        }
    }

    /// Total angular length of the arcs.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.arcs.iter().map(GreatArc::size).sum()
    }

    /// The same path traversed in the opposite direction.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            arcs: self.arcs.iter().rev().map(GreatArc::reverse).collect(),
        }
    }

    /// Applies a rigid motion. Reflections reverse each arc, so the arc
    /// order is reversed too to keep the chain connected.
    #[must_use]
    pub fn transform(&self, transform: &Transform2S) -> Self {
        let arcs = self.arcs.iter().map(|arc| arc.transform(transform));
        let arcs = if transform.preserves_orientation() {
            arcs.collect()
        } else {
            arcs.rev().collect()
        };
        Self { arcs }
    }

    /// Region bounded by this path, with the inside on the minus side of
    /// every arc.
    #[must_use]
    pub fn to_tree(&self) -> RegionBSPTree2S {
        let mut tree = RegionBSPTree2S::empty();
        tree.insert_path(self);
        tree
    }
}

impl fmt::Display for GreatArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_full() {
            return write!(f, "GreatArcPath[full= true, circle= {}]", self.arcs[0].circle());
        }
        write!(f, "GreatArcPath[vertices= [")?;
        for (i, vertex) in self.vertices().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{vertex}")?;
        }
        write!(f, "]]")
    }
}

/// Incremental builder for [`GreatArcPath`].
///
/// Arcs and vertices can be added at either end. Prepended arcs are kept
/// in reverse order and flipped back on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct GreatArcPathBuilder {
    appended: Vec<GreatArc>,
    prepended: Vec<GreatArc>,
    precision: Option<Precision>,
    start_vertex: Option<Point2S>,
    end_vertex: Option<Point2S>,
}

impl GreatArcPathBuilder {
    /// Creates a builder; `precision` is needed before vertices can be added.
    #[must_use]
    pub fn new(precision: Option<Precision>) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    fn start_arc(&self) -> Option<&GreatArc> {
        self.prepended.last().or_else(|| self.appended.first())
    }

    fn end_arc(&self) -> Option<&GreatArc> {
        self.appended.last().or_else(|| self.prepended.first())
    }

    fn has_arcs(&self) -> bool {
        !self.appended.is_empty() || !self.prepended.is_empty()
    }

    fn precision(&self) -> Result<Precision> {
        self.precision.ok_or_else(|| PathError::MissingPrecision.into())
    }

    /// Adds an arc from the current end to `vertex`. The first vertex only
    /// marks the start; a vertex equal to the current end is ignored.
    ///
    /// # Errors
    ///
    /// Fails after a full arc, without a precision, or if the new arc
    /// would join antipodal points.
    pub fn append_vertex(mut self, vertex: Point2S) -> Result<Self> {
        let precision = self.precision()?;
        match self.end_vertex {
            None => {
                if let Some(end) = self.end_arc() {
                    return Err(PathError::AfterFullArc(format!(
                        "cannot add vertex {vertex} after full arc {end}"
                    ))
                    .into());
                }
                self.start_vertex = Some(vertex);
                self.end_vertex = Some(vertex);
            }
            Some(end) if !end.approx_eq(&vertex, precision) => {
                let arc = GreatArc::from_points(&end, &vertex, precision)?;
                self.append_unchecked(arc);
            }
            Some(_) => {}
        }
        Ok(self)
    }

    /// Adds an arc from `vertex` to the current start.
    ///
    /// # Errors
    ///
    /// See [`append_vertex`](Self::append_vertex).
    pub fn prepend_vertex(mut self, vertex: Point2S) -> Result<Self> {
        let precision = self.precision()?;
        match self.start_vertex {
            None => {
                if let Some(start) = self.start_arc() {
                    return Err(PathError::AfterFullArc(format!(
                        "cannot add vertex {vertex} before full arc {start}"
                    ))
                    .into());
                }
                self.start_vertex = Some(vertex);
                self.end_vertex = Some(vertex);
            }
            Some(start) if !start.approx_eq(&vertex, precision) => {
                let arc = GreatArc::from_points(&vertex, &start, precision)?;
                self.prepend_unchecked(arc);
            }
            Some(_) => {}
        }
        Ok(self)
    }

    /// Appends each vertex in order.
    ///
    /// # Errors
    ///
    /// See [`append_vertex`](Self::append_vertex).
    pub fn append_vertices(self, vertices: &[Point2S]) -> Result<Self> {
        vertices
            .iter()
            .try_fold(self, |builder, vertex| builder.append_vertex(*vertex))
    }

    /// Prepends the vertices so that they appear in the given order at the
    /// start of the path.
    ///
    /// # Errors
    ///
    /// See [`append_vertex`](Self::append_vertex).
    pub fn prepend_vertices(self, vertices: &[Point2S]) -> Result<Self> {
        vertices
            .iter()
            .rev()
            .try_fold(self, |builder, vertex| builder.prepend_vertex(*vertex))
    }

    /// Appends an arc that must start at the current end.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NotConnected`] or [`PathError::AfterFullArc`].
    pub fn append(mut self, arc: GreatArc) -> Result<Self> {
        if self.precision.is_none() {
            self.precision = Some(arc.precision());
        }
        let precision = self.precision()?;
        if let Some(previous) = self.end_arc() {
            check_connected(previous, &arc, precision)?;
        } else if let Some(start) = self.start_vertex {
            if !arc.start_point().is_some_and(|p| p.approx_eq(&start, precision)) {
                return Err(not_connected(&start, &arc));
            }
        }
        self.append_unchecked(arc);
        Ok(self)
    }

    /// Prepends an arc that must end at the current start.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NotConnected`] or [`PathError::AfterFullArc`].
    pub fn prepend(mut self, arc: GreatArc) -> Result<Self> {
        if self.precision.is_none() {
            self.precision = Some(arc.precision());
        }
        let precision = self.precision()?;
        if let Some(next) = self.start_arc() {
            check_connected(&arc, next, precision)?;
        } else if let Some(end) = self.end_vertex {
            if !arc.end_point().is_some_and(|p| p.approx_eq(&end, precision)) {
                return Err(not_connected(&arc, &end));
            }
        }
        self.prepend_unchecked(arc);
        Ok(self)
    }

    fn append_unchecked(&mut self, arc: GreatArc) {
        if !self.has_arcs() {
            self.start_vertex = arc.start_point();
        }
        self.end_vertex = arc.end_point();
        self.appended.push(arc);
    }

    fn prepend_unchecked(&mut self, arc: GreatArc) {
        if !self.has_arcs() {
            self.end_vertex = arc.end_point();
        }
        self.start_vertex = arc.start_point();
        self.prepended.push(arc);
    }

    /// Adds an arc from the current end back to the start if they differ.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::CannotClose`] if the path has no arcs or is a
    /// full arc.
    pub fn close(self) -> Result<Self> {
        let Some(end_arc) = self.end_arc() else {
            return Err(PathError::CannotClose("path does not contain any arcs".into()).into());
        };
        if end_arc.is_full() {
            return Err(PathError::CannotClose("path is full".into()).into());
        }
        match self.start_vertex {
            Some(start) => self.append_vertex(start),
            None => Ok(self),
        }
    }

    /// Returns the assembled path.
    #[must_use]
    pub fn build(self) -> GreatArcPath {
        let mut arcs = self.prepended;
        arcs.reverse();
        arcs.extend(self.appended);
        GreatArcPath { arcs }
    }

    /// Closes the path, then builds it.
    ///
    /// # Errors
    ///
    /// See [`close`](Self::close).
    pub fn build_closed(self) -> Result<GreatArcPath> {
        Ok(self.close()?.build())
    }
}

fn check_connected(previous: &GreatArc, next: &GreatArc, precision: Precision) -> Result<()> {
    if previous.is_full() {
        return Err(PathError::AfterFullArc(format!(
            "cannot connect {next} to full arc {previous}"
        ))
        .into());
    }
    match (previous.end_point(), next.start_point()) {
        (Some(end), Some(start)) if end.approx_eq(&start, precision) => Ok(()),
        _ => Err(not_connected(previous, next)),
    }
}

fn not_connected(previous: &impl fmt::Display, next: &impl fmt::Display) -> crate::error::SphereError {
    PathError::NotConnected {
        previous: previous.to_string(),
        next: next.to_string(),
    }
    .into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SphereError;
    use crate::geometry::GreatCircle;
    use crate::math::Vector3;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn precision() -> Precision {
        Precision::new(1e-10)
    }

    fn arc(start: Point2S, end: Point2S) -> GreatArc {
        GreatArc::from_points(&start, &end, precision()).unwrap()
    }

    fn assert_vertices(path: &GreatArcPath, expected: &[Point2S]) {
        let vertices = path.vertices();
        assert_eq!(vertices.len(), expected.len(), "{path}");
        for (actual, expected) in vertices.iter().zip(expected) {
            assert!(actual.approx_eq(expected, precision()), "{actual} != {expected}");
        }
    }

    #[test]
    fn empty_path() {
        let path = GreatArcPath::empty();
        assert!(path.is_empty());
        assert!(!path.is_closed());
        assert!(path.start_vertex().is_none());
        assert!(path.vertices().is_empty());
    }

    #[test]
    fn closed_loop_from_vertices() {
        let path = GreatArcPath::from_vertex_loop(
            &[Point2S::minus_k(), Point2S::plus_i(), Point2S::minus_j()],
            precision(),
        )
        .unwrap();
        assert_eq!(path.arcs().len(), 3);
        assert!(path.is_closed());
        assert_abs_diff_eq!(path.size(), 1.5 * PI, epsilon = 1e-12);
        assert_vertices(
            &path,
            &[Point2S::minus_k(), Point2S::plus_i(), Point2S::minus_j(), Point2S::minus_k()],
        );
    }

    #[test]
    fn repeated_vertices_are_skipped() {
        let path = GreatArcPath::from_vertices(
            &[Point2S::plus_i(), Point2S::plus_i(), Point2S::plus_j(), Point2S::plus_j()],
            false,
            precision(),
        )
        .unwrap();
        assert_eq!(path.arcs().len(), 1);
        assert!(!path.is_closed());
    }

    #[test]
    fn append_and_prepend_vertices() {
        let path = GreatArcPath::builder(Some(precision()))
            .append_vertex(Point2S::plus_j())
            .unwrap()
            .append_vertex(Point2S::plus_k())
            .unwrap()
            .prepend_vertex(Point2S::plus_i())
            .unwrap()
            .prepend_vertices(&[Point2S::minus_k(), Point2S::minus_j()])
            .unwrap()
            .build();
        assert_vertices(
            &path,
            &[
                Point2S::minus_k(),
                Point2S::minus_j(),
                Point2S::plus_i(),
                Point2S::plus_j(),
                Point2S::plus_k(),
            ],
        );
    }

    #[test]
    fn append_arcs_must_connect() {
        let result = GreatArcPath::builder(None)
            .append(arc(Point2S::plus_i(), Point2S::plus_j()))
            .unwrap()
            .append(arc(Point2S::plus_k(), Point2S::minus_i()));
        assert!(matches!(
            result,
            Err(SphereError::Path(PathError::NotConnected { .. }))
        ));

        let result = GreatArcPath::builder(Some(precision()))
            .append_vertex(Point2S::plus_k())
            .unwrap()
            .append(arc(Point2S::plus_i(), Point2S::plus_j()));
        assert!(result.is_err());

        let result = GreatArcPath::builder(None)
            .prepend(arc(Point2S::plus_j(), Point2S::plus_k()))
            .unwrap()
            .prepend(arc(Point2S::plus_i(), Point2S::plus_j()))
            .unwrap()
            .build();
        assert_vertices(&result, &[Point2S::plus_i(), Point2S::plus_j(), Point2S::plus_k()]);
    }

    #[test]
    fn arcs_after_full_arc_fail() {
        let full = GreatCircle::from_pole(&Vector3::z(), precision()).unwrap().span();
        let builder = GreatArcPath::builder(None).append(full).unwrap();
        assert!(matches!(
            builder.clone().append_vertex(Point2S::plus_k()),
            Err(SphereError::Path(PathError::AfterFullArc(_)))
        ));
        assert!(matches!(
            builder.clone().append(arc(Point2S::plus_i(), Point2S::plus_j())),
            Err(SphereError::Path(PathError::AfterFullArc(_)))
        ));
        assert!(matches!(
            builder.clone().close(),
            Err(SphereError::Path(PathError::CannotClose(_)))
        ));
        let path = builder.build();
        assert!(path.is_full());
        assert!(!path.is_closed());
    }

    #[test]
    fn close_needs_arcs() {
        let result = GreatArcPath::builder(Some(precision()))
            .append_vertex(Point2S::plus_i())
            .unwrap()
            .close();
        assert!(matches!(
            result,
            Err(SphereError::Path(PathError::CannotClose(_)))
        ));
    }

    #[test]
    fn vertices_without_precision_fail() {
        assert!(matches!(
            GreatArcPath::builder(None).append_vertex(Point2S::plus_i()),
            Err(SphereError::Path(PathError::MissingPrecision))
        ));
    }

    #[test]
    fn reverse_and_reflect_keep_connectivity() {
        let path = GreatArcPath::from_vertices(
            &[Point2S::plus_i(), Point2S::plus_j(), Point2S::plus_k()],
            false,
            precision(),
        )
        .unwrap();
        assert_vertices(
            &path.reverse(),
            &[Point2S::plus_k(), Point2S::plus_j(), Point2S::plus_i()],
        );

        let reflected = path.transform(&Transform2S::create_reflection(&Point2S::plus_j()));
        assert_vertices(
            &reflected,
            &[Point2S::plus_k(), Point2S::minus_j(), Point2S::plus_i()],
        );
        let rotated = path.transform(&Transform2S::create_rotation(&Point2S::plus_k(), FRAC_PI_2));
        assert_vertices(
            &rotated,
            &[Point2S::plus_j(), Point2S::minus_i(), Point2S::plus_k()],
        );
    }

    #[test]
    fn from_arcs_validates() {
        let path = GreatArcPath::from_arcs([
            arc(Point2S::plus_i(), Point2S::plus_j()),
            arc(Point2S::plus_j(), Point2S::plus_k()),
        ])
        .unwrap();
        assert_eq!(path.arcs().len(), 2);
        assert!(path.to_string().starts_with("GreatArcPath[vertices= ["));
        assert!(GreatArcPath::from_arcs([
            arc(Point2S::plus_i(), Point2S::plus_j()),
            arc(Point2S::plus_i(), Point2S::plus_k()),
        ])
        .is_err());
    }
}
