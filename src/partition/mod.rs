//! Hyperplane partitioning primitives and the generic region BSP tree.
//!
//! The traits here are the two capability sets the tree needs from a
//! geometry: a [`Hyperplane`] that classifies points, and a
//! [`ConvexSubset`] of a hyperplane that can be split and reversed.
//! [`RegionTree`] is written once against them.

mod merge;
mod tree;

pub use merge::MergeOp;
pub use tree::{NodeId, RegionNode, RegionTree};

/// Location of a point relative to an oriented hyperplane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HyperplaneLocation {
    /// Strictly on the minus side.
    Minus,
    /// On the hyperplane, within tolerance.
    On,
    /// Strictly on the plus side.
    Plus,
}

/// Location of a point relative to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionLocation {
    Inside,
    Boundary,
    Outside,
}

/// Side(s) of a splitter that an object was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitLocation {
    /// Entirely on the minus side.
    Minus,
    /// Entirely on the plus side.
    Plus,
    /// Cut into a minus part and a plus part.
    Both,
    /// Lies on the splitter itself (parallel or antiparallel).
    Neither,
}

/// Rule for tagging the two leaves created when a leaf is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegionCutRule {
    /// Minus child inside, plus child outside.
    #[default]
    MinusInside,
    /// Minus child outside, plus child inside.
    PlusInside,
    /// Both children take the location of the cut leaf.
    Inherit,
}

/// Result of splitting an object by a hyperplane.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    minus: Option<T>,
    plus: Option<T>,
}

impl<T> Split<T> {
    /// Creates a split result from its two (optional) halves.
    #[must_use]
    pub fn new(minus: Option<T>, plus: Option<T>) -> Self {
        Self { minus, plus }
    }

    /// A split where nothing lies on either side.
    #[must_use]
    pub fn neither() -> Self {
        Self::new(None, None)
    }

    /// The part on the minus side, if any.
    #[must_use]
    pub fn minus(&self) -> Option<&T> {
        self.minus.as_ref()
    }

    /// The part on the plus side, if any.
    #[must_use]
    pub fn plus(&self) -> Option<&T> {
        self.plus.as_ref()
    }

    /// Derives the split location from which halves are present.
    #[must_use]
    pub fn location(&self) -> SplitLocation {
        match (&self.minus, &self.plus) {
            (Some(_), Some(_)) => SplitLocation::Both,
            (Some(_), None) => SplitLocation::Minus,
            (None, Some(_)) => SplitLocation::Plus,
            (None, None) => SplitLocation::Neither,
        }
    }

    /// Consumes the split, returning `(minus, plus)`.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, Option<T>) {
        (self.minus, self.plus)
    }

    /// Maps both halves through `f`.
    #[must_use]
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Split<U> {
        Split {
            minus: self.minus.map(&mut f),
            plus: self.plus.map(&mut f),
        }
    }
}

/// An oriented hyperplane: divides space into a minus and a plus side.
pub trait Hyperplane: Clone {
    /// Point type of the space being partitioned.
    type Point;
    /// Convex subset type lying in this hyperplane.
    type Subset: ConvexSubset<Hyperplane = Self>;

    /// Signed offset of `point` from the hyperplane; negative on the minus side.
    fn offset(&self, point: &Self::Point) -> f64;

    /// Classifies `point` relative to the hyperplane using its precision.
    fn classify(&self, point: &Self::Point) -> HyperplaneLocation;

    /// Same point set, opposite orientation.
    #[must_use]
    fn reverse(&self) -> Self;

    /// Convex subset covering the whole hyperplane.
    fn span(&self) -> Self::Subset;

    /// Returns `true` if both hyperplanes point their plus sides the same way.
    fn similar_orientation(&self, other: &Self) -> bool;
}

/// A convex subset of a hyperplane, usable as a BSP cut.
pub trait ConvexSubset: Clone {
    /// Hyperplane type this subset lies in.
    type Hyperplane: Hyperplane<Subset = Self>;

    /// The hyperplane containing this subset.
    fn hyperplane(&self) -> &Self::Hyperplane;

    /// Returns `true` if this subset covers its entire hyperplane.
    fn is_full(&self) -> bool;

    /// Measure of the subset within its hyperplane.
    fn size(&self) -> f64;

    /// Classifies a point relative to this subset.
    fn classify(&self, point: &PointOf<Self>) -> RegionLocation;

    /// Splits this subset by `splitter`.
    fn split(&self, splitter: &Self::Hyperplane) -> Split<Self>;

    /// Same point set on the reversed hyperplane.
    #[must_use]
    fn reverse(&self) -> Self;
}

/// Point type associated with a convex subset.
pub type PointOf<S> = <<S as ConvexSubset>::Hyperplane as Hyperplane>::Point;
