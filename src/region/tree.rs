use std::cell::OnceCell;

use crate::geometry::{connect_minimized, GreatArc, GreatArcPath, GreatCircle, Point2S};
use crate::math::{Precision, Vector3};
use crate::partition::{MergeOp, NodeId, RegionCutRule, RegionLocation, RegionNode, RegionTree, Split};
use crate::region::convex::{ConvexArea2S, FULL_SIZE};
use crate::transform::Transform2S;

/// Cached area, weighted centroid and centroid of a tree.
#[derive(Debug, Clone, Copy)]
struct SizeProperties {
    size: f64,
    weighted_centroid: Vector3,
    centroid: Option<Point2S>,
}

/// An arbitrary region of the sphere as a binary space partitioning tree
/// of great-arc cuts.
///
/// Derived properties (boundaries, boundary paths, size, centroid) are
/// computed on first use and cached until the next mutation.
#[derive(Debug, Clone)]
pub struct RegionBSPTree2S {
    tree: RegionTree<GreatArc>,
    boundaries: OnceCell<Vec<GreatArc>>,
    boundary_paths: OnceCell<Vec<GreatArcPath>>,
    properties: OnceCell<SizeProperties>,
}

impl RegionBSPTree2S {
    fn from_tree(tree: RegionTree<GreatArc>) -> Self {
        Self {
            tree,
            boundaries: OnceCell::new(),
            boundary_paths: OnceCell::new(),
            properties: OnceCell::new(),
        }
    }

    /// Tree containing nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_tree(RegionTree::empty())
    }

    /// Tree containing the whole sphere.
    #[must_use]
    pub fn full() -> Self {
        Self::from_tree(RegionTree::full())
    }

    /// Empty tree with each arc inserted in turn.
    #[must_use]
    pub fn from_arcs(arcs: impl IntoIterator<Item = GreatArc>) -> Self {
        let mut tree = Self::empty();
        for arc in arcs {
            tree.insert_arc(&arc);
        }
        tree
    }

    fn invalidate(&mut self) {
        self.boundaries.take();
        self.boundary_paths.take();
        self.properties.take();
    }

    fn precision(&self) -> Precision {
        self.tree
            .node(self.tree.root())
            .and_then(RegionNode::cut)
            .map_or_else(Precision::default, GreatArc::precision)
    }

    /// Returns the id of the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Returns the node with the given id, if it exists.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&RegionNode<GreatArc>> {
        self.tree.node(id)
    }

    /// Node ids in preorder (node, minus subtree, plus subtree).
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        self.tree.preorder()
    }

    /// Returns the number of nodes in the tree.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tree.count()
    }

    /// Returns the height of the tree; a single leaf has height 0.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns `true` if the tree is a single inside leaf.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.tree.is_full()
    }

    /// Returns `true` if the tree is a single outside leaf.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Inserts an arc with the region on its minus side.
    pub fn insert_arc(&mut self, arc: &GreatArc) {
        self.insert_arc_with_rule(arc, RegionCutRule::MinusInside);
    }

    /// Inserts an arc, tagging the leaves it creates according to `rule`.
    pub fn insert_arc_with_rule(&mut self, arc: &GreatArc, rule: RegionCutRule) {
        self.tree.insert(arc, rule);
        self.invalidate();
    }

    /// Inserts every arc of a path.
    pub fn insert_path(&mut self, path: &GreatArcPath) {
        for arc in path.arcs() {
            self.tree.insert(arc, RegionCutRule::MinusInside);
        }
        self.invalidate();
    }

    /// Inserts the boundaries of a convex area.
    ///
    /// A full area has no boundaries to insert; the tree becomes full and
    /// any existing cuts are discarded, matching a union with the whole
    /// sphere.
    pub fn insert_area(&mut self, area: &ConvexArea2S) {
        if area.is_full() {
            self.tree = RegionTree::full();
        } else {
            for arc in area.boundaries() {
                self.tree.insert(arc, RegionCutRule::MinusInside);
            }
        }
        self.invalidate();
    }

    /// Classifies a point as inside, outside or on the boundary.
    #[must_use]
    pub fn classify(&self, point: &Point2S) -> RegionLocation {
        self.tree.classify(point)
    }

    /// Returns `true` unless the point is outside.
    #[must_use]
    pub fn contains(&self, point: &Point2S) -> bool {
        self.classify(point) != RegionLocation::Outside
    }

    /// Boundary arcs with the region on their minus side.
    #[must_use]
    pub fn boundaries(&self) -> &[GreatArc] {
        self.boundaries.get_or_init(|| self.tree.boundaries())
    }

    /// Boundaries connected into paths.
    #[must_use]
    pub fn boundary_paths(&self) -> &[GreatArcPath] {
        self.boundary_paths
            .get_or_init(|| connect_minimized(self.boundaries().iter().copied()))
    }

    /// Returns the total length of the boundary arcs.
    #[must_use]
    pub fn boundary_size(&self) -> f64 {
        self.boundaries().iter().map(GreatArc::size).sum()
    }

    /// Convex areas covering the inside cells, one per inside leaf.
    #[must_use]
    pub fn to_convex(&self) -> Vec<ConvexArea2S> {
        let mut result = Vec::new();
        self.to_convex_from(self.tree.root(), ConvexArea2S::full(), &mut result);
        result
    }

    fn to_convex_from(&self, id: NodeId, area: ConvexArea2S, result: &mut Vec<ConvexArea2S>) {
        let Some(node) = self.tree.node(id) else {
            return;
        };
        match (node.cut(), node.minus(), node.plus()) {
            (Some(cut), Some(minus), Some(plus)) => {
                let (area_minus, area_plus) = area.split(cut.circle()).into_parts();
                if let Some(area_minus) = area_minus {
                    self.to_convex_from(minus, area_minus, result);
                }
                if let Some(area_plus) = area_plus {
                    self.to_convex_from(plus, area_plus, result);
                }
            }
            _ => {
                if node.is_inside() {
                    result.push(area);
                }
            }
        }
    }

    fn properties(&self) -> SizeProperties {
        *self.properties.get_or_init(|| self.compute_properties())
    }

    fn compute_properties(&self) -> SizeProperties {
        if self.is_full() {
            return SizeProperties {
                size: FULL_SIZE,
                weighted_centroid: Vector3::zeros(),
                centroid: None,
            };
        }
        if self.is_empty() {
            return SizeProperties {
                size: 0.0,
                weighted_centroid: Vector3::zeros(),
                centroid: None,
            };
        }
        let areas = self.to_convex();
        let size: f64 = areas.iter().map(ConvexArea2S::size).sum();
        let weighted_centroid: Vector3 = areas
            .iter()
            .map(ConvexArea2S::weighted_centroid_vector)
            .sum();
        let centroid = if self.precision().eq_zero(weighted_centroid.norm()) {
            None
        } else {
            Some(Point2S::from_vector(&weighted_centroid))
        };
        tracing::trace!(areas = areas.len(), size, "computed region size");
        SizeProperties {
            size,
            weighted_centroid,
            centroid,
        }
    }

    /// Total area of the inside cells.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.properties().size
    }

    /// Sum of the weighted centroid vectors of the inside cells.
    #[must_use]
    pub fn weighted_centroid_vector(&self) -> Vector3 {
        self.properties().weighted_centroid
    }

    /// `None` for full and empty trees and for regions whose weighted
    /// centroid vectors cancel out.
    #[must_use]
    pub fn centroid(&self) -> Option<Point2S> {
        self.properties().centroid
    }

    /// Closest boundary point to `point`. `None` without boundaries.
    #[must_use]
    pub fn project(&self, point: &Point2S) -> Option<Point2S> {
        self.boundaries()
            .iter()
            .map(|arc| arc.closest(point))
            .min_by(|a, b| point.distance(a).total_cmp(&point.distance(b)))
    }

    /// Convex cell of a node: the full sphere cut by each ancestor.
    /// `None` if the cell vanishes numerically.
    #[must_use]
    pub fn node_region(&self, id: NodeId) -> Option<ConvexArea2S> {
        let mut area = ConvexArea2S::full();
        for (circle, minus) in self.tree.ancestor_cuts(id) {
            let (area_minus, area_plus) = area.split(circle).into_parts();
            let next = if minus { area_minus } else { area_plus };
            area = next?;
        }
        Some(area)
    }

    /// Swaps inside and outside in place.
    pub fn complement(&mut self) {
        self.tree.complement();
        self.invalidate();
    }

    /// Returns the complement of `other`.
    #[must_use]
    pub fn complement_of(other: &Self) -> Self {
        let mut tree = other.clone();
        tree.complement();
        tree
    }

    fn merge_in(&mut self, other: &Self, op: MergeOp) {
        self.tree = RegionTree::merge(&self.tree, &other.tree, op);
        self.invalidate();
    }

    /// Adds `other` to this region.
    pub fn union(&mut self, other: &Self) {
        self.merge_in(other, MergeOp::Union);
    }

    /// Keeps only the part of this region that is also in `other`.
    pub fn intersection(&mut self, other: &Self) {
        self.merge_in(other, MergeOp::Intersection);
    }

    /// Removes `other` from this region.
    pub fn difference(&mut self, other: &Self) {
        self.merge_in(other, MergeOp::Difference);
    }

    /// Keeps the points in exactly one of the two regions.
    pub fn xor(&mut self, other: &Self) {
        self.merge_in(other, MergeOp::Xor);
    }

    /// Returns the union of two regions.
    #[must_use]
    pub fn union_of(first: &Self, second: &Self) -> Self {
        Self::from_tree(RegionTree::merge(&first.tree, &second.tree, MergeOp::Union))
    }

    /// Returns the intersection of two regions.
    #[must_use]
    pub fn intersection_of(first: &Self, second: &Self) -> Self {
        Self::from_tree(RegionTree::merge(&first.tree, &second.tree, MergeOp::Intersection))
    }

    /// Returns `first` with `second` removed.
    #[must_use]
    pub fn difference_of(first: &Self, second: &Self) -> Self {
        Self::from_tree(RegionTree::merge(&first.tree, &second.tree, MergeOp::Difference))
    }

    /// Returns the symmetric difference of two regions.
    #[must_use]
    pub fn xor_of(first: &Self, second: &Self) -> Self {
        Self::from_tree(RegionTree::merge(&first.tree, &second.tree, MergeOp::Xor))
    }

    /// Parts of the region on the minus and plus sides of `splitter`.
    #[must_use]
    pub fn split(&self, splitter: &GreatCircle) -> Split<Self> {
        self.tree.split(splitter).map(Self::from_tree)
    }

    /// Applies a rigid motion to every cut.
    pub fn transform(&mut self, transform: &Transform2S) {
        self.tree.map_cuts(|arc| arc.transform(transform));
        self.invalidate();
    }

    /// Merges sibling leaves with the same location.
    pub fn condense(&mut self) {
        self.tree.condense();
        self.invalidate();
    }
}

impl Default for RegionBSPTree2S {
    fn default() -> Self {
        Self::empty()
    }
}
