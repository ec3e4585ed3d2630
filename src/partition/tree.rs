use slotmap::SlotMap;

use super::{ConvexSubset, Hyperplane, HyperplaneLocation, PointOf, RegionCutRule, RegionLocation};

slotmap::new_key_type! {
    /// Identifier of a node inside a [`RegionTree`].
    pub struct NodeId;
}

/// A node of a region BSP tree.
///
/// A node is either a leaf tagged inside/outside, or is cut by a convex
/// subset into a minus child and a plus child. The cut always spans the
/// node's whole cell: it is the cut hyperplane trimmed by every ancestor.
#[derive(Debug, Clone)]
pub struct RegionNode<S> {
    pub(super) parent: Option<NodeId>,
    pub(super) cut: Option<S>,
    pub(super) minus: Option<NodeId>,
    pub(super) plus: Option<NodeId>,
    pub(super) location: RegionLocation,
}

impl<S> RegionNode<S> {
    pub(super) fn leaf(parent: Option<NodeId>, location: RegionLocation) -> Self {
        Self {
            parent,
            cut: None,
            minus: None,
            plus: None,
            location,
        }
    }

    pub(super) fn internal(cut: S, minus: NodeId, plus: NodeId, location: RegionLocation) -> Self {
        Self {
            parent: None,
            cut: Some(cut),
            minus: Some(minus),
            plus: Some(plus),
            location,
        }
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Cut of an internal node.
    #[must_use]
    pub fn cut(&self) -> Option<&S> {
        self.cut.as_ref()
    }

    /// Minus child of an internal node.
    #[must_use]
    pub fn minus(&self) -> Option<NodeId> {
        self.minus
    }

    /// Plus child of an internal node.
    #[must_use]
    pub fn plus(&self) -> Option<NodeId> {
        self.plus
    }

    /// Returns `true` if the node has no cut.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.cut.is_none()
    }

    /// Stored location. Only meaningful for leaves.
    #[must_use]
    pub fn location(&self) -> RegionLocation {
        self.location
    }

    /// Returns `true` for a leaf tagged inside.
    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.is_leaf() && self.location == RegionLocation::Inside
    }

    /// Returns `true` for a leaf tagged outside.
    #[must_use]
    pub fn is_outside(&self) -> bool {
        self.is_leaf() && self.location == RegionLocation::Outside
    }
}

/// Region BSP tree over an arbitrary hyperplane geometry.
///
/// Nodes live in a slotmap arena and reference each other by [`NodeId`].
/// Boolean operations build their result in a scratch arena and then
/// extract the reachable nodes into a fresh tree.
#[derive(Debug, Clone)]
pub struct RegionTree<S> {
    pub(super) nodes: SlotMap<NodeId, RegionNode<S>>,
    pub(super) root: NodeId,
}

impl<S: ConvexSubset> RegionTree<S> {
    /// Creates a single-leaf tree, inside everywhere if `full`.
    #[must_use]
    pub fn new(full: bool) -> Self {
        let location = if full {
            RegionLocation::Inside
        } else {
            RegionLocation::Outside
        };
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(RegionNode::leaf(None, location));
        Self { nodes, root }
    }

    /// Tree containing the whole space.
    #[must_use]
    pub fn full() -> Self {
        Self::new(true)
    }

    /// Tree containing nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(false)
    }

    /// Root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&RegionNode<S>> {
        self.nodes.get(id)
    }

    /// Returns `true` if the root is an inside leaf.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.nodes[self.root].is_inside()
    }

    /// Returns `true` if the root is an outside leaf.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root].is_outside()
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    /// Height of the tree; a single leaf has height 0.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height_from(self.root)
    }

    fn height_from(&self, id: NodeId) -> usize {
        match (self.nodes[id].minus, self.nodes[id].plus) {
            (Some(minus), Some(plus)) => 1 + self.height_from(minus).max(self.height_from(plus)),
            _ => 0,
        }
    }

    /// Node ids in pre-order (node, minus subtree, plus subtree).
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            result.push(id);
            let node = &self.nodes[id];
            if let (Some(minus), Some(plus)) = (node.minus, node.plus) {
                stack.push(plus);
                stack.push(minus);
            }
        }
        result
    }

    /// Ancestor constraints of a node, from the node upwards.
    ///
    /// Each entry is the ancestor's cut hyperplane and whether the path to
    /// `id` goes through that ancestor's minus child.
    #[must_use]
    pub fn ancestor_cuts(&self, id: NodeId) -> Vec<(&S::Hyperplane, bool)> {
        let mut result = Vec::new();
        let mut child = id;
        while let Some(parent) = self.nodes.get(child).and_then(|n| n.parent) {
            let parent_node = &self.nodes[parent];
            if let Some(cut) = &parent_node.cut {
                result.push((cut.hyperplane(), parent_node.minus == Some(child)));
            }
            child = parent;
        }
        result
    }

    /// Classifies a point against the region.
    ///
    /// A point lying on a cut is classified in both children; if they
    /// disagree the point is on the boundary.
    #[must_use]
    pub fn classify(&self, point: &PointOf<S>) -> RegionLocation {
        self.classify_from(self.root, point)
    }

    fn classify_from(&self, id: NodeId, point: &PointOf<S>) -> RegionLocation {
        let node = &self.nodes[id];
        let (Some(cut), Some(minus), Some(plus)) = (&node.cut, node.minus, node.plus) else {
            return node.location;
        };
        match cut.hyperplane().classify(point) {
            HyperplaneLocation::Minus => self.classify_from(minus, point),
            HyperplaneLocation::Plus => self.classify_from(plus, point),
            HyperplaneLocation::On => {
                let minus_loc = self.classify_from(minus, point);
                let plus_loc = self.classify_from(plus, point);
                if minus_loc == plus_loc {
                    minus_loc
                } else {
                    RegionLocation::Boundary
                }
            }
        }
    }

    /// Inserts a convex subset as a region boundary.
    ///
    /// The subset is pushed down the tree; every leaf it reaches is cut by
    /// the subset's hyperplane trimmed to that leaf's cell, and the two new
    /// leaves are tagged according to `rule`. A subset lying on an existing
    /// cut is dropped.
    pub fn insert(&mut self, subset: &S, rule: RegionCutRule) {
        let trimmed = subset.hyperplane().span();
        self.insert_from(self.root, subset.clone(), Some(trimmed), rule);
    }

    fn insert_from(&mut self, id: NodeId, subset: S, trimmed: Option<S>, rule: RegionCutRule) {
        let node = &self.nodes[id];
        let (Some(cut), Some(minus), Some(plus)) = (&node.cut, node.minus, node.plus) else {
            match trimmed {
                Some(cut) => self.cut_leaf(id, cut, rule),
                None => tracing::trace!("insertion reached a leaf with an empty trimmed cut"),
            }
            return;
        };
        let splitter = cut.hyperplane().clone();
        let (sub_minus, sub_plus) = subset.split(&splitter).into_parts();
        if sub_minus.is_none() && sub_plus.is_none() {
            tracing::trace!("inserted subset lies on an existing cut; skipping");
            return;
        }
        let (trim_minus, trim_plus) = trimmed
            .map(|t| t.split(&splitter).into_parts())
            .unwrap_or((None, None));
        if let Some(sub) = sub_minus {
            self.insert_from(minus, sub, trim_minus, rule);
        }
        if let Some(sub) = sub_plus {
            self.insert_from(plus, sub, trim_plus, rule);
        }
    }

    fn cut_leaf(&mut self, id: NodeId, cut: S, rule: RegionCutRule) {
        let location = self.nodes[id].location;
        let (minus_loc, plus_loc) = match rule {
            RegionCutRule::MinusInside => (RegionLocation::Inside, RegionLocation::Outside),
            RegionCutRule::PlusInside => (RegionLocation::Outside, RegionLocation::Inside),
            RegionCutRule::Inherit => (location, location),
        };
        let minus = self.nodes.insert(RegionNode::leaf(Some(id), minus_loc));
        let plus = self.nodes.insert(RegionNode::leaf(Some(id), plus_loc));
        let node = &mut self.nodes[id];
        node.cut = Some(cut);
        node.minus = Some(minus);
        node.plus = Some(plus);
    }

    /// Swaps inside and outside in place. Cuts are left untouched.
    pub fn complement(&mut self) {
        for node in self.nodes.values_mut() {
            node.location = flip(node.location);
        }
    }

    /// Collapses every internal node whose children are leaves with the
    /// same location into a single leaf.
    pub fn condense(&mut self) {
        self.condense_from(self.root);
    }

    fn condense_from(&mut self, id: NodeId) -> bool {
        let (Some(minus), Some(plus)) = (self.nodes[id].minus, self.nodes[id].plus) else {
            return true;
        };
        let minus_leaf = self.condense_from(minus);
        let plus_leaf = self.condense_from(plus);
        let minus_loc = self.nodes[minus].location;
        if minus_leaf && plus_leaf && minus_loc == self.nodes[plus].location {
            self.nodes.remove(minus);
            self.nodes.remove(plus);
            let node = &mut self.nodes[id];
            node.cut = None;
            node.minus = None;
            node.plus = None;
            node.location = minus_loc;
            return true;
        }
        false
    }

    /// Replaces every cut with `f(cut)`, keeping the tree structure.
    pub fn map_cuts(&mut self, mut f: impl FnMut(&S) -> S) {
        for node in self.nodes.values_mut() {
            if let Some(cut) = &node.cut {
                node.cut = Some(f(cut));
            }
        }
    }

    /// Computes the region boundary as convex subsets oriented with the
    /// region on their minus side.
    ///
    /// Each cut is pushed through its minus subtree and the resulting
    /// pieces through its plus subtree. Pieces with inside on the minus
    /// side and outside on the plus side are kept as is; pieces with the
    /// opposite arrangement are reversed.
    #[must_use]
    pub fn boundaries(&self) -> Vec<S> {
        let mut result = Vec::new();
        for id in self.preorder() {
            let node = &self.nodes[id];
            let (Some(cut), Some(minus), Some(plus)) = (&node.cut, node.minus, node.plus) else {
                continue;
            };
            let mut minus_in = Vec::new();
            let mut minus_out = Vec::new();
            self.characterize(cut.clone(), minus, &mut minus_in, &mut minus_out);

            let mut discard = Vec::new();
            let mut outside_facing = Vec::new();
            for fragment in minus_in {
                self.characterize(fragment, plus, &mut discard, &mut outside_facing);
            }
            discard.clear();
            let mut inside_facing = Vec::new();
            for fragment in minus_out {
                self.characterize(fragment, plus, &mut inside_facing, &mut discard);
            }
            result.extend(outside_facing);
            result.extend(inside_facing.iter().map(ConvexSubset::reverse));
        }
        result
    }

    fn characterize(&self, subset: S, id: NodeId, inside: &mut Vec<S>, outside: &mut Vec<S>) {
        let node = &self.nodes[id];
        let (Some(cut), Some(minus), Some(plus)) = (&node.cut, node.minus, node.plus) else {
            match node.location {
                RegionLocation::Inside => inside.push(subset),
                RegionLocation::Outside => outside.push(subset),
                RegionLocation::Boundary => {}
            }
            return;
        };
        let split = subset.split(cut.hyperplane());
        if split.minus().is_none() && split.plus().is_none() {
            // only reachable through floating point drift; follow the orientation
            tracing::trace!("boundary fragment lies on a descendant cut");
            let next = if subset.hyperplane().similar_orientation(cut.hyperplane()) {
                minus
            } else {
                plus
            };
            self.characterize(subset, next, inside, outside);
            return;
        }
        let (sub_minus, sub_plus) = split.into_parts();
        if let Some(sub) = sub_plus {
            self.characterize(sub, plus, inside, outside);
        }
        if let Some(sub) = sub_minus {
            self.characterize(sub, minus, inside, outside);
        }
    }

    /// Copies the subtree rooted at `root` in `arena` into a fresh tree,
    /// rebuilding parent links.
    pub(super) fn extract(arena: &SlotMap<NodeId, RegionNode<S>>, root: NodeId) -> Self {
        let mut nodes = SlotMap::with_capacity_and_key(arena.len());
        let new_root = copy_into(arena, root, &mut nodes, None);
        Self {
            nodes,
            root: new_root,
        }
    }
}

fn copy_into<S: Clone>(
    arena: &SlotMap<NodeId, RegionNode<S>>,
    id: NodeId,
    out: &mut SlotMap<NodeId, RegionNode<S>>,
    parent: Option<NodeId>,
) -> NodeId {
    let source = &arena[id];
    let new_id = out.insert(RegionNode::leaf(parent, source.location));
    if let (Some(cut), Some(minus), Some(plus)) = (&source.cut, source.minus, source.plus) {
        let new_minus = copy_into(arena, minus, out, Some(new_id));
        let new_plus = copy_into(arena, plus, out, Some(new_id));
        let node = &mut out[new_id];
        node.cut = Some(cut.clone());
        node.minus = Some(new_minus);
        node.plus = Some(new_plus);
    }
    new_id
}

pub(super) fn flip(location: RegionLocation) -> RegionLocation {
    match location {
        RegionLocation::Inside => RegionLocation::Outside,
        RegionLocation::Outside => RegionLocation::Inside,
        RegionLocation::Boundary => RegionLocation::Boundary,
    }
}
