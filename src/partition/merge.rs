use slotmap::SlotMap;

use super::tree::{flip, NodeId, RegionNode, RegionTree};
use super::{ConvexSubset, Hyperplane, RegionLocation, Split, SplitLocation};

/// Boolean operation applied when merging two region trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeOp {
    Union,
    Intersection,
    Difference,
    Xor,
}

/// Scratch arena for merge and split.
///
/// Nodes are never mutated once inserted, so subtrees may be shared
/// freely; [`RegionTree::extract`] turns the final DAG back into a tree.
struct Scratch<S> {
    nodes: SlotMap<NodeId, RegionNode<S>>,
}

impl<S: ConvexSubset> Scratch<S> {
    fn from_tree(tree: &RegionTree<S>) -> Self {
        Self {
            nodes: tree.nodes.clone(),
        }
    }

    fn import(&mut self, tree: &RegionTree<S>, id: NodeId) -> NodeId {
        let source = &tree.nodes[id];
        match (&source.cut, source.minus, source.plus) {
            (Some(cut), Some(minus), Some(plus)) => {
                let minus = self.import(tree, minus);
                let plus = self.import(tree, plus);
                self.nodes
                    .insert(RegionNode::internal(cut.clone(), minus, plus, source.location))
            }
            _ => self.nodes.insert(RegionNode::leaf(None, source.location)),
        }
    }

    fn leaf(&mut self, location: RegionLocation) -> NodeId {
        self.nodes.insert(RegionNode::leaf(None, location))
    }

    fn internal(&mut self, cut: S, minus: NodeId, plus: NodeId, location: RegionLocation) -> NodeId {
        self.nodes
            .insert(RegionNode::internal(cut, minus, plus, location))
    }

    fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].is_leaf()
    }

    fn is_inside(&self, id: NodeId) -> bool {
        self.nodes[id].is_inside()
    }

    fn parts(&self, id: NodeId) -> Option<(S, NodeId, NodeId)> {
        let node = &self.nodes[id];
        match (&node.cut, node.minus, node.plus) {
            (Some(cut), Some(minus), Some(plus)) => Some((cut.clone(), minus, plus)),
            _ => None,
        }
    }

    /// Copy of the subtree at `id` with every location flipped.
    fn complemented(&mut self, id: NodeId) -> NodeId {
        let location = flip(self.nodes[id].location);
        match self.parts(id) {
            Some((cut, minus, plus)) => {
                let minus = self.complemented(minus);
                let plus = self.complemented(plus);
                self.internal(cut, minus, plus, location)
            }
            None => self.leaf(location),
        }
    }

    /// Partitions the subtree at `id` by `partitioner`.
    ///
    /// Returns a new node cut by `partitioner` whose minus and plus
    /// children hold the parts of the original subtree on each side.
    fn split_subtree(&mut self, id: NodeId, partitioner: &S) -> NodeId {
        let location = self.nodes[id].location;
        let Some((node_cut, node_minus, node_plus)) = self.parts(id) else {
            return self.internal(partitioner.clone(), id, id, location);
        };

        let node_hyperplane = node_cut.hyperplane().clone();
        let partitioner_split = partitioner.split(&node_hyperplane);
        let node_cut_split = node_cut.split(partitioner.hyperplane());
        let node_cut_side = node_cut_split.location();

        let (result_minus, result_plus) = match partitioner_split.location() {
            SplitLocation::Plus => {
                let plus_split = self.split_subtree(node_plus, partitioner);
                let (split_minus, split_plus) = self.children(plus_split);
                if node_cut_side == SplitLocation::Plus {
                    let rebuilt = self.internal(node_cut, node_minus, split_plus, location);
                    (split_minus, rebuilt)
                } else {
                    let rebuilt = self.internal(node_cut, node_minus, split_minus, location);
                    (rebuilt, split_plus)
                }
            }
            SplitLocation::Minus => {
                let minus_split = self.split_subtree(node_minus, partitioner);
                let (split_minus, split_plus) = self.children(minus_split);
                if node_cut_side == SplitLocation::Minus {
                    let rebuilt = self.internal(node_cut, split_minus, node_plus, location);
                    (rebuilt, split_plus)
                } else {
                    let rebuilt = self.internal(node_cut, split_plus, node_plus, location);
                    (split_minus, rebuilt)
                }
            }
            SplitLocation::Both => {
                let (part_minus, part_plus) = partitioner_split.into_parts();
                let (minus_of_minus, plus_of_minus) = match part_minus {
                    Some(part) => {
                        let split = self.split_subtree(node_minus, &part);
                        self.children(split)
                    }
                    None => (node_minus, node_minus),
                };
                let (minus_of_plus, plus_of_plus) = match part_plus {
                    Some(part) => {
                        let split = self.split_subtree(node_plus, &part);
                        self.children(split)
                    }
                    None => (node_plus, node_plus),
                };
                let (cut_minus, cut_plus) = node_cut_split.into_parts();
                let result_minus =
                    self.join_or_collapse(cut_minus, minus_of_minus, minus_of_plus, location);
                let result_plus =
                    self.join_or_collapse(cut_plus, plus_of_minus, plus_of_plus, location);
                (result_minus, result_plus)
            }
            SplitLocation::Neither => {
                if partitioner.hyperplane().similar_orientation(&node_hyperplane) {
                    (node_minus, node_plus)
                } else {
                    (node_plus, node_minus)
                }
            }
        };
        self.internal(partitioner.clone(), result_minus, result_plus, location)
    }

    /// Joins two split halves under a piece of the original node cut.
    ///
    /// The piece can be missing only when the partitioner grazes the node
    /// cut within tolerance; the half on the matching side of the node cut
    /// is kept in that case.
    fn join_or_collapse(
        &mut self,
        cut: Option<S>,
        minus: NodeId,
        plus: NodeId,
        location: RegionLocation,
    ) -> NodeId {
        match cut {
            Some(cut) => self.internal(cut, minus, plus, location),
            None => {
                tracing::debug!("node cut vanished while splitting a subtree; collapsing");
                minus
            }
        }
    }

    fn children(&self, id: NodeId) -> (NodeId, NodeId) {
        let node = &self.nodes[id];
        match (node.minus, node.plus) {
            (Some(minus), Some(plus)) => (minus, plus),
            _ => (id, id),
        }
    }

    fn merge(&mut self, first: NodeId, second: NodeId, op: MergeOp) -> NodeId {
        if self.is_leaf(first) || self.is_leaf(second) {
            return self.merge_leaf(first, second, op);
        }
        let Some((cut, first_minus, first_plus)) = self.parts(first) else {
            return self.merge_leaf(first, second, op);
        };
        let partitioned = self.split_subtree(second, &cut);
        let (second_minus, second_plus) = self.children(partitioned);
        let minus = self.merge(first_minus, second_minus, op);
        let plus = self.merge(first_plus, second_plus, op);
        let location = self.nodes[first].location;
        self.internal(cut, minus, plus, location)
    }

    fn merge_leaf(&mut self, first: NodeId, second: NodeId, op: MergeOp) -> NodeId {
        match op {
            MergeOp::Union => {
                if self.is_leaf(first) {
                    if self.is_inside(first) {
                        first
                    } else {
                        second
                    }
                } else if self.is_inside(second) {
                    second
                } else {
                    first
                }
            }
            MergeOp::Intersection => {
                if self.is_leaf(first) {
                    if self.is_inside(first) {
                        second
                    } else {
                        first
                    }
                } else if self.is_inside(second) {
                    first
                } else {
                    second
                }
            }
            MergeOp::Difference => {
                if self.is_inside(first) {
                    self.complemented(second)
                } else if self.is_inside(second) {
                    self.leaf(RegionLocation::Outside)
                } else {
                    first
                }
            }
            MergeOp::Xor => {
                if self.is_leaf(first) {
                    if self.is_inside(first) {
                        self.complemented(second)
                    } else {
                        second
                    }
                } else if self.is_inside(second) {
                    self.complemented(first)
                } else {
                    first
                }
            }
        }
    }
}

impl<S: ConvexSubset> RegionTree<S> {
    /// Combines two trees with a boolean operation, returning a new
    /// condensed tree. Neither input is modified.
    #[must_use]
    pub fn merge(first: &Self, second: &Self, op: MergeOp) -> Self {
        let mut scratch = Scratch::from_tree(first);
        let second_root = scratch.import(second, second.root);
        let root = scratch.merge(first.root, second_root, op);
        let mut result = Self::extract(&scratch.nodes, root);
        result.condense();
        tracing::debug!(
            ?op,
            first = first.count(),
            second = second.count(),
            result = result.count(),
            "merged region trees"
        );
        result
    }

    /// Splits the region by a hyperplane into the parts on its minus and
    /// plus sides. A side with no inside cells is `None`.
    #[must_use]
    pub fn split(&self, splitter: &S::Hyperplane) -> Split<Self> {
        let mut scratch = Scratch::from_tree(self);
        let split_root = scratch.split_subtree(self.root, &splitter.span());
        let (split_minus, split_plus) = scratch.children(split_root);

        let outside = scratch.leaf(RegionLocation::Outside);
        let minus_root = scratch.internal(
            splitter.span(),
            split_minus,
            outside,
            RegionLocation::Outside,
        );
        let plus_root = scratch.internal(
            splitter.span(),
            outside,
            split_plus,
            RegionLocation::Outside,
        );

        let finish = |root: NodeId| {
            let mut tree = Self::extract(&scratch.nodes, root);
            tree.condense();
            (!tree.is_empty()).then_some(tree)
        };
        Split::new(finish(minus_root), finish(plus_root))
    }
}
