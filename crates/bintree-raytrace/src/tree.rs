//! Arena-backed binary space partition.
//!
//! Nodes live in a flat `Vec` and refer to their children by [`NodeId`].
//! A [`Bintree`] can only be obtained through validation, so every tree the
//! query engine sees is a proper rooted tree: no dangling children, no shared
//! nodes, no cycles.

use bintree_math::{Axis, Range3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BintreeError, Result};

/// Index of an object in the caller's object collection.
pub type ObjectIndex = usize;

/// Index of a node in a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A bintree node - either a leaf listing objects or an internal split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BintreeNode {
    /// Leaf node referencing objects. Order is irrelevant; repeats are allowed.
    Leaf {
        /// Objects whose geometry overlaps this leaf.
        objects: Vec<ObjectIndex>,
    },
    /// Internal node splitting space along one axis.
    ///
    /// Geometry under `left` lies at or below `left_limit` on `axis`;
    /// geometry under `right` lies at or above `right_limit`.
    Internal {
        /// Split axis.
        axis: Axis,
        /// Upper bound of the left subtree along `axis`.
        left_limit: f64,
        /// Lower bound of the right subtree along `axis`.
        right_limit: f64,
        /// Left (low side) child, absent if that half is empty.
        left: Option<NodeId>,
        /// Right (high side) child, absent if that half is empty.
        right: Option<NodeId>,
    },
}

impl BintreeNode {
    /// Leaf holding the given objects.
    pub fn leaf(objects: impl IntoIterator<Item = ObjectIndex>) -> Self {
        Self::Leaf {
            objects: objects.into_iter().collect(),
        }
    }

    /// Internal node with a single split plane shared by both children.
    pub fn split(axis: Axis, position: f64, left: NodeId, right: NodeId) -> Self {
        Self::Internal {
            axis,
            left_limit: position,
            right_limit: position,
            left: Some(left),
            right: Some(right),
        }
    }

    /// True for leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Children present under this node, left first.
    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        let (left, right) = match self {
            Self::Leaf { .. } => (None, None),
            Self::Internal { left, right, .. } => (*left, *right),
        };
        left.into_iter().chain(right)
    }
}

/// Growable node arena used to assemble a [`Bintree`].
///
/// Builders push children before their parents, then call
/// [`TreeArena::finish`] with the root.
#[derive(Debug, Clone, Default)]
pub struct TreeArena {
    nodes: Vec<BintreeNode>,
}

impl TreeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id.
    pub fn push(&mut self, node: BintreeNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Append a leaf.
    pub fn push_leaf(&mut self, objects: impl IntoIterator<Item = ObjectIndex>) -> NodeId {
        self.push(BintreeNode::leaf(objects))
    }

    /// Append an internal node with a single split position.
    pub fn push_split(&mut self, axis: Axis, position: f64, left: NodeId, right: NodeId) -> NodeId {
        self.push(BintreeNode::split(axis, position, left, right))
    }

    /// Append an internal node with separate child limits.
    pub fn push_internal(
        &mut self,
        axis: Axis,
        left_limit: f64,
        right_limit: f64,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) -> NodeId {
        self.push(BintreeNode::Internal {
            axis,
            left_limit,
            right_limit,
            left,
            right,
        })
    }

    /// Number of nodes pushed so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no nodes have been pushed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate and freeze into a tree.
    pub fn finish(self, root: NodeId, range: Range3) -> Result<Bintree> {
        Bintree::from_parts(self.nodes, root, range)
    }
}

/// An immutable bintree: a rooted node arena plus the overall extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BintreeParts", into = "BintreeParts")]
pub struct Bintree {
    range: Range3,
    root: NodeId,
    nodes: Vec<BintreeNode>,
}

/// Serialized form of a [`Bintree`], validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BintreeParts {
    range: Range3,
    root: NodeId,
    nodes: Vec<BintreeNode>,
}

impl TryFrom<BintreeParts> for Bintree {
    type Error = BintreeError;

    fn try_from(parts: BintreeParts) -> Result<Self> {
        Bintree::from_parts(parts.nodes, parts.root, parts.range)
    }
}

impl From<Bintree> for BintreeParts {
    fn from(tree: Bintree) -> Self {
        Self {
            range: tree.range,
            root: tree.root,
            nodes: tree.nodes,
        }
    }
}

impl Bintree {
    /// Assemble a tree from its parts, checking that they form a proper
    /// rooted tree.
    pub fn from_parts(nodes: Vec<BintreeNode>, root: NodeId, range: Range3) -> Result<Self> {
        if nodes.is_empty() {
            return Err(BintreeError::EmptyTree);
        }
        if root.index() >= nodes.len() {
            return Err(BintreeError::InvalidRoot(root));
        }
        // Catches `Range3::empty()` passed through unexpanded.
        let range = Range3::from_limits(Axis::ALL.map(|axis| range.limits(axis)))?;

        let mut owned = vec![false; nodes.len()];
        owned[root.index()] = true;

        for (i, node) in nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            if let BintreeNode::Internal {
                left_limit,
                right_limit,
                ..
            } = node
            {
                for &limit in [left_limit, right_limit] {
                    if !limit.is_finite() {
                        return Err(BintreeError::InvalidLimit { node: id, limit });
                    }
                }
            }
            for child in node.children() {
                let Some(slot) = owned.get_mut(child.index()) else {
                    return Err(BintreeError::DanglingChild { node: id, child });
                };
                if *slot {
                    return Err(BintreeError::SharedNode(child));
                }
                *slot = true;
            }
        }

        // Single ownership plus full reachability rules out cycles.
        let mut reached = vec![false; nodes.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            reached[id.index()] = true;
            stack.extend(nodes[id.index()].children());
        }
        if let Some(i) = reached.iter().position(|&r| !r) {
            return Err(BintreeError::UnreachableNode(NodeId(i as u32)));
        }

        debug!(nodes = nodes.len(), root = root.0, "assembled bintree");

        Ok(Self { range, root, nodes })
    }

    /// A tree consisting of a single leaf.
    pub fn single_leaf(objects: impl IntoIterator<Item = ObjectIndex>, range: Range3) -> Result<Self> {
        let mut arena = TreeArena::new();
        let root = arena.push_leaf(objects);
        arena.finish(root, range)
    }

    /// Overall extent of the tree.
    pub fn range(&self) -> &Range3 {
        &self.range
    }

    /// Root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node.
    ///
    /// Every id reachable from [`Bintree::root`] is valid.
    #[inline]
    pub fn node(&self, id: NodeId) -> &BintreeNode {
        &self.nodes[id.index()]
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[BintreeNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Total object references across all leaves, repeats included.
    pub fn object_references(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| match n {
                BintreeNode::Leaf { objects } => objects.len(),
                BintreeNode::Internal { .. } => 0,
            })
            .sum()
    }

    /// Number of levels (a lone leaf has depth 1).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.node(id).children().map(|c| (c, depth + 1)));
        }
        max_depth
    }
}
