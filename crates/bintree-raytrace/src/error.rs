//! Error types for tree assembly and query configuration.

use bintree_math::RangeError;
use thiserror::Error;

use crate::tree::NodeId;

/// Errors reported when a tree or a query setup violates its contract.
///
/// Queries themselves never fail: "no intersection" is a normal result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BintreeError {
    /// The node arena holds no nodes.
    #[error("tree has no nodes")]
    EmptyTree,

    /// The root index does not name a node.
    #[error("root {0:?} is out of bounds")]
    InvalidRoot(NodeId),

    /// An internal node refers to a child that does not exist.
    #[error("node {node:?} refers to missing child {child:?}")]
    DanglingChild {
        /// Parent node.
        node: NodeId,
        /// Missing child index.
        child: NodeId,
    },

    /// A node is the child of more than one parent, or the root has a parent.
    #[error("node {0:?} has more than one owner")]
    SharedNode(NodeId),

    /// A node cannot be reached from the root.
    #[error("node {0:?} is unreachable from the root")]
    UnreachableNode(NodeId),

    /// A split limit is not finite.
    #[error("node {node:?} has non-finite split limit {limit}")]
    InvalidLimit {
        /// Offending node.
        node: NodeId,
        /// The bad limit.
        limit: f64,
    },

    /// The root range is malformed.
    #[error("invalid root range: {0}")]
    Range(#[from] RangeError),

    /// A ray direction has no non-zero component.
    #[error("ray direction is zero on every axis")]
    ZeroDirection,

    /// Invalid query options.
    #[error("invalid query options: {0}")]
    InvalidOptions(String),
}

/// Result type for bintree operations.
pub type Result<T> = std::result::Result<T, BintreeError>;
