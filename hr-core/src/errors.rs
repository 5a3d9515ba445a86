//! Error type shared by every module of the engine.
//!
//! All failures are local precondition or structure violations. Nothing here is transient, so
//! callers should never retry; an unreachable target is reported through a route's distance, not
//! through this type.

use thiserror::Error;

use crate::graph::NodeId;

/// Result alias used throughout `hr-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or querying a hierarchy.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A node with this id already exists.
    #[error("node {0} is already present")]
    DuplicateNode(NodeId),

    /// The requested node is not part of the graph.
    #[error("node {0} is not in the graph")]
    NodeNotFound(NodeId),

    /// An edge references an endpoint that does not exist.
    #[error("edge {from} -> {to} references absent node {missing}")]
    MissingEndpoint {
        /// Tail of the rejected edge.
        from: NodeId,
        /// Head of the rejected edge.
        to: NodeId,
        /// Whichever endpoint was missing.
        missing: NodeId,
    },

    /// Edge weights must be non-negative numbers.
    #[error("edge {from} -> {to} has invalid weight {weight}")]
    InvalidWeight {
        /// Tail of the rejected edge.
        from: NodeId,
        /// Head of the rejected edge.
        to: NodeId,
        /// The offending weight.
        weight: f64,
    },

    /// Importance must be a number.
    #[error("node {id} has invalid importance {value}")]
    InvalidImportance {
        /// The node being ranked.
        id: NodeId,
        /// The offending value.
        value: f64,
    },

    /// A directional search or contraction met a node that was never ranked.
    #[error("node {0} has no importance assigned")]
    MissingImportance(NodeId),

    /// `remove_minimum` on an empty heap.
    #[error("the heap is empty")]
    EmptyHeap,

    /// `insert` on a heap whose backing buffer is exhausted.
    #[error("the heap is full (capacity {capacity})")]
    HeapFull {
        /// Fixed capacity of the heap.
        capacity: usize,
    },

    /// A positional heap operation addressed an unoccupied slot.
    #[error("heap position {position} is out of bounds (size {size})")]
    PositionOutOfBounds {
        /// Requested slot.
        position: usize,
        /// Number of occupied slots.
        size: usize,
    },

    /// `decrease_key` was asked to move a value the wrong way.
    #[error("new value at heap position {position} does not strictly precede the current one")]
    NotDecreasing {
        /// Slot whose value would have been replaced.
        position: usize,
    },

    /// Contraction needs at least two nodes.
    #[error("contraction requires at least 2 nodes, got {count}")]
    TooFewNodes {
        /// Node count of the rejected graph.
        count: usize,
    },
}
