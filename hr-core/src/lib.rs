#![deny(
    // Overly strict on purpose: the point is to force inline allows, which give reviewers a place
    // to look twice.
    clippy::nursery,
    clippy::pedantic,
)]
#![warn(missing_docs)]

//! # hr-core – contraction hierarchy shortest-path engine
//!
//! The crate is layered leaves first:
//! 1. [`heap`] – an array-backed binary heap over an injected order that can keep a slot table for
//!    its elements, so decrease-key by position is O(log n) without searching.
//! 2. [`graph`] – a directed graph with non-negative weights keyed by caller-chosen node ids. It
//!    owns the contraction primitives ([`Graph::remove_node`] with shortcut insertion and
//!    [`Graph::restrict_to_neighborhood`]).
//! 3. [`sssp`] – Dijkstra's algorithm in three flavours: unconstrained, upward-only and
//!    downward-only. The last two only follow edges towards nodes of equal or higher importance.
//! 4. [`contraction_hierarchies`] – contracts nodes in ascending importance, recording every
//!    overlay graph, and folds all shortcuts back into a single decorated graph.
//! 5. [`routing`] – bidirectional queries over the decorated graph.
//!
//! Search state (distances, predecessors, heap slots) never lives on the graph. Each search keeps
//! its own tables indexed by node handle, so any number of searches may borrow the same graph.

pub mod contraction_hierarchies;
pub mod errors;
pub mod graph;
pub mod heap;
pub mod logging;
pub mod routing;
pub mod sssp;

pub use contraction_hierarchies::{
    assign_importance,
    contract,
    contract_list,
    contract_list_memory_efficient,
    decorated_graph,
    ContractionVariant,
    Hierarchy,
};
pub use errors::{
    Error,
    Result,
};
pub use graph::{
    Graph,
    Node,
    NodeId,
    Weight,
};
pub use routing::{
    get_intersection,
    path_weight,
    routing,
    shortest_path,
    Meeting,
    Route,
};
pub use sssp::{
    dijkstra,
    dijkstra_downward,
    dijkstra_upward,
    SearchDirection,
    ShortestPaths,
    UNREACHED,
};
