//! Contraction Hierarchies speed up point-to-point shortest path queries on weighted graphs,
//! conventionally road networks.
//!
//! The technique has two stages:
//! 1. Pre-processing:
//!     * Rank every node by an importance heuristic ([`heuristic`]). Lower importance is
//!       contracted first.
//!     * Contract nodes one by one in that order. Each contraction removes a node and inserts
//!       shortcuts between its neighbours so that no distance among the survivors changes. The
//!       graph after step `i` is the `i`th overlay (or core) graph.
//! 2. Query:
//!     * Fold every shortcut ever created back into the original graph, giving the decorated graph
//!       (the eponymous "contraction hierarchy").
//!     * Run an upward search from the source and a downward search from the target over the
//!       decorated graph and meet in the middle ([`crate::routing`]).
//!
//! Two builders are provided. [`ContractionVariant::List`] keeps a full copy of the graph after
//! every step. [`ContractionVariant::MemoryEfficient`] only keeps the neighbourhood touched by
//! each step, which is enough to recover every shortcut.

/// Hierarchy construction
mod ch;
/// Heuristics that rank nodes before contraction
pub mod heuristic;

pub use ch::{
    contract,
    contract_list,
    contract_list_memory_efficient,
    decorated_graph,
    ContractionVariant,
    Hierarchy,
};
pub use heuristic::{
    assign_importance,
    Degree,
    EdgeDifference,
    ExplicitOrder,
    ImportanceHeuristic,
    Random,
};
