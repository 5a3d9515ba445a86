//! Directed weighted graph keyed by caller-chosen node ids.
//!
//! Nodes live in a petgraph [`StableDiGraph`], whose handles survive removals, so contraction can
//! delete nodes without invalidating the handles that searches use to index their scratch tables.
//! A side [`IndexMap`] maps ids to handles and remembers insertion order for iteration.
//!
//! Every mutation validates its input before touching anything, so a failed call leaves the graph
//! unchanged.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use petgraph::stable_graph::{
    NodeIndex,
    StableDiGraph,
};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{
    debug,
    warn,
};

use crate::errors::{
    Error,
    Result,
};

/// Identity of a node, chosen by whoever builds the graph.
pub type NodeId = usize;

/// Edge weight, and the distance type of every search.
pub type Weight = OrderedFloat<f64>;

/// Node payload: identity plus the importance used to order contraction.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Immutable identity.
    id: NodeId,
    /// Contraction rank key; lower is contracted first.
    importance: Option<Weight>,
}

impl Node {
    /// This node's id.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Importance, if one has been assigned.
    #[must_use]
    pub const fn importance(&self) -> Option<Weight> {
        self.importance
    }
}

/// A shortcut that removing some node `v` would need: `from -> v -> to` with no existing edge
/// `from -> to` at least as cheap.
#[derive(Clone, Copy, Debug)]
struct PlannedShortcut {
    /// Tail of the shortcut.
    from: NodeIndex,
    /// Head of the shortcut.
    to: NodeIndex,
    /// `weight(from, v) + weight(v, to)`.
    weight: Weight,
}

/// Adjacency representation of a directed graph with non-negative weights.
///
/// At most one edge exists per ordered pair of nodes; adding a second one overwrites the weight.
/// `Clone` produces a fully independent copy with identical handles.
#[derive(Clone, Default)]
pub struct Graph {
    /// Topology and payloads.
    inner: StableDiGraph<Node, Weight>,
    /// Id to handle, in insertion order.
    handles: IndexMap<NodeId, NodeIndex>,
}

impl Graph {
    /// Empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.handles.len()
    }

    /// Number of edges, shortcuts included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Whether `id` is a node of this graph.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.handles.contains_key(&id)
    }

    /// Add an isolated node.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateNode`] if `id` is taken.
    pub fn add_node(&mut self, id: NodeId) -> Result<()> {
        if self.contains(id) {
            return Err(Error::DuplicateNode(id));
        }
        let handle = self.inner.add_node(Node { id, importance: None });
        self.handles.insert(id, handle);
        Ok(())
    }

    /// Add several nodes; either all of them are added or none.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateNode`] if any id is taken or repeated.
    pub fn add_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) -> Result<()> {
        let ids: Vec<_> = ids.into_iter().collect();
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(&id) = ids.iter().find(|&&id| self.contains(id) || !seen.insert(id)) {
            return Err(Error::DuplicateNode(id));
        }
        for id in ids {
            self.add_node(id)?;
        }
        Ok(())
    }

    /// Checks shared by every edge insertion.
    fn validate_edge(&self, from: NodeId, to: NodeId, weight: Weight) -> Result<(NodeIndex, NodeIndex)> {
        let handle = |id| self.handles.get(&id).copied().ok_or(Error::MissingEndpoint { from, to, missing: id });
        let endpoints = (handle(from)?, handle(to)?);
        if weight.is_nan() || weight < OrderedFloat(0.0) {
            return Err(Error::InvalidWeight { from, to, weight: weight.into_inner() });
        }
        if from == to {
            warn!(id = from, "self loop is kept but never shortens a path");
        }
        Ok(endpoints)
    }

    /// Insert the edge `from -> to`, overwriting any existing weight.
    ///
    /// # Errors
    ///
    /// [`Error::MissingEndpoint`] if either endpoint is absent, [`Error::InvalidWeight`] for a
    /// negative or NaN weight.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: impl Into<Weight>) -> Result<()> {
        let weight = weight.into();
        let (a, b) = self.validate_edge(from, to, weight)?;
        self.inner.update_edge(a, b, weight);
        Ok(())
    }

    /// Insert several edges; either all of them are inserted or none.
    ///
    /// # Errors
    ///
    /// As [`Graph::add_edge`], for the first offending edge.
    pub fn add_edges<W: Into<Weight>>(&mut self, edges: impl IntoIterator<Item = (NodeId, NodeId, W)>) -> Result<()> {
        let edges = edges
            .into_iter()
            .map(|(from, to, weight)| {
                let weight = weight.into();
                self.validate_edge(from, to, weight).map(|(a, b)| (a, b, weight))
            })
            .collect::<Result<Vec<_>>>()?;
        for (a, b, weight) in edges {
            self.inner.update_edge(a, b, weight);
        }
        Ok(())
    }

    /// Smallest id greater than every id in the graph (0 for an empty graph).
    #[must_use]
    pub fn next_free_id(&self) -> NodeId {
        self.handles.keys().max().map_or(0, |max| max + 1)
    }

    /// Add a node under [`Graph::next_free_id`] together with its `(target, weight)` outgoing and
    /// `(source, weight)` incoming edges. Nothing is added if any edge is invalid.
    ///
    /// # Errors
    ///
    /// [`Error::MissingEndpoint`] or [`Error::InvalidWeight`] for the first offending edge.
    pub fn put_node(&mut self, outgoing: &[(NodeId, f64)], incoming: &[(NodeId, f64)]) -> Result<NodeId> {
        let id = self.next_free_id();
        let check = |from: NodeId, to: NodeId, weight: f64, other: NodeId| {
            if !self.contains(other) {
                return Err(Error::MissingEndpoint { from, to, missing: other });
            }
            if weight.is_nan() || weight < 0.0 {
                return Err(Error::InvalidWeight { from, to, weight });
            }
            Ok(())
        };
        for &(to, weight) in outgoing {
            check(id, to, weight, to)?;
        }
        for &(from, weight) in incoming {
            check(from, id, weight, from)?;
        }

        self.add_node(id)?;
        self.add_edges(outgoing.iter().map(|&(to, weight)| (id, to, weight)))?;
        self.add_edges(incoming.iter().map(|&(from, weight)| (from, id, weight)))?;
        Ok(id)
    }

    /// Payload of node `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if `id` is absent.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        Ok(&self.inner[self.handle(id)?])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.handles.values().map(|&handle| &self.inner[handle])
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.handles.keys().copied()
    }

    /// Every edge as `(from, to, weight)`, grouped by tail in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Weight)> + '_ {
        self.handles.values().flat_map(move |&handle| {
            self.inner
                .edges_directed(handle, Direction::Outgoing)
                .map(move |edge| (self.inner[edge.source()].id, self.inner[edge.target()].id, *edge.weight()))
        })
    }

    /// Weight of the edge `from -> to`, if there is one.
    #[must_use]
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<Weight> {
        let (a, b) = (self.handles.get(&from)?, self.handles.get(&to)?);
        self.inner.find_edge(*a, *b).map(|edge| self.inner[edge])
    }

    /// `(target, weight)` for every edge leaving `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if `id` is absent.
    pub fn successors(&self, id: NodeId) -> Result<impl Iterator<Item = (NodeId, Weight)> + '_> {
        let handle = self.handle(id)?;
        Ok(self
            .inner
            .edges_directed(handle, Direction::Outgoing)
            .map(|edge| (self.inner[edge.target()].id, *edge.weight())))
    }

    /// `(source, weight)` for every edge entering `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if `id` is absent.
    pub fn predecessors(&self, id: NodeId) -> Result<impl Iterator<Item = (NodeId, Weight)> + '_> {
        let handle = self.handle(id)?;
        Ok(self
            .inner
            .edges_directed(handle, Direction::Incoming)
            .map(|edge| (self.inner[edge.source()].id, *edge.weight())))
    }

    /// Importance of `id`, if assigned.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if `id` is absent.
    pub fn importance(&self, id: NodeId) -> Result<Option<Weight>> {
        Ok(self.node(id)?.importance)
    }

    /// Set the importance of `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if `id` is absent, [`Error::InvalidImportance`] for NaN.
    pub fn set_importance(&mut self, id: NodeId, value: impl Into<Weight>) -> Result<()> {
        let value = value.into();
        let handle = self.handle(id)?;
        if value.is_nan() {
            return Err(Error::InvalidImportance { id, value: value.into_inner() });
        }
        self.inner[handle].importance = Some(value);
        Ok(())
    }

    /// Shortcuts that removing `handle` would insert or tighten. Self loops on the removed node
    /// and pairs `x -> v -> x` never yield a shortcut.
    fn plan_shortcuts(&self, handle: NodeIndex) -> Vec<PlannedShortcut> {
        let incoming = self
            .inner
            .edges_directed(handle, Direction::Incoming)
            .filter(|edge| edge.source() != handle)
            .map(|edge| (edge.source(), *edge.weight()));
        let outgoing: Vec<_> = self
            .inner
            .edges_directed(handle, Direction::Outgoing)
            .filter(|edge| edge.target() != handle)
            .map(|edge| (edge.target(), *edge.weight()))
            .collect();

        incoming
            .cartesian_product(outgoing)
            .filter(|((from, _), (to, _))| from != to)
            .map(|((from, w_in), (to, w_out))| PlannedShortcut { from, to, weight: w_in + w_out })
            .filter(|shortcut| {
                // witness check: an existing edge that is no worse already covers this pair
                self.inner
                    .find_edge(shortcut.from, shortcut.to)
                    .map_or(true, |edge| self.inner[edge] > shortcut.weight)
            })
            .collect()
    }

    /// How many shortcuts [`Graph::remove_node`] would insert or tighten for `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if `id` is absent.
    pub fn shortcuts_needed(&self, id: NodeId) -> Result<usize> {
        Ok(self.plan_shortcuts(self.handle(id)?).len())
    }

    /// Contract `id`: for every in-neighbour `x` and out-neighbour `y` with `x != y`, make sure an
    /// edge `x -> y` no heavier than `weight(x, id) + weight(id, y)` exists, then delete `id` and
    /// all its edges. Returns the number of shortcuts inserted or tightened.
    ///
    /// Shortest-path distances between the remaining nodes are unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if `id` is absent.
    pub fn remove_node(&mut self, id: NodeId) -> Result<usize> {
        let handle = self.handle(id)?;
        let shortcuts = self.plan_shortcuts(handle);

        for shortcut in &shortcuts {
            debug!(
                via = id,
                from = self.inner[shortcut.from].id,
                to = self.inner[shortcut.to].id,
                weight = shortcut.weight.into_inner(),
                "adding shortcut"
            );
            self.inner.update_edge(shortcut.from, shortcut.to, shortcut.weight);
        }

        self.inner.remove_node(handle);
        self.handles.shift_remove(&id);
        Ok(shortcuts.len())
    }

    /// Drop every node that shares no edge (in either direction) with `id`, keeping `id`, its
    /// direct neighbours and the edges among them.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if `id` is absent.
    pub fn restrict_to_neighborhood(&mut self, id: NodeId) -> Result<()> {
        let handle = self.handle(id)?;
        let keep: HashSet<NodeIndex> = self.inner.neighbors_undirected(handle).chain([handle]).collect();

        let dropped: Vec<_> = self.handles.values().copied().filter(|h| !keep.contains(h)).collect();
        for handle in dropped {
            self.inner.remove_node(handle);
        }
        self.handles.retain(|_, handle| keep.contains(&*handle));
        Ok(())
    }

    /// Handle of `id`.
    pub(crate) fn handle(&self, id: NodeId) -> Result<NodeIndex> {
        self.handles.get(&id).copied().ok_or(Error::NodeNotFound(id))
    }

    /// `(id, handle)` pairs in insertion order.
    pub(crate) fn handles(&self) -> impl Iterator<Item = (NodeId, NodeIndex)> + '_ {
        self.handles.iter().map(|(&id, &handle)| (id, handle))
    }

    /// One past the largest live handle index; sizes per-search tables.
    pub(crate) fn handle_bound(&self) -> usize {
        self.handles.values().map(|handle| handle.index() + 1).max().unwrap_or(0)
    }

    /// Underlying petgraph graph.
    pub(crate) const fn inner(&self) -> &StableDiGraph<Node, Weight> {
        &self.inner
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for node in self.nodes() {
            let adjacency: Vec<_> = self
                .inner
                .edges_directed(self.handles[&node.id], Direction::Outgoing)
                .map(|edge| (self.inner[edge.target()].id, edge.weight().into_inner()))
                .collect();
            map.entry(&node.id, &adjacency);
        }
        map.finish()
    }
}
