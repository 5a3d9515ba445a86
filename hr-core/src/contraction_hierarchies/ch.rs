use indexmap::IndexMap;
use tracing::{
    debug,
    info,
    instrument,
};

use crate::errors::{
    Error,
    Result,
};
use crate::graph::{
    Graph,
    NodeId,
    Weight,
};
use crate::heap::{
    BinHeap,
    MinOrder,
};

/// How much of each overlay graph to keep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContractionVariant {
    /// Keep a full copy of the working graph after every contraction. Stops with two nodes left.
    #[default]
    List,
    /// Keep only the contracted node's neighbours and the edges among them (shortcuts included)
    /// after every contraction. Stops with one node left.
    MemoryEfficient,
}

impl ContractionVariant {
    /// Number of nodes left uncontracted when the builder stops.
    const fn core_size(self) -> usize {
        match self {
            Self::List => 2,
            Self::MemoryEfficient => 1,
        }
    }
}

/// The record of one contraction run.
///
/// Overlay 0 is the input graph; overlay `k` is what step `k` produced (see
/// [`ContractionVariant`]). Every node gets a rank: contracted nodes in removal order, then the
/// core nodes in ascending importance.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    /// Which builder produced this hierarchy.
    variant: ContractionVariant,
    /// Input graph followed by one snapshot per contraction.
    overlays: Vec<Graph>,
    /// Rank of every node, in rank order.
    ranks: IndexMap<NodeId, usize>,
    /// The nodes nobody contracted and the edges among them.
    core: Graph,
}

impl Hierarchy {
    /// Builder that produced this hierarchy.
    #[must_use]
    pub const fn variant(&self) -> ContractionVariant {
        self.variant
    }

    /// All overlays, input graph first.
    #[must_use]
    pub fn overlays(&self) -> &[Graph] {
        &self.overlays
    }

    /// Overlay after `step` contractions.
    #[must_use]
    pub fn overlay(&self, step: usize) -> Option<&Graph> {
        self.overlays.get(step)
    }

    /// Number of contractions performed.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.overlays.len() - 1
    }

    /// Hierarchy rank of `id`.
    #[must_use]
    pub fn rank(&self, id: NodeId) -> Option<usize> {
        self.ranks.get(&id).copied()
    }

    /// Node ids from lowest to highest rank.
    pub fn contraction_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ranks.keys().copied()
    }

    /// The graph left when contraction stopped.
    #[must_use]
    pub const fn core(&self) -> &Graph {
        &self.core
    }

    /// Copy `base` and add every edge of every overlay that `base` lacks or that is strictly
    /// cheaper than what `base` has. Returns the decorated graph and the number of edges added or
    /// tightened.
    ///
    /// The comparison is made against the graph being decorated, so applying the same overlays
    /// twice changes nothing.
    ///
    /// # Errors
    ///
    /// [`Error::MissingEndpoint`] if an overlay mentions a node `base` does not have.
    #[instrument(skip_all, fields(overlays = self.overlays.len()))]
    pub fn decorate(&self, base: &Graph) -> Result<(Graph, usize)> {
        let mut decorated = base.clone();
        let mut shortcuts = 0;
        for overlay in &self.overlays {
            for (from, to, weight) in overlay.edges() {
                if decorated.edge_weight(from, to).is_some_and(|existing| existing <= weight) {
                    continue;
                }
                decorated.add_edge(from, to, weight)?;
                shortcuts += 1;
            }
        }
        info!(shortcuts, edges = decorated.edge_count(), "decorated graph built");
        Ok((decorated, shortcuts))
    }
}

/// Contract `graph` in ascending importance with the given variant.
///
/// `graph` itself is left untouched; contraction works on a copy.
///
/// # Errors
///
/// [`Error::TooFewNodes`] for graphs with fewer than two nodes, [`Error::MissingImportance`] if a
/// node was never ranked.
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn contract(graph: &Graph, variant: ContractionVariant) -> Result<Hierarchy> {
    if graph.node_count() < 2 {
        return Err(Error::TooFewNodes { count: graph.node_count() });
    }

    // ties on importance fall back to graph order
    let entries = graph
        .nodes()
        .enumerate()
        .map(|(position, node)| {
            let importance: Weight = node.importance().ok_or(Error::MissingImportance(node.id()))?;
            Ok((importance, position, node.id()))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut queue = BinHeap::new(entries, MinOrder);

    let mut working = graph.clone();
    let mut overlays = vec![graph.clone()];
    let mut ranks = IndexMap::with_capacity(graph.node_count());

    while queue.len() > variant.core_size() {
        let (importance, _, id) = queue.remove_minimum()?;
        let snapshot = match variant {
            ContractionVariant::List => {
                let added = working.remove_node(id)?;
                debug!(id, importance = importance.into_inner(), added, "contracted node");
                working.clone()
            },
            ContractionVariant::MemoryEfficient => {
                let mut local = working.clone();
                local.restrict_to_neighborhood(id)?;
                local.remove_node(id)?;
                let added = working.remove_node(id)?;
                debug!(id, importance = importance.into_inner(), added, "contracted node");
                local
            },
        };
        overlays.push(snapshot);
        ranks.insert(id, ranks.len());
    }

    while !queue.is_empty() {
        let (_, _, id) = queue.remove_minimum()?;
        ranks.insert(id, ranks.len());
    }

    info!(steps = overlays.len() - 1, core = working.node_count(), "contraction finished");
    Ok(Hierarchy { variant, overlays, ranks, core: working })
}

/// Contract keeping a full snapshot per step.
///
/// # Errors
///
/// See [`contract`].
pub fn contract_list(graph: &Graph) -> Result<Hierarchy> {
    contract(graph, ContractionVariant::List)
}

/// Contract keeping only the neighbourhood touched by each step.
///
/// # Errors
///
/// See [`contract`].
pub fn contract_list_memory_efficient(graph: &Graph) -> Result<Hierarchy> {
    contract(graph, ContractionVariant::MemoryEfficient)
}

/// `graph` plus every shortcut a full contraction creates, ready for bidirectional queries.
///
/// # Errors
///
/// See [`contract`].
pub fn decorated_graph(graph: &Graph, variant: ContractionVariant) -> Result<Graph> {
    let hierarchy = contract(graph, variant)?;
    let (decorated, _) = hierarchy.decorate(graph)?;
    Ok(decorated)
}
