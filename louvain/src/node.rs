use crate::NodeId;
use fxhash::FxHashSet;
use std::collections::BTreeSet;

/// Weighted edge from a node to another node of the same level, by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct InternalLink {
    pub to: usize,
    pub weight: f64,
}

impl InternalLink {
    pub fn new(to: usize, weight: f64) -> Self {
        InternalLink { to, weight }
    }
}

/// A vertex of one level of the coarsening hierarchy. After aggregation a
/// node stands for a whole community of the level below it.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Index of the community the node is assigned to.
    pub community: usize,
    /// Input node ids folded into this node.
    pub original_nodes: BTreeSet<NodeId>,
    /// Links to other nodes of the same level. Symmetric across the level.
    pub incident_links: Vec<InternalLink>,
    /// Doubled weight of the edges collapsed inside this node.
    pub self_loops_weight: f64,
    out_degree: f64,
}

impl Node {
    pub fn new(
        community: usize,
        original_nodes: BTreeSet<NodeId>,
        incident_links: Vec<InternalLink>,
        self_loops_weight: f64,
    ) -> Node {
        let out_degree = incident_links.iter().map(|l| l.weight).sum();
        Node {
            community,
            original_nodes,
            incident_links,
            self_loops_weight,
            out_degree,
        }
    }

    /// Sum of the incident link weights
    pub fn out_degree(&self) -> f64 {
        self.out_degree
    }

    pub fn degree(&self) -> f64 {
        self.out_degree + self.self_loops_weight
    }

    /// Distinct communities of the neighbors, in the order their links appear, excluding
    /// the node's own community.
    pub fn neighbour_communities(&self, nodes: &[Node]) -> Vec<usize> {
        let mut seen = FxHashSet::default();
        let mut res = Vec::new();
        for link in &self.incident_links {
            let c = nodes[link.to].community;
            if c != self.community && seen.insert(c) {
                res.push(c);
            }
        }
        res
    }
}

/// Node under construction from raw links. Links are appended one at a time, so the
/// out-degree is summed on demand instead of cached.
#[derive(Debug, Clone)]
pub(crate) struct NodeBuilder {
    pub community: usize,
    pub original_nodes: BTreeSet<NodeId>,
    pub incident_links: Vec<InternalLink>,
    pub self_loops_weight: f64,
}

impl NodeBuilder {
    pub fn new(community: usize, original: NodeId) -> Self {
        NodeBuilder {
            community,
            original_nodes: BTreeSet::from([original]),
            incident_links: Vec::new(),
            self_loops_weight: 0.0,
        }
    }

    #[cfg(test)]
    pub fn out_degree(&self) -> f64 {
        self.incident_links.iter().map(|l| l.weight).sum()
    }

    pub fn build(self) -> Node {
        Node::new(
            self.community,
            self.original_nodes,
            self.incident_links,
            self.self_loops_weight,
        )
    }
}
