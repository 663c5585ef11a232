use crate::node::{InternalLink, Node};
use fxhash::{FxBuildHasher, FxHashMap};
use hashlink::LinkedHashSet;

/// A set of nodes of one level, with the weights needed for modularity kept up to date
/// as nodes come and go.
///
/// `self_loops_weight` is twice the weight of the edges inside the community (including
/// the members' own self loops) and `out_links_weight` is the weight of the edges leaving
/// it, so their sum is the total degree of the members.
#[derive(Debug, Clone)]
pub(crate) struct Community {
    self_loops_weight: f64,
    out_links_weight: f64,
    // members in insertion order, a removed node is appended again when re-added
    nodes: LinkedHashSet<usize, FxBuildHasher>,
}

impl Default for Community {
    fn default() -> Self {
        Community {
            self_loops_weight: 0.0,
            out_links_weight: 0.0,
            nodes: LinkedHashSet::with_hasher(FxBuildHasher::default()),
        }
    }
}

impl Community {
    /// Community holding the single node `index`.
    pub fn from_node(index: usize, nodes: &[Node]) -> Community {
        let node = &nodes[index];
        let mut community = Community {
            self_loops_weight: node.self_loops_weight,
            out_links_weight: node.out_degree(),
            ..Community::default()
        };
        community.nodes.insert(index);
        community
    }

    fn total_weights_sum(&self) -> f64 {
        self.self_loops_weight + self.out_links_weight
    }

    /// Member node indices in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.nodes.contains(&index)
    }

    pub fn add_node(&mut self, index: usize, nodes: &[Node]) {
        let node = &nodes[index];
        for link in &node.incident_links {
            if self.contains(link.to) {
                self.self_loops_weight += 2.0 * link.weight;
                self.out_links_weight -= link.weight;
            } else {
                self.out_links_weight += link.weight;
            }
        }
        self.self_loops_weight += node.self_loops_weight;
        self.nodes.insert(index);
    }

    /// Remove node `index`. Returns true if the community is now empty, in which case the
    /// caller must drop it.
    pub fn remove_node(&mut self, index: usize, nodes: &[Node]) -> bool {
        let node = &nodes[index];
        for link in &node.incident_links {
            if self.contains(link.to) {
                self.self_loops_weight -= 2.0 * link.weight;
                self.out_links_weight += link.weight;
            } else {
                self.out_links_weight -= link.weight;
            }
        }
        self.nodes.remove(&index);
        self.self_loops_weight -= node.self_loops_weight;
        self.nodes.is_empty()
    }

    /// Modularity gained by adding `node` to this community, up to the terms that are the
    /// same for every candidate community.
    pub fn modularity_change_if_node_added(&self, node: &Node, graph_weight: f64) -> f64 {
        (1.0 / graph_weight)
            * (self.weights_to_node(node) - self.total_weights_sum() * node.degree() / (2.0 * graph_weight))
    }

    fn weights_to_node(&self, node: &Node) -> f64 {
        node.incident_links
            .iter()
            .filter(|l| self.contains(l.to))
            .map(|l| l.weight)
            .sum()
    }

    /// Contribution of this community to the modularity of the partition.
    pub fn modularity(&self, graph_weight: f64) -> f64 {
        let total = self.total_weights_sum() / (2.0 * graph_weight);
        self.self_loops_weight / (2.0 * graph_weight) - total * total
    }

    /// Collapse the community into node `new_index` of the next level. Member nodes must
    /// already carry `new_index` as their community, and so must every other node of the
    /// level carry the index of its collapsed node.
    pub fn to_louvain_node(&self, new_index: usize, nodes: &[Node]) -> Node {
        let mut original_nodes = std::collections::BTreeSet::new();
        let mut self_loops_weight = 0.0;

        // summed weight per neighboring community, kept in first-seen order
        let mut links: Vec<InternalLink> = Vec::new();
        let mut link_pos: FxHashMap<usize, usize> = FxHashMap::default();

        for &i in self.nodes.iter() {
            let node = &nodes[i];
            original_nodes.extend(node.original_nodes.iter().copied());
            self_loops_weight += node.self_loops_weight;

            for link in &node.incident_links {
                let to = nodes[link.to].community;
                if to == new_index {
                    // seen once from each end, which doubles it
                    self_loops_weight += link.weight;
                } else if let Some(&pos) = link_pos.get(&to) {
                    links[pos].weight += link.weight;
                } else {
                    link_pos.insert(to, links.len());
                    links.push(InternalLink::new(to, link.weight));
                }
            }
        }

        Node::new(new_index, original_nodes, links, self_loops_weight)
    }

    /// Merging any two communities smaller than sqrt(2m) increases modularity, so a
    /// community above that threshold may hide several smaller ones.
    pub fn over_resolution_limit(&self, graph_weight: f64) -> bool {
        self.self_loops_weight >= (2.0 * graph_weight).sqrt()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::BTreeSet;

    // path 0 - 1 - 2 with unit weights, plus a self loop of weight 1 on node 2
    fn path() -> Vec<Node> {
        let l = |to| InternalLink::new(to, 1.0);
        vec![
            Node::new(0, BTreeSet::from([10]), vec![l(1)], 0.0),
            Node::new(1, BTreeSet::from([11]), vec![l(0), l(2)], 0.0),
            Node::new(2, BTreeSet::from([12]), vec![l(1)], 2.0),
        ]
    }

    #[test]
    fn test_add_remove() {
        let nodes = path();
        let mut c = Community::from_node(0, &nodes);
        assert_eq!(c.total_weights_sum(), 1.0);

        c.add_node(1, &nodes);
        assert_eq!(c.self_loops_weight, 2.0);
        assert_eq!(c.out_links_weight, 1.0);
        assert_eq!(c.nodes().collect::<Vec<_>>(), vec![0, 1]);

        c.add_node(2, &nodes);
        assert_eq!(c.self_loops_weight, 6.0);
        assert_eq!(c.out_links_weight, 0.0);

        assert!(!c.remove_node(1, &nodes));
        assert_eq!(c.nodes().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(c.self_loops_weight, 2.0);
        assert_eq!(c.out_links_weight, 2.0);

        assert!(!c.remove_node(0, &nodes));
        assert!(c.remove_node(2, &nodes));
        assert_eq!(c.nodes().count(), 0);
        assert_abs_diff_eq!(c.total_weights_sum(), 0.0);
    }

    #[test]
    fn test_readded_node_goes_last() {
        let nodes = path();
        let mut c = Community::from_node(0, &nodes);
        c.add_node(1, &nodes);
        c.add_node(2, &nodes);
        let before = (c.self_loops_weight, c.out_links_weight);

        assert!(!c.remove_node(0, &nodes));
        c.add_node(0, &nodes);
        assert_eq!(c.nodes().collect::<Vec<_>>(), vec![1, 2, 0]);
        assert_eq!((c.self_loops_weight, c.out_links_weight), before);
        assert!(c.contains(0));
    }

    #[test]
    fn test_modularity() {
        let nodes = path();
        // m = (1 + 2 + 1 + 2) / 2
        let m = 3.0;

        let mut c = Community::from_node(0, &nodes);
        c.add_node(1, &nodes);
        c.add_node(2, &nodes);
        assert_abs_diff_eq!(c.modularity(m), 0.0, epsilon = 1e-12);

        let single = Community::from_node(1, &nodes);
        assert_abs_diff_eq!(single.modularity(m), -(2.0f64 / 6.0).powi(2), epsilon = 1e-12);

        let c0 = Community::from_node(0, &nodes);
        // node 1 has one link into {0}: (1 - 1 * 2 / 6) / 3
        assert_abs_diff_eq!(
            c0.modularity_change_if_node_added(&nodes[1], m),
            (1.0 - 2.0 / 6.0) / 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_to_louvain_node() {
        let mut nodes = path();
        nodes[0].community = 0;
        nodes[1].community = 0;
        nodes[2].community = 1;

        let mut c = Community::from_node(0, &nodes);
        c.add_node(1, &nodes);

        let coarse = c.to_louvain_node(0, &nodes);
        assert_eq!(coarse.community, 0);
        assert_eq!(coarse.original_nodes, BTreeSet::from([10, 11]));
        assert_eq!(coarse.self_loops_weight, 2.0);
        assert_eq!(coarse.incident_links, vec![InternalLink::new(1, 1.0)]);
        assert_eq!(coarse.degree(), c.total_weights_sum());
    }

    #[test]
    fn test_over_resolution_limit() {
        let nodes = path();
        let mut c = Community::from_node(0, &nodes);
        c.add_node(1, &nodes);
        // sqrt(6) ~ 2.449
        assert!(!c.over_resolution_limit(3.0));
        c.add_node(2, &nodes);
        assert!(c.over_resolution_limit(3.0));
    }
}
