use crate::community::Community;
use crate::node::{InternalLink, Node, NodeBuilder};
use crate::{CommunityId, Link, NodeId};
use fxhash::FxHashMap;
use std::collections::BTreeMap;

/// One level of the coarsening hierarchy: the nodes of the level and the communities
/// partitioning them. Communities refer to nodes by index only, so a level is replaced
/// or snapshotted as a whole.
#[derive(Debug, Clone, Default)]
pub(crate) struct Level {
    pub nodes: Vec<Node>,
    pub communities: BTreeMap<usize, Community>,
}

impl Level {
    /// Finest level built from input links, with every node in its own community.
    pub fn from_links(links: &[Link]) -> Level {
        Level::from_nodes(build_nodes(links))
    }

    /// Level over `nodes` with one community per node.
    pub fn from_nodes(nodes: Vec<Node>) -> Level {
        let communities = (0..nodes.len()).map(|i| (i, Community::from_node(i, &nodes))).collect();
        Level { nodes, communities }
    }

    /// Finest level built from input links, with communities taken from `partition`.
    /// Community ids must be non-negative; nodes missing from `partition` are put in
    /// singleton communities numbered after the largest id in it.
    pub fn with_partition(links: &[Link], partition: &BTreeMap<NodeId, CommunityId>) -> Level {
        let mut nodes = build_nodes(links);
        let mut communities: BTreeMap<usize, Community> = BTreeMap::new();

        let index_of: FxHashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .flat_map(|(i, n)| n.original_nodes.iter().map(move |&id| (id, i)))
            .collect();

        let mut assigned = vec![false; nodes.len()];
        for (node, &community) in partition {
            let Some(&i) = index_of.get(node) else {
                continue;
            };
            let community = community as usize;
            communities.entry(community).or_default().add_node(i, &nodes);
            nodes[i].community = community;
            assigned[i] = true;
        }

        let mut next = partition.values().max().map_or(0, |&c| c as usize + 1);
        for i in 0..nodes.len() {
            if !assigned[i] {
                communities.entry(next).or_default().add_node(i, &nodes);
                nodes[i].community = next;
                next += 1;
            }
        }

        Level { nodes, communities }
    }

    pub fn num_communities(&self) -> usize {
        self.communities.len()
    }

    /// Half the total weight of the level, self loops included. Aggregation does not
    /// change it.
    pub fn graph_weight(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.incident_links.iter().map(|l| l.weight).sum::<f64>() + n.self_loops_weight)
            .sum::<f64>()
            / 2.0
    }

    /// Replace this level by the coarser one where each community is a single node.
    /// Communities are renumbered densely in map order.
    pub fn aggregate(&mut self) {
        for (new_index, community) in self.communities.values().enumerate() {
            for i in community.nodes() {
                self.nodes[i].community = new_index;
            }
        }

        let coarse = self
            .communities
            .values()
            .enumerate()
            .map(|(new_index, c)| c.to_louvain_node(new_index, &self.nodes))
            .collect();

        *self = Level::from_nodes(coarse);
    }

    /// Map every input node id to the id of the community holding it.
    pub fn resulting_communities(&self) -> BTreeMap<NodeId, CommunityId> {
        let mut res = BTreeMap::new();
        for (&id, community) in &self.communities {
            for i in community.nodes() {
                for &original in &self.nodes[i].original_nodes {
                    res.insert(original, id as CommunityId);
                }
            }
        }
        res
    }
}

/// One node per distinct endpoint, ordered by id. Self loops add twice their weight to the
/// node; other links add an entry at both ends, so parallel links accumulate.
fn build_nodes(links: &[Link]) -> Vec<Node> {
    let mut ids: Vec<NodeId> = links.iter().flat_map(|l| [l.source(), l.target()]).collect();
    ids.sort_unstable();
    ids.dedup();

    let index_of: FxHashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let mut builders: Vec<NodeBuilder> = ids
        .iter()
        .enumerate()
        .map(|(i, &id)| NodeBuilder::new(i, id))
        .collect();

    for link in links {
        let source = index_of[&link.source()];
        let target = index_of[&link.target()];
        if source == target {
            builders[source].self_loops_weight += 2.0 * link.weight();
        } else {
            builders[source].incident_links.push(InternalLink::new(target, link.weight()));
            builders[target].incident_links.push(InternalLink::new(source, link.weight()));
        }
    }

    builders.into_iter().map(NodeBuilder::build).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeSet;

    fn two_triangles() -> Vec<Link> {
        vec![
            Link::unweighted(10, 11),
            Link::unweighted(11, 12),
            Link::unweighted(12, 10),
            Link::unweighted(20, 21),
            Link::unweighted(21, 22),
            Link::unweighted(22, 20),
            Link::weighted(12, 20, 0.5),
        ]
    }

    #[test]
    fn test_build_nodes() {
        let links = vec![
            Link::unweighted(5, 3),
            Link::weighted(3, 5, 2.0),
            Link::weighted(9, 9, 1.5),
            Link::unweighted(9, 3),
        ];
        let nodes = build_nodes(&links);
        assert_eq!(nodes.len(), 3);

        // sorted by id: 3, 5, 9
        assert_eq!(nodes[0].original_nodes, BTreeSet::from([3]));
        assert_eq!(
            nodes[0].incident_links,
            vec![
                InternalLink::new(1, 1.0),
                InternalLink::new(1, 2.0),
                InternalLink::new(2, 1.0)
            ]
        );
        assert_eq!(nodes[1].out_degree(), 3.0);
        assert_eq!(nodes[2].self_loops_weight, 3.0);
        assert_eq!(nodes[2].degree(), 4.0);
        assert_eq!(nodes.iter().map(|n| n.community).collect::<Vec<_>>(), vec![0, 1, 2]);

        let level = Level::from_nodes(nodes);
        assert_eq!(level.graph_weight(), 5.5);
    }

    #[test]
    fn test_links_stay_symmetric() {
        let level = Level::from_links(&two_triangles());
        for (i, n) in level.nodes.iter().enumerate() {
            for l in &n.incident_links {
                let weight_between = |a: usize, b: usize| -> f64 {
                    level.nodes[a]
                        .incident_links
                        .iter()
                        .filter(|x| x.to == b)
                        .map(|x| x.weight)
                        .sum()
                };
                assert_eq!(weight_between(i, l.to), weight_between(l.to, i));
            }
        }
    }

    #[test]
    fn test_aggregate() {
        let links = two_triangles();
        let mut partition = BTreeMap::new();
        for id in [10, 11, 12] {
            partition.insert(id, 4);
        }
        for id in [20, 21, 22] {
            partition.insert(id, 9);
        }

        let mut level = Level::with_partition(&links, &partition);
        let m = level.graph_weight();
        assert_eq!(m, 6.5);
        assert_eq!(level.num_communities(), 2);

        level.aggregate();
        assert_eq!(level.nodes.len(), 2);
        assert_eq!(level.num_communities(), 2);
        assert_eq!(level.graph_weight(), m);

        let a = &level.nodes[0];
        assert_eq!(a.original_nodes, BTreeSet::from([10, 11, 12]));
        assert_eq!(a.self_loops_weight, 6.0);
        assert_eq!(a.incident_links, vec![InternalLink::new(1, 0.5)]);

        let result = level.resulting_communities();
        assert_eq!(result[&10], 0);
        assert_eq!(result[&22], 1);
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn test_partial_partition() {
        let links = two_triangles();
        let partition = BTreeMap::from([(10, 3), (11, 3)]);
        let level = Level::with_partition(&links, &partition);

        assert_eq!(level.num_communities(), 5);
        let result = level.resulting_communities();
        assert_eq!(result[&10], 3);
        assert_eq!(result[&11], 3);
        assert_eq!(result[&12], 4);
        assert_eq!(result[&22], 7);
    }
}
