use crate::level::Level;
use crate::local_moving::LocalMoving;
use crate::objective::modularity;
use crate::{CommunityId, Error, Link, NodeId, Result};
use fxhash::{FxHashMap, FxHashSet};
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Default refinement depth: no refinement.
pub const DEFAULT_DEPTH: i32 = 0;

/// Tuning knobs for [`Louvain`] that do not change the partition it finds, unless a
/// sweep limit cuts local moving short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LouvainOptions {
    /// Upper bound on local-moving sweeps per level. `None` sweeps until no node moves.
    pub max_sweeps: Option<usize>,
    /// Run the refinement of sibling communities on the rayon thread pool. Results are
    /// merged in the same order as the sequential path, so the partition is identical.
    pub parallel_refinement: bool,
}

/// Perform the Louvain clustering algorithm on a list of links
pub struct Louvain {
    links: Vec<Link>,
    pub(crate) level: Level,
    graph_weight: f64,
    original_nodes_number: usize,
    options: LouvainOptions,
}

impl Louvain {
    /// Build the graph from `links` with every node in its own community.
    pub fn new(links: &[Link]) -> Louvain {
        Louvain::with_options(links, LouvainOptions::default())
    }

    /// Like [`Louvain::new`], with non-default options.
    pub fn with_options(links: &[Link], options: LouvainOptions) -> Louvain {
        let level = Level::from_links(links);
        let graph_weight = level.graph_weight();
        Louvain {
            links: links.to_vec(),
            original_nodes_number: level.nodes.len(),
            level,
            graph_weight,
            options,
        }
    }

    /// Number of distinct nodes in the input links
    pub fn num_nodes(&self) -> usize {
        self.original_nodes_number
    }

    /// Number of communities in the current partition
    pub fn num_communities(&self) -> usize {
        self.level.num_communities()
    }

    /// Modularity of the current partition
    pub fn modularity(&self) -> f64 {
        modularity(&self.level, self.graph_weight)
    }

    /// Alternate local moving and aggregation until the number of communities stops
    /// shrinking, then keep the partition with the best modularity seen.
    ///
    /// If `depth != 0`, communities that are large enough to hide smaller ones are split
    /// further by running the algorithm again on each of them, `depth` levels deep.
    /// A negative `depth` refines until no community can be split.
    pub fn optimize_modularity(&mut self, depth: i32) {
        let local_moving = LocalMoving::new(self.graph_weight, self.options.max_sweeps);

        let mut best_modularity = self.modularity();
        let mut best_level = self.level.clone();
        debug!(
            "louvain starting with {} nodes, modularity: {:.6}",
            self.original_nodes_number, best_modularity
        );

        for level in 1.. {
            let from = self.level.num_communities();
            local_moving.iterate(&mut self.level);
            self.level.aggregate();

            let new_modularity = self.modularity();
            debug!(
                "level {level}: {} communities, modularity: {new_modularity:.6}",
                self.level.num_communities()
            );
            if new_modularity > best_modularity {
                best_modularity = new_modularity;
                best_level = self.level.clone();
            }

            if self.level.num_communities() == from {
                break;
            }
        }

        self.level = best_level;
        debug!(
            "louvain final: {} communities, modularity: {:.6}",
            self.level.num_communities(),
            best_modularity
        );

        if self.level.num_communities() != 1 && depth != 0 {
            self.refine(depth);
        }
    }

    /// Map every input node id to its community id.
    pub fn resulting_communities(&self) -> BTreeMap<NodeId, CommunityId> {
        self.level.resulting_communities()
    }

    /// Replace the current partition with `communities`. Nodes missing from the map are
    /// placed in their own communities, numbered after the largest id in the map.
    ///
    /// Fails without changing anything if a community id is negative or a node id is not
    /// part of the graph.
    pub fn assign_communities(&mut self, communities: &BTreeMap<NodeId, CommunityId>) -> Result<()> {
        let known: FxHashSet<NodeId> = self.links.iter().flat_map(|l| [l.source(), l.target()]).collect();

        for (&node, &community) in communities {
            if community < 0 {
                return Err(Error::NegativeCommunity { node, community });
            }
            if !known.contains(&node) {
                return Err(Error::UnknownNode {
                    node,
                    node_count: self.original_nodes_number,
                });
            }
        }

        self.level = Level::with_partition(&self.links, communities);
        Ok(())
    }

    /// Split communities over the resolution limit by clustering the links inside each of
    /// them on their own, then rebuild the finest level from the merged partition.
    ///
    /// A sub-community 0 keeps the id of the community it came from; any other
    /// sub-community `k` becomes `k + max`, where `max` is the largest id in use when that
    /// community is merged.
    fn refine(&mut self, depth: i32) {
        let mut communities_map = self.resulting_communities();

        // links inside each community, grouped in order of first appearance
        let mut groups: Vec<(CommunityId, Vec<Link>)> = Vec::new();
        let mut group_of: FxHashMap<CommunityId, usize> = FxHashMap::default();
        for link in &self.links {
            let source = communities_map[&link.source()];
            if source != communities_map[&link.target()] {
                continue;
            }
            let slot = *group_of.entry(source).or_insert_with(|| {
                groups.push((source, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(*link);
        }

        groups.retain(|(community, _)| {
            self.level.communities[&(*community as usize)].over_resolution_limit(self.graph_weight)
        });
        debug!(
            "refining {} of {} communities, depth: {depth}",
            groups.len(),
            self.level.num_communities()
        );

        let sub_depth = depth.saturating_sub(1);
        let options = self.options;
        let partitions: Vec<(CommunityId, BTreeMap<NodeId, CommunityId>)> = if options.parallel_refinement {
            groups
                .par_iter()
                .map(|(community, links)| (*community, sub_partition(links, sub_depth, options)))
                .collect()
        } else {
            groups
                .iter()
                .map(|(community, links)| (*community, sub_partition(links, sub_depth, options)))
                .collect()
        };

        let split = merge_sub_partitions(&mut communities_map, partitions);
        debug!("refinement split {split} communities");

        self.level = Level::with_partition(&self.links, &communities_map);
    }
}

/// Fold the partitions of refined communities back into `communities_map`, in order.
/// Sub-community 0 keeps the id of the community it came from; any other sub-community
/// `k` becomes `k + max`, where `max` is the largest id in the map before that
/// community's partition is merged. Returns the number of communities that were split.
fn merge_sub_partitions(
    communities_map: &mut BTreeMap<NodeId, CommunityId>,
    partitions: Vec<(CommunityId, BTreeMap<NodeId, CommunityId>)>,
) -> usize {
    let mut split = 0;
    for (community, partition) in partitions {
        let offset = communities_map.values().copied().max().unwrap_or(0);
        if partition.values().any(|&c| c != 0) {
            split += 1;
        }
        for (node, sub_community) in partition {
            let merged = if sub_community == 0 {
                community
            } else {
                sub_community + offset
            };
            communities_map.insert(node, merged);
        }
    }
    split
}

fn sub_partition(links: &[Link], depth: i32, options: LouvainOptions) -> BTreeMap<NodeId, CommunityId> {
    let mut louvain = Louvain::with_options(links, options);
    louvain.optimize_modularity(depth);
    louvain.resulting_communities()
}
