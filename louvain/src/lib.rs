//! Louvain community detection for weighted, undirected graphs, with recursive
//! refinement of communities hit by the resolution limit.
#![deny(missing_docs)]
#![deny(warnings)]

/// Input edges
pub mod link;

/// Errors for partitions supplied by callers
pub mod error;

/// Louvain clustering algorithm
pub mod louvain;

mod community;
mod level;
mod local_moving;
mod node;
mod objective;


pub use error::{Error, Result};
pub use link::{CommunityId, Link, NodeId};
pub use louvain::{Louvain, LouvainOptions, DEFAULT_DEPTH};
use std::collections::BTreeMap;

/// Approximate the partition of maximum modularity and map every node to its community.
///
/// If `depth != 0`, communities over the resolution limit are split further, up to
/// `depth` times recursively (without limit when negative).
pub fn get_partition(links: &[Link], depth: i32) -> BTreeMap<NodeId, CommunityId> {
    get_partition_with_options(links, depth, LouvainOptions::default())
}

/// [`get_partition`] with non-default [`LouvainOptions`].
pub fn get_partition_with_options(
    links: &[Link],
    depth: i32,
    options: LouvainOptions,
) -> BTreeMap<NodeId, CommunityId> {
    let mut louvain = Louvain::with_options(links, options);
    louvain.optimize_modularity(depth);
    louvain.resulting_communities()
}

/// Modularity of the graph given by `links` under `communities`. Without a partition
/// every node is its own community.
///
/// Fails if a community id is negative or a node id is not part of the graph.
pub fn compute_modularity(links: &[Link], communities: Option<&BTreeMap<NodeId, CommunityId>>) -> Result<f64> {
    let mut louvain = Louvain::new(links);
    if let Some(communities) = communities {
        louvain.assign_communities(communities)?;
    }
    Ok(louvain.modularity())
}
