use crate::{CommunityId, NodeId};

/// Result alias for `louvain`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned when a caller-supplied partition does not fit the graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A node was assigned a negative community id.
    #[error("invalid partition: node {node} has negative community id {community}")]
    NegativeCommunity {
        /// Node carrying the bad id.
        node: NodeId,
        /// The negative community id.
        community: CommunityId,
    },

    /// The partition refers to a node that does not appear in any link.
    #[error("invalid partition: node {node} is not one of the graph's {node_count} nodes")]
    UnknownNode {
        /// The unknown node id.
        node: NodeId,
        /// Number of nodes in the graph.
        node_count: usize,
    },
}
