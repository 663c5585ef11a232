#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a node in the caller's graph.
pub type NodeId = i64;

/// Identifier of a community in a partition.
pub type CommunityId = i64;

/// One undirected input edge. Unweighted links count with weight 1.0.
///
/// With the `serde` feature, links use an internally tagged representation:
/// `{"type": "UnweightedLink", "source": 0, "target": 1}` or
/// `{"type": "WeightedLink", "source": 0, "target": 1, "weight": 0.5}`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "type"))]
pub enum Link {
    /// Edge with the implicit weight 1.0
    #[cfg_attr(feature = "serde", serde(rename = "UnweightedLink"))]
    Unweighted {
        /// One endpoint
        source: NodeId,
        /// The other endpoint
        target: NodeId,
    },
    /// Edge with an explicit positive weight
    #[cfg_attr(feature = "serde", serde(rename = "WeightedLink"))]
    Weighted {
        /// One endpoint
        source: NodeId,
        /// The other endpoint
        target: NodeId,
        /// Edge weight, expected to be > 0
        weight: f64,
    },
}

impl Link {
    /// Edge between `source` and `target` with weight 1.0
    pub fn unweighted(source: NodeId, target: NodeId) -> Link {
        Link::Unweighted { source, target }
    }

    /// Edge between `source` and `target` with the given weight
    pub fn weighted(source: NodeId, target: NodeId, weight: f64) -> Link {
        Link::Weighted { source, target, weight }
    }

    /// First endpoint of the link
    pub fn source(&self) -> NodeId {
        match *self {
            Link::Unweighted { source, .. } | Link::Weighted { source, .. } => source,
        }
    }

    /// Second endpoint of the link
    pub fn target(&self) -> NodeId {
        match *self {
            Link::Unweighted { target, .. } | Link::Weighted { target, .. } => target,
        }
    }

    /// Effective weight of the link
    pub fn weight(&self) -> f64 {
        match *self {
            Link::Unweighted { .. } => 1.0,
            Link::Weighted { weight, .. } => weight,
        }
    }

    /// True if both endpoints are the same node
    pub fn is_self_loop(&self) -> bool {
        self.source() == self.target()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_weights() {
        assert_eq!(Link::unweighted(0, 1).weight(), 1.0);
        assert_eq!(Link::weighted(0, 1, 2.5).weight(), 2.5);

        let l = Link::weighted(3, 7, 0.5);
        assert_eq!((l.source(), l.target()), (3, 7));
        assert!(!l.is_self_loop());
        assert!(Link::unweighted(4, 4).is_self_loop());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tagged_json() {
        let json = r#"[
            {"type": "UnweightedLink", "source": 0, "target": 1},
            {"type": "WeightedLink", "source": 1, "target": 2, "weight": 3.0}
        ]"#;
        let links: Vec<Link> = serde_json::from_str(json).unwrap();
        assert_eq!(links, vec![Link::unweighted(0, 1), Link::weighted(1, 2, 3.0)]);

        let out = serde_json::to_string(&links[0]).unwrap();
        assert_eq!(out, r#"{"type":"UnweightedLink","source":0,"target":1}"#);
    }
}
