use crate::level::Level;
use log::{debug, warn};

/// Greedy local moving of nodes between neighboring communities of one level.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LocalMoving {
    graph_weight: f64,
    max_sweeps: Option<usize>,
}

impl LocalMoving {
    pub fn new(graph_weight: f64, max_sweeps: Option<usize>) -> Self {
        LocalMoving {
            graph_weight,
            max_sweeps,
        }
    }

    /// Sweep over the nodes in index order, moving each one to the neighboring community
    /// with the largest positive modularity gain, until a whole sweep moves nothing.
    /// Returns true if any node changed community.
    pub fn iterate(&self, level: &mut Level) -> bool {
        let mut update = false;
        let mut sweeps = 0;

        loop {
            if self.max_sweeps.is_some_and(|max| sweeps >= max) {
                warn!("local moving stopped after {sweeps} sweeps without converging");
                break;
            }
            sweeps += 1;

            let mut moved = 0;
            for i in 0..level.nodes.len() {
                let current = level.nodes[i].community;
                let cost_of_moving_out = self.cost_of_moving_out(level, i);

                /*
                 * Keep the current community unless another one gives a strictly
                 * positive net gain. Among equal gains the first neighbor seen wins.
                 */
                let mut best_community = current;
                let mut max_delta = 0.0;
                let node = &level.nodes[i];
                for c in node.neighbour_communities(&level.nodes) {
                    let delta = level.communities[&c].modularity_change_if_node_added(node, self.graph_weight)
                        - cost_of_moving_out;
                    if delta > max_delta {
                        best_community = c;
                        max_delta = delta;
                    }
                }

                if best_community != current {
                    move_node(level, i, best_community);
                    moved += 1;
                }
            }

            debug!("sweep {sweeps}: moved {moved} of {} nodes", level.nodes.len());
            if moved == 0 {
                break;
            }
            update = true;
        }

        update
    }

    /// Modularity lost by taking node `index` out of its community: remove it, measure the
    /// gain of adding it back, and put it back.
    fn cost_of_moving_out(&self, level: &mut Level, index: usize) -> f64 {
        let Level { nodes, communities } = level;
        let community = communities
            .get_mut(&nodes[index].community)
            .expect("node assigned to a missing community");
        community.remove_node(index, nodes);
        let cost = community.modularity_change_if_node_added(&nodes[index], self.graph_weight);
        community.add_node(index, nodes);
        cost
    }
}

fn move_node(level: &mut Level, index: usize, to: usize) {
    let Level { nodes, communities } = level;
    let from = nodes[index].community;
    let from_community = communities
        .get_mut(&from)
        .expect("node assigned to a missing community");
    if from_community.remove_node(index, nodes) {
        communities.remove(&from);
    }

    nodes[index].community = to;
    communities
        .get_mut(&to)
        .expect("moving node to a missing community")
        .add_node(index, nodes);
}
