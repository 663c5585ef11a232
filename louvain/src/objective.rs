use crate::level::Level;

/// Modularity of the partition of a level: the sum of each community's contribution,
/// `internal / 2m - (total / 2m)^2`, where `m` is the graph weight.
pub(crate) fn modularity(level: &Level, graph_weight: f64) -> f64 {
    level.communities.values().map(|c| c.modularity(graph_weight)).sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Link;
    use approx::assert_abs_diff_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_singletons_negative() {
        let links = vec![Link::unweighted(0, 1), Link::unweighted(1, 2), Link::unweighted(2, 0)];
        let level = Level::from_links(&links);
        let q = modularity(&level, level.graph_weight());
        assert_abs_diff_eq!(q, -1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_components() {
        let links = vec![Link::unweighted(0, 1), Link::unweighted(2, 3)];
        let partition = BTreeMap::from([(0, 0), (1, 0), (2, 1), (3, 1)]);
        let level = Level::with_partition(&links, &partition);
        assert_eq!(modularity(&level, level.graph_weight()), 0.5);
    }

    #[test]
    fn test_aggregation_keeps_modularity() {
        let links = vec![
            Link::weighted(0, 1, 2.0),
            Link::unweighted(1, 2),
            Link::weighted(2, 3, 3.0),
            Link::unweighted(3, 0),
            Link::weighted(3, 3, 0.5),
        ];
        let partition = BTreeMap::from([(0, 0), (1, 0), (2, 1), (3, 1)]);
        let mut level = Level::with_partition(&links, &partition);
        let m = level.graph_weight();
        let before = modularity(&level, m);

        level.aggregate();
        assert_abs_diff_eq!(modularity(&level, m), before, epsilon = 1e-12);
    }
}
