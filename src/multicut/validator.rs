use super::graph::*;

/// A cut set is a multicut if every cut edge separates two different components.
pub fn is_valid_multicut(graph: &Graph) -> bool {
    graph
        .cut_edges()
        .all(|(_, e)| graph.component_id(e.from) != graph.component_id(e.to))
}

/// Cut edges whose endpoints are still connected through other uncut edges.
pub fn redundant_cuts(graph: &Graph) -> Vec<EdgeId> {
    graph
        .cut_edges()
        .filter(|(_, e)| graph.component_id(e.from) == graph.component_id(e.to))
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod test {
    use super::super::components::assign_connected_components;
    use super::*;

    fn triangle(cuts: &[EdgeId]) -> Graph {
        let mut graph = Graph::from_edges(3, [(0, 1, 1), (1, 2, 1), (0, 2, 1)], 2).unwrap();
        for &e in cuts {
            graph.edge_mut(e).unwrap().is_cut = true;
        }
        assign_connected_components(&mut graph);
        graph
    }

    #[test]
    fn triangle_scenarios() {
        assert!(is_valid_multicut(&triangle(&[])));

        let single = triangle(&[0]);
        assert!(!is_valid_multicut(&single));
        assert_eq!(redundant_cuts(&single), vec![0]);

        let double = triangle(&[0, 1]);
        assert!(is_valid_multicut(&double));
        assert!(redundant_cuts(&double).is_empty());

        assert!(is_valid_multicut(&triangle(&[0, 1, 2])));
    }

    #[test]
    fn cut_inside_component_is_redundant() {
        // square 0-1-2-3 with the diagonal 0-2; cutting 0-1 and 1-2 isolates node 1,
        // cutting the diagonal as well does not separate anything
        let mut graph = Graph::from_edges(
            4,
            [(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1), (0, 2, 1)],
            0,
        )
        .unwrap();
        for e in [0, 1, 4] {
            graph.edge_mut(e).unwrap().is_cut = true;
        }
        assign_connected_components(&mut graph);

        assert!(!is_valid_multicut(&graph));
        assert_eq!(redundant_cuts(&graph), vec![4]);
    }
}
