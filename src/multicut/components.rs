use std::collections::{BTreeSet, VecDeque};

use thiserror::Error;
use tracing::{error, trace};

use super::graph::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("toggling edge {edge} left {count} components among labels {id1} and {id2}")]
    UnexpectedComponentCount {
        edge: EdgeId,
        id1: ComponentId,
        id2: ComponentId,
        count: usize,
    },

    #[error("toggling edge {edge} separated nodes already labelled {id1} and {id2}")]
    SplitAcrossComponents {
        edge: EdgeId,
        id1: ComponentId,
        id2: ComponentId,
    },

    #[error("toggled edge {edge} does not exist")]
    UnknownEdge { edge: EdgeId },
}

/// Effect of a single toggle on the component labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentUpdate {
    Unchanged,
    Merged {
        kept: ComponentId,
        retired: ComponentId,
    },
    Split {
        kept: ComponentId,
        created: ComponentId,
    },
}

/// Labels every node with its connected component over the uncut edges.
/// Ids are assigned 0, 1, ... in the order components are discovered when scanning nodes.
pub fn assign_connected_components(graph: &mut Graph) -> usize {
    let n = graph.number_of_nodes();

    let mut adjlist = vec![Vec::new(); n];
    for edge in graph.edges().iter().filter(|e| !e.is_cut) {
        // node ids were checked at construction
        let (Some(u), Some(v)) = (graph.node_index(edge.from), graph.node_index(edge.to)) else {
            continue;
        };
        adjlist[u].push(v);
        adjlist[v].push(u);
    }

    let mut labels: Vec<Option<ComponentId>> = vec![None; n];
    let mut queue = VecDeque::new();
    let mut num_components = 0;

    for start in 0..n {
        if labels[start].is_some() {
            continue;
        }

        let component = num_components as ComponentId;
        labels[start] = Some(component);
        queue.push_back(start);

        while let Some(u) = queue.pop_front() {
            for &v in &adjlist[u] {
                if labels[v].is_none() {
                    labels[v] = Some(component);
                    queue.push_back(v);
                }
            }
        }

        num_components += 1;
    }

    for (idx, label) in labels.into_iter().enumerate() {
        graph.set_component_at(idx, label.unwrap_or_default());
    }

    num_components
}

/// Keeps component ids stable across toggles by only relabelling the two components
/// bordering the toggled edge.
#[derive(Debug, Clone, Default)]
pub struct ComponentTracker {
    in_use: BTreeSet<ComponentId>,
}

impl ComponentTracker {
    /// Runs a full labelling of `graph` and starts tracking its ids.
    pub fn new(graph: &mut Graph) -> Self {
        let num_components = assign_connected_components(graph);
        Self {
            in_use: (0..num_components as ComponentId).collect(),
        }
    }

    pub fn number_of_components(&self) -> usize {
        self.in_use.len()
    }

    pub fn ids_in_use(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.in_use.iter().copied()
    }

    fn smallest_unused(&self) -> ComponentId {
        (0..)
            .zip(self.in_use.iter())
            .find(|&(expected, &used)| expected != used)
            .map_or(self.in_use.len() as ComponentId, |(expected, _)| expected)
    }

    /// Updates the labelling after `edge` flipped its cut state.
    pub fn update(
        &mut self,
        graph: &mut Graph,
        edge: EdgeId,
    ) -> Result<ComponentUpdate, ConsistencyError> {
        let (from, to) = graph
            .edge(edge)
            .map(|e| (e.from, e.to))
            .ok_or(ConsistencyError::UnknownEdge { edge })?;

        let (Some(a), Some(b)) = (graph.component_id(from), graph.component_id(to)) else {
            return Err(ConsistencyError::UnknownEdge { edge });
        };
        let (id1, id2) = (a.min(b), a.max(b));

        let mut subgraph = graph.filter_subgraph(&[id1, id2]);
        let count = assign_connected_components(&mut subgraph);
        trace!("edge {edge}: {count} component(s) among labels {id1} and {id2}");

        let result = match count {
            1 if id1 == id2 => Ok(ComponentUpdate::Unchanged),
            1 => {
                for node in subgraph.nodes() {
                    graph.set_component_id(node.id, id1);
                }
                self.in_use.remove(&id2);

                Ok(ComponentUpdate::Merged {
                    kept: id1,
                    retired: id2,
                })
            }
            2 if id1 == id2 => {
                let created = self.smallest_unused();
                for node in subgraph.nodes() {
                    let label = if node.component_id() == 0 { id1 } else { created };
                    graph.set_component_id(node.id, label);
                }
                self.in_use.insert(created);

                Ok(ComponentUpdate::Split { kept: id1, created })
            }
            2 => Err(ConsistencyError::SplitAcrossComponents { edge, id1, id2 }),
            count => Err(ConsistencyError::UnexpectedComponentCount {
                edge,
                id1,
                id2,
                count,
            }),
        };

        if let Err(e) = &result {
            error!("Component labelling is corrupt: {e}");
        }

        result
    }
}
