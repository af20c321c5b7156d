use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cost::{self, Cost};

pub type NodeId = u32;
pub type EdgeId = usize;
pub type ComponentId = u32;
pub type NumNodes = usize;
pub type NumEdges = usize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    component_id: ComponentId,
}

impl Node {
    pub fn new(id: NodeId, position: Position) -> Self {
        Self {
            id,
            position,
            component_id: 0,
        }
    }

    pub fn component_id(&self) -> ComponentId {
        self.component_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Edge {
    #[serde(rename = "FromNodeId")]
    pub from: NodeId,
    #[serde(rename = "ToNodeId")]
    pub to: NodeId,
    #[serde(deserialize_with = "cost::deserialize")]
    pub cost: Cost,
    #[serde(default)]
    pub is_cut: bool,
    #[serde(default, rename = "OptimalCut")]
    pub is_optimal_cut: bool,
    #[serde(default)]
    pub is_special: bool,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, cost: Cost) -> Self {
        Self {
            from,
            to,
            cost,
            is_cut: false,
            is_optimal_cut: false,
            is_special: false,
        }
    }

    /// Endpoints ordered by node id; edges are undirected.
    pub fn normalized(&self) -> (NodeId, NodeId) {
        (self.from.min(self.to), self.from.max(self.to))
    }

    pub fn opposite(&self, u: NodeId) -> NodeId {
        if self.from == u {
            self.to
        } else {
            self.from
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge {edge} references unknown node id {node}")]
    UnknownNodeId { edge: EdgeId, node: NodeId },

    #[error("node id {node} appears more than once")]
    DuplicateNodeId { node: NodeId },

    #[error("edge {edge} connects node {node} with itself")]
    SelfLoop { edge: EdgeId, node: NodeId },

    #[error("absolute edge costs sum beyond {max}", max = Cost::MAX)]
    CostOverflow,
}

/// Serialized form of a node, as written by the level generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeData {
    pub id: NodeId,
    #[serde(default)]
    pub position: Position,
}

/// Serialized form of a level. Converting it into a [`Graph`] validates node references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphData {
    pub nodes: Vec<NodeData>,
    pub edges: Vec<Edge>,
    #[serde(deserialize_with = "cost::deserialize")]
    pub optimal_cost: Cost,
    #[serde(
        default,
        deserialize_with = "cost::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub best_achieved_cost: Option<Cost>,
    #[serde(default)]
    pub difficulty: f32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_of: HashMap<NodeId, usize>,

    pub optimal_cost: Cost,
    pub best_achieved_cost: Option<Cost>,
    pub difficulty: f32,
    pub name: String,
    pub created_at: String,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, optimal_cost: Cost) -> Result<Self, GraphError> {
        let mut index_of = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            if index_of.insert(node.id, idx).is_some() {
                return Err(GraphError::DuplicateNodeId { node: node.id });
            }
        }

        for (edge_id, edge) in edges.iter().enumerate() {
            for node in [edge.from, edge.to] {
                if !index_of.contains_key(&node) {
                    return Err(GraphError::UnknownNodeId {
                        edge: edge_id,
                        node,
                    });
                }
            }

            if edge.from == edge.to {
                return Err(GraphError::SelfLoop {
                    edge: edge_id,
                    node: edge.from,
                });
            }
        }

        // every partial score and its negation then stay within Cost
        let total_cost = edges
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.cost.unsigned_abs()));
        if !total_cost.is_some_and(|total| total <= Cost::MAX as u64) {
            return Err(GraphError::CostOverflow);
        }

        Ok(Self {
            nodes,
            edges,
            index_of,
            optimal_cost,
            best_achieved_cost: None,
            difficulty: 0.0,
            name: String::new(),
            created_at: String::new(),
        })
    }

    /// Builds a graph with nodes `0..n` at the origin; mostly useful for generated or test instances.
    pub fn from_edges(
        n: NumNodes,
        edges: impl IntoIterator<Item = (NodeId, NodeId, Cost)>,
        optimal_cost: Cost,
    ) -> Result<Self, GraphError> {
        let nodes = (0..n as NodeId)
            .map(|id| Node::new(id, Position::default()))
            .collect();
        let edges = edges
            .into_iter()
            .map(|(u, v, cost)| Edge::new(u, v, cost))
            .collect();

        Self::new(nodes, edges, optimal_cost)
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.nodes.len()
    }

    pub fn number_of_edges(&self) -> NumEdges {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_of.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Position of the node in [`Graph::nodes`].
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    pub fn component_id(&self, id: NodeId) -> Option<ComponentId> {
        self.node(id).map(Node::component_id)
    }

    pub fn cut_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter().enumerate().filter(|(_, e)| e.is_cut)
    }

    pub fn nodes_in_components<'a>(
        &'a self,
        component_ids: &'a [ComponentId],
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |n| component_ids.contains(&n.component_id))
    }

    /// Copies the nodes labelled with one of `component_ids` and all edges between them.
    /// Node ids are preserved, so results computed on the copy can be written back by id.
    pub fn filter_subgraph(&self, component_ids: &[ComponentId]) -> Graph {
        let nodes: Vec<Node> = self.nodes_in_components(component_ids).cloned().collect();
        let index_of: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();

        let edges = self
            .edges
            .iter()
            .filter(|e| index_of.contains_key(&e.from) && index_of.contains_key(&e.to))
            .cloned()
            .collect();

        Graph {
            nodes,
            edges,
            index_of,
            optimal_cost: self.optimal_cost,
            best_achieved_cost: self.best_achieved_cost,
            difficulty: self.difficulty,
            name: self.name.clone(),
            created_at: self.created_at.clone(),
        }
    }

    /// True once the best achieved cost matches the optimum.
    pub fn is_completed(&self) -> bool {
        self.best_achieved_cost == Some(self.optimal_cost)
    }

    pub(crate) fn set_component_id(&mut self, id: NodeId, component: ComponentId) {
        if let Some(&idx) = self.index_of.get(&id) {
            self.nodes[idx].component_id = component;
        }
    }

    pub(crate) fn set_component_at(&mut self, idx: usize, component: ComponentId) {
        self.nodes[idx].component_id = component;
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }
}

impl TryFrom<GraphData> for Graph {
    type Error = GraphError;

    fn try_from(data: GraphData) -> Result<Self, Self::Error> {
        let nodes = data
            .nodes
            .into_iter()
            .map(|n| Node::new(n.id, n.position))
            .collect();

        let mut graph = Graph::new(nodes, data.edges, data.optimal_cost)?;
        graph.best_achieved_cost = data.best_achieved_cost;
        graph.difficulty = data.difficulty;
        graph.name = data.name;
        graph.created_at = data.created_at;
        Ok(graph)
    }
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        Self {
            nodes: graph
                .nodes
                .into_iter()
                .map(|n| NodeData {
                    id: n.id,
                    position: n.position,
                })
                .collect(),
            edges: graph.edges,
            optimal_cost: graph.optimal_cost,
            best_achieved_cost: graph.best_achieved_cost,
            difficulty: graph.difficulty,
            name: graph.name,
            created_at: graph.created_at,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn path_graph() -> Graph {
        Graph::from_edges(4, [(0, 1, 1), (1, 2, -2), (2, 3, 1)], -2).unwrap()
    }

    #[test]
    fn rejects_unknown_node() {
        let err = Graph::from_edges(3, [(0, 1, 1), (1, 5, 1)], 0).unwrap_err();
        assert_eq!(err, GraphError::UnknownNodeId { edge: 1, node: 5 });
    }

    #[test]
    fn rejects_duplicate_node_and_self_loop() {
        let nodes = vec![
            Node::new(3, Position::default()),
            Node::new(3, Position::default()),
        ];
        assert_eq!(
            Graph::new(nodes, vec![], 0).unwrap_err(),
            GraphError::DuplicateNodeId { node: 3 }
        );

        assert_eq!(
            Graph::from_edges(2, [(1, 1, 1)], 0).unwrap_err(),
            GraphError::SelfLoop { edge: 0, node: 1 }
        );
    }

    #[test]
    fn cost_sum_must_fit() {
        let max = Cost::MAX;
        assert!(Graph::from_edges(3, [(0, 1, max - 1), (1, 2, 1)], 0).is_ok());
        assert!(Graph::from_edges(3, [(0, 1, -max), (1, 2, 0)], 0).is_ok());

        for edges in [[(0, 1, max), (1, 2, max)], [(0, 1, max), (1, 2, -1)], [(0, 1, Cost::MIN), (1, 2, 0)]] {
            assert_eq!(
                Graph::from_edges(3, edges, 0).unwrap_err(),
                GraphError::CostOverflow
            );
        }
    }

    #[test]
    fn lookup_by_sparse_ids() {
        let nodes = vec![
            Node::new(10, Position { x: 1.0, y: 2.0 }),
            Node::new(4, Position::default()),
        ];
        let graph = Graph::new(nodes, vec![Edge::new(4, 10, 3)], 3).unwrap();

        assert_eq!(graph.node(10).unwrap().position, Position { x: 1.0, y: 2.0 });
        assert_eq!(graph.node_index(4), Some(1));
        assert!(graph.node(0).is_none());
        assert_eq!(graph.edge(0).unwrap().opposite(4), 10);
        assert_eq!(graph.edge(0).unwrap().normalized(), (4, 10));
    }

    #[test]
    fn filter_subgraph_copies_and_keeps_ids() {
        let mut graph = path_graph();
        graph.set_component_id(2, 1);
        graph.set_component_id(3, 1);
        graph.edge_mut(1).unwrap().is_cut = true;

        let mut sub = graph.filter_subgraph(&[1]);
        assert_eq!(
            sub.nodes().iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(sub.edges(), &[Edge::new(2, 3, 1)]);

        sub.set_component_id(2, 7);
        assert_eq!(graph.component_id(2), Some(1));
        assert_eq!(
            graph
                .nodes_in_components(&[0])
                .map(|n| n.id)
                .collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn parse_generator_output() {
        let json = r#"{
            "Nodes": [
                {"Id": 0, "Position": {"x": 0.5, "y": 1.5}},
                {"Id": 1, "Position": {"x": 2.0, "y": 0.0}}
            ],
            "Edges": [
                {"FromNodeId": 0, "ToNodeId": 1, "Cost": -2, "IsCut": false, "OptimalCut": true}
            ],
            "OptimalCost": -2.0
        }"#;

        let graph: Graph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.optimal_cost, -2);
        assert_eq!(graph.best_achieved_cost, None);
        assert!(graph.edges()[0].is_optimal_cut);
        assert!(!graph.edges()[0].is_special);
        assert!(!graph.is_completed());

        let written = serde_json::to_value(&graph).unwrap();
        assert_eq!(written["OptimalCost"], -2);
        assert_eq!(written["Edges"][0]["FromNodeId"], 0);
        assert!(written.get("BestAchievedCost").is_none());
    }

    #[test]
    fn parse_rejects_dangling_edge() {
        let json = r#"{
            "Nodes": [{"Id": 0}],
            "Edges": [{"FromNodeId": 0, "ToNodeId": 1, "Cost": 1}],
            "OptimalCost": 0
        }"#;

        let err = serde_json::from_str::<Graph>(json).unwrap_err();
        assert!(err.to_string().contains("unknown node id 1"));
    }
}
