use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{
    components::{ComponentTracker, ComponentUpdate, ConsistencyError},
    cost::Cost,
    graph::*,
    score::{ScoreOrder, ScoreTracker},
    validator,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub score_order: ScoreOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Playing,
    Solved,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("edge {edge} does not exist")]
    UnknownEdge { edge: EdgeId },

    #[error("level is already solved")]
    AlreadySolved,

    #[error("session stopped after an earlier consistency failure")]
    Poisoned,

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

/// Receives the notifications a session emits towards the rest of the game.
pub trait SessionObserver {
    /// `graph.best_achieved_cost` was just improved.
    fn on_score_improved(&mut self, _graph: &Graph) {}

    fn on_solved(&mut self, _graph: &Graph) {}
}

impl SessionObserver for () {}

impl<O: SessionObserver + ?Sized> SessionObserver for &mut O {
    fn on_score_improved(&mut self, graph: &Graph) {
        (**self).on_score_improved(graph)
    }

    fn on_solved(&mut self, graph: &Graph) {
        (**self).on_solved(graph)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeState {
    pub from: NodeId,
    pub to: NodeId,
    pub cost: Cost,
    pub is_cut: bool,
    pub is_optimal_cut: bool,
    pub is_special: bool,
}

/// Outcome of a single toggle, for the caller to update its display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub edge: EdgeId,
    pub is_cut: bool,
    pub update: ComponentUpdate,
    pub score: Cost,
    pub valid: bool,
    pub improved: bool,
    pub state: SessionState,
}

pub struct Session<O = ()> {
    graph: Graph,
    components: ComponentTracker,
    score: ScoreTracker,
    state: SessionState,
    poisoned: bool,
    observer: O,
}

impl Session<()> {
    pub fn new(graph: Graph) -> Self {
        Self::with_observer(graph, SessionConfig::default(), ())
    }
}

impl<O: SessionObserver> Session<O> {
    pub fn with_observer(mut graph: Graph, config: SessionConfig, observer: O) -> Self {
        let components = ComponentTracker::new(&mut graph);
        let score = ScoreTracker::new(&graph, config.score_order);

        debug!(
            "Start session on level {:?}: {} nodes, {} edges, {} components, score {}",
            graph.name,
            graph.number_of_nodes(),
            graph.number_of_edges(),
            components.number_of_components(),
            score.current()
        );

        Self {
            graph,
            components,
            score,
            state: SessionState::Playing,
            poisoned: false,
            observer,
        }
    }

    /// Cuts or restores `edge` and re-evaluates the level.
    pub fn toggle_edge(&mut self, edge: EdgeId) -> Result<Toggle, SessionError> {
        if self.poisoned {
            return Err(SessionError::Poisoned);
        }

        if self.state == SessionState::Solved {
            return Err(SessionError::AlreadySolved);
        }

        let Some(e) = self.graph.edge_mut(edge) else {
            return Err(SessionError::UnknownEdge { edge });
        };
        e.is_cut = !e.is_cut;
        let (is_cut, cost) = (e.is_cut, e.cost);

        let update = match self.components.update(&mut self.graph, edge) {
            Ok(update) => update,
            Err(err) => {
                self.poisoned = true;
                return Err(err.into());
            }
        };

        self.score.apply(is_cut, cost);
        let valid = validator::is_valid_multicut(&self.graph);

        let mut improved = false;
        if valid && self.score.improves_best(&self.graph) {
            self.graph.best_achieved_cost = Some(self.score.current());
            improved = true;
            info!(
                "Level {:?}: new best cost {}",
                self.graph.name,
                self.score.current()
            );
            self.observer.on_score_improved(&self.graph);
        }

        if valid && self.score.matches_optimum(&self.graph) {
            self.state = SessionState::Solved;
            info!("Level {:?} solved with cost {}", self.graph.name, self.score.current());
            self.observer.on_solved(&self.graph);
        }

        debug!(
            "Toggle edge {edge} (cut: {is_cut}): {update:?}, score {}, valid {valid}",
            self.score.current()
        );

        Ok(Toggle {
            edge,
            is_cut,
            update,
            score: self.score.current(),
            valid,
            improved,
            state: self.state,
        })
    }

    /// Cuts every listed edge in order; stops at the first error.
    pub fn apply_cuts(
        &mut self,
        edges: impl IntoIterator<Item = EdgeId>,
    ) -> Result<Vec<Toggle>, SessionError> {
        edges.into_iter().map(|e| self.toggle_edge(e)).collect()
    }

    pub fn component_id(&self, node: NodeId) -> Option<ComponentId> {
        self.graph.component_id(node)
    }

    pub fn number_of_components(&self) -> usize {
        self.components.number_of_components()
    }

    pub fn current_score(&self) -> Cost {
        self.score.current()
    }

    pub fn display_score(&self) -> Cost {
        self.score.display_score()
    }

    pub fn is_valid_multicut(&self) -> bool {
        validator::is_valid_multicut(&self.graph)
    }

    pub fn redundant_cuts(&self) -> Vec<EdgeId> {
        validator::redundant_cuts(&self.graph)
    }

    pub fn edge_state(&self, edge: EdgeId) -> Option<EdgeState> {
        self.graph.edge(edge).map(|e| EdgeState {
            from: e.from,
            to: e.to,
            cost: e.cost,
            is_cut: e.is_cut,
            is_optimal_cut: e.is_optimal_cut,
            is_special: e.is_special,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}
