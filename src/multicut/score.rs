use serde::{Deserialize, Serialize};

use super::{cost::Cost, graph::Graph};

/// Which direction counts as an improvement of a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(test, derive(strum::EnumIter))]
pub enum ScoreOrder {
    /// Raw score is the sum of cut costs and the optimum is the minimum.
    #[default]
    LowerIsBetter,
    HigherIsBetter,
}

impl ScoreOrder {
    pub fn is_better(self, candidate: Cost, reference: Cost) -> bool {
        match self {
            ScoreOrder::LowerIsBetter => candidate < reference,
            ScoreOrder::HigherIsBetter => candidate > reference,
        }
    }

    /// `best` being `None` means nothing was achieved yet, so any score improves on it.
    pub fn improves_on(self, candidate: Cost, best: Option<Cost>) -> bool {
        best.map_or(true, |best| self.is_better(candidate, best))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTracker {
    current: Cost,
    order: ScoreOrder,
}

impl ScoreTracker {
    pub fn new(graph: &Graph, order: ScoreOrder) -> Self {
        Self {
            current: graph.cut_edges().map(|(_, e)| e.cost).sum(),
            order,
        }
    }

    pub fn apply(&mut self, is_cut: bool, cost: Cost) {
        if is_cut {
            self.current += cost;
        } else {
            self.current -= cost;
        }
    }

    pub fn current(&self) -> Cost {
        self.current
    }

    /// Score as shown to players: under the minimizing convention larger is nicer to read.
    pub fn display_score(&self) -> Cost {
        match self.order {
            ScoreOrder::LowerIsBetter => -self.current,
            ScoreOrder::HigherIsBetter => self.current,
        }
    }

    pub fn order(&self) -> ScoreOrder {
        self.order
    }

    pub fn matches_optimum(&self, graph: &Graph) -> bool {
        self.current == graph.optimal_cost
    }

    pub fn improves_best(&self, graph: &Graph) -> bool {
        self.order.improves_on(self.current, graph.best_achieved_cost)
    }
}
