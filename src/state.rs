// Coarse behavioral state classification
//
// Priority order, recomputed every tick: danger beats targeting beats safe.

use crate::grid::GridStore;
use crate::types::{AgentState, Observation};

/// Maps current grid knowledge to one of the coarse behavioral states.
pub struct StateClassifier {
    current_state: AgentState,
}

impl StateClassifier {
    pub fn new() -> Self {
        StateClassifier {
            current_state: AgentState::Safe,
        }
    }

    /// Evaluates and stores the state for the current tick.
    pub fn evaluate(&mut self, grid: &GridStore, obs: &Observation) -> AgentState {
        self.current_state = if grid.is_danger_nearby(obs) {
            AgentState::Danger
        } else if grid.has_food() {
            AgentState::Targeting
        } else {
            AgentState::Safe
        };

        self.current_state
    }

    pub fn current(&self) -> AgentState {
        self.current_state
    }
}

impl Default for StateClassifier {
    fn default() -> Self {
        Self::new()
    }
}
