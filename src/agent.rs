// Per-game agent and its Rocket-managed wrapper
//
// The Agent owns the three core pieces for one game: the grid knowledge
// store, the state classifier and the decision engine. One observation in,
// exactly one direction out, synchronously, tick by tick.

use log::info;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::engine::DecisionEngine;
use crate::grid::GridStore;
use crate::state::StateClassifier;
use crate::types::{AgentState, ArenaInit, Direction, Observation};

/// The decision core for a single game.
pub struct Agent {
    grid: GridStore,
    classifier: StateClassifier,
    engine: DecisionEngine,
}

impl Agent {
    /// Builds an agent from the arena handshake; dimensions and starting
    /// map fall back to configured defaults when the handshake omits them.
    pub fn new(config: &Config, init: Option<&ArenaInit>) -> Self {
        let (width, height) = init
            .and_then(|i| i.size)
            .map(|s| (s[0], s[1]))
            .unwrap_or((config.arena.default_width, config.arena.default_height));
        let map = init.and_then(|i| i.map.as_ref());

        Agent {
            grid: GridStore::new(width, height, map, config.risk),
            classifier: StateClassifier::new(),
            engine: DecisionEngine::new(config),
        }
    }

    /// Runs one full decision cycle: fuse the observation, classify, decide.
    pub fn handle_tick(&mut self, obs: &Observation) -> (Direction, AgentState) {
        self.grid.update(obs, obs.step);
        let state = self.classifier.evaluate(&self.grid, obs);
        let direction = self.engine.decide(&self.grid, state, obs);
        (direction, state)
    }

    pub fn grid(&self) -> &GridStore {
        &self.grid
    }
}

/// Rocket managed state: configuration plus the current game's agent.
///
/// The agent sits behind a mutex because Rocket shares managed state across
/// handlers; the arena protocol itself is strictly turn-based, so the lock
/// is never contended in practice.
pub struct AgentService {
    config: Config,
    debug: DebugLogger,
    agent: Mutex<Option<Agent>>,
}

impl AgentService {
    pub fn new(config: Config, debug: DebugLogger) -> Self {
        AgentService {
            config,
            debug,
            agent: Mutex::new(None),
        }
    }

    /// Agent metadata for the info endpoint.
    pub fn info(&self) -> Value {
        json!({
            "name": self.config.agent.name,
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    /// Called when a game starts: builds a fresh agent for the arena.
    pub fn start(&self, init: &ArenaInit) {
        info!("GAME START");
        *self.agent.lock() = Some(Agent::new(&self.config, Some(init)));
    }

    /// Called each tick: computes the move and encodes the key command.
    pub fn tick(&self, obs: &Observation) -> Value {
        let mut guard = self.agent.lock();
        // A move before any start message plays on a default arena.
        let agent = guard.get_or_insert_with(|| Agent::new(&self.config, None));

        let (direction, state) = agent.handle_tick(obs);

        info!(
            "step {}: state {} -> {}",
            obs.step,
            state.as_str(),
            direction.as_str()
        );
        self.debug
            .log_tick(obs.step, state, direction, obs.head(), obs.score);

        json!({ "cmd": "key", "key": direction.as_key() })
    }

    /// Called when a game ends.
    pub fn end(&self) {
        info!("GAME OVER");
        *self.agent.lock() = None;
    }
}
