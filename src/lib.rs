// Library exports for the gridviper agent
// Integration tests exercise the decision core through these modules

pub mod agent;
pub mod config;
pub mod debug_logger;
pub mod distance;
pub mod engine;
pub mod grid;
pub mod loop_guard;
pub mod state;
pub mod types;
