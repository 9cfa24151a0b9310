// Configuration module for reading Viper.toml
//
// All empirically tuned thresholds of the decision core live here so they
// can be adjusted without touching the algorithms.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub agent: AgentConfig,
    pub arena: ArenaConfig,
    pub risk: RiskConfig,
    pub history: HistoryConfig,
    pub strategy: StrategyConfig,
    pub debug: DebugConfig,
}

/// Agent identity reported on the info endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
}

/// Arena dimensions used when the start message omits them
#[derive(Debug, Deserialize, Clone)]
pub struct ArenaConfig {
    pub default_width: usize,
    pub default_height: usize,
}

/// Super-food risk override under toroidal traversal
///
/// A super-food sighting is recorded as a hazard (occupied) while the game
/// has not yet passed `late_game_step` and the snake's sight range exceeds
/// `sight_range_threshold`. The values are tuned, not derived.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RiskConfig {
    pub late_game_step: i32,
    pub sight_range_threshold: i32,
}

/// Bounded history and loop detection parameters
#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Capacity of the head/direction history buffers
    pub capacity: usize,
    /// Smallest repeated window length that counts as a loop
    pub loop_min_window: usize,
    /// How many recent head positions a loop break must avoid
    pub recent_window: usize,
}

/// Strategy thresholds
#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    /// Food is only safe when its component holds at least
    /// `food_safety_factor * body length` cells
    pub food_safety_factor: usize,
    /// Foreign snake groups below this size are ignored as debris
    pub kill_group_min_size: usize,
}

/// Debug tick-log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Viper.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Viper.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Viper.toml
    pub fn default_hardcoded() -> Self {
        Config {
            agent: AgentConfig {
                name: "gridviper".to_string(),
            },
            arena: ArenaConfig {
                default_width: 48,
                default_height: 24,
            },
            risk: RiskConfig {
                late_game_step: 2000,
                sight_range_threshold: 4,
            },
            history: HistoryConfig {
                capacity: 50,
                loop_min_window: 10,
                recent_window: 10,
            },
            strategy: StrategyConfig {
                food_safety_factor: 2,
                kill_group_min_size: 4,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "gridviper_ticks.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Viper.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.arena.default_width, 48);
        assert_eq!(config.arena.default_height, 24);
        assert_eq!(config.history.capacity, 50);
    }

    #[test]
    fn test_viper_toml_can_be_parsed() {
        let result = Config::from_file("Viper.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Viper.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Viper.toml").expect("Viper.toml should be parseable");
        let hardcoded = Config::default_hardcoded();

        assert_eq!(file_config.agent.name, hardcoded.agent.name);

        assert_eq!(
            file_config.arena.default_width,
            hardcoded.arena.default_width
        );
        assert_eq!(
            file_config.arena.default_height,
            hardcoded.arena.default_height
        );

        assert_eq!(file_config.risk.late_game_step, hardcoded.risk.late_game_step);
        assert_eq!(
            file_config.risk.sight_range_threshold,
            hardcoded.risk.sight_range_threshold
        );

        assert_eq!(file_config.history.capacity, hardcoded.history.capacity);
        assert_eq!(
            file_config.history.loop_min_window,
            hardcoded.history.loop_min_window
        );
        assert_eq!(
            file_config.history.recent_window,
            hardcoded.history.recent_window
        );

        assert_eq!(
            file_config.strategy.food_safety_factor,
            hardcoded.strategy.food_safety_factor
        );
        assert_eq!(
            file_config.strategy.kill_group_min_size,
            hardcoded.strategy.kill_group_min_size
        );

        assert_eq!(file_config.debug.enabled, hardcoded.debug.enabled);
        assert!(!file_config.debug.log_file_path.is_empty());
    }

    #[test]
    fn test_load_or_default_works() {
        let config = Config::load_or_default();
        assert_eq!(config.risk.late_game_step, 2000);
        assert_eq!(config.risk.sight_range_threshold, 4);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
