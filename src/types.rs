// Arena protocol types
//
// The snakes arena sends one JSON observation per tick and expects one
// key command back. Coordinates travel as [x, y] pairs; the sight patch
// travels with string keys (column -> row -> tile value) and may contain
// garbage, so it is decoded leniently and validated during map fusion.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 2D grid coordinate. Serialized as a two-element array to match the wire.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl From<[i32; 2]> for Coord {
    fn from(v: [i32; 2]) -> Self {
        Coord { x: v[0], y: v[1] }
    }
}

impl From<Coord> for [i32; 2] {
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

/// The four possible movement directions.
///
/// The arena origin is the top-left corner, so North decreases y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All directions in the fixed probe order used for tie-breaking.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }

    /// The (dx, dy) step for this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }

    /// Key command encoding expected by the arena server.
    pub fn as_key(&self) -> &'static str {
        match self {
            Direction::North => "w",
            Direction::South => "s",
            Direction::West => "a",
            Direction::East => "d",
        }
    }
}

/// Tile kinds with the wire values used by the arena map and sight patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Passage,
    Stone,
    Food,
    Super,
    Snake,
}

impl Tile {
    /// Decodes a wire tile value. Unknown values are rejected so malformed
    /// sight entries can be skipped instead of corrupting the belief map.
    pub fn from_value(v: u64) -> Option<Tile> {
        match v {
            0 => Some(Tile::Passage),
            1 => Some(Tile::Stone),
            2 => Some(Tile::Food),
            3 => Some(Tile::Super),
            4 => Some(Tile::Snake),
            _ => None,
        }
    }

    pub fn is_food(&self) -> bool {
        matches!(self, Tile::Food | Tile::Super)
    }
}

fn default_traverse() -> bool {
    true
}

/// Per-tick observation of the controlling snake.
///
/// Absent fields default the same way the arena client treats them: numeric
/// fields to zero, traversal to wrapping.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Observation {
    #[serde(default)]
    pub name: String,
    /// Body segments, head first.
    #[serde(default)]
    pub body: Vec<Coord>,
    /// Current sight radius. Only feeds the super-food risk override.
    #[serde(default)]
    pub range: i32,
    /// Sparse visibility patch: column -> row -> tile value. Keys are
    /// strings on the wire; values are kept raw until fusion validates them.
    #[serde(default)]
    pub sight: HashMap<String, HashMap<String, Value>>,
    /// Monotonically increasing tick counter.
    #[serde(default)]
    pub step: i32,
    #[serde(default)]
    pub score: i32,
    /// True when the arena allows wraparound traversal.
    #[serde(default = "default_traverse")]
    pub traverse: bool,
}

impl Observation {
    pub fn head(&self) -> Option<Coord> {
        self.body.first().copied()
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }
}

/// Arena handshake payload delivered when a game starts.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ArenaInit {
    /// Arena dimensions as (width, height).
    #[serde(default)]
    pub size: Option<[usize; 2]>,
    /// Starting map, column-major: map[x][y] is a tile wire value.
    #[serde(default)]
    pub map: Option<Vec<Vec<u64>>>,
}

/// Coarse behavioral state, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Danger,
    Targeting,
    Safe,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Danger => "danger",
            AgentState::Targeting => "targeting",
            AgentState::Safe => "safe",
        }
    }
}
