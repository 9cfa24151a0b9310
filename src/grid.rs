// Grid knowledge store
//
// Fuses partial per-tick observations into a persistent belief map of the
// arena, tracks when each cell was last written, and maintains connected
// component labels plus a per-tick collision memo. Everything the strategies
// know about the world comes from here.

use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::RiskConfig;
use crate::types::{Coord, Direction, Observation, Tile};

/// One cell of the belief map: what we believe is there and when we last
/// wrote it (own body, sight update, or construction default).
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub tile: Tile,
    pub last_seen: i32,
}

/// Persistent belief map with component structure.
///
/// Dimensions are fixed at construction. The component labeling and the
/// collision memo are rebuilt/cleared wholesale on every update; occupancy
/// and traversal mode can change arbitrarily between ticks, so nothing
/// stale may survive a tick boundary.
pub struct GridStore {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    component_id: Vec<i32>,
    component_size: HashMap<i32, usize>,
    // Per-tick cache only; cleared at the top of every update.
    collision_memo: Mutex<HashMap<(Coord, bool), bool>>,
    risk: RiskConfig,
}

impl GridStore {
    /// Creates a store of fixed dimensions, optionally seeded with the
    /// starting map (column-major wire tile values). Unknown tile values
    /// fall back to passage.
    pub fn new(width: usize, height: usize, map: Option<&Vec<Vec<u64>>>, risk: RiskConfig) -> Self {
        let mut cells = vec![
            Cell {
                tile: Tile::Passage,
                last_seen: 0,
            };
            width * height
        ];

        if let Some(map) = map {
            for (x, column) in map.iter().enumerate().take(width) {
                for (y, value) in column.iter().enumerate().take(height) {
                    if let Some(tile) = Tile::from_value(*value) {
                        cells[x * height + y].tile = tile;
                    }
                }
            }
        }

        GridStore {
            width,
            height,
            cells,
            component_id: vec![-1; width * height],
            component_size: HashMap::new(),
            collision_memo: Mutex::new(HashMap::new()),
            risk,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn idx(&self, pos: Coord) -> usize {
        pos.x as usize * self.height + pos.y as usize
    }

    pub fn in_bounds(&self, pos: Coord) -> bool {
        pos.x >= 0 && (pos.x as usize) < self.width && pos.y >= 0 && (pos.y as usize) < self.height
    }

    /// Wraps a coordinate onto the grid (toroidal indexing).
    pub fn wrap(&self, pos: Coord) -> Coord {
        Coord {
            x: pos.x.rem_euclid(self.width as i32),
            y: pos.y.rem_euclid(self.height as i32),
        }
    }

    /// Believed tile at a position. Out-of-range coordinates are wrapped;
    /// bounded-mode callers must bounds-check first.
    pub fn tile_at(&self, pos: Coord) -> Tile {
        let p = self.wrap(pos);
        self.cells[self.idx(p)].tile
    }

    /// Tick at which a cell was last written.
    pub fn last_seen_at(&self, pos: Coord) -> i32 {
        let p = self.wrap(pos);
        self.cells[self.idx(p)].last_seen
    }

    /// Fuses an observation into the belief map and rebuilds the component
    /// structure under the observation's traversal mode.
    ///
    /// Malformed sight entries (non-integer keys or values, unknown tile
    /// values, out-of-range coordinates) are skipped individually; the rest
    /// of the update proceeds.
    pub fn update(&mut self, obs: &Observation, tick: i32) {
        self.collision_memo.lock().clear();

        for part in &obs.body {
            if self.in_bounds(*part) {
                let i = self.idx(*part);
                self.cells[i] = Cell {
                    tile: Tile::Snake,
                    last_seen: tick,
                };
            } else {
                debug!("skipping out-of-range body segment {:?}", part);
            }
        }

        for (col_key, rows) in &obs.sight {
            let col: i32 = match col_key.parse() {
                Ok(c) => c,
                Err(_) => {
                    debug!("skipping sight column with non-integer key {:?}", col_key);
                    continue;
                }
            };
            for (row_key, raw) in rows {
                let row: i32 = match row_key.parse() {
                    Ok(r) => r,
                    Err(_) => {
                        debug!("skipping sight row with non-integer key {:?}", row_key);
                        continue;
                    }
                };
                let tile = match raw.as_u64().and_then(Tile::from_value) {
                    Some(t) => t,
                    None => {
                        debug!("skipping sight entry with invalid tile value {:?}", raw);
                        continue;
                    }
                };
                let pos = Coord { x: col, y: row };
                if !self.in_bounds(pos) {
                    debug!("skipping out-of-range sight entry at {:?}", pos);
                    continue;
                }

                let recorded = self.apply_risk_override(tile, obs);
                let i = self.idx(pos);
                self.cells[i] = Cell {
                    tile: recorded,
                    last_seen: tick,
                };
            }
        }

        self.compute_components(obs.traverse);
    }

    // Under toroidal traversal a super food is reinterpreted as a hazard
    // early in the game once the sight range has grown past the threshold:
    // a fast snake should not detour for risky pickups it no longer needs.
    fn apply_risk_override(&self, tile: Tile, obs: &Observation) -> Tile {
        if obs.traverse && tile == Tile::Super {
            if obs.step > self.risk.late_game_step {
                Tile::Super
            } else if obs.range > self.risk.sight_range_threshold {
                Tile::Snake
            } else {
                Tile::Super
            }
        } else {
            tile
        }
    }

    /// Full flood-fill relabeling of the grid under the given traversal
    /// mode. Every non-colliding cell receives a label; cells reachable
    /// from each other share one. O(width * height).
    pub fn compute_components(&mut self, traverse: bool) {
        for label in self.component_id.iter_mut() {
            *label = -1;
        }
        self.component_size.clear();

        let mut label_counter = 0;
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                let start = Coord { x, y };
                let start_idx = self.idx(start);
                if self.component_id[start_idx] != -1 || self.is_collision(start, traverse) {
                    continue;
                }

                let mut queue = VecDeque::new();
                queue.push_back(start);
                self.component_id[start_idx] = label_counter;
                let mut cells_in_component = 1usize;

                while let Some(current) = queue.pop_front() {
                    for neighbor in self.neighbors(current, traverse) {
                        let ni = self.idx(neighbor);
                        if self.component_id[ni] == -1 && !self.is_collision(neighbor, traverse) {
                            self.component_id[ni] = label_counter;
                            queue.push_back(neighbor);
                            cells_in_component += 1;
                        }
                    }
                }

                self.component_size.insert(label_counter, cells_in_component);
                label_counter += 1;
            }
        }
    }

    /// In-grid 4-neighbors of a position: wrapped under toroidal mode,
    /// bounds-filtered otherwise.
    pub fn neighbors(&self, pos: Coord, traverse: bool) -> Vec<Coord> {
        let mut result = Vec::with_capacity(4);
        for dir in Direction::all().iter() {
            if let Some(next) = self.step_from(pos, *dir, traverse) {
                result.push(next);
            }
        }
        result
    }

    /// The cell reached by stepping from `pos` in `dir`, or None when the
    /// step leaves a bounded grid.
    pub fn step_from(&self, pos: Coord, dir: Direction, traverse: bool) -> Option<Coord> {
        let (dx, dy) = dir.delta();
        let next = Coord {
            x: pos.x + dx,
            y: pos.y + dy,
        };
        if traverse {
            Some(self.wrap(next))
        } else if self.in_bounds(next) {
            Some(next)
        } else {
            None
        }
    }

    /// Whether moving onto a position collides. Memoized per tick.
    ///
    /// Bounded mode: off-grid, stone and snake cells collide. Toroidal
    /// mode: coordinates wrap and only snake bodies collide.
    pub fn is_collision(&self, pos: Coord, traverse: bool) -> bool {
        let key = (pos, traverse);
        if let Some(&hit) = self.collision_memo.lock().get(&key) {
            return hit;
        }

        let result = if traverse {
            self.tile_at(pos) == Tile::Snake
        } else if !self.in_bounds(pos) {
            true
        } else {
            matches!(self.tile_at(pos), Tile::Stone | Tile::Snake)
        };

        self.collision_memo.lock().insert(key, result);
        result
    }

    /// Number of non-colliding neighbors of a position.
    pub fn free_exits(&self, pos: Coord, traverse: bool) -> usize {
        self.neighbors(pos, traverse)
            .into_iter()
            .filter(|n| !self.is_collision(*n, traverse))
            .count()
    }

    /// True when any immediate neighbor of the head is a collision that is
    /// not part of the snake's own trailing body, or is off-grid in bounded
    /// mode.
    pub fn is_danger_nearby(&self, obs: &Observation) -> bool {
        let head = match obs.head() {
            Some(h) => h,
            None => return false,
        };
        let own_body: HashSet<Coord> = obs.body.iter().skip(1).copied().collect();

        for dir in Direction::all().iter() {
            let (dx, dy) = dir.delta();
            let next = Coord {
                x: head.x + dx,
                y: head.y + dy,
            };
            if obs.traverse {
                let wrapped = self.wrap(next);
                if own_body.contains(&wrapped) {
                    continue;
                }
                if self.tile_at(wrapped) == Tile::Snake {
                    return true;
                }
            } else {
                if own_body.contains(&next) {
                    continue;
                }
                if !self.in_bounds(next) {
                    return true;
                }
                if self.is_collision(next, false) {
                    return true;
                }
            }
        }

        false
    }

    /// True if any cell currently holds food or super food.
    pub fn has_food(&self) -> bool {
        self.cells.iter().any(|c| c.tile.is_food())
    }

    /// Size of the connected component containing `pos`, or 0 when the
    /// position itself is a collision cell and carries no label.
    pub fn component_size_at(&self, pos: Coord) -> usize {
        match self.component_label_at(pos) {
            Some(label) => self.component_size.get(&label).copied().unwrap_or(0),
            None => 0,
        }
    }

    /// Component label of a position, if it has one.
    pub fn component_label_at(&self, pos: Coord) -> Option<i32> {
        if !self.in_bounds(pos) {
            return None;
        }
        let label = self.component_id[self.idx(pos)];
        if label == -1 {
            None
        } else {
            Some(label)
        }
    }
}
