// Per-tick decision engine
//
// Turns the belief map and the tick's distance field into a single safe,
// goal-directed move. Strategies are dispatched over the coarse agent state
// and each returns an explicit Option; any miss funnels into the fallback,
// so the engine always emits exactly one direction per tick.

use log::debug;
use rand::seq::IndexedRandom;
use std::collections::{HashSet, VecDeque};

use crate::config::Config;
use crate::distance::DistanceField;
use crate::grid::GridStore;
use crate::loop_guard::LoopGuard;
use crate::types::{AgentState, Coord, Direction, Observation, Tile};

/// Reconstructs the first step of a shortest path from `start` to `goal` by
/// walking the distance field backward from the goal.
///
/// At each step the four directions are probed in fixed order for a
/// neighbor whose distance is exactly one less; first match wins. A broken
/// reconstruction (no decreasing neighbor) yields None, which callers must
/// treat as "no path" — never as an error. Under toroidal traversal the
/// first-step delta is normalized back to a single-cell step before it is
/// mapped to a direction.
pub fn path_direction_to(
    grid: &GridStore,
    field: &DistanceField,
    start: Coord,
    goal: Coord,
    traverse: bool,
) -> Option<Direction> {
    if !field.is_reachable(goal) {
        return None;
    }

    let mut path: Vec<Coord> = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        let current_dist = field.get(current);
        if current_dist == 0 {
            break;
        }

        let mut found_prev = false;
        for dir in Direction::all().iter() {
            let (dx, dy) = dir.delta();
            let candidate = Coord {
                x: current.x - dx,
                y: current.y - dy,
            };
            let prev = if traverse {
                grid.wrap(candidate)
            } else {
                if !grid.in_bounds(candidate) {
                    continue;
                }
                candidate
            };
            if field.get(prev) == current_dist - 1 {
                current = prev;
                found_prev = true;
                break;
            }
        }
        if !found_prev {
            return None;
        }
    }

    path.reverse();
    let mut next = *path.first()?;
    if next == start {
        if path.len() > 1 {
            next = path[1];
        } else {
            return None;
        }
    }

    let mut dx = next.x - start.x;
    let mut dy = next.y - start.y;
    if traverse {
        // A step across the seam shows up as a near-full-width jump.
        if dx.abs() > 1 {
            dx -= dx.signum() * grid.width() as i32;
        }
        if dy.abs() > 1 {
            dy -= dy.signum() * grid.height() as i32;
        }
    }

    Direction::all()
        .iter()
        .find(|d| d.delta() == (dx, dy))
        .copied()
}

/// The per-tick control loop: loop check, state dispatch, fallback, and
/// history bookkeeping. Owns the bounded head/direction histories.
pub struct DecisionEngine {
    loop_guard: LoopGuard,
    history_capacity: usize,
    recent_window: usize,
    food_safety_factor: usize,
    kill_group_min_size: usize,
    direction_history: VecDeque<Direction>,
    head_history: VecDeque<Coord>,
}

impl DecisionEngine {
    pub fn new(config: &Config) -> Self {
        DecisionEngine {
            loop_guard: LoopGuard::new(config.history.loop_min_window),
            history_capacity: config.history.capacity,
            recent_window: config.history.recent_window,
            food_safety_factor: config.strategy.food_safety_factor,
            kill_group_min_size: config.strategy.kill_group_min_size,
            direction_history: VecDeque::new(),
            head_history: VecDeque::new(),
        }
    }

    /// Decides the move for one tick. Always returns a direction.
    pub fn decide(&mut self, grid: &GridStore, state: AgentState, obs: &Observation) -> Direction {
        let head = match obs.head() {
            Some(h) => h,
            None => {
                // Nothing to reason from; still owe the server a command.
                let dir = *Direction::all()
                    .choose(&mut rand::rng())
                    .unwrap_or(&Direction::North);
                self.record(dir, None);
                return dir;
            }
        };
        let traverse = obs.traverse;

        let field = DistanceField::compute(grid, head, traverse);

        let attempted = if self.loop_guard.detect(&self.head_history) {
            debug!("step {}: head cycle detected, breaking loop", obs.step);
            self.break_loop(grid, obs, head)
        } else {
            match state {
                AgentState::Danger => self.avoid_danger(grid, &field, obs, head),
                AgentState::Targeting => self.navigate_to_food(grid, &field, obs, head),
                AgentState::Safe => self
                    .attempt_kill(grid, &field, obs, head)
                    .or_else(|| self.explore(grid, &field, obs, head)),
            }
        };

        let direction = attempted.unwrap_or_else(|| self.safe_move(grid, obs, head));
        self.record(direction, Some(head));
        direction
    }

    fn record(&mut self, direction: Direction, head: Option<Coord>) {
        self.direction_history.push_back(direction);
        if self.direction_history.len() > self.history_capacity {
            self.direction_history.pop_front();
        }
        if let Some(h) = head {
            self.head_history.push_back(h);
            if self.head_history.len() > self.history_capacity {
                self.head_history.pop_front();
            }
        }
    }

    /// Escapes a detected cycle: moves to a legal, non-colliding cell not
    /// among the recently visited head positions whose component can hold
    /// the whole body, ranked by (component size, free exits) descending.
    fn break_loop(&self, grid: &GridStore, obs: &Observation, head: Coord) -> Option<Direction> {
        let recent: HashSet<Coord> = self
            .head_history
            .iter()
            .rev()
            .take(self.recent_window)
            .copied()
            .collect();
        let length = obs.length();

        let mut candidates: Vec<(usize, usize, Direction)> = Vec::new();
        for dir in Direction::all().iter() {
            let next = match grid.step_from(head, *dir, obs.traverse) {
                Some(n) => n,
                None => continue,
            };
            if recent.contains(&next) || grid.is_collision(next, obs.traverse) {
                continue;
            }
            let component = grid.component_size_at(next);
            if component >= length {
                candidates.push((component, grid.free_exits(next, obs.traverse), *dir));
            }
        }

        candidates.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        candidates.first().map(|c| c.2)
    }

    /// Picks the reachable neighbor with the most free exits whose
    /// component can hold the body. Stable sort keeps probe order among
    /// equal exit counts.
    fn avoid_danger(
        &self,
        grid: &GridStore,
        field: &DistanceField,
        obs: &Observation,
        head: Coord,
    ) -> Option<Direction> {
        let length = obs.length();

        let mut candidates: Vec<(usize, Direction)> = Vec::new();
        for dir in Direction::all().iter() {
            let next = match grid.step_from(head, *dir, obs.traverse) {
                Some(n) => n,
                None => continue,
            };
            if field.is_reachable(next) && grid.component_size_at(next) >= length {
                candidates.push((grid.free_exits(next, obs.traverse), *dir));
            }
        }

        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        candidates.first().map(|&(_, dir)| dir)
    }

    /// Heads for the closest safe food cell. Food is safe only when its
    /// component holds at least `food_safety_factor` times the body length;
    /// eating inside a pocket too small to escape from is worse than
    /// skipping the meal. No safe food in reach delegates to exploration.
    fn navigate_to_food(
        &self,
        grid: &GridStore,
        field: &DistanceField,
        obs: &Observation,
        head: Coord,
    ) -> Option<Direction> {
        let required = obs.length().saturating_mul(self.food_safety_factor);

        let mut best: Option<(i32, Coord)> = None;
        for x in 0..grid.width() as i32 {
            for y in 0..grid.height() as i32 {
                let pos = Coord { x, y };
                if !grid.tile_at(pos).is_food() {
                    continue;
                }
                if grid.component_size_at(pos) < required {
                    continue;
                }
                let d = field.get(pos);
                if d == -1 {
                    continue;
                }
                match best {
                    Some((best_dist, _)) if best_dist <= d => {}
                    _ => best = Some((d, pos)),
                }
            }
        }

        match best {
            Some((_, food)) => path_direction_to(grid, field, head, food, obs.traverse),
            None => self.explore(grid, field, obs, head),
        }
    }

    /// Tries to intercept another snake: groups foreign occupied cells and
    /// paths toward the nearest cell of any group big enough to matter.
    ///
    /// Grouping uses plain bounds-checked 4-adjacency even under toroidal
    /// traversal; segments touching only across the seam stay separate
    /// groups (preserved as observed, see DESIGN.md).
    fn attempt_kill(
        &self,
        grid: &GridStore,
        field: &DistanceField,
        obs: &Observation,
        head: Coord,
    ) -> Option<Direction> {
        let own_body: HashSet<Coord> = obs.body.iter().copied().collect();
        let width = grid.width() as i32;
        let height = grid.height() as i32;

        let mut visited: HashSet<Coord> = HashSet::new();
        let mut best: Option<(i32, Coord)> = None;

        for x in 0..width {
            for y in 0..height {
                let start = Coord { x, y };
                if visited.contains(&start)
                    || grid.tile_at(start) != Tile::Snake
                    || own_body.contains(&start)
                {
                    continue;
                }

                let mut queue = VecDeque::new();
                queue.push_back(start);
                visited.insert(start);
                let mut group = vec![start];

                while let Some(current) = queue.pop_front() {
                    for dir in Direction::all().iter() {
                        let (dx, dy) = dir.delta();
                        let n = Coord {
                            x: current.x + dx,
                            y: current.y + dy,
                        };
                        if n.x < 0 || n.x >= width || n.y < 0 || n.y >= height {
                            continue;
                        }
                        if visited.contains(&n) {
                            continue;
                        }
                        if grid.tile_at(n) == Tile::Snake && !own_body.contains(&n) {
                            visited.insert(n);
                            queue.push_back(n);
                            group.push(n);
                        }
                    }
                }

                // Small groups are debris or stubs, not worth intercepting.
                if group.len() < self.kill_group_min_size {
                    continue;
                }
                for pos in group {
                    let d = field.get(pos);
                    if d == -1 {
                        continue;
                    }
                    match best {
                        Some((best_dist, _)) if best_dist <= d => {}
                        _ => best = Some((d, pos)),
                    }
                }
            }
        }

        let (_, target) = best?;
        path_direction_to(grid, field, head, target, obs.traverse)
    }

    /// Frontier-seeking: paths toward the reachable cell with the stalest
    /// observation (highest `step - last_seen`).
    fn explore(
        &self,
        grid: &GridStore,
        field: &DistanceField,
        obs: &Observation,
        head: Coord,
    ) -> Option<Direction> {
        let mut best_score: i64 = -1;
        let mut best_tile: Option<Coord> = None;

        for x in 0..grid.width() as i32 {
            for y in 0..grid.height() as i32 {
                let pos = Coord { x, y };
                if !field.is_reachable(pos) {
                    continue;
                }
                let score = i64::from(obs.step) - i64::from(grid.last_seen_at(pos));
                if score > best_score {
                    best_score = score;
                    best_tile = Some(pos);
                }
            }
        }

        match best_tile {
            Some(tile) if tile != head => path_direction_to(grid, field, head, tile, obs.traverse),
            _ => None,
        }
    }

    /// Last-line move selection; always returns a direction.
    ///
    /// Pass 1: non-reversing moves into a component that can hold the body,
    /// ranked by (component size, free exits). Pass 2: any non-reversing,
    /// non-colliding move, chosen at random among equals. Pass 3: the
    /// reversal itself. Last resort: any of the four directions.
    fn safe_move(&self, grid: &GridStore, obs: &Observation, head: Coord) -> Direction {
        let reversal = self.direction_history.back().map(|d| d.opposite());
        let length = obs.length();
        let traverse = obs.traverse;
        let mut rng = rand::rng();

        let mut ranked: Vec<(usize, usize, Direction)> = Vec::new();
        for dir in Direction::all().iter() {
            if Some(*dir) == reversal {
                continue;
            }
            let next = match grid.step_from(head, *dir, traverse) {
                Some(n) => n,
                None => continue,
            };
            if grid.is_collision(next, traverse) {
                continue;
            }
            let component = grid.component_size_at(next);
            if component >= length {
                ranked.push((component, grid.free_exits(next, traverse), *dir));
            }
        }
        if !ranked.is_empty() {
            ranked.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
            return ranked[0].2;
        }

        let open: Vec<Direction> = Direction::all()
            .iter()
            .filter(|d| Some(**d) != reversal)
            .filter_map(|d| grid.step_from(head, *d, traverse).map(|n| (*d, n)))
            .filter(|(_, n)| !grid.is_collision(*n, traverse))
            .map(|(d, _)| d)
            .collect();
        if let Some(dir) = open.choose(&mut rng) {
            return *dir;
        }

        if let Some(dir) = reversal {
            return dir;
        }

        *Direction::all()
            .choose(&mut rng)
            .unwrap_or(&Direction::North)
    }
}
