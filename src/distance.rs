// Single-source BFS distance field
//
// Recomputed from the head once per tick before any strategy runs; every
// pathfinding decision in the engine reads hop distances from here.

use std::collections::VecDeque;

use crate::grid::GridStore;
use crate::types::Coord;

/// Shortest hop-distances from a single source over non-colliding cells.
/// `-1` marks unreachable cells. Valid for exactly one tick.
pub struct DistanceField {
    width: usize,
    height: usize,
    dist: Vec<i32>,
}

impl DistanceField {
    /// Runs a BFS from `source` using the same 4-neighbor relation as the
    /// component labeling. The source gets distance 0 even when its own
    /// cell is occupied (the head always is).
    pub fn compute(grid: &GridStore, source: Coord, traverse: bool) -> Self {
        let width = grid.width();
        let height = grid.height();
        let mut field = DistanceField {
            width,
            height,
            dist: vec![-1; width * height],
        };

        let start = grid.wrap(source);
        let start_idx = field.idx(start);
        field.dist[start_idx] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let current_dist = field.dist[field.idx(current)];
            for neighbor in grid.neighbors(current, traverse) {
                let ni = field.idx(neighbor);
                if field.dist[ni] == -1 && !grid.is_collision(neighbor, traverse) {
                    field.dist[ni] = current_dist + 1;
                    queue.push_back(neighbor);
                }
            }
        }

        field
    }

    fn idx(&self, pos: Coord) -> usize {
        pos.x as usize * self.height + pos.y as usize
    }

    /// Distance to a position, `-1` when unreachable. Coordinates wrap.
    pub fn get(&self, pos: Coord) -> i32 {
        let x = pos.x.rem_euclid(self.width as i32);
        let y = pos.y.rem_euclid(self.height as i32);
        self.dist[x as usize * self.height + y as usize]
    }

    pub fn is_reachable(&self, pos: Coord) -> bool {
        self.get(pos) != -1
    }
}
