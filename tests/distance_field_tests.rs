// Distance field and path reconstruction tests
//
// Checks the BFS shortest-path properties of the per-tick distance field
// and that backward path reconstruction walks single adjacency-respecting
// steps whose count equals the BFS distance, wraparound included.

use serde_json::json;
use std::collections::HashMap;

use gridviper::config::Config;
use gridviper::distance::DistanceField;
use gridviper::engine::path_direction_to;
use gridviper::grid::GridStore;
use gridviper::types::{Coord, Observation};

fn new_grid(width: usize, height: usize) -> GridStore {
    GridStore::new(width, height, None, Config::default_hardcoded().risk)
}

fn stones(grid: &mut GridStore, cells: &[(i32, i32)], traverse: bool) {
    let mut obs = Observation {
        traverse,
        ..Default::default()
    };
    for &(x, y) in cells {
        obs.sight
            .entry(x.to_string())
            .or_insert_with(HashMap::new)
            .insert(y.to_string(), json!(1));
    }
    grid.update(&obs, 1);
}

fn coord(x: i32, y: i32) -> Coord {
    Coord { x, y }
}

#[test]
fn test_source_distance_is_zero() {
    let grid = new_grid(5, 5);
    let field = DistanceField::compute(&grid, coord(2, 2), false);
    assert_eq!(field.get(coord(2, 2)), 0);
}

#[test]
fn test_unreachable_cells_are_minus_one() {
    let mut grid = new_grid(6, 4);
    // Seal off the (0,0) corner.
    stones(&mut grid, &[(1, 0), (0, 1), (1, 1)], false);

    let field = DistanceField::compute(&grid, coord(4, 2), false);
    assert_eq!(field.get(coord(0, 0)), -1);
    assert_eq!(field.get(coord(1, 0)), -1, "stones are never entered");
    assert!(field.is_reachable(coord(5, 3)));
}

/// Every reachable non-source cell sits exactly one step beyond some
/// non-colliding neighbor (BFS shortest-path property).
#[test]
fn test_bfs_shortest_path_property() {
    let mut grid = new_grid(7, 5);
    stones(&mut grid, &[(3, 0), (3, 1), (3, 2), (3, 3)], false);
    let source = coord(1, 2);
    let field = DistanceField::compute(&grid, source, false);

    for x in 0..7 {
        for y in 0..5 {
            let pos = coord(x, y);
            let d = field.get(pos);
            if d <= 0 {
                continue;
            }
            let min_neighbor = grid
                .neighbors(pos, false)
                .into_iter()
                .filter(|n| field.get(*n) != -1)
                .map(|n| field.get(n))
                .min()
                .expect("reachable cell must have a reachable neighbor");
            assert_eq!(d, min_neighbor + 1, "at {:?}", pos);
        }
    }

    // The wall forces the detour through its gap at y=4.
    assert_eq!(field.get(coord(4, 2)), 7);
}

#[test]
fn test_toroidal_distances_wrap() {
    let grid = new_grid(6, 4);
    let field = DistanceField::compute(&grid, coord(0, 0), true);
    assert_eq!(field.get(coord(5, 0)), 1);
    assert_eq!(field.get(coord(0, 3)), 1);
    assert_eq!(field.get(coord(3, 0)), 3);
}

/// Walking the reconstructed directions step by step reaches the goal in
/// exactly the BFS distance.
#[test]
fn test_path_walk_length_equals_bfs_distance() {
    let mut grid = new_grid(7, 5);
    stones(&mut grid, &[(3, 1), (3, 2), (3, 3), (3, 4)], false);
    let start = coord(1, 3);
    let goal = coord(5, 3);
    let field = DistanceField::compute(&grid, start, false);
    let expected = field.get(goal);
    assert!(expected > 0);

    // Re-anchor the field at every step, as the engine does each tick.
    let mut pos = start;
    let mut steps = 0;
    while pos != goal {
        let field = DistanceField::compute(&grid, pos, false);
        let dir = path_direction_to(&grid, &field, pos, goal, false)
            .expect("path must reconstruct from every intermediate cell");
        pos = grid.step_from(pos, dir, false).expect("steps stay on-grid");
        assert!(!grid.is_collision(pos, false), "path runs over free cells");
        steps += 1;
        assert!(steps <= expected, "path must not exceed the BFS distance");
    }
    assert_eq!(steps, expected);
}

/// A first step across the seam is normalized to a single-cell direction.
#[test]
fn test_wraparound_step_is_normalized() {
    let grid = new_grid(6, 4);
    let start = coord(0, 0);
    let field = DistanceField::compute(&grid, start, true);

    let west = path_direction_to(&grid, &field, start, coord(5, 0), true);
    assert_eq!(west.map(|d| d.as_str()), Some("west"));

    let north = path_direction_to(&grid, &field, start, coord(0, 3), true);
    assert_eq!(north.map(|d| d.as_str()), Some("north"));
}

#[test]
fn test_unreachable_goal_yields_no_direction() {
    let mut grid = new_grid(6, 4);
    stones(&mut grid, &[(1, 0), (0, 1), (1, 1)], false);
    let start = coord(4, 2);
    let field = DistanceField::compute(&grid, start, false);

    assert_eq!(path_direction_to(&grid, &field, start, coord(0, 0), false), None);
    // Goal equal to start also yields no direction; callers fall back.
    assert_eq!(path_direction_to(&grid, &field, start, start, false), None);
}
