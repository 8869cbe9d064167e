//! # Main-Path Walker
//!
//! Builds the spine of the dungeon: a constrained random walk from the grid
//! center that refuses to backtrack and avoids crowded cells.

use crate::generation::utils;
use crate::{config, Direction, GenerationConfig, GridPos, Room, RoomGraph};
use log::{trace, warn};
use rand::rngs::StdRng;
use std::collections::HashSet;

/// Places a freshly sized room at `pos`. Returns false if the cell was taken.
pub(crate) fn place_room(
    graph: &mut RoomGraph,
    pos: GridPos,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> bool {
    if graph.contains(pos) {
        return false;
    }
    let (width, height) = utils::roll_room_size(config, rng);
    let mut room = Room::new(config.canvas_width, config.canvas_height);
    room.build_centered(width, height);
    graph.insert(pos, room)
}

/// Walks `config.main_path_length` steps from the grid center.
///
/// Returns the path log, start included. A cell can appear more than once
/// when the walk crosses itself; use [`unique_path`] for a simple path.
pub fn walk_main_path(
    graph: &mut RoomGraph,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> Vec<GridPos> {
    let start = graph.center();
    place_room(graph, start, config, rng);

    let mut path = vec![start];
    let mut current = start;
    let mut last_move: Option<Direction> = None;

    for step in 0..config.main_path_length {
        let candidates = utils::shuffled_directions(rng, last_move.map(Direction::opposite));

        let uncrowded = candidates.iter().copied().find(|&direction| {
            let target = current.offset(direction);
            graph.in_bounds(target)
                && graph.occupied_neighbor_count(target) < config::CROWDED_NEIGHBOR_COUNT
        });

        let chosen = uncrowded.or_else(|| {
            warn!("Walker step {step} at {current}: every candidate is crowded, relaxing");
            candidates
                .iter()
                .chain(Direction::ALL.iter())
                .copied()
                .find(|&direction| graph.in_bounds(current.offset(direction)))
        });

        let Some(direction) = chosen else {
            warn!("Walker stuck at {current}: no in-bounds neighbor");
            break;
        };

        let next = current.offset(direction);
        if place_room(graph, next, config, rng) {
            trace!("Walker step {step}: {direction:?} to {next} (new room)");
        } else {
            trace!("Walker step {step}: {direction:?} to {next} (revisit)");
        }

        current = next;
        last_move = Some(direction);
        path.push(next);
    }

    path
}

/// Removes repeated cells from a path, keeping first-visit order.
///
/// # Examples
///
/// ```
/// use undercroft::GridPos;
/// use undercroft::generation::walker::unique_path;
///
/// let a = GridPos::new(3, 3);
/// let b = GridPos::new(3, 2);
/// assert_eq!(unique_path(&[a, b, a, b]), vec![a, b]);
/// ```
pub fn unique_path(path: &[GridPos]) -> Vec<GridPos> {
    let mut seen = HashSet::new();
    path.iter().copied().filter(|pos| seen.insert(*pos)).collect()
}
