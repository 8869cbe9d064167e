//! # Branch Generator
//!
//! Short dead-end extensions grown off rooms that already exist. A branch
//! never steps onto an occupied cell, so it cannot merge back into the graph
//! through its own path.

use crate::generation::utils;
use crate::generation::walker::place_room;
use crate::{config, Direction, GenerationConfig, GridPos, RoomGraph};
use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Grows branches from every room placed so far, visited in shuffled order.
///
/// Returns the cells added, in placement order.
pub fn grow_branches(
    graph: &mut RoomGraph,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> Vec<GridPos> {
    let mut origins = graph.positions().to_vec();
    origins.shuffle(rng);

    let mut added = Vec::new();
    for origin in origins {
        if !rng.gen_bool(config.branch_chance) {
            continue;
        }
        let length = rng.gen_range(config.min_branch_length..=config.max_branch_length);
        added.extend(grow_branch(graph, origin, length, config, rng));
    }
    added
}

fn grow_branch(
    graph: &mut RoomGraph,
    origin: GridPos,
    length: usize,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> Vec<GridPos> {
    let mut current = origin;
    let mut last_step: Option<Direction> = None;
    let mut added = Vec::new();

    for _ in 0..length {
        let candidates = utils::shuffled_directions(rng, last_step.map(Direction::opposite));
        let next = candidates.into_iter().find(|&direction| {
            let target = current.offset(direction);
            graph.in_bounds(target)
                && !graph.contains(target)
                && graph.occupied_neighbor_count(target) < config::CROWDED_NEIGHBOR_COUNT
        });

        let Some(direction) = next else {
            trace!("Branch from {origin} ends early at {current}");
            break;
        };

        current = current.offset(direction);
        place_room(graph, current, config, rng);
        added.push(current);
        last_step = Some(direction);
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::walker::walk_main_path;
    use crate::Room;

    fn build(seed: u64, config: &GenerationConfig) -> (RoomGraph, Vec<GridPos>, Vec<GridPos>) {
        let mut graph = RoomGraph::new(config.grid_width, config.grid_height);
        let mut rng = utils::create_rng(seed);
        let path = walk_main_path(&mut graph, config, &mut rng);
        let added = grow_branches(&mut graph, config, &mut rng);
        (graph, path, added)
    }

    #[test]
    fn test_branches_only_add_new_cells() {
        let config = GenerationConfig::for_testing(1);
        for seed in 0..30 {
            let (graph, path, added) = build(seed, &config);
            for cell in &added {
                assert!(!path.contains(cell), "branch cell {cell} overlaps main path");
                assert!(graph.contains(*cell));
                assert!(graph.in_bounds(*cell));
            }
            let unique: std::collections::HashSet<_> = added.iter().collect();
            assert_eq!(unique.len(), added.len());
        }
    }

    #[test]
    fn test_branch_cells_touch_existing_rooms() {
        let config = GenerationConfig::for_testing(2);
        for seed in 0..30 {
            let (graph, _, added) = build(seed, &config);
            for cell in added {
                assert!(graph.occupied_neighbor_count(cell) >= 1);
            }
        }
    }

    #[test]
    fn test_branch_cells_were_uncrowded_when_placed() {
        let config = GenerationConfig {
            branch_chance: 1.0,
            min_branch_length: 2,
            max_branch_length: 4,
            ..GenerationConfig::for_testing(6)
        };
        for seed in 0..40 {
            let (graph, path, added) = build(seed, &config);

            let mut replay = RoomGraph::new(graph.width(), graph.height());
            for pos in crate::generation::walker::unique_path(&path) {
                replay.insert(pos, Room::new(3, 3));
            }
            for &cell in &added {
                assert!(
                    replay.occupied_neighbor_count(cell) < config::CROWDED_NEIGHBOR_COUNT,
                    "seed {seed} branched onto crowded {cell}"
                );
                assert!(replay.insert(cell, Room::new(3, 3)));
            }
            assert_eq!(replay.positions(), graph.positions());
        }
    }

    #[test]
    fn test_zero_chance_adds_nothing() {
        let config = GenerationConfig {
            branch_chance: 0.0,
            ..GenerationConfig::for_testing(3)
        };
        let (graph, path, added) = build(3, &config);
        assert!(added.is_empty());
        assert_eq!(graph.len(), crate::generation::walker::unique_path(&path).len());
    }

    #[test]
    fn test_certain_branches_respect_length_bounds() {
        let config = GenerationConfig {
            branch_chance: 1.0,
            min_branch_length: 1,
            max_branch_length: 2,
            ..GenerationConfig::for_testing(4)
        };
        let (graph, path, added) = build(4, &config);
        let spine = crate::generation::walker::unique_path(&path).len();
        assert!(added.len() <= spine * 2);
        assert_eq!(graph.len(), spine + added.len());
    }

    #[test]
    fn test_branches_are_deterministic() {
        let config = GenerationConfig::for_testing(5);
        let (_, _, a) = build(5, &config);
        let (_, _, b) = build(5, &config);
        assert_eq!(a, b);
    }
}
