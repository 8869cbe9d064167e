//! # Dungeon Generation
//!
//! The grid dungeon pipeline. One generator call runs every stage in order
//! on a single seeded stream:
//!
//! 1. Walk the main path from the grid center
//! 2. Grow dead-end branches off existing rooms
//! 3. Link neighbors, setting doors and carving door passages
//! 4. Compute BFS depth from the start room
//! 5. Place the shop, treasure rooms and boss
//! 6. Populate obstacles from per-room streams
//!
//! Reordering the stages, or adding draws to any of them, changes which
//! dungeon a seed produces.

use crate::generation::{
    branches::grow_branches, depth::compute_depths, linker::link_neighbors,
    obstacles::populate_obstacles, placement::place_special_rooms, walker::walk_main_path,
};
use crate::{
    Direction, GenerationConfig, Generator, GridPos, RoomGraph, RoomRole, SpecialRooms,
    UndercroftError, UndercroftResult,
};
use log::debug;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet, VecDeque};

/// Everything the pipeline produces.
#[derive(Debug, Clone)]
pub struct DungeonLayout {
    /// Master seed the layout was generated from
    pub seed: u64,
    pub graph: RoomGraph,
    pub start: GridPos,
    /// Walker path log, start included, repeats kept
    pub main_path: Vec<GridPos>,
    pub depth_map: HashMap<GridPos, u32>,
    pub special: SpecialRooms,
}

/// Generator for room-grid dungeons.
///
/// The master seed is needed separately from the stream because per-room
/// obstacle streams are derived from it.
///
/// # Examples
///
/// ```
/// use undercroft::generation::utils;
/// use undercroft::{GenerationConfig, Generator, GridDungeonGenerator};
///
/// let config = GenerationConfig::for_testing(42);
/// let generator = GridDungeonGenerator::new(42);
/// let layout = generator.generate(&config, &mut utils::create_rng(42)).unwrap();
/// assert!(layout.graph.contains(layout.start));
/// assert!(generator.validate(&layout, &config).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDungeonGenerator {
    pub master_seed: u64,
}

impl GridDungeonGenerator {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Every room must be reachable from the start room.
    fn validate_connectivity(&self, layout: &DungeonLayout) -> UndercroftResult<()> {
        if layout.graph.is_empty() {
            return Ok(());
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(layout.start);
        queue.push_back(layout.start);

        while let Some(pos) = queue.pop_front() {
            for &neighbor in layout.graph.neighbors(pos) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        for &pos in layout.graph.positions() {
            if !visited.contains(&pos) {
                return Err(UndercroftError::GenerationFailed(format!(
                    "Room {pos} is not connected to the start room"
                )));
            }
        }
        Ok(())
    }

    /// Doors must match adjacency on both sides.
    fn validate_doors(&self, graph: &RoomGraph) -> UndercroftResult<()> {
        for (pos, room) in graph.iter() {
            for direction in Direction::ALL {
                let neighbor = pos.offset(direction);
                let expected = graph.contains(neighbor);
                if room.doors.get(direction) != expected {
                    return Err(UndercroftError::GenerationFailed(format!(
                        "Room {pos} has a {} door flag that does not match adjacency",
                        direction.name()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Depth is zero at the start and changes by at most one across a door.
    fn validate_depths(&self, layout: &DungeonLayout) -> UndercroftResult<()> {
        if layout.graph.is_empty() {
            return Ok(());
        }
        if layout.depth_map.get(&layout.start) != Some(&0) {
            return Err(UndercroftError::GenerationFailed(
                "Start room does not have depth 0".to_string(),
            ));
        }

        for &pos in layout.graph.positions() {
            let Some(&depth) = layout.depth_map.get(&pos) else {
                return Err(UndercroftError::GenerationFailed(format!(
                    "Room {pos} has no depth"
                )));
            };
            for neighbor in layout.graph.neighbors(pos) {
                let other = layout.depth_map.get(neighbor).copied().unwrap_or(u32::MAX);
                if depth.abs_diff(other) > 1 {
                    return Err(UndercroftError::GenerationFailed(format!(
                        "Depth jumps from {depth} to {other} between {pos} and {neighbor}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Roles must agree with the recorded special rooms.
    fn validate_roles(&self, layout: &DungeonLayout, config: &GenerationConfig) -> UndercroftResult<()> {
        let fail = |message: String| Err(UndercroftError::GenerationFailed(message));
        let graph = &layout.graph;

        if let Some(start) = graph.get(layout.start) {
            if start.role.is_special() {
                return fail(format!("Start room is a {} room", start.role.name()));
            }
        }

        let bosses: Vec<GridPos> = graph
            .iter()
            .filter(|(_, room)| matches!(room.role, RoomRole::Boss(_)))
            .map(|(pos, _)| pos)
            .collect();
        let expected_bosses = usize::from(graph.len() >= 2);
        if bosses.len() != expected_bosses {
            return fail(format!(
                "Expected {expected_bosses} boss rooms, found {}",
                bosses.len()
            ));
        }
        if bosses.first().copied() != layout.special.boss {
            return fail("Boss room does not match the recorded position".to_string());
        }

        if layout.special.treasures.len() > config.max_treasure_rooms {
            return fail(format!(
                "{} treasure rooms exceed the limit of {}",
                layout.special.treasures.len(),
                config.max_treasure_rooms
            ));
        }
        for &pos in &layout.special.treasures {
            if graph.get(pos).map(|room| room.role) != Some(RoomRole::Treasure) {
                return fail(format!("Treasure room {pos} lost its role"));
            }
        }
        if let Some(pos) = layout.special.shop {
            if graph.get(pos).map(|room| room.role) != Some(RoomRole::Shop) {
                return fail(format!("Shop room {pos} lost its role"));
            }
        }

        let special_count = graph.iter().filter(|(_, room)| room.role.is_special()).count();
        let recorded = usize::from(layout.special.shop.is_some())
            + layout.special.treasures.len()
            + usize::from(layout.special.boss.is_some());
        if special_count != recorded {
            return fail(format!(
                "{special_count} special rooms in the graph but {recorded} recorded"
            ));
        }
        Ok(())
    }
}

impl Generator<DungeonLayout> for GridDungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> UndercroftResult<DungeonLayout> {
        let mut graph = RoomGraph::new(config.grid_width, config.grid_height);

        let main_path = walk_main_path(&mut graph, config, rng);
        let start = main_path.first().copied().unwrap_or_else(|| graph.center());
        debug!("Main path: {} steps, {} rooms", main_path.len() - 1, graph.len());

        let branch_cells = grow_branches(&mut graph, config, rng);
        debug!("Branches added {} rooms", branch_cells.len());

        link_neighbors(&mut graph, config);

        let depth_map = compute_depths(&graph, start);
        debug!(
            "Depths computed, deepest room at {}",
            depth_map.values().max().copied().unwrap_or(0)
        );

        if let Some(room) = graph.get_mut(start) {
            room.safe = true;
            room.no_spawn = true;
        }

        let special = place_special_rooms(&mut graph, &main_path, &depth_map, start, config, rng);
        populate_obstacles(&mut graph, start, self.master_seed, config);

        let layout = DungeonLayout {
            seed: self.master_seed,
            graph,
            start,
            main_path,
            depth_map,
            special,
        };
        self.validate(&layout, config)?;
        Ok(layout)
    }

    fn validate(&self, layout: &DungeonLayout, config: &GenerationConfig) -> UndercroftResult<()> {
        if !layout.graph.contains(layout.start) {
            return Err(UndercroftError::GenerationFailed(
                "Start cell holds no room".to_string(),
            ));
        }
        self.validate_connectivity(layout)?;
        self.validate_doors(&layout.graph)?;
        self.validate_depths(layout)?;
        self.validate_roles(layout, config)
    }

    fn generator_type(&self) -> &'static str {
        "GridDungeonGenerator"
    }
}
