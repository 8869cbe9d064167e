//! # Special-Room Placement
//!
//! Assigns the shop, treasure and boss roles. The stages run in that order
//! and each one sees the cells claimed before it through [`Exclusions`].

use crate::generation::walker::unique_path;
use crate::{config, BossData, BossKind, GenerationConfig, GridPos, LootTier, RoomGraph, RoomRole};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Cells no later placement stage may claim: the start room plus whatever
/// earlier stages picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusions {
    pub start: GridPos,
    pub shop: Option<GridPos>,
    pub treasures: Vec<GridPos>,
}

impl Exclusions {
    pub fn new(start: GridPos) -> Self {
        Self {
            start,
            shop: None,
            treasures: Vec::new(),
        }
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos == self.start || self.shop == Some(pos) || self.treasures.contains(&pos)
    }
}

/// Where the special rooms ended up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialRooms {
    pub shop: Option<GridPos>,
    pub treasures: Vec<GridPos>,
    pub boss: Option<GridPos>,
}

/// Acceptance chance of a treasure candidate at `depth`.
///
/// # Examples
///
/// ```
/// use undercroft::generation::placement::treasure_chance;
///
/// assert!((treasure_chance(0.35, 0) - 0.35).abs() < 1e-9);
/// assert!((treasure_chance(0.35, 2) - 0.43).abs() < 1e-9);
/// assert!((treasure_chance(0.35, 9) - 0.55).abs() < 1e-9);
/// ```
pub fn treasure_chance(base_chance: f64, depth: u32) -> f64 {
    let bonus = config::TREASURE_CHANCE_PER_DEPTH * f64::from(depth.min(config::TREASURE_DEPTH_CAP));
    (base_chance + bonus).min(config::TREASURE_CHANCE_CAP)
}

/// Runs shop, treasure and boss placement in order and applies the roles.
pub fn place_special_rooms(
    graph: &mut RoomGraph,
    main_path: &[GridPos],
    depths: &HashMap<GridPos, u32>,
    start: GridPos,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> SpecialRooms {
    let mut exclusions = Exclusions::new(start);

    place_shop(graph, main_path, &mut exclusions, rng);
    place_treasures(graph, main_path, depths, &mut exclusions, config, rng);
    let boss = place_boss(graph, depths, &mut exclusions, rng);

    debug!(
        "Special rooms: shop={:?} treasures={:?} boss={:?}",
        exclusions.shop, exclusions.treasures, boss
    );

    SpecialRooms {
        shop: exclusions.shop,
        treasures: exclusions.treasures,
        boss,
    }
}

/// Picks the room a quarter of the way along the unique main path, or a
/// random non-start room when the path has nothing past the start.
pub fn place_shop(
    graph: &mut RoomGraph,
    main_path: &[GridPos],
    exclusions: &mut Exclusions,
    rng: &mut StdRng,
) -> Option<GridPos> {
    let path: Vec<GridPos> = unique_path(main_path)
        .into_iter()
        .filter(|&pos| !exclusions.contains(pos) && graph.contains(pos))
        .collect();

    let shop = if path.is_empty() {
        let others: Vec<GridPos> = graph
            .positions()
            .iter()
            .copied()
            .filter(|&pos| !exclusions.contains(pos))
            .collect();
        let fallback = others.choose(rng).copied();
        if fallback.is_some() {
            warn!("Main path is degenerate, shop placed on a random room");
        }
        fallback
    } else {
        Some(path[path.len() / 4])
    };

    let pos = shop?;
    if let Some(room) = graph.get_mut(pos) {
        room.role = RoomRole::Shop;
        room.safe = true;
        room.no_spawn = true;
    }
    exclusions.shop = Some(pos);
    Some(pos)
}

/// Offers main-path rooms, then branch rooms, each pool shallowest first,
/// until `max_treasure_rooms` have been accepted.
pub fn place_treasures(
    graph: &mut RoomGraph,
    main_path: &[GridPos],
    depths: &HashMap<GridPos, u32>,
    exclusions: &mut Exclusions,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> Vec<GridPos> {
    let depth_of = |pos: &GridPos| depths.get(pos).copied().unwrap_or(0);
    let on_path: HashSet<GridPos> = main_path.iter().copied().collect();

    let mut path_pool: Vec<GridPos> = unique_path(main_path)
        .into_iter()
        .filter(|&pos| !exclusions.contains(pos) && graph.contains(pos))
        .collect();
    let mut branch_pool: Vec<GridPos> = graph
        .positions()
        .iter()
        .copied()
        .filter(|pos| !on_path.contains(pos) && !exclusions.contains(*pos))
        .collect();
    path_pool.sort_by_key(depth_of);
    branch_pool.sort_by_key(depth_of);

    let mut accepted = Vec::new();
    for pos in path_pool.into_iter().chain(branch_pool) {
        if accepted.len() >= config.max_treasure_rooms {
            break;
        }
        let chance = treasure_chance(config.treasure_base_chance, depth_of(&pos));
        if rng.gen::<f64>() < chance {
            accepted.push(pos);
        }
    }

    for &pos in &accepted {
        if let Some(room) = graph.get_mut(pos) {
            room.role = RoomRole::Treasure;
            room.safe = true;
            room.no_spawn = true;
        }
    }
    exclusions.treasures.extend(accepted.iter().copied());
    accepted
}

/// First room of strictly greatest depth among `candidates`.
fn deepest(candidates: impl IntoIterator<Item = GridPos>, depths: &HashMap<GridPos, u32>) -> Option<GridPos> {
    let mut best: Option<(GridPos, u32)> = None;
    for pos in candidates {
        let depth = depths.get(&pos).copied().unwrap_or(0);
        if best.map_or(true, |(_, best_depth)| depth > best_depth) {
            best = Some((pos, depth));
        }
    }
    best.map(|(pos, _)| pos)
}

/// Puts the boss in the deepest unclaimed room.
///
/// If the earlier stages claimed every non-start room, a treasure room is
/// taken back first, then the shop, so a dungeon with two or more rooms
/// always has its boss.
pub fn place_boss(
    graph: &mut RoomGraph,
    depths: &HashMap<GridPos, u32>,
    exclusions: &mut Exclusions,
    rng: &mut StdRng,
) -> Option<GridPos> {
    let open: Vec<GridPos> = graph
        .positions()
        .iter()
        .copied()
        .filter(|&pos| !exclusions.contains(pos))
        .collect();

    let pos = match deepest(open, depths) {
        Some(pos) => pos,
        None => {
            let reclaimed = deepest(exclusions.treasures.iter().copied(), depths).or(exclusions.shop)?;
            warn!("No unclaimed room left for the boss, reclaiming {reclaimed}");
            exclusions.treasures.retain(|&t| t != reclaimed);
            if exclusions.shop == Some(reclaimed) {
                exclusions.shop = None;
            }
            reclaimed
        }
    };

    let blueprint = BossKind::pick(rng);
    let room = graph.get_mut(pos)?;
    room.role = RoomRole::Boss(BossData {
        blueprint,
        loot: LootTier::Boss,
    });
    room.no_spawn = true;
    room.safe = false;
    room.locked = false;
    room.clear_obstacles();
    Some(pos)
}
