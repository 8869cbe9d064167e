//! # Obstacle Populator
//!
//! Lays out obstacles in hostile rooms. Each room draws from its own stream,
//! seeded from the master seed and the room coordinate, so re-running the
//! populator over the same graph reproduces the same layout.

use crate::{config, GenerationConfig, GridPos, RoomGraph};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Mixes a master seed, a room coordinate and a purpose salt into a 32-bit
/// room seed.
///
/// # Examples
///
/// ```
/// use undercroft::generation::obstacles::derive_room_seed;
/// use undercroft::GridPos;
///
/// let a = derive_room_seed(42, GridPos::new(1, 2), 7);
/// assert_eq!(a, derive_room_seed(42, GridPos::new(1, 2), 7));
/// assert_ne!(a, derive_room_seed(42, GridPos::new(2, 1), 7));
/// assert!(a <= u64::from(u32::MAX));
/// ```
pub fn derive_room_seed(master_seed: u64, pos: GridPos, salt: u64) -> u64 {
    let x = u64::from(pos.x as u32).wrapping_mul(73_856_093);
    let y = u64::from(pos.y as u32).wrapping_mul(19_349_663);
    (x ^ y ^ master_seed ^ salt) & 0xFFFF_FFFF
}

/// Obstacle seed of the room at `pos`.
pub fn room_seed(master_seed: u64, pos: GridPos) -> u64 {
    derive_room_seed(master_seed, pos, config::OBSTACLE_SALT)
}

/// Regenerates obstacles in every eligible room and returns the total placed.
///
/// The start room, special rooms and rooms flagged safe or no-spawn are
/// left empty.
pub fn populate_obstacles(
    graph: &mut RoomGraph,
    start: GridPos,
    master_seed: u64,
    config: &GenerationConfig,
) -> usize {
    let positions = graph.positions().to_vec();
    let mut total = 0;

    for pos in positions {
        let Some(room) = graph.get_mut(pos) else {
            continue;
        };
        if pos == start || room.role.is_special() || room.no_spawn || room.safe {
            room.clear_obstacles();
            continue;
        }
        let mut rng = StdRng::seed_from_u64(room_seed(master_seed, pos));
        room.generate_obstacles(&mut rng, config.max_obstacles);
        total += room.obstacles.len();
    }

    debug!("Placed {} obstacles across {} rooms", total, graph.len());
    total
}
