//! # Neighbor Linker
//!
//! Turns final adjacency into door flags and neighbor lists, then opens the
//! door passages in each room's tiles.

use crate::{Direction, Doors, GenerationConfig, RoomGraph};
use log::debug;

/// Sets every room's doors from adjacency and carves its corridors.
///
/// Doors are a pure function of which cells are occupied, so linking twice
/// yields the same graph.
pub fn link_neighbors(graph: &mut RoomGraph, config: &GenerationConfig) {
    let positions = graph.positions().to_vec();
    let mut door_count = 0;

    for pos in positions {
        let mut doors = Doors::default();
        let mut linked = Vec::with_capacity(4);
        for direction in Direction::ALL {
            let neighbor = pos.offset(direction);
            let open = graph.contains(neighbor);
            doors.set(direction, open);
            if open {
                linked.push(neighbor);
            }
        }

        door_count += linked.len();
        graph.set_neighbors(pos, linked);
        if let Some(room) = graph.get_mut(pos) {
            room.doors = doors;
            room.carve_corridors(config.corridor_width, config.corridor_length);
        }
    }

    debug!("Linked {} rooms with {} doors", graph.len(), door_count);
}
