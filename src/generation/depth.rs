//! # Depth Mapper
//!
//! Breadth-first search over door links from the start room.

use crate::{GridPos, RoomGraph};
use std::collections::{HashMap, VecDeque};

/// Shortest distance, in door traversals, from `start` to every reachable
/// room. Empty when `start` holds no room.
pub fn compute_depths(graph: &RoomGraph, start: GridPos) -> HashMap<GridPos, u32> {
    let mut depths = HashMap::new();
    if !graph.contains(start) {
        return depths;
    }

    let mut queue = VecDeque::new();
    depths.insert(start, 0);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        let depth = depths[&pos];
        for &neighbor in graph.neighbors(pos) {
            if depths.contains_key(&neighbor) {
                continue;
            }
            depths.insert(neighbor, depth + 1);
            queue.push_back(neighbor);
        }
    }

    depths
}
