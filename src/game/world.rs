//! # World Representation
//!
//! The room graph built by generation and the [`Dungeon`] that the game loop
//! queries and moves through.

use crate::generation::walker::unique_path;
use crate::{
    Direction, DungeonLayout, GenerationConfig, Generator, GridDungeonGenerator, GridPos, Room,
    RoomContext, RoomEvent, SpecialRooms, UndercroftResult,
};
use crate::generation::utils;
use log::info;
use std::collections::{HashMap, HashSet};

/// Rooms keyed by grid position, plus door-neighbor lists.
///
/// Iteration always follows insertion order, which is part of the
/// seed-determinism contract (boss ties are broken by it).
#[derive(Debug, Clone, PartialEq)]
pub struct RoomGraph {
    width: i32,
    height: i32,
    rooms: HashMap<GridPos, Room>,
    order: Vec<GridPos>,
    neighbors: HashMap<GridPos, Vec<GridPos>>,
}

impl RoomGraph {
    /// Creates an empty graph over a `width x height` grid.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            rooms: HashMap::new(),
            order: Vec::new(),
            neighbors: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The grid center, where every dungeon starts.
    pub fn center(&self) -> GridPos {
        GridPos::center_of(self.width, self.height)
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.rooms.contains_key(&pos)
    }

    pub fn get(&self, pos: GridPos) -> Option<&Room> {
        self.rooms.get(&pos)
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Room> {
        self.rooms.get_mut(&pos)
    }

    /// Adds a room. Occupied or out-of-bounds cells are left untouched and
    /// the call returns false.
    pub fn insert(&mut self, pos: GridPos, room: Room) -> bool {
        if !self.in_bounds(pos) || self.contains(pos) {
            return false;
        }
        self.rooms.insert(pos, room);
        self.order.push(pos);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Room positions in insertion order.
    pub fn positions(&self) -> &[GridPos] {
        &self.order
    }

    /// Rooms in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &Room)> + '_ {
        self.order
            .iter()
            .filter_map(move |pos| self.rooms.get(pos).map(|room| (*pos, room)))
    }

    /// How many of the four cells around `pos` hold a room.
    pub fn occupied_neighbor_count(&self, pos: GridPos) -> usize {
        pos.neighbors()
            .into_iter()
            .filter(|neighbor| self.contains(*neighbor))
            .count()
    }

    /// Door-linked neighbors of `pos`, in [`Direction::ALL`] order. Empty
    /// until the linker has run.
    pub fn neighbors(&self, pos: GridPos) -> &[GridPos] {
        self.neighbors.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn set_neighbors(&mut self, pos: GridPos, linked: Vec<GridPos>) {
        self.neighbors.insert(pos, linked);
    }
}

/// A generated dungeon and the player's position in it.
///
/// Topology never changes after construction; only `explored` and the
/// runtime state of individual rooms do. Use [`Dungeon::regenerate`] for a
/// fresh dungeon.
#[derive(Debug, Clone)]
pub struct Dungeon {
    config: GenerationConfig,
    seed: u64,
    graph: RoomGraph,
    start: GridPos,
    main_path: Vec<GridPos>,
    depth_map: HashMap<GridPos, u32>,
    special: SpecialRooms,
    current: GridPos,
    explored: HashSet<GridPos>,
}

impl Dungeon {
    /// Generates a dungeon. A missing seed is replaced by a random one, which
    /// [`Dungeon::seed`] then reports.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::{Dungeon, GenerationConfig, GridPos};
    ///
    /// let dungeon = Dungeon::new(GenerationConfig::for_testing(42)).unwrap();
    /// assert_eq!(dungeon.seed(), 42);
    /// assert_eq!(dungeon.start(), GridPos::new(3, 3));
    /// assert_eq!(dungeon.room_depth(None), Some(0));
    /// ```
    pub fn new(config: GenerationConfig) -> UndercroftResult<Self> {
        let seed = utils::resolve_seed(config.seed);
        let config = GenerationConfig {
            seed: Some(seed),
            ..config.sanitized()
        };

        let mut rng = utils::create_rng(seed);
        let generator = GridDungeonGenerator::new(seed);
        let layout = generator.generate(&config, &mut rng)?;

        info!(
            "Generated dungeon seed={} rooms={} shop={:?} treasure={:?} boss={:?}",
            seed,
            layout.graph.len(),
            layout.special.shop,
            layout.special.treasures,
            layout.special.boss
        );

        Ok(Self::from_layout(config, layout))
    }

    fn from_layout(config: GenerationConfig, layout: DungeonLayout) -> Self {
        let DungeonLayout {
            seed,
            graph,
            start,
            main_path,
            depth_map,
            special,
        } = layout;

        Self {
            config,
            seed,
            graph,
            start,
            main_path,
            depth_map,
            special,
            current: start,
            explored: HashSet::from([start]),
        }
    }

    /// Discards this dungeon and builds a new one from scratch with the same
    /// configuration. `None` draws a fresh seed.
    pub fn regenerate(&mut self, seed: Option<u64>) -> UndercroftResult<()> {
        let config = GenerationConfig {
            seed,
            ..self.config.clone()
        };
        *self = Self::new(config)?;
        Ok(())
    }

    /// Rebuilds the dungeon from its own seed.
    pub fn restart(&mut self) -> UndercroftResult<()> {
        self.regenerate(Some(self.seed))
    }

    /// The resolved master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn start(&self) -> GridPos {
        self.start
    }

    pub fn current_pos(&self) -> GridPos {
        self.current
    }

    pub fn room_count(&self) -> usize {
        self.graph.len()
    }

    /// Rooms in insertion order.
    pub fn rooms(&self) -> impl Iterator<Item = (GridPos, &Room)> + '_ {
        self.graph.iter()
    }

    pub fn room_at(&self, pos: GridPos) -> Option<&Room> {
        self.graph.get(pos)
    }

    /// The walker's path log, repeats included.
    pub fn main_path(&self) -> &[GridPos] {
        &self.main_path
    }

    /// The main path with repeats removed, in first-visit order.
    pub fn unique_main_path(&self) -> Vec<GridPos> {
        unique_path(&self.main_path)
    }

    pub fn depth_map(&self) -> &HashMap<GridPos, u32> {
        &self.depth_map
    }

    pub fn special_rooms(&self) -> &SpecialRooms {
        &self.special
    }

    pub fn shop(&self) -> Option<GridPos> {
        self.special.shop
    }

    pub fn treasures(&self) -> &[GridPos] {
        &self.special.treasures
    }

    pub fn boss(&self) -> Option<GridPos> {
        self.special.boss
    }

    pub fn explored(&self) -> &HashSet<GridPos> {
        &self.explored
    }

    pub fn is_explored(&self, pos: GridPos) -> bool {
        self.explored.contains(&pos)
    }

    /// The room the player is standing in.
    pub fn current_room(&self) -> Option<&Room> {
        self.graph.get(self.current)
    }

    pub fn current_room_mut(&mut self) -> Option<&mut Room> {
        self.graph.get_mut(self.current)
    }

    /// Whether a room exists one step away in `direction`.
    pub fn can_move(&self, direction: Direction) -> bool {
        self.graph.contains(self.current.offset(direction))
    }

    /// Moves the player one room over and marks the destination explored.
    /// Returns false, leaving the position unchanged, if there is no room.
    pub fn try_move(&mut self, direction: Direction) -> bool {
        if !self.can_move(direction) {
            return false;
        }
        self.current = self.current.offset(direction);
        self.explored.insert(self.current);
        true
    }

    /// BFS depth of `pos`, or of the current room when `None`.
    pub fn room_depth(&self, pos: Option<GridPos>) -> Option<u32> {
        self.depth_map.get(&pos.unwrap_or(self.current)).copied()
    }

    /// Pixel position for a `player_width x player_height` player who just
    /// moved `came_from` into the current room.
    ///
    /// The player lands inside the edge they walked through (the one opposite
    /// to `came_from`), centered on the other axis and `entry_margin` pixels
    /// clear of the edge so they do not re-trigger the door.
    pub fn entry_position(
        &self,
        came_from: Direction,
        player_width: f32,
        player_height: f32,
    ) -> Option<(f32, f32)> {
        let room = self.current_room()?;
        let tile = self.config.tile_size as f32;
        let margin = self.config.entry_margin;
        let b = room.bounds;

        let left = b.x as f32 * tile;
        let top = b.y as f32 * tile;
        let right = b.right() as f32 * tile;
        let bottom = b.bottom() as f32 * tile;
        let center_x = (left + right) / 2.0 - player_width / 2.0;
        let center_y = (top + bottom) / 2.0 - player_height / 2.0;

        Some(match came_from {
            Direction::North => (center_x, bottom - player_height - margin),
            Direction::South => (center_x, top + margin),
            Direction::East => (left + margin, center_y),
            Direction::West => (right - player_width - margin, center_y),
        })
    }

    fn enter_current(&mut self) -> UndercroftResult<Vec<RoomEvent>> {
        let pos = self.current;
        let ctx = RoomContext {
            config: &self.config,
            master_seed: self.seed,
            pos,
            depth: self.depth_map.get(&pos).copied().unwrap_or(0),
        };
        match self.graph.get_mut(pos) {
            Some(room) => room.on_enter(&ctx),
            None => Ok(Vec::new()),
        }
    }

    /// Runs the entry hook of the starting room.
    pub fn enter_initial_room(&mut self) -> UndercroftResult<Vec<RoomEvent>> {
        self.enter_current()
    }

    /// Moves like [`Dungeon::try_move`] and forwards the exit and entry hooks
    /// to the rooms involved. `None` when there is no room in `direction`.
    pub fn move_and_enter(
        &mut self,
        direction: Direction,
    ) -> UndercroftResult<Option<Vec<RoomEvent>>> {
        if !self.can_move(direction) {
            return Ok(None);
        }

        let mut events = self
            .current_room_mut()
            .map(Room::on_exit)
            .unwrap_or_default();
        self.try_move(direction);
        events.extend(self.enter_current()?);
        Ok(Some(events))
    }
}
