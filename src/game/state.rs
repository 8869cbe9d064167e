//! # Game State Module
//!
//! Run-level state wrapped around a [`Dungeon`]: the player's pixel position,
//! run statistics, and dispatch of player input to dungeon operations.

use crate::generation::obstacles::derive_room_seed;
use crate::{
    config, Direction, Dungeon, GenerationConfig, GridPos, PlayerInput, RoomEvent,
    UndercroftError, UndercroftResult,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The player walked through a door
    Moved {
        from: GridPos,
        to: GridPos,
        direction: Direction,
    },
    /// A room lifecycle hook fired
    Room { pos: GridPos, event: RoomEvent },
    /// The room container yielded an item
    ContainerOpened { pos: GridPos, item: String },
    /// A fresh dungeon replaced the old one
    NewDungeon { seed: u64 },
}

/// Counters for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Seed of the dungeon being played
    pub seed: u64,
    /// Rooms in the dungeon
    pub rooms_total: usize,
    /// Rooms the player has stood in
    pub rooms_explored: usize,
    /// Successful moves between rooms
    pub moves: u32,
    /// Rooms whose enemies were cleared
    pub rooms_cleared: u32,
    pub bosses_defeated: u32,
    pub items_found: u32,
}

impl RunStatistics {
    /// Fresh statistics for a dungeon.
    pub fn for_dungeon(dungeon: &Dungeon) -> Self {
        Self {
            seed: dungeon.seed(),
            rooms_total: dungeon.room_count(),
            rooms_explored: dungeon.explored().len(),
            ..Self::default()
        }
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Moved { .. } => {
                self.moves += 1;
            }
            GameEvent::Room {
                event: RoomEvent::RoomCleared { boss },
                ..
            } => {
                self.rooms_cleared += 1;
                if boss.is_some() {
                    self.bosses_defeated += 1;
                }
            }
            GameEvent::ContainerOpened { .. } => {
                self.items_found += 1;
            }
            _ => {}
        }
    }

    /// Fraction of rooms explored, from 0.0 to 1.0.
    pub fn exploration_ratio(&self) -> f64 {
        if self.rooms_total == 0 {
            return 0.0;
        }
        self.rooms_explored as f64 / self.rooms_total as f64
    }
}

/// A run through one dungeon at a time.
#[derive(Debug, Clone)]
pub struct GameState {
    pub dungeon: Dungeon,
    pub statistics: RunStatistics,
    /// Player hitbox in pixels
    pub player_size: (f32, f32),
    /// Player's top-left corner in pixels, inside the current room
    pub player_position: (f32, f32),
}

impl GameState {
    /// Generates a dungeon and enters its starting room.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::{GameState, GenerationConfig};
    ///
    /// let state = GameState::new(GenerationConfig::for_testing(42)).unwrap();
    /// assert_eq!(state.statistics.seed, 42);
    /// assert_eq!(state.statistics.rooms_explored, 1);
    /// ```
    pub fn new(config: GenerationConfig) -> UndercroftResult<Self> {
        let dungeon = Dungeon::new(config)?;
        let size = dungeon.config().tile_size as f32;
        let mut state = Self {
            statistics: RunStatistics::for_dungeon(&dungeon),
            dungeon,
            player_size: (size, size),
            player_position: (0.0, 0.0),
        };
        state.begin()?;
        Ok(state)
    }

    /// Enters the start room and centers the player in it.
    fn begin(&mut self) -> UndercroftResult<Vec<GameEvent>> {
        let start = self.dungeon.start();
        let events = self
            .dungeon
            .enter_initial_room()?
            .into_iter()
            .map(|event| GameEvent::Room { pos: start, event })
            .collect();
        self.player_position = self.room_center();
        Ok(events)
    }

    fn room_center(&self) -> (f32, f32) {
        let tile = self.dungeon.config().tile_size as f32;
        let (w, h) = self.player_size;
        match self.dungeon.current_room() {
            Some(room) => {
                let (cx, cy) = room.bounds.center();
                (cx as f32 * tile - w / 2.0, cy as f32 * tile - h / 2.0)
            }
            None => (0.0, 0.0),
        }
    }

    /// Applies player input and returns what happened.
    ///
    /// Display-only inputs (map, room, help, quit) produce no events; the
    /// caller renders them.
    pub fn handle_input(&mut self, input: PlayerInput) -> UndercroftResult<Vec<GameEvent>> {
        let events = match input {
            PlayerInput::Move(direction) => self.move_player(direction)?,
            PlayerInput::ClearRoom => self.clear_room()?,
            PlayerInput::OpenContainer => self.open_container()?,
            PlayerInput::NewSeed(seed) => self.new_dungeon(seed)?,
            PlayerInput::Restart => self.new_dungeon(Some(self.dungeon.seed()))?,
            PlayerInput::ShowMap | PlayerInput::ShowRoom | PlayerInput::Help | PlayerInput::Quit => {
                Vec::new()
            }
        };

        for event in &events {
            self.statistics.update_from_event(event);
        }
        self.statistics.rooms_explored = self.dungeon.explored().len();
        Ok(events)
    }

    fn move_player(&mut self, direction: Direction) -> UndercroftResult<Vec<GameEvent>> {
        if self.dungeon.current_room().is_some_and(|room| room.locked) {
            return Err(UndercroftError::InvalidAction(
                "The doors are sealed until the room is cleared".to_string(),
            ));
        }

        let from = self.dungeon.current_pos();
        let Some(room_events) = self.dungeon.move_and_enter(direction)? else {
            return Err(UndercroftError::InvalidAction(format!(
                "There is no door to the {}",
                direction.name()
            )));
        };
        let to = self.dungeon.current_pos();
        debug!("Player moved {} from {from} to {to}", direction.name());

        let (w, h) = self.player_size;
        if let Some(position) = self.dungeon.entry_position(direction, w, h) {
            self.player_position = position;
        }

        let mut events = vec![GameEvent::Moved {
            from,
            to,
            direction,
        }];
        events.extend(room_events.into_iter().map(|event| {
            // Exit events belong to the room that was left
            let pos = if event == RoomEvent::Left { from } else { to };
            GameEvent::Room { pos, event }
        }));
        Ok(events)
    }

    fn clear_room(&mut self) -> UndercroftResult<Vec<GameEvent>> {
        let pos = self.dungeon.current_pos();
        let room_events = self
            .dungeon
            .current_room_mut()
            .map(|room| room.clear_enemies())
            .unwrap_or_default();
        if room_events.is_empty() {
            return Err(UndercroftError::InvalidAction(
                "There is nothing to fight here".to_string(),
            ));
        }
        Ok(room_events
            .into_iter()
            .map(|event| GameEvent::Room { pos, event })
            .collect())
    }

    fn open_container(&mut self) -> UndercroftResult<Vec<GameEvent>> {
        let pos = self.dungeon.current_pos();
        let seed = derive_room_seed(self.dungeon.seed(), pos, config::LOOT_SALT);
        let mut rng = StdRng::seed_from_u64(seed);

        let item = self
            .dungeon
            .current_room_mut()
            .and_then(|room| room.open_container(&mut rng))
            .ok_or_else(|| {
                UndercroftError::InvalidAction("There is no container to open".to_string())
            })?;

        info!("Found {item} at {pos}");
        Ok(vec![GameEvent::ContainerOpened {
            pos,
            item: item.to_string(),
        }])
    }

    fn new_dungeon(&mut self, seed: Option<u64>) -> UndercroftResult<Vec<GameEvent>> {
        self.dungeon.regenerate(seed)?;
        self.statistics = RunStatistics::for_dungeon(&self.dungeon);

        let mut events = vec![GameEvent::NewDungeon {
            seed: self.dungeon.seed(),
        }];
        events.extend(self.begin()?);
        Ok(events)
    }

    /// Replaces the dungeon with a fresh one. `None` draws a random seed.
    pub fn new_seed(&mut self, seed: Option<u64>) -> UndercroftResult<Vec<GameEvent>> {
        self.handle_input(PlayerInput::NewSeed(seed))
    }

    /// Regenerates the current dungeon from its seed, resetting the run.
    pub fn restart(&mut self) -> UndercroftResult<Vec<GameEvent>> {
        self.handle_input(PlayerInput::Restart)
    }

    /// Statistics as pretty JSON.
    pub fn statistics_json(&self) -> UndercroftResult<String> {
        Ok(serde_json::to_string_pretty(&self.statistics)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(seed: u64) -> GameState {
        GameState::new(GenerationConfig::for_testing(seed)).unwrap()
    }

    /// Shortest door route from the current room to `target`.
    fn route(dungeon: &Dungeon, target: GridPos) -> Vec<Direction> {
        use std::collections::{HashMap, VecDeque};

        let start = dungeon.current_pos();
        let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            if pos == target {
                break;
            }
            for &next in dungeon.graph().neighbors(pos) {
                if next != start && !came_from.contains_key(&next) {
                    came_from.insert(next, pos);
                    queue.push_back(next);
                }
            }
        }

        let mut steps = Vec::new();
        let mut pos = target;
        while pos != start {
            let prev = came_from[&pos];
            steps.push(prev.direction_to(pos).unwrap());
            pos = prev;
        }
        steps.reverse();
        steps
    }

    fn open_direction(state: &GameState) -> Direction {
        Direction::ALL
            .into_iter()
            .find(|&d| state.dungeon.can_move(d))
            .unwrap()
    }

    #[test]
    fn test_game_state_creation() {
        let state = state(12345);
        assert_eq!(state.statistics.seed, 12345);
        assert_eq!(state.statistics.moves, 0);
        assert_eq!(state.statistics.rooms_total, state.dungeon.room_count());
        assert_eq!(state.dungeon.current_pos(), state.dungeon.start());
    }

    #[test]
    fn test_move_updates_statistics_and_position() {
        let mut state = state(3);
        let direction = open_direction(&state);
        let events = state.handle_input(PlayerInput::Move(direction)).unwrap();

        assert!(matches!(events[0], GameEvent::Moved { .. }));
        assert!(events.contains(&GameEvent::Room {
            pos: state.dungeon.start(),
            event: RoomEvent::Left
        }));
        assert_eq!(state.statistics.moves, 1);
        assert_eq!(state.statistics.rooms_explored, 2);

        let room = state.dungeon.current_room().unwrap();
        let tile = state.dungeon.config().tile_size as f32;
        let (x, y) = state.player_position;
        assert!(x >= room.bounds.x as f32 * tile);
        assert!(y >= room.bounds.y as f32 * tile);
    }

    #[test]
    fn test_move_without_door_is_rejected() {
        let mut state = state(3);
        let closed = Direction::ALL
            .into_iter()
            .find(|&d| !state.dungeon.can_move(d));
        if let Some(direction) = closed {
            let before = state.dungeon.current_pos();
            assert!(state.handle_input(PlayerInput::Move(direction)).is_err());
            assert_eq!(state.dungeon.current_pos(), before);
            assert_eq!(state.statistics.moves, 0);
        }
    }

    #[test]
    fn test_locked_room_blocks_movement_until_cleared() {
        let mut state = state(9);
        let direction = open_direction(&state);
        if let Some(room) = state.dungeon.current_room_mut() {
            room.locked = true;
            room.boss_active = true;
        }

        assert!(matches!(
            state.handle_input(PlayerInput::Move(direction)),
            Err(UndercroftError::InvalidAction(_))
        ));

        state.handle_input(PlayerInput::ClearRoom).unwrap();
        assert_eq!(state.statistics.rooms_cleared, 1);
        assert!(state.handle_input(PlayerInput::Move(direction)).is_ok());
    }

    #[test]
    fn test_clear_empty_room_is_rejected() {
        let mut state = state(9);
        assert!(state.handle_input(PlayerInput::ClearRoom).is_err());
    }

    #[test]
    fn test_container_in_start_room_is_rejected() {
        let mut state = state(9);
        assert!(state.handle_input(PlayerInput::OpenContainer).is_err());
    }

    #[test]
    fn test_treasure_container_opens_once() {
        let mut state = state(21);
        let Some(&treasure) = state.dungeon.treasures().first() else {
            return;
        };
        for direction in route(&state.dungeon, treasure) {
            assert!(state.dungeon.try_move(direction));
        }
        assert_eq!(state.dungeon.current_pos(), treasure);

        let events = state.handle_input(PlayerInput::OpenContainer).unwrap();
        assert!(matches!(events[0], GameEvent::ContainerOpened { .. }));
        assert_eq!(state.statistics.items_found, 1);
        assert!(state.handle_input(PlayerInput::OpenContainer).is_err());
    }

    #[test]
    fn test_new_seed_and_restart() {
        let mut state = state(5);
        let direction = open_direction(&state);
        state.handle_input(PlayerInput::Move(direction)).unwrap();

        let events = state.restart().unwrap();
        assert_eq!(events[0], GameEvent::NewDungeon { seed: 5 });
        assert_eq!(state.dungeon.current_pos(), state.dungeon.start());
        assert_eq!(state.statistics.moves, 0);
        assert_eq!(state.statistics.rooms_explored, 1);

        let events = state.new_seed(Some(77)).unwrap();
        assert_eq!(events[0], GameEvent::NewDungeon { seed: 77 });
        assert_eq!(state.statistics.seed, 77);
    }

    #[test]
    fn test_statistics_update() {
        let mut stats = RunStatistics::default();
        stats.update_from_event(&GameEvent::Moved {
            from: GridPos::new(0, 0),
            to: GridPos::new(1, 0),
            direction: Direction::East,
        });
        stats.update_from_event(&GameEvent::Room {
            pos: GridPos::new(1, 0),
            event: RoomEvent::RoomCleared {
                boss: Some(crate::BossKind::BroodMother),
            },
        });
        assert_eq!(stats.moves, 1);
        assert_eq!(stats.rooms_cleared, 1);
        assert_eq!(stats.bosses_defeated, 1);
        assert_eq!(stats.exploration_ratio(), 0.0);
    }

    #[test]
    fn test_statistics_serialization() {
        let state = state(12345);
        let json = state.statistics_json().unwrap();
        let loaded: RunStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, state.statistics);
    }
}
