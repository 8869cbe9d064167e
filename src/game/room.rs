//! # Rooms
//!
//! A room is one node of the dungeon graph: a fixed-size tile canvas with a
//! centered floor rectangle, door flags toward its grid neighbors, a role, and
//! the runtime state the game loop mutates while the player is inside.

use crate::generation::obstacles::derive_room_seed;
use crate::{
    config, BossKind, Direction, EncounterGenerator, EnemySpawn, GenerationConfig, Generator,
    GridPos, LootTable, LootTier, ShopStockGenerator, UndercroftResult,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A single tile of a room canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
}

/// Axis-aligned rectangle in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the last row.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// Center tile, rounding toward the top-left.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> i32 {
        self.width.max(0) * self.height.max(0)
    }
}

/// Door flags toward the four grid neighbors.
///
/// Only the linker writes these, and only from adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Doors {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl Doors {
    pub fn get(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, direction: Direction, open: bool) {
        match direction {
            Direction::North => self.north = open,
            Direction::East => self.east = open,
            Direction::South => self.south = open,
            Direction::West => self.west = open,
        }
    }

    /// Directions with an open door, in [`Direction::ALL`] order.
    pub fn active(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|&d| self.get(d))
    }

    pub fn count(&self) -> usize {
        self.active().count()
    }
}

/// Blocking features laid out in hostile rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock,
    Pit,
    Spikes,
}

impl ObstacleKind {
    pub fn glyph(self) -> char {
        match self {
            ObstacleKind::Rock => 'o',
            ObstacleKind::Pit => 'O',
            ObstacleKind::Spikes => '^',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: i32,
    pub y: i32,
}

/// Payload of a boss room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossData {
    /// Archetype drawn from [`BossKind::ALL`]
    pub blueprint: BossKind,
    /// Reward tier of the boss container
    pub loot: LootTier,
}

/// Special designation of a room. Variants are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoomRole {
    #[default]
    Normal,
    Shop,
    Treasure,
    Boss(BossData),
}

impl RoomRole {
    /// Shop, treasure and boss rooms are special; normal rooms are not.
    pub fn is_special(&self) -> bool {
        !matches!(self, RoomRole::Normal)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoomRole::Normal => "normal",
            RoomRole::Shop => "shop",
            RoomRole::Treasure => "treasure",
            RoomRole::Boss(_) => "boss",
        }
    }
}

/// Something that happened to a room as the player moved through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomEvent {
    EnemiesSpawned { count: usize },
    BossAwakened { boss: BossKind },
    DoorsLocked,
    DoorsUnlocked,
    ShopStocked { items: Vec<String> },
    RoomCleared { boss: Option<BossKind> },
    Left,
}

/// What a room needs to know about its place in the dungeon when entered.
#[derive(Debug, Clone, Copy)]
pub struct RoomContext<'a> {
    pub config: &'a GenerationConfig,
    pub master_seed: u64,
    pub pos: GridPos,
    pub depth: u32,
}

/// A node of the dungeon graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Canvas width in tiles
    pub canvas_width: i32,
    /// Canvas height in tiles
    pub canvas_height: i32,
    /// Row-major tile canvas
    tiles: Vec<TileKind>,
    /// Floor rectangle, centered in the canvas
    pub bounds: Rect,
    pub doors: Doors,
    pub role: RoomRole,
    /// Enemies never spawn here
    pub no_spawn: bool,
    /// No hostile content at all
    pub safe: bool,
    /// Doors are sealed until the room is cleared
    pub locked: bool,
    pub obstacles: Vec<Obstacle>,
    /// Whether the player has been inside
    pub visited: bool,
    pub cleared: bool,
    pub enemies: Vec<EnemySpawn>,
    pub boss_active: bool,
    pub shop_stock: Vec<String>,
    pub container_opened: bool,
}

impl Room {
    /// Creates an all-wall room canvas.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::{Room, TileKind};
    ///
    /// let mut room = Room::new(21, 13);
    /// assert_eq!(room.tile(0, 0), Some(TileKind::Wall));
    ///
    /// room.build_centered(9, 7);
    /// assert_eq!(room.bounds.x, 6);
    /// assert_eq!(room.tile(10, 6), Some(TileKind::Floor));
    /// ```
    pub fn new(canvas_width: i32, canvas_height: i32) -> Self {
        let canvas_width = canvas_width.clamp(1, config::MAX_CANVAS_SIZE);
        let canvas_height = canvas_height.clamp(1, config::MAX_CANVAS_SIZE);
        Self {
            canvas_width,
            canvas_height,
            tiles: vec![TileKind::Wall; (canvas_width * canvas_height) as usize],
            bounds: Rect::default(),
            doors: Doors::default(),
            role: RoomRole::Normal,
            no_spawn: false,
            safe: false,
            locked: false,
            obstacles: Vec::new(),
            visited: false,
            cleared: false,
            enemies: Vec::new(),
            boss_active: false,
            shop_stock: Vec::new(),
            container_opened: false,
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.canvas_width || y >= self.canvas_height {
            return None;
        }
        Some((y * self.canvas_width + x) as usize)
    }

    /// The tile at canvas coordinates, `None` outside the canvas.
    pub fn tile(&self, x: i32, y: i32) -> Option<TileKind> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    fn set_tile(&mut self, x: i32, y: i32, kind: TileKind) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = kind;
        }
    }

    fn carve(&mut self, area: Rect) {
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.set_tile(x, y, TileKind::Floor);
            }
        }
    }

    /// Carves a `width x height` floor rectangle centered in the canvas and
    /// records it as the room bounds. Sizes are clamped to the canvas.
    pub fn build_centered(&mut self, width: i32, height: i32) {
        let width = width.clamp(1, self.canvas_width);
        let height = height.clamp(1, self.canvas_height);
        self.tiles.fill(TileKind::Wall);
        self.bounds = Rect::new(
            (self.canvas_width - width) / 2,
            (self.canvas_height - height) / 2,
            width,
            height,
        );
        self.carve(self.bounds);
    }

    /// Opens a `width x length` passage outward from the midpoint of every
    /// edge that has an active door. Only touches this room's tiles.
    pub fn carve_corridors(&mut self, width: i32, length: i32) {
        if self.bounds.is_empty() || width <= 0 || length <= 0 {
            return;
        }

        let b = self.bounds;
        let (cx, cy) = b.center();
        let half = width / 2;

        let passages: Vec<Rect> = self
            .doors
            .active()
            .map(|direction| match direction {
                Direction::North => Rect::new(cx - half, b.y - length, width, length),
                Direction::South => Rect::new(cx - half, b.bottom(), width, length),
                Direction::West => Rect::new(b.x - length, cy - half, length, width),
                Direction::East => Rect::new(b.right(), cy - half, length, width),
            })
            .collect();

        for passage in passages {
            self.carve(passage);
        }
    }

    /// Whether entering this room should stir up enemies.
    pub fn is_hostile(&self) -> bool {
        matches!(self.role, RoomRole::Normal) && !self.no_spawn && !self.safe
    }

    /// Whether a floor tile lies on the center cross that links every door.
    fn on_center_lanes(&self, x: i32, y: i32) -> bool {
        let (cx, cy) = self.bounds.center();
        x == cx || y == cy
    }

    /// Lays out up to `max_obstacles` obstacles using the given stream.
    ///
    /// Obstacles stay off the center row and column, so every door remains
    /// reachable from every other door.
    pub fn generate_obstacles<R: Rng + ?Sized>(&mut self, rng: &mut R, max_obstacles: usize) {
        const ATTEMPTS_PER_OBSTACLE: usize = 8;

        self.obstacles.clear();
        if self.bounds.is_empty() {
            return;
        }

        let count = rng.gen_range(0..=max_obstacles);
        for _ in 0..count {
            let kind = match rng.gen_range(0..10) {
                0..=4 => ObstacleKind::Rock,
                5..=7 => ObstacleKind::Spikes,
                _ => ObstacleKind::Pit,
            };
            for _ in 0..ATTEMPTS_PER_OBSTACLE {
                let x = rng.gen_range(self.bounds.x..self.bounds.right());
                let y = rng.gen_range(self.bounds.y..self.bounds.bottom());
                if !self.on_center_lanes(x, y) && !self.is_blocked(x, y) {
                    self.obstacles.push(Obstacle { kind, x, y });
                    break;
                }
            }
        }
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    /// Whether an obstacle sits on the tile.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.obstacles.iter().any(|o| o.x == x && o.y == y)
    }

    /// The boss archetype, for boss rooms.
    pub fn boss(&self) -> Option<BossKind> {
        match self.role {
            RoomRole::Boss(data) => Some(data.blueprint),
            _ => None,
        }
    }

    /// Reward table of the room container. Only treasure and boss rooms have one.
    pub fn loot_table(&self) -> Option<LootTable> {
        match self.role {
            RoomRole::Treasure => Some(LootTier::Treasure.table()),
            RoomRole::Boss(data) => Some(data.loot.table()),
            RoomRole::Normal | RoomRole::Shop => None,
        }
    }

    /// Entry hook. Hostile content is rolled on the first visit only, from a
    /// stream derived from the master seed and the room coordinate.
    pub fn on_enter(&mut self, ctx: &RoomContext<'_>) -> UndercroftResult<Vec<RoomEvent>> {
        let first_visit = !self.visited;
        self.visited = true;

        let mut events = Vec::new();
        if !first_visit || self.cleared {
            return Ok(events);
        }

        match self.role {
            RoomRole::Boss(data) => {
                self.boss_active = true;
                self.locked = true;
                log::info!("Boss {:?} awakens at {}", data.blueprint, ctx.pos);
                events.push(RoomEvent::BossAwakened {
                    boss: data.blueprint,
                });
                events.push(RoomEvent::DoorsLocked);
            }
            RoomRole::Shop => {
                let seed = derive_room_seed(ctx.master_seed, ctx.pos, config::SHOP_SALT);
                let mut rng = StdRng::seed_from_u64(seed);
                let generator = ShopStockGenerator::default();
                let stock = generator.generate(ctx.config, &mut rng)?;
                self.shop_stock = stock.clone();
                events.push(RoomEvent::ShopStocked { items: stock });
            }
            RoomRole::Treasure => {}
            RoomRole::Normal => {
                if self.is_hostile() {
                    let seed = derive_room_seed(ctx.master_seed, ctx.pos, config::ENCOUNTER_SALT);
                    let mut rng = StdRng::seed_from_u64(seed);
                    let blocked = self.obstacles.iter().map(|o| (o.x, o.y)).collect();
                    let generator = EncounterGenerator::new(ctx.depth, self.bounds, blocked);
                    self.enemies = generator.generate(ctx.config, &mut rng)?;
                    if !self.enemies.is_empty() {
                        self.locked = true;
                        events.push(RoomEvent::EnemiesSpawned {
                            count: self.enemies.len(),
                        });
                        events.push(RoomEvent::DoorsLocked);
                    }
                }
            }
        }

        Ok(events)
    }

    /// Exit hook.
    pub fn on_exit(&mut self) -> Vec<RoomEvent> {
        vec![RoomEvent::Left]
    }

    /// Removes every enemy (and the boss) and unseals the doors.
    pub fn clear_enemies(&mut self) -> Vec<RoomEvent> {
        let mut events = Vec::new();
        if self.cleared || (self.enemies.is_empty() && !self.boss_active) {
            return events;
        }

        let boss = if self.boss_active { self.boss() } else { None };
        self.enemies.clear();
        self.boss_active = false;
        self.cleared = true;
        events.push(RoomEvent::RoomCleared { boss });

        if self.locked {
            self.locked = false;
            events.push(RoomEvent::DoorsUnlocked);
        }
        events
    }

    /// Opens the room container once. Boss containers stay shut while the boss
    /// is alive.
    pub fn open_container<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&'static str> {
        if self.container_opened || self.boss_active {
            return None;
        }
        let table = self.loot_table()?;
        let item = table.roll(rng)?;
        self.container_opened = true;
        Some(item)
    }
}
