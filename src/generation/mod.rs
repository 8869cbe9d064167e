//! # Generation Module
//!
//! Procedural generation of room-grid dungeons.
//!
//! The pipeline runs in a fixed order, every stage drawing from the same
//! seeded stream: main-path walk, branches, neighbor linking, BFS depth,
//! special rooms (shop, treasure, boss) and finally per-room obstacles.
//! Loot tables and encounter rolls live here too, since rooms consume them
//! when the player walks in.

pub mod branches;
pub mod depth;
pub mod dungeon;
pub mod encounters;
pub mod items;
pub mod linker;
pub mod obstacles;
pub mod placement;
pub mod walker;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;
pub use placement::{Exclusions, SpecialRooms};

use crate::{config, UndercroftError, UndercroftResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for dungeon generation.
///
/// Every field has a default, so JSON config files only need to list the
/// values they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Master seed; a random one is drawn when absent
    pub seed: Option<u64>,
    /// Grid width in rooms
    pub grid_width: i32,
    /// Grid height in rooms
    pub grid_height: i32,
    /// Number of walker steps along the main path
    pub main_path_length: usize,
    /// Probability that a placed room sprouts a branch (0.0 to 1.0)
    pub branch_chance: f64,
    /// Minimum number of branch steps
    pub min_branch_length: usize,
    /// Maximum number of branch steps
    pub max_branch_length: usize,
    /// Room canvas width in tiles
    pub canvas_width: i32,
    /// Room canvas height in tiles
    pub canvas_height: i32,
    /// Minimum floor width in tiles
    pub min_room_width: i32,
    /// Maximum floor width in tiles
    pub max_room_width: i32,
    /// Minimum floor height in tiles
    pub min_room_height: i32,
    /// Maximum floor height in tiles
    pub max_room_height: i32,
    /// Pixels per tile
    pub tile_size: i32,
    /// Pixel alignment room sizes must respect
    pub sprite_alignment: i32,
    /// Width of door openings in tiles
    pub corridor_width: i32,
    /// Length of door openings in tiles
    pub corridor_length: i32,
    /// Maximum number of treasure rooms
    pub max_treasure_rooms: usize,
    /// Base acceptance chance of a treasure candidate (0.0 to 1.0)
    pub treasure_base_chance: f64,
    /// Maximum obstacles per hostile room
    pub max_obstacles: usize,
    /// Distance in pixels between a room edge and the player after entering
    pub entry_margin: f32,
}

impl GenerationConfig {
    /// Creates a default configuration with a fixed seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.seed, Some(42));
    /// assert!(config.max_room_width >= config.min_room_width);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Creates a configuration for testing with a small 7x7 grid.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            grid_width: 7,
            grid_height: 7,
            main_path_length: 8,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> UndercroftResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> UndercroftResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json_string(&self) -> UndercroftResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that ranges are ordered, probabilities are probabilities and
    /// rooms fit their canvas.
    pub fn validate(&self) -> UndercroftResult<()> {
        let fail = |message: String| Err(UndercroftError::InvalidConfig(message));

        if self.grid_width < 1 || self.grid_height < 1 {
            return fail(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }
        if !(0.0..=1.0).contains(&self.branch_chance) {
            return fail(format!("branch_chance {} is not in [0, 1]", self.branch_chance));
        }
        if !(0.0..=1.0).contains(&self.treasure_base_chance) {
            return fail(format!(
                "treasure_base_chance {} is not in [0, 1]",
                self.treasure_base_chance
            ));
        }
        if self.min_branch_length > self.max_branch_length {
            return fail("min_branch_length exceeds max_branch_length".to_string());
        }
        if self.min_room_width < 1 || self.min_room_width > self.max_room_width {
            return fail("room width range is empty".to_string());
        }
        if self.min_room_height < 1 || self.min_room_height > self.max_room_height {
            return fail("room height range is empty".to_string());
        }
        if self.canvas_width > config::MAX_CANVAS_SIZE
            || self.canvas_height > config::MAX_CANVAS_SIZE
        {
            return fail(format!(
                "canvas {}x{} exceeds the {max}x{max} limit",
                self.canvas_width,
                self.canvas_height,
                max = config::MAX_CANVAS_SIZE
            ));
        }
        if self.max_room_width > self.canvas_width || self.max_room_height > self.canvas_height {
            return fail(format!(
                "rooms up to {}x{} do not fit a {}x{} canvas",
                self.max_room_width, self.max_room_height, self.canvas_width, self.canvas_height
            ));
        }
        if self.tile_size < 1 || self.sprite_alignment < 1 {
            return fail("tile_size and sprite_alignment must be positive".to_string());
        }
        if self.corridor_width < 0 || self.corridor_length < 0 {
            return fail("corridor dimensions must not be negative".to_string());
        }
        if !self.entry_margin.is_finite() || self.entry_margin < 0.0 {
            return fail(format!("entry_margin {} is not a distance", self.entry_margin));
        }
        Ok(())
    }

    /// A copy with every value forced into a usable range.
    ///
    /// The pipeline runs on the sanitized copy so that a pathological
    /// configuration produces a smaller dungeon instead of a panic.
    pub fn sanitized(&self) -> Self {
        let canvas_width = self.canvas_width.clamp(3, config::MAX_CANVAS_SIZE);
        let canvas_height = self.canvas_height.clamp(3, config::MAX_CANVAS_SIZE);
        let (min_w, max_w) = ordered(self.min_room_width.max(1), self.max_room_width.max(1));
        let (min_h, max_h) = ordered(self.min_room_height.max(1), self.max_room_height.max(1));
        let (min_branch, max_branch) = ordered(self.min_branch_length, self.max_branch_length);

        Self {
            seed: self.seed,
            grid_width: self.grid_width.max(1),
            grid_height: self.grid_height.max(1),
            main_path_length: self.main_path_length,
            branch_chance: clamp_probability(self.branch_chance),
            min_branch_length: min_branch,
            max_branch_length: max_branch,
            canvas_width,
            canvas_height,
            min_room_width: min_w.min(canvas_width),
            max_room_width: max_w.min(canvas_width),
            min_room_height: min_h.min(canvas_height),
            max_room_height: max_h.min(canvas_height),
            tile_size: self.tile_size.max(1),
            sprite_alignment: self.sprite_alignment.max(1),
            corridor_width: self.corridor_width.max(0),
            corridor_length: self.corridor_length.max(0),
            max_treasure_rooms: self.max_treasure_rooms,
            treasure_base_chance: clamp_probability(self.treasure_base_chance),
            max_obstacles: self.max_obstacles,
            entry_margin: if self.entry_margin.is_finite() {
                self.entry_margin.max(0.0)
            } else {
                0.0
            },
        }
    }

    /// Room sizes must be multiples of this step so rooms tile cleanly
    /// against sprites drawn on a `sprite_alignment` pixel grid.
    pub fn room_size_step(&self) -> i32 {
        let alignment = self.sprite_alignment.max(1);
        alignment / utils::gcd(alignment, self.tile_size.max(1))
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            grid_width: config::DEFAULT_GRID_WIDTH,
            grid_height: config::DEFAULT_GRID_HEIGHT,
            main_path_length: 10,
            branch_chance: 0.35,
            min_branch_length: 1,
            max_branch_length: 3,
            canvas_width: 21,
            canvas_height: 13,
            min_room_width: 9,
            max_room_width: 19,
            min_room_height: 6,
            max_room_height: 11,
            tile_size: 16,
            sprite_alignment: 48,
            corridor_width: 3,
            corridor_length: 2,
            max_treasure_rooms: 1,
            treasure_base_chance: 0.35,
            max_obstacles: 6,
            entry_margin: 8.0,
        }
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Trait for procedural generators.
///
/// Generators draw all randomness from the stream they are handed, which
/// keeps them reproducible and lets several run side by side.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> UndercroftResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> UndercroftResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::Direction;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    /// Returns the given seed, or draws a fresh 32-bit one.
    pub fn resolve_seed(seed: Option<u64>) -> u64 {
        seed.unwrap_or_else(|| u64::from(rand::thread_rng().gen::<u32>()))
    }

    /// Creates the seeded stream for one generation run.
    pub fn create_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Greatest common divisor; `gcd(0, 0)` is 0.
    pub fn gcd(a: i32, b: i32) -> i32 {
        let (mut a, mut b) = (a.abs(), b.abs());
        while b != 0 {
            (a, b) = (b, a % b);
        }
        a
    }

    /// Cardinal directions in random order, minus `excluded`.
    pub fn shuffled_directions(rng: &mut StdRng, excluded: Option<Direction>) -> Vec<Direction> {
        let mut directions: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&d| Some(d) != excluded)
            .collect();
        directions.shuffle(rng);
        directions
    }

    /// Draws a size in `[min, max]` that is a multiple of `step`, or any size
    /// in the range when no multiple fits.
    pub fn aligned_dimension(rng: &mut StdRng, min: i32, max: i32, step: i32) -> i32 {
        let (min, max) = ordered(min, max);
        let step = step.max(1);
        let aligned: Vec<i32> = (min..=max).filter(|v| v % step == 0).collect();
        match aligned.choose(rng) {
            Some(&size) => size,
            None => rng.gen_range(min..=max),
        }
    }

    /// Draws a room floor size, width first.
    pub fn roll_room_size(config: &GenerationConfig, rng: &mut StdRng) -> (i32, i32) {
        let step = config.room_size_step();
        let width = aligned_dimension(rng, config.min_room_width, config.max_room_width, step);
        let height = aligned_dimension(rng, config.min_room_height, config.max_room_height, step);
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, Some(12345));
        assert!(config.min_room_width <= config.max_room_width);
        assert!(config.min_branch_length <= config.max_branch_length);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = GenerationConfig::for_testing(42);
        assert_eq!((config.grid_width, config.grid_height), (7, 7));
        assert_eq!(config.main_path_length, 8);
        assert_eq!(config.max_treasure_rooms, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_room_size_step() {
        let config = GenerationConfig::default();
        // 48 / gcd(48, 16) = 3
        assert_eq!(config.room_size_step(), 3);

        let config = GenerationConfig {
            sprite_alignment: 16,
            ..GenerationConfig::default()
        };
        assert_eq!(config.room_size_step(), 1);

        let config = GenerationConfig {
            sprite_alignment: 20,
            tile_size: 8,
            ..GenerationConfig::default()
        };
        assert_eq!(config.room_size_step(), 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            GenerationConfig {
                grid_width: 0,
                ..GenerationConfig::default()
            },
            GenerationConfig {
                branch_chance: 1.5,
                ..GenerationConfig::default()
            },
            GenerationConfig {
                min_room_width: 12,
                max_room_width: 10,
                ..GenerationConfig::default()
            },
            GenerationConfig {
                max_room_height: 40,
                ..GenerationConfig::default()
            },
            GenerationConfig {
                min_branch_length: 4,
                max_branch_length: 2,
                ..GenerationConfig::default()
            },
            GenerationConfig {
                canvas_width: i32::MAX,
                canvas_height: i32::MAX,
                ..GenerationConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(UndercroftError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_sanitized_is_always_valid() {
        let wild = GenerationConfig {
            grid_width: -3,
            grid_height: 0,
            branch_chance: f64::NAN,
            treasure_base_chance: 7.0,
            min_room_width: 30,
            max_room_width: 2,
            min_room_height: -4,
            max_room_height: 90,
            min_branch_length: 5,
            max_branch_length: 1,
            tile_size: 0,
            sprite_alignment: -8,
            entry_margin: f32::INFINITY,
            ..GenerationConfig::default()
        };
        assert!(wild.validate().is_err());
        assert!(wild.sanitized().validate().is_ok());

        let huge = GenerationConfig {
            canvas_width: i32::MAX,
            canvas_height: 50_000,
            ..GenerationConfig::default()
        };
        let sanitized = huge.sanitized();
        assert!(sanitized.validate().is_ok());
        assert_eq!(sanitized.canvas_width, config::MAX_CANVAS_SIZE);
        assert_eq!(sanitized.canvas_height, config::MAX_CANVAS_SIZE);
    }

    #[test]
    fn test_json_round_trip_with_partial_file() {
        let config = GenerationConfig::from_json_str(r#"{ "seed": 7, "grid_width": 5 }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.grid_width, 5);
        assert_eq!(config.grid_height, config::DEFAULT_GRID_HEIGHT);

        let json = config.to_json_string().unwrap();
        assert_eq!(GenerationConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let result = GenerationConfig::from_json_str(r#"{ "branch_chance": -1.0 }"#);
        assert!(matches!(result, Err(UndercroftError::InvalidConfig(_))));

        let result = GenerationConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(UndercroftError::Serde(_))));
    }

    #[test]
    fn test_utils_gcd() {
        assert_eq!(utils::gcd(48, 16), 16);
        assert_eq!(utils::gcd(7, 3), 1);
        assert_eq!(utils::gcd(0, 5), 5);
    }

    #[test]
    fn test_utils_seed_resolution() {
        assert_eq!(utils::resolve_seed(Some(99)), 99);
        assert!(utils::resolve_seed(None) <= u64::from(u32::MAX));
    }

    #[test]
    fn test_utils_aligned_dimension() {
        let mut rng = utils::create_rng(1);
        for _ in 0..50 {
            let size = utils::aligned_dimension(&mut rng, 9, 19, 3);
            assert!((9..=19).contains(&size));
            assert_eq!(size % 3, 0);
        }
        // No multiple of 7 in [8, 10]: falls back to the plain range
        for _ in 0..20 {
            let size = utils::aligned_dimension(&mut rng, 8, 10, 7);
            assert!((8..=10).contains(&size));
        }
    }

    #[test]
    fn test_utils_shuffled_directions() {
        let mut rng = utils::create_rng(5);
        let all = utils::shuffled_directions(&mut rng, None);
        assert_eq!(all.len(), 4);
        let without_north = utils::shuffled_directions(&mut rng, Some(crate::Direction::North));
        assert_eq!(without_north.len(), 3);
        assert!(!without_north.contains(&crate::Direction::North));
    }
}
