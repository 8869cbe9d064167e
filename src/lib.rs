//! # Undercroft
//!
//! A seeded room-grid dungeon generator for action roguelikes.
//!
//! ## Architecture Overview
//!
//! A dungeon is a small grid of rooms. Generation runs once, up front, and
//! produces an immutable topology that the game loop then queries every frame:
//!
//! - **Generation**: an ordered pipeline (walker, branches, linker, depth,
//!   special rooms, obstacles) driven by one seeded random stream
//! - **Game**: the [`Dungeon`] query API, room lifecycle hooks and run state
//! - **Input**: text commands for the interactive CLI
//! - **Rendering**: ASCII dumps of the minimap and of single rooms
//!
//! ## Determinism
//!
//! Every stochastic decision draws from a single `StdRng` in a fixed order, so
//! a seed always reproduces the same dungeon. Per-room content (obstacles,
//! encounters) uses independent streams derived from the master seed and the
//! room coordinate.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;

/// Core error type for the Undercroft generator.
#[derive(thiserror::Error, Debug)]
pub enum UndercroftError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generation configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generated layout broke an invariant
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Undercroft codebase.
pub type UndercroftResult<T> = Result<T, UndercroftError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generator constants.
pub mod config {
    /// Default grid width in rooms
    pub const DEFAULT_GRID_WIDTH: i32 = 9;

    /// Default grid height in rooms
    pub const DEFAULT_GRID_HEIGHT: i32 = 9;

    /// A candidate cell with this many occupied neighbors is too crowded
    pub const CROWDED_NEIGHBOR_COUNT: usize = 3;

    /// Largest room canvas side, in tiles
    pub const MAX_CANVAS_SIZE: i32 = 1024;

    /// Upper bound on the per-room treasure acceptance chance
    pub const TREASURE_CHANCE_CAP: f64 = 0.55;

    /// Treasure chance added per depth step
    pub const TREASURE_CHANCE_PER_DEPTH: f64 = 0.04;

    /// Depth beyond which treasure chance stops growing
    pub const TREASURE_DEPTH_CAP: u32 = 5;

    /// Salt mixed into per-room obstacle seeds
    pub const OBSTACLE_SALT: u64 = 0x5EED_0B57;

    /// Salt mixed into per-room encounter seeds
    pub const ENCOUNTER_SALT: u64 = 0x0E4C_0047;

    /// Salt mixed into per-room shop stock seeds
    pub const SHOP_SALT: u64 = 0x05A0_57C4;

    /// Salt mixed into per-room container seeds
    pub const LOOT_SALT: u64 = 0x100D_7AB1;
}
