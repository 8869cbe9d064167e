//! # Rendering Module
//!
//! Plain-text rendering of dungeons for the terminal and for debugging.

pub mod ascii;

pub use ascii::*;
