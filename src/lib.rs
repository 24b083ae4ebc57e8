//! # cube4
//!
//! 4x4x4 connect four in the terminal. Moves are validated and searched by an
//! external engine process spoken to over a line protocol; this crate renders
//! the rotating board and runs the turn loop.
//!
//! ## Modules
//!
//! - [`game`]: Board bitboards, players, turn controller
//! - [`engine`]: Engine process client, protocol, background worker
//! - [`render`]: Camera projection, scene building, software rasteriser
//! - [`ui`]: Terminal UI: mode menu, board view, input handling
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod render;
pub mod ui;
