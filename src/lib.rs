//! Grid snake simulation with a limited number of whole-body reversals.
//!
//! The core (`config`, `snake`, `food`, `collision`, `game`) is an in-memory
//! state machine driven by timestamps and direction requests. `renderer`,
//! `input` key mapping and `terminal_runtime` form a thin terminal front end.

pub mod collision;
pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod input;
pub mod renderer;
pub mod snake;
pub mod terminal_runtime;
