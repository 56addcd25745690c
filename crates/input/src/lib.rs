//! Terminal input module (engine-facing).
//!
//! Independent of any UI framework. It maps `crossterm` key events into
//! [`crate::types::GameAction`] according to the current
//! [`crate::types::InputMode`], and turns held arrow keys into a steady
//! stream of steps (including on terminals without key-release events).

pub mod handler;
pub mod map;

pub use tui_bear_types as types;

pub use handler::{arrow_direction, MovementHandler};
pub use map::{handle_key_event, should_quit};
