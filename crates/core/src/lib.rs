//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules of the game and the text layout engine.
//! It has **no dependencies** on the terminal, networking, or model
//! backends, which makes it:
//!
//! - **Deterministic**: the same seed and inputs give the same game
//! - **Testable**: every rule can be exercised without a terminal
//! - **Portable**: any renderer that can measure text can draw it
//!
//! # Module Structure
//!
//! - [`layout`]: greedy word wrap producing positioned text lines
//! - [`world`]: player movement, wall collision and what the player touches
//! - [`puzzle`]: the tree / key / lock state machines
//! - [`dialogue`]: NPC conversation windows and the moose's story
//! - [`game_state`]: the per-frame state object tying it all together
//! - [`rng`]: deterministic RNG for story seeds
//! - [`snapshot`]: render-ready view of a frame
//!
//! # Example
//!
//! ```
//! use tui_bear_core::GameState;
//! use tui_bear_types::{Direction, GameAction, Prop};
//!
//! let mut game = GameState::new(12345);
//! game.apply_action(GameAction::Move(Direction::Right));
//!
//! let tree = Prop::Tree.rect();
//! game.place_player(tree.x, tree.y);
//! game.apply_action(GameAction::Answer(true));
//! game.tick();
//!
//! assert!(game.snapshot().key_in_inventory);
//! ```
//!
//! # Timing
//!
//! The frontend calls [`GameState::tick`](game_state::GameState::tick) every
//! 16ms and feeds one `Move` action per held arrow key per tick, giving the
//! same 10px-per-frame speed at 60 FPS.

pub mod dialogue;
pub mod game_state;
pub mod layout;
pub mod puzzle;
pub mod rng;
pub mod snapshot;
pub mod world;

pub use tui_bear_types as types;

// Re-export commonly used types for convenience
pub use dialogue::{Dialogue, Story, QA_CONTEXT};
pub use game_state::{GameState, ModelJob};
pub use layout::{layout, wrap_line, Layout, Line, Placement};
pub use puzzle::{KeyState, LockState, Puzzle, TreeState};
pub use rng::{SeedList, SimpleRng};
pub use snapshot::GameSnapshot;
pub use tui_bear_types::InputMode;
pub use world::World;
