//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer. It avoids widget toolkits and
//! instead renders into a framebuffer of styled cells that is diffed and
//! flushed to the terminal.
//!
//! - [`fb`]: cells, styles and the framebuffer
//! - [`game_view`]: draws a [`core::GameSnapshot`] (pure, testable)
//! - [`renderer`]: raw mode, alternate screen and diff flushing

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_bear_core as core;
pub use tui_bear_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
