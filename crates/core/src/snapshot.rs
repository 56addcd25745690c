use tui_bear_types::{Focus, InputMode, Rect};

use crate::layout::Line;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub player: Rect,
    pub walls: Vec<Rect>,
    pub focus: Option<Focus>,
    pub mode: InputMode,
    pub tree_climbed: bool,
    pub lock_open: bool,
    pub key_in_inventory: bool,
    /// Text box title.
    pub title: &'static str,
    /// Text box lines, stacked from the top of the body.
    pub body: Vec<Line>,
    /// Line pinned to the bottom of the text box, wrapped upward.
    pub footer: Option<Line>,
    pub ticks: u64,
}

impl GameSnapshot {
    /// Reset to the empty state, keeping allocations.
    pub fn clear(&mut self) {
        self.player = Rect::default();
        self.walls.clear();
        self.focus = None;
        self.mode = InputMode::Walk;
        self.tree_climbed = false;
        self.lock_open = false;
        self.key_in_inventory = false;
        self.title = "";
        self.body.clear();
        self.footer = None;
        self.ticks = 0;
    }
}
