//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the game.
//! All types are plain data, usable from the core logic, the terminal view
//! and the model protocol alike.
//!
//! # Coordinates
//!
//! The world is laid out in logical screen pixels on a 1000x700 canvas:
//!
//! | Area | Rect (x, y, w, h) |
//! |------|-------------------|
//! | Play area (player is clamped here) | `0, 10, 1000, 530` |
//! | Wall | `200, 200, 10, 100` |
//! | Text box | `10, 540, 690, 150` |
//! | Inventory box | `710, 540, 280, 150` |
//!
//! The terminal view scales these to character cells; nothing in the core
//! knows about terminal cells.
//!
//! # Examples
//!
//! ```
//! use tui_bear_types::{Direction, ModelTask, Npc, Rect, STEP_PX};
//!
//! let a = Rect::new(0, 0, 72, 72);
//! let b = a.translate(Direction::Right.delta(STEP_PX));
//! assert_eq!(b.x, 10);
//! assert!(a.intersects(&b));
//!
//! assert_eq!(Npc::Fox.task(), ModelTask::FillMask);
//! assert_eq!(ModelTask::from_str("textGeneration"), Some(ModelTask::TextGeneration));
//! ```

mod model;

pub use model::{FillCandidate, ModelOutput, ModelRequest};

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: i32 = 1000;

/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: i32 = 700;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Distance the player moves per step.
pub const STEP_PX: i32 = 10;

/// Edge length of every sprite (player, props, NPCs, key icon).
pub const SPRITE_PX: i32 = 72;

/// The player is confined to this rect, just below the instructions line.
pub const PLAY_AREA: Rect = Rect::new(0, 10, SCREEN_WIDTH, 530);

/// The single impassable obstacle.
pub const WALL: Rect = Rect::new(200, 200, 10, 100);

pub const TREE_CENTER: (i32, i32) = (400, 200);
pub const LOCK_CENTER: (i32, i32) = (150, 300);
pub const POLAR_BEAR_CENTER: (i32, i32) = (600, 100);
pub const ROBOT_CENTER: (i32, i32) = (800, 300);
pub const FOX_CENTER: (i32, i32) = (900, 450);
pub const MOOSE_CENTER: (i32, i32) = (500, 450);

/// Where the key icon sits once it is in the inventory.
pub const INVENTORY_KEY_CENTER: (i32, i32) = (850, 615);

/// Text box that shows titles, prompts and conversations.
pub const TEXT_BOX: Rect = Rect::new(10, 540, 690, 150);

/// Inventory panel next to the text box.
pub const INVENTORY_BOX: Rect = Rect::new(710, 540, 280, 150);

/// Left edge of text inside the text box.
pub const TEXT_X: i32 = 10;

/// First body line inside the text box (the title sits on `TEXT_BOX.y`).
pub const TEXT_START_Y: i32 = 560;

/// Vertical distance between rendered text lines.
pub const LINE_HEIGHT: i32 = 20;

/// Maximum rendered width of a line of text in the text box.
pub const TEXT_MAX_WIDTH: u32 = 690;

/// Row used for the moose's tip line.
pub const STORY_TIP_Y: i32 = 670;

/// Text shown in the top-left corner of the screen.
pub const INSTRUCTIONS: &str =
    "Use the arrow keys to move. When prompted, enter text and hit RETURN or ENTER.";

/// Opening line of the moose's story.
pub const STORY_PROMPT: &str = "Once upon a time,";

/// Tokens generated per story continuation.
pub const STORY_NEW_TOKENS: u32 = 35;

/// Number of seeds drawn at start-up for story generation.
pub const STORY_SEED_COUNT: usize = 100;

/// Story seeds are drawn from `0..=STORY_SEED_MAX`.
pub const STORY_SEED_MAX: u32 = 500;

/// Candidates requested from the fill-mask model.
pub const FILL_MASK_TOP_K: u32 = 5;

/// Placeholder the fill-mask model fills in.
pub const MASK_TOKEN: &str = "<mask>";

/// Hold time before a held arrow key starts repeating.
pub const MOVE_DAS_MS: u32 = 150;

/// Repeat interval of a held arrow key (one step per frame).
pub const MOVE_ARR_MS: u32 = TICK_MS;

/// Upper bound on buffered text input, in characters.
pub const MAX_INPUT_CHARS: usize = 240;

/// Axis-aligned rectangle in logical pixels.
///
/// `x`/`y` is the top-left corner. Edges follow the usual half-open
/// convention: `right() = x + w`, `bottom() = y + h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A `w`x`h` rect centered on `(cx, cy)`.
    ///
    /// ```
    /// use tui_bear_types::Rect;
    ///
    /// let r = Rect::from_center((400, 200), 72, 72);
    /// assert_eq!((r.x, r.y), (364, 164));
    /// ```
    pub const fn from_center(center: (i32, i32), w: i32, h: i32) -> Self {
        Self {
            x: center.0 - w / 2,
            y: center.1 - h / 2,
            w,
            h,
        }
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub const fn translate(&self, delta: (i32, i32)) -> Self {
        Self {
            x: self.x + delta.0,
            y: self.y + delta.1,
            w: self.w,
            h: self.h,
        }
    }

    /// True when the two rects share a non-empty area.
    ///
    /// Rects that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Move this rect the minimum distance needed to lie inside `bounds`.
    ///
    /// On an axis where the rect is larger than `bounds` it is centered on
    /// that axis instead.
    pub fn clamp_within(&self, bounds: &Rect) -> Self {
        let x = if self.w >= bounds.w {
            bounds.x + bounds.w / 2 - self.w / 2
        } else {
            self.x.clamp(bounds.left(), bounds.right() - self.w)
        };
        let y = if self.h >= bounds.h {
            bounds.y + bounds.h / 2 - self.h / 2
        } else {
            self.y.clamp(bounds.top(), bounds.bottom() - self.h)
        };
        Self {
            x,
            y,
            w: self.w,
            h: self.h,
        }
    }
}

/// Movement direction of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Pixel offset of one step in this direction.
    pub const fn delta(&self, step: i32) -> (i32, i32) {
        match self {
            Direction::Up => (0, -step),
            Direction::Down => (0, step),
            Direction::Left => (-step, 0),
            Direction::Right => (step, 0),
        }
    }
}

/// Semantic color of a line of text.
///
/// - **Black**: narration, prompts and the player's own typing
/// - **Blue**: answers and NPC speech
/// - **Red**: box titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextColor {
    #[default]
    Black,
    Blue,
    Red,
}

/// Static interactive objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    Tree,
    Lock,
}

impl Prop {
    pub fn rect(&self) -> Rect {
        match self {
            Prop::Tree => Rect::from_center(TREE_CENTER, SPRITE_PX, SPRITE_PX),
            Prop::Lock => Rect::from_center(LOCK_CENTER, SPRITE_PX, SPRITE_PX),
        }
    }
}

/// The language tasks behind the NPCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTask {
    Conversational,
    QuestionAnswering,
    FillMask,
    TextGeneration,
}

impl ModelTask {
    pub const ALL: [ModelTask; 4] = [
        ModelTask::Conversational,
        ModelTask::QuestionAnswering,
        ModelTask::FillMask,
        ModelTask::TextGeneration,
    ];

    /// Parse a task from its wire name (case-insensitive).
    ///
    /// ```
    /// use tui_bear_types::ModelTask;
    ///
    /// assert_eq!(ModelTask::from_str("fillmask"), Some(ModelTask::FillMask));
    /// assert_eq!(ModelTask::from_str("translation"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "conversational" => Some(ModelTask::Conversational),
            "questionanswering" => Some(ModelTask::QuestionAnswering),
            "fillmask" => Some(ModelTask::FillMask),
            "textgeneration" => Some(ModelTask::TextGeneration),
            _ => None,
        }
    }

    /// camelCase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTask::Conversational => "conversational",
            ModelTask::QuestionAnswering => "questionAnswering",
            ModelTask::FillMask => "fillMask",
            ModelTask::TextGeneration => "textGeneration",
        }
    }
}

/// Non-player characters. Each one fronts a different model task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Npc {
    PolarBear,
    Robot,
    Fox,
    Moose,
}

impl Npc {
    pub const ALL: [Npc; 4] = [Npc::PolarBear, Npc::Robot, Npc::Fox, Npc::Moose];

    pub fn task(&self) -> ModelTask {
        match self {
            Npc::PolarBear => ModelTask::Conversational,
            Npc::Robot => ModelTask::QuestionAnswering,
            Npc::Fox => ModelTask::FillMask,
            Npc::Moose => ModelTask::TextGeneration,
        }
    }

    pub fn rect(&self) -> Rect {
        let center = match self {
            Npc::PolarBear => POLAR_BEAR_CENTER,
            Npc::Robot => ROBOT_CENTER,
            Npc::Fox => FOX_CENTER,
            Npc::Moose => MOOSE_CENTER,
        };
        Rect::from_center(center, SPRITE_PX, SPRITE_PX)
    }

    /// Short label used on the map.
    pub fn label(&self) -> &'static str {
        match self {
            Npc::PolarBear => "POLAR",
            Npc::Robot => "ROBOT",
            Npc::Fox => "FOX",
            Npc::Moose => "MOOSE",
        }
    }

    /// Prefix used in front of the NPC's lines.
    pub fn speaker(&self) -> &'static str {
        match self {
            Npc::PolarBear => "P. Bear",
            Npc::Robot => "Robot",
            Npc::Fox => "Fox",
            Npc::Moose => "Moose",
        }
    }

    /// Text box title while the player is next to this NPC.
    pub fn title(&self) -> &'static str {
        match self {
            Npc::PolarBear => "POLAR BEAR: CONVERSATIONAL MODEL",
            Npc::Robot => "ROBOT: QUESTION-ANSWERING MODEL",
            Npc::Fox => "FOX: FILL-MASK MODEL",
            Npc::Moose => "MOOSE: TEXT-GENERATING MODEL",
        }
    }

    /// Camel-case identifier used in logs and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Npc::PolarBear => "polarBear",
            Npc::Robot => "robot",
            Npc::Fox => "fox",
            Npc::Moose => "moose",
        }
    }
}

/// What the player is standing next to, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Prop(Prop),
    Npc(Npc),
}

/// Which controls make sense right now.
///
/// The key map uses this to decide whether `y` answers a prompt or types a
/// letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputMode {
    /// Arrow keys only.
    #[default]
    Walk,
    /// A yes/no prompt is open.
    Prompt,
    /// Talking to an NPC: printable keys type.
    Chat,
}

/// Game actions produced by input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Step the player once in a direction
    Move(Direction),
    /// Yes / no answer to a prompt
    Answer(bool),
    /// Append a character to the text input
    Type(char),
    /// Delete the last input character (resets the moose's story)
    Backspace,
    /// Send the text input to the NPC
    Submit,
    /// Leave the game
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_constants_match_screen() {
        assert_eq!(PLAY_AREA.bottom(), 540);
        assert_eq!(TEXT_BOX.top(), PLAY_AREA.bottom());
        assert_eq!(INVENTORY_BOX.right(), 990);
        assert_eq!(TEXT_MAX_WIDTH as i32, TEXT_BOX.w);
        assert!(STORY_TIP_Y < TEXT_BOX.bottom());
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
        assert!(!a.intersects(&Rect::new(0, 10, 10, 10)));
        assert!(a.intersects(&Rect::new(9, 9, 10, 10)));
        assert!(!a.intersects(&Rect::new(2, 2, 0, 5)));
    }

    #[test]
    fn clamp_moves_minimum_distance() {
        let bounds = Rect::new(0, 10, 100, 50);
        assert_eq!(
            Rect::new(-5, 0, 20, 20).clamp_within(&bounds),
            Rect::new(0, 10, 20, 20)
        );
        assert_eq!(
            Rect::new(95, 45, 20, 20).clamp_within(&bounds),
            Rect::new(80, 40, 20, 20)
        );
        let inside = Rect::new(30, 20, 20, 20);
        assert_eq!(inside.clamp_within(&bounds), inside);
    }

    #[test]
    fn clamp_centers_oversized_rects() {
        let bounds = Rect::new(0, 0, 10, 10);
        let r = Rect::new(50, 50, 20, 4).clamp_within(&bounds);
        assert_eq!((r.x, r.y), (-5, 6));
    }

    #[test]
    fn task_names_round_trip_case_insensitively() {
        for task in ModelTask::ALL {
            assert_eq!(ModelTask::from_str(task.as_str()), Some(task));
            assert_eq!(ModelTask::from_str(&task.as_str().to_uppercase()), Some(task));
        }
    }

    #[test]
    fn npcs_do_not_overlap_each_other_or_props() {
        let mut rects: Vec<Rect> = Npc::ALL.iter().map(|n| n.rect()).collect();
        rects.push(Prop::Tree.rect());
        rects.push(Prop::Lock.rect());
        rects.push(WALL);
        for (i, a) in rects.iter().enumerate() {
            for b in rects.iter().skip(i + 1) {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }
}
