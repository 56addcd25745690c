//! World module - player movement and collision
//!
//! The player is a 72x72 rect that moves in 10px steps. Walls block a step
//! that would cross into them; after each step the player is clamped into
//! the play area. Props and NPCs never block: standing on one is how the
//! player interacts with it.

use tui_bear_types::{
    Direction, Focus, Npc, Prop, Rect, PLAY_AREA, SPRITE_PX, STEP_PX, WALL,
};

/// Static layout plus the player's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    player: Rect,
    walls: Vec<Rect>,
    bounds: Rect,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Player in the top-left corner of the play area, one wall.
    pub fn new() -> Self {
        Self::with_walls(vec![WALL])
    }

    pub fn with_walls(walls: Vec<Rect>) -> Self {
        let bounds = PLAY_AREA;
        Self {
            player: Rect::new(0, 0, SPRITE_PX, SPRITE_PX).clamp_within(&bounds),
            walls,
            bounds,
        }
    }

    pub fn player(&self) -> Rect {
        self.player
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    /// Put the player's top-left corner at `(x, y)`, clamped to the play area.
    pub fn place_player(&mut self, x: i32, y: i32) {
        self.player = Rect::new(x, y, self.player.w, self.player.h).clamp_within(&self.bounds);
    }

    /// Take one step. Returns false when a wall refused the move.
    ///
    /// Hitting the play-area edge is not a refusal; the clamp just eats the
    /// overshoot.
    pub fn step(&mut self, dir: Direction) -> bool {
        if self.walls.iter().any(|w| blocks(&self.player, w, dir, STEP_PX)) {
            return false;
        }
        self.player = self
            .player
            .translate(dir.delta(STEP_PX))
            .clamp_within(&self.bounds);
        true
    }

    /// The object or NPC the player currently stands on, if any.
    ///
    /// When several overlap, props win over NPCs, then declaration order.
    pub fn focus(&self) -> Option<Focus> {
        [Prop::Tree, Prop::Lock]
            .into_iter()
            .find(|p| self.player.intersects(&p.rect()))
            .map(Focus::Prop)
            .or_else(|| {
                Npc::ALL
                    .into_iter()
                    .find(|n| self.player.intersects(&n.rect()))
                    .map(Focus::Npc)
            })
    }
}

/// Would stepping `player` by `step` in `dir` run into `wall`?
///
/// The player must overlap the wall's span on the other axis, sit on the
/// near side, and the step must cross the wall's edge.
fn blocks(player: &Rect, wall: &Rect, dir: Direction, step: i32) -> bool {
    let overlaps_rows = player.bottom() > wall.top() && player.top() < wall.bottom();
    let overlaps_cols = player.right() > wall.left() && player.left() < wall.right();
    match dir {
        Direction::Left => {
            overlaps_rows && player.left() >= wall.right() && player.left() - step < wall.right()
        }
        Direction::Right => {
            overlaps_rows && player.right() <= wall.left() && player.right() + step > wall.left()
        }
        Direction::Up => {
            overlaps_cols && player.top() >= wall.bottom() && player.top() - step < wall.bottom()
        }
        Direction::Down => {
            overlaps_cols && player.bottom() <= wall.top() && player.bottom() + step > wall.top()
        }
    }
}
