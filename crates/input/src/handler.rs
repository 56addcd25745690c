//! Held-arrow movement for terminal environments.
//!
//! Each arrow key is tracked on its own so two keys can be held at once
//! (diagonal walking). Terminals that never send release events are handled
//! with a timeout: a key that has not been seen recently counts as released.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::KeyCode;

use crate::types::{Direction, GameAction, MOVE_ARR_MS, MOVE_DAS_MS};

// Without release events, a tap must not turn into a long walk.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

#[derive(Debug, Clone, Copy)]
struct Hold {
    last_seen: Instant,
    das_timer: u32,
    arr_accumulator: u32,
}

impl Hold {
    fn new(now: Instant) -> Self {
        Self {
            last_seen: now,
            das_timer: 0,
            arr_accumulator: 0,
        }
    }
}

/// Turns arrow key presses into a stream of `Move` actions.
#[derive(Debug, Clone)]
pub struct MovementHandler {
    held: [Option<Hold>; 4],
    das_delay: u32,
    arr_rate: u32,
    key_release_timeout_ms: u32,
}

fn slot(dir: Direction) -> usize {
    match dir {
        Direction::Left => 0,
        Direction::Right => 1,
        Direction::Up => 2,
        Direction::Down => 3,
    }
}

/// Arrow key to direction; every other key is ignored.
pub fn arrow_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        _ => None,
    }
}

impl MovementHandler {
    pub fn new() -> Self {
        Self::with_config(MOVE_DAS_MS, MOVE_ARR_MS)
    }

    pub fn with_config(das_delay: u32, arr_rate: u32) -> Self {
        Self {
            held: [None; 4],
            das_delay,
            arr_rate: arr_rate.max(1),
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        self.held[slot(dir)].is_some()
    }

    /// Register a press (or terminal auto-repeat) of `code`.
    ///
    /// Returns the immediate step for a newly held arrow; repeats of an
    /// already-held arrow only refresh its release timeout.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<GameAction> {
        let dir = arrow_direction(code)?;
        let now = Instant::now();
        match &mut self.held[slot(dir)] {
            Some(hold) => {
                hold.last_seen = now;
                None
            }
            empty => {
                *empty = Some(Hold::new(now));
                Some(GameAction::Move(dir))
            }
        }
    }

    pub fn handle_key_release(&mut self, code: KeyCode) {
        if let Some(dir) = arrow_direction(code) {
            self.held[slot(dir)] = None;
        }
    }

    /// Advance hold timers by `elapsed_ms` and return the repeat steps due.
    pub fn update(&mut self, elapsed_ms: u32) -> ArrayVec<GameAction, 32> {
        let mut actions = ArrayVec::<GameAction, 32>::new();
        let timeout = Duration::from_millis(u64::from(self.key_release_timeout_ms));

        for dir in Direction::ALL {
            let idx = slot(dir);
            let Some(hold) = self.held[idx].as_mut() else {
                continue;
            };

            // Auto-release when the terminal does not emit release events.
            if hold.last_seen.elapsed() > timeout {
                self.held[idx] = None;
                continue;
            }

            let prev_das = hold.das_timer;
            hold.das_timer = hold.das_timer.saturating_add(elapsed_ms);
            if hold.das_timer < self.das_delay {
                continue;
            }
            let excess = if prev_das < self.das_delay {
                hold.das_timer - self.das_delay
            } else {
                elapsed_ms
            };
            hold.arr_accumulator += excess;
            while hold.arr_accumulator >= self.arr_rate {
                let _ = actions.try_push(GameAction::Move(dir));
                hold.arr_accumulator -= self.arr_rate;
            }
        }

        actions
    }

    pub fn reset(&mut self) {
        self.held = [None; 4];
    }
}

impl Default for MovementHandler {
    fn default() -> Self {
        Self::new()
    }
}
