//! Key mapping from terminal events to game actions.

use crate::types::{Direction, GameAction, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to game actions.
///
/// Arrow keys move in every mode. What the rest of the keyboard does depends
/// on `mode`: `y`/`n` answer an open prompt, and in a conversation printable
/// keys type into the input buffer.
pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<GameAction> {
    match key.code {
        KeyCode::Left => return Some(GameAction::Move(Direction::Left)),
        KeyCode::Right => return Some(GameAction::Move(Direction::Right)),
        KeyCode::Up => return Some(GameAction::Move(Direction::Up)),
        KeyCode::Down => return Some(GameAction::Move(Direction::Down)),
        _ => {}
    }

    if should_quit(key, mode) {
        return Some(GameAction::Quit);
    }

    match mode {
        InputMode::Walk => None,
        InputMode::Prompt => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(GameAction::Answer(true)),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(GameAction::Answer(false)),
            _ => None,
        },
        InputMode::Chat => match key.code {
            KeyCode::Enter => Some(GameAction::Submit),
            KeyCode::Backspace => Some(GameAction::Backspace),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(GameAction::Type(c))
            }
            _ => None,
        },
    }
}

/// Check if key should quit the game.
///
/// `q` only quits while walking; in a conversation it is a letter.
pub fn should_quit(key: KeyEvent, mode: InputMode) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        || (mode != InputMode::Chat
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')))
}
