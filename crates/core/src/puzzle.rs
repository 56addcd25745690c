//! Puzzle module - tree, key and lock
//!
//! The whole puzzle is three small state machines:
//!
//! ```text
//! tree:  Unclimbed --(yes at tree, then walk away)--> Climbed
//! key:   Missing --(yes at tree)--> Held --(yes at lock)--> Used
//! lock:  Locked --(yes at lock, then walk away)--> Unlocked
//! ```
//!
//! Answers are remembered only for the current visit. Leaving an object
//! forgets the answer and commits whatever the visit achieved.

use tui_bear_types::{Focus, Prop};

use crate::layout::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeState {
    Unclimbed,
    Climbed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Missing,
    Held,
    Used,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    tree: TreeState,
    key: KeyState,
    lock: LockState,
    tree_answer: Option<bool>,
    lock_answer: Option<bool>,
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::new()
    }
}

impl Puzzle {
    pub fn new() -> Self {
        Self {
            tree: TreeState::Unclimbed,
            key: KeyState::Missing,
            lock: LockState::Locked,
            tree_answer: None,
            lock_answer: None,
        }
    }

    pub fn tree(&self) -> TreeState {
        self.tree
    }

    pub fn key(&self) -> KeyState {
        self.key
    }

    pub fn lock(&self) -> LockState {
        self.lock
    }

    /// The key icon shows in the inventory only while it is held.
    pub fn key_in_inventory(&self) -> bool {
        self.key == KeyState::Held
    }

    /// The lock is drawn open as soon as the key turns, before the state
    /// commits on leaving.
    pub fn lock_looks_open(&self) -> bool {
        self.lock == LockState::Unlocked || self.lock_answer == Some(true)
    }

    fn tree_prompt_open(&self) -> bool {
        self.tree == TreeState::Unclimbed && self.tree_answer != Some(true)
    }

    fn lock_prompt_open(&self) -> bool {
        self.lock == LockState::Locked && self.key == KeyState::Held
    }

    /// True when a yes/no prompt is waiting at `prop`.
    pub fn prompt_open(&self, prop: Prop) -> bool {
        match prop {
            Prop::Tree => self.tree_prompt_open(),
            Prop::Lock => self.lock_prompt_open(),
        }
    }

    /// Answer the prompt at `prop`. Returns false if no prompt was open.
    ///
    /// A "no" can be changed to "yes"; a "yes" is final for the visit.
    pub fn answer(&mut self, prop: Prop, yes: bool) -> bool {
        if !self.prompt_open(prop) {
            return false;
        }
        match prop {
            Prop::Tree => {
                self.tree_answer = Some(yes);
                if yes {
                    self.key = KeyState::Held;
                    log::info!("key found at the top of the tree");
                }
            }
            Prop::Lock => {
                self.lock_answer = Some(yes);
                if yes {
                    self.key = KeyState::Used;
                    log::info!("key used on the lock");
                }
            }
        }
        true
    }

    /// Commit finished visits for everything the player is not standing on.
    pub fn update(&mut self, focus: Option<Focus>) {
        if focus != Some(Focus::Prop(Prop::Tree)) {
            if self.key != KeyState::Missing && self.tree == TreeState::Unclimbed {
                self.tree = TreeState::Climbed;
            }
            self.tree_answer = None;
        }
        if focus != Some(Focus::Prop(Prop::Lock)) {
            if self.lock_answer == Some(true) && self.lock == LockState::Locked {
                self.lock = LockState::Unlocked;
                log::info!("lock opened");
            }
            self.lock_answer = None;
        }
    }

    /// Text box title while standing on `prop`.
    pub fn title(&self, prop: Prop) -> &'static str {
        match prop {
            Prop::Tree => "TREE: ",
            Prop::Lock if self.lock == LockState::Unlocked => "OPEN LOCK: ",
            Prop::Lock => "LOCK: ",
        }
    }

    /// Text box body while standing on `prop`.
    pub fn lines(&self, prop: Prop) -> Vec<Line> {
        let mut lines = Vec::new();
        match prop {
            Prop::Tree => {
                if self.tree == TreeState::Climbed {
                    return lines;
                }
                lines.push(Line::black(
                    "There is a tall tree... with something at the top!",
                ));
                lines.push(Line::black("Climb tree? Yes [y] or No [n]: "));
                match self.tree_answer {
                    Some(true) => {
                        lines.push(Line::blue("[y]: You climb to the top and find a KEY."))
                    }
                    Some(false) => {
                        lines.push(Line::blue("[n]: It looks too tall to climb anyway."))
                    }
                    None => {}
                }
            }
            Prop::Lock => {
                if self.lock == LockState::Unlocked {
                    return lines;
                }
                lines.push(Line::black("A lock. You use your paws but it won't budge."));
                lines.push(Line::black("It probably needs a KEY..."));
                if self.lock_prompt_open() || self.lock_answer.is_some() {
                    lines.push(Line::black("Use KEY? Yes [y] or No [n]: "));
                }
                match self.lock_answer {
                    Some(true) => lines.push(Line::blue("[y]: It worked!")),
                    Some(false) => lines.push(Line::blue("[n]: Really? Why not?")),
                    None => {}
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT_TREE: Option<Focus> = Some(Focus::Prop(Prop::Tree));
    const AT_LOCK: Option<Focus> = Some(Focus::Prop(Prop::Lock));

    #[test]
    fn climbing_the_tree_finds_the_key() {
        let mut p = Puzzle::new();
        p.update(AT_TREE);
        assert!(p.answer(Prop::Tree, true));
        assert_eq!(p.key(), KeyState::Held);
        assert!(p.key_in_inventory());
        // still at the tree: not committed yet
        p.update(AT_TREE);
        assert_eq!(p.tree(), TreeState::Unclimbed);
        p.update(None);
        assert_eq!(p.tree(), TreeState::Climbed);
        assert!(p.lines(Prop::Tree).is_empty());
    }

    #[test]
    fn no_at_tree_can_become_yes() {
        let mut p = Puzzle::new();
        assert!(p.answer(Prop::Tree, false));
        assert_eq!(p.key(), KeyState::Missing);
        assert!(p.lines(Prop::Tree).last().unwrap().text.starts_with("[n]"));
        assert!(p.answer(Prop::Tree, true));
        assert_eq!(p.key(), KeyState::Held);
        // yes is final
        assert!(!p.answer(Prop::Tree, false));
        assert!(p.lines(Prop::Tree).last().unwrap().text.starts_with("[y]"));
    }

    #[test]
    fn declining_the_tree_resets_on_leaving() {
        let mut p = Puzzle::new();
        p.answer(Prop::Tree, false);
        p.update(None);
        assert_eq!(p.tree(), TreeState::Unclimbed);
        assert_eq!(p.lines(Prop::Tree).len(), 2);
    }

    #[test]
    fn lock_without_key_has_no_prompt() {
        let mut p = Puzzle::new();
        assert!(!p.prompt_open(Prop::Lock));
        assert!(!p.answer(Prop::Lock, true));
        p.update(None);
        assert_eq!(p.lock(), LockState::Locked);
        assert_eq!(p.lines(Prop::Lock).len(), 2);
        assert_eq!(p.title(Prop::Lock), "LOCK: ");
    }

    #[test]
    fn key_opens_lock_after_walking_away() {
        let mut p = Puzzle::new();
        p.answer(Prop::Tree, true);
        p.update(None);

        p.update(AT_LOCK);
        assert!(p.prompt_open(Prop::Lock));
        assert!(p.answer(Prop::Lock, true));
        assert_eq!(p.key(), KeyState::Used);
        assert!(!p.key_in_inventory());
        assert!(p.lock_looks_open());
        assert_eq!(p.lock(), LockState::Locked);
        let lines = p.lines(Prop::Lock);
        assert_eq!(lines.last().unwrap().text, "[y]: It worked!");

        p.update(None);
        assert_eq!(p.lock(), LockState::Unlocked);
        assert_eq!(p.title(Prop::Lock), "OPEN LOCK: ");
        assert!(p.lines(Prop::Lock).is_empty());
    }

    #[test]
    fn refusing_the_lock_keeps_the_key() {
        let mut p = Puzzle::new();
        p.answer(Prop::Tree, true);
        p.update(None);
        assert!(p.answer(Prop::Lock, false));
        assert_eq!(
            p.lines(Prop::Lock).last().unwrap().text,
            "[n]: Really? Why not?"
        );
        p.update(None);
        assert_eq!(p.lock(), LockState::Locked);
        assert_eq!(p.key(), KeyState::Held);
        assert!(p.prompt_open(Prop::Lock));
    }
}
