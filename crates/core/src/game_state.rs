//! Game state module - ties world, puzzle and dialogues together
//!
//! `GameState` is the only mutable state of a running game. The frontend
//! feeds it input actions and model replies, advances it once per tick, and
//! reads back a [`GameSnapshot`] to draw. Model calls leave through an
//! outbox of [`ModelJob`]s; nothing in here blocks or does I/O.

use tui_bear_types::{
    Focus, GameAction, InputMode, ModelOutput, ModelRequest, Npc, MAX_INPUT_CHARS,
};

use crate::dialogue::{story_tip, Dialogue, Story, Submitted};
use crate::puzzle::{Puzzle, TreeState};
use crate::rng::SeedList;
use crate::snapshot::GameSnapshot;
use crate::world::World;

/// Title shown when the player stands on nothing.
pub const IDLE_TITLE: &str = "PLAYER BEAR: ";

/// A model call requested by an NPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelJob {
    /// Echoed back with the reply.
    pub ticket: u64,
    pub npc: Npc,
    pub request: ModelRequest,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    world: World,
    puzzle: Puzzle,
    polar_bear: Dialogue,
    robot: Dialogue,
    fox: Dialogue,
    story: Story,
    seeds: SeedList,
    input: String,
    focus: Option<Focus>,
    outbox: Vec<ModelJob>,
    next_ticket: u64,
    ticks: u64,
    quit: bool,
}

impl GameState {
    /// Create a new game. `seed` drives the story seed pool.
    pub fn new(seed: u32) -> Self {
        let mut state = Self {
            world: World::new(),
            puzzle: Puzzle::new(),
            polar_bear: Dialogue::new(Npc::PolarBear),
            robot: Dialogue::new(Npc::Robot),
            fox: Dialogue::new(Npc::Fox),
            story: Story::new(),
            seeds: SeedList::new(seed),
            input: String::new(),
            focus: None,
            outbox: Vec::new(),
            next_ticket: 1,
            ticks: 0,
            quit: false,
        };
        state.refresh();
        state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn dialogue(&self, npc: Npc) -> Option<&Dialogue> {
        match npc {
            Npc::PolarBear => Some(&self.polar_bear),
            Npc::Robot => Some(&self.robot),
            Npc::Fox => Some(&self.fox),
            Npc::Moose => None,
        }
    }

    fn dialogue_mut(&mut self, npc: Npc) -> Option<&mut Dialogue> {
        match npc {
            Npc::PolarBear => Some(&mut self.polar_bear),
            Npc::Robot => Some(&mut self.robot),
            Npc::Fox => Some(&mut self.fox),
            Npc::Moose => None,
        }
    }

    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn story_seed(&self) -> u32 {
        self.seeds.current()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Move the player directly. Used by tests and debugging tools.
    pub fn place_player(&mut self, x: i32, y: i32) {
        self.world.place_player(x, y);
        self.refresh();
    }

    pub fn input_mode(&self) -> InputMode {
        match self.focus {
            Some(Focus::Npc(_)) => InputMode::Chat,
            Some(Focus::Prop(prop)) if self.puzzle.prompt_open(prop) => InputMode::Prompt,
            _ => InputMode::Walk,
        }
    }

    /// Apply one input action.
    ///
    /// Returns true if the action changed anything.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        let changed = match action {
            GameAction::Move(dir) => self.world.step(dir),
            GameAction::Answer(yes) => match self.focus {
                Some(Focus::Prop(prop)) => self.puzzle.answer(prop, yes),
                _ => false,
            },
            GameAction::Type(ch) => self.type_char(ch),
            GameAction::Backspace => self.backspace(),
            GameAction::Submit => self.submit(),
            GameAction::Quit => {
                self.quit = true;
                true
            }
        };
        self.refresh();
        changed
    }

    /// Advance one fixed timestep.
    pub fn tick(&mut self) {
        self.ticks += 1;
        self.refresh();
    }

    /// Feed a model reply back. Returns false if nobody was waiting for it.
    pub fn apply_reply(&mut self, ticket: u64, result: Result<ModelOutput, String>) -> bool {
        if self.story.pending() == Some(ticket) {
            return self.story.receive(ticket, result);
        }
        for dialogue in [&mut self.polar_bear, &mut self.robot, &mut self.fox] {
            if dialogue.pending() == Some(ticket) {
                return dialogue.receive(ticket, result);
            }
        }
        log::debug!("dropping reply for stale ticket {}", ticket);
        false
    }

    /// Drain model calls requested since the last call.
    pub fn take_requests(&mut self) -> Vec<ModelJob> {
        std::mem::take(&mut self.outbox)
    }

    /// True when at least one NPC is waiting on a model.
    pub fn has_pending(&self) -> bool {
        self.story.pending().is_some()
            || [&self.polar_bear, &self.robot, &self.fox]
                .iter()
                .any(|d| d.pending().is_some())
    }

    fn chat_npc(&self) -> Option<Npc> {
        match self.focus {
            Some(Focus::Npc(npc)) => Some(npc),
            _ => None,
        }
    }

    fn type_char(&mut self, ch: char) -> bool {
        match self.chat_npc() {
            Some(Npc::Moose) | None => false,
            Some(_) => {
                if ch.is_control() || self.input.chars().count() >= MAX_INPUT_CHARS {
                    return false;
                }
                self.input.push(ch);
                true
            }
        }
    }

    fn backspace(&mut self) -> bool {
        match self.chat_npc() {
            Some(Npc::Moose) => {
                self.story.reset();
                let seed = self.seeds.reseed();
                log::info!("story reset, new seed {}", seed);
                true
            }
            Some(_) => self.input.pop().is_some(),
            None => false,
        }
    }

    fn submit(&mut self) -> bool {
        let Some(npc) = self.chat_npc() else {
            return false;
        };
        let ticket = self.next_ticket;

        if npc == Npc::Moose {
            let seed = self.seeds.current();
            let Some(request) = self.story.continue_with(seed, ticket) else {
                return false;
            };
            self.input.clear();
            self.push_job(ticket, npc, request);
            return true;
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            return false;
        }
        let submitted = match self.dialogue_mut(npc) {
            Some(dialogue) => dialogue.submit(&text, ticket),
            None => Submitted::Ignored,
        };
        match submitted {
            Submitted::Request(request) => {
                self.input.clear();
                self.push_job(ticket, npc, request);
                true
            }
            Submitted::Answered => {
                self.input.clear();
                true
            }
            Submitted::Ignored => false,
        }
    }

    fn push_job(&mut self, ticket: u64, npc: Npc, request: ModelRequest) {
        log::debug!(
            "ticket {} -> {} ({})",
            ticket,
            npc.as_str(),
            request.task().as_str()
        );
        self.next_ticket += 1;
        self.outbox.push(ModelJob {
            ticket,
            npc,
            request,
        });
    }

    /// Recompute what the player stands on and commit finished visits.
    fn refresh(&mut self) {
        let focus = self.world.focus();
        if focus != self.focus {
            // Typed text belongs to the conversation it was typed in.
            self.input.clear();
            self.focus = focus;
        }
        self.puzzle.update(focus);
    }

    pub fn title(&self) -> &'static str {
        match self.focus {
            Some(Focus::Prop(prop)) => self.puzzle.title(prop),
            Some(Focus::Npc(npc)) => npc.title(),
            None => IDLE_TITLE,
        }
    }

    /// Build a render snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        let mut snap = GameSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    /// Fill an existing snapshot, reusing its buffers.
    pub fn snapshot_into(&self, snap: &mut GameSnapshot) {
        snap.clear();
        snap.player = self.world.player();
        snap.walls.extend_from_slice(self.world.walls());
        snap.focus = self.focus;
        snap.mode = self.input_mode();
        snap.tree_climbed = self.puzzle.tree() == TreeState::Climbed;
        snap.lock_open = self.puzzle.lock_looks_open();
        snap.key_in_inventory = self.puzzle.key_in_inventory();
        snap.title = self.title();
        snap.ticks = self.ticks;

        match self.focus {
            Some(Focus::Prop(prop)) => snap.body.extend(self.puzzle.lines(prop)),
            Some(Focus::Npc(Npc::Moose)) => {
                snap.body.extend(self.story.lines());
                snap.footer = Some(story_tip());
            }
            Some(Focus::Npc(npc)) => {
                if let Some(dialogue) = self.dialogue(npc) {
                    snap.body.extend(dialogue.lines(&self.input));
                }
            }
            None => {}
        }
    }
}
