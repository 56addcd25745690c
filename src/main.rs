//! Terminal bear game runner (default binary).
//!
//! Fixed 16ms ticks: held arrows step the bear, model requests go out to the
//! model runtime, replies come back without blocking a frame, and the frame
//! is redrawn through the diffing renderer.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use tui_bear::core::{GameSnapshot, GameState};
use tui_bear::input::{handle_key_event, should_quit, MovementHandler};
use tui_bear::models::ModelRuntime;
use tui_bear::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tui_bear::types::{GameAction, TICK_MS};

fn main() -> Result<()> {
    tui_bear::init_file_logging()?;
    let seed = tui_bear::seed_from_env();
    log::info!("starting tui-bear with seed {}", seed);

    let models = ModelRuntime::start_from_env()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, models, seed);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = &result {
        log::error!("game loop failed: {:#}", e);
    }
    result
}

fn run(term: &mut TerminalRenderer, mut models: ModelRuntime, seed: u32) -> Result<()> {
    let mut game_state = GameState::new(seed);
    let view = GameView::default();
    let mut movement = MovementHandler::new();

    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        game_state.snapshot_into(&mut snap);
        let (w, h) = crossterm::terminal::size().unwrap_or((100, 35));
        view.render_into(&snap, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        let mode = game_state.input_mode();
                        if should_quit(key, mode) {
                            return Ok(());
                        }

                        if let Some(action) = movement.handle_key_press(key.code) {
                            game_state.apply_action(action);
                        }

                        match handle_key_event(key, mode) {
                            // Held arrows are stepped by the movement handler.
                            Some(GameAction::Move(_)) | None => {}
                            Some(action) => {
                                game_state.apply_action(action);
                            }
                        }
                    }
                    KeyEventKind::Release => {
                        movement.handle_key_release(key.code);
                    }
                },
                Event::Resize(_, _) => term.invalidate(),
                Event::FocusLost => movement.reset(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            for action in movement.update(TICK_MS) {
                game_state.apply_action(action);
            }

            for job in game_state.take_requests() {
                if !models.submit(job.ticket, job.request) {
                    game_state.apply_reply(job.ticket, Err("model runtime stopped".to_string()));
                }
            }
            while let Some(reply) = models.try_recv() {
                if !game_state.apply_reply(reply.ticket, reply.result) {
                    log::debug!("dropped stale reply for ticket {}", reply.ticket);
                }
            }

            game_state.tick();
            if game_state.should_quit() {
                return Ok(());
            }
        }
    }
}
