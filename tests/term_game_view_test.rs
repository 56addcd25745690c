use tui_bear::core::dialogue::story_tip;
use tui_bear::core::{GameState, Line};
use tui_bear::term::{encode_diff_into, encode_full_into, FrameBuffer, GameView, Viewport};
use tui_bear::types::{GameAction, ModelOutput, Npc, Prop, TextColor};

fn row_text(fb: &FrameBuffer, y: u16) -> String {
    (0..fb.width())
        .filter_map(|x| fb.get(x, y))
        .filter(|c| !c.is_continuation())
        .map(|c| c.ch)
        .collect()
}

fn screen_text(fb: &FrameBuffer) -> String {
    (0..fb.height())
        .map(|y| row_text(fb, y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn idle_frame_shows_world_and_panels() {
    let state = GameState::new(1);
    let view = GameView::default();
    let fb = view.render(&state.snapshot(), Viewport::new(100, 35));
    let text = screen_text(&fb);

    // The player sprite starts on row 0 and covers the first columns.
    assert!(row_text(&fb, 0).contains("arrow keys to move."));
    for label in ["BEAR", "TREE", "LOCK", "POLAR", "ROBOT", "FOX", "MOOSE", "INVENTORY:"] {
        assert!(text.contains(label), "missing {label}");
    }
    // Text box title sits on row 27 (y=540).
    assert!(row_text(&fb, 27).contains("PLAYER BEAR:"));
    assert!(!text.contains("KEY "));
}

#[test]
fn tree_prompt_renders_in_text_box() {
    let mut state = GameState::new(1);
    let tree = Prop::Tree.rect();
    state.place_player(tree.x, tree.y);
    let fb = GameView::default().render(&state.snapshot(), Viewport::new(100, 35));

    assert!(row_text(&fb, 27).contains("TREE:"));
    assert!(row_text(&fb, 28).contains("There is a tall tree"));
    assert!(row_text(&fb, 29).contains("Climb tree? Yes [y] or No [n]:"));
}

#[test]
fn held_key_is_drawn_in_inventory() {
    let mut state = GameState::new(1);
    let tree = Prop::Tree.rect();
    state.place_player(tree.x, tree.y);
    state.apply_action(GameAction::Answer(true));
    let fb = GameView::default().render(&state.snapshot(), Viewport::new(100, 35));

    // Inventory key centered at (850, 615): rows 29..=32.
    let rows: String = (29..33).map(|y| row_text(&fb, y)).collect();
    assert!(rows.contains("KEY"));
    assert!(screen_text(&fb).contains("TREE"));
}

#[test]
fn moose_footer_is_pinned_to_bottom_row() {
    let mut state = GameState::new(1);
    let moose = Npc::Moose.rect();
    state.place_player(moose.x, moose.y);
    let fb = GameView::default().render(&state.snapshot(), Viewport::new(100, 35));

    assert!(row_text(&fb, 28).contains("Moose: Once upon a time,"));
    assert!(row_text(&fb, 32).trim_start().starts_with("TIP - Hit RETURN"));
    assert!(row_text(&fb, 33).trim_start().starts_with("reset it."));
}

#[test]
fn story_line_breaks_render_as_spaces() {
    let mut state = GameState::new(1);
    let moose = Npc::Moose.rect();
    state.place_player(moose.x, moose.y);
    state.apply_action(GameAction::Submit);
    let job = state.take_requests().pop().unwrap();
    let story = ModelOutput::TextGeneration {
        generated_text: "Once upon a time,\n\nthere was a bear.".to_string(),
    };
    assert!(state.apply_reply(job.ticket, Ok(story)));

    let fb = GameView::default().render(&state.snapshot(), Viewport::new(100, 35));
    assert!(row_text(&fb, 28).contains("Moose: Once upon a time, there was a bear."));
}

#[test]
fn long_story_keeps_latest_lines_above_footer() {
    let view = GameView::default();
    let body: Vec<Line> = (0..12)
        .map(|i| Line::new(format!("line {i}"), TextColor::Blue))
        .collect();
    let footer = story_tip();
    let placements = view.text_box_lines(&body, Some(&footer));
    assert_eq!(placements.len(), 4);
    assert_eq!(placements[0].text, "line 8");
    assert_eq!(placements[3].text, "line 11");
    assert_eq!(placements[3].y, 620);
    assert_eq!(view.footer_lines(&footer)[0].y, 650);
}

#[test]
fn oversized_terminal_centers_canvas() {
    let state = GameState::new(1);
    let fb = GameView::default().render(&state.snapshot(), Viewport::new(120, 45));
    // (120 - 100) / 2 columns and (45 - 35) / 2 rows of margin.
    assert_eq!(fb.get(9, 5).map(|c| c.ch), Some(' '));
    assert!(row_text(&fb, 5).contains("arrow keys to move."));
    assert_eq!(fb.get(110, 5).map(|c| c.ch), Some(' '));
}

#[test]
fn tiny_terminal_does_not_panic() {
    let state = GameState::new(1);
    let fb = GameView::default().render(&state.snapshot(), Viewport::new(12, 4));
    assert_eq!(fb.width(), 12);
    assert_eq!(fb.height(), 4);
}

#[test]
fn diff_after_one_step_is_smaller_than_full_frame() {
    let mut state = GameState::new(1);
    let view = GameView::default();
    let vp = Viewport::new(100, 35);
    let before = view.render(&state.snapshot(), vp);
    state.apply_action(GameAction::Move(tui_bear::types::Direction::Right));
    let after = view.render(&state.snapshot(), vp);

    let mut full = Vec::new();
    encode_full_into(&after, &mut full).unwrap();
    let mut diff = Vec::new();
    encode_diff_into(&before, &after, &mut diff).unwrap();

    assert!(!diff.is_empty());
    assert!(diff.len() < full.len() / 4);
}
