//! Text layout - greedy word wrap for the text box.
//!
//! Layout is pure: it takes logical lines, a width budget and a measuring
//! function supplied by the renderer, and returns positioned sub-lines plus
//! the y coordinate below the last one so callers can stack blocks.
//!
//! Wrapping rules:
//! - a line of plain spaces that fits is emitted verbatim (spacing preserved)
//! - otherwise words are packed greedily, joined by single spaces; line
//!   breaks and tabs count as word separators
//! - a candidate is measured without the trailing space that would follow it
//! - a word wider than the budget sits alone on its line, unsplit
//! - an empty line still occupies one row

use tui_bear_types::TextColor;

/// One logical line of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub text: String,
    pub color: TextColor,
}

impl Line {
    pub fn new(text: impl Into<String>, color: TextColor) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    pub fn black(text: impl Into<String>) -> Self {
        Self::new(text, TextColor::Black)
    }

    pub fn blue(text: impl Into<String>) -> Self {
        Self::new(text, TextColor::Blue)
    }
}

/// A rendered sub-line and where to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub text: String,
    pub color: TextColor,
    pub x: i32,
    pub y: i32,
}

/// Result of laying out a block of lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    pub placements: Vec<Placement>,
    /// y of the row immediately below the last placement.
    pub next_y: i32,
}

/// Lay out `lines` starting at `origin`, one row of `line_height` per
/// rendered sub-line.
///
/// # Examples
///
/// ```
/// use tui_bear_core::layout::{layout, Line};
///
/// let lines = [Line::black("abcdefghij klmnop qrstuv")];
/// let out = layout(&lines, (10, 560), 20, 100, |s, _| s.len() as u32 * 10);
///
/// let texts: Vec<&str> = out.placements.iter().map(|p| p.text.as_str()).collect();
/// assert_eq!(texts, ["abcdefghij", "klmnop", "qrstuv"]);
/// assert_eq!(out.placements[2].y, 600);
/// assert_eq!(out.next_y, 620);
/// ```
pub fn layout<M>(
    lines: &[Line],
    origin: (i32, i32),
    line_height: i32,
    max_width: u32,
    mut measure: M,
) -> Layout
where
    M: FnMut(&str, TextColor) -> u32,
{
    let (x, mut y) = origin;
    let mut placements = Vec::with_capacity(lines.len());

    for line in lines {
        let color = line.color;
        for text in wrap_line(&line.text, max_width, |s| measure(s, color)) {
            placements.push(Placement { text, color, x, y });
            y += line_height;
        }
    }

    Layout {
        placements,
        next_y: y,
    }
}

/// Wrap a single line into sub-lines no wider than `max_width`.
///
/// Always returns at least one entry.
pub fn wrap_line<M>(text: &str, max_width: u32, mut measure: M) -> Vec<String>
where
    M: FnMut(&str) -> u32,
{
    let plain = !text.chars().any(|c| c.is_whitespace() && c != ' ');
    if plain && measure(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut committed = String::new();
    let mut candidate = String::new();

    for word in text.split_whitespace() {
        candidate.clear();
        candidate.push_str(&committed);
        if !candidate.is_empty() {
            candidate.push(' ');
        }
        candidate.push_str(word);

        // A lone word is kept even when it overflows.
        if committed.is_empty() || measure(&candidate) <= max_width {
            std::mem::swap(&mut committed, &mut candidate);
        } else {
            out.push(std::mem::take(&mut committed));
            committed.push_str(word);
        }
    }

    if !committed.is_empty() {
        out.push(committed);
    }
    if out.is_empty() {
        // Whitespace-only input that does not fit.
        out.push(String::new());
    }
    out
}
