//! Plain-text rendering of a `GridView` for the terminal.
//!
//! Placed words are shown as-is (the anchor gets a trailing `*`), live
//! candidates as `rank:word` with 1-based ranks, empty canvas cells as `.`.

use wordgrid_core::{GridView, Position, SessionState, ViewCell};

fn cell_text(view: &GridView, position: Position) -> String {
    match view.cell_at(position) {
        ViewCell::Empty => ".".to_string(),
        ViewCell::Placed(word) if view.anchor == Some(position) => format!("{}*", word),
        ViewCell::Placed(word) => word.to_string(),
        ViewCell::Candidate { rank, word } => format!("{}:{}", rank + 1, word),
    }
}

/// Render the canvas, one line per row, columns padded to equal width.
pub fn render_grid(view: &GridView) -> String {
    let rows: Vec<Vec<String>> = (0..view.canvas_rows)
        .map(|r| {
            (0..view.canvas_cols)
                .map(|c| cell_text(view, Position::new(r, c)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..view.canvas_cols)
        .map(|c| {
            rows.iter()
                .map(|row| row[c].chars().count())
                .max()
                .unwrap_or(1)
        })
        .collect();

    let mut out = String::new();
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{:<width$}", text, width = *width))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// One-line hint describing what the session is waiting for.
pub fn render_status(view: &GridView) -> String {
    if view.state == SessionState::Empty {
        return "Type a first word to start.".to_string();
    }
    if view.fetch_pending {
        return "Waiting for suggestions...".to_string();
    }
    if view.fetch_failed {
        return "Suggestions failed. [r] retry  [s] save  [q] finish".to_string();
    }
    if view.candidates.is_empty() {
        return "No suggestions came back. [r] retry  [s] save  [q] finish".to_string();
    }
    let choices: Vec<String> = view
        .candidates
        .iter()
        .map(|c| format!("[{}] {}", c.rank + 1, c.word))
        .collect();
    format!("{}  [s] save  [q] finish", choices.join("  "))
}
