use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Render the tracker percentage as a fixed-width text bar, e.g.
/// `[#######...] 70`. Used by the detail screen and the editor's slider row.
pub(crate) fn tracker_bar(tracker: i64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let clamped = tracker.clamp(0, 100) as usize;
    let filled = clamped * width / 100;
    let mut bar = String::with_capacity(width + 8);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&".".repeat(width - filled));
    bar.push(']');
    bar.push(' ');
    bar.push_str(&tracker.to_string());
    bar
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
