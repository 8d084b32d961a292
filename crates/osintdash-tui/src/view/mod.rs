pub mod confirm;
pub mod controls;
pub mod help;
pub mod notifications;
pub mod page;
pub mod table;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Truncate a string to fit in `max_width` columns, appending "…" if truncated.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Create a centered rectangle of the given width (columns) and height (rows).
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("résumé.pdf", 20), "résumé.pdf");
        assert_eq!(truncate("example.com", 5), "exam…");
        assert_eq!(truncate("anything", 0), "");
    }

    #[test]
    fn centered_rect_is_centered() {
        let r = centered_rect(20, 4, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(40, 18, 20, 4));
    }
}
