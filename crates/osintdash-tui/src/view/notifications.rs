use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::view::truncate;

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 3;

/// Stack live notifications in the top-right corner, oldest first.
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < TOAST_WIDTH + 2 || area.height < TOAST_HEIGHT + 2 {
        return;
    }
    let theme = &app.theme;
    let fits = ((area.height - 2) / TOAST_HEIGHT) as usize;
    let shown = app.dashboard.notifications.len().min(fits);
    let skip = app.dashboard.notifications.len() - shown;
    let x = area.x + area.width - TOAST_WIDTH - 1;

    for (slot, notification) in app.dashboard.notifications.iter().skip(skip).enumerate() {
        let rect = Rect::new(x, area.y + 1 + slot as u16 * TOAST_HEIGHT, TOAST_WIDTH, TOAST_HEIGHT);
        let color = theme.severity_color(notification.severity);
        let text_width = (TOAST_WIDTH as usize).saturating_sub(6);

        let line = Line::from(vec![
            Span::styled(
                format!("{} ", notification.severity.icon()),
                Style::default().fg(color),
            ),
            Span::styled(
                truncate(&notification.message, text_width),
                Style::default().fg(theme.text),
            ),
        ]);
        let toast = Paragraph::new(line)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(format!(" {} ", notification.severity.label())),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, rect);
        f.render_widget(toast, rect);
    }
}
