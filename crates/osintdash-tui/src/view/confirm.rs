use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use osintdash_core::PendingConfirm;

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the confirmation prompt as a centered modal.
pub fn render(f: &mut Frame, confirm: &PendingConfirm, theme: &Theme) {
    let area = f.area();
    let width = 56.min(area.width);
    let popup = centered_rect(width, 8, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            confirm.message.as_str(),
            Style::default().fg(theme.text),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!(" [y] {} ", confirm.confirm_label),
                Style::default()
                    .fg(theme.header_fg)
                    .bg(theme.danger)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                format!(" [n] {} ", confirm.cancel_label),
                Style::default().fg(theme.text).bg(theme.highlight_bg),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.warning))
                .title(" Confirm Action "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
