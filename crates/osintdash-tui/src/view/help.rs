use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup = centered_rect(60, 29, area);

    let lines = vec![
        Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.header_bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section_header("Tables", theme),
        key_line("h / ←", "Previous column", theme),
        key_line("l / →", "Next column", theme),
        key_line("s / Enter", "Cycle sort (asc, desc, none)", theme),
        key_line("j / k", "Move row cursor", theme),
        Line::from(""),
        section_header("Actions", theme),
        key_line("j / k", "Select action", theme),
        key_line("Enter", "Run selected action", theme),
        Line::from(""),
        section_header("Fields", theme),
        key_line("Enter", "Edit field, then Enter to save", theme),
        key_line("Esc", "Discard edit", theme),
        Line::from(""),
        section_header("Confirmation", theme),
        key_line("y / Enter", "Confirm", theme),
        key_line("n / Esc", "Cancel", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("Tab / Shift+Tab", "Move focus between panels", theme),
        key_line("x", "Dismiss newest notification", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q / Ctrl+c", "Quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<18}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
