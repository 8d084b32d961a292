use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Focus};
use crate::view::truncate;

/// Render the dashboard page: header, tables, controls and footer.
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Min(5),    // body
        Constraint::Length(1), // footer
    ])
    .split(area);

    render_header(f, chunks[0], app);
    render_body(f, chunks[1], app);
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(" OSINTDASH ", theme.header_style()),
        Span::styled(
            format!(" {}", app.dashboard.title),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(location) = app.dashboard.location() {
        spans.push(Span::styled(" > ", Style::default().fg(theme.dim)));
        spans.push(Span::styled(location.to_string(), Style::default().fg(theme.active)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(f: &mut Frame, area: Rect, app: &App) {
    let tables = app.dashboard.tables();
    if tables.is_empty() {
        crate::view::controls::render(f, area, app);
        return;
    }

    let columns =
        Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)]).split(area);

    let slots = Layout::vertical(vec![Constraint::Fill(1); tables.len()]).split(columns[0]);
    for (i, table) in tables.iter().enumerate() {
        crate::view::table::render(f, slots[i], app, i, table);
    }
    crate::view::controls::render(f, columns[1], app);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let hints = if app.dashboard.pending_confirm().is_some() {
        " y/Enter:confirm  n/Esc:cancel"
    } else if app.is_editing() {
        " type to edit  Enter:save  Esc:discard"
    } else {
        match app.focus {
            Focus::Table(_) => {
                " h/l:column  s/Enter:sort  j/k:row  Tab:focus  x:dismiss  ?:help  q:quit"
            }
            Focus::Controls => " j/k:select  Enter:click  Tab:focus  x:dismiss  ?:help  q:quit",
            Focus::Fields => " j/k:select  Enter:edit  Tab:focus  x:dismiss  ?:help  q:quit",
        }
    };

    let mut spans = Vec::new();
    if let Some(last) = app.dashboard.diagnostics().last() {
        let width = (area.width as usize).saturating_sub(hints.len() + 20);
        spans.push(Span::styled(
            format!(" [{}] {} ", app.dashboard.diagnostic_count(), truncate(&last.message, width)),
            Style::default().fg(theme.diagnostic_color(last.level)),
        ));
        spans.push(Span::styled("|", theme.footer_style()));
    }
    spans.push(Span::styled(hints, theme.footer_style()));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
