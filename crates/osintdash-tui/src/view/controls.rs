use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use osintdash_core::action::ACTION_ATTR;
use osintdash_core::validate::{ERROR_ATTR, INVALID_CLASS, REQUIRED_ATTR, VALUE_ATTR};

use crate::app::{App, Focus};
use crate::view::truncate;

/// Render the action buttons, then form fields (if any), then the page
/// sections.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let button_rows = (app.buttons.len() as u16).saturating_add(2).min(area.height / 2);
    // Two lines per field: value and error
    let field_rows = if app.fields.is_empty() {
        0
    } else {
        (app.fields.len() as u16 * 2).saturating_add(2).min(area.height / 3)
    };
    let chunks = Layout::vertical([
        Constraint::Length(button_rows),
        Constraint::Length(field_rows),
        Constraint::Min(3),
    ])
    .split(area);

    render_buttons(f, chunks[0], app);
    if field_rows > 0 {
        render_fields(f, chunks[1], app);
    }
    render_sections(f, chunks[2], app);
}

fn render_buttons(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Controls;
    let doc = &app.dashboard.document;
    let label_width = (area.width as usize).saturating_sub(20);

    let items: Vec<ListItem> = app
        .buttons
        .iter()
        .map(|&node| {
            let label = doc.text_content(node);
            let action = doc
                .get(node)
                .and_then(|e| e.attr(ACTION_ATTR))
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", truncate(label.trim(), label_width)),
                    Style::default().fg(theme.text),
                ),
                Span::styled(format!("[{}]", action), Style::default().fg(theme.dim)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(focused))
                .title(" Actions "),
        )
        .highlight_style(theme.highlight_style())
        .highlight_symbol("▶");

    let mut state = ListState::default();
    if focused && !app.buttons.is_empty() {
        state.select(Some(app.button_cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_fields(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Fields;
    let doc = &app.dashboard.document;
    let value_width = (area.width as usize).saturating_sub(24);

    let items: Vec<ListItem> = app
        .fields
        .iter()
        .enumerate()
        .filter_map(|(i, &node)| {
            let field = doc.get(node)?;
            let label = field
                .attr("data-label")
                .or_else(|| field.attr("name"))
                .unwrap_or("field");
            let marker = if field.attr(REQUIRED_ATTR).is_some() { "*" } else { "" };
            let value = match (&app.editing, i == app.field_cursor) {
                (Some(buffer), true) => format!("{}▏", buffer),
                _ => field.attr(VALUE_ATTR).unwrap_or_default().to_string(),
            };
            let value_color = if field.has_class(INVALID_CLASS) {
                theme.danger
            } else {
                theme.text
            };

            let mut lines = vec![Line::from(vec![
                Span::styled(format!(" {}{}: ", label, marker), Style::default().fg(theme.dim)),
                Span::styled(truncate(&value, value_width), Style::default().fg(value_color)),
            ])];
            let error = field.attr(ERROR_ATTR).unwrap_or_default();
            lines.push(Line::from(Span::styled(
                format!("   {}", error),
                Style::default().fg(theme.danger),
            )));
            Some(ListItem::new(lines))
        })
        .collect();

    let title = if app.editing.is_some() {
        " Fields (editing) "
    } else {
        " Fields "
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(focused))
                .title(title),
        )
        .highlight_style(theme.highlight_style())
        .highlight_symbol("▶");

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.field_cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_sections(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let doc = &app.dashboard.document;
    let mut lines: Vec<Line> = Vec::new();

    for &node in &app.sections {
        let Some(section) = doc.get(node) else {
            continue;
        };
        let title = section
            .attr("data-title")
            .map(str::to_string)
            .or_else(|| section.id.clone())
            .unwrap_or_else(|| "section".to_string());

        if doc.is_visible(node) {
            lines.push(Line::from(Span::styled(
                format!("▾ {}", title),
                Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
            )));
            let text = doc.text_content(node);
            if !text.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", text),
                    Style::default().fg(theme.text),
                )));
            }
        } else {
            lines.push(Line::from(Span::styled(
                format!("▸ {} (hidden)", title),
                Style::default().fg(theme.dim),
            )));
        }
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(false))
                .title(" Sections "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
