use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use osintdash_core::TableView;

use crate::app::{App, Focus};

/// Render one sortable table. Header labels carry the column's sort indicator.
pub fn render(f: &mut Frame, area: Rect, app: &App, index: usize, table: &TableView) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Table(index);
    let selected_column = app.selected_column.get(index).copied().unwrap_or(0);

    let header = Row::new(table.columns().iter().enumerate().map(|(i, column)| {
        let label = format!("{}{}", column.label, column.state().indicator());
        let style = if focused && i == selected_column {
            theme.selected_column_style()
        } else if column.sortable {
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim).add_modifier(Modifier::BOLD)
        };
        Cell::from(label).style(style)
    }))
    .height(1);

    let width = table.columns().len();
    let rows: Vec<Row> = table
        .rows()
        .iter()
        .map(|row| {
            Row::new((0..width).map(|i| Cell::from(row.cell(i).to_string())))
                .style(Style::default().fg(theme.text))
        })
        .collect();

    let widths = vec![Constraint::Fill(1); width];

    let sort = match table.active_sort() {
        Some((column, _)) => {
            let column = &table.columns()[column];
            format!(" · {} {}", column.label, column.state().label())
        }
        None => String::new(),
    };

    let widget = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(focused))
                .title(format!(" {} ({} rows){} ", table.title, table.rows().len(), sort)),
        )
        .row_highlight_style(theme.highlight_style());

    let mut state = TableState::default();
    if focused && !table.rows().is_empty() {
        state.select(app.row_cursor.get(index).copied());
    }
    f.render_stateful_widget(widget, area, &mut state);
}
