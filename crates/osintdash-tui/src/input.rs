use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::Action;

/// Map a crossterm terminal event to a TUI action.
pub fn map_event(event: &Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        _ => Action::None,
    }
}

/// Map an event while a form field is being edited: printable keys are
/// text, Enter commits and Esc cancels.
pub fn map_edit_event(event: &Event) -> Action {
    let Event::Key(key) = event else {
        return Action::None;
    };
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match key.code {
        KeyCode::Enter => Action::Activate,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char(c) => Action::Input(c),
        _ => Action::None,
    }
}

fn map_key(key: &KeyEvent) -> Action {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrev,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('h') | KeyCode::Left => Action::ColumnLeft,
        KeyCode::Char('l') | KeyCode::Right => Action::ColumnRight,
        KeyCode::Enter => Action::Activate,
        KeyCode::Char('s') => Action::SortColumn,
        KeyCode::Char('y') => Action::Accept,
        KeyCode::Char('n') | KeyCode::Esc => Action::Cancel,
        KeyCode::Char('x') => Action::DismissNotification,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}
