use std::time::Instant;

use osintdash_core::action::ACTION_ATTR;
use osintdash_core::validate::VALUE_ATTR;
use osintdash_core::{
    Dashboard, DispatchOutcome, Dispatcher, Effect, NodeId, Selector, Severity, SortOutcome,
};

use crate::action::Action;
use crate::theme::Theme;
use crate::tui_event::TaskEvent;

/// Which panel receives movement and Enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Index into the dashboard's tables.
    Table(usize),
    Controls,
    /// Form fields; only reachable when the page has any.
    Fields,
}

/// Main application state.
pub struct App {
    pub dashboard: Dashboard,
    dispatcher: Dispatcher,
    /// Clickable elements in document order.
    pub buttons: Vec<NodeId>,
    pub sections: Vec<NodeId>,
    /// Form inputs in document order.
    pub fields: Vec<NodeId>,
    pub focus: Focus,
    /// Selected header per table.
    pub selected_column: Vec<usize>,
    /// Row cursor per table.
    pub row_cursor: Vec<usize>,
    pub button_cursor: usize,
    pub field_cursor: usize,
    /// Edit buffer of the field under the cursor, while editing.
    pub editing: Option<String>,
    pub theme: Theme,
    pub should_quit: bool,
    pub show_help: bool,
}

fn query_all(dashboard: &Dashboard, selector: &str) -> Vec<NodeId> {
    Selector::parse(selector)
        .map(|s| dashboard.document.query_selector_all(&s))
        .unwrap_or_default()
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let buttons = query_all(&dashboard, &format!("[{}]", ACTION_ATTR));
        let sections = query_all(&dashboard, "section");
        let fields = query_all(&dashboard, "form input");
        let table_count = dashboard.tables().len();
        let focus = if table_count > 0 {
            Focus::Table(0)
        } else {
            Focus::Controls
        };

        Self {
            dashboard,
            dispatcher: Dispatcher::new(),
            buttons,
            sections,
            fields,
            focus,
            selected_column: vec![0; table_count],
            row_cursor: vec![0; table_count],
            button_cursor: 0,
            field_cursor: 0,
            editing: None,
            theme: Theme::hacker(),
            should_quit: false,
            show_help: false,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        // Field editing takes raw keys until Enter or Esc
        if let Some(buffer) = self.editing.as_mut() {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::Input(c) => buffer.push(c),
                Action::Backspace => {
                    buffer.pop();
                }
                Action::Activate => self.commit_edit(),
                Action::Cancel => self.editing = None,
                Action::Tick => self.on_tick(),
                _ => {}
            }
            return false;
        }

        // An open confirmation takes every key until it is answered
        if self.dashboard.pending_confirm().is_some() {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::Activate | Action::Accept => self.dashboard.resolve_confirm(true),
                Action::Cancel => self.dashboard.resolve_confirm(false),
                Action::Tick => self.on_tick(),
                _ => {}
            }
            return false;
        }

        // When help overlay is shown, only allow a few actions through
        if self.show_help {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::ToggleHelp | Action::Cancel => {
                    self.show_help = false;
                }
                Action::Tick => self.on_tick(),
                _ => {}
            }
            return false;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::ToggleHelp => {
                self.show_help = true;
            }
            Action::FocusNext => self.focus = self.cycle_focus(true),
            Action::FocusPrev => self.focus = self.cycle_focus(false),
            Action::MoveDown => match self.focus {
                Focus::Table(i) => {
                    let max = self.dashboard.tables()[i].rows().len().saturating_sub(1);
                    if self.row_cursor[i] < max {
                        self.row_cursor[i] += 1;
                    }
                }
                Focus::Controls => {
                    if self.button_cursor + 1 < self.buttons.len() {
                        self.button_cursor += 1;
                    }
                }
                Focus::Fields => {
                    if self.field_cursor + 1 < self.fields.len() {
                        self.field_cursor += 1;
                    }
                }
            },
            Action::MoveUp => match self.focus {
                Focus::Table(i) => self.row_cursor[i] = self.row_cursor[i].saturating_sub(1),
                Focus::Controls => self.button_cursor = self.button_cursor.saturating_sub(1),
                Focus::Fields => self.field_cursor = self.field_cursor.saturating_sub(1),
            },
            Action::ColumnLeft => {
                if let Focus::Table(i) = self.focus {
                    self.selected_column[i] = self.selected_column[i].saturating_sub(1);
                }
            }
            Action::ColumnRight => {
                if let Focus::Table(i) = self.focus {
                    let max = self.dashboard.tables()[i].columns().len().saturating_sub(1);
                    if self.selected_column[i] < max {
                        self.selected_column[i] += 1;
                    }
                }
            }
            Action::Activate => match self.focus {
                Focus::Table(i) => self.click_header(i),
                Focus::Controls => self.click_button(),
                Focus::Fields => self.start_edit(),
            },
            Action::SortColumn => {
                if let Focus::Table(i) = self.focus {
                    self.click_header(i);
                }
            }
            Action::DismissNotification => {
                self.dashboard.notifications.dismiss_latest();
            }
            Action::Tick => self.on_tick(),
            Action::Accept
            | Action::Cancel
            | Action::Input(_)
            | Action::Backspace
            | Action::None => {}
        }
        false
    }

    fn cycle_focus(&self, forward: bool) -> Focus {
        let tables = self.dashboard.tables().len();
        let mut slots: Vec<Focus> = (0..tables).map(Focus::Table).collect();
        slots.push(Focus::Controls);
        if !self.fields.is_empty() {
            slots.push(Focus::Fields);
        }
        let count = slots.len();
        let current = slots.iter().position(|&f| f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        slots[next]
    }

    fn start_edit(&mut self) {
        let Some(&field) = self.fields.get(self.field_cursor) else {
            return;
        };
        let value = self
            .dashboard
            .document
            .get(field)
            .and_then(|e| e.attr(VALUE_ATTR))
            .unwrap_or_default()
            .to_string();
        self.editing = Some(value);
    }

    /// Store the edit buffer and validate the field, as leaving an input
    /// does in a browser.
    fn commit_edit(&mut self) {
        let Some(buffer) = self.editing.take() else {
            return;
        };
        let Some(&field) = self.fields.get(self.field_cursor) else {
            return;
        };
        self.dashboard.set_field_value(field, buffer);
        if let Err(e) = self.dashboard.validate_field(field) {
            tracing::debug!("field {} invalid: {}", self.field_cursor, e);
        }
    }

    /// Click the selected header of table `index`, keeping the cursor on the
    /// same row when the rows move.
    fn click_header(&mut self, index: usize) {
        let Some(table) = self.dashboard.tables().get(index) else {
            return;
        };
        let table_id = table.id().to_string();
        let cursor_row = table.rows().get(self.row_cursor[index]).map(|r| r.id());

        let outcome = self.dashboard.sort_table(&table_id, self.selected_column[index]);
        if let (SortOutcome::Sorted { .. }, Some(row)) = (outcome, cursor_row) {
            if let Some(pos) = self.dashboard.tables()[index].position(row) {
                self.row_cursor[index] = pos;
            }
        }
    }

    fn click_button(&mut self) {
        let Some(&node) = self.buttons.get(self.button_cursor) else {
            return;
        };
        let outcome = self.dispatcher.dispatch(&mut self.dashboard, node);
        if let DispatchOutcome::Rejected(e) = &outcome {
            tracing::debug!("click on button {} rejected: {}", self.button_cursor, e);
        }
    }

    fn on_tick(&mut self) {
        self.dashboard.notifications.expire(Instant::now());
    }

    /// Drain the effect outbox. Navigation and form submission are handled
    /// here; the rest is returned for the runtime to execute.
    pub fn take_background_effects(&mut self) -> Vec<Effect> {
        let mut background = Vec::new();
        for effect in self.dashboard.take_effects() {
            if effect.is_background() {
                background.push(effect);
                continue;
            }
            match effect {
                Effect::Navigate(href) => {
                    self.dashboard.notify(format!("Opening {}", href), Severity::Info);
                }
                Effect::SubmitForm { name, .. } => {
                    self.dashboard.notify(format!("Submitted {}", name), Severity::Info);
                }
                Effect::CopyToClipboard(_) | Effect::Export(_) => {}
            }
        }
        background
    }

    /// Process an event from a background effect task.
    pub fn handle_task_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Completed(completion) => self.dashboard.apply_completion(completion),
            TaskEvent::Crashed { effect, error } => {
                self.dashboard
                    .diagnose(log::Level::Error, format!("{} task failed: {}", effect, error));
                self.dashboard
                    .notify(format!("The {} action failed", effect), Severity::Danger);
            }
        }
    }

    /// Render the current screen.
    pub fn view(&self, f: &mut ratatui::Frame) {
        crate::view::page::render(f, self);
        crate::view::notifications::render(f, self);

        if let Some(confirm) = self.dashboard.pending_confirm() {
            crate::view::confirm::render(f, confirm, &self.theme);
        }

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osintdash_core::notify::DEFAULT_DURATION;
    use osintdash_core::{Completion, ExportError, PageLayout, SortState};

    const LAYOUT: &str = r##"
title = "Investigation: example.com"

[[section]]
id = "whois"
title = "WHOIS"
text = "Registrar: Example Registrar, Inc."

[[form]]
id = "delete-form"
name = "delete"

[[button]]
label = "Toggle WHOIS"
action = "toggle-section"
params = '{"target": "#whois"}'

[[button]]
label = "Delete investigation"
action = "confirm-action"
params = '{"form": "#delete-form", "message": "Delete?"}'

[[button]]
label = "Export"
action = "export-data"
params = '{"table": "hosts", "format": "csv"}'

[[table]]
id = "hosts"
columns = [{ label = "Host", sortable = true }, { label = "Open ports", sortable = true }]
rows = [["b.example.com", "10"], ["a.example.com", "9"], ["c.example.com", "2"]]
"##;

    fn app() -> App {
        let dashboard = PageLayout::from_toml_str(LAYOUT)
            .unwrap()
            .build(DEFAULT_DURATION)
            .unwrap();
        App::new(dashboard)
    }

    fn hosts(app: &App) -> Vec<String> {
        app.dashboard.tables()[0]
            .rows()
            .iter()
            .map(|r| r.cell(0).to_string())
            .collect()
    }

    #[test]
    fn collects_buttons_and_sections() {
        let app = app();
        assert_eq!(app.buttons.len(), 3);
        assert_eq!(app.sections.len(), 1);
        assert_eq!(app.focus, Focus::Table(0));
    }

    #[test]
    fn focus_cycles_through_tables_and_controls() {
        let mut app = app();
        app.update(Action::FocusNext);
        assert_eq!(app.focus, Focus::Controls);
        app.update(Action::FocusNext);
        assert_eq!(app.focus, Focus::Table(0));
        app.update(Action::FocusPrev);
        assert_eq!(app.focus, Focus::Controls);
    }

    #[test]
    fn sorting_keeps_cursor_on_row() {
        let mut app = app();
        // cursor on "b.example.com"
        app.update(Action::ColumnRight);
        app.update(Action::SortColumn);
        assert_eq!(hosts(&app), ["c.example.com", "a.example.com", "b.example.com"]);
        assert_eq!(app.row_cursor[0], 2);
        assert_eq!(
            app.dashboard.tables()[0].columns()[1].state(),
            SortState::Ascending
        );

        app.update(Action::Activate);
        app.update(Action::Activate);
        assert_eq!(app.dashboard.tables()[0].columns()[1].state(), SortState::None);
        assert_eq!(hosts(&app), ["b.example.com", "a.example.com", "c.example.com"]);
    }

    #[test]
    fn toggle_button_hides_section() {
        let mut app = app();
        app.update(Action::FocusNext);
        app.update(Action::Activate);
        assert!(!app.dashboard.document.is_visible(app.sections[0]));
    }

    #[test]
    fn confirmation_captures_keys_until_answered() {
        let mut app = app();
        app.update(Action::FocusNext);
        app.update(Action::MoveDown);
        app.update(Action::Activate);
        assert_eq!(app.dashboard.pending_confirm().unwrap().message, "Delete?");

        // Movement is swallowed while the prompt is open
        app.update(Action::MoveDown);
        assert_eq!(app.button_cursor, 1);

        app.update(Action::Accept);
        assert!(app.dashboard.pending_confirm().is_none());
        assert!(app.take_background_effects().is_empty());
        assert_eq!(
            app.dashboard.notifications.latest().unwrap().message,
            "Submitted delete"
        );
    }

    #[test]
    fn cancel_closes_prompt_without_effects() {
        let mut app = app();
        app.update(Action::FocusNext);
        app.update(Action::MoveDown);
        app.update(Action::Activate);
        app.update(Action::Cancel);
        assert!(app.dashboard.pending_confirm().is_none());
        assert!(app.take_background_effects().is_empty());
        assert!(app.dashboard.notifications.is_empty());
    }

    #[test]
    fn export_is_handed_to_runtime() {
        let mut app = app();
        app.update(Action::FocusNext);
        app.update(Action::MoveDown);
        app.update(Action::MoveDown);
        app.update(Action::Activate);
        let effects = app.take_background_effects();
        assert!(matches!(effects.as_slice(), [Effect::Export(_)]));
    }

    #[test]
    fn task_events_become_notifications() {
        let mut app = app();
        let disk_full = ExportError::from(std::io::Error::other("disk full"));
        app.handle_task_event(TaskEvent::Completed(Completion::Export(Err(disk_full))));
        assert_eq!(
            app.dashboard.notifications.latest().unwrap().severity,
            Severity::Danger
        );

        app.handle_task_event(TaskEvent::Crashed {
            effect: "copy",
            error: "panicked".into(),
        });
        assert_eq!(app.dashboard.notifications.len(), 2);
        assert_eq!(app.dashboard.diagnostic_count(), 1);

        app.update(Action::DismissNotification);
        assert_eq!(app.dashboard.notifications.len(), 1);
    }

    const FORM_LAYOUT: &str = r##"
[[form]]
id = "new-investigation"
name = "create"

[[form.field]]
name = "contact"
type = "email"
required = true

[[button]]
label = "Create"
action = "confirm-action"
params = '{"form": "#new-investigation", "message": "Create?"}'
"##;

    fn form_app() -> App {
        let dashboard = PageLayout::from_toml_str(FORM_LAYOUT)
            .unwrap()
            .build(DEFAULT_DURATION)
            .unwrap();
        App::new(dashboard)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.update(Action::Input(c));
        }
    }

    #[test]
    fn fields_join_the_focus_cycle() {
        let mut app = form_app();
        assert_eq!(app.fields.len(), 1);
        assert_eq!(app.focus, Focus::Controls);
        app.update(Action::FocusNext);
        assert_eq!(app.focus, Focus::Fields);
        app.update(Action::FocusNext);
        assert_eq!(app.focus, Focus::Controls);
    }

    #[test]
    fn editing_a_field_validates_on_commit() {
        let mut app = form_app();
        app.update(Action::FocusNext);
        app.update(Action::Activate);
        assert!(app.is_editing());

        type_text(&mut app, "analyst@example");
        // q is text while editing
        app.update(Action::Input('q'));
        assert!(!app.should_quit);
        app.update(Action::Backspace);
        app.update(Action::Activate);
        assert!(!app.is_editing());

        let field = app.dashboard.document.get(app.fields[0]).unwrap();
        assert_eq!(field.attr(VALUE_ATTR), Some("analyst@example"));
        assert_eq!(field.attr("data-error"), Some("Please enter a valid email address."));
    }

    #[test]
    fn cancelled_edit_keeps_old_value() {
        let mut app = form_app();
        app.update(Action::FocusNext);
        app.update(Action::Activate);
        type_text(&mut app, "x");
        app.update(Action::Cancel);
        assert!(!app.is_editing());
        let field = app.dashboard.document.get(app.fields[0]).unwrap();
        assert_eq!(field.attr(VALUE_ATTR), Some(""));
    }

    #[test]
    fn invalid_form_blocks_submission() {
        let mut app = form_app();
        app.update(Action::Activate);
        app.update(Action::Accept);
        assert!(app.take_background_effects().is_empty());
        assert_eq!(
            app.dashboard.notifications.latest().unwrap().severity,
            Severity::Warning
        );

        app.update(Action::FocusNext);
        app.update(Action::Activate);
        type_text(&mut app, "analyst@example.com");
        app.update(Action::Activate);
        app.update(Action::FocusPrev);
        app.update(Action::Activate);
        app.update(Action::Accept);
        app.take_background_effects();
        assert_eq!(
            app.dashboard.notifications.latest().unwrap().message,
            "Submitted create"
        );
    }

    #[test]
    fn help_overlay_swallows_actions() {
        let mut app = app();
        app.update(Action::ToggleHelp);
        app.update(Action::FocusNext);
        assert_eq!(app.focus, Focus::Table(0));
        app.update(Action::Cancel);
        assert!(!app.show_help);
        assert!(app.update(Action::Quit));
    }
}
