/// Actions that the TUI can process, mapped from keyboard input or internal events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    FocusNext,
    FocusPrev,
    MoveUp,
    MoveDown,
    ColumnLeft,
    ColumnRight,
    /// Enter: click the selected button or header, or accept a prompt.
    Activate,
    /// Click the selected column header.
    SortColumn,
    Accept,
    Cancel,
    DismissNotification,
    ToggleHelp,
    /// A character typed into the field being edited.
    Input(char),
    Backspace,
    Tick,
    None,
}
