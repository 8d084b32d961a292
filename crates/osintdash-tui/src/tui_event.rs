use osintdash_core::Completion;

/// Events flowing from background effect tasks to the TUI.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// A clipboard write or export finished.
    Completed(Completion),
    /// The task running an effect died before reporting.
    Crashed { effect: &'static str, error: String },
}
