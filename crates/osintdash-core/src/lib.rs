//! View-model for the osintdash dashboard: a small element tree, click
//! dispatch to a fixed set of actions, tri-state sortable tables, form
//! field validation and a transient notification surface.
//!
//! Everything here is synchronous and single-threaded except the effects in
//! [`effect`], which the host runs on its async runtime and reports back as
//! [`Completion`]s.

pub mod action;
pub mod clipboard;
pub mod dashboard;
pub mod dispatch;
pub mod dom;
pub mod effect;
pub mod export;
pub mod layout;
pub mod notify;
pub mod selector;
pub mod table;
pub mod validate;

// Re-export for convenience
pub use action::{ActionKind, ActionParams, ActionRequest, ParamsError};
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use dashboard::{ConfirmTarget, Dashboard, Diagnostic, PendingConfirm};
pub use dispatch::{DispatchError, DispatchOutcome, Dispatcher, Handled};
pub use dom::{Document, Element, NodeId};
pub use effect::{Completion, Effect, EffectContext, run_effect};
pub use export::{ExportError, ExportFormat, ExportJob, ExportReceipt};
pub use layout::{LayoutError, PageLayout};
pub use notify::{Notification, NotificationId, Notifications, Severity};
pub use selector::{Selector, SelectorError};
pub use table::{Column, Row, RowId, SortDirection, SortOutcome, SortState, TableView};
pub use validate::{FieldError, FieldKind, validate_field};
