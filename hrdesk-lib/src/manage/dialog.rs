//! Dialog state and the requests a table hands to its caller.

use crate::error::PersistError;
use crate::form::ValidationErrors;
use crate::model::FieldMap;
use crate::model::Record;
use crate::store::RecordHandler;

/// The one dialog a management table may have open.
///
/// Add and edit (and the delete confirmation) are variants of a single enum,
/// so two dialogs can never be open at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActiveDialog {
    /// No dialog; the table is interactive.
    #[default]
    Closed,
    /// Create form.
    Add,
    /// Edit form for the given record.
    Edit(Record),
    /// Destructive-action confirmation.
    ConfirmDelete(DeleteTarget),
    /// Result of a delete, waiting to be dismissed.
    Acknowledge(Acknowledgement),
}

impl ActiveDialog {
    /// Returns `true` unless the dialog is closed.
    pub fn is_open(&self) -> bool {
        !matches!(self, ActiveDialog::Closed)
    }

    /// Returns `true` for the add and edit forms.
    pub fn is_form(&self) -> bool {
        matches!(self, ActiveDialog::Add | ActiveDialog::Edit(_))
    }
}

/// The record a delete confirmation refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    /// Record id.
    pub id: i64,
    /// Display label shown in the prompt.
    pub label: String,
}

impl DeleteTarget {
    /// Confirmation prompt text.
    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete \"{}\"? This action cannot be undone.",
            self.label
        )
    }
}

/// Outcome of a delete, shown until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    /// Whether the delete succeeded.
    pub success: bool,
    /// Dialog title.
    pub title: String,
    /// Dialog message.
    pub message: String,
}

/// A validated add or edit ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingSubmit {
    /// Create with the full form data.
    Add {
        /// Form values merged over defaults.
        data: FieldMap,
    },
    /// Patch with only the touched fields.
    Edit {
        /// Record id.
        id: i64,
        /// Touched fields.
        data: FieldMap,
    },
}

impl PendingSubmit {
    /// Send this request through a handler.
    pub async fn send<H: RecordHandler + ?Sized>(self, handler: &H) -> Result<(), PersistError> {
        match self {
            PendingSubmit::Add { data } => handler.add(data).await,
            PendingSubmit::Edit { id, data } => handler.edit(id, data).await,
        }
    }
}

/// A single-field patch produced by an inline switch toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    /// Record id.
    pub id: i64,
    /// The one field being changed.
    pub data: FieldMap,
}

impl EditRequest {
    /// Send this patch through a handler.
    pub async fn send<H: RecordHandler + ?Sized>(self, handler: &H) -> Result<(), PersistError> {
        handler.edit(self.id, self.data).await
    }
}

/// A confirmed delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    /// Record id.
    pub id: i64,
}

impl DeleteRequest {
    /// Send this delete through a handler.
    pub async fn send<H: RecordHandler + ?Sized>(self, handler: &H) -> Result<(), PersistError> {
        handler.delete(self.id).await
    }
}

/// Why a submit did not produce a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitRejected {
    /// No add or edit dialog is open.
    #[error("no form is open")]
    NoDialog,
    /// A submit is already in flight.
    #[error("a submit is already in progress")]
    Busy,
    /// Validation failed; errors are now shown in the dialog.
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(ValidationErrors),
}

/// What happened to a submit once the handler answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; the dialog closed.
    Saved,
    /// The backend rejected fields; errors are shown inline.
    FieldErrors,
    /// The backend failed; a toast was queued and the dialog stays open.
    Failed,
}

/// Row-level actions offered next to each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

impl RowAction {
    /// All row actions in display order.
    pub const ALL: [RowAction; 2] = [RowAction::Edit, RowAction::Delete];

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
        }
    }

    /// Key hint.
    pub fn hint(&self) -> &'static str {
        match self {
            RowAction::Edit => "e",
            RowAction::Delete => "d",
        }
    }
}
