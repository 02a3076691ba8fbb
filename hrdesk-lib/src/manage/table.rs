use std::collections::BTreeSet;

use log::{debug, info, warn};

use super::Acknowledgement;
use super::ActiveDialog;
use super::DeleteRequest;
use super::DeleteTarget;
use super::EditRequest;
use super::PendingSubmit;
use super::RowAction;
use super::SubmitOutcome;
use super::SubmitRejected;
use super::Toast;
use super::derive_columns;
use super::display_value;
use crate::error::PersistError;
use crate::error::SchemaError;
use crate::form::FormState;
use crate::form::ValidationErrors;
use crate::form::ValidationResult;
use crate::form::validate_form;
use crate::model::FieldMap;
use crate::model::Record;
use crate::model::Value;
use crate::schema::FieldKind;
use crate::schema::FieldSpec;
use crate::schema::check_fields;
use crate::schema::defaults_for;
use crate::schema::find_field;
use crate::store::RecordHandler;
use crate::table::Column;
use crate::table::SortableTable;
use crate::table::TableView;

/// Field used for delete prompts when no label key is configured.
pub const DEFAULT_LABEL_KEY: &str = "name";

/// A sortable table with schema-driven add/edit/delete dialogs.
#[derive(Debug)]
pub struct ManagementTable {
    /// Singular display name of the records, e.g. `"Role"`.
    entity: String,
    fields: Vec<FieldSpec>,
    items: Vec<Record>,
    label_key: String,
    table: SortableTable<Record>,
    dialog: ActiveDialog,
    form: FormState,
    errors: ValidationErrors,
    submitting: bool,
    deleting: Option<DeleteTarget>,
    /// Rows with a toggle in flight.
    toggling: BTreeSet<i64>,
    toasts: Vec<Toast>,
}

impl ManagementTable {
    /// Create a table whose columns are derived from `fields`.
    pub fn new(entity: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        check_fields(&fields)?;
        let table = SortableTable::new(derive_columns(&fields))?;
        Ok(Self {
            entity: entity.into(),
            fields,
            items: Vec::new(),
            label_key: DEFAULT_LABEL_KEY.to_string(),
            table,
            dialog: ActiveDialog::Closed,
            form: FormState::default(),
            errors: ValidationErrors::new(),
            submitting: false,
            deleting: None,
            toggling: BTreeSet::new(),
            toasts: Vec::new(),
        })
    }

    /// Replace the derived columns with explicit ones.
    pub fn with_columns(mut self, columns: Vec<Column<Record>>) -> Result<Self, SchemaError> {
        self.table.set_columns(columns)?;
        Ok(self)
    }

    /// Use another field as the record label in delete prompts.
    pub fn with_label_key(mut self, key: impl Into<String>) -> Self {
        self.label_key = key.into();
        self
    }

    /// Enable pagination.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.table.set_page_size(Some(page_size));
        self
    }

    /// Set the text shown when there are no records.
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.table = self.table.with_empty_text(text);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Singular display name of the records.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The field schema.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// The records last passed to [`set_items`](Self::set_items).
    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// Replace the records, typically after a refetch.
    pub fn set_items(&mut self, items: Vec<Record>) {
        self.items = items;
    }

    /// Find a record by id.
    pub fn record(&self, id: i64) -> Option<&Record> {
        self.items.iter().find(|r| r.id() == id)
    }

    /// The open dialog.
    pub fn dialog(&self) -> &ActiveDialog {
        &self.dialog
    }

    /// The form of the open dialog.
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Inline errors of the open dialog.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Returns `true` while a submit is in flight; the submit action is disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Returns `true` while a confirmed delete is in flight.
    pub fn is_deleting(&self) -> bool {
        self.deleting.is_some()
    }

    /// Returns `true` while a toggle on the row is in flight.
    pub fn is_toggling(&self, id: i64) -> bool {
        self.toggling.contains(&id)
    }

    /// The inner sortable table.
    pub fn table(&self) -> &SortableTable<Record> {
        &self.table
    }

    /// Mutable access to the inner table for sorting and paging.
    pub fn table_mut(&mut self) -> &mut SortableTable<Record> {
        &mut self.table
    }

    /// Columns in display order: explicit ones, or one per field.
    pub fn columns(&self) -> &[Column<Record>] {
        self.table.columns()
    }

    /// Render the table over the current items.
    pub fn view(&self, loading: bool) -> TableView {
        self.table.view(&self.items, loading)
    }

    /// Label of a record for prompts: the label key, then `name`, then `#id`.
    pub fn record_label(&self, record: &Record) -> String {
        [self.label_key.as_str(), DEFAULT_LABEL_KEY]
            .iter()
            .map(|key| record.value(key))
            .find(|value| !value.is_blank())
            .map(|value| display_value(&value))
            .unwrap_or_else(|| format!("#{}", record.id()))
    }

    /// Title of the open dialog.
    pub fn dialog_title(&self) -> Option<String> {
        match &self.dialog {
            ActiveDialog::Closed => None,
            ActiveDialog::Add => Some(format!("Add {}", self.entity)),
            ActiveDialog::Edit(_) => Some(format!("Edit {}", self.entity)),
            ActiveDialog::ConfirmDelete(_) => Some(format!("Delete {}", self.entity)),
            ActiveDialog::Acknowledge(ack) => Some(ack.title.clone()),
        }
    }

    /// Drain queued notifications.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    // -------------------------------------------------------------------------
    // Dialog lifecycle
    // -------------------------------------------------------------------------

    /// Open the add dialog with a fresh form. Ignored while any dialog is open.
    pub fn open_add(&mut self) -> bool {
        if self.dialog.is_open() {
            return false;
        }
        self.form = FormState::for_add(&self.fields);
        self.errors.clear();
        self.dialog = ActiveDialog::Add;
        debug!("Opened add dialog for {}", self.entity);
        true
    }

    /// Open the edit dialog for a record. Ignored while any dialog is open.
    pub fn open_edit(&mut self, id: i64) -> bool {
        if self.dialog.is_open() {
            return false;
        }
        let Some(record) = self.record(id).cloned() else {
            warn!("Cannot edit {} {}: not in the current items", self.entity, id);
            return false;
        };
        self.form = FormState::for_edit(record.clone());
        self.errors.clear();
        self.dialog = ActiveDialog::Edit(record);
        debug!("Opened edit dialog for {} {}", self.entity, id);
        true
    }

    /// Run a row action.
    pub fn apply_action(&mut self, action: RowAction, id: i64) -> bool {
        match action {
            RowAction::Edit => self.open_edit(id),
            RowAction::Delete => self.request_delete(id),
        }
    }

    /// Close the open dialog and discard its form.
    ///
    /// Refused while a submit or delete is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.submitting || self.deleting.is_some() || !self.dialog.is_open() {
            return false;
        }
        self.close();
        true
    }

    fn close(&mut self) {
        self.dialog = ActiveDialog::Closed;
        self.form.clear();
        self.errors.clear();
    }

    // -------------------------------------------------------------------------
    // Form editing
    // -------------------------------------------------------------------------

    /// Set a form field and clear its error.
    ///
    /// Ignored without an open form, while submitting, and for unknown or
    /// readonly fields.
    pub fn set_field(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if !self.dialog.is_form() || self.submitting {
            return false;
        }
        if !find_field(&self.fields, key).is_some_and(|f| !f.readonly) {
            return false;
        }
        self.form.set(key, value);
        self.errors.remove(key);
        true
    }

    /// Set a form field from typed text.
    pub fn input(&mut self, key: &str, text: impl Into<String>) -> bool {
        self.set_field(key, Value::String(text.into()))
    }

    /// Flip a switch field in the form.
    pub fn toggle_field(&mut self, key: &str) -> bool {
        if !find_field(&self.fields, key).is_some_and(|f| f.kind == FieldKind::Switch) {
            return false;
        }
        let current = self.form.effective(key).as_bool().unwrap_or(false);
        self.set_field(key, !current)
    }

    // -------------------------------------------------------------------------
    // Submit
    // -------------------------------------------------------------------------

    /// Validate the open form and produce the request to send.
    ///
    /// On success the table is marked submitting until
    /// [`finish_submit`](Self::finish_submit). On validation failure every
    /// failing field gets an inline error and nothing is sent.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, SubmitRejected> {
        if self.submitting {
            return Err(SubmitRejected::Busy);
        }
        if !self.dialog.is_form() {
            return Err(SubmitRejected::NoDialog);
        }

        if let ValidationResult::Invalid(errors) = validate_form(&self.fields, &self.form) {
            self.errors = errors.into();
            warn!(
                "{} form has {} invalid field(s)",
                self.entity,
                self.errors.len()
            );
            return Err(SubmitRejected::Invalid(self.errors.clone()));
        }
        self.errors.clear();

        let pending = match &self.dialog {
            ActiveDialog::Edit(record) => PendingSubmit::Edit {
                id: record.id(),
                data: self.form.coerced(&self.fields),
            },
            _ => {
                let mut data: FieldMap = defaults_for(&self.fields);
                data.extend(self.form.coerced(&self.fields));
                PendingSubmit::Add { data }
            }
        };

        self.submitting = true;
        Ok(pending)
    }

    /// Apply the handler's answer to a submit.
    pub fn finish_submit(&mut self, result: Result<(), PersistError>) -> SubmitOutcome {
        self.submitting = false;
        let editing = matches!(self.dialog, ActiveDialog::Edit(_));
        let (verb, past) = if editing {
            ("update", "updated")
        } else {
            ("add", "added")
        };

        match result {
            Ok(()) => {
                info!("{} {}", self.entity, past);
                self.close();
                self.toasts
                    .push(Toast::success(format!("{} {} successfully", self.entity, past)));
                SubmitOutcome::Saved
            }
            Err(PersistError::Fields(field_errors)) => {
                let mut unmatched = Vec::new();
                let mut matched = 0;
                for (key, message) in field_errors {
                    if find_field(&self.fields, &key).is_some() {
                        self.errors.insert(key, message);
                        matched += 1;
                    } else {
                        unmatched.push(message);
                    }
                }
                warn!(
                    "Failed to {} {}: {} field error(s), {} unrecognized",
                    verb,
                    self.entity,
                    matched,
                    unmatched.len()
                );
                if !unmatched.is_empty() {
                    self.toasts.push(Toast::error(format!(
                        "Failed to {} {}: {}",
                        verb,
                        self.entity.to_lowercase(),
                        unmatched.join("; ")
                    )));
                } else if matched == 0 {
                    self.toasts.push(Toast::error(format!(
                        "Failed to {} {}",
                        verb,
                        self.entity.to_lowercase()
                    )));
                }
                if matched > 0 {
                    SubmitOutcome::FieldErrors
                } else {
                    SubmitOutcome::Failed
                }
            }
            Err(PersistError::Generic(message)) => {
                warn!("Failed to {} {}: {}", verb, self.entity, message);
                self.toasts.push(Toast::error(format!(
                    "Failed to {} {}: {}",
                    verb,
                    self.entity.to_lowercase(),
                    message
                )));
                SubmitOutcome::Failed
            }
        }
    }

    /// Validate, send and apply the result in one step.
    pub async fn submit<H: RecordHandler + ?Sized>(
        &mut self,
        handler: &H,
    ) -> Result<SubmitOutcome, SubmitRejected> {
        let pending = self.begin_submit()?;
        let result = pending.send(handler).await;
        Ok(self.finish_submit(result))
    }

    // -------------------------------------------------------------------------
    // Inline switch toggles
    // -------------------------------------------------------------------------

    /// Build the single-field patch for toggling a switch cell.
    ///
    /// Only editable switch fields of the schema toggle, only while no dialog
    /// is open, and only one toggle per row until
    /// [`finish_toggle`](Self::finish_toggle).
    pub fn begin_toggle(&mut self, id: i64, key: &str) -> Option<EditRequest> {
        if self.dialog.is_open() || self.toggling.contains(&id) {
            return None;
        }
        let field = find_field(&self.fields, key)?;
        if field.kind != FieldKind::Switch || field.readonly {
            return None;
        }
        let current = self.record(id)?.value(key).as_bool().unwrap_or(false);

        let mut data = FieldMap::new();
        data.insert(key.to_string(), Value::Bool(!current));
        self.toggling.insert(id);
        debug!("Toggling {} on {} {} to {}", key, self.entity, id, !current);
        Some(EditRequest { id, data })
    }

    /// Apply the handler's answer to a toggle of row `id`. Returns `true` on
    /// success.
    pub fn finish_toggle(&mut self, id: i64, result: Result<(), PersistError>) -> bool {
        self.toggling.remove(&id);
        match result {
            Ok(()) => {
                self.toasts
                    .push(Toast::success(format!("{} updated successfully", self.entity)));
                true
            }
            Err(err) => {
                warn!("Failed to toggle {} {}: {}", self.entity, id, err);
                self.toasts.push(Toast::error(format!(
                    "Failed to update {}: {}",
                    self.entity.to_lowercase(),
                    err
                )));
                false
            }
        }
    }

    /// Toggle a switch cell through the handler, bypassing any dialog.
    pub async fn toggle<H: RecordHandler + ?Sized>(
        &mut self,
        handler: &H,
        id: i64,
        key: &str,
    ) -> Option<bool> {
        let request = self.begin_toggle(id, key)?;
        let result = request.send(handler).await;
        Some(self.finish_toggle(id, result))
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    /// Ask for confirmation before deleting a record.
    pub fn request_delete(&mut self, id: i64) -> bool {
        if self.dialog.is_open() {
            return false;
        }
        let Some(record) = self.record(id) else {
            return false;
        };
        let target = DeleteTarget {
            id,
            label: self.record_label(record),
        };
        debug!("Confirming delete of {} {}", self.entity, id);
        self.dialog = ActiveDialog::ConfirmDelete(target);
        true
    }

    /// The affirmative confirmation. Returns the delete to send.
    ///
    /// This is the only way to obtain a [`DeleteRequest`].
    pub fn confirm_delete(&mut self) -> Option<DeleteRequest> {
        if self.deleting.is_some() {
            return None;
        }
        let ActiveDialog::ConfirmDelete(target) = &self.dialog else {
            return None;
        };
        let request = DeleteRequest { id: target.id };
        self.deleting = Some(target.clone());
        Some(request)
    }

    /// Apply the handler's answer to a delete.
    ///
    /// Either way an acknowledgment dialog replaces the confirmation and a
    /// toast is queued. The row is never removed locally; refetch on success.
    pub fn finish_delete(&mut self, result: Result<(), PersistError>) -> bool {
        let Some(target) = self.deleting.take() else {
            return false;
        };
        let success = result.is_ok();
        let ack = match result {
            Ok(()) => {
                info!("{} {} deleted", self.entity, target.id);
                self.toasts
                    .push(Toast::success(format!("{} deleted successfully", self.entity)));
                Acknowledgement {
                    success: true,
                    title: "Deleted!".to_string(),
                    message: format!("\"{}\" has been deleted.", target.label),
                }
            }
            Err(err) => {
                warn!("Failed to delete {} {}: {}", self.entity, target.id, err);
                self.toasts.push(Toast::error(format!(
                    "Failed to delete {}",
                    self.entity.to_lowercase()
                )));
                Acknowledgement {
                    success: false,
                    title: "Delete failed".to_string(),
                    message: format!("Could not delete \"{}\": {}", target.label, err),
                }
            }
        };
        self.dialog = ActiveDialog::Acknowledge(ack);
        success
    }

    /// Send a confirmed delete through the handler.
    ///
    /// Returns `None` unless a confirmation dialog is open.
    pub async fn delete<H: RecordHandler + ?Sized>(&mut self, handler: &H) -> Option<bool> {
        let request = self.confirm_delete()?;
        let result = request.send(handler).await;
        Some(self.finish_delete(result))
    }
}
