//! SortableTable and its rendered view.

use std::fmt;
use std::sync::Arc;

use log::debug;

use super::Cell;
use super::Column;
use super::PageInfo;
use super::SortDirection;
use super::SortState;
use super::TableRecord;
use super::check_columns;
use super::compare_for_sort;
use super::next_sort;
use super::paginate;
use crate::error::SchemaError;

/// Text shown in place of rows while data is loading.
pub const LOADING_TEXT: &str = "Loading…";

/// Text shown when there are no rows.
pub const DEFAULT_EMPTY_TEXT: &str = "No records found.";

/// Produces a row key from a record and its index on the displayed page.
pub type RowKeyFn<R> = Arc<dyn Fn(&R, usize) -> String + Send + Sync>;

/// One header cell of the rendered table.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    /// Column key.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Whether the header can be clicked to sort.
    pub sortable: bool,
    /// Direction if this is the sorted column.
    pub sort: Option<SortDirection>,
}

impl HeaderCell {
    /// Header text with the sort indicator appended.
    pub fn title(&self) -> String {
        match self.sort {
            Some(direction) => format!("{} {}", self.label, direction.indicator()),
            None => self.label.clone(),
        }
    }
}

/// One rendered data row.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    /// Row key, unique on the displayed page.
    pub key: String,
    /// Id of the record behind the row.
    pub id: i64,
    /// One cell per column.
    pub cells: Vec<Cell>,
}

/// Body of the rendered table.
///
/// Loading takes precedence over empty, which takes precedence over rows.
#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    /// Single placeholder row spanning all columns.
    Loading {
        /// Number of columns spanned.
        span: usize,
    },
    /// Single "no records" row spanning all columns.
    Empty {
        /// Text to show.
        text: String,
        /// Number of columns spanned.
        span: usize,
    },
    /// The rows of the current page.
    Rows(Vec<ViewRow>),
}

/// A fully rendered table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    /// Header cells in column order.
    pub headers: Vec<HeaderCell>,
    /// Body rows or placeholder.
    pub body: TableBody,
    /// Pagination info when a page size is set.
    pub page: Option<PageInfo>,
}

impl TableView {
    /// Returns the rendered rows, empty for placeholders.
    pub fn rows(&self) -> &[ViewRow] {
        match &self.body {
            TableBody::Rows(rows) => rows,
            TableBody::Loading { .. } | TableBody::Empty { .. } => &[],
        }
    }
}

/// A sortable, optionally paginated table over a slice of records.
///
/// The table holds only its sort and page state; data is passed in on every
/// render. Changing the data does not reset the page; out-of-range pages are
/// clamped when rendered.
///
/// # Example
///
/// ```
/// use hrdesk_lib::model::Record;
/// use hrdesk_lib::table::{Column, SortableTable};
///
/// let data = vec![
///     Record::new(1).set("name", "Support"),
///     Record::new(2).set("name", "Accounts"),
/// ];
///
/// let mut table = SortableTable::new(vec![Column::new("name", "Name").sortable()])
///     .unwrap()
///     .with_page_size(10);
/// table.toggle_sort("name");
///
/// let view = table.view(&data, false);
/// assert_eq!(view.rows()[0].id, 2);
/// ```
pub struct SortableTable<R> {
    columns: Vec<Column<R>>,
    sort: Option<SortState>,
    page: usize,
    page_size: Option<usize>,
    row_key: RowKeyFn<R>,
    empty_text: String,
}

impl<R: TableRecord> SortableTable<R> {
    /// Create a table with the given columns.
    ///
    /// Fails if two columns share a key.
    pub fn new(columns: Vec<Column<R>>) -> Result<Self, SchemaError> {
        check_columns(&columns)?;
        Ok(Self {
            columns,
            sort: None,
            page: 1,
            page_size: None,
            row_key: Arc::new(|row: &R, _: usize| row.id().to_string()),
            empty_text: DEFAULT_EMPTY_TEXT.to_string(),
        })
    }

    /// Enable pagination with the given page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.set_page_size(Some(page_size));
        self
    }

    /// Set a custom row key function.
    pub fn with_row_key<F>(mut self, row_key: F) -> Self
    where
        F: Fn(&R, usize) -> String + Send + Sync + 'static,
    {
        self.row_key = Arc::new(row_key);
        self
    }

    /// Set the text shown when there are no rows.
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Get the column definitions.
    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    /// Replace the column definitions.
    ///
    /// Drops the sort if its column no longer exists.
    pub fn set_columns(&mut self, columns: Vec<Column<R>>) -> Result<(), SchemaError> {
        check_columns(&columns)?;
        self.columns = columns;
        let sort_valid = self
            .sort
            .as_ref()
            .is_none_or(|s| self.columns.iter().any(|c| c.key == s.key && c.sortable));
        if !sort_valid {
            self.sort = None;
        }
        Ok(())
    }

    fn column(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Get the current sort state.
    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Toggle sort for a column, as a header click would.
    ///
    /// Returns the new sort state, or `None` when the column is unknown or not
    /// sortable (the current sort is left untouched).
    pub fn toggle_sort(&mut self, key: &str) -> Option<&SortState> {
        if !self.column(key).is_some_and(|c| c.sortable) {
            return None;
        }
        let next = next_sort(self.sort.as_ref(), key);
        debug!("Sort changed to {} {:?}", next.key, next.direction);
        self.sort = Some(next);
        self.sort.as_ref()
    }

    /// Returns the records in display order.
    ///
    /// Sorting is stable, so rows with equal sort values keep their input
    /// order. Without an active sort the input order is returned.
    pub fn sorted<'a>(&self, data: &'a [R]) -> Vec<&'a R> {
        let mut rows: Vec<&R> = data.iter().collect();
        let Some(sort) = &self.sort else {
            return rows;
        };
        let Some(column) = self.column(&sort.key) else {
            return rows;
        };

        let mut keyed: Vec<_> = rows
            .drain(..)
            .map(|row| (column.sort_value(row), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| compare_for_sort(a, b, sort.direction));
        keyed.into_iter().map(|(_, row)| row).collect()
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Get the page size, if pagination is enabled.
    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    /// Set or clear the page size. Always resets to page 1.
    pub fn set_page_size(&mut self, page_size: Option<usize>) {
        self.page_size = page_size.filter(|&size| size > 0);
        self.page = 1;
    }

    /// Get the requested page (unclamped).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Request a page. Clamped against the data on render.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Move to the next page if there is one for `len` rows.
    pub fn next_page(&mut self, len: usize) -> bool {
        match self.page_info(len) {
            Some(info) if info.has_next() => {
                self.page = info.page + 1;
                true
            }
            _ => false,
        }
    }

    /// Move to the previous page if there is one for `len` rows.
    pub fn prev_page(&mut self, len: usize) -> bool {
        match self.page_info(len) {
            Some(info) if info.has_prev() => {
                self.page = info.page - 1;
                true
            }
            _ => false,
        }
    }

    /// Pagination info for `len` rows, if pagination is enabled.
    pub fn page_info(&self, len: usize) -> Option<PageInfo> {
        self.page_size.map(|size| paginate(len, size, self.page))
    }

    /// Records on the current page, in display order.
    pub fn page_rows<'a>(&self, data: &'a [R]) -> Vec<&'a R> {
        let sorted = self.sorted(data);
        match self.page_info(sorted.len()) {
            Some(info) => sorted[info.range()].to_vec(),
            None => sorted,
        }
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Header cells with sort indicators.
    pub fn headers(&self) -> Vec<HeaderCell> {
        self.columns
            .iter()
            .map(|column| HeaderCell {
                key: column.key.clone(),
                label: column.header.clone(),
                sortable: column.sortable,
                sort: self
                    .sort
                    .as_ref()
                    .filter(|s| s.key == column.key)
                    .map(|s| s.direction),
            })
            .collect()
    }

    /// Render the table for the given data.
    pub fn view(&self, data: &[R], loading: bool) -> TableView {
        let headers = self.headers();
        let span = self.columns.len().max(1);
        let page = self.page_info(data.len());

        let body = if loading {
            TableBody::Loading { span }
        } else if data.is_empty() {
            TableBody::Empty {
                text: self.empty_text.clone(),
                span,
            }
        } else {
            let rows = self
                .page_rows(data)
                .into_iter()
                .enumerate()
                .map(|(index, row)| ViewRow {
                    key: (self.row_key)(row, index),
                    id: row.id(),
                    cells: self.columns.iter().map(|c| c.render(row)).collect(),
                })
                .collect();
            TableBody::Rows(rows)
        };

        TableView {
            headers,
            body,
            page,
        }
    }
}

impl<R> fmt::Debug for SortableTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortableTable")
            .field("columns", &self.columns)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("empty_text", &self.empty_text)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::model::Value;

    fn table() -> SortableTable<Record> {
        SortableTable::new(vec![
            Column::new("name", "Name").sortable(),
            Column::new("code", "Code"),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = SortableTable::<Record>::new(vec![
            Column::new("name", "Name"),
            Column::new("name", "Other"),
        ]);
        assert!(matches!(result, Err(SchemaError::DuplicateColumn(_))));
    }

    #[test]
    fn test_unsortable_column_is_ignored() {
        let mut table = table();
        table.toggle_sort("name");
        assert!(table.toggle_sort("code").is_none());
        assert!(table.toggle_sort("missing").is_none());
        assert_eq!(table.sort(), Some(&SortState::asc("name")));
    }

    #[test]
    fn test_loading_beats_empty_beats_rows() {
        let table = table();
        let data = vec![Record::new(1).set("name", "A")];

        assert_eq!(table.view(&data, true).body, TableBody::Loading { span: 2 });
        assert_eq!(
            table.view(&[], true).body,
            TableBody::Loading { span: 2 }
        );
        assert_eq!(
            table.view(&[], false).body,
            TableBody::Empty {
                text: DEFAULT_EMPTY_TEXT.into(),
                span: 2
            }
        );
        assert_eq!(table.view(&data, false).rows().len(), 1);
    }

    #[test]
    fn test_custom_empty_text() {
        let table = table().with_empty_text("No shifts yet.");
        let TableBody::Empty { text, .. } = table.view(&[], false).body else {
            panic!("expected empty body");
        };
        assert_eq!(text, "No shifts yet.");
    }

    #[test]
    fn test_missing_renderer_stringifies_raw_value() {
        let table = table();
        let data = vec![Record::new(1).set("name", "A").set("code", 42i64)];
        let view = table.view(&data, false);
        assert_eq!(
            view.rows()[0].cells,
            vec![Cell::text("A"), Cell::text("42")]
        );
    }

    #[test]
    fn test_sort_accessor_overrides_field() {
        let mut table = SortableTable::new(vec![
            Column::new("name", "Name")
                .sortable()
                .sort_by(|r: &Record| Value::Int(r.value("name").to_string().len() as i64)),
        ])
        .unwrap();
        table.toggle_sort("name");

        let data = vec![
            Record::new(1).set("name", "Operations"),
            Record::new(2).set("name", "HR"),
        ];
        let ids: Vec<i64> = table.sorted(&data).iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_header_indicator() {
        let mut table = table();
        table.toggle_sort("name");
        table.toggle_sort("name");
        let headers = table.headers();
        assert_eq!(headers[0].title(), "Name ▼");
        assert_eq!(headers[1].title(), "Code");
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut table = table().with_page_size(2);
        table.set_page(3);
        table.set_page_size(Some(5));
        assert_eq!(table.page(), 1);
    }

    #[test]
    fn test_next_and_prev_page() {
        let mut table = table().with_page_size(2);
        assert!(table.next_page(5));
        assert!(table.next_page(5));
        assert!(!table.next_page(5));
        assert_eq!(table.page(), 3);
        assert!(table.prev_page(5));
        assert_eq!(table.page(), 2);
    }

    #[test]
    fn test_row_key_uses_page_index() {
        let table = table()
            .with_page_size(2)
            .with_row_key(|r: &Record, i| format!("{}-{}", i, r.id()));
        let data = vec![Record::new(7), Record::new(8), Record::new(9)];
        let keys: Vec<String> = table.view(&data, false).rows().iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, vec!["0-7", "1-8"]);
    }
}
