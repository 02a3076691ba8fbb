//! Sort state and the row comparator.

use std::cmp::Ordering;

use crate::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl SortDirection {
    /// Header indicator for this direction.
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// The active sort: a column key and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    /// Key of the sorted column.
    pub key: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortState {
    /// Creates an ascending sort on a column.
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Creates a descending sort on a column.
    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Computes the sort that follows a header click on `key`.
///
/// Unsorted goes to ascending, ascending to descending and descending back to
/// ascending. Clicking a different column always starts ascending.
pub fn next_sort(current: Option<&SortState>, key: &str) -> SortState {
    match current {
        Some(state) if state.key == key => match state.direction {
            SortDirection::Asc => SortState::desc(key),
            SortDirection::Desc => SortState::asc(key),
        },
        _ => SortState::asc(key),
    }
}

/// Compares two non-null values.
///
/// Numbers compare numerically, strings and booleans natively. A number
/// paired with a numeric string compares numerically too; any other mix falls
/// back to comparing display text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => {
            let numeric = a.as_f64().is_some() || b.as_f64().is_some();
            match (a.parse_number(), b.parse_number()) {
                (Some(x), Some(y)) if numeric => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => a.to_string().cmp(&b.to_string()),
            }
        }
    }
}

/// Compares two sort values under a direction.
///
/// Null sorts first in both directions; only non-null comparisons are
/// reversed for descending order.
pub fn compare_for_sort(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let ordering = compare_values(a, b);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}
