//! Default columns derived from a field schema.

use crate::model::Record;
use crate::model::Value;
use crate::schema::FieldKind;
use crate::schema::FieldSpec;
use crate::table::Cell;
use crate::table::Column;

/// Display text for a raw value in a derived column.
///
/// Booleans read `Yes`/`No`; everything else is its plain text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}

/// Derives one sortable column per field.
///
/// Editable switch fields render as an inline toggle; a toggle writes straight
/// through the edit handler without opening a dialog. Readonly switches and
/// every other kind render as text.
pub fn derive_columns(fields: &[FieldSpec]) -> Vec<Column<Record>> {
    fields.iter().map(derive_column).collect()
}

fn derive_column(field: &FieldSpec) -> Column<Record> {
    let key = field.key.clone();
    let column = Column::new(field.key.clone(), field.label.clone()).sortable();
    match field.kind {
        FieldKind::Switch if !field.readonly => column.cell(move |record: &Record| Cell::Toggle {
            key: key.clone(),
            on: record.value(&key).as_bool().unwrap_or(false),
        }),
        FieldKind::Switch | FieldKind::Text | FieldKind::Number | FieldKind::Time => {
            column.cell(move |record: &Record| Cell::Text(display_value(&record.value(&key))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_column_per_field() {
        let fields = vec![
            FieldSpec::text("name", "Name"),
            FieldSpec::switch("is_active", "Active"),
        ];
        let columns = derive_columns(&fields);
        let keys: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "is_active"]);
        assert!(columns.iter().all(|c| c.sortable));
    }

    #[test]
    fn test_switch_renders_toggle() {
        let columns = derive_columns(&[FieldSpec::switch("is_active", "Active")]);
        let record = Record::new(1).set("is_active", true);
        assert_eq!(
            columns[0].render(&record),
            Cell::Toggle {
                key: "is_active".into(),
                on: true
            }
        );
    }

    #[test]
    fn test_text_columns_show_yes_no_for_booleans() {
        let columns = derive_columns(&[
            FieldSpec::text("remote", "Remote"),
            FieldSpec::switch("locked", "Locked").readonly(),
            FieldSpec::number("grace", "Grace"),
        ]);
        let record = Record::new(1)
            .set("remote", false)
            .set("locked", true)
            .set("grace", 5i64);

        assert_eq!(columns[0].render(&record), Cell::text("No"));
        assert_eq!(columns[1].render(&record), Cell::text("Yes"));
        assert_eq!(columns[2].render(&record), Cell::text("5"));
    }
}
