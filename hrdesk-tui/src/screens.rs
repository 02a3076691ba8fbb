//! The admin screens and their offline sample data.

use hrdesk_lib::{FieldSpec, Record};

/// One admin screen: a REST collection and the fields it edits.
#[derive(Debug, Clone)]
pub struct ScreenSpec {
    /// Tab title.
    pub title: &'static str,
    /// Singular record name used in dialogs and toasts.
    pub entity: &'static str,
    /// Collection path relative to the API base URL.
    pub path: &'static str,
    pub fields: Vec<FieldSpec>,
    /// Records loaded into the in-memory store when running offline.
    pub seed: Vec<Record>,
}

fn name_and_status() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("name", "Name"),
        FieldSpec::switch("is_active", "Active"),
    ]
}

fn named(names: &[(&str, bool)]) -> Vec<Record> {
    names
        .iter()
        .zip(1..)
        .map(|((name, active), id)| Record::new(id).set("name", *name).set("is_active", *active))
        .collect()
}

/// All screens in tab order.
pub fn screens() -> Vec<ScreenSpec> {
    vec![
        ScreenSpec {
            title: "Roles",
            entity: "Role",
            path: "roles",
            fields: name_and_status(),
            seed: named(&[
                ("Administrator", true),
                ("HR Manager", true),
                ("Team Lead", true),
                ("Employee", true),
                ("Intern", false),
            ]),
        },
        ScreenSpec {
            title: "Designations",
            entity: "Designation",
            path: "designations",
            fields: name_and_status(),
            seed: named(&[
                ("Software Engineer", true),
                ("Senior Software Engineer", true),
                ("QA Engineer", true),
                ("Product Manager", true),
                ("UI/UX Designer", false),
                ("DevOps Engineer", true),
                ("Business Analyst", true),
                ("Technical Writer", false),
                ("Engineering Manager", true),
                ("Data Scientist", true),
                ("Support Engineer", true),
                ("Architect", true),
            ]),
        },
        ScreenSpec {
            title: "Departments",
            entity: "Department",
            path: "departments",
            fields: name_and_status(),
            seed: named(&[
                ("Engineering", true),
                ("Human Resources", true),
                ("Finance", true),
                ("Sales", true),
                ("Marketing", false),
                ("Operations", true),
            ]),
        },
        ScreenSpec {
            title: "Technologies",
            entity: "Technology",
            path: "technologies",
            fields: name_and_status(),
            seed: named(&[
                ("Rust", true),
                ("React", true),
                ("Django", true),
                ("PostgreSQL", true),
                ("Kubernetes", true),
                ("AngularJS", false),
                ("Flutter", true),
            ]),
        },
        ScreenSpec {
            title: "Shifts",
            entity: "Shift",
            path: "shifts",
            fields: vec![
                FieldSpec::text("name", "Name"),
                FieldSpec::time("start_time", "Start Time"),
                FieldSpec::time("end_time", "End Time"),
                FieldSpec::number("grace_minutes", "Grace Minutes"),
                FieldSpec::switch("is_active", "Active"),
            ],
            seed: vec![
                shift(1, "Morning", "09:00", "17:00", 15, true),
                shift(2, "Evening", "14:00", "22:00", 10, true),
                shift(3, "Night", "22:00", "06:00", 10, false),
                shift(4, "Flexible", "11:00", "19:00", 30, true),
            ],
        },
    ]
}

fn shift(id: i64, name: &str, start: &str, end: &str, grace: i64, active: bool) -> Record {
    Record::new(id)
        .set("name", name)
        .set("start_time", start)
        .set("end_time", end)
        .set("grace_minutes", grace)
        .set("is_active", active)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use hrdesk_lib::ManagementTable;

    use super::*;

    #[test]
    fn test_every_screen_builds_a_table() {
        for screen in screens() {
            let table = ManagementTable::new(screen.entity, screen.fields.clone());
            assert!(table.is_ok(), "{} has an invalid schema", screen.title);
        }
    }

    #[test]
    fn test_seed_ids_are_unique() {
        for screen in screens() {
            let ids: HashSet<i64> = screen.seed.iter().map(Record::id).collect();
            assert_eq!(ids.len(), screen.seed.len(), "{}", screen.title);
        }
    }
}
