use docsheet_core::flatten::flatten;
use docsheet_core::{project, Cell, FieldValue, FlatRow, Record};

fn rows(records: &[Record]) -> Vec<FlatRow> {
    records.iter().map(|r| flatten(r, "_")).collect()
}

#[test]
fn empty_batch_has_nothing_to_export() {
    assert!(project(&[]).is_none());
}

#[test]
fn heterogeneous_rows_project_to_a_rectangle() {
    let batch = rows(&[
        Record::new().with("name", "Alice").with("email", "a@x.io"),
        Record::new()
            .with("name", "Bob")
            .with("college", Record::new().with("city", "Chandigarh")),
        Record::new().with("phone", 98765i64),
    ]);

    let table = project(&batch).expect("non-empty batch");

    assert_eq!(table.headers, vec!["college_city", "email", "name", "phone"]);
    assert_eq!(table.height(), 3);
    for row in &table.rows {
        assert_eq!(row.len(), table.width());
    }
    assert_eq!(
        table.rows[2],
        vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Integer(98765)]
    );
    let names: Vec<String> = table
        .column("name")
        .expect("name column")
        .map(ToString::to_string)
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", ""]);
}

#[test]
fn headers_sort_by_code_point() {
    let batch = rows(&[Record::new()
        .with("b", 1i64)
        .with("_id", FieldValue::Reference("x".into()))
        .with("Z", 1i64)
        .with("a", 1i64)
        .with("é", 1i64)]);

    let table = project(&batch).expect("non-empty batch");

    assert_eq!(table.headers, vec!["Z", "_id", "a", "b", "é"]);
}

#[test]
fn projection_is_deterministic_across_runs() {
    let records = vec![
        Record::new().with("z", 1i64).with("m", "x"),
        Record::new().with("a", true).with("m", "y"),
    ];

    let first = project(&rows(&records)).expect("table");
    let second = project(&rows(&records)).expect("table");

    assert_eq!(first, second);
}
