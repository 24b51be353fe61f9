mod common;

use docsheet_core::sheet::SheetWriter;
use docsheet_core::{Cell, Table};

use common::{row_count, shared_strings, sheet_xml, workbook_xml};

fn sample_table() -> Table {
    Table {
        headers: vec!["email".into(), "name".into(), "paid".into()],
        rows: vec![
            vec![Cell::text("a@x.io"), Cell::text("Alice"), Cell::Bool(true)],
            vec![Cell::Empty, Cell::text("Bob"), Cell::Integer(3)],
        ],
    }
}

#[test]
fn writes_headers_rows_and_title() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("users.xlsx");

    SheetWriter::default()
        .write(&sample_table(), &path, "users")
        .expect("write workbook");

    assert_eq!(row_count(&path), 3);
    let strings = shared_strings(&path);
    for expected in ["email", "name", "paid", "a@x.io", "Alice", "Bob"] {
        assert!(strings.contains(&format!(">{expected}<")), "missing {expected}");
    }
    assert!(workbook_xml(&path).contains(r#"name="users""#));
}

#[test]
fn sanitizes_the_sheet_title_instead_of_failing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("odd.xlsx");

    SheetWriter::default()
        .with_fallback_title("Event")
        .write(&sample_table(), &path, "[?]")
        .expect("write workbook");

    assert!(workbook_xml(&path).contains(r#"name="Event""#));
}

#[test]
fn overwrites_an_existing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("users.xlsx");
    std::fs::write(&path, b"stale").expect("seed stale file");

    SheetWriter::default()
        .write(&sample_table(), &path, "users")
        .expect("write workbook");

    assert_eq!(row_count(&path), 3);
}

#[test]
fn sets_clamped_column_widths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wide.xlsx");
    let table = Table {
        headers: vec!["bio".into()],
        rows: vec![vec![Cell::text("x".repeat(500))]],
    };

    let writer = SheetWriter::new(50);
    assert_eq!(writer.column_widths(&table), vec![50]);
    writer.write(&table, &path, "wide").expect("write workbook");

    assert!(sheet_xml(&path).contains("<cols>"));
}

#[test]
fn unwritable_destination_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing").join("users.xlsx");

    let err = SheetWriter::default()
        .write(&sample_table(), &path, "users")
        .expect_err("parent directory does not exist");

    assert!(err.to_string().contains("users.xlsx"));
}
