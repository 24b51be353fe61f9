#![allow(dead_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use docsheet_core::{FieldValue, Record};

/// Reads one part of an xlsx package as text.
pub fn xlsx_part(path: &Path, part: &str) -> String {
    let file = File::open(path).expect("open workbook");
    let mut archive = zip::ZipArchive::new(file).expect("workbook is a zip archive");
    let mut entry = archive.by_name(part).expect("workbook part present");
    let mut contents = String::new();
    entry.read_to_string(&mut contents).expect("read workbook part");
    contents
}

pub fn sheet_xml(path: &Path) -> String {
    xlsx_part(path, "xl/worksheets/sheet1.xml")
}

pub fn shared_strings(path: &Path) -> String {
    xlsx_part(path, "xl/sharedStrings.xml")
}

pub fn workbook_xml(path: &Path) -> String {
    xlsx_part(path, "xl/workbook.xml")
}

/// Number of populated rows in the first worksheet, header included.
pub fn row_count(path: &Path) -> usize {
    sheet_xml(path).matches("<row ").count()
}

pub fn event(id: &str, name: &str) -> Record {
    Record::new().with("eventId", id).with("eventName", name)
}

pub fn registration(event_id: &str, email: &str) -> Record {
    Record::new()
        .with("_id", FieldValue::Reference(format!("ref-{email}")))
        .with("eventId", event_id)
        .with("email", email)
}
