use docsheet_core::naming::{
    collection_file_name, group_file_name, sanitize_sheet_title, MAX_SHEET_TITLE_CHARS,
};

#[test]
fn sheet_titles_drop_illegal_characters() {
    assert_eq!(sanitize_sheet_title("a:b\\c/d?e*f[g]h", "Sheet"), "abcdefgh");
}

#[test]
fn sheet_titles_truncate_to_the_format_limit() {
    let long = "Registration Forms For Every Single Event";
    let title = sanitize_sheet_title(long, "Sheet");

    assert_eq!(title.chars().count(), MAX_SHEET_TITLE_CHARS);
    assert_eq!(title, "Registration Forms For Every Si");
}

#[test]
fn sheet_title_falls_back_when_nothing_survives() {
    assert_eq!(sanitize_sheet_title("[?*]", "Event"), "Event");
    assert_eq!(sanitize_sheet_title("", "Event"), "Event");
}

#[test]
fn multibyte_titles_truncate_on_characters() {
    let title = sanitize_sheet_title(&"ü".repeat(40), "Sheet");
    assert_eq!(title.chars().count(), MAX_SHEET_TITLE_CHARS);
}

#[test]
fn group_file_names_join_key_name_and_suffix() {
    assert_eq!(group_file_name("E1", "Robo War"), "E1_Robo_War_registrations.xlsx");
    assert_eq!(
        group_file_name("E/2", "Quiz: Finals [Day 1]"),
        "E2_Quiz_Finals_Day_1_registrations.xlsx"
    );
}

#[test]
fn file_names_never_contain_illegal_characters() {
    let name = group_file_name("a:b\\c/d?e*f[g]h", "x:y\\z/?*[]");
    for c in [':', '\\', '/', '?', '*', '[', ']'] {
        assert!(!name.contains(c), "{name} contains {c}");
    }
    assert_eq!(collection_file_name("users"), "users.xlsx");
}
