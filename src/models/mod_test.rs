use super::*;

#[test]
fn slugify_collapses_separators() {
    assert_eq!(slugify("Golden Hour -- at  the Pier!", 255), "golden-hour-at-the-pier");
}

#[test]
fn slugify_trims_edges() {
    assert_eq!(slugify("  ***Portrait***  ", 255), "portrait");
}

#[test]
fn slugify_drops_non_ascii() {
    assert_eq!(slugify("Café Noir", 255), "caf-noir");
}

#[test]
fn slugify_empty_becomes_untitled() {
    assert_eq!(slugify("!!!", 255), "untitled");
    assert_eq!(slugify("", 255), "untitled");
}

#[test]
fn slugify_truncates_without_trailing_dash() {
    assert_eq!(slugify("abcd efgh", 5), "abcd");
    assert_eq!(slugify("abcdefgh", 5), "abcde");
}

#[test]
fn slug_candidate_appends_attempt_suffix() {
    assert_eq!(slug_candidate("sunset", 1, 50), "sunset");
    assert_eq!(slug_candidate("sunset", 2, 50), "sunset-2");
    assert_eq!(slug_candidate("sunset", 12, 50), "sunset-12");
}

#[test]
fn slug_candidate_keeps_suffix_within_limit() {
    let candidate = slug_candidate("abcdefghij", 3, 8);
    assert_eq!(candidate, "abcdef-3");
    assert!(candidate.len() <= 8);
}

#[test]
fn hex_color_validation() {
    assert!(is_hex_color("#1a2B3c"));
    assert!(!is_hex_color("1a2b3c"));
    assert!(!is_hex_color("#1a2b3"));
    assert!(!is_hex_color("#1a2b3g"));
}
