//! Integration tests across the public API surface: flags, error
//! formatting/LSP diagnostics, and the `parse_pattern`/`validate_pattern`
//! entry points together.

use pcrelab_core::core::ast::Flags;
use pcrelab_core::{parse_pattern, validate_pattern};

#[test]
fn flags_from_letters_sets_the_right_fields() {
    let flags = Flags::from_letters("ims").unwrap();
    assert!(flags.ignore_case);
    assert!(flags.multiline);
    assert!(flags.dot_all);
    assert!(!flags.unicode);
    assert!(!flags.extended);
}

#[test]
fn flags_to_letters_is_the_inverse_of_from_letters() {
    let flags = Flags::from_letters("imu").unwrap();
    assert_eq!(flags.to_letters(), "imu");
}

#[test]
fn default_flags_are_all_false() {
    let flags = Flags::default();
    assert!(!flags.ignore_case);
    assert!(!flags.multiline);
    assert!(!flags.dot_all);
    assert!(!flags.unicode);
    assert!(!flags.extended);
}

#[test]
fn unknown_flag_letter_is_rejected_at_the_flags_layer() {
    assert_eq!(Flags::from_letters("z"), Err('z'));
}

#[test]
fn parse_error_formats_with_a_caret_and_hint() {
    let err = parse_pattern("/(abc/").unwrap_err();
    let formatted = err.to_formatted_string("(abc");
    assert!(formatted.contains('^'));
}

#[test]
fn quantifier_without_target_has_a_hint() {
    let err = parse_pattern("/+abc/").unwrap_err();
    assert!(err.hint().is_some());
}

#[test]
fn error_lsp_diagnostic_has_the_expected_shape() {
    let err = parse_pattern("/(abc/").unwrap_err();
    let diagnostic = err.to_lsp_diagnostic("(abc");
    assert_eq!(diagnostic["severity"], 1);
    assert_eq!(diagnostic["source"], "pcrelab");
    assert!(diagnostic["message"].is_string());
    assert!(diagnostic["range"].is_object());
}

#[test]
fn validate_pattern_surfaces_the_first_semantic_offense() {
    let outcome = validate_pattern(r"/(a)\2/").unwrap();
    assert!(!outcome.is_valid);
    assert!(outcome.error.unwrap().contains("2"));
}

#[test]
fn quantifier_on_empty_non_capturing_group_has_no_target() {
    let err = parse_pattern("/(?:)+/").unwrap_err();
    assert!(
        err.to_string().contains("Quantifier without target"),
        "unexpected message: {}",
        err
    );
}
