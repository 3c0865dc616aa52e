//! Error handling tests for the template front end

use super::helpers::parse_with_dll_config;
use super::*;

#[test]
fn test_error_unterminated_block_reports_opening_marker() {
    let result = parse("abc\n  <% foo");
    match result {
        Err(SyntaxError::UnterminatedCodeBlock { position, line }) => {
            assert_eq!(position, 6);
            assert_eq!(line, 2);
        }
        other => panic!("Expected UnterminatedCodeBlock error, got {:?}", other),
    }
}

#[test]
fn test_error_nested_start_is_unterminated() {
    let result = parse("x<% outer <% inner");
    match result {
        Err(SyntaxError::UnterminatedCodeBlock { position, line }) => {
            assert_eq!(position, 1);
            assert_eq!(line, 1);
        }
        other => panic!("Expected UnterminatedCodeBlock error, got {:?}", other),
    }
}

#[test]
fn test_error_unterminated_message() {
    let err = parse("<%= x").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("position 0"));
    assert!(message.contains("line 1"));
    assert_eq!(err.position(), 0);
    assert_eq!(err.line(), 1);
}

#[test]
fn test_error_directive_with_three_tokens() {
    let result = parse("line one\n<%@ use a b %>");
    match result {
        Err(SyntaxError::InvalidDirective {
            directive, line, ..
        }) => {
            assert_eq!(directive, "use a b");
            assert_eq!(line, 2);
        }
        other => panic!("Expected InvalidDirective error, got {:?}", other),
    }
}

#[test]
fn test_error_directive_with_single_token() {
    let err = parse("<%@ language %>").unwrap_err();
    assert!(matches!(err, SyntaxError::InvalidDirective { .. }));
    assert!(err.to_string().contains("language"));
}

#[test]
fn test_error_empty_directive() {
    let err = parse("<%@ %>").unwrap_err();
    assert!(matches!(err, SyntaxError::InvalidDirective { .. }));
}

#[test]
fn test_error_include_without_space_is_not_an_include() {
    let err = parse("<%@ include%>").unwrap_err();
    assert!(matches!(err, SyntaxError::InvalidDirective { .. }));
}

#[test]
fn test_error_unknown_directive_key() {
    let result = parse_with_dll_config("<%@ foo bar %>");
    match result {
        Err(SyntaxError::UnknownDirective { ref key, ref directive, .. }) => {
            assert_eq!(key, "foo");
            assert_eq!(directive, "foo bar");
        }
        ref other => panic!("Expected UnknownDirective error, got {:?}", other),
    }
    assert!(result.unwrap_err().to_string().contains("foo bar"));
}

#[test]
fn test_error_directive_keys_are_case_sensitive() {
    let err = parse("<%@ USE math %>").unwrap_err();
    assert!(matches!(err, SyntaxError::UnknownDirective { .. }));
}
