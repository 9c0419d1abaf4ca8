use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_segments() {
    let name = TestName::parse("basic,params_builder").unwrap();
    assert_eq!(name.segments(), ["basic", "params_builder"]);
    assert_eq!(name.to_string(), "basic,params_builder");
}

#[test]
fn test_reject_empty_segments() {
    for bad in ["", "basic,", ",basic", "a,,b"] {
        assert!(
            matches!(
                TestName::parse(bad),
                Err(RegistrationError::InvalidTestName { .. })
            ),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn test_reject_separator_characters() {
    for bad in ["a b", "a:b", "a/b", "a=b", "a\"b"] {
        assert!(TestName::parse(bad).is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn test_prefix_matching() {
    let name = TestName::parse("gpu,with_texture_compression,bc").unwrap();
    assert!(name.starts_with(&[]));
    assert!(name.starts_with(&["gpu".to_string()]));
    assert!(name.starts_with(&["gpu".to_string(), "with_texture_compression".to_string()]));
    assert!(!name.starts_with(&["basic".to_string()]));
}

#[test]
fn test_case_id_display() {
    let name = TestName::parse("sum").unwrap();
    assert_eq!(CaseId::bare(name.clone()).to_string(), "sum");
    assert_eq!(
        CaseId::new(name, r#"{"x":2,"y":4}"#.to_string()).to_string(),
        r#"sum/params={"x":2,"y":4}"#
    );
}
