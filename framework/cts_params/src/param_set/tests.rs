use super::*;
use crate::param_set;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_private_keys_are_underscore_prefixed() {
    assert!(is_private_key("_result"));
    assert!(!is_private_key("result"));
    assert!(!is_private_key("x_"));
}

#[test]
fn test_identity_excludes_private_keys() {
    let set = param_set! { "x": 2, "y": 4, "_result": 6 };
    assert_eq!(set.identity(), r#"{"x":2,"y":4}"#);
    assert_eq!(set.len(), 3);
    assert_eq!(set.public().len(), 2);
}

#[test]
fn test_identity_keeps_insertion_order() {
    let set = ParamSet::new().with("z", 1).with("a", 2);
    assert_eq!(set.identity(), r#"{"z":1,"a":2}"#);
}

#[test]
fn test_empty_identity() {
    assert_eq!(ParamSet::new().identity(), "{}");
}

#[test]
fn test_merge_disjoint_sets() {
    let a = param_set! { "x": 2 };
    let b = param_set! { "y": 3, "_p": true };
    let merged = a.merge(&b).unwrap();
    assert_eq!(merged.to_string(), r#"{"x":2,"y":3,"_p":true}"#);
}

#[test]
fn test_merge_overlapping_public_key_conflicts() {
    let a = param_set! { "x": 2 };
    let b = param_set! { "x": 3 };
    assert_eq!(
        a.merge(&b),
        Err(ParamsError::ParameterConflict { key: "x".into() })
    );
}

#[test]
fn test_merge_overlapping_private_key_conflicts() {
    let a = param_set! { "_x": 2 };
    let b = param_set! { "_x": 2 };
    assert!(matches!(
        a.merge(&b),
        Err(ParamsError::ParameterConflict { .. })
    ));
}

#[test]
fn test_typed_lookup() {
    let set = param_set! { "x": -10, "flag": true, "name": "bc" };
    assert_eq!(set.get_as::<i64>("x").unwrap(), -10);
    assert!(set.get_as::<bool>("flag").unwrap());
    assert_eq!(set.get_as::<String>("name").unwrap(), "bc");
}

#[test]
fn test_typed_lookup_errors() {
    let set = param_set! { "x": "nope" };
    assert_eq!(
        set.get_as::<i64>("y"),
        Err(ParamsError::MissingParam { key: "y".into() })
    );
    assert!(matches!(
        set.get_as::<i64>("x"),
        Err(ParamsError::ParamType { .. })
    ));
}

#[test]
fn test_from_json_requires_object() {
    let set = ParamSet::from_json(json!({ "x": 1 })).unwrap();
    assert_eq!(set.get("x"), Some(&json!(1)));
    assert!(matches!(
        ParamSet::try_from(json!([1, 2])),
        Err(ParamsError::NotAnObject { .. })
    ));
}

#[test]
fn test_partial_match() {
    let set = param_set! { "x": 2, "y": 3 };
    assert!(set.matches(&param_set! { "x": 2 }));
    assert!(set.matches(&ParamSet::new()));
    assert!(!set.matches(&param_set! { "x": 3 }));
    assert!(!set.matches(&param_set! { "z": 3 }));
}
