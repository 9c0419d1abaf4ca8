use super::*;
use crate::{options, param_set, BasicFixture};
use pretty_assertions::assert_eq;

type Group = TestGroup<BasicFixture>;

fn ok(_: &TestContext<BasicFixture>) -> BodyResult {
    Ok(())
}

fn case_ids(def: &TestDef<BasicFixture>) -> Vec<String> {
    def.cases().map(|c| c.unwrap().0.to_string()).collect()
}

#[test]
fn test_register_and_expand() {
    let mut g = Group::new("examples");
    g.test("sum")
        .unwrap()
        .desc("adds")
        .params(vec![
            param_set! { "x": 2, "y": 4, "_result": 6 },
            param_set! { "x": -10, "y": 18, "_result": 8 },
        ])
        .unwrap()
        .body(ok)
        .unwrap();

    let g = g.finish().unwrap();
    let def = &g.tests()[0];
    assert_eq!(def.description(), Some("adds"));
    assert_eq!(
        case_ids(def),
        vec![
            r#"sum/params={"x":2,"y":4}"#,
            r#"sum/params={"x":-10,"y":18}"#,
        ]
    );
}

#[test]
fn test_no_params_means_one_case() {
    let mut g = Group::new("g");
    g.test("test_name").unwrap().body(ok).unwrap();
    assert_eq!(case_ids(&g.tests()[0]), vec!["test_name"]);
}

#[test]
fn test_duplicate_bare_name() {
    let mut g = Group::new("g");
    g.test("a").unwrap().body(ok).unwrap();
    assert_eq!(
        g.test("a").unwrap().body(ok).err(),
        Some(RegistrationError::DuplicateTestCase {
            group: "g".into(),
            id: "a".into()
        })
    );
    assert_eq!(
        g.test("a").unwrap().unimplemented().err(),
        Some(RegistrationError::DuplicateTestCase {
            group: "g".into(),
            id: "a".into()
        })
    );
}

#[test]
fn test_bare_and_parameterized_in_either_order() {
    let mut params_first = Group::new("g");
    params_first
        .test("sum")
        .unwrap()
        .params(options("x", [1]))
        .unwrap()
        .body(ok)
        .unwrap();
    params_first.test("sum").unwrap().body(ok).unwrap();
    assert!(params_first.validate().is_ok());

    let mut bare_first = Group::new("g");
    bare_first.test("sum").unwrap().body(ok).unwrap();
    bare_first
        .test("sum")
        .unwrap()
        .params(options("x", [1]))
        .unwrap()
        .body(ok)
        .unwrap();
    assert!(bare_first.validate().is_ok());

    let ids = |g: &Group| -> Vec<String> { g.tests().iter().flat_map(case_ids).collect() };
    assert_eq!(ids(&params_first), vec![r#"sum/params={"x":1}"#, "sum"]);
    assert_eq!(ids(&bare_first), vec!["sum", r#"sum/params={"x":1}"#]);
}

#[test]
fn test_params_after_body_replace_bare_identity() {
    let mut g = Group::new("g");
    let mut t = g.test("sum").unwrap();
    t.body(ok).unwrap();
    t.params(options("x", [1])).unwrap();

    // The bare identity is free again.
    g.test("sum").unwrap().body(ok).unwrap();
    assert!(g.validate().is_ok());
}

#[test]
fn test_duplicate_name_and_params() {
    let mut g = Group::new("g");
    g.test("sum")
        .unwrap()
        .params(options("x", [1, 2]))
        .unwrap()
        .body(ok)
        .unwrap();

    let mut second = g.test("sum").unwrap();
    let err = second.params(options("x", [2, 3])).err();
    assert_eq!(
        err,
        Some(RegistrationError::DuplicateTestCase {
            group: "g".into(),
            id: r#"sum/params={"x":2}"#.into()
        })
    );
}

#[test]
fn test_same_name_different_params_is_allowed() {
    let mut g = Group::new("g");
    g.test("sum")
        .unwrap()
        .params(options("x", [1]))
        .unwrap()
        .body(ok)
        .unwrap();
    g.test("sum")
        .unwrap()
        .params(options("x", [2]))
        .unwrap()
        .body(ok)
        .unwrap();
    assert!(g.validate().is_ok());
}

#[test]
fn test_replacing_params_releases_old_identities() {
    let mut g = Group::new("g");
    let mut t = g.test("a").unwrap();
    t.params(options("x", [1])).unwrap();
    t.params(options("x", [2])).unwrap();
    t.body(ok).unwrap();

    // "a" and {"x":1} are free again.
    g.test("a")
        .unwrap()
        .params(options("x", [1]))
        .unwrap()
        .body(ok)
        .unwrap();
}

#[test]
fn test_failed_params_keep_previous_claim() {
    let mut g = Group::new("g");
    g.test("a")
        .unwrap()
        .params(options("x", [1]))
        .unwrap()
        .body(ok)
        .unwrap();

    let mut second = g.test("a").unwrap();
    second.params(options("x", [2])).unwrap();
    assert!(second.params(options("x", [1])).is_err());
    second.body(ok).unwrap();

    let mut third = g.test("a").unwrap();
    assert!(matches!(
        third.params(options("x", [2])).err(),
        Some(RegistrationError::DuplicateTestCase { .. })
    ));
}

#[test]
fn test_conflicting_params() {
    let mut g = Group::new("g");
    let err = g
        .test("a")
        .unwrap()
        .params(params().options("x", [1]).options("x", [2]))
        .err();
    assert_eq!(
        err,
        Some(RegistrationError::ParameterConflict {
            test: "a".into(),
            source: ParamsError::ParameterConflict { key: "x".into() }
        })
    );
}

#[test]
fn test_colliding_public_projection_is_a_conflict() {
    let mut g = Group::new("g");
    let err = g
        .test("a")
        .unwrap()
        .params(vec![
            param_set! { "x": 1, "_r": 1 },
            param_set! { "x": 1, "_r": 2 },
        ])
        .err();
    assert!(matches!(
        err,
        Some(RegistrationError::ParameterConflict {
            source: ParamsError::DuplicateParams { .. },
            ..
        })
    ));
}

#[test]
fn test_missing_body() {
    let mut g = Group::new("g");
    g.test("a").unwrap().desc("no body");
    assert_eq!(
        g.validate(),
        Err(RegistrationError::MissingBody { test: "a".into() })
    );
    assert!(g.finish().is_err());
}

#[test]
fn test_double_body() {
    let mut g = Group::new("g");
    let mut t = g.test("a").unwrap();
    t.body(ok).unwrap();
    assert_eq!(
        t.body_async(|_t| async { Ok(()) }).err(),
        Some(RegistrationError::DoubleBodyAttachment { test: "a".into() })
    );
}

#[test]
fn test_unimplemented_and_body_conflict_both_ways() {
    let mut g = Group::new("g");
    let mut t = g.test("a").unwrap();
    t.unimplemented().unwrap();
    assert_eq!(
        t.body(ok).err(),
        Some(RegistrationError::UnimplementedWithBody { test: "a".into() })
    );

    let mut t = g.test("b").unwrap();
    t.body(ok).unwrap();
    assert_eq!(
        t.unimplemented().err(),
        Some(RegistrationError::UnimplementedWithBody { test: "b".into() })
    );
}

#[test]
fn test_unimplemented_needs_no_body() {
    let mut g = Group::new("g");
    g.test("not_implemented_yet,without_plan")
        .unwrap()
        .unimplemented()
        .unwrap();
    g.test("not_implemented_yet,with_plan")
        .unwrap()
        .desc("Plan for this test.")
        .unimplemented()
        .unwrap();
    assert!(g.validate().is_ok());
    assert_eq!(g.tests()[1].status(), &TestStatus::Unimplemented);
}

#[test]
fn test_skip_marks_status() {
    let mut g = Group::new("g");
    g.test("a").unwrap().skip("flaky on this platform").body(ok).unwrap();
    assert_eq!(
        g.tests()[0].status(),
        &TestStatus::Skipped("flaky on this platform".into())
    );
}

#[test]
fn test_invalid_names() {
    let mut g = Group::new("g");
    assert!(matches!(
        g.test("has space").err(),
        Some(RegistrationError::InvalidTestName { .. })
    ));
    assert!(matches!(
        g.test("trailing,").err(),
        Some(RegistrationError::InvalidTestName { .. })
    ));
}
