//! Parameter builder combinators exercised as ordinary test cases.

use cts_core::{BasicFixture, RegistrationError, TestGroup};
use cts_params::{options, param_set, params, pbool};

pub const GROUP: &str = "builder";

pub fn group() -> Result<TestGroup<BasicFixture>, RegistrationError> {
    let mut g = TestGroup::<BasicFixture>::new(GROUP)
        .with_description("Cases produced by filtering and nesting parameter builders.");

    // Nested builders flatten into the outer product.
    g.test("nested")?
        .params(
            params()
                .combine(pbool("mapped"))
                .combine(params().options("size", [8, 16]).options("offset", [0, 4])),
        )?
        .body(|t| {
            let size: u32 = t.param("size")?;
            let offset: u32 = t.param("offset")?;
            t.expect_msg(offset < size, format!("offset {offset} outside size {size}"));
            Ok(())
        })?;

    g.test("filtered")?
        .params(
            params()
                .options("a", 1..=4)
                .options("b", 1..=4)
                .filter(|p| p.get("a") != p.get("b"))
                .unless(|p| p.get("a").and_then(serde_json::Value::as_i64) == Some(4))
                .exclude(vec![param_set! { "a": 1, "b": 2 }]),
        )?
        .body(|t| {
            let a: i64 = t.param("a")?;
            let b: i64 = t.param("b")?;
            t.expect(a != b && a != 4 && (a, b) != (1, 2));
            Ok(())
        })?;

    // Private expected values travel with the case but not in its identity.
    g.test("private_expectations")?
        .params(vec![
            param_set! { "bytes": [1, 2, 3], "_sum": 6 },
            param_set! { "bytes": Vec::<u8>::new(), "_sum": 0 },
        ])?
        .body(|t| {
            let bytes: Vec<u8> = t.param("bytes")?;
            let sum: u32 = bytes.iter().map(|&b| u32::from(b)).sum();
            t.expect_contents(&[sum], &[t.param::<u32>("_sum")?], "sum of bytes");
            Ok(())
        })?;

    g.test("platform_specific")?
        .skip("requires a platform the fake provider does not model")
        .params(options("backend", ["metal", "vulkan"]))?
        .body(|_t| Ok(()))?;

    g.finish()
}
