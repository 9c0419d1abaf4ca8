//! Examples of writing tests with the framework's features.
//!
//! Start here when looking for basic usage. Run subsets with a query:
//!
//! ```text
//! cts run examples:basic,async
//! cts run examples:basic,*
//! cts run examples
//! ```

use std::future::poll_fn;
use std::task::Poll;

use cts_core::{BodyResult, DeviceFixture, RegistrationError, TestContext, TestGroup, Thrown};
use cts_params::{param_set, params, pbool, poptions};

pub const GROUP: &str = "examples";

pub fn group() -> Result<TestGroup<DeviceFixture>, RegistrationError> {
    let mut g = TestGroup::<DeviceFixture>::new(GROUP).with_description(
        "Examples of writing tests with various features.",
    );

    g.test("test_name")?.body(|_t| Ok(()))?;

    g.test("not_implemented_yet,without_plan")?.unimplemented()?;
    g.test("not_implemented_yet,with_plan")?
        .desc(
            "Plan for this test. What it tests. Summary of how it tests that functionality.\n\
             - Description of cases, by describing parameters {a, b, c}\n\
             - x= more parameters {x, y, z}",
        )
        .unimplemented()?;

    g.test("basic")?.body(|t| {
        t.expect(true);
        t.expect_msg(true, "true should be true");
        t.should_throw(
            "TypeError",
            || Err::<(), _>(Thrown::type_error("")),
            "function should throw Error",
        );
        Ok(())
    })?;

    // Rejections are checked after the body returns; the case is not
    // finalized until both settle.
    g.test("basic,async")?.body_async(|t| async move {
        t.should_reject(
            "TypeError",
            async { Err::<(), _>(Thrown::type_error("")) },
            "rejected future should reject",
        );
        t.should_reject(
            "TypeError",
            async {
                yield_now().await;
                Err::<(), _>(Thrown::type_error(""))
            },
            "async block should reject",
        );
        Ok(())
    })?;

    // Public parameters (x, y) are part of the case identity, private ones
    // (_result) are only passed to the body:
    //
    //   examples:basic,params:{"x":2,"y":4}
    //   examples:basic,params:{"x":-10,"y":18}
    g.test("basic,params")?
        .params(vec![
            param_set! { "x": 2, "y": 4, "_result": 6 },
            param_set! { "x": -10, "y": 18, "_result": 8 },
        ])?
        .body(|t| {
            let x: i64 = t.param("x")?;
            let y: i64 = t.param("y")?;
            t.expect(x + y == t.param::<i64>("_result")?);
            Ok(())
        })?;

    // {x:2,y:2} {x:2,z:3} {x:3,y:2} {x:3,z:3}
    g.test("basic,params_builder")?
        .params(
            params()
                .combine(poptions("x", [2, 3]))
                .combine(vec![param_set! { "y": 2 }, param_set! { "z": 3 }]),
        )?
        .body(|_t| Ok(()))?;

    g.test("gpu,async")?.body_async(|t| async move {
        let device = t.fixture().device()?;
        let buffer = device.create_buffer(&[2])?;
        let value = device.read_buffer(buffer).await?;
        t.expect(value == [2]);
        Ok(())
    })?;

    g.test("gpu,buffers")?.body(|t| {
        let data: Vec<u8> = [0u32, 1234, 0]
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect();
        let src = t.fixture().device()?.create_buffer(&data)?;
        t.expect_buffer_contents(src, &data, "buffer contents")?;
        Ok(())
    })?;

    // One of the following two tests is skipped unless the device supports
    // both compression families.
    g.test("gpu,with_texture_compression,bc")?
        .desc(
            "Example of a test using a device descriptor.\n\
             The device reports the BC feature iff it was requested.",
        )
        .params(pbool("textureCompressionBC"))?
        .body(|t| texture_compression(t, "textureCompressionBC", "texture-compression-bc"))?;

    g.test("gpu,with_texture_compression,etc")?
        .desc(
            "Example of a test using a device descriptor.\n\
             The device reports the ETC feature iff it was requested.",
        )
        .params(pbool("textureCompressionETC"))?
        .body(|t| texture_compression(t, "textureCompressionETC", "texture-compression-etc2"))?;

    g.finish()
}

fn texture_compression(
    t: &TestContext<DeviceFixture>,
    param: &str,
    feature: &str,
) -> BodyResult {
    let enabled: bool = t.param(param)?;
    if enabled {
        t.select_device_or_skip(&[feature])?;
    }
    let device = t.fixture().device()?;
    t.expect_msg(
        device.has_feature(feature) == enabled,
        format!("`{feature}` should be enabled iff requested"),
    );
    Ok(())
}

/// Yield to the executor once.
async fn yield_now() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await;
}
