//! Parameter sets and the builder that expands them into test cases.
//!
//! A test declares the axes it varies over and the builder produces every
//! combination, outer loop first:
//!
//! ```text
//! params()
//!     .combine(options("x", [2, 3]))
//!     .combine(vec![param_set! { "y": 2 }, param_set! { "z": 3 }])
//!
//! // {x:2,y:2}, {x:2,z:3}, {x:3,y:2}, {x:3,z:3}
//! ```
//!
//! Keys starting with `_` are private: they reach the test body but are not
//! part of the case identity.

mod builder;
mod error;
mod param_set;

pub use builder::{options, params, pbool, poptions, Axis, Expansion, ParamsBuilder};
pub use error::ParamsError;
pub use param_set::{is_private_key, ParamSet, PRIVATE_PREFIX};

// Re-exported so `param_set!` works without a direct serde_json dependency.
pub use serde_json;
pub use serde_json::Value;

/// Build a [`ParamSet`] from `"key": value` pairs.
///
/// Values go through `serde_json::json!`, so anything JSON-like works.
///
/// ```text
/// let set = param_set! { "x": 2, "y": 4, "_result": 6 };
/// ```
#[macro_export]
macro_rules! param_set {
    () => {
        $crate::ParamSet::new()
    };
    ($($key:literal : $value:expr),+ $(,)?) => {{
        let mut set = $crate::ParamSet::new();
        $( set.insert($key, $crate::serde_json::json!($value)); )+
        set
    }};
}
