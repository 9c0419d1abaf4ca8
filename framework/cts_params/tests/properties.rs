//! Property tests for parameter expansion.
//!
//! - The expansion of `A.combine(B).combine(C)` has `|A| * |B| * |C|` sets.
//! - Iterating twice yields the same sequence.
//! - The first-declared axis is the outermost loop.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    reason = "Proptest macros generate code with these patterns"
)]

use cts_params::{options, params, ParamSet};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_product_length(a in 0usize..5, b in 0usize..5, c in 0usize..5) {
        let builder = params()
            .combine(options("a", 0..a as i64))
            .combine(options("b", 0..b as i64))
            .combine(options("c", 0..c as i64));
        prop_assert_eq!(builder.len(), a * b * c);
        prop_assert_eq!(builder.expand().unwrap().len(), a * b * c);
    }

    #[test]
    fn prop_restartable(a in 1usize..6, b in 1usize..6) {
        let builder = params().options("a", 0..a as i64).options("b", 0..b as i64);
        let first: Vec<ParamSet> = builder.iter().map(Result::unwrap).collect();
        let second: Vec<ParamSet> = builder.iter().map(Result::unwrap).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_first_axis_is_outermost(a in 1usize..6, b in 1usize..6) {
        let builder = params().options("a", 0..a as i64).options("b", 0..b as i64);
        let sets: Vec<ParamSet> = builder.iter().map(Result::unwrap).collect();
        for (i, set) in sets.iter().enumerate() {
            prop_assert_eq!(set.get_as::<usize>("a").unwrap(), i / b);
            prop_assert_eq!(set.get_as::<usize>("b").unwrap(), i % b);
        }
    }
}
