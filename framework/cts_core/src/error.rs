//! Registration-time errors.
//!
//! All of these are fatal: a group that fails to register is never run.

use cts_params::ParamsError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Two cases in one group share a full identity (name + public params).
    #[error("duplicate test case `{id}` in group `{group}`")]
    DuplicateTestCase { group: String, id: String },

    /// The attached parameter builder does not expand cleanly.
    #[error("test `{test}`: {source}")]
    ParameterConflict {
        test: String,
        #[source]
        source: ParamsError,
    },

    /// Neither a body nor `unimplemented()` was given.
    #[error("test `{test}` has no body; attach one or mark it unimplemented")]
    MissingBody { test: String },

    #[error("test `{test}` already has a body")]
    DoubleBodyAttachment { test: String },

    #[error("test `{test}` is marked unimplemented but has a body")]
    UnimplementedWithBody { test: String },

    #[error("invalid test name `{name}`: {reason}")]
    InvalidTestName { name: String, reason: String },

    #[error("invalid query `{query}`: {reason}")]
    InvalidQuery { query: String, reason: String },
}
