//! Errors raised while building or reading parameter sets.

use thiserror::Error;

/// Error produced by parameter merging, expansion or typed lookup.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// Two axes (or a set and an axis) both define the same key.
    #[error("parameter `{key}` is defined by more than one axis")]
    ParameterConflict { key: String },

    /// Two expanded sets are indistinguishable by their public keys.
    #[error("parameter sets collide on public identity {identity}")]
    DuplicateParams { identity: String },

    /// The body asked for a key the case does not carry.
    #[error("missing parameter `{key}`")]
    MissingParam { key: String },

    /// The key exists but does not deserialize into the requested type.
    #[error("parameter `{key}` has an unexpected type: {reason}")]
    ParamType { key: String, reason: String },

    /// A JSON value used as a parameter set was not an object.
    #[error("a parameter set must be a JSON object, found `{found}`")]
    NotAnObject { found: String },
}
