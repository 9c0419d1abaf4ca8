//! Errors raised inside test bodies.

use std::any::Any;
use std::fmt;

use cts_params::ParamsError;
use serde::Serialize;

/// An error value thrown by code under test, identified by its kind
/// (`TypeError`, `RangeError`, `OperationError`, ...).
///
/// Assertions such as `should_throw` compare kinds, never messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Thrown {
    pub kind: String,
    pub message: String,
}

impl Thrown {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Thrown {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// A thrown error with no message.
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Thrown::new(kind, String::new())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Thrown::new("TypeError", message)
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        Thrown::new("RangeError", message)
    }

    pub fn operation_error(message: impl Into<String>) -> Self {
        Thrown::new("OperationError", message)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Convert a caught panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        Thrown::new("Panic", message)
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for Thrown {}

impl From<ParamsError> for Thrown {
    fn from(e: ParamsError) -> Self {
        Thrown::type_error(e.to_string())
    }
}

/// Early exit from a test body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// The case cannot run here; not a failure.
    Skip(String),
    /// Uncaught error; the case is errored.
    Thrown(Thrown),
}

impl From<Thrown> for Interrupt {
    fn from(e: Thrown) -> Self {
        Interrupt::Thrown(e)
    }
}

impl From<ParamsError> for Interrupt {
    fn from(e: ParamsError) -> Self {
        Interrupt::Thrown(e.into())
    }
}

/// What a test body returns.
pub type BodyResult = Result<(), Interrupt>;
