//! Structured test names and case identities.

use std::fmt;

use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::RegistrationError;

/// Separator between name segments: `basic,params`.
pub const NAME_SEPARATOR: char = ',';

/// A test name split into segments.
///
/// Segments are non-empty and use only ASCII alphanumerics and `_`, so a
/// name can appear unescaped inside a query or a case identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestName {
    segments: SmallVec<[String; 4]>,
}

impl TestName {
    pub fn parse(name: &str) -> Result<Self, RegistrationError> {
        let invalid = |reason: &str| RegistrationError::InvalidTestName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = SmallVec::new();
        for segment in name.split(NAME_SEPARATOR) {
            if segment.is_empty() {
                return Err(invalid("empty name segment"));
            }
            if let Some(c) = segment
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
            {
                return Err(invalid(&format!("character {c:?} is not allowed")));
            }
            segments.push(segment.to_string());
        }
        Ok(TestName { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True if `prefix` matches the leading segments of this name.
    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.segments.len() >= prefix.len() && self.segments[..prefix.len()] == *prefix
    }
}

impl fmt::Display for TestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{NAME_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl Serialize for TestName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Full identity of one case: test name plus serialized public parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CaseId {
    pub test: TestName,
    /// Serialized public parameters, `{}` when there are none.
    pub params: String,
}

impl CaseId {
    pub fn new(test: TestName, params: String) -> Self {
        CaseId { test, params }
    }

    /// Identity of a case with no public parameters.
    pub fn bare(test: TestName) -> Self {
        CaseId::new(test, "{}".to_string())
    }

    pub fn has_params(&self) -> bool {
        self.params != "{}"
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_params() {
            write!(f, "{}/params={}", self.test, self.params)
        } else {
            write!(f, "{}", self.test)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
