//! Ordered parameter maps with public/private key split.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ParamsError;

/// Keys starting with this character are private.
pub const PRIVATE_PREFIX: char = '_';

/// Returns true if `key` is excluded from case identity.
#[inline]
pub fn is_private_key(key: &str) -> bool {
    key.starts_with(PRIVATE_PREFIX)
}

/// One combination of parameter values, in insertion order.
///
/// Public keys make up the case identity (see [`ParamSet::identity`]);
/// private keys are only visible to the test body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet {
    entries: Map<String, Value>,
}

impl ParamSet {
    pub fn new() -> Self {
        ParamSet::default()
    }

    /// Convert a JSON object into a parameter set.
    pub fn from_json(value: Value) -> Result<Self, ParamsError> {
        match value {
            Value::Object(entries) => Ok(ParamSet { entries }),
            other => Err(ParamsError::NotAnObject {
                found: other.to_string(),
            }),
        }
    }

    /// Set `key`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up `key` and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, ParamsError> {
        let value = self.get(key).ok_or_else(|| ParamsError::MissingParam {
            key: key.to_string(),
        })?;
        T::deserialize(value).map_err(|e| ParamsError::ParamType {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Projection onto the public keys.
    #[must_use]
    pub fn public(&self) -> ParamSet {
        let entries = self
            .entries
            .iter()
            .filter(|(k, _)| !is_private_key(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        ParamSet { entries }
    }

    /// Serialized public projection, e.g. `{"x":2,"y":4}`.
    pub fn identity(&self) -> String {
        Value::Object(self.public().entries).to_string()
    }

    /// Union of two sets. Any shared key is a conflict.
    pub fn merge(&self, other: &ParamSet) -> Result<ParamSet, ParamsError> {
        let mut merged = self.clone();
        merged.absorb(other)?;
        Ok(merged)
    }

    /// In-place [`merge`](Self::merge).
    pub(crate) fn absorb(&mut self, other: &ParamSet) -> Result<(), ParamsError> {
        for (key, value) in &other.entries {
            if self.entries.contains_key(key) {
                return Err(ParamsError::ParameterConflict { key: key.clone() });
            }
            self.entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    /// True if every entry of `partial` is present here with an equal value.
    pub fn matches(&self, partial: &ParamSet) -> bool {
        partial
            .entries
            .iter()
            .all(|(k, v)| self.entries.get(k) == Some(v))
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.entries.clone()))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        ParamSet { entries }
    }
}

impl TryFrom<Value> for ParamSet {
    type Error = ParamsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ParamSet::from_json(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
