//! Selecting cases by name.
//!
//! ```text
//! examples                          every case in the group
//! examples:*                        same
//! examples:basic,*                  tests whose name starts with `basic`
//! examples:basic,params             every case of `basic,params`
//! examples:basic,params:{"x":2}     the one case with those public params
//! ```

use std::fmt;

use cts_params::ParamSet;

use crate::{CaseId, RegistrationError, NAME_SEPARATOR};

const WILDCARD: &str = "*";

/// A parsed case selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    group: String,
    segments: Vec<String>,
    /// `false` when the segment list ended in `*`.
    exact_name: bool,
    /// Normalized identity of the requested public params.
    params: Option<String>,
}

impl Query {
    /// Every case of `group`.
    pub fn group(group: impl Into<String>) -> Self {
        Query {
            group: group.into(),
            segments: Vec::new(),
            exact_name: false,
            params: None,
        }
    }

    pub fn parse(text: &str) -> Result<Self, RegistrationError> {
        let invalid = |reason: &str| RegistrationError::InvalidQuery {
            query: text.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = text.splitn(3, ':');
        let group = parts.next().unwrap_or_default();
        if group.is_empty() {
            return Err(invalid("missing group name"));
        }

        let mut query = Query::group(group);
        let Some(names) = parts.next() else {
            return Ok(query);
        };

        let mut segments: Vec<&str> = names.split(NAME_SEPARATOR).collect();
        if segments.last() == Some(&WILDCARD) {
            segments.pop();
        } else {
            query.exact_name = true;
        }
        for segment in &segments {
            if segment.is_empty() || segment.contains(WILDCARD) {
                return Err(invalid("`*` may only appear as the last segment"));
            }
        }
        query.segments = segments.into_iter().map(str::to_string).collect();

        if let Some(params) = parts.next() {
            if !query.exact_name {
                return Err(invalid("params require a complete test name"));
            }
            let value = serde_json::from_str(params).map_err(|e| invalid(&e.to_string()))?;
            let set = ParamSet::from_json(value).map_err(|e| invalid(&e.to_string()))?;
            query.params = Some(set.identity());
        }
        Ok(query)
    }

    pub fn group_name(&self) -> &str {
        &self.group
    }

    /// True if the case `id` in `group` is selected.
    pub fn matches(&self, group: &str, id: &CaseId) -> bool {
        if group != self.group || !id.test.starts_with(&self.segments) {
            return false;
        }
        if self.exact_name && id.test.segments().len() != self.segments.len() {
            return false;
        }
        self.params.as_ref().map_or(true, |p| *p == id.params)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.group)?;
        if self.segments.is_empty() && !self.exact_name {
            return Ok(());
        }
        f.write_str(":")?;
        f.write_str(&self.segments.join(","))?;
        if !self.exact_name {
            if !self.segments.is_empty() {
                f.write_str(",")?;
            }
            f.write_str(WILDCARD)?;
        }
        if let Some(params) = &self.params {
            write!(f, ":{params}")?;
        }
        Ok(())
    }
}
