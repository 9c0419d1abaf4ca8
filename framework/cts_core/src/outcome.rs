//! Case outcomes and run summaries.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::{CaseId, Interrupt, Thrown};

/// One failed expectation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssertionFailure {
    /// The caller's message, or a default for the assertion kind.
    pub message: String,
    /// What actually happened, for assertions that can say more.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        AssertionFailure {
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Terminal result of a case. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed {
        failures: Vec<AssertionFailure>,
    },
    Skipped {
        reason: String,
    },
    /// An uncaught error stopped the case. Failures recorded before it are kept.
    Errored {
        error: Thrown,
        failures: Vec<AssertionFailure>,
    },
    /// Placeholder test; no body was run.
    Unimplemented,
}

impl Outcome {
    /// Classify a finished body.
    ///
    /// Precedence: errored, then failed, then skipped, then passed.
    pub fn from_exit(exit: Result<(), Interrupt>, failures: Vec<AssertionFailure>) -> Self {
        match exit {
            Err(Interrupt::Thrown(error)) => Outcome::Errored { error, failures },
            _ if !failures.is_empty() => Outcome::Failed { failures },
            Err(Interrupt::Skip(reason)) => Outcome::Skipped { reason },
            Ok(()) => Outcome::Passed,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Outcome::Errored { .. })
    }

    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Outcome::Unimplemented)
    }

    /// Recorded assertion failures, if any.
    pub fn failures(&self) -> &[AssertionFailure] {
        match self {
            Outcome::Failed { failures } | Outcome::Errored { failures, .. } => failures,
            _ => &[],
        }
    }

    /// Short status label used by reporters.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed { .. } => "FAIL",
            Outcome::Skipped { .. } => "SKIP",
            Outcome::Errored { .. } => "ERROR",
            Outcome::Unimplemented => "UNIMPL",
        }
    }
}

/// Result of running one case.
#[derive(Clone, Debug, Serialize)]
pub struct CaseResult {
    pub id: CaseId,
    pub outcome: Outcome,
    /// Debug lines the body logged through its context.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl CaseResult {
    pub fn new(id: CaseId, outcome: Outcome, duration: Duration) -> Self {
        CaseResult {
            id,
            outcome,
            logs: Vec::new(),
            duration,
        }
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// Results for one group.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub results: Vec<CaseResult>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errored: usize,
    pub unimplemented: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl GroupSummary {
    pub fn new(group: impl Into<String>) -> Self {
        GroupSummary {
            group: group.into(),
            ..Default::default()
        }
    }

    pub fn add_result(&mut self, result: CaseResult) {
        match &result.outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Errored { .. } => self.errored += 1,
            Outcome::Unimplemented => self.unimplemented += 1,
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errored > 0
    }

    /// Look up a result by its displayed identity.
    pub fn find(&self, id: &str) -> Option<&CaseResult> {
        self.results.iter().find(|r| r.id.to_string() == id)
    }
}

/// Results for a whole run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    pub groups: Vec<GroupSummary>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errored: usize,
    pub unimplemented: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        RunSummary::default()
    }

    pub fn add_group(&mut self, summary: GroupSummary) {
        self.passed += summary.passed;
        self.failed += summary.failed;
        self.skipped += summary.skipped;
        self.errored += summary.errored;
        self.unimplemented += summary.unimplemented;
        self.duration += summary.duration;
        self.groups.push(summary);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errored + self.unimplemented
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errored > 0
    }

    /// 0 = all good, 1 = failures or errors, 2 = no cases ran.
    pub fn exit_code(&self) -> i32 {
        if self.total() == 0 {
            2
        } else {
            i32::from(self.has_failures())
        }
    }
}
