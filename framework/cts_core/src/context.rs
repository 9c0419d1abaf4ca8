//! The per-case test context: parameters, fixture, and assertions.
//!
//! Assertions never interrupt the body. Each failing check appends an
//! [`AssertionFailure`] and execution continues, so one bad expectation does
//! not hide the next. Asynchronous checks (`should_reject`,
//! `expect_buffer_contents`) are registered as pending and the runner waits
//! for all of them before the case is finalized.

use std::fmt::Debug;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use crate::device::{BufferId, DeviceRequestError};
use crate::fixture::DeviceFixture;
use crate::{AssertionFailure, CaseId, Interrupt, ParamSet, Thrown};

/// Maximum number of mismatching elements listed in a contents diff.
const MAX_DIFF_LINES: usize = 16;

type PendingCheck = BoxFuture<'static, Option<AssertionFailure>>;

#[derive(Default)]
struct Recorder {
    failures: Vec<AssertionFailure>,
    pending: Vec<PendingCheck>,
    logs: Vec<String>,
}

struct CaseShared<F> {
    id: CaseId,
    params: ParamSet,
    fixture: F,
    recorder: Mutex<Recorder>,
}

/// Handle passed to test bodies.
///
/// Cheap to clone; async bodies receive their own clone.
pub struct TestContext<F> {
    shared: Arc<CaseShared<F>>,
}

impl<F> Clone for TestContext<F> {
    fn clone(&self) -> Self {
        TestContext {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F> TestContext<F> {
    pub(crate) fn new(id: CaseId, params: ParamSet, fixture: F) -> Self {
        TestContext {
            shared: Arc::new(CaseShared {
                id,
                params,
                fixture,
                recorder: Mutex::new(Recorder::default()),
            }),
        }
    }

    pub fn id(&self) -> &CaseId {
        &self.shared.id
    }

    /// All parameters of this case, private keys included.
    pub fn params(&self) -> &ParamSet {
        &self.shared.params
    }

    /// Typed parameter lookup. A missing or mistyped key is a `TypeError`.
    pub fn param<T: DeserializeOwned>(&self, key: &str) -> Result<T, Thrown> {
        Ok(self.shared.params.get_as(key)?)
    }

    pub fn fixture(&self) -> &F {
        &self.shared.fixture
    }

    /// Record a line in the case log.
    pub fn debug(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(case = %self.shared.id, "{message}");
        self.shared.recorder.lock().logs.push(message);
    }

    /// Record an unconditional failure.
    pub fn fail(&self, message: impl Into<String>) {
        self.record(AssertionFailure::new(message));
    }

    /// Soft assertion. Returns `condition`.
    pub fn expect(&self, condition: bool) -> bool {
        self.expect_msg(condition, "expectation failed")
    }

    /// Soft assertion with a message. Returns `condition`.
    pub fn expect_msg(&self, condition: bool, message: impl Into<String>) -> bool {
        if !condition {
            self.record(AssertionFailure::new(message));
        }
        condition
    }

    /// Run `thunk` and check that it fails with an error of `kind`.
    pub fn should_throw<T>(
        &self,
        kind: &str,
        thunk: impl FnOnce() -> Result<T, Thrown>,
        message: &str,
    ) {
        let failure = match thunk() {
            Ok(_) => Some(failure_with(message, "should throw", "DID NOT THROW".to_string())),
            Err(e) if e.kind() == kind => None,
            Err(e) => Some(failure_with(
                message,
                "should throw",
                format!("expected {kind}, threw {e}"),
            )),
        };
        if let Some(failure) = failure {
            self.record(failure);
        }
    }

    /// Check that `future` fails with an error of `kind`.
    ///
    /// Returns immediately; the check is pending until the future settles
    /// and the case is not finalized before that.
    pub fn should_reject<T, Fut>(&self, kind: &str, future: Fut, message: &str)
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, Thrown>> + Send + 'static,
    {
        let kind = kind.to_string();
        let message = message.to_string();
        self.register_pending(async move {
            match future.await {
                Ok(_) => Some(failure_with(
                    &message,
                    "should reject",
                    "DID NOT REJECT".to_string(),
                )),
                Err(e) if e.kind() == kind => None,
                Err(e) => Some(failure_with(
                    &message,
                    "should reject",
                    format!("expected {kind}, rejected with {e}"),
                )),
            }
        });
    }

    /// Element-wise comparison with a diff of mismatching indices.
    pub fn expect_contents<T>(&self, actual: &[T], expected: &[T], message: &str) -> bool
    where
        T: PartialEq + Debug,
    {
        match contents_diff(actual, expected) {
            Some(diff) => {
                self.record(failure_with(message, "contents mismatch", diff));
                false
            }
            None => true,
        }
    }

    /// Skip the rest of this case. Use as `return t.skip("reason");`.
    pub fn skip<T>(&self, reason: impl Into<String>) -> Result<T, Interrupt> {
        let reason = reason.into();
        tracing::debug!(case = %self.shared.id, %reason, "skip requested");
        Err(Interrupt::Skip(reason))
    }

    /// Register an asynchronous check. `None` means the check passed.
    pub fn register_pending<Fut>(&self, check: Fut)
    where
        Fut: Future<Output = Option<AssertionFailure>> + Send + 'static,
    {
        self.shared.recorder.lock().pending.push(check.boxed());
    }

    fn record(&self, failure: AssertionFailure) {
        tracing::debug!(case = %self.shared.id, %failure, "assertion failed");
        self.shared.recorder.lock().failures.push(failure);
    }

    /// Number of pending checks not yet settled.
    pub fn pending_count(&self) -> usize {
        self.shared.recorder.lock().pending.len()
    }

    /// Wait for every pending check, including ones registered while
    /// waiting. A panicking check is recorded as a failure.
    pub(crate) async fn settle_pending(&self) {
        loop {
            let batch = std::mem::take(&mut self.shared.recorder.lock().pending);
            if batch.is_empty() {
                return;
            }
            let guarded = batch.into_iter().map(|check| {
                AssertUnwindSafe(check).catch_unwind().map(|settled| match settled {
                    Ok(result) => result,
                    Err(payload) => Some(
                        AssertionFailure::new("pending check panicked")
                            .with_detail(Thrown::from_panic(&*payload).to_string()),
                    ),
                })
            });
            for failure in join_all(guarded).await.into_iter().flatten() {
                self.record(failure);
            }
        }
    }

    /// Drain the recorded failures and log lines.
    pub(crate) fn take_records(&self) -> (Vec<AssertionFailure>, Vec<String>) {
        let mut recorder = self.shared.recorder.lock();
        (
            std::mem::take(&mut recorder.failures),
            std::mem::take(&mut recorder.logs),
        )
    }
}

impl TestContext<DeviceFixture> {
    /// Swap to a device with `features`, or skip the case if the provider
    /// cannot supply one.
    pub fn select_device_or_skip(&self, features: &[&str]) -> Result<(), Interrupt> {
        match self.fixture().select_device(features) {
            Ok(()) => Ok(()),
            Err(DeviceRequestError::Unsupported(feature)) => {
                self.skip(format!("device does not support `{feature}`"))
            }
            Err(e @ DeviceRequestError::Failed(_)) => {
                Err(Thrown::operation_error(e.to_string()).into())
            }
        }
    }

    /// Read `buffer` back from the case's device and compare with `expected`.
    ///
    /// Pending like `should_reject`.
    pub fn expect_buffer_contents(
        &self,
        buffer: BufferId,
        expected: &[u8],
        message: &str,
    ) -> Result<(), Thrown> {
        let read = self.fixture().device()?.read_buffer(buffer);
        let expected = expected.to_vec();
        let message = message.to_string();
        self.register_pending(async move {
            match read.await {
                Ok(actual) => contents_diff(&actual, &expected)
                    .map(|diff| failure_with(&message, "buffer contents mismatch", diff)),
                Err(e) => Some(failure_with(
                    &message,
                    "buffer contents mismatch",
                    format!("readback failed: {e}"),
                )),
            }
        });
        Ok(())
    }
}

fn failure_with(message: &str, default: &str, detail: String) -> AssertionFailure {
    let message = if message.is_empty() { default } else { message };
    AssertionFailure::new(message).with_detail(detail)
}

/// Describe how `actual` differs from `expected`, or `None` if equal.
pub fn contents_diff<T: PartialEq + Debug>(actual: &[T], expected: &[T]) -> Option<String> {
    if actual.len() != expected.len() {
        return Some(format!(
            "length mismatch: expected {} elements, got {}",
            expected.len(),
            actual.len()
        ));
    }

    let mismatches: Vec<usize> = (0..actual.len())
        .filter(|&i| actual[i] != expected[i])
        .collect();
    if mismatches.is_empty() {
        return None;
    }

    let mut lines = vec![format!(
        "{} of {} elements differ",
        mismatches.len(),
        actual.len()
    )];
    for &i in mismatches.iter().take(MAX_DIFF_LINES) {
        lines.push(format!(
            "  at [{i}]: expected {:?}, got {:?}",
            expected[i], actual[i]
        ));
    }
    if mismatches.len() > MAX_DIFF_LINES {
        lines.push(format!("  ... and {} more", mismatches.len() - MAX_DIFF_LINES));
    }
    Some(lines.join("\n"))
}
