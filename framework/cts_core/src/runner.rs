//! Case execution engine.
//!
//! Each case runs on a single cooperative timeline: the fixture is acquired,
//! the body is driven to completion with `block_on`, every pending assertion
//! is awaited, and the fixture is released before the outcome is produced.
//! Cases can be spread across a scoped rayon pool; a case never shares its
//! fixture or recorder with another case.

use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::executor::block_on;
use futures::future::FutureExt;
use rayon::prelude::*;

use crate::group::TestStatus;
use crate::{
    CaseId, CaseResult, Fixture, GroupSummary, Interrupt, Outcome, ParamSet, Query,
    RegistrationError, Resources, RunSummary, TestContext, TestDef, TestGroup, Thrown,
};

/// Lifecycle of one case.
///
/// `Pending -> Running -> {Passed, Failed, Skipped, Errored}`. Cases of
/// unimplemented tests stay `Pending`; cases of skipped tests go straight
/// to `Skipped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseState {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
    Errored,
}

impl CaseState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CaseState::Passed | CaseState::Failed | CaseState::Skipped | CaseState::Errored
        )
    }

    pub fn can_transition_to(self, next: CaseState) -> bool {
        matches!(
            (self, next),
            (CaseState::Pending, CaseState::Running | CaseState::Skipped)
                | (
                    CaseState::Running,
                    CaseState::Passed | CaseState::Failed | CaseState::Skipped | CaseState::Errored
                )
        )
    }

    /// Terminal state corresponding to `outcome`.
    pub fn of(outcome: &Outcome) -> CaseState {
        match outcome {
            Outcome::Passed => CaseState::Passed,
            Outcome::Failed { .. } => CaseState::Failed,
            Outcome::Skipped { .. } => CaseState::Skipped,
            Outcome::Errored { .. } => CaseState::Errored,
            Outcome::Unimplemented => CaseState::Pending,
        }
    }

    fn advance(&mut self, next: CaseState, id: &CaseId) {
        debug_assert!(
            self.can_transition_to(next),
            "invalid case transition {self:?} -> {next:?}"
        );
        tracing::debug!(case = %id, from = ?*self, to = ?next, "case state");
        *self = next;
    }
}

/// Configuration for the test runner.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Run only cases whose identity contains this substring.
    pub filter: Option<String>,
    /// Run only cases selected by this query.
    pub query: Option<Query>,
    /// Run cases in parallel.
    pub parallel: bool,
    /// Report every case, not just failures.
    pub verbose: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            filter: None,
            query: None,
            parallel: true,
            verbose: false,
        }
    }
}

/// A group whose fixture type has been erased, so groups over different
/// fixtures can be listed and run together.
pub trait RunnableGroup: Send + Sync {
    fn name(&self) -> &str;

    /// Every case with its declared status, in registration order.
    fn list_cases(&self) -> Result<Vec<(CaseId, TestStatus)>, RegistrationError>;

    fn run_with(&self, runner: &TestRunner) -> Result<GroupSummary, RegistrationError>;
}

impl<F: Fixture> RunnableGroup for TestGroup<F> {
    fn name(&self) -> &str {
        TestGroup::name(self)
    }

    fn list_cases(&self) -> Result<Vec<(CaseId, TestStatus)>, RegistrationError> {
        let mut out = Vec::new();
        for def in self.tests() {
            for case in def.cases() {
                let (id, _) = case.map_err(|source| RegistrationError::ParameterConflict {
                    test: def.name().to_string(),
                    source,
                })?;
                out.push((id, def.status().clone()));
            }
        }
        Ok(out)
    }

    fn run_with(&self, runner: &TestRunner) -> Result<GroupSummary, RegistrationError> {
        runner.run_group(self)
    }
}

/// A case selected for execution, or a result decided while planning.
enum Planned<'a, F> {
    Case {
        def: &'a TestDef<F>,
        id: CaseId,
        params: ParamSet,
    },
    Decided(CaseResult),
}

/// Test runner.
pub struct TestRunner {
    config: RunnerConfig,
    resources: Resources,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    /// Create a new test runner with default config and no resources.
    pub fn new() -> Self {
        TestRunner::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        TestRunner {
            config,
            resources: Resources::new(),
        }
    }

    /// Capabilities handed to every fixture.
    #[must_use]
    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run every group, in order.
    pub fn run_all(&self, groups: &[&dyn RunnableGroup]) -> Result<RunSummary, RegistrationError> {
        let mut summary = RunSummary::new();
        for group in groups {
            summary.add_group(group.run_with(self)?);
        }
        Ok(summary)
    }

    /// Run every selected case of `group`.
    ///
    /// Fails only if the group itself is invalid; problems inside cases are
    /// recorded in their outcomes.
    pub fn run_group<F: Fixture>(
        &self,
        group: &TestGroup<F>,
    ) -> Result<GroupSummary, RegistrationError> {
        group.validate()?;
        let start = Instant::now();
        let planned = self.plan(group);
        tracing::debug!(group = group.name(), cases = planned.len(), "running group");

        let results = if self.config.parallel && planned.len() > 1 {
            self.run_parallel(&planned)
        } else {
            planned.iter().map(|p| self.execute(p)).collect()
        };

        let mut summary = GroupSummary::new(group.name());
        for result in results {
            summary.add_result(result);
        }
        summary.duration = start.elapsed();
        Ok(summary)
    }

    /// Run one case to completion.
    pub fn run_case<F: Fixture>(
        &self,
        def: &TestDef<F>,
        id: CaseId,
        params: ParamSet,
    ) -> CaseResult {
        let mut state = CaseState::Pending;
        match def.status() {
            TestStatus::Unimplemented => {
                return CaseResult::new(id, Outcome::Unimplemented, Duration::ZERO);
            }
            TestStatus::Skipped(reason) => {
                state.advance(CaseState::Skipped, &id);
                let outcome = Outcome::Skipped {
                    reason: reason.clone(),
                };
                return CaseResult::new(id, outcome, Duration::ZERO);
            }
            TestStatus::Implemented => {}
        }

        let start = Instant::now();
        state.advance(CaseState::Running, &id);

        let Some(body) = def.body() else {
            let error = Thrown::new("RegistrationError", "test has no body");
            state.advance(CaseState::Errored, &id);
            return errored(id, error, start.elapsed());
        };

        let fixture = match F::acquire(&self.resources) {
            Ok(fixture) => fixture,
            Err(error) => {
                state.advance(CaseState::Errored, &id);
                return errored(id, error, start.elapsed());
            }
        };

        let t = TestContext::new(id.clone(), params, fixture);
        let exit = block_on(async {
            let run = AssertUnwindSafe(async { body.invoke(t.clone()).await });
            let exit = match run.catch_unwind().await {
                Ok(exit) => exit,
                Err(payload) => Err(Interrupt::Thrown(Thrown::from_panic(&*payload))),
            };
            t.settle_pending().await;
            exit
        });
        t.fixture().release();

        let (failures, logs) = t.take_records();
        let outcome = Outcome::from_exit(exit, failures);
        state.advance(CaseState::of(&outcome), &id);

        let mut result = CaseResult::new(id, outcome, start.elapsed());
        result.logs = logs;
        result
    }

    /// Expand `group` into the cases this run selects.
    fn plan<'g, F: Fixture>(&self, group: &'g TestGroup<F>) -> Vec<Planned<'g, F>> {
        let mut planned = Vec::new();
        for def in group.tests() {
            for case in def.cases() {
                match case {
                    Ok((id, params)) => {
                        if self.selects(group.name(), &id) {
                            planned.push(Planned::Case { def, id, params });
                        }
                    }
                    Err(e) => {
                        let id = CaseId::bare(def.name().clone());
                        planned.push(Planned::Decided(errored(id, e.into(), Duration::ZERO)));
                        break;
                    }
                }
            }
        }
        planned
    }

    fn selects(&self, group: &str, id: &CaseId) -> bool {
        if let Some(filter) = &self.config.filter {
            if !id.to_string().contains(filter.as_str()) {
                return false;
            }
        }
        self.config
            .query
            .as_ref()
            .map_or(true, |query| query.matches(group, id))
    }

    fn execute<F: Fixture>(&self, planned: &Planned<'_, F>) -> CaseResult {
        match planned {
            Planned::Case { def, id, params } => self.run_case(def, id.clone(), params.clone()),
            Planned::Decided(result) => result.clone(),
        }
    }

    /// Run cases on a scoped rayon pool, falling back to sequential
    /// execution if the pool cannot be built.
    fn run_parallel<F: Fixture>(&self, planned: &[Planned<'_, F>]) -> Vec<CaseResult> {
        rayon::ThreadPoolBuilder::new()
            .build_scoped(rayon::ThreadBuilder::run, |pool| {
                pool.install(|| planned.par_iter().map(|p| self.execute(p)).collect())
            })
            .unwrap_or_else(|e| {
                tracing::warn!("failed to create thread pool ({e}), running sequentially");
                planned.iter().map(|p| self.execute(p)).collect()
            })
    }
}

fn errored(id: CaseId, error: Thrown, duration: Duration) -> CaseResult {
    let outcome = Outcome::Errored {
        error,
        failures: Vec::new(),
    };
    CaseResult::new(id, outcome, duration)
}
