//! Test groups: the registration surface.
//!
//! ```text
//! let mut g = TestGroup::<BasicFixture>::new("examples");
//! g.test("basic,params")?
//!     .params(vec![param_set! { "x": 2, "y": 4, "_result": 6 }])?
//!     .body(|t| {
//!         t.expect(t.param::<i64>("x")? + t.param::<i64>("y")? == t.param::<i64>("_result")?);
//!         Ok(())
//!     })?;
//! g.test("not_implemented_yet")?.unimplemented()?;
//! ```
//!
//! Registration calls validate eagerly: invalid names, parameter conflicts
//! and body misuse are returned as [`RegistrationError`] at the call that
//! introduced them. Case identities are claimed once a test's parameters are
//! settled, that is at `params()`, or at `body()`/`unimplemented()` for a
//! test without parameters, so a collision is reported regardless of the
//! order tests are declared in. A missing body is only known at the end
//! ([`TestGroup::validate`]).

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use cts_params::{params, ParamSet, ParamsBuilder, ParamsError};
use futures::future::{BoxFuture, FutureExt};
use rustc_hash::FxHashSet;

use crate::{BodyResult, CaseId, Fixture, RegistrationError, TestContext, TestName};

type SyncBody<F> = Arc<dyn Fn(&TestContext<F>) -> BodyResult + Send + Sync>;
type AsyncBody<F> = Arc<dyn Fn(TestContext<F>) -> BoxFuture<'static, BodyResult> + Send + Sync>;

/// An executable test body.
pub(crate) enum Body<F> {
    Sync(SyncBody<F>),
    Async(AsyncBody<F>),
}

impl<F: Fixture> Body<F> {
    /// Start the body. Synchronous bodies run on first poll.
    pub(crate) fn invoke(&self, t: TestContext<F>) -> BoxFuture<'static, BodyResult> {
        match self {
            Body::Sync(f) => {
                let f = Arc::clone(f);
                async move { f(&t) }.boxed()
            }
            Body::Async(f) => f(t),
        }
    }
}

/// Declared status of a test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestStatus {
    Implemented,
    /// Placeholder; reported as not implemented, never run.
    Unimplemented,
    /// Registered but not run, with the reason.
    Skipped(String),
}

/// One registered test.
pub struct TestDef<F> {
    name: TestName,
    description: Option<String>,
    params: ParamsBuilder,
    status: TestStatus,
    body: Option<Body<F>>,
    /// Identities this test claimed in the group.
    identities: Vec<String>,
    /// Set once `identities` reflects the final parameters.
    claimed: bool,
}

impl<F> TestDef<F> {
    pub fn name(&self) -> &TestName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> &TestStatus {
        &self.status
    }

    pub fn params(&self) -> &ParamsBuilder {
        &self.params
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub(crate) fn body(&self) -> Option<&Body<F>> {
        self.body.as_ref()
    }

    /// Lazily expand this test into its cases.
    pub fn cases(&self) -> impl Iterator<Item = Result<(CaseId, ParamSet), ParamsError>> + '_ {
        self.params.iter().map(move |set| {
            set.map(|set| (CaseId::new(self.name.clone(), set.identity()), set))
        })
    }
}

impl<F> fmt::Debug for TestDef<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDef")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("params", &self.params)
            .field("has_body", &self.body.is_some())
            .finish_non_exhaustive()
    }
}

/// A named collection of tests sharing one fixture type.
pub struct TestGroup<F> {
    name: String,
    description: Option<String>,
    tests: Vec<TestDef<F>>,
    identities: FxHashSet<String>,
}

impl<F: Fixture> TestGroup<F> {
    pub fn new(name: impl Into<String>) -> Self {
        TestGroup {
            name: name.into(),
            description: None,
            tests: Vec::new(),
            identities: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tests(&self) -> &[TestDef<F>] {
        &self.tests
    }

    /// Register a test. `name` is a `,`-separated list of segments.
    pub fn test(&mut self, name: &str) -> Result<TestBuilder<'_, F>, RegistrationError> {
        let name = TestName::parse(name)?;

        tracing::trace!(group = %self.name, test = %name, "registered test");
        self.tests.push(TestDef {
            name,
            description: None,
            params: params(),
            status: TestStatus::Implemented,
            body: None,
            identities: Vec::new(),
            claimed: false,
        });
        let index = self.tests.len() - 1;
        Ok(TestBuilder { group: self, index })
    }

    /// Check that every test is runnable.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        for test in &self.tests {
            if test.status != TestStatus::Unimplemented && test.body.is_none() {
                return Err(RegistrationError::MissingBody {
                    test: test.name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate) and hand the group back.
    pub fn finish(self) -> Result<Self, RegistrationError> {
        self.validate()?;
        Ok(self)
    }

    /// Reserve `ids`, all or nothing.
    fn claim(&mut self, ids: &[String]) -> Result<(), RegistrationError> {
        if let Some(id) = ids.iter().find(|id| self.identities.contains(*id)) {
            return Err(RegistrationError::DuplicateTestCase {
                group: self.name.clone(),
                id: id.clone(),
            });
        }
        self.identities.extend(ids.iter().cloned());
        Ok(())
    }
}

impl<F> fmt::Debug for TestGroup<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestGroup")
            .field("name", &self.name)
            .field("tests", &self.tests)
            .finish_non_exhaustive()
    }
}

/// Chainable configuration of the test just registered.
pub struct TestBuilder<'g, F> {
    group: &'g mut TestGroup<F>,
    index: usize,
}

impl<F: Fixture> TestBuilder<'_, F> {
    fn def(&mut self) -> &mut TestDef<F> {
        &mut self.group.tests[self.index]
    }

    fn test_name(&self) -> String {
        self.group.tests[self.index].name.to_string()
    }

    /// Attach documentation.
    pub fn desc(&mut self, text: impl Into<String>) -> &mut Self {
        self.def().description = Some(text.into());
        self
    }

    /// Attach a parameter builder (or anything convertible into one).
    ///
    /// The builder is expanded once here so conflicts and identity
    /// collisions fail registration; the runner expands it again lazily.
    pub fn params(
        &mut self,
        builder: impl Into<ParamsBuilder>,
    ) -> Result<&mut Self, RegistrationError> {
        let builder = builder.into();
        let sets = builder
            .expand()
            .map_err(|source| RegistrationError::ParameterConflict {
                test: self.test_name(),
                source,
            })?;

        let name = self.group.tests[self.index].name.clone();
        let ids: Vec<String> = sets
            .iter()
            .map(|set| CaseId::new(name.clone(), set.identity()).to_string())
            .collect();

        let previous = std::mem::take(&mut self.def().identities);
        for id in &previous {
            self.group.identities.remove(id);
        }
        if let Err(e) = self.group.claim(&ids) {
            self.group.identities.extend(previous.iter().cloned());
            self.def().identities = previous;
            return Err(e);
        }

        let def = self.def();
        def.identities = ids;
        def.params = builder;
        def.claimed = true;
        Ok(self)
    }

    /// Claim the bare identity if no parameters were attached.
    fn settle(&mut self) -> Result<(), RegistrationError> {
        if self.group.tests[self.index].claimed {
            return Ok(());
        }
        let id = CaseId::bare(self.group.tests[self.index].name.clone()).to_string();
        self.group.claim(std::slice::from_ref(&id))?;
        let def = self.def();
        def.identities = vec![id];
        def.claimed = true;
        Ok(())
    }

    /// Mark as a placeholder that is reported but never run.
    pub fn unimplemented(&mut self) -> Result<&mut Self, RegistrationError> {
        if self.def().body.is_some() {
            return Err(RegistrationError::UnimplementedWithBody {
                test: self.test_name(),
            });
        }
        self.settle()?;
        self.def().status = TestStatus::Unimplemented;
        Ok(self)
    }

    /// Register the test but report every case as skipped.
    pub fn skip(&mut self, reason: impl Into<String>) -> &mut Self {
        if self.def().status != TestStatus::Unimplemented {
            self.def().status = TestStatus::Skipped(reason.into());
        }
        self
    }

    /// Attach a synchronous body.
    pub fn body<B>(&mut self, body: B) -> Result<&mut Self, RegistrationError>
    where
        B: Fn(&TestContext<F>) -> BodyResult + Send + Sync + 'static,
    {
        self.attach(Body::Sync(Arc::new(body)))
    }

    /// Attach an asynchronous body.
    pub fn body_async<B, Fut>(&mut self, body: B) -> Result<&mut Self, RegistrationError>
    where
        B: Fn(TestContext<F>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BodyResult> + Send + 'static,
    {
        self.attach(Body::Async(Arc::new(move |t: TestContext<F>| body(t).boxed())))
    }

    fn attach(&mut self, body: Body<F>) -> Result<&mut Self, RegistrationError> {
        let test = self.test_name();
        let def = self.def();
        if def.status == TestStatus::Unimplemented {
            return Err(RegistrationError::UnimplementedWithBody { test });
        }
        if def.body.is_some() {
            return Err(RegistrationError::DoubleBodyAttachment { test });
        }
        self.settle()?;
        self.def().body = Some(body);
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
