//! Test groups, fixtures, assertions and the case runner.
//!
//! # Data flow
//!
//! ```text
//! TestGroup ──► TestDef ──► ParamsBuilder::iter() ──► (CaseId, ParamSet)
//!                                                          │
//!                                                          ▼
//!                              Fixture::acquire ──► body(TestContext) ──► pending assertions
//!                                                          │
//!                                                          ▼
//!                                          Fixture::release ──► Outcome ──► GroupSummary
//! ```
//!
//! Registration errors are returned from the registration API and are fatal.
//! Everything that happens while a case runs is recorded into its
//! [`Outcome`]; one failing case never stops its siblings.

pub mod context;
pub mod device;
mod error;
pub mod fixture;
pub mod group;
mod name;
pub mod outcome;
pub mod query;
pub mod runner;
mod thrown;

pub use context::TestContext;
pub use device::{
    BufferId, Device, DeviceProvider, DeviceRequestError, FakeDeviceProvider, Resources,
};
pub use error::RegistrationError;
pub use fixture::{BasicFixture, DeviceFixture, Fixture};
pub use group::{TestBuilder, TestDef, TestGroup, TestStatus};
pub use name::{CaseId, TestName, NAME_SEPARATOR};
pub use outcome::{AssertionFailure, CaseResult, GroupSummary, Outcome, RunSummary};
pub use query::Query;
pub use runner::{CaseState, RunnableGroup, RunnerConfig, TestRunner};
pub use thrown::{BodyResult, Interrupt, Thrown};

pub use cts_params::{
    options, param_set, params, pbool, poptions, Axis, ParamSet, ParamsBuilder, ParamsError,
};
