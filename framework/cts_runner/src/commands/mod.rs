//! Subcommands of the `cts` binary.

mod list;
mod run;

pub use list::{collect_cases, list_cases};
pub use run::{run_suites, run_summary, OutputFormat, RunOptions};
