//! The `run` command: run the built-in suites and report results.

use cts_core::{RegistrationError, RunSummary, RunnerConfig, TestRunner};

use crate::report::{print_json_report, print_test_summary};
use crate::suites;

/// How results are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options of one `cts run` invocation.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub config: RunnerConfig,
    pub format: OutputFormat,
}

/// Run every suite selected by `options`, print the report and return the
/// process exit code.
pub fn run_suites(options: &RunOptions) -> i32 {
    match run_summary(options) {
        Ok(summary) => {
            match options.format {
                OutputFormat::Text => print_test_summary(&summary, options.config.verbose),
                OutputFormat::Json => print_json_report(&summary),
            }
            summary.exit_code()
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Run every suite selected by `options` and collect the results.
pub fn run_summary(options: &RunOptions) -> Result<RunSummary, RegistrationError> {
    let groups = suites::all()?;
    let selected: Vec<_> = groups
        .iter()
        .map(|group| &**group)
        .filter(|group| {
            options
                .config
                .query
                .as_ref()
                .map_or(true, |q| q.group_name() == group.name())
        })
        .collect();

    tracing::debug!(groups = selected.len(), "running suites");
    TestRunner::with_config(options.config.clone())
        .with_resources(suites::resources())
        .run_all(&selected)
}
