//! Text and JSON reports for a finished run.

use std::fmt::Write as _;

use cts_core::{CaseResult, Outcome, RunSummary};
use serde::Serialize;

/// Print a summary of test results, with optional verbose output.
pub fn print_test_summary(summary: &RunSummary, verbose: bool) {
    print!("{}", render_text(summary, verbose));
}

/// Print the run as a JSON document.
pub fn print_json_report(summary: &RunSummary) {
    match render_json(summary) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to serialize report: {e}"),
    }
}

/// Render the text report.
///
/// Every case gets one line with its terminal state. `verbose` adds
/// durations and the lines each case logged.
pub fn render_text(summary: &RunSummary, verbose: bool) -> String {
    let mut out = String::new();

    for group in &summary.groups {
        if group.total() == 0 {
            continue;
        }
        let _ = writeln!(out, "\n{}", group.group);
        for result in &group.results {
            write_case(&mut out, result, verbose);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Test Summary:");
    let _ = writeln!(
        out,
        "  {} passed, {} failed, {} errored, {} skipped, {} unimplemented ({} total)",
        summary.passed,
        summary.failed,
        summary.errored,
        summary.skipped,
        summary.unimplemented,
        summary.total()
    );
    let _ = writeln!(out, "  Completed in {:.2?}", summary.duration);
    let _ = writeln!(out);

    let verdict = if summary.has_failures() {
        "FAILED"
    } else if summary.total() == 0 {
        "NO TESTS FOUND"
    } else {
        "OK"
    };
    let _ = writeln!(out, "{verdict}");
    out
}

fn write_case(out: &mut String, result: &CaseResult, verbose: bool) {
    let _ = write!(out, "  {}: {}", result.outcome.label(), result.id);
    let _ = match &result.outcome {
        Outcome::Skipped { reason } => write!(out, " - {reason}"),
        Outcome::Errored { error, .. } => write!(out, " - {error}"),
        Outcome::Passed | Outcome::Failed { .. } | Outcome::Unimplemented => Ok(()),
    };
    if verbose {
        let _ = write!(out, " ({:.2?})", result.duration);
    }
    let _ = writeln!(out);
    for failure in result.outcome.failures() {
        let text = failure.to_string().replace('\n', "\n        ");
        let _ = writeln!(out, "      - {text}");
    }
    if verbose {
        for line in &result.logs {
            let _ = writeln!(out, "      | {line}");
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    ok: bool,
    exit_code: i32,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

/// Render the run as pretty-printed JSON.
pub fn render_json(summary: &RunSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        ok: !summary.has_failures(),
        exit_code: summary.exit_code(),
        summary,
    })
}
