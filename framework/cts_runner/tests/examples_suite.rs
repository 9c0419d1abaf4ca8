//! Runs the built-in suites end to end through the library API.

#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use cts_core::{Outcome, Query, RunnerConfig};
use cts_runner::commands::{collect_cases, run_summary, OutputFormat, RunOptions};
use cts_runner::report::{render_json, render_text};
use pretty_assertions::assert_eq;

fn options(query: Option<&str>, parallel: bool) -> RunOptions {
    RunOptions {
        config: RunnerConfig {
            query: query.map(|q| Query::parse(q).unwrap()),
            parallel,
            ..RunnerConfig::default()
        },
        format: OutputFormat::Text,
    }
}

fn outcome<'s>(summary: &'s cts_core::RunSummary, group: &str, id: &str) -> &'s Outcome {
    &summary
        .groups
        .iter()
        .find(|g| g.group == group)
        .and_then(|g| g.find(id))
        .unwrap_or_else(|| panic!("no result for {group}:{id}"))
        .outcome
}

#[test]
fn test_examples_suite_passes() {
    let summary = run_summary(&options(None, true)).unwrap();

    assert!(!summary.has_failures(), "{}", render_text(&summary, true));
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.unimplemented, 2);

    assert!(outcome(&summary, "examples", r#"basic,params/params={"x":-10,"y":18}"#).is_passed());
    assert!(outcome(&summary, "examples", "basic,async").is_passed());
    assert!(outcome(&summary, "examples", "gpu,buffers").is_passed());
    assert!(outcome(
        &summary,
        "examples",
        r#"gpu,with_texture_compression,bc/params={"textureCompressionBC":true}"#
    )
    .is_passed());
    assert!(outcome(
        &summary,
        "examples",
        r#"gpu,with_texture_compression,etc/params={"textureCompressionETC":true}"#
    )
    .is_skipped());
    assert!(outcome(&summary, "builder", r#"platform_specific/params={"backend":"metal"}"#)
        .is_skipped());
}

#[test]
fn test_query_narrows_the_run() {
    let summary = run_summary(&options(Some("examples:basic,*"), false)).unwrap();
    assert_eq!(summary.groups.len(), 1);
    assert_eq!(summary.total(), 8);

    let summary = run_summary(&options(Some(r#"examples:basic,params:{"x":2,"y":4}"#), false))
        .unwrap();
    assert_eq!(summary.total(), 1);
    assert!(summary.groups[0]
        .find(r#"basic,params/params={"x":2,"y":4}"#)
        .is_some());

    let summary = run_summary(&options(Some("nothing"), false)).unwrap();
    assert_eq!(summary.exit_code(), 2);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let view = |parallel| {
        let summary = run_summary(&options(None, parallel)).unwrap();
        summary
            .groups
            .iter()
            .flat_map(|g| g.results.iter())
            .map(|r| (r.id.to_string(), r.outcome.label()))
            .collect::<Vec<_>>()
    };
    assert_eq!(view(true), view(false));
}

#[test]
fn test_listing() {
    let all = collect_cases(None).unwrap();
    assert!(all.contains(&"examples:test_name".to_string()));
    assert!(all.contains(&"examples:not_implemented_yet,with_plan [unimplemented]".to_string()));
    assert!(all
        .iter()
        .any(|line| line.starts_with("builder:platform_specific/") && line.ends_with("]")));

    let query = Query::parse("examples:basic,params").unwrap();
    assert_eq!(
        collect_cases(Some(&query)).unwrap(),
        vec![
            r#"examples:basic,params/params={"x":2,"y":4}"#,
            r#"examples:basic,params/params={"x":-10,"y":18}"#,
        ]
    );
}

#[test]
fn test_json_report_is_valid() {
    let summary = run_summary(&options(Some("examples:gpu,*"), false)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&render_json(&summary).unwrap()).unwrap();
    assert_eq!(value["ok"], true);
    assert_eq!(value["groups"][0]["group"], "examples");
}
