//! The `list` command: print case identities without running anything.

use cts_core::{Query, RegistrationError, TestStatus};

use crate::suites;

/// Print every case selected by `query` and return the exit code.
pub fn list_cases(query: Option<&Query>) -> i32 {
    match collect_cases(query) {
        Ok(lines) => {
            for line in &lines {
                println!("{line}");
            }
            if lines.is_empty() {
                2
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// One line per selected case: `group:identity`, with a status marker for
/// cases that will not run.
pub fn collect_cases(query: Option<&Query>) -> Result<Vec<String>, RegistrationError> {
    let mut lines = Vec::new();
    for group in suites::all()? {
        for (id, status) in group.list_cases()? {
            if query.is_some_and(|q| !q.matches(group.name(), &id)) {
                continue;
            }
            let marker = match status {
                TestStatus::Implemented => String::new(),
                TestStatus::Unimplemented => " [unimplemented]".to_string(),
                TestStatus::Skipped(reason) => format!(" [skip: {reason}]"),
            };
            lines.push(format!("{}:{id}{marker}", group.name()));
        }
    }
    Ok(lines)
}
