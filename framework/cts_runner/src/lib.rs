//! Command-line front end for the CTS engine.
//!
//! Holds the built-in suites, the `run` and `list` commands, and the text and
//! JSON reporters. The `cts` binary is a thin argument parser over this crate.

pub mod commands;
pub mod report;
pub mod suites;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber once per process.
///
/// Does nothing unless `RUST_LOG` is set. `CTS_LOG_TREE` switches from flat
/// lines to an indented span tree.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("CTS_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
