//! Visual-inspection tools for saved flow-solver output.
//!
//! Two binaries are built from this library: `convergence`, which renders a
//! log-log convergence plot from per-scheme error tables, and `fieldview`,
//! which replays saved velocity-field snapshots in a window.

use tracing_subscriber::{fmt, EnvFilter};

pub mod convergence;
pub mod field;
pub mod table;
pub mod viewer;

/// Install the tracing subscriber for the tool binaries.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
