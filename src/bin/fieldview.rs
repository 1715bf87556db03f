//! Replays the saved velocity-field snapshots under `output/save`, one
//! window frame per timestep. Takes no arguments; run it from the solver's
//! working directory.

use std::path::Path;
use std::process;

use tracing::error;

use flowviz::viewer;

/// Where the solver drops its per-timestep `ux.npy` / `uy.npy` pairs.
const SAVE_ROOT: &str = "output/save";

fn main() {
    flowviz::init_logging();

    if let Err(err) = viewer::play(Path::new(SAVE_ROOT)) {
        error!("{err:#}");
        process::exit(1);
    }
}
