//! Renders a log-log convergence plot from the solver's per-scheme error
//! tables (`advx.dat`, `advy.dat`, `difx.dat`, `dify.dat`, `pres.dat`).

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use flowviz::convergence;

#[derive(Parser, Debug)]
#[command(name = "convergence")]
#[command(about = "Plot grid-convergence of the solver's discretisation schemes")]
struct Args {
    /// Directory holding the per-scheme .dat error tables
    root: PathBuf,

    /// Destination image path (format inferred from the extension)
    output: PathBuf,
}

fn main() {
    flowviz::init_logging();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!("{err:#}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let runs = convergence::load_runs(&args.root)?;
    let curves = convergence::build_curves(&runs);
    convergence::render(&curves, &args.output)?;
    info!("wrote {}", args.output.display());
    Ok(())
}
