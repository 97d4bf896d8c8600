use cdf_split::{
    SplitParameters,
    plot::{PngPlotter, TracePlotter},
};
use cdf_split_common::{TracerOptions, init_tracer};
use clap::Parser;
use miette::IntoDiagnostic;
use std::path::PathBuf;
use tracing::info;

/// [clap] derived struct to parse command line arguments.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// netCDF classic file to split.
    #[clap(short, long, env, default_value = "input/MethnolExtractant.cdf")]
    input: PathBuf,

    /// Directory receiving the archive and the plot; created if absent.
    #[clap(short, long, env, default_value = "output")]
    output: PathBuf,

    /// Skip rendering the intensity plot.
    #[clap(long)]
    no_plot: bool,

    #[clap(flatten)]
    parameters: SplitParameters,

    #[clap(flatten)]
    tracer: TracerOptions,
}

fn main() -> miette::Result<()> {
    let args = Cli::parse();

    let _tracer = init_tracer!(args.tracer.clone()).into_diagnostic()?;

    let plotter = PngPlotter::default();
    let plotter = (!args.no_plot).then_some(&plotter as &dyn TracePlotter);

    let report =
        cdf_split::run(&args.input, &args.output, &args.parameters, plotter).into_diagnostic()?;

    info!(
        "Wrote {} ranges to {} (threshold {})",
        report.ranges.len(),
        report.archive.display(),
        report.threshold
    );
    if let Some(plot) = &report.plot {
        info!("Plotted trace to {}", plot.display());
    }
    Ok(())
}
