use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueHint};
use tracing_subscriber::EnvFilter;

use ivplot::data::loader::load_sweeps;
use ivplot::{build_gallery, Dataset, GalleryConfig, Theme, View};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build an HTML gallery of transistor I-V plots", long_about = None)]
struct Cli {
    /// CSV / Excel sweep files; each becomes one gallery entry named after the file
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Output directory for the plot documents and the index page
    #[arg(short, long, default_value = "ivplot_gallery", value_hint = ValueHint::DirPath)]
    output: PathBuf,

    /// JSON gallery configuration; flags below override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Panels to draw: gate, drain, 3d or all
    #[arg(long)]
    view: Option<View>,

    /// Draw the 3D scenes as triangulated surfaces
    #[arg(long, action = ArgAction::SetTrue)]
    surface: bool,

    /// Randomly downsample each pool to at most this many samples
    #[arg(long)]
    max_samples: Option<usize>,

    /// Seed for downsampling
    #[arg(long)]
    seed: Option<u64>,

    /// Page and plot theme: light or dark
    #[arg(long)]
    theme: Option<Theme>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: Cli) -> ivplot::Result<PathBuf> {
    let mut config = match &cli.config {
        Some(path) => GalleryConfig::load(path)?,
        None => GalleryConfig::default(),
    };
    if let Some(view) = cli.view {
        config.plot.view = view;
    }
    if cli.surface {
        config.plot.surface = true;
    }
    if cli.max_samples.is_some() {
        config.plot.max_samples = cli.max_samples;
    }
    if let Some(seed) = cli.seed {
        config.plot.seed = seed;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    let mut datasets = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        datasets.push(Dataset::new(name, load_sweeps(path)?));
    }

    build_gallery(&datasets, &cli.output, &config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(index) => {
            println!("{}", index.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
