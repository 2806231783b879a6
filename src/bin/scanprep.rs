//! Quick commandline utility to turn a nifti scan into a normalized, fixed-shape volume.
//!
//! The scan is min-max normalized, turned 90 degrees in-plane (unless
//! `--no-reorient` is given), resized with linear interpolation and given a
//! trailing channel axis. The result is saved as a 4D nifti file with shape
//! `width x height x depth x 1`, ready to be fed to a 3D CNN.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use nifti::writer::WriterOptions;
use scanprep::config::{DEFAULT_DEPTH, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use scanprep::loader::read_scan;
use scanprep::{process_volume, PreprocessConfig, ProcessedVolume};

// use clap to create commandline interface
#[derive(Parser, Debug)]
#[command(author, about, version, long_about)]
struct Args {
    /// the input nifti file
    #[arg(short, long)]
    input: String,

    /// the output nifti file. Defaults to `<input name>_prep.nii` next to the input.
    #[arg(short, long)]
    output: Option<String>,

    /// target size along the first (width) axis
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// target size along the second (height) axis
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// target size along the third (depth) axis
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// skip the fixed 90 degree in-plane rotation, for scans already in the expected orientation
    #[arg(long)]
    no_reorient: bool,

    /// log each pipeline stage (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> PreprocessConfig {
        PreprocessConfig::new(self.width, self.height, self.depth)
            .with_reorientation(!self.no_reorient)
    }
}

fn default_output_path(input: &Path) -> Option<PathBuf> {
    // strip both extensions of `.nii.gz`
    let name = input.file_name()?.to_str()?;
    let stem = name
        .strip_suffix(".nii.gz")
        .or_else(|| name.strip_suffix(".nii"))
        .unwrap_or(name);
    Some(input.with_file_name(format!("{stem}_prep.nii")))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Saves the processed volume, reusing the input header for spatial metadata.
fn save_processed(
    volume: &ProcessedVolume,
    header: &nifti::NiftiHeader,
    output_path: &Path,
) -> Result<(), nifti::error::NiftiError> {
    let mut out_header = header.clone();
    // values are already scaled, and live in [0, 1]
    out_header.scl_slope = 1.0;
    out_header.scl_inter = 0.0;
    out_header.cal_min = 0.0;
    out_header.cal_max = 1.0;
    WriterOptions::new(output_path)
        .reference_header(&out_header)
        .write_nifti(volume)
}

fn run(cli: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let input_filepath = Path::new(&cli.input);
    let output_path = match &cli.output {
        Some(output) => PathBuf::from(output),
        None => default_output_path(input_filepath).ok_or("Could not parse input file name.")?,
    };
    if output_path.exists() {
        return Err(format!(
            "Output file {} already exists. Please specify a different output file or remove existing file.",
            output_path.display()
        )
        .into());
    }

    let config = cli.config();
    println!("Loading: {}", input_filepath.display());
    let scan = read_scan(input_filepath)?;
    println!("Input shape: {:?}", scan.volume.dim());
    if !config.apply_fixed_reorientation {
        println!("Skipping in-plane reorientation");
    }

    let processed = process_volume(scan.volume, &config)?;
    println!("Final shape: {:?}", processed.shape());

    save_processed(&processed, &scan.header, &output_path)?;
    println!("Output: {}", output_path.display());
    Ok(())
}

/// Main function that parses commandline arguments and runs the program.
fn main() {
    let cli = Args::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(&cli) {
        eprintln!("Error! {}", e);
        std::process::exit(-2);
    }
}
