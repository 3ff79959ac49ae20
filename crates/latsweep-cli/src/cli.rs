use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "latsweep - generate pw.x inputs over a lattice-parameter sweep, run them, and fit the energies to find the equilibrium lattice constant.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to read output files.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a configuration file populated with the default settings.
    Init(InitArgs),
    /// Generate one pw.x input file per lattice parameter of the sweep.
    Generate(GenerateArgs),
    /// Run pw.x on the generated inputs (generating any that are missing).
    Run(RunArgs),
    /// Extract energies from pw.x outputs, fit them and write a TikZ plot.
    Analyze(AnalyzeArgs),
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the configuration file.
    #[arg(default_value = "latsweep.toml", value_name = "PATH")]
    pub path: PathBuf,

    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

/// Configuration sources shared by every sweep command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S calculation.ecutwfc=30
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Overrides for the swept system.
#[derive(Args, Debug, Clone, Default)]
pub struct SweepOverrides {
    /// First lattice parameter of the sweep, in Angstrom.
    #[arg(long, value_name = "ANGSTROM")]
    pub start: Option<f64>,

    /// Last lattice parameter of the sweep, in Angstrom.
    #[arg(long, value_name = "ANGSTROM")]
    pub end: Option<f64>,

    /// Number of lattice parameters in the sweep.
    #[arg(long, value_name = "INT")]
    pub points: Option<usize>,

    /// Chemical symbol of the element (e.g. 'Cu').
    #[arg(short, long, value_name = "SYMBOL")]
    pub element: Option<String>,

    /// Bravais lattice: 'sc', 'fcc' or 'bcc'.
    #[arg(short, long, value_name = "LATTICE")]
    pub lattice: Option<String>,

    /// Monkhorst-Pack mesh, e.g. '12x12x12'.
    #[arg(short, long, value_name = "N1xN2xN3")]
    pub kpoints: Option<String>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub sweep: SweepOverrides,

    /// Directory to write the input files into.
    #[arg(short, long, default_value = "calculations", value_name = "DIR")]
    pub output_dir: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub sweep: SweepOverrides,

    /// Directory holding the input files; outputs are written next to them.
    #[arg(short, long, default_value = "calculations", value_name = "DIR")]
    pub dir: PathBuf,

    /// Command used to run pw.x, e.g. "mpirun -np 4 pw.x".
    #[arg(long = "command", value_name = "CMD")]
    pub run_command: Option<String>,

    /// Number of calculations to run at the same time.
    #[arg(long, value_name = "NUM")]
    pub jobs: Option<usize>,

    /// Rerun calculations whose outputs already hold a converged energy.
    #[arg(long)]
    pub rerun: bool,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub sweep: SweepOverrides,

    /// Directory holding the pw.x output files.
    #[arg(short, long, default_value = "calculations", value_name = "DIR")]
    pub dir: PathBuf,

    /// Degree of the fitted polynomial.
    #[arg(long, value_name = "INT")]
    pub degree: Option<usize>,

    /// Path of the generated TikZ/pgfplots file.
    #[arg(long, default_value = "lattice_optimization.tex", value_name = "PATH")]
    pub plot: PathBuf,

    /// Also write the extracted energies as CSV.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}
