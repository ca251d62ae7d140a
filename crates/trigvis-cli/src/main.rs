#![forbid(unsafe_code)]

mod cmd;
mod output;
mod theme;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "trigvis: trigger-relationship graphs for YR/Mental Omega maps",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Build the relationship graph document for one map",
        long_about = "Load a map's record documents, classify trigger relationships, \
                      and write the graph document consumed by the renderer.",
        after_help = "EXAMPLES:\n    # Build from a parsed map directory\n    trigvis build --map-dir data/maps/yours\n\n    # Custom dictionaries and output path\n    trigvis build --map-dir data/maps/yours --actions-yml acts.yml --conditions-yml conds.yml --out yours.json\n\n    # Emit machine-readable output\n    trigvis build --map-dir data/maps/yours --json"
    )]
    Build(cmd::build::BuildArgs),

    #[command(
        about = "Summarize a map's relationship graph",
        after_help = "EXAMPLES:\n    # Graph summary\n    trigvis stats --map-dir data/maps/yours\n\n    # Emit machine-readable output\n    trigvis stats --map-dir data/maps/yours --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        about = "Show one trigger's entries and relations",
        after_help = "EXAMPLES:\n    # Inspect a trigger (padding optional)\n    trigvis inspect 1480000 --map-dir data/maps/yours"
    )]
    Inspect(cmd::inspect::InspectArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    trigvis completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Initialize tracing to stderr, honoring `TRIGVIS_LOG` and the
/// verbosity flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("TRIGVIS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let output = cli.output_mode();

    match &cli.command {
        Commands::Build(args) => cmd::build::run(args, output),
        Commands::Stats(args) => cmd::stats::run(args, output),
        Commands::Inspect(args) => cmd::inspect::run(args, output),
        Commands::Completions(args) => cmd::completions::run(args, &mut Cli::command()),
    }
}
