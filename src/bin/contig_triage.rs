use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use contig_triage::app::App;
use contig_triage::config::{ConfigLoader, TriageConfig};
use contig_triage::error::TriageError;
use contig_triage::kraken::{ClassifierClient, ClassifierOutput, ClassifierRequest, Kraken2Client};
use contig_triage::output::{JsonOutput, OutputMode, TextOutput};

#[derive(Parser)]
#[command(name = "contig-triage")]
#[command(about = "Assembly statistics and kingdom-level triage of metagenomic contigs")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "Print machine-readable JSON instead of text reports")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Calculate assembly statistics (N50, length distribution) for a FASTA file")]
    Stats(StatsArgs),
    #[command(about = "Triage contigs into kingdom-level FASTA files using Kraken2")]
    #[command(after_help = "Examples:\n  \
        contig-triage triage contigs.fa --db kraken2_db\n  \
        contig-triage triage contigs.fa --db kraken2_db --confidence 0.05\n  \
        contig-triage triage contigs.fa --db kraken2_db --keep-intermediates")]
    Triage(TriageArgs),
}

#[derive(Args)]
struct StatsArgs {
    #[arg(help = "Input FASTA file with contigs")]
    fasta_file: PathBuf,
}

#[derive(Args)]
struct TriageArgs {
    #[arg(help = "Input FASTA file with contigs")]
    fasta_file: PathBuf,

    #[arg(long, help = "Path to the Kraken2 database")]
    db: Option<PathBuf>,

    #[arg(long, help = "Output directory [default: kingdom_triage]")]
    output_dir: Option<Utf8PathBuf>,

    #[arg(long, help = "Number of Kraken2 threads [default: 8]")]
    threads: Option<usize>,

    #[arg(long, help = "Kraken2 confidence threshold [default: 0.1]")]
    confidence: Option<f64>,

    #[arg(long, help = "Keep the Kraken2 output and report files")]
    keep_intermediates: bool,

    #[arg(long, help = "JSON file with default triage settings")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<TriageError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &TriageError) -> u8 {
    match error {
        TriageError::InputMissing(_)
        | TriageError::DatabaseMissing(_)
        | TriageError::MissingDatabase => 2,
        TriageError::MissingTool(_) | TriageError::ClassifierFailed(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    match cli.command {
        Commands::Stats(args) => run_stats(args, output_mode),
        Commands::Triage(args) => run_triage(args, output_mode),
    }
}

fn run_stats(args: StatsArgs, output_mode: OutputMode) -> miette::Result<()> {
    let app = App::new(NopClassifier);
    match output_mode {
        OutputMode::Json => {
            let outcome = app.stats(&args.fasta_file, &JsonOutput)?;
            JsonOutput::print_stats(&outcome).into_diagnostic()
        }
        OutputMode::Text => {
            let outcome = app.stats(&args.fasta_file, &TextOutput)?;
            TextOutput::print_stats(&args.fasta_file, &outcome).into_diagnostic()
        }
    }
}

fn run_triage(args: TriageArgs, output_mode: OutputMode) -> miette::Result<()> {
    let TriageArgs {
        fasta_file,
        db,
        output_dir,
        threads,
        confidence,
        keep_intermediates,
        config,
    } = args;

    let overrides = TriageConfig {
        database: db,
        output_dir,
        threads,
        confidence,
        keep_intermediates: keep_intermediates.then_some(true),
    };
    let options = ConfigLoader::resolve(config.as_deref(), overrides)?;
    tracing::debug!(?options, "resolved triage options");

    let app = App::new(Kraken2Client::new());
    match output_mode {
        OutputMode::Json => {
            let result = app.triage(&fasta_file, &options, &JsonOutput)?;
            JsonOutput::print_triage(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result = app.triage(&fasta_file, &options, &TextOutput)?;
            TextOutput::print_triage(&result).into_diagnostic()
        }
    }
}

struct NopClassifier;

impl ClassifierClient for NopClassifier {
    fn classify(&self, _request: &ClassifierRequest) -> Result<ClassifierOutput, TriageError> {
        Err(TriageError::MissingTool(
            "classifier not configured".to_string(),
        ))
    }

    fn tool_version(&self) -> Option<String> {
        None
    }
}
