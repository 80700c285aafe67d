use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TriageError {
    #[error("input file {} not found", .0.display())]
    InputMissing(PathBuf),

    #[error("Kraken2 database {} not found", .0.display())]
    #[diagnostic(help("download a Kraken2 database and pass its directory with --db"))]
    DatabaseMissing(PathBuf),

    #[error("no Kraken2 database given (use --db or set `database` in the config file)")]
    MissingDatabase,

    #[error("invalid classification status: {0}")]
    InvalidStatus(String),

    #[error("confidence threshold must be within [0, 1], got {0}")]
    InvalidConfidence(f64),

    #[error("thread count must be at least 1")]
    InvalidThreads,

    #[error("failed to read config file at {}", .0.display())]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read FASTA {}: {message}", .path.display())]
    FastaRead { path: PathBuf, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("required tool not found: {0}")]
    #[diagnostic(help("install Kraken2 and make sure `kraken2` is on PATH"))]
    MissingTool(String),

    #[error("Kraken2 classification failed: {0}")]
    ClassifierFailed(String),
}
