use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;
use tracing::{info, warn};

use crate::classify::{KingdomMap, read_classifier_output};
use crate::config::TriageOptions;
use crate::domain::Kingdom;
use crate::error::TriageError;
use crate::fasta;
use crate::kraken::{ClassifierClient, ClassifierOutput, ClassifierRequest};
use crate::partition::{PartitionOutput, write_kingdom_fastas};
use crate::stats::StatsOutcome;

pub const SUMMARY_FILE_NAME: &str = "triage_summary.json";

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifierSettings {
    pub database: String,
    pub threads: usize,
    pub confidence: f64,
    pub version: Option<String>,
    pub skipped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KingdomReport {
    pub kingdom: Kingdom,
    pub file: String,
    pub contigs: u64,
    pub total_bp: u64,
    pub avg_length: Option<f64>,
    pub max_length: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageResult {
    pub input: String,
    pub output_dir: String,
    pub generated_at: String,
    pub classifier: ClassifierSettings,
    pub kingdoms: Vec<KingdomReport>,
    pub total_contigs: u64,
    pub total_bp: u64,
    pub intermediates: Option<ClassifierOutput>,
}

impl TriageResult {
    fn new(
        input: &Path,
        partition: &PartitionOutput,
        classifier: ClassifierSettings,
        intermediates: Option<ClassifierOutput>,
    ) -> Self {
        let summary = &partition.summary;
        let kingdoms = summary
            .iter()
            .map(|(kingdom, bucket)| KingdomReport {
                kingdom,
                file: partition.file_path(kingdom).to_string(),
                contigs: bucket.count,
                total_bp: bucket.total_bp,
                avg_length: bucket.average_length(),
                max_length: bucket.max_length(),
            })
            .collect();
        Self {
            input: input.display().to_string(),
            output_dir: partition.output_dir.to_string(),
            generated_at: now_rfc3339(),
            classifier,
            kingdoms,
            total_contigs: summary.total_contigs(),
            total_bp: summary.total_bp(),
            intermediates,
        }
    }

    pub fn kingdom(&self, kingdom: Kingdom) -> Option<&KingdomReport> {
        self.kingdoms.iter().find(|report| report.kingdom == kingdom)
    }
}

pub struct App<C: ClassifierClient> {
    classifier: C,
}

impl<C: ClassifierClient> App<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn stats(&self, input: &Path, sink: &dyn ProgressSink) -> Result<StatsOutcome, TriageError> {
        if !input.exists() {
            return Err(TriageError::InputMissing(input.to_path_buf()));
        }
        let start = Instant::now();
        let lengths = fasta::collect_lengths(input)?;
        sink.event(ProgressEvent {
            message: format!("read {} contigs from {}", lengths.len(), input.display()),
            elapsed: Some(start.elapsed()),
        });
        info!(input = %input.display(), contigs = lengths.len(), "computing assembly statistics");
        Ok(StatsOutcome::from_lengths(&lengths))
    }

    pub fn triage(
        &self,
        input: &Path,
        options: &TriageOptions,
        sink: &dyn ProgressSink,
    ) -> Result<TriageResult, TriageError> {
        if !input.exists() {
            return Err(TriageError::InputMissing(input.to_path_buf()));
        }
        if !options.database.exists() {
            return Err(TriageError::DatabaseMissing(options.database.clone()));
        }

        let mut settings = ClassifierSettings {
            database: options.database.display().to_string(),
            threads: options.threads,
            confidence: options.confidence,
            version: self.classifier.tool_version(),
            skipped: false,
        };

        if !fasta::has_records(input)? {
            info!(input = %input.display(), "no contigs in input, skipping classification");
            sink.event(ProgressEvent {
                message: "no contigs found; writing empty kingdom files".to_string(),
                elapsed: None,
            });
            settings.skipped = true;
            let partition = write_kingdom_fastas(input, &KingdomMap::new(), &options.output_dir)?;
            let result = TriageResult::new(input, &partition, settings, None);
            write_summary_file(&options.output_dir, &result)?;
            return Ok(result);
        }

        sink.event(ProgressEvent {
            message: format!(
                "running Kraken2 with database {} (confidence {})",
                options.database.display(),
                options.confidence
            ),
            elapsed: None,
        });
        let start = Instant::now();
        let request = ClassifierRequest {
            input: input.to_path_buf(),
            database: options.database.clone(),
            threads: options.threads,
            confidence: options.confidence,
        };
        let classified = self.classifier.classify(&request)?;
        sink.event(ProgressEvent {
            message: "Kraken2 classification complete".to_string(),
            elapsed: Some(start.elapsed()),
        });

        let outcome = self.partition_classified(input, &classified, options, sink);
        if !options.keep_intermediates {
            if let Err(err) = classified.remove() {
                warn!(error = %err, "failed to remove kraken2 intermediates");
            }
        }
        let partition = outcome?;

        let intermediates = options.keep_intermediates.then_some(classified);
        let result = TriageResult::new(input, &partition, settings, intermediates);
        write_summary_file(&options.output_dir, &result)?;
        Ok(result)
    }

    fn partition_classified(
        &self,
        input: &Path,
        classified: &ClassifierOutput,
        options: &TriageOptions,
        sink: &dyn ProgressSink,
    ) -> Result<PartitionOutput, TriageError> {
        sink.event(ProgressEvent {
            message: "parsing Kraken2 results".to_string(),
            elapsed: None,
        });
        let kingdoms = read_classifier_output(&classified.output)?;

        sink.event(ProgressEvent {
            message: "writing kingdom-specific FASTA files".to_string(),
            elapsed: None,
        });
        let start = Instant::now();
        let partition = write_kingdom_fastas(input, &kingdoms, &options.output_dir)?;
        sink.event(ProgressEvent {
            message: format!(
                "wrote {} contigs to {}",
                partition.summary.total_contigs(),
                partition.output_dir
            ),
            elapsed: Some(start.elapsed()),
        });
        Ok(partition)
    }
}

fn write_summary_file(output_dir: &Utf8Path, result: &TriageResult) -> Result<(), TriageError> {
    let path = output_dir.join(SUMMARY_FILE_NAME);
    let tmp_path: PathBuf = path.with_extension("json.tmp").into();
    let content = serde_json::to_vec_pretty(result)
        .map_err(|err| TriageError::Filesystem(err.to_string()))?;
    fs::write(&tmp_path, &content).map_err(|err| TriageError::Filesystem(err.to_string()))?;
    fs::rename(&tmp_path, path.as_std_path())
        .map_err(|err| TriageError::Filesystem(err.to_string()))?;
    Ok(())
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
