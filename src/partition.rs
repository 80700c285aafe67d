use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use bio::io::fasta;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::KingdomMap;
use crate::domain::Kingdom;
use crate::error::TriageError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KingdomBucketStats {
    pub count: u64,
    pub total_bp: u64,
    pub lengths: Vec<u64>,
}

impl KingdomBucketStats {
    fn record(&mut self, length: u64) {
        self.count += 1;
        self.total_bp += length;
        self.lengths.push(length);
    }

    pub fn average_length(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total_bp as f64 / self.count as f64)
    }

    pub fn max_length(&self) -> Option<u64> {
        self.lengths.iter().copied().max()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageSummary {
    buckets: [KingdomBucketStats; Kingdom::COUNT],
}

impl TriageSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kingdom: Kingdom, length: u64) {
        self.buckets[kingdom.index()].record(length);
    }

    pub fn bucket(&self, kingdom: Kingdom) -> &KingdomBucketStats {
        &self.buckets[kingdom.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Kingdom, &KingdomBucketStats)> {
        Kingdom::ALL.into_iter().zip(self.buckets.iter())
    }

    pub fn total_contigs(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }

    pub fn total_bp(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.total_bp).sum()
    }
}

pub struct KingdomWriters<W: Write> {
    writers: [fasta::Writer<W>; Kingdom::COUNT],
}

impl<W: Write> KingdomWriters<W> {
    pub fn open_with<F>(mut open: F) -> Result<Self, TriageError>
    where
        F: FnMut(Kingdom) -> io::Result<W>,
    {
        let mut writers = Vec::with_capacity(Kingdom::COUNT);
        for kingdom in Kingdom::ALL {
            let sink = open(kingdom).map_err(|err| {
                TriageError::Filesystem(format!("open {} output: {err}", kingdom.file_name()))
            })?;
            writers.push(fasta::Writer::new(sink));
        }
        let writers = writers
            .try_into()
            .map_err(|_| TriageError::Filesystem("kingdom writer table incomplete".to_string()))?;
        Ok(Self { writers })
    }

    pub fn write(&mut self, kingdom: Kingdom, record: &fasta::Record) -> Result<(), TriageError> {
        self.writers[kingdom.index()]
            .write_record(record)
            .map_err(|err| {
                TriageError::Filesystem(format!("write {}: {err}", kingdom.file_name()))
            })
    }

    /// Flushes every writer; the first failure is reported after all were tried.
    pub fn finish(mut self) -> Result<(), TriageError> {
        let mut first_error = None;
        for (kingdom, writer) in Kingdom::ALL.into_iter().zip(self.writers.iter_mut()) {
            if let Err(err) = writer.flush() {
                first_error.get_or_insert_with(|| {
                    TriageError::Filesystem(format!("flush {}: {err}", kingdom.file_name()))
                });
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl KingdomWriters<File> {
    pub fn create_in(dir: &Path) -> Result<Self, TriageError> {
        Self::open_with(|kingdom| File::create(dir.join(kingdom.file_name())))
    }
}

pub fn partition_records<I, W>(
    records: I,
    kingdoms: &KingdomMap,
    writers: &mut KingdomWriters<W>,
) -> Result<TriageSummary, TriageError>
where
    I: IntoIterator<Item = Result<fasta::Record, TriageError>>,
    W: Write,
{
    let mut summary = TriageSummary::new();
    for record in records {
        let record = record?;
        let kingdom = kingdoms.kingdom_of(record.id());
        writers.write(kingdom, &record)?;
        summary.record(kingdom, record.seq().len() as u64);
    }
    Ok(summary)
}

#[derive(Debug, Clone)]
pub struct PartitionOutput {
    pub output_dir: Utf8PathBuf,
    pub summary: TriageSummary,
}

impl PartitionOutput {
    pub fn file_path(&self, kingdom: Kingdom) -> Utf8PathBuf {
        self.output_dir.join(kingdom.file_name())
    }
}

/// Partitions `input` into seven FASTA files under `output_dir`.
///
/// Files are written into a staging directory inside `output_dir` and only
/// moved into place once every writer has been flushed, so a failed pass
/// leaves previously existing outputs untouched.
pub fn write_kingdom_fastas(
    input: &Path,
    kingdoms: &KingdomMap,
    output_dir: &Utf8Path,
) -> Result<PartitionOutput, TriageError> {
    fs::create_dir_all(output_dir.as_std_path())
        .map_err(|err| TriageError::Filesystem(format!("create {output_dir}: {err}")))?;
    let staging = tempfile::Builder::new()
        .prefix(".contig-triage")
        .tempdir_in(output_dir.as_std_path())
        .map_err(|err| TriageError::Filesystem(err.to_string()))?;

    info!(input = %input.display(), output_dir = %output_dir, "writing kingdom FASTA files");
    let reader = crate::fasta::open_reader(input)?;
    let records = reader.records().map(|record| {
        record.map_err(|err| TriageError::FastaRead {
            path: input.to_path_buf(),
            message: err.to_string(),
        })
    });

    let mut writers = KingdomWriters::create_in(staging.path())?;
    let summary = partition_records(records, kingdoms, &mut writers)?;
    writers.finish()?;

    for kingdom in Kingdom::ALL {
        let from = staging.path().join(kingdom.file_name());
        let to = output_dir.join(kingdom.file_name());
        fs::rename(&from, to.as_std_path())
            .map_err(|err| TriageError::Filesystem(format!("move {to}: {err}")))?;
    }
    debug!(
        contigs = summary.total_contigs(),
        total_bp = summary.total_bp(),
        "partition complete"
    );

    Ok(PartitionOutput {
        output_dir: output_dir.to_path_buf(),
        summary,
    })
}
