use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bio::io::fasta;
use flate2::read::MultiGzDecoder;

use crate::error::TriageError;

pub type FastaReader = fasta::Reader<BufReader<Box<dyn Read>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceLength {
    pub id: String,
    pub length: u64,
}

pub fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

pub fn open_reader(path: &Path) -> Result<FastaReader, TriageError> {
    if !path.exists() {
        return Err(TriageError::InputMissing(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|err| read_error(path, err))?;
    let inner: Box<dyn Read> = if is_gzipped(path) {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(fasta::Reader::new(inner))
}

pub fn for_each_record<F>(path: &Path, mut visit: F) -> Result<usize, TriageError>
where
    F: FnMut(&fasta::Record) -> Result<(), TriageError>,
{
    let reader = open_reader(path)?;
    let mut seen = 0usize;
    for record in reader.records() {
        let record = record.map_err(|err| read_error(path, err))?;
        visit(&record)?;
        seen += 1;
    }
    Ok(seen)
}

pub fn collect_sequence_lengths(path: &Path) -> Result<Vec<SequenceLength>, TriageError> {
    let mut lengths = Vec::new();
    for_each_record(path, |record| {
        lengths.push(SequenceLength {
            id: record.id().to_string(),
            length: record.seq().len() as u64,
        });
        Ok(())
    })?;
    Ok(lengths)
}

pub fn collect_lengths(path: &Path) -> Result<Vec<u64>, TriageError> {
    Ok(collect_sequence_lengths(path)?
        .into_iter()
        .map(|entry| entry.length)
        .collect())
}

pub fn has_records(path: &Path) -> Result<bool, TriageError> {
    let reader = open_reader(path)?;
    match reader.records().next() {
        Some(Ok(_)) => Ok(true),
        Some(Err(err)) => Err(read_error(path, err)),
        None => Ok(false),
    }
}

fn read_error(path: &Path, err: std::io::Error) -> TriageError {
    TriageError::FastaRead {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
