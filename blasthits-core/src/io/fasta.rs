//! FASTA/FASTQ query loading
//!
//! Reads the query for a search from a sequence file using the needletail
//! library. Gzip-compressed input is detected automatically.

use std::path::Path;
use thiserror::Error;

use needletail::errors::ParseErrorKind;
use needletail::parse_fastx_file;
use crate::types::QuerySequence;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },
    #[error("Empty file or no sequences found: {0}")]
    EmptyFile(String),
}

pub type FastaResult<T> = Result<T, FastaError>;

/// Read the first record of a FASTA/FASTQ file
pub fn read_first_sequence<P: AsRef<Path>>(path: P) -> FastaResult<QuerySequence> {
    let display = path.as_ref().display().to_string();
    let parse_error = |message: String| FastaError::Parse {
        path: display.clone(),
        message,
    };

    let mut reader = parse_fastx_file(&path).map_err(|e| match e.kind {
        ParseErrorKind::EmptyFile => FastaError::EmptyFile(display.clone()),
        _ => parse_error(e.to_string()),
    })?;

    let record = match reader.next() {
        Some(record) => record.map_err(|e| parse_error(e.to_string()))?,
        None => return Err(FastaError::EmptyFile(display.clone())),
    };

    let id = String::from_utf8_lossy(record.id()).to_string();
    let sequence = String::from_utf8_lossy(&record.seq()).to_string();
    if sequence.is_empty() {
        return Err(parse_error(format!("record {} has no sequence", id)));
    }

    log::debug!("Loaded query {} ({} bp) from {}", id, sequence.len(), display);
    Ok(QuerySequence { id, sequence })
}
