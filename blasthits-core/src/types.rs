use std::fmt;

/// Program used when none is given.
pub const DEFAULT_PROGRAM: &str = "blastn";
/// Database searched when none is given.
pub const DEFAULT_DATABASE: &str = "nr";
/// Query submitted when no sequence is given.
pub const DEFAULT_SEQUENCE: &str = "ATGTGGGTGATAGGATGGGTCGACTGACTAGCATCGATCGACTAGCTAGCATCGATC";

/// One search to run against the remote alignment service.
///
/// None of the fields are checked locally. The service decides whether the
/// program and database names are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRequest {
    pub sequence: String,
    pub program: String,
    pub database: String,
}

impl AlignmentRequest {
    pub fn new<S, P, D>(sequence: S, program: P, database: D) -> Self
    where
        S: Into<String>,
        P: Into<String>,
        D: Into<String>,
    {
        Self {
            sequence: sequence.into(),
            program: program.into(),
            database: database.into(),
        }
    }

    pub fn sequence_len(&self) -> usize {
        self.sequence.len()
    }
}

impl Default for AlignmentRequest {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE, DEFAULT_PROGRAM, DEFAULT_DATABASE)
    }
}

impl fmt::Display for AlignmentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} ({} bp)",
            self.program,
            self.database,
            self.sequence_len()
        )
    }
}

/// Handle returned by the service once a search has been queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId {
    pub rid: String,
    /// Estimated seconds until the search completes (RTOE)
    pub estimated_seconds: Option<u64>,
}

/// Descriptive fields of one hit record; anything the document omits is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HitSummary {
    /// 1-based position of the record inside the hits container
    pub position: usize,
    pub num: Option<u32>,
    pub id: Option<String>,
    pub accession: Option<String>,
    pub definition: Option<String>,
    pub length: Option<u64>,
}

impl fmt::Display for HitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accession = self.accession.as_deref().or(self.id.as_deref()).unwrap_or("-");
        write!(f, "{}\t{}", self.position, accession)?;
        if let Some(length) = self.length {
            write!(f, "\t{}", length)?;
        } else {
            write!(f, "\t-")?;
        }
        write!(f, "\t{}", self.definition.as_deref().unwrap_or("-"))
    }
}

/// A query sequence loaded from a FASTA/FASTQ file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySequence {
    pub id: String,
    pub sequence: String,
}
