//! Submit-then-count in one call

use thiserror::Error;

use crate::hits::{HitCounter, HitsError};
use crate::submit::{SubmitError, Submitter};
use crate::types::AlignmentRequest;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Hits(#[from] HitsError),
}

/// Raw report and its hit count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub xml: String,
    pub hits: usize,
}

/// Run `request` through `submitter` and count the hits in the report
pub fn search_and_count<S: Submitter + ?Sized>(
    submitter: &S,
    request: &AlignmentRequest,
    counter: &HitCounter,
) -> Result<SearchOutcome, SearchError> {
    log::debug!("Running {} search: {}", submitter.name(), request);
    let xml = submitter.submit(request)?;
    let hits = counter.count(&xml)?;
    Ok(SearchOutcome { xml, hits })
}
