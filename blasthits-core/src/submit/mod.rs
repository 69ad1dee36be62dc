//! Query submission for blasthits
//!
//! A [`Submitter`] sends one [`AlignmentRequest`] to a remote alignment service
//! and hands back the raw result document. The only network implementation is
//! [`qblast::QblastClient`]; tests substitute their own submitters.

pub use crate::types::{AlignmentRequest, RequestId};

pub mod qblast;

pub use qblast::{QblastClient, QblastOptions};

/// Result type for submission operations
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Errors that can occur while talking to the alignment service
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Request rejected by service: {0}")]
    Rejected(String),

    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    #[error("Search {rid} failed on the service")]
    SearchFailed { rid: String },

    #[error("Search {rid} is unknown to the service (expired or never queued)")]
    Expired { rid: String },

    #[error("Invalid client options: {0}")]
    InvalidOptions(String),

    #[error("Search {rid} still running after {polls} polls")]
    PollLimit { rid: String, polls: u32 },
}

/// Trait for remote alignment services
pub trait Submitter {
    /// Run the search and return the full response body, unmodified
    fn submit(&self, request: &AlignmentRequest) -> SubmitResult<String>;

    /// Get the name/identifier of this service
    fn name(&self) -> &'static str;
}

impl<S: Submitter + ?Sized> Submitter for &S {
    fn submit(&self, request: &AlignmentRequest) -> SubmitResult<String> {
        (**self).submit(request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<S: Submitter + ?Sized> Submitter for Box<S> {
    fn submit(&self, request: &AlignmentRequest) -> SubmitResult<String> {
        (**self).submit(request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
