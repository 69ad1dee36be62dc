//! blasthits core library
//!
//! Remote BLAST submission, hit counting over the XML report, and query loading.

pub mod types;
pub mod submit;
pub mod hits;
pub mod io;
pub mod search;

// Re-export commonly used types and functions
pub use types::{AlignmentRequest, HitSummary, QuerySequence, RequestId};
pub use submit::{QblastClient, QblastOptions, SubmitError, SubmitResult, Submitter};
pub use hits::{count_hits, HitCounter, HitsError, HitsResult, HITS_CONTAINER};
pub use search::{search_and_count, SearchError, SearchOutcome};

/// Version information for the blasthits core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
