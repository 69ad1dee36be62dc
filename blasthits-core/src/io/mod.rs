//! Sequence input for blasthits

pub mod fasta;

pub use fasta::{read_first_sequence, FastaError, FastaResult};
