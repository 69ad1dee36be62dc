//! Error handling for the blasthits CLI

use thiserror::Error;
use std::path::PathBuf;

use blasthits_core::{HitsError, SubmitError};

/// Main error type for blasthits CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Alignment service error: {0}")]
    Service(SubmitError),

    #[error("Report error: {0}")]
    Report(HitsError),
}

impl CliError {
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }
}

impl From<SubmitError> for CliError {
    fn from(err: SubmitError) -> Self {
        Self::Service(err)
    }
}

impl From<HitsError> for CliError {
    fn from(err: HitsError) -> Self {
        Self::Report(err)
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::Service(SubmitError::Rejected(_)) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check the program name (blastn, blastp, blastx, tblastn, tblastx)\n\
                 • Check that the database exists for the chosen program (e.g. nr, nt)\n\
                 • Check that the query only contains sequence letters"
            );
        }

        CliError::Service(SubmitError::Transport(_)) | CliError::Service(SubmitError::Http { .. }) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your network connection\n\
                 • Check the endpoint in the [qblast] section of blasthits.toml\n\
                 • The NCBI service may be busy; try again later"
            );
        }

        CliError::Service(SubmitError::Expired { .. }) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • NCBI keeps results for about 24 hours; submit the search again"
            );
        }

        CliError::Service(SubmitError::InvalidOptions(_)) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check the [qblast] section of blasthits.toml (see --print-config)"
            );
        }

        CliError::Report(HitsError::ContainerNotFound { .. }) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • The report may not be BLAST XML; inspect it with --save-xml\n\
                 • Set missing_as_zero = true under [hits] to treat this as zero hits"
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::file_not_found(PathBuf::from("report.xml"));
        assert!(matches!(err, CliError::FileNotFound { .. }));
        assert_eq!(err.to_string(), "File not found: report.xml");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("query.fa"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_rejection_suggestions() {
        let err: CliError = SubmitError::Rejected("Database xx not found".to_string()).into();
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.starts_with("Alignment service error: Request rejected by service: Database xx not found"));
        assert!(formatted.contains("Check the program name"));
    }

    #[test]
    fn test_missing_container_suggestions() {
        let err: CliError = HitsError::ContainerNotFound {
            tag: "Iteration_hits".to_string(),
        }
        .into();
        assert!(matches!(err, CliError::Report(HitsError::ContainerNotFound { .. })));
        assert!(format_error_with_suggestions(&err).contains("missing_as_zero"));
    }
}
