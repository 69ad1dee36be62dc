use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};

use blasthits_core::io::read_first_sequence;
use blasthits_core::{AlignmentRequest, HitCounter, QblastClient, Submitter};

mod config;
mod error;

use config::Config;
use error::CliError;

#[derive(Parser, Debug)]
#[command(name = "blasthits")]
#[command(about = "Run a remote NCBI BLAST search and count the hits")]
#[command(version)]
#[command(long_about = "
Submits a nucleotide query to the NCBI BLAST service, waits for the XML report
and prints the number of hits. Without arguments the built-in query is searched
with blastn against nr.

Examples:
  blasthits
  blasthits --sequence ACGTTGCA... --database nt
  blasthits --fasta query.fa --save-xml report.xml --list
  blasthits --xml report.xml
")]
pub struct Cli {
    /// Query sequence
    #[arg(short, long, conflicts_with = "fasta")]
    pub sequence: Option<String>,

    /// Read the query from the first record of a FASTA/FASTQ file
    #[arg(short, long)]
    pub fasta: Option<PathBuf>,

    /// BLAST program (blastn, blastp, blastx, tblastn, tblastx)
    #[arg(short, long)]
    pub program: Option<String>,

    /// Database to search (nr, nt, refseq_rna, ...)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Count hits in an existing XML report instead of running a search
    #[arg(long, conflicts_with_all = ["sequence", "fasta", "save_xml", "program", "database"])]
    pub xml: Option<PathBuf>,

    /// Write the report received from the service to this file
    #[arg(long)]
    pub save_xml: Option<PathBuf>,

    /// Print one line per hit (position, accession, length, definition) after the count
    #[arg(long)]
    pub list: bool,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Write the effective configuration to a TOML file and exit
    #[arg(long)]
    pub init_config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long)]
    pub quiet: bool,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli, &mut io::stdout().lock()) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => error::print_error_and_exit(cli_err),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    if cli.print_config {
        write!(out, "{}", config.to_toml()?)?;
        return Ok(());
    }
    if let Some(path) = &cli.init_config {
        config.save_to_file(path)?;
        log::info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let counter = HitCounter::new().missing_as_zero(config.hits.missing_as_zero);

    let xml = match &cli.xml {
        Some(path) => read_report(path)?,
        None => {
            let request = build_request(&cli, &config)?;
            let client = QblastClient::with_options(config.qblast.clone())
                .map_err(CliError::from)?;
            let xml = client.submit(&request).map_err(CliError::from)?;

            if let Some(path) = &cli.save_xml {
                fs::write(path, &xml)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                log::info!("Saved report to {}", path.display());
            }
            xml
        }
    };

    let hits = counter.count(&xml).map_err(CliError::from)?;
    writeln!(out, "Number of hits: {}", hits)?;

    if cli.list {
        for summary in counter.summarize(&xml).map_err(CliError::from)? {
            writeln!(out, "{}", summary)?;
        }
    }

    Ok(())
}

/// Resolve the request from flags, falling back to the configured query
fn build_request(cli: &Cli, config: &Config) -> Result<AlignmentRequest> {
    let sequence = match (&cli.sequence, &cli.fasta) {
        (Some(sequence), _) => sequence.clone(),
        (None, Some(path)) => {
            if !path.exists() {
                return Err(CliError::file_not_found(path.clone()).into());
            }
            let query = read_first_sequence(path)
                .with_context(|| format!("Failed to load query from {}", path.display()))?;
            log::info!("Using query {} from {}", query.id, path.display());
            query.sequence
        }
        (None, None) => config.query.sequence.clone(),
    };

    let program = cli.program.clone().unwrap_or_else(|| config.query.program.clone());
    let database = cli.database.clone().unwrap_or_else(|| config.query.database.clone());

    Ok(AlignmentRequest::new(sequence, program, database))
}

fn read_report(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    log::info!("Counting hits in {}", path.display());
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))
}
