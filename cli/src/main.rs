//! Tessera command-line front end.
//!
//! Verifies, assesses, and exports modeling-session logs, and seals or opens
//! session metadata.
//!
//! Usage:
//!   tessera verify session.json --secret <teacher-secret> --student <id>
//!   tessera analyze session.json --secret <s> --student <id> --thresholds t.toml
//!   tessera health session.json --secret <s> --student <id>
//!   tessera export-csv session.json
//!   tessera export-structured session.json
//!   tessera seal metadata.json --key <secret> --student <id>
//!   tessera open token.txt --key <secret> --student <id>

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tessera_analysis::{export, SessionAnalyzer, Thresholds};
use tessera_chain::{first_broken_link, SessionLog};
use tessera_contracts::{
    credentials::Credentials,
    error::{TesseraError, TesseraResult},
    integrity::IntegrityStatus,
};
use tessera_seal::{open_metadata, seal_metadata, student_salt, ChaChaMetadataCipher};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Tessera: integrity and authenticity checks for 3D-modeling session logs.
#[derive(Parser)]
#[command(
    name = "tessera",
    about = "Verify and assess hash-chained modeling session logs",
    long_about = "Verifies the genesis-anchored hash chain of a captured modeling session,\n\
                  scores its authenticity, and exports it as JSON or CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the hash chain and print the integrity status.
    Verify(SessionArgs),
    /// Print the full session report as JSON.
    Analyze(SessionArgs),
    /// Print the health verdict and its reasons.
    Health(SessionArgs),
    /// Print every record as CSV.
    ExportCsv(SessionArgs),
    /// Print every record in structured JSON form.
    ExportStructured(SessionArgs),
    /// Seal a JSON metadata file and print the token.
    Seal(SealArgs),
    /// Open a sealed token file and print the JSON metadata.
    Open(SealArgs),
}

#[derive(Args)]
struct SessionArgs {
    /// Session JSON: a raw export or a session document.
    file: PathBuf,

    /// Teacher secret the genesis record was derived from.
    #[arg(long)]
    secret: Option<String>,

    /// Student id the genesis record was derived from.
    #[arg(long)]
    student: Option<String>,

    /// TOML file overriding the analyzer thresholds.
    #[arg(long)]
    thresholds: Option<PathBuf>,
}

#[derive(Args)]
struct SealArgs {
    /// Input file: JSON to seal, or a token to open.
    file: PathBuf,

    /// Password the key is derived from.
    #[arg(long)]
    key: String,

    /// Student id, used as the salt.
    #[arg(long)]
    student: String,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Verify(args) => run_verify(&args),
        Command::Analyze(args) => run_analyze(&args),
        Command::Health(args) => run_health(&args),
        Command::ExportCsv(args) => run_export_csv(&args),
        Command::ExportStructured(args) => run_export_structured(&args),
        Command::Seal(args) => run_seal(&args),
        Command::Open(args) => run_open(&args),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("tessera error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Session commands ──────────────────────────────────────────────────────────
//
// Each command returns `Ok(false)` when it ran but the session failed the
// check it reports on.

fn run_verify(args: &SessionArgs) -> TesseraResult<bool> {
    let log = load_session(args)?;
    let status = log.integrity();
    println!("{}: {}", log.id(), status);

    if status == IntegrityStatus::Invalid {
        if let Some(genesis) = log.expected_genesis_hash() {
            if let Some(index) = first_broken_link(&log.to_wire(), &genesis) {
                println!("first broken link at record {index}");
            }
        }
    }
    Ok(status.is_valid())
}

fn run_analyze(args: &SessionArgs) -> TesseraResult<bool> {
    let log = load_session(args)?;
    let analyzer = SessionAnalyzer::with_thresholds(&log, load_thresholds(args)?);
    let report = analyzer.report();
    println!("{}", export::to_json(&report)?);
    Ok(true)
}

fn run_health(args: &SessionArgs) -> TesseraResult<bool> {
    let log = load_session(args)?;
    let analyzer = SessionAnalyzer::with_thresholds(&log, load_thresholds(args)?);
    let health = analyzer.health();

    println!("{}: {}", log.id(), health.status);
    for reason in &health.reasons {
        println!("  - {}", reason);
    }
    println!(
        "score {} / 100: {}",
        analyzer.authenticity_score(),
        analyzer.assessment_verdict()
    );
    Ok(true)
}

fn run_export_csv(args: &SessionArgs) -> TesseraResult<bool> {
    let log = load_session(args)?;
    let analyzer = SessionAnalyzer::with_thresholds(&log, load_thresholds(args)?);
    println!("{}", export::to_csv(&analyzer));
    Ok(true)
}

fn run_export_structured(args: &SessionArgs) -> TesseraResult<bool> {
    let log = load_session(args)?;
    println!("{}", export::to_json(&log.to_structured())?);
    Ok(true)
}

fn load_session(args: &SessionArgs) -> TesseraResult<SessionLog> {
    let json = read_file(&args.file)?;
    let mut log = SessionLog::from_json(&json)?;

    if let Some(creds) = Credentials::from_parts(args.secret.clone(), args.student.clone()) {
        log.set_credentials(creds);
    }
    debug!(
        session_id = %log.id(),
        records = log.record_count(),
        has_credentials = log.credentials().is_some(),
        "session loaded"
    );
    Ok(log)
}

fn load_thresholds(args: &SessionArgs) -> TesseraResult<Thresholds> {
    match &args.thresholds {
        Some(path) => Thresholds::from_file(path),
        None => Ok(Thresholds::default()),
    }
}

// ── Metadata commands ─────────────────────────────────────────────────────────

fn run_seal(args: &SealArgs) -> TesseraResult<bool> {
    let json = read_file(&args.file)?;
    let metadata: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| TesseraError::PayloadInvalid {
            reason: format!("metadata file is not valid JSON: {}", e),
        })?;

    let token = seal_metadata(
        &ChaChaMetadataCipher::new(),
        &metadata,
        &args.key,
        &student_salt(&args.student),
    )?;
    println!("{}", token);
    Ok(true)
}

fn run_open(args: &SealArgs) -> TesseraResult<bool> {
    let token = read_file(&args.file)?;
    let metadata = open_metadata(
        &ChaChaMetadataCipher::new(),
        &token,
        &args.key,
        &student_salt(&args.student),
    )?;
    println!("{}", export::to_json(&metadata)?);
    Ok(true)
}

fn read_file(path: &Path) -> TesseraResult<String> {
    std::fs::read_to_string(path).map_err(|e| TesseraError::PayloadInvalid {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })
}
