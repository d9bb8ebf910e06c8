//! kflux CLI - Command-line interface for Keystroke Flux
//!
//! Commands:
//! - analyze: Run the full typing analysis over an event file
//! - validate: Check events against the keystroke event schema
//! - config: Print the effective analysis configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use keystroke_flux::schema::{self, ValidationReport};
use keystroke_flux::{AnalysisConfig, AnalysisError, AnalysisOutcome, TypingAnalyzer, ENGINE_VERSION};

/// kflux - Typing behavior analytics from keystroke event streams
#[derive(Parser)]
#[command(name = "kflux")]
#[command(author = "Synheart AI Inc")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Analyze keystroke event streams", long_about = None)]
struct Cli {
    /// Log pipeline progress to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and print the report
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Analysis configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Validate events against the keystroke event schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Configuration file to merge over the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of events
    Json,
    /// Newline-delimited JSON (one event per line)
    Ndjson,
}

impl From<InputFormat> for schema::InputFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Json => schema::InputFormat::Json,
            InputFormat::Ndjson => schema::InputFormat::Ndjson,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("keystroke_flux=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), KfluxCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            config,
            pretty,
        } => cmd_analyze(&input, &output, input_format, config.as_deref(), pretty),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Config { config } => cmd_config(config.as_deref()),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    config: Option<&Path>,
    pretty: bool,
) -> Result<(), KfluxCliError> {
    let config = load_config(config)?;
    let events = schema::parse_events(&read_input(input)?, input_format.into())?;
    schema::validate_events(&events)?;

    let outcome = TypingAnalyzer::new(config).analyze(&events);
    if let AnalysisOutcome::Empty = outcome {
        tracing::warn!("input contained no events");
    }

    let mut output_data = if pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    output_data.push('\n');

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), KfluxCliError> {
    let events = schema::parse_events(&read_input(input)?, input_format.into())?;
    let report = ValidationReport::for_events(&events);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Schema:         {}", report.schema_version);
        println!("Total events:   {}", report.event_count);
        println!("Issues:         {}", report.issues.len());

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                println!("  - index {}: {}", issue.index, issue.message);
            }
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(KfluxCliError::ValidationFailed(report.issues.len()))
    }
}

fn cmd_config(config: Option<&Path>) -> Result<(), KfluxCliError> {
    let config = load_config(config)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, KfluxCliError> {
    match path {
        Some(path) => Ok(AnalysisConfig::load(path)?),
        None => Ok(AnalysisConfig::default()),
    }
}

fn read_input(input: &Path) -> Result<String, KfluxCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

#[derive(Debug)]
enum KfluxCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for KfluxCliError {
    fn from(e: io::Error) -> Self {
        KfluxCliError::Io(e)
    }
}

impl From<AnalysisError> for KfluxCliError {
    fn from(e: AnalysisError) -> Self {
        KfluxCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for KfluxCliError {
    fn from(e: serde_json::Error) -> Self {
        KfluxCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<KfluxCliError> for CliError {
    fn from(e: KfluxCliError) -> Self {
        match e {
            KfluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            KfluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            KfluxCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} validation issues found", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            KfluxCliError::Analysis(e) => {
                let (code, hint) = match &e {
                    AnalysisError::ParseError(_) | AnalysisError::JsonError(_) => (
                        "PARSE_ERROR",
                        format!("Ensure input matches the {} schema", schema::SCHEMA_VERSION),
                    ),
                    AnalysisError::InvalidEvent { .. } => (
                        "INVALID_EVENT",
                        "Run 'kflux validate' for details".to_string(),
                    ),
                    AnalysisError::InvalidConfig(_)
                    | AnalysisError::InvalidTimezone(_)
                    | AnalysisError::ConfigIo(_) => (
                        "CONFIG_ERROR",
                        "Run 'kflux config' to see the expected keys".to_string(),
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint),
                }
            }
        }
    }
}
