//! exact-json CLI.
//!
//! Checks documents, inspects numeric literals and runs the conformance
//! tooling. Results go to stdout as JSON, diagnostics to stderr.

use clap::{Parser, Subcommand};
use exact_json::conformance::{CorpusRunner, DiffTestHarness};
use exact_json::number::{decode_float, exact_decimal, ExactDecimal};
use exact_json::{parse_bytes_with_limits, stringify_with_limits, Error, Limits, Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "EXACT_JSON_LOG";

#[derive(Parser)]
#[command(name = "exact-json")]
#[command(about = "Lossless JSON: exact binary64 numbers, strict grammar", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON file overriding resource limits (missing fields keep defaults)
    #[arg(long, global = true, value_name = "FILE", conflicts_with = "lenient")]
    limits: Option<PathBuf>,

    /// Use the lenient resource limits
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and print its canonical encoding
    Check {
        /// Input file (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Show the binary64 value nearest to a decimal literal
    Decode {
        /// Decimal literal, e.g. 0.1 or -2.5e-3
        #[arg(allow_hyphen_values = true)]
        literal: String,
    },

    /// Run a conformance corpus
    Corpus {
        /// Corpus JSON file
        file: PathBuf,
    },

    /// Compare against serde_json on every *.json file in a directory
    Diff {
        /// Directory of documents
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let limits = match resolve_limits(&cli) {
        Ok(limits) => limits,
        Err(message) => {
            eprintln!("error: {}", message);
            return ExitCode::from(2);
        }
    };
    tracing::debug!(?limits, "resolved limits");

    let outcome = match &cli.command {
        Commands::Check { file } => check(file.as_deref(), limits),
        Commands::Decode { literal } => Ok(decode(literal, limits)),
        Commands::Corpus { file } => corpus(file, limits),
        Commands::Diff { dir } => diff(dir, limits),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_limits(cli: &Cli) -> Result<Limits, String> {
    if cli.lenient {
        return Ok(Limits::lenient());
    }
    match &cli.limits {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("invalid limits file {}: {}", path.display(), e))
        }
        None => Ok(Limits::default()),
    }
}

/// Parse the document and print `{"ok":...}` or `{"err":...}`.
fn check(file: Option<&Path>, limits: Limits) -> Result<bool, String> {
    let bytes = match file {
        Some(path) => {
            std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| format!("cannot read stdin: {}", e))?;
            buf
        }
    };

    let encoded = parse_bytes_with_limits(&bytes, limits)
        .and_then(|value| stringify_with_limits(&value, limits));
    match encoded {
        Ok(text) => {
            println!("{{\"ok\":{}}}", text);
            Ok(true)
        }
        Err(e) => {
            println!("{}", error_json(&e, limits));
            Ok(false)
        }
    }
}

/// Print the fields and exact value of the binary64 nearest to `literal`.
fn decode(literal: &str, limits: Limits) -> bool {
    match decode_literal(literal) {
        Ok(value) => match stringify_with_limits(&value, limits) {
            Ok(text) => {
                println!("{}", text);
                true
            }
            Err(e) => {
                println!("{}", error_json(&e, limits));
                false
            }
        },
        Err(e) => {
            println!("{}", error_json(&e, limits));
            false
        }
    }
}

fn decode_literal(literal: &str) -> exact_json::Result<Value> {
    let nearest = literal.parse::<ExactDecimal>()?.to_f64()?;
    if !nearest.is_finite() {
        return Err(Error::NumberOutOfRange {
            literal: literal.to_string(),
        });
    }
    let fields = decode_float(nearest)?;
    let exact = if nearest == 0.0 && nearest.is_sign_negative() {
        "-0".to_string()
    } else {
        exact_decimal(nearest)?.to_fixed()
    };

    let mut map = Map::new();
    map.insert("sign".to_string(), Value::Number(fields.sign.into()));
    map.insert("exponent".to_string(), Value::Number(fields.exponent.into()));
    // The fraction field has 52 bits, so it is an exact binary64 integer.
    map.insert(
        "mantissa".to_string(),
        Value::try_from(fields.mantissa as f64)?,
    );
    map.insert("exact".to_string(), Value::String(exact));
    Ok(Value::Object(map))
}

fn corpus(file: &Path, limits: Limits) -> Result<bool, String> {
    let runner = CorpusRunner::load(file)
        .map_err(|e| e.to_string())?
        .with_limits(limits);
    tracing::info!(
        version = %runner.manifest().version,
        vectors = runner.vector_count(),
        "running corpus"
    );

    let results = runner.run_all();
    for (id, result) in &results.problems {
        println!("{} {}: {}", result.label(), id, result);
    }
    println!("{}", results.summary());
    Ok(results.all_passed())
}

fn diff(dir: &Path, limits: Limits) -> Result<bool, String> {
    let results = DiffTestHarness::new(limits)
        .run_dir(dir)
        .map_err(|e| e.to_string())?;
    for failure in &results.failures {
        println!(
            "MISMATCH {}: exact-json {:?}, serde_json {:?}",
            failure.name, failure.ours, failure.reference
        );
    }
    println!("{}", results.summary());
    Ok(results.all_passed())
}

fn error_json(error: &Error, limits: Limits) -> String {
    let mut detail = Map::new();
    detail.insert("kind".to_string(), Value::from(error.kind().name()));
    detail.insert("message".to_string(), Value::String(error.to_string()));
    let mut map = Map::new();
    map.insert("err".to_string(), Value::Object(detail));
    stringify_with_limits(&Value::Object(map), limits)
        .unwrap_or_else(|_| format!("{{\"err\":{{\"kind\":\"{}\"}}}}", error.kind().name()))
}
