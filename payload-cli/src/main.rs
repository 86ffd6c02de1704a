//! Payload CLI - build a canonical payload from one JSON record
//!
//! This binary provides:
//! - build: read one record, apply a builder kind, print the payload
//! - kinds: list builder kinds and their defaults

mod logging;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use payload_core::config::{DEFAULT_METRIC_KEY, DEFAULT_READING_KEY, DEFAULT_TIME_FIELD};
use payload_core::{
    format, record, BuilderSpec, Config, PayloadError, PayloadKind, Record, TransformKind,
};
use serde_json::{json, Map, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "payload")]
#[command(about = "Build canonical payloads from flat key/value records")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a payload from a single JSON object
    ///
    /// Examples:
    ///   payload build reading.json --kind dynamic
    ///   echo '{"status":"temp","value":"72.5"}' | payload build --kind untimed-dynamic
    ///   payload build reading.json --config builder.toml --format kv
    Build(BuildArgs),
    /// List builder kinds and their defaults
    Kinds,
}

#[derive(Args)]
struct BuildArgs {
    /// Input file holding one JSON object (stdin when absent or "-")
    input: Option<PathBuf>,
    /// TOML builder configuration; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Builder kind (identity, dynamic, untimed-dynamic)
    #[arg(long)]
    kind: Option<PayloadKind>,
    /// Field to remove before reshaping (repeatable)
    #[arg(long = "pre-drop", value_name = "KEY")]
    pre_drop: Vec<String>,
    /// Field to remove after reshaping (repeatable)
    #[arg(long = "post-drop", value_name = "KEY")]
    post_drop: Vec<String>,
    /// Field whose value names the metric
    #[arg(long, value_name = "KEY")]
    metric_key: Option<String>,
    /// Field holding the raw reading
    #[arg(long, value_name = "KEY")]
    reading_key: Option<String>,
    /// Reading conversion (float, integer, boolean, string, identity)
    #[arg(long)]
    transform: Option<TransformKind>,
    /// Field removed by the untimed kind
    #[arg(long, value_name = "KEY")]
    time_field: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Write the payload to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Exit with status 2 when the reshape fell back to the filtered record
    #[arg(long)]
    strict: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Kv,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
    #[error("reshape fell back to the filtered record: {reason}")]
    Degraded { reason: String },
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Degraded { .. } => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging(cli.verbose) {
        eprintln!("Error: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Build(args) => handle_build(args),
        Commands::Kinds => handle_kinds(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

fn handle_build(args: BuildArgs) -> Result<(), CliError> {
    let spec = resolve_spec(&args)?;
    warn_unused_flags(&args, spec.kind());

    let record = read_record(args.input.as_deref())?;
    let builder = spec.build(record)?;

    let rendered = match args.format {
        OutputFormat::Json => builder.message_with(format::to_json)?,
        OutputFormat::Pretty => builder.message_with(format::to_json_pretty)?,
        OutputFormat::Kv => builder.message_with(format::to_key_value_line),
    };
    write_output(args.output.as_deref(), &rendered)?;

    info!(
        kind = %spec.kind(),
        fields = builder.message().len(),
        degraded = builder.is_degraded(),
        "payload written"
    );

    if args.strict {
        if let Some(err) = builder.outcome().error() {
            return Err(CliError::Degraded {
                reason: err.to_string(),
            });
        }
    }
    Ok(())
}

fn handle_kinds() -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for kind in PayloadKind::ALL {
        writeln!(out, "{:<16} {}", kind.name(), kind.description())?;
        match kind {
            PayloadKind::Identity => {}
            PayloadKind::Dynamic => {
                writeln!(out, "{:<16} {}", "", dynamic_defaults())?;
            }
            PayloadKind::UntimedDynamic => {
                writeln!(
                    out,
                    "{:<16} {} timeFieldName={}",
                    "",
                    dynamic_defaults(),
                    DEFAULT_TIME_FIELD
                )?;
            }
        }
    }
    Ok(())
}

fn dynamic_defaults() -> String {
    format!(
        "metricKey={} readingKey={} valueTransform={}",
        DEFAULT_METRIC_KEY,
        DEFAULT_READING_KEY,
        TransformKind::default()
    )
}

/// Merge the config file and flags into one spec document
fn resolve_spec(args: &BuildArgs) -> Result<BuilderSpec, CliError> {
    let mut doc = match &args.config {
        Some(path) => load_config_table(path)?,
        None => Map::new(),
    };

    if let Some(kind) = args.kind {
        doc.insert("kind".to_string(), json!(kind.name()));
    } else if !doc.contains_key("kind") {
        doc.insert("kind".to_string(), json!(PayloadKind::Identity.name()));
    }

    append_keys(&mut doc, "preDropKeys", &args.pre_drop);
    append_keys(&mut doc, "postDropKeys", &args.post_drop);

    if let Some(key) = &args.metric_key {
        override_field(&mut doc, "metricKey", &["metric_key"], json!(key));
    }
    if let Some(key) = &args.reading_key {
        override_field(&mut doc, "readingKey", &["reading_key"], json!(key));
    }
    if let Some(transform) = args.transform {
        override_field(
            &mut doc,
            "valueTransform",
            &["value_transform", "value_transform_function"],
            json!(transform.name()),
        );
    }
    if let Some(field) = &args.time_field {
        override_field(
            &mut doc,
            "timeFieldName",
            &["time_field_name", "time_col_name"],
            json!(field),
        );
    }

    Ok(BuilderSpec::from_json_value(Value::Object(doc))?)
}

fn load_config_table(path: &Path) -> Result<Map<String, Value>, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&text).map_err(PayloadError::from)?;
    match serde_json::to_value(table).map_err(PayloadError::from)? {
        Value::Object(map) => Ok(map),
        _ => Err(PayloadError::InvalidConfig {
            reason: format!("{} is not a TOML table", path.display()),
        }
        .into()),
    }
}

fn append_keys(doc: &mut Map<String, Value>, field: &str, keys: &[String]) {
    if keys.is_empty() {
        return;
    }
    let entry = doc
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(existing) = entry {
        existing.extend(keys.iter().map(|k| json!(k)));
    } else {
        *entry = Value::Array(keys.iter().map(|k| json!(k)).collect());
    }
}

/// Set `field`, removing alternate spellings a config file may have used
fn override_field(doc: &mut Map<String, Value>, field: &str, aliases: &[&str], value: Value) {
    for alias in aliases {
        doc.remove(*alias);
    }
    doc.insert(field.to_string(), value);
}

fn warn_unused_flags(args: &BuildArgs, kind: PayloadKind) {
    let dynamic_flags = args.metric_key.is_some()
        || args.reading_key.is_some()
        || args.transform.is_some();
    if kind == PayloadKind::Identity && dynamic_flags {
        warn!(%kind, "--metric-key, --reading-key and --transform have no effect");
    }
    if kind != PayloadKind::UntimedDynamic && args.time_field.is_some() {
        warn!(%kind, "--time-field only applies to untimed-dynamic");
    }
}

fn read_record(input: Option<&Path>) -> Result<Record, CliError> {
    let text = match input {
        None => read_stdin()?,
        Some(path) if path == Path::new("-") => read_stdin()?,
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?,
    };
    Ok(record::from_json_str(&text)?)
}

fn read_stdin() -> Result<String, CliError> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|source| CliError::Read {
            path: "<stdin>".to_string(),
            source,
        })?;
    Ok(text)
}

fn write_output(output: Option<&Path>, rendered: &str) -> Result<(), CliError> {
    match output {
        Some(path) => fs::write(path, format!("{rendered}\n"))?,
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{rendered}")?;
            out.flush()?;
        }
    }
    Ok(())
}
