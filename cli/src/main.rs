mod schema_file;

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use typed_argv_core::{
    Arity, FsProbe, Kind, OptionSpec, ParseResult, Schema, flag_form, tokenize, tokens_from_args,
    validate_schema,
};

/// Largest status a process can report; higher failure counts are clamped.
const MAX_EXIT_CODE: i32 = 255;

/// CLI output format with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "typed-argv")]
#[command(about = "Parse argument lists against a typed option schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse arguments against a schema file and print the result.
    Parse(ParseArgs),
    /// Validate a schema file.
    Check(CheckArgs),
    /// List the known type tags.
    Tags,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema file (.json, .yaml or .yml).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Treat the arguments as one command line to tokenize.
    #[arg(long)]
    line: bool,
    /// Arguments to parse (place them after `--`).
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (.json, .yaml or .yml).
    #[arg(long)]
    schema: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
        Command::Tags => run_tags(),
    };

    match result {
        Ok(code) => std::process::exit(code.clamp(0, MAX_EXIT_CODE)),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn load_schema(path: &Path) -> Result<Schema, String> {
    let schema = schema_file::load(path).map_err(|err| err.to_string())?;
    debug!(path = %path.display(), options = schema.options.len(), "schema loaded");
    Ok(schema)
}

fn print_output<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<(), String> {
    let text = match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("Failed to serialize output: {e}"))?,
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("Failed to serialize output: {e}"))?
        }
    };
    emit(text.trim_end())
}

/// Writes a block to stdout. A reader that went away (`| head`) is not an
/// error.
fn emit(text: &str) -> Result<(), String> {
    let mut out = std::io::stdout().lock();
    match writeln!(out, "{text}").and_then(|()| out.flush()) {
        Err(err) if err.kind() != ErrorKind::BrokenPipe => {
            Err(format!("Failed to write output: {err}"))
        }
        _ => Ok(()),
    }
}

fn run_parse(args: ParseArgs) -> Result<i32, String> {
    let schema = load_schema(&args.schema)?;
    let tokens = if args.line {
        tokenize(&args.tokens.join(" "))
    } else {
        tokens_from_args(args.tokens)
    };

    let result: ParseResult = schema.parse_with(tokens, &FsProbe);
    print_output(&result, args.format)?;
    for err in &result.errors {
        eprintln!("{err}");
    }
    if !result.output.is_empty() {
        eprintln!("{}", result.output);
    }
    Ok(result.code)
}

fn run_check(args: CheckArgs) -> Result<i32, String> {
    let schema = load_schema(&args.schema)?;
    let errors = validate_schema(&schema);
    if errors.is_empty() {
        let mut lines = vec![format!(
            "{}: ok ({} options)",
            args.schema.display(),
            schema.options.len()
        )];
        lines.extend(schema.options.iter().map(|spec| format!("  {}", describe_option(spec))));
        emit(&lines.join("\n"))?;
        return Ok(0);
    }
    for err in &errors {
        eprintln!("{}: {err}", args.schema.display());
    }
    Err(format!("{} schema error(s)", errors.len()))
}

fn describe_option(spec: &OptionSpec) -> String {
    let forms: Vec<String> = spec.names.iter().map(|name| flag_form(name)).collect();
    let mut line = forms.join(", ");
    if let Some(hint) = &spec.hint {
        line.push(' ');
        line.push_str(hint);
    }
    let arity = match spec.arity() {
        Arity::Fixed => "one value",
        Arity::Variable => "many values",
    };
    line.push_str(&format!("  [{}, {arity}", spec.type_tag()));
    if spec.required {
        line.push_str(", required");
    }
    line.push(']');
    if let Some(desc) = &spec.description {
        line.push_str("  ");
        line.push_str(desc);
    }
    line
}

fn run_tags() -> Result<i32, String> {
    let lines: Vec<String> = Kind::ALL
        .into_iter()
        .map(|kind| match kind {
            Kind::Array => format!("{}:<element>", kind.tag()),
            _ => kind.tag().to_string(),
        })
        .collect();
    emit(&lines.join("\n"))?;
    Ok(0)
}
