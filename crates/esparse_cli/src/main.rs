//! esparse: Parse ECMAScript files and print the syntax tree as JSON.
//!
//! Usage:
//!   esparse [options] [file...]
//!
//! Reads standard input when no file (or `-`) is given. Syntax errors exit
//! with code 1, unreadable inputs or option files with code 2.

mod logging;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use bumpalo::Bump;
use clap::{Parser as ClapParser, ValueEnum};
use esparse_ast::{File, SourceType};
use esparse_diagnostics::SyntaxError;
use esparse_parser::{parse, ParserOptions};
use miette::{NamedSource, Report};

#[derive(ClapParser, Debug)]
#[command(name = "esparse", version, about = "Parse ECMAScript into a Babylon-compatible AST")]
struct Cli {
    /// Files to parse. `-` reads standard input.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Parse as a script or as a module.
    #[arg(long, value_enum)]
    source_type: Option<SourceTypeArg>,

    /// Enable a syntax extension. May be repeated.
    #[arg(long = "plugin", value_name = "NAME")]
    plugins: Vec<String>,

    /// Start in strict mode regardless of the source type.
    #[arg(long)]
    strict: bool,

    /// Accept `return` at the top level.
    #[arg(long)]
    allow_return_outside_function: bool,

    /// Read parser options from a JSON file. Flags override its values.
    #[arg(long, value_name = "options.json")]
    config: Option<PathBuf>,

    /// Print the token list instead of the tree.
    #[arg(long, conflicts_with = "comments_only")]
    tokens: bool,

    /// Print only the comments.
    #[arg(long)]
    comments_only: bool,

    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceTypeArg {
    Script,
    Module,
}

impl From<SourceTypeArg> for SourceType {
    fn from(arg: SourceTypeArg) -> Self {
        match arg {
            SourceTypeArg::Script => SourceType::Script,
            SourceTypeArg::Module => SourceType::Module,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read '{path}': {source}")]
    Read { path: String, source: io::Error },

    #[error("invalid options file '{path}': {source}")]
    Config { path: String, source: serde_json::Error },

    #[error("cannot write output: {0}")]
    Write(#[from] io::Error),

    #[error("cannot serialise output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One input, named for diagnostics.
struct Input {
    name: String,
    source: String,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    }
}

/// Parse every input, returning the exit code. Syntax errors are reported
/// and do not stop the remaining inputs.
fn run(cli: &Cli) -> Result<i32, CliError> {
    let base = build_options(cli)?;
    let inputs = read_inputs(&cli.files)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut code = 0;

    for input in &inputs {
        let options = ParserOptions {
            source_filename: Some(input.name.clone()),
            ..base.clone()
        };
        let arena = Bump::new();
        let started = Instant::now();
        let result = parse(&arena, &input.source, &options);
        tracing::debug!(file = %input.name, elapsed = ?started.elapsed(), ok = result.is_ok(), "parsed");

        match result {
            Ok(file) => emit(&mut out, &file, cli)?,
            Err(err) => {
                eprintln!("{:?}", render(err, input));
                code = 1;
            }
        }
    }

    out.flush()?;
    Ok(code)
}

/// Combine the options file (if any) with the command-line flags.
fn build_options(cli: &Cli) -> Result<ParserOptions, CliError> {
    let mut options = match &cli.config {
        Some(path) => {
            let name = path.display().to_string();
            let text = fs::read_to_string(path).map_err(|source| CliError::Read { path: name.clone(), source })?;
            serde_json::from_str(&text).map_err(|source| CliError::Config { path: name, source })?
        }
        None => ParserOptions::default(),
    };

    if let Some(source_type) = cli.source_type {
        options.source_type = source_type.into();
    }
    for name in &cli.plugins {
        if !options.plugins.contains(name) {
            options.plugins.push(name.clone());
        }
    }
    if cli.strict {
        options.strict_mode = Some(true);
    }
    if cli.allow_return_outside_function {
        options.allow_return_outside_function = true;
    }

    tracing::debug!(?options, "resolved parser options");
    Ok(options)
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<Input>, CliError> {
    if files.is_empty() {
        return Ok(vec![read_stdin()?]);
    }

    files
        .iter()
        .map(|path| {
            if path.as_os_str() == "-" {
                return read_stdin();
            }
            let name = path.display().to_string();
            match fs::read_to_string(path) {
                Ok(source) => Ok(Input { name, source }),
                Err(source) => Err(CliError::Read { path: name, source }),
            }
        })
        .collect()
}

fn read_stdin() -> Result<Input, CliError> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .map_err(|source| CliError::Read { path: "<stdin>".to_string(), source })?;
    Ok(Input { name: "<stdin>".to_string(), source })
}

fn emit(out: &mut impl Write, file: &File<'_>, cli: &Cli) -> Result<(), CliError> {
    let value = if cli.tokens {
        serde_json::to_value(file.tokens)?
    } else if cli.comments_only {
        serde_json::to_value(file.comments)?
    } else {
        serde_json::to_value(file)?
    };

    if cli.compact {
        serde_json::to_writer(&mut *out, &value)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, &value)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Attach the input text so the report can show the offending line.
fn render(err: SyntaxError, input: &Input) -> Report {
    Report::new(err).with_source_code(NamedSource::new(input.name.clone(), input.source.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("esparse").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_map_to_options() {
        let options = build_options(&cli(&[
            "--source-type",
            "module",
            "--plugin",
            "jsx",
            "--plugin",
            "flow",
            "--allow-return-outside-function",
        ]))
        .unwrap();
        assert_eq!(options.source_type, SourceType::Module);
        assert_eq!(options.plugins, vec!["jsx", "flow"]);
        assert!(options.allow_return_outside_function);
        assert_eq!(options.strict_mode, None);
    }

    #[test]
    fn test_strict_flag() {
        let options = build_options(&cli(&["--strict"])).unwrap();
        assert_eq!(options.strict_mode, Some(true));
        assert!(options.is_strict());
    }

    #[test]
    fn test_options_file_is_overridden_by_flags() {
        let path = std::env::temp_dir().join(format!("esparse-cli-options-{}.json", process::id()));
        fs::write(&path, r#"{ "sourceType": "module", "plugins": ["jsx"], "strictMode": false }"#).unwrap();

        let config = path.display().to_string();
        let config = config.as_str();
        let options = build_options(&cli(&["--config", config, "--plugin", "jsx", "--plugin", "flow"])).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(options.source_type, SourceType::Module);
        assert_eq!(options.plugins, vec!["jsx", "flow"]);
        assert_eq!(options.strict_mode, Some(false));
    }

    #[test]
    fn test_bad_options_file() {
        let path = std::env::temp_dir().join(format!("esparse-cli-bad-{}.json", process::id()));
        fs::write(&path, "{ not json").unwrap();
        let config = path.display().to_string();
        let config = config.as_str();
        let result = build_options(&cli(&["--config", config]));
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(CliError::Config { .. })));
    }

    #[test]
    fn test_tokens_conflict_with_comments_only() {
        assert!(Cli::try_parse_from(["esparse", "--tokens", "--comments-only"]).is_err());
    }

    #[test]
    fn test_emit_compact_tree() {
        let arena = Bump::new();
        let file = parse(&arena, "a;", &ParserOptions::default()).unwrap();
        let mut out = Vec::new();
        emit(&mut out, &file, &cli(&["--compact"])).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "File");
        assert_eq!(value["program"]["body"][0]["expression"]["name"], "a");
    }

    #[test]
    fn test_emit_tokens() {
        let arena = Bump::new();
        let file = parse(&arena, "a /* c */;", &ParserOptions::default()).unwrap();
        let mut out = Vec::new();
        emit(&mut out, &file, &cli(&["--tokens"])).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));

        let mut out = Vec::new();
        emit(&mut out, &file, &cli(&["--comments-only"])).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["value"], " c ");
    }

    #[test]
    fn test_render_includes_code() {
        let input = Input {
            name: "bad.js".to_string(),
            source: "var a = ;".to_string(),
        };
        let err = parse(&Bump::new(), &input.source, &ParserOptions::default()).unwrap_err();
        let report = render(err, &input);
        assert_eq!(report.to_string(), "Unexpected token (1:8)");
        assert!(report.code().is_some());
    }
}
