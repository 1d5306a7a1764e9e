#![forbid(unsafe_code)]

use frontend::ast::Program;
use frontend::parser;
use project::{build_index, resolve};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Clone)]
enum Mode {
    Run {
        file: PathBuf,
        root: Option<PathBuf>,
        libs: Vec<PathBuf>,
    },
    Inline {
        code: String,
        root: Option<PathBuf>,
        libs: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let mode = match parse_args(env::args().skip(1).collect()) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    match run(mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<Mode, CliError> {
    if args.is_empty() {
        print_usage();
        std::process::exit(1);
    }

    let mut file = None;
    let mut root = None;
    let mut libs = Vec::new();
    let mut inline = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--file" => {
                let path = iter
                    .next()
                    .ok_or_else(|| CliError::Message("expected path after --file".into()))?;
                file = Some(PathBuf::from(path));
            }
            "--root" => {
                let path = iter
                    .next()
                    .ok_or_else(|| CliError::Message("expected directory after --root".into()))?;
                root = Some(PathBuf::from(path));
            }
            "--lib" => {
                let path = iter
                    .next()
                    .ok_or_else(|| CliError::Message("expected directory after --lib".into()))?;
                libs.push(PathBuf::from(path));
            }
            "-e" => {
                let code = iter
                    .next()
                    .ok_or_else(|| CliError::Message("expected code after -e".into()))?;
                inline = Some(code);
            }
            other if file.is_none() && !other.starts_with('-') => {
                file = Some(PathBuf::from(other));
            }
            other => {
                return Err(CliError::Message(format!("unexpected argument {other}")));
            }
        }
    }

    if let Some(code) = inline {
        return Ok(Mode::Inline { code, root, libs });
    }
    let file = file.ok_or_else(|| CliError::Message("no source file provided".into()))?;
    Ok(Mode::Run { file, root, libs })
}

fn run(mode: Mode) -> Result<(), CliError> {
    match mode {
        Mode::Inline { code, root, libs } => {
            let root = match root {
                Some(root) => root,
                None => env::current_dir()
                    .map_err(|e| CliError::Message(format!("resolve working directory: {e}")))?,
            };
            let root = canonicalize(&root)?;
            let program = parser::parse_source("<inline>", &code)
                .map_err(|e| CliError::Message(format!("parse error: {e}")))?;
            execute(Target::Inline(program), &root, &libs)
        }
        Mode::Run { file, root, libs } => {
            let file = canonicalize(&file)?;
            let root = match root {
                Some(root) => canonicalize(&root)?,
                None => file.parent().unwrap_or(Path::new(".")).to_path_buf(),
            };
            execute(Target::File(file), &root, &libs)
        }
    }
}

enum Target {
    File(PathBuf),
    Inline(Program),
}

fn execute(target: Target, root: &Path, libs: &[PathBuf]) -> Result<(), CliError> {
    let index = build_index(root, libs)
        .map_err(|e| CliError::Message(format!("failed to index project: {e}")))?;

    let program = match target {
        Target::Inline(program) => program,
        Target::File(path) => match index.programs.get(&path) {
            Some(program) => program.clone(),
            None => parser::parse_file(&path)
                .map_err(|e| CliError::Message(format!("parse error: {e}")))?,
        },
    };

    let symbols = resolve(&program, &index)
        .map_err(|e| CliError::Message(format!("symbol resolution error: {e}")))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    interp::run_main(&symbols, &mut out)
        .map_err(|e| CliError::Message(format!("runtime error: {e}")))?;
    Ok(())
}

fn canonicalize(path: &Path) -> Result<PathBuf, CliError> {
    path.canonicalize()
        .map_err(|e| CliError::Message(format!("resolve {}: {e}", path.display())))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("GLYPH_LOG"))
        .with_writer(io::stderr)
        .init();
}

fn print_usage() {
    eprintln!(
        "usage: glyph [options] [file.gly]

Options:
  --file <path>   path to a Glyph source file
  --root <dir>    project root directory (defaults to the source file directory)
  --lib <dir>     extra library directory (repeatable)
  -e <code>       execute inline Glyph code
  --help, -h      show this help"
    );
}
