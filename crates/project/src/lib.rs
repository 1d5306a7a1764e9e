#![forbid(unsafe_code)]

use frontend::ast::{FunctionDecl, Program, RecordDecl, TypeAliasDecl};
use frontend::parser::{self, ParseError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

pub const SOURCE_EXTENSION: &str = "gly";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("walk project tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("resolve {path}: {message}")]
    Canonicalize { path: String, message: String },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error("duplicate type alias {0}")]
    DuplicateAlias(String),
    #[error("duplicate record {0}")]
    DuplicateRecord(String),
    #[error("duplicate function {0}")]
    DuplicateFunction(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("symbol {0} already defined")]
    AlreadyDefined(String),
    #[error("symbol not found: {0}")]
    NotFound(String),
}

/// All declarations discovered within a project tree, keyed by
/// fully-qualified name. Read-only once built.
#[derive(Debug, Default)]
pub struct Index {
    pub functions: HashMap<String, FunctionDecl>,
    pub records: HashMap<String, RecordDecl>,
    pub aliases: HashMap<String, TypeAliasDecl>,
    pub programs: HashMap<PathBuf, Program>,
}

/// The simple-name view of the declarations a single program sees.
#[derive(Debug, Default)]
pub struct Symbols {
    pub package: String,
    pub functions: HashMap<String, FunctionDecl>,
    pub records: HashMap<String, RecordDecl>,
    pub aliases: HashMap<String, TypeAliasDecl>,
}

/// Scan `root` (and optional library directories) for `.gly` files.
pub fn build_index(root: &Path, lib_dirs: &[PathBuf]) -> Result<Index, IndexError> {
    let mut index = Index::default();
    scan_dir(root, &mut index)?;
    for lib in lib_dirs {
        // library directories are best-effort secondary roots
        if !lib.is_dir() {
            continue;
        }
        scan_dir(lib, &mut index)?;
    }
    debug!(
        functions = index.functions.len(),
        records = index.records.len(),
        aliases = index.aliases.len(),
        programs = index.programs.len(),
        "project index built"
    );
    Ok(index)
}

fn scan_dir(root: &Path, index: &mut Index) -> Result<(), IndexError> {
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }
        let abs = path.canonicalize().map_err(|e| IndexError::Canonicalize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if index.programs.contains_key(&abs) {
            continue;
        }
        let program = parser::parse_file(&abs).map_err(|e| IndexError::Parse {
            path: abs.display().to_string(),
            source: e,
        })?;
        index_program(&abs, program, index)?;
    }
    Ok(())
}

fn index_program(abs: &Path, program: Program, index: &mut Index) -> Result<(), IndexError> {
    let package = package_name(&program);
    debug!(path = %abs.display(), package = %package, "indexed source");
    for alias in &program.aliases {
        let fqn = qualify(&package, &alias.name);
        if index.aliases.contains_key(&fqn) {
            return Err(IndexError::DuplicateAlias(fqn));
        }
        index.aliases.insert(fqn, alias.clone());
    }
    for record in &program.records {
        let fqn = qualify(&package, &record.name);
        if index.records.contains_key(&fqn) {
            return Err(IndexError::DuplicateRecord(fqn));
        }
        index.records.insert(fqn, record.clone());
    }
    for function in &program.functions {
        let fqn = qualify(&package, &function.name);
        if index.functions.contains_key(&fqn) {
            return Err(IndexError::DuplicateFunction(fqn));
        }
        index.functions.insert(fqn, function.clone());
    }
    index.programs.insert(abs.to_path_buf(), program);
    Ok(())
}

/// Construct the visible symbol set for `program`: package-local
/// declarations first, the program's own declarations over them, then
/// one binding per import.
pub fn resolve(program: &Program, index: &Index) -> Result<Symbols, ResolveError> {
    let package = package_name(program);
    let mut symbols = Symbols {
        package: package.clone(),
        ..Symbols::default()
    };

    add_package_symbols(&package, index, &mut symbols);

    for record in &program.records {
        symbols.records.insert(record.name.clone(), record.clone());
    }
    for function in &program.functions {
        symbols
            .functions
            .insert(function.name.clone(), function.clone());
    }
    for alias in &program.aliases {
        symbols.aliases.insert(alias.name.clone(), alias.clone());
    }

    for import in &program.imports {
        let simple = simple_name(&import.name).to_string();
        if let Some(function) = index.functions.get(&import.name) {
            if symbols.functions.contains_key(&simple) {
                return Err(ResolveError::AlreadyDefined(simple));
            }
            symbols.functions.insert(simple, function.clone());
            continue;
        }
        if let Some(record) = index.records.get(&import.name) {
            if symbols.records.contains_key(&simple) {
                return Err(ResolveError::AlreadyDefined(simple));
            }
            symbols.records.insert(simple, record.clone());
            continue;
        }
        if let Some(alias) = index.aliases.get(&import.name) {
            if symbols.aliases.contains_key(&simple) {
                return Err(ResolveError::AlreadyDefined(simple));
            }
            symbols.aliases.insert(simple, alias.clone());
            continue;
        }
        return Err(ResolveError::NotFound(import.name.clone()));
    }

    debug!(
        package = %symbols.package,
        functions = symbols.functions.len(),
        records = symbols.records.len(),
        "symbols resolved"
    );
    Ok(symbols)
}

fn add_package_symbols(package: &str, index: &Index, symbols: &mut Symbols) {
    // the index already rejected duplicate FQNs, so first-in wins is moot
    // within one package; skip-if-present keeps later overlays authoritative
    for (fqn, function) in &index.functions {
        if package_part(fqn) != package {
            continue;
        }
        symbols
            .functions
            .entry(simple_name(fqn).to_string())
            .or_insert_with(|| function.clone());
    }
    for (fqn, record) in &index.records {
        if package_part(fqn) != package {
            continue;
        }
        symbols
            .records
            .entry(simple_name(fqn).to_string())
            .or_insert_with(|| record.clone());
    }
    for (fqn, alias) in &index.aliases {
        if package_part(fqn) != package {
            continue;
        }
        symbols
            .aliases
            .entry(simple_name(fqn).to_string())
            .or_insert_with(|| alias.clone());
    }
}

fn package_name(program: &Program) -> String {
    program
        .package
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_default()
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        return name.to_string();
    }
    format!("{package}.{name}")
}

fn package_part(fqn: &str) -> &str {
    fqn.rsplit_once('.').map(|(package, _)| package).unwrap_or("")
}

fn simple_name(fqn: &str) -> &str {
    fqn.rsplit_once('.').map(|(_, name)| name).unwrap_or(fqn)
}
