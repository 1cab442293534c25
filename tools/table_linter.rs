/// Table Linter — validates keyword tables, synonym tables and poem files.
///
/// Usage: table_linter <dir|file> [--keywords <file>] [--synonyms <file>]
///
/// Files are classified by name: `*keywords*.ron` are keyword tables,
/// `*synonyms*.ron` synonym tables, any other `.ron`/`.json` a poem book.

use illume::core::mood::KeywordTable;
use illume::core::variation::{SynonymTable, Variator};
use illume::schema::poem::PoemBook;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Inputs {
    keywords: Vec<PathBuf>,
    synonyms: Vec<PathBuf>,
    poems: Vec<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: table_linter <dir|file> [--keywords <file>] [--synonyms <file>]");
        process::exit(0);
    }

    let mut inputs = Inputs::default();
    let root = Path::new(&args[1]);
    if root.is_file() {
        classify(root, &mut inputs);
    } else if root.is_dir() {
        collect_recursive(root, &mut inputs);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    }

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--keywords" if i + 1 < args.len() => {
                i += 1;
                inputs.keywords.push(PathBuf::from(&args[i]));
            }
            "--synonyms" if i + 1 < args.len() => {
                i += 1;
                inputs.synonyms.push(PathBuf::from(&args[i]));
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    lint_keywords(&inputs.keywords, &mut errors, &mut warnings);
    let variator = lint_synonyms(&inputs.synonyms, &mut errors, &mut warnings);
    lint_poems(&inputs.poems, &variator, &mut errors, &mut warnings);

    println!("\n=== Table Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn classify(path: &Path, inputs: &mut Inputs) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let extension = path.extension().and_then(|s| s.to_str());
    match extension {
        Some("ron") if name.contains("keywords") => inputs.keywords.push(path.to_path_buf()),
        Some("ron") if name.contains("synonyms") => inputs.synonyms.push(path.to_path_buf()),
        Some("ron") | Some("json") => inputs.poems.push(path.to_path_buf()),
        _ => {}
    }
}

fn collect_recursive(dir: &Path, inputs: &mut Inputs) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                collect_recursive(&path, inputs);
            } else {
                classify(&path, inputs);
            }
        }
    }
}

fn lint_keywords(paths: &[PathBuf], errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    for path in paths {
        let table = match KeywordTable::load_from_ron(path) {
            Ok(table) => {
                println!("  Loaded keywords: {}", path.display());
                table
            }
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };

        for shadowed in table.shadowed() {
            warnings.push(format!(
                "{}: keyword '{}' ({}) can never win, '{}' ({}) matches first",
                path.display(),
                shadowed.keyword,
                shadowed.mood,
                shadowed.shadowing_keyword,
                shadowed.shadowed_by
            ));
        }
    }
}

/// Lints synonym tables and returns the variator used to check poems:
/// the last valid table given, or the built-in one.
fn lint_synonyms(
    paths: &[PathBuf],
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> Variator {
    let mut variator = Variator::builtin().clone();
    for path in paths {
        let table = match SynonymTable::load_from_ron(path) {
            Ok(table) => {
                println!("  Loaded synonyms: {}", path.display());
                table
            }
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };

        match table.chains() {
            Ok(chains) => {
                for chain in chains {
                    warnings.push(format!(
                        "{}: candidate '{}' of '{}' is substituted again by '{}'",
                        path.display(),
                        chain.candidate,
                        chain.word,
                        chain.feeds
                    ));
                }
            }
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }

        for entry in &table.entries {
            if entry.candidates.len() < 2 {
                warnings.push(format!(
                    "{}: '{}' has no alternatives besides itself",
                    path.display(),
                    entry.word
                ));
            }
        }

        match Variator::new(table) {
            Ok(v) => variator = v,
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }
    }
    variator
}

fn lint_poems(
    paths: &[PathBuf],
    variator: &Variator,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    for path in paths {
        let book = match PoemBook::load(path) {
            Ok(book) => {
                println!("  Loaded {} poems: {}", book.len(), path.display());
                book
            }
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };

        if book.is_empty() {
            warnings.push(format!("{}: no poems", path.display()));
        }

        for poem in &book.poems {
            if poem.lines.is_empty() {
                errors.push(format!(
                    "{}: poem '{}' has no lines",
                    path.display(),
                    poem.title
                ));
                continue;
            }
            if poem.title.trim().is_empty() {
                warnings.push(format!("{}: untitled poem", path.display()));
            }
            if !variator.can_vary(&poem.lines) {
                warnings.push(format!(
                    "{}: poem '{}' contains no words the living poem can vary",
                    path.display(),
                    poem.title
                ));
            }
        }
    }
}
