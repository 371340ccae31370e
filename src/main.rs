use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use phpcanon::cfg::Cfg;
use phpcanon::config::{Config, ParseOptions};
use phpcanon::diagnostics;
use phpcanon::parser::ast::Program;
use phpcanon::stats::{self, NodeKind};

/// Worker stack size; JSON serialization of the tree recurses once per
/// nesting level.
const STACK_SIZE: usize = 32 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "phpcanon", version, about = "Parse PHP and print it in canonical form")]
struct Cli {
    /// Config file (defaults to the nearest phpcanon.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum nesting depth of blocks and expressions
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log filter directives, e.g. "phpcanon=debug"; overrides -v
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print files in canonical form
    Fmt {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Rewrite files in place
        #[arg(long, conflicts_with = "check")]
        write: bool,
        /// List files that are not in canonical form and exit with status 1
        #[arg(long)]
        check: bool,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Parse and validate files without printing
    Check {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Dump the syntax tree as JSON
    Ast {
        /// Source file path
        file: PathBuf,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
        /// Output path. If omitted, prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Count node kinds, or list the locations of one kind
    Stats {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Node kind to locate, e.g. "method-call"
        #[arg(long)]
        kind: Option<NodeKind>,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Write the control-flow graph of each file as Graphviz DOT
    Cfg {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output file, or a directory of `<name>.dot` files when there are
        /// several inputs. If omitted, prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FmtMode {
    Print,
    Write,
    Check,
}

fn init_tracing(verbose: u8, log: Option<&str>) {
    let filter = match log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
}

/// Config file settings with command-line overrides applied.
fn parse_options(config: Option<&Path>, max_depth: Option<usize>) -> Result<ParseOptions> {
    let config = match config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&std::env::current_dir().context("could not determine working directory")?)?,
    };
    let mut options = config.parse;
    if let Some(depth) = max_depth {
        if depth == 0 {
            bail!("--max-depth must be at least 1");
        }
        options.max_nesting_depth = depth;
    }
    tracing::debug!(max_nesting_depth = options.max_nesting_depth, "parse options");
    Ok(options)
}

/// Expand directories into the `.php` files they contain, in sorted order.
fn collect_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_dir(path, recursive, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn collect_dir(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("could not read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("could not read directory {}", dir.display()))?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            if recursive {
                collect_dir(&path, true, out)?;
            }
        } else if path.extension().is_some_and(|ext| ext == "php") {
            out.push(path);
        }
    }
    Ok(())
}

/// Read and parse `path`. A diagnostic comes back rendered against the
/// file's source.
fn parse_file(path: &Path, options: &ParseOptions) -> Result<(String, Program)> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
    match phpcanon::parse_with_options(&source, options) {
        Ok(program) => Ok((source, program)),
        Err(diag) => bail!("{}", diagnostics::render(&source, &path.display().to_string(), &diag)),
    }
}

/// Canonical text of `path` and whether it differs from the file.
fn format_file(path: &Path, options: &ParseOptions) -> Result<(String, bool)> {
    let (source, program) = parse_file(path, options)?;
    let formatted = phpcanon::print(&program);
    let changed = formatted != source;
    Ok((formatted, changed))
}

fn run_fmt(files: &[PathBuf], mode: FmtMode, options: &ParseOptions) -> Result<bool> {
    let results: Vec<Result<(String, bool)>> = files.par_iter().map(|path| format_file(path, options)).collect();

    let mut ok = true;
    for (path, result) in files.iter().zip(results) {
        let (formatted, changed) = match result {
            Ok(r) => r,
            Err(err) => {
                eprintln!("{err:#}");
                ok = false;
                continue;
            }
        };
        match mode {
            FmtMode::Print => print!("{formatted}"),
            FmtMode::Write => {
                if changed {
                    std::fs::write(path, &formatted)
                        .with_context(|| format!("could not write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "formatted");
                }
            }
            FmtMode::Check => {
                if changed {
                    println!("{}", path.display());
                    ok = false;
                }
            }
        }
    }
    Ok(ok)
}

fn run_check(files: &[PathBuf], options: &ParseOptions) -> bool {
    let results: Vec<Result<(String, Program)>> = files.par_iter().map(|path| parse_file(path, options)).collect();
    let mut ok = true;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(_) => tracing::info!(path = %path.display(), "ok"),
            Err(err) => {
                eprintln!("{err:#}");
                ok = false;
            }
        }
    }
    ok
}

fn run_ast(file: &Path, pretty: bool, output: Option<&Path>, options: &ParseOptions) -> Result<()> {
    let (_, program) = parse_file(file, options)?;
    let json = if pretty { serde_json::to_string_pretty(&program)? } else { serde_json::to_string(&program)? };
    match output {
        Some(out) => {
            std::fs::write(out, format!("{json}\n")).with_context(|| format!("could not write {}", out.display()))?
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Counts are printed per file, under a `path:` header when there is more
/// than one file.
fn run_stats(files: &[PathBuf], kind: Option<NodeKind>, options: &ParseOptions) -> Result<bool> {
    let results: Vec<Result<(String, Program)>> = files.par_iter().map(|path| parse_file(path, options)).collect();
    let headed = files.len() > 1;
    let mut first = true;
    let mut ok = true;
    for (path, result) in files.iter().zip(results) {
        let program = match result {
            Ok((_, program)) => program,
            Err(err) => {
                eprintln!("{err:#}");
                ok = false;
                continue;
            }
        };
        match kind {
            Some(kind) => {
                for span in stats::find_kind(&program, kind) {
                    println!("{}:{}:{}", path.display(), span.line, span.column);
                }
            }
            None => {
                if headed {
                    if !first {
                        println!();
                    }
                    println!("{}:", path.display());
                }
                for (kind, count) in stats::count_kinds(&program) {
                    println!("{kind}: {count}");
                }
            }
        }
        first = false;
    }
    Ok(ok)
}

fn run_cfg(files: &[PathBuf], output: Option<&Path>, options: &ParseOptions) -> Result<bool> {
    let results: Vec<Result<String>> = files
        .par_iter()
        .map(|path| parse_file(path, options).map(|(_, program)| Cfg::build(&program).to_dot()))
        .collect();
    let into_dir = output.filter(|_| files.len() > 1);
    if let Some(dir) = into_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("could not create {}", dir.display()))?;
    }
    let mut ok = true;
    for (path, result) in files.iter().zip(results) {
        let dot = match result {
            Ok(dot) => dot,
            Err(err) => {
                eprintln!("{err:#}");
                ok = false;
                continue;
            }
        };
        let target = match (into_dir, output) {
            (Some(dir), _) => {
                let stem = path.file_stem().unwrap_or(path.as_os_str());
                Some(dir.join(stem).with_extension("dot"))
            }
            (None, out) => out.map(Path::to_path_buf),
        };
        match target {
            Some(out) => {
                std::fs::write(&out, dot).with_context(|| format!("could not write {}", out.display()))?;
                tracing::info!(path = %path.display(), output = %out.display(), "wrote control-flow graph");
            }
            None => print!("{dot}"),
        }
    }
    Ok(ok)
}

/// Returns `Ok(false)` when a file failed to parse or is not canonical.
fn run(cli: Cli) -> Result<bool> {
    let options = parse_options(cli.config.as_deref(), cli.max_depth)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .stack_size(STACK_SIZE)
        .build()
        .context("could not start worker threads")?;

    pool.install(|| match cli.command {
        Commands::Fmt { paths, write, check, recursive } => {
            let files = collect_files(&paths, recursive)?;
            let mode = if write {
                FmtMode::Write
            } else if check {
                FmtMode::Check
            } else {
                FmtMode::Print
            };
            tracing::debug!(files = files.len(), "formatting");
            run_fmt(&files, mode, &options)
        }
        Commands::Check { paths, recursive } => {
            let files = collect_files(&paths, recursive)?;
            Ok(run_check(&files, &options))
        }
        Commands::Ast { file, pretty, output } => {
            run_ast(&file, pretty, output.as_deref(), &options)?;
            Ok(true)
        }
        Commands::Stats { paths, kind, recursive } => {
            let files = collect_files(&paths, recursive)?;
            run_stats(&files, kind, &options)
        }
        Commands::Cfg { paths, output, recursive } => {
            let files = collect_files(&paths, recursive)?;
            run_cfg(&files, output.as_deref(), &options)
        }
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log.as_deref());

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
