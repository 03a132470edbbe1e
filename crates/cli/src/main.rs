//! CLI entry point for prompty.
//!
//! - `prompty check <PATH>...` binds every document and reports failures
//! - `prompty fmt <PATH>` rewrites a document in canonical form

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use color_eyre::eyre::bail;
use color_eyre::eyre::WrapErr;
use colored::Colorize;
use prompty_core::config::loader::discover_documents;
use prompty_core::config::loader::load_document;
use prompty_core::config::loader::load_workspace_config;
use prompty_protocol::Document;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "prompty", version, about = "Check and format prompty agent definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bind documents and report every one that fails
    Check {
        /// Document files, or directories whose documents are checked
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print a document in canonical form
    Fmt {
        /// Document file
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "yaml")]
        output: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check { paths } => check(&paths),
        Command::Fmt { path, output } => fmt(&path, output),
    }
}

fn check(paths: &[PathBuf]) -> color_eyre::Result<()> {
    let mut checked = 0;
    let mut failed = 0;

    for path in paths {
        let files = if path.is_dir() {
            discover_documents(path)?
        } else {
            vec![path.clone()]
        };
        info!(path = %path.display(), count = files.len(), "checking documents");

        for file in files {
            checked += 1;
            match load(&file) {
                Ok(document) => println!(
                    "{} {} ({})",
                    "ok".green().bold(),
                    file.display(),
                    describe(&document)
                ),
                Err(e) => {
                    failed += 1;
                    println!("{} {}: {:#}", "error".red().bold(), file.display(), e);
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {checked} documents failed to bind");
    }
    Ok(())
}

fn fmt(path: &Path, output: OutputFormat) -> color_eyre::Result<()> {
    let document = load(path)?;
    let written = match output {
        OutputFormat::Json => serde_json::to_string_pretty(&document)?,
        OutputFormat::Yaml => serde_yaml::to_string(&document)?,
    };
    print!("{}", written.trim_end());
    println!();
    Ok(())
}

/// Loads one document with the settings of its directory's `prompty.toml`.
fn load(path: &Path) -> color_eyre::Result<Document> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = load_workspace_config(dir)
        .wrap_err_with(|| format!("Failed to load settings for {}", path.display()))?;
    Ok(load_document(path, &config.bind)?)
}

fn describe(document: &Document) -> String {
    if document.name.is_empty() {
        document.kind.literal().to_string()
    } else {
        format!("{} {}", document.kind.literal(), document.name)
    }
}
