use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemac_core::{Config, Outcome, Report};
use schemac_engine::{run_batch, Mode};

/// schemac - compile schema documents into MySQL DDL and runtime descriptors
#[derive(Parser)]
#[command(name = "schemac")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemac.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write a JSON batch report to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit one `<schema>.<core|inst>.sql` file per declared database
    Sql(DirArgs),

    /// Emit one frozen descriptor module per schema
    Descriptor(DirArgs),
}

#[derive(Args)]
struct DirArgs {
    /// Directory holding `<schema>.json` documents
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory receiving the emitted files
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    let (mode, dirs) = match cli.command {
        Commands::Sql(dirs) => (Mode::Sql, dirs),
        Commands::Descriptor(dirs) => (Mode::Descriptor, dirs),
    };

    let (input_dir, output_dir) = resolve_dirs(dirs, &config)?;

    if cli.verbose {
        eprintln!(
            "{} {} -> {}",
            format!("Compiling {}:", mode).cyan(),
            input_dir.display(),
            output_dir.display()
        );
    }

    let report = run_batch(mode, &input_dir, &output_dir, &config)
        .with_context(|| format!("Failed to compile schemas from {}", input_dir.display()))?;

    if let Some(path) = &cli.report {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        if cli.verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    print_report_summary(&report);

    // Exit with error code if any file failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

/// Log to stderr; `--verbose` raises the default level, `RUST_LOG` wins
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Flags take precedence over the config file; both missing is a usage error
fn resolve_dirs(dirs: DirArgs, config: &Config) -> Result<(PathBuf, PathBuf)> {
    let input_dir = dirs.input.or_else(|| config.input_dir.clone()).context(
        "No input directory: pass --input or set input_dir in schemac.toml",
    )?;
    let output_dir = dirs.output.or_else(|| config.output_dir.clone()).context(
        "No output directory: pass --output or set output_dir in schemac.toml",
    )?;
    Ok((input_dir, output_dir))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = Path::new("schemac.toml");
    if default_path.exists() {
        return Config::from_file(default_path).context("Failed to load schemac.toml");
    }

    tracing::debug!("no config file found, using defaults");
    Ok(Config::default())
}

fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", format!("schemac {} report", report.mode).bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    for file in &report.files {
        match &file.outcome {
            Outcome::Compiled { artifacts } => {
                println!("  {} {}", "✓".green(), file.schema.bold());
                for artifact in artifacts {
                    println!("      {} ({} bytes)", artifact.file, artifact.bytes);
                }
            }
            Outcome::Skipped { reason } => {
                println!("  {} {}: {}", "-".yellow(), file.schema, reason);
            }
            Outcome::Failed {
                code,
                message,
                location,
            } => {
                let code = code.map(|c| c.as_str()).unwrap_or("IO_ERROR");
                println!("  {} {} [{}] {}", "✗".red(), file.schema.bold(), code.red().bold(), message);
                if let Some(location) = location {
                    println!("      at {}", location);
                }
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  Total:    {}", report.summary.total);
    println!("  Compiled: {}", report.summary.compiled.to_string().green());
    if report.summary.skipped > 0 {
        println!("  Skipped:  {}", report.summary.skipped.to_string().yellow());
    } else {
        println!("  Skipped:  {}", report.summary.skipped);
    }
    if report.summary.failed > 0 {
        println!("  Failed:   {}", report.summary.failed.to_string().red().bold());
    } else {
        println!("  Failed:   {}", report.summary.failed.to_string().green());
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
