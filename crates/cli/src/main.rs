use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gemsort_lib::ReorganizeError;

mod cmd;
mod output;

use output::OutputFormat;

/// gemsort - Reorganize Gemfile dependencies into sorted groups
#[derive(Parser)]
#[command(name = "gemsort")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Rewrite a Gemfile with gems sorted and bucketed by group
  Reorganize {
    /// Path to the Gemfile
    gemfile: PathBuf,

    /// Write the result here instead of overwriting the Gemfile
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exit with an error if the Gemfile is not already reorganized
    #[arg(long, conflicts_with_all = ["stdout", "output"])]
    check: bool,

    /// Print the result instead of writing it
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
  },

  /// Show the captured sources, ruby pins and groups of a Gemfile
  Inspect {
    /// Path to the Gemfile
    gemfile: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Reorganize {
      gemfile,
      output,
      check,
      stdout,
    } => {
      let mode = if check {
        cmd::Mode::Check
      } else if stdout {
        cmd::Mode::Stdout
      } else {
        cmd::Mode::Write { output }
      };
      cmd::cmd_reorganize(&gemfile, mode)
    }
    Commands::Inspect { gemfile, format } => cmd::cmd_inspect(&gemfile, format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      output::print_error(&err.to_string());
      if let Some(diagnostic) = err.downcast_ref::<ReorganizeError>().and_then(ReorganizeError::diagnostic) {
        eprintln!("{}", diagnostic);
      }
      ExitCode::FAILURE
    }
  }
}
