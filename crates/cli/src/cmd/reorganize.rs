//! Implementation of the `gemsort reorganize` command.
//!
//! Reads a Gemfile, captures its statements, and writes it back with gems
//! sorted by name and bucketed by group. Nothing is written unless the whole
//! Gemfile was captured.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::debug;

use gemsort_lib::{reorganize_file, write_manifest};

use crate::output::{format_count, print_info, print_success};

/// What to do with the reorganized Gemfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  /// Write to `output`, or back to the Gemfile when unset.
  Write { output: Option<PathBuf> },
  /// Only report whether the Gemfile is already reorganized.
  Check,
  /// Print the result to stdout.
  Stdout,
}

pub fn cmd_reorganize(gemfile: &Path, mode: Mode) -> Result<()> {
  if mode != Mode::Stdout {
    print_info(&format!("Parsing Gemfile: {}", gemfile.display()));
  }

  let reorganized = reorganize_file(gemfile)?;
  let stats = reorganized.manifest.stats();
  debug!(?stats, changed = reorganized.is_changed(), "gemfile captured");

  match mode {
    Mode::Stdout => {
      print!("{}", reorganized.output);
    }
    Mode::Check => {
      if reorganized.is_changed() {
        bail!("{} is not reorganized", gemfile.display());
      }
      print_success(&format!("{} is already reorganized", gemfile.display()));
    }
    Mode::Write { output } => {
      let output_path = output.as_deref().unwrap_or(gemfile);
      print_info(&format!("Writing reorganized Gemfile to: {}", output_path.display()));
      write_manifest(output_path, &reorganized.output)?;
      print_success(&format!(
        "Wrote {} in {}",
        format_count(stats.gems, "gem"),
        format_count(stats.groups, "group")
      ));
    }
  }

  Ok(())
}
