//! Implementation of the `gemsort inspect` command.

use std::path::Path;

use anyhow::Result;

use gemsort_lib::reorganize_file;

use crate::output::{OutputFormat, format_count, print_json, print_stat};

pub fn cmd_inspect(gemfile: &Path, format: OutputFormat) -> Result<()> {
  let reorganized = reorganize_file(gemfile)?;
  let manifest = &reorganized.manifest;

  if format.is_json() {
    return print_json(manifest);
  }

  let stats = manifest.stats();
  println!("Gemfile: {}", gemfile.display());
  print_stat("Sources", &stats.sources.to_string());
  print_stat("Ruby versions", &stats.rubies.to_string());
  print_stat("Gems", &stats.gems.to_string());
  print_stat("Groups", &stats.groups.to_string());
  for group in &manifest.groups {
    println!("    {}: {}", group.key, format_count(group.gems.len(), "gem"));
  }
  print_stat("Reorganized", if reorganized.is_changed() { "no" } else { "yes" });

  Ok(())
}
