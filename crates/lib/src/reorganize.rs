//! The reorganize pipeline.
//!
//! Text in, text out: [`reorganize`] parses and captures a Gemfile, sorts it
//! with [`regroup`], and renders it. The file helpers wrap that with reading
//! and an atomic write so a failed run never leaves a half-written Gemfile.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::capture::capture_str;
use crate::dsl::ParseError;
use crate::manifest::Manifest;
use crate::regroup::regroup;
use crate::render::render;

/// Errors from reorganizing a Gemfile on disk.
#[derive(Debug, Error)]
pub enum ReorganizeError {
  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    source: ParseError,
    /// Text that failed to parse, kept for diagnostics.
    text: String,
  },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

impl ReorganizeError {
  /// Source excerpt pointing at the parse failure, if this is one.
  pub fn diagnostic(&self) -> Option<String> {
    match self {
      ReorganizeError::Parse { source, text, .. } => Some(source.render_diagnostic(text)),
      _ => None,
    }
  }
}

/// A Gemfile that has been read, captured and rendered but not yet written.
#[derive(Debug, Clone)]
pub struct Reorganized {
  /// Text as read from disk.
  pub original: String,
  /// Captured manifest in render order.
  pub manifest: Manifest,
  /// Canonical rendering of `manifest`.
  pub output: String,
}

impl Reorganized {
  /// Whether the canonical form differs from what was read.
  pub fn is_changed(&self) -> bool {
    self.original != self.output
  }
}

/// Capture Gemfile text into a manifest in render order.
pub fn evaluate(text: &str) -> Result<Manifest, ParseError> {
  let mut manifest = capture_str(text)?;
  regroup(&mut manifest);
  Ok(manifest)
}

/// Reorganize Gemfile text into its canonical form.
///
/// Reorganizing the result again returns it unchanged.
pub fn reorganize(text: &str) -> Result<String, ParseError> {
  evaluate(text).map(|manifest| render(&manifest))
}

/// Read a Gemfile from disk.
pub fn read_manifest(path: &Path) -> Result<String, ReorganizeError> {
  fs::read_to_string(path).map_err(|source| ReorganizeError::Read {
    path: path.to_path_buf(),
    source,
  })
}

/// Read and reorganize a Gemfile without writing anything.
pub fn reorganize_file(path: &Path) -> Result<Reorganized, ReorganizeError> {
  let original = read_manifest(path)?;
  let manifest = match evaluate(&original) {
    Ok(manifest) => manifest,
    Err(source) => {
      return Err(ReorganizeError::Parse {
        path: path.to_path_buf(),
        source,
        text: original,
      });
    }
  };
  let output = render(&manifest);

  debug!(
    path = %path.display(),
    gems = manifest.gem_count(),
    groups = manifest.groups.len(),
    "reorganized gemfile"
  );

  Ok(Reorganized {
    original,
    manifest,
    output,
  })
}

/// Write `contents` to `path` atomically.
///
/// The text goes to a temporary file next to `path` which is then renamed
/// over it. Permissions of an existing file are preserved. On failure the
/// temporary file is removed and `path` is left as it was.
pub fn write_manifest(path: &Path, contents: &str) -> Result<(), ReorganizeError> {
  let write_err = |source: io::Error| ReorganizeError::Write {
    path: path.to_path_buf(),
    source,
  };

  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
  temp.write_all(contents.as_bytes()).map_err(write_err)?;
  temp.as_file().sync_all().map_err(write_err)?;

  if let Ok(metadata) = fs::metadata(path) {
    temp
      .as_file()
      .set_permissions(metadata.permissions())
      .map_err(write_err)?;
  }

  temp.persist(path).map_err(|e| write_err(e.error))?;

  info!(path = %path.display(), bytes = contents.len(), "wrote gemfile");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  const MESSY: &str = r#"
source "https://rubygems.org"

gem "rails", "~> 7.1"
group :test do
  gem "rspec"
end
gem "bootsnap", require: false
"#;

  const CANONICAL: &str = "source \"https://rubygems.org\"

gem 'bootsnap', require: false
gem 'rails', '~> 7.1'

group :test do
  gem 'rspec'
end
";

  #[test]
  fn reorganize_produces_canonical_text() {
    assert_eq!(reorganize(MESSY).unwrap(), CANONICAL);
  }

  #[test]
  fn reorganize_is_idempotent() {
    let once = reorganize(MESSY).unwrap();
    let twice = reorganize(&once).unwrap();
    assert_eq!(once, twice);
  }

  #[test]
  fn reorganize_file_reports_change() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Gemfile");
    fs::write(&path, MESSY).unwrap();

    let result = reorganize_file(&path).unwrap();
    assert!(result.is_changed());
    assert_eq!(result.output, CANONICAL);
    assert_eq!(result.manifest.gem_count(), 3);

    fs::write(&path, CANONICAL).unwrap();
    assert!(!reorganize_file(&path).unwrap().is_changed());
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let temp = TempDir::new().unwrap();
    let err = reorganize_file(&temp.path().join("Gemfile")).unwrap_err();
    assert!(matches!(err, ReorganizeError::Read { .. }));
    assert!(err.diagnostic().is_none());
  }

  #[test]
  fn parse_error_carries_diagnostic() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Gemfile");
    fs::write(&path, "gem 'rails'\ngemspec\n").unwrap();

    let err = reorganize_file(&path).unwrap_err();
    assert!(err.to_string().contains("unknown statement `gemspec`"));
    assert_eq!(
      err.diagnostic().unwrap(),
      "2:1: unknown statement `gemspec`\n  gemspec\n  ^"
    );
  }

  #[test]
  fn write_manifest_replaces_contents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Gemfile");
    fs::write(&path, "old").unwrap();

    write_manifest(&path, CANONICAL).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), CANONICAL);
    let leftovers = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftovers, 1, "temporary file should not remain");
  }

  #[test]
  fn write_manifest_into_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing").join("Gemfile");

    let err = write_manifest(&path, CANONICAL).unwrap_err();
    assert!(matches!(err, ReorganizeError::Write { .. }));
    assert!(!path.exists());
  }

  #[cfg(unix)]
  #[test]
  fn write_manifest_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Gemfile");
    fs::write(&path, "old").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    write_manifest(&path, CANONICAL).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
  }
}
