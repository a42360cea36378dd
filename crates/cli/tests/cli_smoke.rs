//! CLI smoke tests for gemsort.
//!
//! These tests run the `gemsort` binary against Gemfiles in temporary
//! directories and check exit codes, output, and what ends up on disk.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the gemsort binary.
fn gemsort_cmd() -> Command {
  cargo_bin_cmd!("gemsort")
}

/// Create a temp directory holding a Gemfile with `content`.
fn temp_gemfile(content: &str) -> (TempDir, PathBuf) {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("Gemfile");
  std::fs::write(&path, content).unwrap();
  (temp, path)
}

const MESSY: &str = r#"source "https://rubygems.org"
ruby "3.3.0"

gem "rails", "~> 7.1"
group :test, :development do
  gem "rspec-rails"
  gem "debug", platforms: %i[mri windows]
end
gem "bootsnap", require: false
gem "pg", "~> 1.1"
group :test do
  gem "capybara"
end
group :development, :test do
  gem "factory_bot_rails"
end
"#;

const CANONICAL: &str = r#"source "https://rubygems.org"
ruby "3.3.0"

gem 'bootsnap', require: false
gem 'pg', '~> 1.1'
gem 'rails', '~> 7.1'

group :development, :test do
  gem 'debug', platforms: [:mri, :windows]
  gem 'factory_bot_rails'
  gem 'rspec-rails'
end

group :test do
  gem 'capybara'
end
"#;

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  gemsort_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  gemsort_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("gemsort"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["reorganize", "inspect"] {
    gemsort_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

#[test]
fn missing_subcommand_fails() {
  gemsort_cmd().assert().failure();
}

// =============================================================================
// Reorganize
// =============================================================================

#[test]
fn reorganize_rewrites_in_place() {
  let (_temp, path) = temp_gemfile(MESSY);

  gemsort_cmd()
    .arg("reorganize")
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Parsing Gemfile"))
    .stdout(predicate::str::contains("Wrote 6 gems in 3 groups"));

  assert_eq!(std::fs::read_to_string(&path).unwrap(), CANONICAL);
}

#[test]
fn reorganize_twice_is_stable() {
  let (_temp, path) = temp_gemfile(MESSY);

  gemsort_cmd().arg("reorganize").arg(&path).assert().success();
  gemsort_cmd().arg("reorganize").arg(&path).assert().success();

  assert_eq!(std::fs::read_to_string(&path).unwrap(), CANONICAL);
}

#[test]
fn reorganize_to_output_leaves_input_alone() {
  let (temp, path) = temp_gemfile(MESSY);
  let output = temp.path().join("Gemfile.sorted");

  gemsort_cmd()
    .arg("reorganize")
    .arg(&path)
    .arg("--output")
    .arg(&output)
    .assert()
    .success();

  assert_eq!(std::fs::read_to_string(&path).unwrap(), MESSY);
  assert_eq!(std::fs::read_to_string(&output).unwrap(), CANONICAL);
}

#[test]
fn reorganize_stdout_prints_only_the_gemfile() {
  let (_temp, path) = temp_gemfile(MESSY);

  gemsort_cmd()
    .arg("reorganize")
    .arg(&path)
    .arg("--stdout")
    .assert()
    .success()
    .stdout(predicate::eq(CANONICAL));

  assert_eq!(std::fs::read_to_string(&path).unwrap(), MESSY);
}

#[test]
fn check_fails_on_unsorted_gemfile() {
  let (_temp, path) = temp_gemfile(MESSY);

  gemsort_cmd()
    .arg("reorganize")
    .arg(&path)
    .arg("--check")
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not reorganized"));

  assert_eq!(std::fs::read_to_string(&path).unwrap(), MESSY);
}

#[test]
fn check_passes_on_canonical_gemfile() {
  let (_temp, path) = temp_gemfile(CANONICAL);

  gemsort_cmd()
    .arg("reorganize")
    .arg(&path)
    .arg("--check")
    .assert()
    .success()
    .stdout(predicate::str::contains("already reorganized"));
}

#[test]
fn check_conflicts_with_stdout() {
  let (_temp, path) = temp_gemfile(CANONICAL);

  gemsort_cmd()
    .arg("reorganize")
    .arg(&path)
    .arg("--check")
    .arg("--stdout")
    .assert()
    .failure();
}

#[test]
fn parse_error_keeps_gemfile_and_shows_location() {
  let content = "gem 'rails'\nif ENV['CI']\n  gem 'simplecov'\nend\n";
  let (_temp, path) = temp_gemfile(content);

  gemsort_cmd()
    .arg("reorganize")
    .arg(&path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to parse"))
    .stderr(predicate::str::contains("2:1:"))
    .stderr(predicate::str::contains("if ENV['CI']"));

  assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn missing_gemfile_fails() {
  let temp = TempDir::new().unwrap();

  gemsort_cmd()
    .arg("reorganize")
    .arg(temp.path().join("Gemfile"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to read"));
}

// =============================================================================
// Inspect
// =============================================================================

#[test]
fn inspect_text_lists_groups() {
  let (_temp, path) = temp_gemfile(MESSY);

  gemsort_cmd()
    .arg("inspect")
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Gems: 6"))
    .stdout(predicate::str::contains("development, test: 3 gems"))
    .stdout(predicate::str::contains("Reorganized: no"));
}

#[test]
fn inspect_json_is_valid() {
  let (_temp, path) = temp_gemfile(CANONICAL);

  let output = gemsort_cmd()
    .arg("inspect")
    .arg(&path)
    .arg("--format")
    .arg("json")
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["groups"][0]["key"], serde_json::json!([]));
  assert_eq!(json["groups"][1]["key"], serde_json::json!(["development", "test"]));
  assert_eq!(json["groups"][0]["gems"][0]["name"], "bootsnap");
}
