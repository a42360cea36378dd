//! Manifest types for gemsort.
//!
//! The manifest is the central data structure produced by capturing a Gemfile.
//! It is created empty, populated by [`crate::capture`], sorted in place by
//! [`crate::regroup`], and finally read by [`crate::render`].
//!
//! # Structure
//!
//! - `sources`: every `source` statement, in the order written
//! - `rubies`: every `ruby` statement, in the order written
//! - `groups`: dependency buckets keyed by [`GroupKey`], in first-seen order
//!
//! # Example
//!
//! ```json
//! {
//!   "sources": [{ "args": [{ "type": "str", "value": "https://rubygems.org" }] }],
//!   "rubies": [],
//!   "groups": [
//!     { "key": [], "gems": [{ "name": "rails", "args": [], "options": [] }] },
//!     { "key": ["test"], "gems": [{ "name": "rspec", "args": [], "options": [] }] }
//!   ]
//! }
//! ```

use std::fmt;

use serde::Serialize;

/// Label that is folded into the default group when it appears alone.
pub const DEFAULT_LABEL: &str = "default";

/// A literal argument value as written in the Gemfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
  /// A string literal, already unescaped.
  Str(String),
  /// A symbol, without the leading colon.
  Symbol(String),
  /// A numeric literal, kept as written (`1`, `-2`, `1_000`, `1.5`).
  Number(String),
  Bool(bool),
  Nil,
  Array(Vec<Value>),
  /// Key/value pairs in source order.
  Hash(Vec<(Value, Value)>),
}

impl Value {
  /// Returns true for empty strings and empty arrays.
  ///
  /// Blank values are dropped from rendered dependency lines.
  pub fn is_blank(&self) -> bool {
    match self {
      Value::Str(s) => s.is_empty(),
      Value::Array(items) => items.is_empty(),
      _ => false,
    }
  }

  /// Returns the label name for symbols and strings.
  pub fn as_label(&self) -> Option<&str> {
    match self {
      Value::Str(s) | Value::Symbol(s) => Some(s),
      _ => None,
    }
  }

  /// Short human readable name of the value's kind, used in error messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Value::Str(_) => "string",
      Value::Symbol(_) => "symbol",
      Value::Number(_) => "number",
      Value::Bool(_) => "boolean",
      Value::Nil => "nil",
      Value::Array(_) => "array",
      Value::Hash(_) => "hash",
    }
  }
}

/// Normalized set of group labels used to bucket dependencies.
///
/// Labels are sorted ascending with duplicates removed. The empty set is the
/// default group, which renders without a `group ... do` block. A set holding
/// only [`DEFAULT_LABEL`] normalizes to the default group as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
  /// Build a normalized key from any collection of labels.
  pub fn new<I, S>(labels: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
    labels.sort();
    labels.dedup();
    if labels.len() == 1 && labels[0] == DEFAULT_LABEL {
      labels.clear();
    }
    Self(labels)
  }

  /// The default (ungrouped) key.
  pub fn default_group() -> Self {
    Self(Vec::new())
  }

  pub fn is_default(&self) -> bool {
    self.0.is_empty()
  }

  /// Sorted labels of this key.
  pub fn labels(&self) -> &[String] {
    &self.0
  }
}

impl fmt::Display for GroupKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_default() {
      write!(f, "{}", DEFAULT_LABEL)
    } else {
      write!(f, "{}", self.0.join(", "))
    }
  }
}

/// A captured `source` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDecl {
  pub args: Vec<Value>,
}

/// A captured `ruby` version pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubyDecl {
  pub args: Vec<Value>,
}

/// A captured `gem` statement.
///
/// The `group:` option is never stored here; it is consumed during capture
/// and reflected only by the [`GroupKey`] the declaration is bucketed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GemDecl {
  /// Gem name, the first positional argument.
  pub name: String,
  /// Remaining positional arguments (version requirements and the like).
  pub args: Vec<Value>,
  /// Keyword options with unique keys, in source order.
  pub options: Vec<(Value, Value)>,
}

impl GemDecl {
  #[cfg(test)]
  pub(crate) fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      args: Vec::new(),
      options: Vec::new(),
    }
  }
}

/// A dependency bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
  pub key: GroupKey,
  pub gems: Vec<GemDecl>,
}

/// Counts describing a manifest, for progress output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ManifestStats {
  pub sources: usize,
  pub rubies: usize,
  pub groups: usize,
  pub gems: usize,
}

/// The complete captured Gemfile.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
  /// Source declarations, in the order written. Never deduplicated.
  pub sources: Vec<SourceDecl>,
  /// Ruby version declarations, in the order written.
  pub rubies: Vec<RubyDecl>,
  /// Dependency buckets in first-seen order of their key.
  pub groups: Vec<Group>,
}

impl Manifest {
  /// Append a gem to the bucket for `key`, creating the bucket on first use.
  pub fn push_gem(&mut self, key: GroupKey, gem: GemDecl) {
    match self.groups.iter_mut().find(|group| group.key == key) {
      Some(group) => group.gems.push(gem),
      None => self.groups.push(Group { key, gems: vec![gem] }),
    }
  }

  /// Look up the bucket for `key`.
  pub fn group(&self, key: &GroupKey) -> Option<&Group> {
    self.groups.iter().find(|group| &group.key == key)
  }

  pub fn gem_count(&self) -> usize {
    self.groups.iter().map(|group| group.gems.len()).sum()
  }

  pub fn stats(&self) -> ManifestStats {
    ManifestStats {
      sources: self.sources.len(),
      rubies: self.rubies.len(),
      groups: self.groups.len(),
      gems: self.gem_count(),
    }
  }
}
