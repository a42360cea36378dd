//! Statement capture.
//!
//! Walks parsed Gemfile statements once, in textual order, and records them in
//! a [`Manifest`]. Exactly four statement forms are understood:
//!
//! - `source(...)` appends a [`SourceDecl`]
//! - `ruby(...)` appends a [`RubyDecl`]
//! - `gem(name, ...)` appends a [`GemDecl`] to the bucket for its group
//! - `group(labels...) do ... end` sets the group scope for nested `gem`s
//!
//! Anything else is rejected. Nothing is executed.
//!
//! # Group resolution
//!
//! A `gem` inside a `group` block always lands in the block's group; its own
//! `group:` option is stripped and ignored. Outside a block the `group:` option
//! decides, and without one the gem goes to the default group.
//!
//! The active scope lives on the capture context and is set through a
//! guard that restores the previous scope when dropped, so every exit path out
//! of a block (including errors) leaves the context clean. Blocks do not nest.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::dsl::{self, ParseError, ParseErrorKind, Statement};
use crate::manifest::{GemDecl, GroupKey, Manifest, RubyDecl, SourceDecl, Value};

const GROUP_OPTION: &str = "group";

/// Parse Gemfile text and capture its statements.
pub fn capture_str(source: &str) -> Result<Manifest, ParseError> {
  let statements = dsl::parse(source)?;
  capture(&statements)
}

/// Capture parsed statements into a fresh manifest.
///
/// The manifest is returned only if every statement was captured.
pub fn capture(statements: &[Statement]) -> Result<Manifest, ParseError> {
  let mut manifest = Manifest::default();
  Capture::new(&mut manifest).eval_all(statements)?;
  debug!(
    sources = manifest.sources.len(),
    rubies = manifest.rubies.len(),
    gems = manifest.gem_count(),
    "captured gemfile"
  );
  Ok(manifest)
}

/// Evaluation context for a single capture pass.
struct Capture<'m> {
  manifest: &'m mut Manifest,
  /// Labels of the enclosing `group` block, if any.
  scope: Option<GroupKey>,
}

impl<'m> Capture<'m> {
  fn new(manifest: &'m mut Manifest) -> Self {
    Self { manifest, scope: None }
  }

  fn eval_all(&mut self, statements: &[Statement]) -> Result<(), ParseError> {
    for statement in statements {
      self.eval(statement)?;
    }
    Ok(())
  }

  fn eval(&mut self, stmt: &Statement) -> Result<(), ParseError> {
    if stmt.block.is_some() && stmt.name != "group" {
      return Err(ParseError::new(
        ParseErrorKind::UnexpectedBlock(stmt.name.clone()),
        stmt.span,
      ));
    }

    match stmt.name.as_str() {
      "source" => {
        require_args(stmt)?;
        debug!(line = stmt.span.line, "captured source");
        self.manifest.sources.push(SourceDecl {
          args: stmt.args.clone(),
        });
        Ok(())
      }
      "ruby" => {
        require_args(stmt)?;
        debug!(line = stmt.span.line, "captured ruby version");
        self.manifest.rubies.push(RubyDecl {
          args: stmt.args.clone(),
        });
        Ok(())
      }
      "gem" => self.capture_gem(stmt),
      "group" => self.capture_group(stmt),
      other => Err(ParseError::new(
        ParseErrorKind::UnknownStatement(other.to_string()),
        stmt.span,
      )),
    }
  }

  fn capture_gem(&mut self, stmt: &Statement) -> Result<(), ParseError> {
    let (name, rest) = match stmt.args.split_first() {
      Some((Value::Str(name), rest)) if !name.is_empty() => (name.clone(), rest),
      Some((Value::Str(_), _)) => return Err(bad_args(stmt, "gem name must not be empty")),
      Some((other, _)) => {
        return Err(bad_args(
          stmt,
          &format!("gem name must be a string, found {}", other.kind()),
        ));
      }
      None => return Err(bad_args(stmt, "expected a gem name")),
    };

    let mut args = rest.to_vec();
    let pairs = match args.pop() {
      Some(Value::Hash(pairs)) => pairs,
      Some(other) => {
        args.push(other);
        Vec::new()
      }
      None => Vec::new(),
    };
    let mut options = merge_options(&name, pairs);
    let group_option = take_option(&mut options, GROUP_OPTION);

    let key = match (&self.scope, group_option) {
      (Some(scope), option) => {
        if option.is_some() {
          debug!(gem = %name, group = %scope, "ignoring group option inside group block");
        }
        scope.clone()
      }
      (None, Some(value)) => labels_from_option(stmt, &value)?,
      (None, None) => GroupKey::default_group(),
    };

    debug!(gem = %name, group = %key, "captured gem");
    self.manifest.push_gem(key, GemDecl { name, args, options });
    Ok(())
  }

  fn capture_group(&mut self, stmt: &Statement) -> Result<(), ParseError> {
    let body = stmt
      .block
      .as_ref()
      .ok_or_else(|| ParseError::new(ParseErrorKind::MissingBlock, stmt.span))?;
    if self.scope.is_some() {
      return Err(ParseError::new(ParseErrorKind::NestedGroup, stmt.span));
    }
    if stmt.args.is_empty() {
      return Err(bad_args(stmt, "expected at least one group label"));
    }

    let mut labels = Vec::with_capacity(stmt.args.len());
    for arg in &stmt.args {
      match arg {
        Value::Symbol(label) | Value::Str(label) => labels.push(label.clone()),
        other => {
          return Err(bad_args(
            stmt,
            &format!("group labels must be symbols or strings, found {}", other.kind()),
          ));
        }
      }
    }
    let key = GroupKey::new(labels);

    debug!(group = %key, statements = body.len(), "entering group block");
    let mut scoped = self.enter_group(key);
    scoped.eval_all(body)
  }

  /// Make `key` the active scope until the returned guard is dropped.
  fn enter_group(&mut self, key: GroupKey) -> ScopeGuard<'_, 'm> {
    let previous = self.scope.replace(key);
    ScopeGuard {
      capture: self,
      previous,
    }
  }
}

/// Restores the enclosing group scope on drop.
struct ScopeGuard<'a, 'm> {
  capture: &'a mut Capture<'m>,
  previous: Option<GroupKey>,
}

impl<'m> Deref for ScopeGuard<'_, 'm> {
  type Target = Capture<'m>;

  fn deref(&self) -> &Self::Target {
    &*self.capture
  }
}

impl DerefMut for ScopeGuard<'_, '_> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut *self.capture
  }
}

impl Drop for ScopeGuard<'_, '_> {
  fn drop(&mut self) {
    self.capture.scope = self.previous.take();
  }
}

fn require_args(stmt: &Statement) -> Result<(), ParseError> {
  if stmt.args.is_empty() {
    return Err(bad_args(stmt, "expected at least one argument"));
  }
  Ok(())
}

fn bad_args(stmt: &Statement, message: &str) -> ParseError {
  ParseError::new(
    ParseErrorKind::BadArguments {
      statement: stmt.name.clone(),
      message: message.to_string(),
    },
    stmt.span,
  )
}

/// Collapse duplicate keys: the first occurrence keeps its position, the last
/// value wins.
fn merge_options(gem: &str, pairs: Vec<(Value, Value)>) -> Vec<(Value, Value)> {
  let mut options: Vec<(Value, Value)> = Vec::with_capacity(pairs.len());
  for (key, value) in pairs {
    match options.iter_mut().find(|(existing, _)| *existing == key) {
      Some(slot) => {
        warn!(gem = %gem, option = ?key, "duplicate option, keeping the last value");
        slot.1 = value;
      }
      None => options.push((key, value)),
    }
  }
  options
}

/// Remove the option with symbol key `name` and return its value.
fn take_option(options: &mut Vec<(Value, Value)>, name: &str) -> Option<Value> {
  let index = options
    .iter()
    .position(|(key, _)| matches!(key, Value::Symbol(key) if key == name))?;
  Some(options.remove(index).1)
}

fn labels_from_option(stmt: &Statement, value: &Value) -> Result<GroupKey, ParseError> {
  let invalid = || bad_args(stmt, "group option must be a symbol, a string, or an array of them");
  match value {
    Value::Symbol(label) | Value::Str(label) => Ok(GroupKey::new([label.as_str()])),
    Value::Array(items) => {
      let labels = items
        .iter()
        .map(|item| item.as_label().ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()?;
      Ok(GroupKey::new(labels))
    }
    _ => Err(invalid()),
  }
}
