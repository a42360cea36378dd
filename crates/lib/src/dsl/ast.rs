use serde::Serialize;

use crate::manifest::Value;

/// 1-based position of a token in the Gemfile text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
  pub line: usize,
  pub column: usize,
}

impl Span {
  pub fn new(line: usize, column: usize) -> Self {
    Self { line, column }
  }
}

/// A single call statement such as `gem "rails", "~> 7.1"`.
///
/// Bare keyword pairs are folded into one trailing [`Value::Hash`] argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
  pub name: String,
  pub span: Span,
  pub args: Vec<Value>,
  /// Nested statements of a `do ... end` or `{ ... }` block.
  pub block: Option<Vec<Statement>>,
}
