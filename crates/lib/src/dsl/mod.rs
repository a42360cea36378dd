//! Restricted Gemfile front end.
//!
//! Gemfiles are Ruby, but a reorganizer only needs the literal call subset
//! they are normally written in. This module tokenizes and parses that subset
//! into a tree of [`Statement`]s without evaluating anything:
//!
//! ```ruby
//! source "https://rubygems.org"
//! ruby "3.3.0"
//!
//! gem "rails", "~> 7.1", require: false
//!
//! group :development, :test do
//!   gem "rspec-rails"
//! end
//! ```
//!
//! Literals supported as arguments: strings, symbols, numbers, `true`,
//! `false`, `nil`, arrays, hashes, and `%w[]` / `%i[]` word arrays. Control
//! flow, method chains, interpolation and block parameters are rejected with a
//! [`ParseError`] carrying the line and column of the offending token.

pub mod ast;
pub mod lexer;
pub mod parser;

use thiserror::Error;

pub use ast::{Span, Statement};

/// What went wrong while reading a Gemfile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
  #[error("unexpected character '{0}'")]
  UnexpectedChar(char),

  #[error("unterminated string literal")]
  UnterminatedString,

  #[error("unterminated word array")]
  UnterminatedWords,

  #[error("invalid escape sequence: {0}")]
  InvalidEscape(String),

  #[error("string interpolation is not supported")]
  Interpolation,

  #[error("expected {expected}, found {found}")]
  Unexpected { expected: String, found: String },

  #[error("`{0}` expressions are not supported")]
  ControlFlow(String),

  #[error("block parameters are not supported")]
  BlockParams,

  #[error("positional argument after keyword options")]
  PositionalAfterKeyword,

  #[error("unknown statement `{0}`")]
  UnknownStatement(String),

  #[error("invalid arguments to `{statement}`: {message}")]
  BadArguments { statement: String, message: String },

  #[error("`{0}` does not take a block")]
  UnexpectedBlock(String),

  #[error("`group` requires a block")]
  MissingBlock,

  #[error("nested `group` blocks are not supported")]
  NestedGroup,
}

/// A failure to read a Gemfile as statement dialect text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {}, column {}: {kind}", span.line, span.column)]
pub struct ParseError {
  pub kind: ParseErrorKind,
  pub span: Span,
}

impl ParseError {
  pub fn new(kind: ParseErrorKind, span: Span) -> Self {
    Self { kind, span }
  }

  /// Format the error with the offending source line and a caret.
  ///
  /// ```text
  /// 3:1: unknown statement `gemspec`
  ///   gemspec
  ///   ^
  /// ```
  pub fn render_diagnostic(&self, source: &str) -> String {
    let line_text = source.lines().nth(self.span.line.saturating_sub(1)).unwrap_or("");
    format!(
      "{}:{}: {}\n  {}\n  {}^",
      self.span.line,
      self.span.column,
      self.kind,
      line_text,
      " ".repeat(self.span.column.saturating_sub(1))
    )
  }
}

/// Tokenize and parse Gemfile text into statements.
pub fn parse(source: &str) -> Result<Vec<Statement>, ParseError> {
  let tokens = lexer::Lexer::new(source).lex_all()?;
  parser::Parser::new(tokens).parse_program()
}
