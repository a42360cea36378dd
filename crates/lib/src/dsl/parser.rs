use super::ast::Statement;
use super::lexer::{Keyword, Punct, Token, TokenKind};
use super::{ParseError, ParseErrorKind};
use crate::manifest::Value;

/// Ruby keywords that start control flow or definitions.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
  "if", "unless", "while", "until", "case", "for", "begin", "def", "class", "module", "return",
];

/// Where a statement list stops.
#[derive(Clone, Copy, PartialEq)]
enum Terminator {
  Eof,
  End,
  RBrace,
}

pub struct Parser {
  tokens: Vec<Token>,
  pos: usize,
}

impl Parser {
  pub fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, pos: 0 }
  }

  pub fn parse_program(&mut self) -> Result<Vec<Statement>, ParseError> {
    self.parse_statements(Terminator::Eof)
  }

  fn parse_statements(&mut self, terminator: Terminator) -> Result<Vec<Statement>, ParseError> {
    let mut statements = Vec::new();
    loop {
      self.skip_newlines();
      if self.at_terminator(terminator) {
        return Ok(statements);
      }
      if self.at(&TokenKind::Eof) {
        let expected = match terminator {
          Terminator::RBrace => "`}`",
          _ => "`end`",
        };
        return Err(self.unexpected(expected));
      }

      statements.push(self.parse_statement()?);

      if !self.at(&TokenKind::Newline) && !self.at_terminator(terminator) {
        return Err(self.unexpected("end of statement"));
      }
    }
  }

  fn parse_statement(&mut self) -> Result<Statement, ParseError> {
    let token = self.peek().clone();
    let name = match token.kind {
      TokenKind::Ident(name) => name,
      _ => return Err(self.unexpected("statement")),
    };
    if UNSUPPORTED_KEYWORDS.contains(&name.as_str()) {
      return Err(ParseError::new(ParseErrorKind::ControlFlow(name), token.span));
    }
    self.advance();

    let mut args = Vec::new();
    let mut block = None;

    if self.at_punct(Punct::LParen) {
      self.advance();
      args = self.parse_args(true)?;
      self.expect_punct(Punct::RParen)?;
      if self.at_punct(Punct::LBrace) || self.at_keyword(Keyword::Do) {
        block = Some(self.parse_block()?);
      }
    } else if self.at_punct(Punct::LBrace) || self.at_keyword(Keyword::Do) {
      block = Some(self.parse_block()?);
    } else if !self.at_statement_end() {
      args = self.parse_args(false)?;
      if self.at_keyword(Keyword::Do) {
        block = Some(self.parse_block()?);
      }
    }

    Ok(Statement {
      name,
      span: token.span,
      args,
      block,
    })
  }

  fn parse_block(&mut self) -> Result<Vec<Statement>, ParseError> {
    let terminator = if self.at_punct(Punct::LBrace) {
      Terminator::RBrace
    } else {
      Terminator::End
    };
    self.advance();

    self.skip_newlines();
    if self.at_punct(Punct::Pipe) {
      return Err(ParseError::new(ParseErrorKind::BlockParams, self.peek().span));
    }

    let body = self.parse_statements(terminator)?;
    self.advance(); // terminator
    Ok(body)
  }

  /// Call arguments, with bare keyword pairs collected into a trailing hash.
  fn parse_args(&mut self, parenthesized: bool) -> Result<Vec<Value>, ParseError> {
    let mut args = Vec::new();
    let mut pairs = Vec::new();

    if parenthesized {
      self.skip_newlines();
      if self.at_punct(Punct::RParen) {
        return Ok(args);
      }
    }

    loop {
      if parenthesized {
        self.skip_newlines();
      }

      let span = self.peek().span;
      match self.parse_entry()? {
        Entry::Pair(key, value) => pairs.push((key, value)),
        Entry::Value(value) => {
          if !pairs.is_empty() {
            return Err(ParseError::new(ParseErrorKind::PositionalAfterKeyword, span));
          }
          args.push(value);
        }
      }

      if parenthesized {
        self.skip_newlines();
      }
      if !self.at_punct(Punct::Comma) {
        break;
      }
      self.advance();
      self.skip_newlines();
      if parenthesized && self.at_punct(Punct::RParen) {
        break;
      }
    }

    if !pairs.is_empty() {
      args.push(Value::Hash(pairs));
    }
    Ok(args)
  }

  /// Either `label: value`, `key => value`, or a plain value.
  fn parse_entry(&mut self) -> Result<Entry, ParseError> {
    if let TokenKind::Label(name) = &self.peek().kind {
      let key = Value::Symbol(name.clone());
      self.advance();
      self.skip_newlines();
      let value = self.parse_value()?;
      return Ok(Entry::Pair(key, value));
    }

    let value = self.parse_value()?;
    if self.at_punct(Punct::FatArrow) {
      self.advance();
      self.skip_newlines();
      let target = self.parse_value()?;
      return Ok(Entry::Pair(value, target));
    }
    Ok(Entry::Value(value))
  }

  fn parse_value(&mut self) -> Result<Value, ParseError> {
    let token = self.peek().clone();
    let value = match token.kind {
      TokenKind::Str(text) => Value::Str(text),
      TokenKind::Symbol(name) => Value::Symbol(name),
      TokenKind::Number(text) => Value::Number(text),
      TokenKind::Keyword(Keyword::True) => Value::Bool(true),
      TokenKind::Keyword(Keyword::False) => Value::Bool(false),
      TokenKind::Keyword(Keyword::Nil) => Value::Nil,
      TokenKind::Words { symbols, items } => Value::Array(
        items
          .into_iter()
          .map(|item| if symbols { Value::Symbol(item) } else { Value::Str(item) })
          .collect(),
      ),
      TokenKind::Punct(Punct::LBracket) => return self.parse_array(),
      TokenKind::Punct(Punct::LBrace) => return self.parse_hash(),
      _ => return Err(self.unexpected("a literal value")),
    };
    self.advance();
    Ok(value)
  }

  fn parse_array(&mut self) -> Result<Value, ParseError> {
    self.advance(); // [
    let mut items = Vec::new();
    loop {
      self.skip_newlines();
      if self.at_punct(Punct::RBracket) {
        break;
      }
      items.push(self.parse_value()?);
      self.skip_newlines();
      if self.at_punct(Punct::Comma) {
        self.advance();
      } else if !self.at_punct(Punct::RBracket) {
        return Err(self.unexpected("`,` or `]`"));
      }
    }
    self.advance(); // ]
    Ok(Value::Array(items))
  }

  fn parse_hash(&mut self) -> Result<Value, ParseError> {
    self.advance(); // {
    let mut pairs = Vec::new();
    loop {
      self.skip_newlines();
      if self.at_punct(Punct::RBrace) {
        break;
      }
      match self.parse_entry()? {
        Entry::Pair(key, value) => pairs.push((key, value)),
        Entry::Value(_) => return Err(self.unexpected("`=>`")),
      }
      self.skip_newlines();
      if self.at_punct(Punct::Comma) {
        self.advance();
      } else if !self.at_punct(Punct::RBrace) {
        return Err(self.unexpected("`,` or `}`"));
      }
    }
    self.advance(); // }
    Ok(Value::Hash(pairs))
  }

  fn expect_punct(&mut self, punct: Punct) -> Result<(), ParseError> {
    self.skip_newlines();
    if !self.at_punct(punct) {
      return Err(self.unexpected(&format!("`{}`", punct.as_str())));
    }
    self.advance();
    Ok(())
  }

  fn unexpected(&self, expected: &str) -> ParseError {
    let token = self.peek();
    ParseError::new(
      ParseErrorKind::Unexpected {
        expected: expected.to_string(),
        found: token.kind.describe(),
      },
      token.span,
    )
  }

  fn skip_newlines(&mut self) {
    while self.at(&TokenKind::Newline) {
      self.advance();
    }
  }

  fn at_statement_end(&self) -> bool {
    matches!(
      self.peek().kind,
      TokenKind::Newline
        | TokenKind::Eof
        | TokenKind::Keyword(Keyword::End)
        | TokenKind::Punct(Punct::RBrace)
    )
  }

  fn at_terminator(&self, terminator: Terminator) -> bool {
    match terminator {
      Terminator::Eof => self.at(&TokenKind::Eof),
      Terminator::End => self.at_keyword(Keyword::End),
      Terminator::RBrace => self.at_punct(Punct::RBrace),
    }
  }

  fn at(&self, kind: &TokenKind) -> bool {
    &self.peek().kind == kind
  }

  fn at_punct(&self, punct: Punct) -> bool {
    self.peek().kind == TokenKind::Punct(punct)
  }

  fn at_keyword(&self, keyword: Keyword) -> bool {
    self.peek().kind == TokenKind::Keyword(keyword)
  }

  fn peek(&self) -> &Token {
    // The lexer always ends the stream with Eof, which is never consumed.
    &self.tokens[self.pos.min(self.tokens.len() - 1)]
  }

  fn advance(&mut self) {
    if self.pos < self.tokens.len() - 1 {
      self.pos += 1;
    }
  }
}

enum Entry {
  Pair(Value, Value),
  Value(Value),
}
