use super::ast::Span;
use super::{ParseError, ParseErrorKind};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
  Ident(String),
  /// `name:` or `"name":` hash key.
  Label(String),
  Str(String),
  Symbol(String),
  Number(String),
  /// `%w[...]` (strings) or `%i[...]` (symbols).
  Words { symbols: bool, items: Vec<String> },
  Keyword(Keyword),
  Punct(Punct),
  /// Newline or `;`.
  Newline,
  Eof,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Keyword {
  Do,
  End,
  True,
  False,
  Nil,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Punct {
  LParen,
  RParen,
  LBracket,
  RBracket,
  LBrace,
  RBrace,
  Comma,
  FatArrow,
  Pipe,
}

impl TokenKind {
  /// Description used in "expected X, found Y" errors.
  pub fn describe(&self) -> String {
    match self {
      TokenKind::Ident(name) => format!("`{}`", name),
      TokenKind::Label(name) => format!("label `{}:`", name),
      TokenKind::Str(_) => "string".to_string(),
      TokenKind::Symbol(name) => format!("symbol `:{}`", name),
      TokenKind::Number(text) => format!("number `{}`", text),
      TokenKind::Words { .. } => "word array".to_string(),
      TokenKind::Keyword(kw) => format!("`{}`", kw.as_str()),
      TokenKind::Punct(p) => format!("`{}`", p.as_str()),
      TokenKind::Newline => "end of line".to_string(),
      TokenKind::Eof => "end of file".to_string(),
    }
  }
}

impl Keyword {
  pub fn as_str(self) -> &'static str {
    match self {
      Keyword::Do => "do",
      Keyword::End => "end",
      Keyword::True => "true",
      Keyword::False => "false",
      Keyword::Nil => "nil",
    }
  }
}

impl Punct {
  pub fn as_str(self) -> &'static str {
    match self {
      Punct::LParen => "(",
      Punct::RParen => ")",
      Punct::LBracket => "[",
      Punct::RBracket => "]",
      Punct::LBrace => "{",
      Punct::RBrace => "}",
      Punct::Comma => ",",
      Punct::FatArrow => "=>",
      Punct::Pipe => "|",
    }
  }
}

#[derive(Clone, Debug)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
}

pub struct Lexer {
  chars: Vec<char>,
  idx: usize,
  line: usize,
  col: usize,
}

impl Lexer {
  pub fn new(src: &str) -> Self {
    Self {
      chars: src.chars().collect(),
      idx: 0,
      line: 1,
      col: 1,
    }
  }

  pub fn lex_all(mut self) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    loop {
      let tok = self.next_token()?;
      let is_eof = matches!(tok.kind, TokenKind::Eof);
      tokens.push(tok);
      if is_eof {
        break;
      }
    }
    Ok(tokens)
  }

  fn next_token(&mut self) -> Result<Token, ParseError> {
    self.skip_whitespace_and_comments();
    let span = self.span();
    let Some(ch) = self.peek() else {
      return Ok(Token {
        kind: TokenKind::Eof,
        span,
      });
    };

    let kind = match ch {
      '\n' | ';' => {
        self.bump();
        TokenKind::Newline
      }
      c if is_ident_start(c) => self.lex_ident(),
      '"' | '\'' => {
        let text = self.lex_string(ch, span)?;
        if self.at_label_colon() {
          self.bump();
          TokenKind::Label(text)
        } else {
          TokenKind::Str(text)
        }
      }
      ':' => self.lex_symbol(span)?,
      c if c.is_ascii_digit() => self.lex_number(),
      '-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(),
      '%' if matches!(self.peek_at(1), Some('w' | 'i')) => self.lex_words(span)?,
      '=' if self.peek_at(1) == Some('>') => {
        self.bump();
        self.bump();
        TokenKind::Punct(Punct::FatArrow)
      }
      '(' => self.punct(Punct::LParen),
      ')' => self.punct(Punct::RParen),
      '[' => self.punct(Punct::LBracket),
      ']' => self.punct(Punct::RBracket),
      '{' => self.punct(Punct::LBrace),
      '}' => self.punct(Punct::RBrace),
      ',' => self.punct(Punct::Comma),
      '|' => self.punct(Punct::Pipe),
      other => return Err(ParseError::new(ParseErrorKind::UnexpectedChar(other), span)),
    };

    Ok(Token { kind, span })
  }

  fn punct(&mut self, punct: Punct) -> TokenKind {
    self.bump();
    TokenKind::Punct(punct)
  }

  fn lex_ident(&mut self) -> TokenKind {
    let name = self.read_name();
    if self.at_label_colon() {
      self.bump();
      return TokenKind::Label(name);
    }
    match name.as_str() {
      "do" => TokenKind::Keyword(Keyword::Do),
      "end" => TokenKind::Keyword(Keyword::End),
      "true" => TokenKind::Keyword(Keyword::True),
      "false" => TokenKind::Keyword(Keyword::False),
      "nil" => TokenKind::Keyword(Keyword::Nil),
      _ => TokenKind::Ident(name),
    }
  }

  /// Identifier with an optional trailing `?` or `!`.
  fn read_name(&mut self) -> String {
    let mut name = String::new();
    while let Some(c) = self.peek() {
      if !is_ident_continue(c) {
        break;
      }
      name.push(c);
      self.bump();
    }
    if let Some(c @ ('?' | '!')) = self.peek() {
      // `!=` is an operator, not part of the name
      if self.peek_at(1) != Some('=') {
        name.push(c);
        self.bump();
      }
    }
    name
  }

  /// A single `:` directly after a name or string turns it into a hash label.
  fn at_label_colon(&self) -> bool {
    self.peek() == Some(':') && self.peek_at(1) != Some(':')
  }

  fn lex_symbol(&mut self, span: Span) -> Result<TokenKind, ParseError> {
    match self.peek_at(1) {
      Some(quote @ ('"' | '\'')) => {
        self.bump();
        let text = self.lex_string(quote, span)?;
        Ok(TokenKind::Symbol(text))
      }
      Some(c) if is_ident_start(c) => {
        self.bump();
        Ok(TokenKind::Symbol(self.read_name()))
      }
      _ => Err(ParseError::new(ParseErrorKind::UnexpectedChar(':'), span)),
    }
  }

  fn lex_number(&mut self) -> TokenKind {
    let mut text = String::new();
    if self.peek() == Some('-') {
      text.push('-');
      self.bump();
    }
    self.read_digits(&mut text);
    if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
      text.push('.');
      self.bump();
      self.read_digits(&mut text);
    }
    TokenKind::Number(text)
  }

  fn read_digits(&mut self, text: &mut String) {
    while let Some(c) = self.peek() {
      if c.is_ascii_digit() || (c == '_' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) {
        text.push(c);
        self.bump();
      } else {
        break;
      }
    }
  }

  fn lex_words(&mut self, span: Span) -> Result<TokenKind, ParseError> {
    self.bump(); // %
    let symbols = self.bump() == Some('i');
    let open = match self.bump() {
      Some(c) if !c.is_alphanumeric() && !c.is_whitespace() => c,
      Some(c) => return Err(ParseError::new(ParseErrorKind::UnexpectedChar(c), self.span())),
      None => return Err(ParseError::new(ParseErrorKind::UnterminatedWords, span)),
    };
    let close = match open {
      '[' => ']',
      '(' => ')',
      '{' => '}',
      '<' => '>',
      other => other,
    };

    let mut items = Vec::new();
    let mut word = String::new();
    loop {
      match self.bump() {
        None => return Err(ParseError::new(ParseErrorKind::UnterminatedWords, span)),
        Some(c) if c == close => break,
        Some(c) if c.is_whitespace() => {
          if !word.is_empty() {
            items.push(std::mem::take(&mut word));
          }
        }
        Some(c) => word.push(c),
      }
    }
    if !word.is_empty() {
      items.push(word);
    }

    Ok(TokenKind::Words { symbols, items })
  }

  fn lex_string(&mut self, quote: char, span: Span) -> Result<String, ParseError> {
    self.bump(); // opening quote
    let mut text = String::new();
    loop {
      let Some(c) = self.bump() else {
        return Err(ParseError::new(ParseErrorKind::UnterminatedString, span));
      };
      match c {
        c if c == quote => return Ok(text),
        '\\' if quote == '"' => self.read_escape(&mut text, span)?,
        '\\' => match self.peek() {
          Some(next @ ('\\' | '\'')) => {
            text.push(next);
            self.bump();
          }
          _ => text.push('\\'),
        },
        '#' if quote == '"' && matches!(self.peek(), Some('{' | '@' | '$')) => {
          let at = Span::new(self.line, self.col - 1);
          return Err(ParseError::new(ParseErrorKind::Interpolation, at));
        }
        c => text.push(c),
      }
    }
  }

  fn read_escape(&mut self, text: &mut String, span: Span) -> Result<(), ParseError> {
    let escape_span = Span::new(self.line, self.col - 1);
    let Some(c) = self.bump() else {
      return Err(ParseError::new(ParseErrorKind::UnterminatedString, span));
    };
    match c {
      'n' => text.push('\n'),
      't' => text.push('\t'),
      'r' => text.push('\r'),
      's' => text.push(' '),
      '0' => text.push('\0'),
      'e' => text.push('\u{1b}'),
      'a' => text.push('\u{7}'),
      'b' => text.push('\u{8}'),
      'f' => text.push('\u{c}'),
      'v' => text.push('\u{b}'),
      '\n' => {}
      'u' => self.read_unicode_escape(text, escape_span)?,
      other => text.push(other),
    }
    Ok(())
  }

  /// `\uXXXX` or `\u{X...}` with one or more space separated code points.
  fn read_unicode_escape(&mut self, text: &mut String, span: Span) -> Result<(), ParseError> {
    let invalid = |seq: &str| ParseError::new(ParseErrorKind::InvalidEscape(format!("\\u{}", seq)), span);

    if self.peek() == Some('{') {
      self.bump();
      let mut body = String::new();
      loop {
        match self.bump() {
          Some('}') => break,
          Some(c) if c == '"' || c == '\n' => return Err(invalid(&format!("{{{}", body))),
          Some(c) => body.push(c),
          None => return Err(invalid(&format!("{{{}", body))),
        }
      }
      let codes: Vec<&str> = body.split_whitespace().collect();
      if codes.is_empty() {
        return Err(invalid(&format!("{{{}}}", body)));
      }
      for code in codes {
        let ch = u32::from_str_radix(code, 16)
          .ok()
          .and_then(char::from_u32)
          .ok_or_else(|| invalid(&format!("{{{}}}", body)))?;
        text.push(ch);
      }
      return Ok(());
    }

    let mut hex = String::new();
    for _ in 0..4 {
      match self.peek() {
        Some(c) if c.is_ascii_hexdigit() => {
          hex.push(c);
          self.bump();
        }
        _ => return Err(invalid(&hex)),
      }
    }
    let ch = u32::from_str_radix(&hex, 16)
      .ok()
      .and_then(char::from_u32)
      .ok_or_else(|| invalid(&hex))?;
    text.push(ch);
    Ok(())
  }

  fn skip_whitespace_and_comments(&mut self) {
    loop {
      match self.peek() {
        Some(' ' | '\t' | '\r') => {
          self.bump();
        }
        Some('\\') if self.peek_at(1) == Some('\n') => {
          self.bump();
          self.bump();
        }
        Some('#') => {
          while let Some(c) = self.peek() {
            if c == '\n' {
              break;
            }
            self.bump();
          }
        }
        _ => break,
      }
    }
  }

  fn span(&self) -> Span {
    Span::new(self.line, self.col)
  }

  fn peek(&self) -> Option<char> {
    self.chars.get(self.idx).copied()
  }

  fn peek_at(&self, offset: usize) -> Option<char> {
    self.chars.get(self.idx + offset).copied()
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.idx += 1;
    if c == '\n' {
      self.line += 1;
      self.col = 1;
    } else {
      self.col += 1;
    }
    Some(c)
  }
}

pub(crate) fn is_ident_start(c: char) -> bool {
  c == '_' || c.is_alphabetic()
}

pub(crate) fn is_ident_continue(c: char) -> bool {
  c == '_' || c.is_alphanumeric()
}
