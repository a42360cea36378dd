//! Canonical Gemfile output.
//!
//! Renders a regrouped [`Manifest`] back into Gemfile text:
//!
//! ```ruby
//! source "https://rubygems.org"
//! ruby "3.3.0"
//!
//! gem 'pg', '~> 1.1'
//! gem 'rails', '~> 7.1'
//!
//! group :development, :test do
//!   gem 'rspec-rails'
//! end
//! ```
//!
//! `source` and `ruby` lines keep double-quoted strings. Gem lines use single
//! quotes throughout, drop empty-string and empty-array arguments, and list
//! keyword options last. Sections are separated by one blank line and the
//! output ends with exactly one newline.

use crate::dsl::lexer::{is_ident_continue, is_ident_start};
use crate::manifest::{GemDecl, Group, Manifest, Value};

const INDENT: &str = "  ";

#[derive(Clone, Copy, PartialEq)]
enum Quote {
  Double,
  Single,
}

/// Render a manifest as Gemfile text.
pub fn render(manifest: &Manifest) -> String {
  let mut sections = Vec::new();

  let header: Vec<String> = manifest
    .sources
    .iter()
    .map(|source| statement("source", &source.args, Quote::Double))
    .chain(
      manifest
        .rubies
        .iter()
        .map(|ruby| statement("ruby", &ruby.args, Quote::Double)),
    )
    .collect();
  if !header.is_empty() {
    sections.push(header.join("\n"));
  }

  for group in &manifest.groups {
    sections.push(render_group(group));
  }

  let mut out = sections.join("\n\n");
  out.push('\n');
  out
}

fn render_group(group: &Group) -> String {
  if group.key.is_default() {
    return group.gems.iter().map(gem_line).collect::<Vec<_>>().join("\n");
  }

  let labels: Vec<String> = group
    .key
    .labels()
    .iter()
    .map(|label| format_symbol(label, Quote::Double))
    .collect();

  let mut lines = Vec::with_capacity(group.gems.len() + 2);
  lines.push(format!("group {} do", labels.join(", ")));
  for gem in &group.gems {
    lines.push(format!("{}{}", INDENT, gem_line(gem)));
  }
  lines.push("end".to_string());
  lines.join("\n")
}

fn gem_line(gem: &GemDecl) -> String {
  let mut parts = vec![quote_str(&gem.name, Quote::Single)];
  parts.extend(
    gem
      .args
      .iter()
      .filter(|arg| !arg.is_blank())
      .map(|arg| format_value(arg, Quote::Single)),
  );
  if !gem.options.is_empty() {
    parts.push(format_pairs(&gem.options, Quote::Single));
  }
  format!("gem {}", parts.join(", "))
}

/// Render a `source` or `ruby` call.
///
/// A `{` right after a bare call name opens a block, so a leading braced hash
/// forces the parenthesized form.
fn statement(name: &str, args: &[Value], quote: Quote) -> String {
  let parts = format_args(args, quote);
  let leading_brace = match args.first() {
    Some(Value::Hash(pairs)) => args.len() > 1 || pairs.is_empty(),
    _ => false,
  };

  if parts.is_empty() {
    name.to_string()
  } else if leading_brace {
    format!("{}({})", name, parts.join(", "))
  } else {
    format!("{} {}", name, parts.join(", "))
  }
}

/// Format positional arguments. A non-empty trailing hash renders as bare
/// `key: value` pairs, any other hash keeps its braces.
fn format_args(args: &[Value], quote: Quote) -> Vec<String> {
  let last = args.len().saturating_sub(1);
  args
    .iter()
    .enumerate()
    .map(|(i, arg)| match arg {
      Value::Hash(pairs) if i == last && !pairs.is_empty() => format_pairs(pairs, quote),
      _ => format_value(arg, quote),
    })
    .collect()
}

fn format_pairs(pairs: &[(Value, Value)], quote: Quote) -> String {
  pairs
    .iter()
    .map(|(key, value)| format_pair(key, value, quote))
    .collect::<Vec<_>>()
    .join(", ")
}

fn format_pair(key: &Value, value: &Value, quote: Quote) -> String {
  let value = format_value(value, quote);
  match key {
    Value::Symbol(name) if is_simple_name(name) => format!("{}: {}", name, value),
    Value::Symbol(name) => format!("{}: {}", quote_str(name, quote), value),
    other => format!("{} => {}", format_value(other, quote), value),
  }
}

fn format_value(value: &Value, quote: Quote) -> String {
  match value {
    Value::Str(s) => quote_str(s, quote),
    Value::Symbol(name) => format_symbol(name, quote),
    Value::Number(text) => text.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Nil => "nil".to_string(),
    Value::Array(items) => {
      let items: Vec<String> = items.iter().map(|item| format_value(item, quote)).collect();
      format!("[{}]", items.join(", "))
    }
    Value::Hash(pairs) if pairs.is_empty() => "{}".to_string(),
    Value::Hash(pairs) => format!("{{ {} }}", format_pairs(pairs, quote)),
  }
}

fn format_symbol(name: &str, quote: Quote) -> String {
  if is_simple_name(name) {
    format!(":{}", name)
  } else {
    format!(":{}", quote_str(name, quote))
  }
}

/// Whether `name` can be written as a bare symbol or label.
fn is_simple_name(name: &str) -> bool {
  let body = name.strip_suffix(['?', '!']).unwrap_or(name);
  let mut chars = body.chars();
  match chars.next() {
    Some(first) if is_ident_start(first) => chars.all(is_ident_continue),
    _ => false,
  }
}

fn quote_str(s: &str, quote: Quote) -> String {
  match quote {
    Quote::Single => {
      let mut out = String::with_capacity(s.len() + 2);
      out.push('\'');
      for c in s.chars() {
        match c {
          '\\' => out.push_str("\\\\"),
          '\'' => out.push_str("\\'"),
          c => out.push(c),
        }
      }
      out.push('\'');
      out
    }
    Quote::Double => {
      let mut out = String::with_capacity(s.len() + 2);
      out.push('"');
      let mut chars = s.chars().peekable();
      while let Some(c) = chars.next() {
        match c {
          '\\' => out.push_str("\\\\"),
          '"' => out.push_str("\\\""),
          '\n' => out.push_str("\\n"),
          '\t' => out.push_str("\\t"),
          '\r' => out.push_str("\\r"),
          '\0' => out.push_str("\\0"),
          '\u{1b}' => out.push_str("\\e"),
          '#' if matches!(chars.peek(), Some('{' | '@' | '$')) => out.push_str("\\#"),
          c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
          c => out.push(c),
        }
      }
      out.push('"');
      out
    }
  }
}
