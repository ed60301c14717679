//! Placeholder parsing and substitution for command templates.
//!
//! The composition rule is stored as a template so that the command shape and
//! the tool locations stay configuration data rather than code. A template is
//! rendered once per action with a [`Resolver`] that knows the tool paths, the
//! joined input list and the output path.
//!
//! # Placeholder Formats
//!
//! - `$${tool:NAME}` - location of the tool registered under NAME
//! - `$${in}` - the action's inputs, already joined
//! - `$${out}` - the action's output path
//!
//! # Shell Variables
//!
//! Single `$` characters pass through unchanged, so `$PATH` style variables
//! survive rendering.
//!
//! # Escaping
//!
//! Use `$$$` before `{` to produce a literal `$${` sequence.
//!
//! # Example
//!
//! ```
//! use compat_matrix_lib::placeholder::{parse, Segment, Placeholder};
//!
//! let segments = parse("$${tool:composer} -o $${out}").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Placeholder(Placeholder::Tool("composer".to_string())),
//!     Segment::Literal(" -o ".to_string()),
//!     Segment::Placeholder(Placeholder::Out),
//! ]);
//! ```

use thiserror::Error;

/// A parsed placeholder reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
  /// `$${tool:NAME}` - a tool location
  Tool(String),

  /// `$${in}` - the joined input list
  In,

  /// `$${out}` - the output path
  Out,
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no placeholders)
  Literal(String),

  /// A placeholder to be resolved
  Placeholder(Placeholder),
}

/// Errors that can occur during placeholder parsing or resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PlaceholderError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("unknown placeholder type: {0}")]
  UnknownType(String),

  #[error("malformed placeholder: {0}")]
  Malformed(String),

  #[error("unresolved tool: {0}")]
  UnresolvedTool(String),
}

/// Trait for resolving placeholder values while rendering a template.
pub trait Resolver {
  /// Resolve the location of a named tool.
  fn resolve_tool(&self, name: &str) -> Result<&str, PlaceholderError>;

  /// Resolve the joined input list.
  fn resolve_in(&self) -> Result<&str, PlaceholderError>;

  /// Resolve the output path.
  fn resolve_out(&self) -> Result<&str, PlaceholderError>;
}

/// Parse a string containing placeholders into segments.
///
/// # Errors
///
/// Returns an error if a placeholder is malformed (unclosed, unknown type, etc.)
pub fn parse(input: &str) -> Result<Vec<Segment>, PlaceholderError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '$')) => {
        chars.next();

        match chars.peek() {
          Some((_, '$')) => {
            chars.next();
            if let Some((_, '{')) = chars.peek() {
              // $$${ -> literal $${
              literal.push_str("$${");
              chars.next();
            } else {
              literal.push_str("$$$");
            }
          }
          Some((_, '{')) => {
            chars.next();

            if !literal.is_empty() {
              segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }

            let mut content = String::new();
            let mut found_close = false;
            for (_, c) in chars.by_ref() {
              if c == '}' {
                found_close = true;
                break;
              }
              content.push(c);
            }

            if !found_close {
              return Err(PlaceholderError::Unclosed(pos));
            }

            segments.push(Segment::Placeholder(parse_placeholder_content(&content)?));
          }
          _ => literal.push_str("$$"),
        }
      }
      // A lone $ passes through
      _ => literal.push('$'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Parse the content inside a placeholder (everything between `${` and `}`).
fn parse_placeholder_content(content: &str) -> Result<Placeholder, PlaceholderError> {
  match content {
    "in" => return Ok(Placeholder::In),
    "out" => return Ok(Placeholder::Out),
    _ => {}
  }

  let (kind, rest) = content
    .split_once(':')
    .ok_or_else(|| PlaceholderError::Malformed(format!("missing colon in '{content}'")))?;

  match kind {
    "tool" if rest.is_empty() => Err(PlaceholderError::Malformed(format!(
      "tool placeholder missing name: '{content}'"
    ))),
    "tool" => Ok(Placeholder::Tool(rest.to_string())),
    _ => Err(PlaceholderError::UnknownType(kind.to_string())),
  }
}

/// Substitute all placeholders in a string using the provided resolver.
///
/// # Errors
///
/// Returns an error if parsing fails or if any placeholder cannot be resolved.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let segments = parse(input)?;
  substitute_segments(&segments, resolver)
}

/// Substitute placeholders in pre-parsed segments.
///
/// Use this when the template has been parsed once and is rendered for many
/// actions.
pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Placeholder(p) => {
        let value = match p {
          Placeholder::Tool(name) => resolver.resolve_tool(name)?,
          Placeholder::In => resolver.resolve_in()?,
          Placeholder::Out => resolver.resolve_out()?,
        };
        result.push_str(value);
      }
    }
  }

  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  struct TestResolver {
    tools: HashMap<String, String>,
    inputs: String,
    out: String,
  }

  impl TestResolver {
    fn new(inputs: &str, out: &str) -> Self {
      Self {
        tools: HashMap::new(),
        inputs: inputs.to_string(),
        out: out.to_string(),
      }
    }

    fn with_tool(mut self, name: &str, path: &str) -> Self {
      self.tools.insert(name.to_string(), path.to_string());
      self
    }
  }

  impl Resolver for TestResolver {
    fn resolve_tool(&self, name: &str) -> Result<&str, PlaceholderError> {
      self
        .tools
        .get(name)
        .map(|s| s.as_str())
        .ok_or_else(|| PlaceholderError::UnresolvedTool(name.to_string()))
    }

    fn resolve_in(&self) -> Result<&str, PlaceholderError> {
      Ok(&self.inputs)
    }

    fn resolve_out(&self) -> Result<&str, PlaceholderError> {
      Ok(&self.out)
    }
  }

  mod parsing {
    use super::*;

    #[test]
    fn default_template_parses_into_five_segments() {
      let segments = parse(crate::consts::DEFAULT_COMMAND_TEMPLATE).unwrap();

      assert_eq!(
        segments,
        vec![
          Segment::Placeholder(Placeholder::Tool("composer".to_string())),
          Segment::Literal(" -i ".to_string()),
          Segment::Placeholder(Placeholder::In),
          Segment::Literal(" -o ".to_string()),
          Segment::Placeholder(Placeholder::Out),
        ]
      );
    }

    #[test]
    fn shell_variables_pass_through() {
      let segments = parse("PATH=$PATH $${out}").unwrap();

      assert_eq!(segments[0], Segment::Literal("PATH=$PATH ".to_string()));
      assert_eq!(segments[1], Segment::Placeholder(Placeholder::Out));
    }

    #[test]
    fn escaped_sequence_is_literal() {
      let segments = parse("echo $$${in}").unwrap();
      assert_eq!(segments, vec![Segment::Literal("echo $${in}".to_string())]);
    }

    #[test]
    fn unclosed_placeholder_reports_position() {
      assert_eq!(parse("ab $${out"), Err(PlaceholderError::Unclosed(3)));
    }

    #[test]
    fn unknown_kind_is_rejected() {
      assert_eq!(
        parse("$${action:0}"),
        Err(PlaceholderError::UnknownType("action".to_string()))
      );
    }

    #[test]
    fn tool_without_name_is_malformed() {
      assert!(matches!(parse("$${tool:}"), Err(PlaceholderError::Malformed(_))));
    }
  }

  mod substitution {
    use super::*;

    #[test]
    fn renders_composer_invocation() {
      let resolver = TestResolver::new("a.xml:b.xml", "out/gen/m/m").with_tool("composer", "host/bin/composer");

      let cmd = substitute(crate::consts::DEFAULT_COMMAND_TEMPLATE, &resolver).unwrap();

      assert_eq!(cmd, "host/bin/composer -i a.xml:b.xml -o out/gen/m/m");
    }

    #[test]
    fn missing_tool_is_an_error() {
      let resolver = TestResolver::new("", "out");

      let err = substitute("$${tool:checker} $${out}", &resolver).unwrap_err();

      assert_eq!(err, PlaceholderError::UnresolvedTool("checker".to_string()));
    }

    #[test]
    fn pre_parsed_segments_render_repeatedly() {
      let segments = parse("$${tool:composer} -o $${out}").unwrap();
      let first = TestResolver::new("", "one").with_tool("composer", "c");
      let second = TestResolver::new("", "two").with_tool("composer", "c");

      assert_eq!(substitute_segments(&segments, &first).unwrap(), "c -o one");
      assert_eq!(substitute_segments(&segments, &second).unwrap(), "c -o two");
    }
  }
}
