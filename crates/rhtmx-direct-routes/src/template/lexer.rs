//! Segment tokenizer for route templates
//!
//! Splits a template into `/`-separated segments and each segment into
//! literal text and `{...}` parameter tokens. Parenthesized groups outside
//! parameters (`Customers(1)`, `{id}(edit)`) are tracked with a depth counter:
//! only depth-0 parens delimit a group and an empty group `()` is dropped.
//! Inside a parameter, parens are tracked as well so constraint arguments may
//! contain `/`, `{`, `}` or `:` (for example `{code:regex(^\d{3}$)}`).
//!
//! Malformed input fails fast: unterminated groups are errors, never literal
//! text.

use crate::error::{Result, RouteError};

/// A token inside one template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text with `{{` / `}}` escapes already collapsed
    Literal(String),
    /// Raw parameter body, without the surrounding braces
    Parameter(&'a str),
}

/// Tokens of one `/`-separated segment
pub type RawSegment<'a> = Vec<Token<'a>>;

/// Tokenizes a route template
///
/// The empty template has no segments. Any other template yields one
/// [`RawSegment`] per `/`-separated segment; a segment may be empty (as in
/// `a//b`), which the parser rejects.
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::template::lexer::{tokenize, Token};
///
/// let segments = tokenize("orders/{id}(edit)").unwrap();
/// assert_eq!(segments.len(), 2);
/// assert_eq!(
///     segments[1],
///     vec![Token::Parameter("id"), Token::Literal("(edit)".to_string())]
/// );
///
/// // Empty groups are dropped
/// let segments = tokenize("Customers()").unwrap();
/// assert_eq!(segments[0], vec![Token::Literal("Customers".to_string())]);
/// ```
pub fn tokenize(template: &str) -> Result<Vec<RawSegment<'_>>> {
    if template.is_empty() {
        return Ok(Vec::new());
    }
    Lexer::new(template).run()
}

struct Lexer<'a> {
    template: &'a str,
    segments: Vec<RawSegment<'a>>,
    tokens: RawSegment<'a>,
    literal: String,
    paren_depth: usize,
    group_is_empty: bool,
}

impl<'a> Lexer<'a> {
    fn new(template: &'a str) -> Self {
        Self {
            template,
            segments: Vec::new(),
            tokens: Vec::new(),
            literal: String::new(),
            paren_depth: 0,
            group_is_empty: false,
        }
    }

    fn run(mut self) -> Result<Vec<RawSegment<'a>>> {
        let template = self.template;
        let bytes = template.as_bytes();
        let mut chars = template.char_indices().peekable();

        while let Some((index, ch)) = chars.next() {
            match ch {
                '/' => {
                    if self.paren_depth > 0 {
                        return Err(self.error("a '(' is not closed before the end of its segment"));
                    }
                    self.end_segment();
                }
                '{' if bytes.get(index + 1) == Some(&b'{') => {
                    chars.next();
                    self.push_char('{');
                }
                '}' if bytes.get(index + 1) == Some(&b'}') => {
                    chars.next();
                    self.push_char('}');
                }
                '{' => {
                    let end = self.parameter_end(index)?;
                    self.flush_literal();
                    self.tokens.push(Token::Parameter(&template[index + 1..end]));
                    self.group_is_empty = false;
                    // Skip the parameter body and its closing brace
                    while chars.next_if(|&(i, _)| i <= end).is_some() {}
                }
                '}' => {
                    return Err(self.error(format!(
                        "unmatched '}}' at position {index}; use '}}}}' for a literal brace"
                    )));
                }
                '(' => {
                    if self.paren_depth == 0 {
                        self.flush_literal();
                        self.group_is_empty = true;
                    } else {
                        self.group_is_empty = false;
                    }
                    self.paren_depth += 1;
                    self.literal.push('(');
                }
                ')' => {
                    if self.paren_depth == 0 {
                        return Err(self.error(format!("unmatched ')' at position {index}")));
                    }
                    self.paren_depth -= 1;
                    if self.paren_depth == 0 {
                        if self.group_is_empty {
                            // "()" carries nothing
                            self.literal.pop();
                        } else {
                            self.literal.push(')');
                            self.flush_literal();
                        }
                    } else {
                        self.literal.push(')');
                    }
                }
                other => self.push_char(other),
            }
        }

        if self.paren_depth > 0 {
            return Err(self.error("a '(' is not closed before the end of the template"));
        }
        self.end_segment();
        Ok(self.segments)
    }

    /// Finds the closing brace of the parameter opened at `open`
    fn parameter_end(&self, open: usize) -> Result<usize> {
        let mut depth = 0usize;
        for (offset, ch) in self.template[open + 1..].char_indices() {
            let position = open + 1 + offset;
            match ch {
                '(' => depth += 1,
                ')' if depth > 0 => depth -= 1,
                ')' => {
                    return Err(self.error(format!(
                        "unmatched ')' inside the parameter starting at position {open}"
                    )))
                }
                '}' if depth == 0 => return Ok(position),
                '{' if depth == 0 => {
                    return Err(self.error(format!(
                        "a parameter cannot be nested inside the parameter starting at position {open}"
                    )))
                }
                _ => {}
            }
        }
        Err(self.error(format!(
            "the parameter starting at position {open} is not closed with '}}'"
        )))
    }

    fn push_char(&mut self, ch: char) {
        if self.paren_depth > 0 {
            self.group_is_empty = false;
        }
        self.literal.push(ch);
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            self.tokens
                .push(Token::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn end_segment(&mut self) {
        self.flush_literal();
        self.segments.push(std::mem::take(&mut self.tokens));
    }

    fn error(&self, reason: impl Into<String>) -> RouteError {
        RouteError::template(self.template, reason)
    }
}
