//! Recursive-descent parsers for query options and resource paths.
//!
//! Every descent goes through a [`DepthGuard`]; exceeding the configured
//! limit is `SyntaxError::RecursionLimitExceeded`, never a stack fault.

mod expression;
mod path;
mod query;
mod select_expand;

#[cfg(test)]
mod tests;

use crate::syntax::{
    SyntaxError,
    lexer::{Lexer, Token, TokenKind},
    token::LiteralToken,
};

pub use expression::{ExpressionParser, parse_filter, parse_orderby};
pub use path::parse_resource_path;
pub use query::parse_query;
pub use select_expand::{parse_expand, parse_select};

/// Parse exactly one literal, e.g. `100.0`, `'x'` or `guid'...'`.
pub fn parse_literal(text: &str) -> Result<LiteralToken, SyntaxError> {
    let mut cursor = Cursor::new(text)?;
    let position = cursor.position();

    match cursor.advance() {
        TokenKind::Literal(literal) => {
            cursor.expect_end()?;
            Ok(literal)
        }
        TokenKind::End => Err(SyntaxError::UnexpectedEnd {
            expected: "literal".to_string(),
        }),
        found => Err(SyntaxError::UnexpectedToken {
            position,
            expected: "literal".to_string(),
            found: found.to_string(),
        }),
    }
}

///
/// Cursor
///
/// Token stream over one option value. The stream always ends with
/// `TokenKind::End`, which `advance` never moves past.
///

pub(crate) struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(source: &str) -> Result<Self, SyntaxError> {
        Ok(Self {
            tokens: Lexer::tokenize(source)?,
            pos: 0,
        })
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    pub(crate) fn peek_second(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|token| &token.kind)
    }

    pub(crate) fn position(&self) -> usize {
        self.current().span.start
    }

    pub(crate) fn advance(&mut self) -> TokenKind {
        let kind = self.current().kind.clone();
        if kind != TokenKind::End {
            self.pos += 1;
        }

        kind
    }

    /// Consume the next token when it equals `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<(), SyntaxError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    pub(crate) fn expect_end(&self) -> Result<(), SyntaxError> {
        match self.peek() {
            TokenKind::End => Ok(()),
            _ => Err(self.unexpected("end of input")),
        }
    }

    /// Error describing the current token as not what was `expected`.
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            TokenKind::End => SyntaxError::UnexpectedEnd {
                expected: expected.to_string(),
            },
            found => SyntaxError::UnexpectedToken {
                position: self.position(),
                expected: expected.to_string(),
                found: found.to_string(),
            },
        }
    }
}

///
/// DepthGuard
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct DepthGuard {
    depth: usize,
    limit: usize,
}

impl DepthGuard {
    pub(crate) const fn new(limit: usize) -> Self {
        Self { depth: 0, limit }
    }

    pub(crate) const fn enter(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > self.limit {
            return Err(SyntaxError::RecursionLimitExceeded { limit: self.limit });
        }

        Ok(())
    }

    pub(crate) const fn leave(&mut self, levels: usize) {
        self.depth = self.depth.saturating_sub(levels);
    }
}

/// Split `text` on `separator` outside quotes and parentheses.
pub(crate) fn split_top_level(text: &str, separator: char) -> Result<Vec<&str>, SyntaxError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote_start: Option<usize> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '\'' => {
                quote_start = match quote_start {
                    Some(_) => None,
                    None => Some(i),
                };
            }
            _ if quote_start.is_some() => {}
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(SyntaxError::UnexpectedCharacter {
                        position: i,
                        found: ')',
                    })?;
            }
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if let Some(position) = quote_start {
        return Err(SyntaxError::UnterminatedString { position });
    }
    if depth > 0 {
        return Err(SyntaxError::UnexpectedEnd {
            expected: "')'".to_string(),
        });
    }

    parts.push(&text[start..]);

    Ok(parts)
}

/// Byte index of the first `(` outside quotes.
pub(crate) fn find_open_paren(text: &str) -> Option<usize> {
    let mut in_quote = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => return Some(i),
            _ => {}
        }
    }

    None
}
