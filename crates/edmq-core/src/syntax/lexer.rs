use crate::{
    syntax::{SyntaxError, token::LiteralToken},
    value::{EnumValue, LiteralError, LiteralValue, SpatialValue, text},
};
use edmq_primitives::PrimitiveKind;
use std::{fmt, ops::Range};

///
/// TokenKind
///
/// Keyword operators (`eq`, `and`, ...) are plain identifiers; the parser
/// decides from position whether an identifier is an operator.
///

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    QualifiedStar(String),
    SystemIdentifier(String),
    Literal(LiteralToken),
    OpenParen,
    CloseParen,
    Comma,
    Slash,
    Star,
    Equal,
    Semicolon,
    Colon,
    Minus,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) | Self::SystemIdentifier(name) => write!(f, "'{name}'"),
            Self::QualifiedStar(ns) => write!(f, "'{ns}.*'"),
            Self::Literal(literal) => write!(f, "literal {}", literal.text),
            Self::OpenParen => f.write_str("'('"),
            Self::CloseParen => f.write_str("')'"),
            Self::Comma => f.write_str("','"),
            Self::Slash => f.write_str("'/'"),
            Self::Star => f.write_str("'*'"),
            Self::Equal => f.write_str("'='"),
            Self::Semicolon => f.write_str("';'"),
            Self::Colon => f.write_str("':'"),
            Self::Minus => f.write_str("'-'"),
            Self::End => f.write_str("end of input"),
        }
    }
}

///
/// Token
///

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

///
/// Lexer
///
/// Scans one already percent-decoded option value.
///

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Every token of `source`, ending with `TokenKind::End`.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::End;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }

        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::End,
                span: start..start,
            });
        };

        let kind = match c {
            '(' => self.single(TokenKind::OpenParen),
            ')' => self.single(TokenKind::CloseParen),
            ',' => self.single(TokenKind::Comma),
            '/' => self.single(TokenKind::Slash),
            '*' => self.single(TokenKind::Star),
            '=' => self.single(TokenKind::Equal),
            ';' => self.single(TokenKind::Semicolon),
            ':' => self.single(TokenKind::Colon),
            '-' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit())
                || self.rest().starts_with("-INF") =>
            {
                self.number(start)?
            }
            '-' => self.single(TokenKind::Minus),
            '\'' => {
                let body = self.quoted_body()?;
                TokenKind::Literal(LiteralToken::new(
                    LiteralValue::String(body),
                    &self.source[start..self.pos],
                ))
            }
            '$' => self.system_identifier(start)?,
            c if c.is_ascii_digit() => self.number(start)?,
            c if is_ident_start(c) => self.identifier_or_literal(start)?,
            found => {
                return Err(SyntaxError::UnexpectedCharacter {
                    position: start,
                    found,
                });
            }
        };

        Ok(Token {
            kind,
            span: start..self.pos,
        })
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn system_identifier(&mut self, start: usize) -> Result<TokenKind, SyntaxError> {
        self.bump();
        if !self.peek().is_some_and(is_ident_start) {
            return Err(SyntaxError::UnexpectedCharacter {
                position: start,
                found: '$',
            });
        }
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }

        Ok(TokenKind::SystemIdentifier(
            self.source[start..self.pos].to_string(),
        ))
    }

    fn identifier_or_literal(&mut self, start: usize) -> Result<TokenKind, SyntaxError> {
        self.bump();
        loop {
            match self.peek() {
                Some(c) if is_ident_char(c) => {
                    self.bump();
                }
                Some('.') => match self.peek_at(1) {
                    Some(next) if is_ident_start(next) => {
                        self.bump();
                    }
                    Some('*') => {
                        let namespace = self.source[start..self.pos].to_string();
                        self.bump();
                        self.bump();
                        return Ok(TokenKind::QualifiedStar(namespace));
                    }
                    _ => break,
                },
                _ => break,
            }
        }

        let source = self.source;
        let ident = &source[start..self.pos];
        if self.peek() == Some('\'') {
            return self.prefixed_literal(start, ident);
        }

        let value = match ident {
            "null" => LiteralValue::Null,
            "true" => LiteralValue::Boolean(true),
            "false" => LiteralValue::Boolean(false),
            "INF" => LiteralValue::Double(f64::INFINITY),
            "NaN" => LiteralValue::Double(f64::NAN),
            _ => return Ok(TokenKind::Identifier(ident.to_string())),
        };

        Ok(TokenKind::Literal(LiteralToken::new(value, ident)))
    }

    fn prefixed_literal(&mut self, start: usize, prefix: &str) -> Result<TokenKind, SyntaxError> {
        let body_start = self.pos;
        let body = self.quoted_body()?;
        let source_text = &self.source[start..self.pos];

        let value: Result<LiteralValue, LiteralError> = match prefix.to_ascii_lowercase().as_str()
        {
            "datetime" => text::parse_datetime(&body).map(LiteralValue::DateTime),
            "datetimeoffset" => text::parse_datetime_offset(&body).map(LiteralValue::DateTimeOffset),
            "time" => text::parse_duration(&body).map(LiteralValue::Time),
            "guid" => text::parse_guid(&body).map(LiteralValue::Guid),
            "binary" | "x" => text::parse_binary(&body).map(LiteralValue::Binary),
            "geography" => {
                SpatialValue::parse(PrimitiveKind::Geography, &body).map(LiteralValue::Geography)
            }
            "geometry" => {
                SpatialValue::parse(PrimitiveKind::Geometry, &body).map(LiteralValue::Geometry)
            }
            _ if prefix.contains('.') => Ok(LiteralValue::Enum(EnumValue::new(prefix, body))),
            _ => {
                return Err(SyntaxError::UnknownLiteralPrefix {
                    position: start,
                    prefix: prefix.to_string(),
                });
            }
        };

        let value = value.map_err(|source| SyntaxError::InvalidLiteral {
            position: body_start,
            source,
        })?;

        Ok(TokenKind::Literal(LiteralToken::new(value, source_text)))
    }

    /// Consume `'...'` and return the body with `''` unescaped.
    fn quoted_body(&mut self) -> Result<String, SyntaxError> {
        let open = self.pos;
        self.bump();

        let mut body = String::new();
        loop {
            match self.bump() {
                None => return Err(SyntaxError::UnterminatedString { position: open }),
                Some('\'') if self.peek() == Some('\'') => {
                    self.bump();
                    body.push('\'');
                }
                Some('\'') => return Ok(body),
                Some(c) => body.push(c),
            }
        }
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, SyntaxError> {
        if self.peek() == Some('-') {
            self.bump();
        }

        if self.rest().starts_with("INF") {
            self.pos += 3;
            let text = &self.source[start..self.pos];
            return Ok(TokenKind::Literal(LiteralToken::new(
                LiteralValue::Double(f64::NEG_INFINITY),
                text,
            )));
        }

        self.eat_digits();
        let mut is_float = false;

        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.eat_digits();
            is_float = true;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                if signed {
                    self.bump();
                }
                self.eat_digits();
                is_float = true;
            }
        }

        let body_end = self.pos;
        let suffix = match self.peek() {
            Some(c @ ('L' | 'l' | 'M' | 'm' | 'F' | 'f' | 'D' | 'd'))
                if !self.peek_at(1).is_some_and(is_ident_char) =>
            {
                self.bump();
                Some(c.to_ascii_uppercase())
            }
            _ => None,
        };

        if let Some(found) = self.peek().filter(|c| is_ident_char(*c)) {
            return Err(SyntaxError::UnexpectedCharacter {
                position: self.pos,
                found,
            });
        }

        let body = &self.source[start..body_end];
        let text = &self.source[start..self.pos];
        let value = numeric_value(body, suffix, is_float).map_err(|source| {
            SyntaxError::InvalidLiteral {
                position: start,
                source,
            }
        })?;

        Ok(TokenKind::Literal(LiteralToken::new(value, text)))
    }
}

/// Typed value of a numeric literal.
///
/// Unsuffixed integers are Int32, widening to Int64 and then Decimal when
/// they do not fit. Unsuffixed fractions and exponents are Double.
fn numeric_value(body: &str, suffix: Option<char>, is_float: bool) -> Result<LiteralValue, LiteralError> {
    let out_of_range = |kind: PrimitiveKind| LiteralError::OutOfRange {
        kind,
        text: body.to_string(),
    };

    match suffix {
        Some('L') if !is_float => body
            .parse::<i64>()
            .map(LiteralValue::Int64)
            .map_err(|_| out_of_range(PrimitiveKind::Int64)),
        Some('L') => Err(LiteralError::Invalid {
            kind: PrimitiveKind::Int64,
            text: body.to_string(),
        }),
        Some('M') => text::parse_decimal(body).map(LiteralValue::Decimal),
        Some('F') => body
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(LiteralValue::Single)
            .ok_or_else(|| out_of_range(PrimitiveKind::Single)),
        Some(_) => parse_double(body),
        None if is_float => parse_double(body),
        None => body
            .parse::<i32>()
            .map(LiteralValue::Int32)
            .or_else(|_| body.parse::<i64>().map(LiteralValue::Int64))
            .or_else(|_| text::parse_decimal(body).map(LiteralValue::Decimal)),
    }
}

fn parse_double(body: &str) -> Result<LiteralValue, LiteralError> {
    body.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(LiteralValue::Double)
        .ok_or_else(|| LiteralError::OutOfRange {
            kind: PrimitiveKind::Double,
            text: body.to_string(),
        })
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .expect("source should tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn single_literal(source: &str) -> LiteralToken {
        match kinds(source).as_slice() {
            [TokenKind::Literal(literal), TokenKind::End] => literal.clone(),
            other => panic!("expected one literal, got {other:?}"),
        }
    }

    #[test]
    fn integers_widen_by_magnitude() {
        assert_eq!(single_literal("42").value, LiteralValue::Int32(42));
        assert_eq!(
            single_literal("3000000000").value,
            LiteralValue::Int64(3_000_000_000)
        );
        assert_eq!(single_literal("-7").value, LiteralValue::Int32(-7));
        assert_eq!(single_literal("42L").value, LiteralValue::Int64(42));
    }

    #[test]
    fn suffixes_pick_the_kind() {
        assert_eq!(
            single_literal("1.5M").value,
            LiteralValue::Decimal(Decimal::from_str("1.5").unwrap())
        );
        assert_eq!(single_literal("2.5f").value, LiteralValue::Single(2.5));
        assert_eq!(single_literal("100.0").value, LiteralValue::Double(100.0));
        assert_eq!(single_literal("1e3").value, LiteralValue::Double(1000.0));
        assert_eq!(single_literal("7d").value, LiteralValue::Double(7.0));
        assert_eq!(single_literal("-INF").value, LiteralValue::Double(f64::NEG_INFINITY));
    }

    #[test]
    fn literal_text_is_preserved() {
        let literal = single_literal("'O''Neil'");
        assert_eq!(literal.value, LiteralValue::String("O'Neil".to_string()));
        assert_eq!(literal.text, "'O''Neil'");
    }

    #[test]
    fn prefixed_literals_parse_their_payload() {
        assert!(matches!(
            single_literal("guid'01234567-89ab-cdef-0123-456789abcdef'").value,
            LiteralValue::Guid(_)
        ));
        assert_eq!(
            single_literal("X'0A0B'").value,
            LiteralValue::Binary(vec![0x0a, 0x0b])
        );
        assert!(matches!(
            single_literal("geography'SRID=4326;POINT(1 2)'").value,
            LiteralValue::Geography(SpatialValue {
                kind: PrimitiveKind::GeographyPoint,
                srid: Some(4326),
                ..
            })
        ));
        assert_eq!(
            single_literal("Test.WeekDay'Monday'").value,
            LiteralValue::Enum(EnumValue::new("Test.WeekDay", "Monday"))
        );
    }

    #[test]
    fn minus_before_identifier_is_an_operator() {
        assert_eq!(
            kinds("-Age"),
            vec![
                TokenKind::Minus,
                TokenKind::Identifier("Age".to_string()),
                TokenKind::End
            ]
        );
    }

    #[test]
    fn dotted_names_and_namespace_stars() {
        assert_eq!(
            kinds("Test.Employee/Test.*"),
            vec![
                TokenKind::Identifier("Test.Employee".to_string()),
                TokenKind::Slash,
                TokenKind::QualifiedStar("Test".to_string()),
                TokenKind::End
            ]
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            Lexer::tokenize("'open"),
            Err(SyntaxError::UnterminatedString { position: 0 })
        ));
        assert!(matches!(
            Lexer::tokenize("Name eq #"),
            Err(SyntaxError::UnexpectedCharacter { found: '#', .. })
        ));
        assert!(matches!(
            Lexer::tokenize("guid'nope'"),
            Err(SyntaxError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            Lexer::tokenize("foo'bar'"),
            Err(SyntaxError::UnknownLiteralPrefix { .. })
        ));
    }
}
