use crate::{
    settings::UriSettings,
    syntax::{
        SyntaxError,
        lexer::TokenKind,
        parser::Cursor,
        token::{LiteralToken, NamedValue, PathSegmentToken, SegmentToken, SystemKeyword},
    },
};

/// Parse a resource path such as `People(1)/Friends/$count`.
/// A leading `/` is ignored. Returns the leaf segment.
pub fn parse_resource_path(text: &str, settings: &UriSettings) -> Result<PathSegmentToken, SyntaxError> {
    let text = text.strip_prefix('/').unwrap_or(text);
    let mut cursor = Cursor::new(text)?;
    let mut current: Option<PathSegmentToken> = None;
    let mut segments = 0;

    loop {
        segments += 1;
        if segments > settings.max_path_segments {
            return Err(SyntaxError::RecursionLimitExceeded {
                limit: settings.max_path_segments,
            });
        }

        let parent = current.take().map(Box::new);
        current = Some(match cursor.peek().clone() {
            TokenKind::Identifier(identifier) => {
                cursor.advance();
                let named_values = if cursor.eat(&TokenKind::OpenParen) {
                    Some(parse_named_values(&mut cursor)?)
                } else {
                    None
                };

                PathSegmentToken::Segment(SegmentToken {
                    identifier,
                    named_values,
                    parent,
                })
            }
            TokenKind::SystemIdentifier(text) => {
                let keyword = system_keyword(&cursor, &text)?;
                cursor.advance();

                PathSegmentToken::Keyword { keyword, parent }
            }
            _ => return Err(cursor.unexpected("path segment")),
        });

        if !cursor.eat(&TokenKind::Slash) {
            break;
        }
    }
    cursor.expect_end()?;

    current.ok_or_else(|| SyntaxError::UnexpectedEnd {
        expected: "path segment".to_string(),
    })
}

/// Key or parameter list after the opening parenthesis, through `)`.
fn parse_named_values(cursor: &mut Cursor) -> Result<Vec<NamedValue>, SyntaxError> {
    let mut values = Vec::new();
    if cursor.eat(&TokenKind::CloseParen) {
        return Ok(values);
    }

    loop {
        let value = match (cursor.peek().clone(), cursor.peek_second()) {
            (TokenKind::Identifier(name), Some(TokenKind::Equal)) => {
                cursor.advance();
                cursor.advance();
                NamedValue::named(name, expect_literal(cursor)?)
            }
            _ => NamedValue::positional(expect_literal(cursor)?),
        };
        values.push(value);

        if cursor.eat(&TokenKind::Comma) {
            continue;
        }
        cursor.expect(&TokenKind::CloseParen)?;

        return Ok(values);
    }
}

fn expect_literal(cursor: &mut Cursor) -> Result<LiteralToken, SyntaxError> {
    match cursor.peek().clone() {
        TokenKind::Literal(literal) => {
            cursor.advance();
            Ok(literal)
        }
        _ => Err(cursor.unexpected("literal")),
    }
}

fn system_keyword(cursor: &Cursor, text: &str) -> Result<SystemKeyword, SyntaxError> {
    SystemKeyword::from_text(text).ok_or_else(|| cursor.unexpected("path keyword"))
}

/// Slash-separated member path used by `$select` and `$expand` terms:
/// identifiers, qualified type casts, `*`, `NS.*` and `$`-keywords.
pub(crate) fn parse_member_path(text: &str, max_segments: usize) -> Result<PathSegmentToken, SyntaxError> {
    let mut cursor = Cursor::new(text)?;
    let mut current: Option<PathSegmentToken> = None;
    let mut segments = 0;

    loop {
        segments += 1;
        if segments > max_segments {
            return Err(SyntaxError::RecursionLimitExceeded {
                limit: max_segments,
            });
        }

        let parent = current.take().map(Box::new);
        current = Some(match cursor.peek().clone() {
            TokenKind::Identifier(identifier) => PathSegmentToken::Segment(SegmentToken {
                identifier,
                named_values: None,
                parent,
            }),
            TokenKind::Star => PathSegmentToken::Star {
                namespace: None,
                parent,
            },
            TokenKind::QualifiedStar(namespace) => PathSegmentToken::Star {
                namespace: Some(namespace),
                parent,
            },
            TokenKind::SystemIdentifier(text) => PathSegmentToken::Keyword {
                keyword: system_keyword(&cursor, &text)?,
                parent,
            },
            _ => return Err(cursor.unexpected("path segment")),
        });
        cursor.advance();

        if !cursor.eat(&TokenKind::Slash) {
            break;
        }
    }
    cursor.expect_end()?;

    current.ok_or_else(|| SyntaxError::UnexpectedEnd {
        expected: "path segment".to_string(),
    })
}
