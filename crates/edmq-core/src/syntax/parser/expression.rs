use crate::{
    settings::UriSettings,
    syntax::{
        SyntaxError,
        lexer::TokenKind,
        parser::{Cursor, DepthGuard},
        token::{
            BinaryOperatorKind, OrderByToken, OrderDirection, QueryToken, UnaryOperatorKind,
        },
    },
};

/// Parse a `$filter` value.
pub fn parse_filter(text: &str, settings: &UriSettings) -> Result<QueryToken, SyntaxError> {
    let mut parser = ExpressionParser::new(text, settings.max_filter_depth)?;
    let expression = parser.parse_expression()?;
    parser.cursor.expect_end()?;

    Ok(expression)
}

/// Parse an `$orderby` value: comma-separated expressions with an
/// optional `asc`/`desc` each.
pub fn parse_orderby(text: &str, settings: &UriSettings) -> Result<Vec<OrderByToken>, SyntaxError> {
    let mut parser = ExpressionParser::new(text, settings.max_orderby_depth)?;
    let mut items = Vec::new();

    loop {
        let expression = parser.parse_expression()?;
        let direction = match parser.cursor.peek() {
            TokenKind::Identifier(word) if word == "asc" => {
                parser.cursor.advance();
                OrderDirection::Ascending
            }
            TokenKind::Identifier(word) if word == "desc" => {
                parser.cursor.advance();
                OrderDirection::Descending
            }
            _ => OrderDirection::Ascending,
        };
        items.push(OrderByToken {
            expression,
            direction,
        });

        if !parser.cursor.eat(&TokenKind::Comma) {
            break;
        }
    }
    parser.cursor.expect_end()?;

    Ok(items)
}

///
/// ExpressionParser
///
/// Precedence climbing over the binary operators, recursive descent
/// for unary operators, parentheses, paths and calls. Each operator
/// appended to a left-deep chain counts toward the depth limit as well,
/// so the produced tree is never deeper than the limit.
///

pub struct ExpressionParser {
    cursor: Cursor,
    guard: DepthGuard,
}

impl ExpressionParser {
    pub fn new(text: &str, max_depth: usize) -> Result<Self, SyntaxError> {
        Ok(Self {
            cursor: Cursor::new(text)?,
            guard: DepthGuard::new(max_depth),
        })
    }

    pub fn parse_expression(&mut self) -> Result<QueryToken, SyntaxError> {
        self.parse_binary(BinaryOperatorKind::Or.precedence())
    }

    fn peek_binary_operator(&self) -> Option<BinaryOperatorKind> {
        match self.cursor.peek() {
            TokenKind::Identifier(word) => BinaryOperatorKind::from_keyword(word),
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<QueryToken, SyntaxError> {
        self.guard.enter()?;
        let mut levels = 1;

        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek_binary_operator() {
            if op.precedence() < min_precedence {
                break;
            }
            self.cursor.advance();

            let right = self.parse_binary(op.precedence() + 1)?;
            left = QueryToken::binary(op, left, right);

            self.guard.enter()?;
            levels += 1;
        }

        self.guard.leave(levels);
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<QueryToken, SyntaxError> {
        let op = match self.cursor.peek() {
            TokenKind::Minus => UnaryOperatorKind::Negate,
            TokenKind::Identifier(word) if word == "not" => UnaryOperatorKind::Not,
            _ => return self.parse_primary(),
        };
        self.cursor.advance();

        self.guard.enter()?;
        let operand = self.parse_unary()?;
        self.guard.leave(1);

        Ok(QueryToken::unary(op, operand))
    }

    fn parse_primary(&mut self) -> Result<QueryToken, SyntaxError> {
        match self.cursor.peek().clone() {
            TokenKind::Literal(literal) => {
                self.cursor.advance();
                Ok(QueryToken::Literal(literal))
            }
            TokenKind::OpenParen => {
                self.cursor.advance();
                self.guard.enter()?;
                let inner = self.parse_expression()?;
                self.cursor.expect(&TokenKind::CloseParen)?;
                self.guard.leave(1);

                Ok(inner)
            }
            TokenKind::Star => {
                self.cursor.advance();
                Ok(QueryToken::Star { parent: None })
            }
            TokenKind::SystemIdentifier(name) if name == "$it" => {
                self.cursor.advance();
                self.parse_path_tail(QueryToken::property(name))
            }
            TokenKind::Identifier(name) => {
                self.cursor.advance();
                let head = self.parse_member(name, None)?;
                self.parse_path_tail(head)
            }
            _ => Err(self.cursor.unexpected("expression")),
        }
    }

    /// Property access, or a call when a parenthesis follows.
    fn parse_member(
        &mut self,
        name: String,
        parent: Option<QueryToken>,
    ) -> Result<QueryToken, SyntaxError> {
        let parent = parent.map(Box::new);
        if !self.cursor.eat(&TokenKind::OpenParen) {
            return Ok(QueryToken::PropertyAccess { name, parent });
        }

        self.guard.enter()?;
        let mut arguments = Vec::new();
        if !self.cursor.eat(&TokenKind::CloseParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if self.cursor.eat(&TokenKind::Comma) {
                    continue;
                }
                self.cursor.expect(&TokenKind::CloseParen)?;
                break;
            }
        }
        self.guard.leave(1);

        Ok(QueryToken::FunctionCall {
            name,
            arguments,
            parent,
        })
    }

    /// `/segment` continuations; the result is the leaf, linked to its parent.
    fn parse_path_tail(&mut self, mut current: QueryToken) -> Result<QueryToken, SyntaxError> {
        let mut levels = 0;

        while self.cursor.eat(&TokenKind::Slash) {
            self.guard.enter()?;
            levels += 1;

            current = match self.cursor.peek().clone() {
                TokenKind::Identifier(name) => {
                    self.cursor.advance();
                    self.parse_member(name, Some(current))?
                }
                TokenKind::Star => {
                    self.cursor.advance();
                    QueryToken::Star {
                        parent: Some(Box::new(current)),
                    }
                }
                _ => return Err(self.cursor.unexpected("path segment")),
            };
        }

        self.guard.leave(levels);
        Ok(current)
    }
}
