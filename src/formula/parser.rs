//! Recursive descent parser from [`Token`]s to an [`Expression`].
//!
//! ```text
//! expression     --> comparison
//! comparison     --> concatenation ( ("=" | "<>" | "<" | ">" | "<=" | ">=") concatenation )*
//! concatenation  --> additive ( "&" additive )*
//! additive       --> multiplicative ( ("+" | "-") multiplicative )*
//! multiplicative --> power ( ("*" | "/") power )*
//! power          --> unary ( "^" unary )*
//! unary          --> "-" unary | primary
//! primary        --> NUMBER | STRING | BOOLEAN | reference | function_call | "(" expression ")"
//! reference      --> [sheet_prefix] IDENTIFIER (":" IDENTIFIER)?
//! sheet_prefix   --> (IDENTIFIER | STRING) "!"
//! function_call  --> IDENTIFIER "(" ( expression ("," expression)* )? ")"
//! ```

use super::ast::{BinaryOperator, CellReference, Expression, Literal, UnaryOperator};
use super::lexer::Lexer;
use super::token::Token;
use crate::coord::{col_to_index, MAX_COLUMN};
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
        }
    }

    /// Parses the whole input. A leading `=` is optional.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::Equals {
            self.advance();
        }

        if self.current_token == Token::Eof {
            return Err(ParseError::new("Empty expression"));
        }

        let expr = self.parse_expression()?;

        if self.current_token != Token::Eof {
            return Err(ParseError::new(format!(
                "Unexpected {} after expression",
                self.current_token
            )));
        }

        Ok(expr)
    }

    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected {}, found {}",
                expected, self.current_token
            )))
        }
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_concatenation()?;

        loop {
            let op = match &self.current_token {
                Token::Equals => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_concatenation()?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_concatenation(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_additive()?;

        while self.current_token == Token::Ampersand {
            self.advance();
            let right = self.parse_additive()?;
            left = Expression::binary(left, BinaryOperator::Concat, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_power()?;

        loop {
            let op = match &self.current_token {
                Token::Asterisk => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_power()?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    /// Negation binds tighter than `^`, and `^` is left-associative, so
    /// `-2^2` is 4 and `2^3^2` is 64.
    fn parse_power(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;

        while self.current_token == Token::Caret {
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::binary(left, BinaryOperator::Power, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::Minus {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current_token.clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expression::Literal(Literal::Number(n)))
            }

            Token::String(s) => {
                self.advance();
                if self.current_token == Token::Exclamation {
                    self.advance();
                    return self.parse_sheet_reference(s);
                }
                Ok(Expression::Literal(Literal::String(s)))
            }

            Token::Boolean(b) => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(b)))
            }

            Token::Identifier(name) => {
                self.advance();

                match self.current_token {
                    Token::Exclamation => {
                        self.advance();
                        self.parse_sheet_reference(name)
                    }
                    Token::LParen => self.parse_function_call(name),
                    Token::Colon => self.parse_range(None, &name),
                    _ => Ok(Expression::CellRef(split_cell_reference(None, &name)?)),
                }
            }

            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            Token::Eof => Err(ParseError::new("Unexpected end of expression")),

            Token::Illegal(quote @ ('"' | '\'')) => {
                Err(ParseError::new(format!("Unterminated string starting with {}", quote)))
            }

            token => Err(ParseError::new(format!("Unexpected {}", token))),
        }
    }

    fn parse_sheet_reference(&mut self, sheet: String) -> ParseResult<Expression> {
        match self.current_token.clone() {
            Token::Identifier(name) => {
                self.advance();
                if self.current_token == Token::Colon {
                    self.parse_range(Some(sheet), &name)
                } else {
                    Ok(Expression::CellRef(split_cell_reference(Some(sheet), &name)?))
                }
            }
            other => Err(ParseError::new(format!(
                "Expected cell reference after '!', found {}",
                other
            ))),
        }
    }

    fn parse_range(&mut self, sheet: Option<String>, start: &str) -> ParseResult<Expression> {
        // Consume ':'
        self.advance();

        let end = match self.current_token.clone() {
            Token::Identifier(name) => {
                self.advance();
                name
            }
            other => {
                return Err(ParseError::new(format!(
                    "Expected cell reference after ':', found {}",
                    other
                )))
            }
        };

        Ok(Expression::Range {
            sheet,
            start: split_cell_reference(None, start)?,
            end: split_cell_reference(None, &end)?,
        })
    }

    fn parse_function_call(&mut self, name: String) -> ParseResult<Expression> {
        // Consume '('
        self.advance();

        let mut args = Vec::new();

        if self.current_token == Token::RParen {
            self.advance();
            return Ok(Expression::FunctionCall { name, args });
        }

        args.push(self.parse_expression()?);
        while self.current_token == Token::Comma {
            self.advance();
            args.push(self.parse_expression()?);
        }

        self.expect(Token::RParen)?;

        Ok(Expression::FunctionCall { name, args })
    }
}

/// Splits `A1`, `$A1`, `A$1` or `$A$1` into a [`CellReference`].
fn split_cell_reference(sheet: Option<String>, identifier: &str) -> ParseResult<CellReference> {
    let invalid = || ParseError::new(format!("Invalid cell reference: {}", identifier));

    let rest = identifier.strip_prefix('$');
    let col_absolute = rest.is_some();
    let rest = rest.unwrap_or(identifier);

    let col_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (col, rest) = rest.split_at(col_len);

    let digits = rest.strip_prefix('$');
    let row_absolute = digits.is_some();
    let digits = digits.unwrap_or(rest);

    if col.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    col_to_index(col).map_err(|_| {
        ParseError::new(format!("Column is past {}: {}", MAX_COLUMN, identifier))
    })?;

    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(ParseError::new(format!(
            "Row number must be >= 1: {}",
            identifier
        )));
    }

    Ok(CellReference {
        sheet,
        col: col.to_uppercase(),
        row,
        col_absolute,
        row_absolute,
    })
}

pub fn parse(input: &str) -> ParseResult<Expression> {
    Parser::new(input).parse()
}
