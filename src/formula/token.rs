use std::fmt;

/// Tokens produced by the formula lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Number(f64),
    /// Single- or double-quoted text. Followed by `!` it names a sheet.
    String(String),
    Boolean(bool),
    /// Function names and cell references, upper-cased, `$` markers kept.
    Identifier(String),

    Plus,
    Minus,
    Asterisk,
    Slash,
    Caret,
    Ampersand,
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    LParen,
    RParen,
    Comma,
    Colon,
    Exclamation,

    Eof,
    Illegal(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Token::Identifier(s) => f.write_str(s),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Asterisk => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::Ampersand => f.write_str("&"),
            Token::Equals => f.write_str("="),
            Token::NotEqual => f.write_str("<>"),
            Token::LessThan => f.write_str("<"),
            Token::GreaterThan => f.write_str(">"),
            Token::LessEqual => f.write_str("<="),
            Token::GreaterEqual => f.write_str(">="),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Colon => f.write_str(":"),
            Token::Exclamation => f.write_str("!"),
            Token::Eof => f.write_str("end of formula"),
            Token::Illegal(c) => write!(f, "illegal character '{}'", c),
        }
    }
}
