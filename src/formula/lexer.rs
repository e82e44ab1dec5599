//! Scans a formula string into [`Token`]s.
//!
//! Strings may use either quote style; a doubled quote inside a string stands
//! for one literal quote (`'O''Brien'`, `"say ""hi"""`). Identifiers keep their
//! `$` absolute markers and are upper-cased, except that `TRUE` and `FALSE`
//! become booleans.

use super::token::Token;
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.input.next() {
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Asterisk,
            Some('/') => Token::Slash,
            Some('^') => Token::Caret,
            Some('&') => Token::Ampersand,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,
            Some(',') => Token::Comma,
            Some(':') => Token::Colon,
            Some('!') => Token::Exclamation,
            Some('=') => Token::Equals,
            Some('<') => self.read_less_than_operator(),
            Some('>') => self.read_greater_than_operator(),
            Some(quote @ ('"' | '\'')) => self.read_string(quote),
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),
            Some(ch) if starts_identifier(ch) => self.read_identifier(ch),
            None => Token::Eof,
            Some(ch) => Token::Illegal(ch),
        }
    }

    /// Collects every token up to and including [`Token::Eof`].
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.input.next_if(|ch| ch.is_whitespace()).is_some() {}
    }

    fn read_less_than_operator(&mut self) -> Token {
        if self.input.next_if_eq(&'=').is_some() {
            Token::LessEqual
        } else if self.input.next_if_eq(&'>').is_some() {
            Token::NotEqual
        } else {
            Token::LessThan
        }
    }

    fn read_greater_than_operator(&mut self) -> Token {
        if self.input.next_if_eq(&'=').is_some() {
            Token::GreaterEqual
        } else {
            Token::GreaterThan
        }
    }

    fn read_string(&mut self, quote: char) -> Token {
        let mut result = String::new();
        while let Some(ch) = self.input.next() {
            if ch == quote {
                if self.input.next_if_eq(&quote).is_some() {
                    result.push(quote);
                    continue;
                }
                return Token::String(result);
            }
            result.push(ch);
        }
        // Unterminated strings are reported by the parser.
        Token::Illegal(quote)
    }

    fn read_number(&mut self, first_char: char) -> Token {
        let mut number_str = String::from(first_char);
        let mut has_dot = first_char == '.';

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
            } else if ch == '.' && !has_dot {
                has_dot = true;
                number_str.push(ch);
            } else {
                break;
            }
            self.input.next();
        }

        match number_str.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Illegal(first_char),
        }
    }

    fn read_identifier(&mut self, first_char: char) -> Token {
        let mut ident = String::from(first_char);
        while let Some(ch) = self.input.next_if(|ch| continues_identifier(*ch)) {
            ident.push(ch);
        }

        let ident = ident.to_uppercase();
        match ident.as_str() {
            "TRUE" => Token::Boolean(true),
            "FALSE" => Token::Boolean(false),
            _ => Token::Identifier(ident),
        }
    }
}

fn starts_identifier(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn continues_identifier(ch: char) -> bool {
    starts_identifier(ch) || ch.is_ascii_digit() || ch == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_function_tokens() {
        let tokens = Lexer::new("=TBLOOKUP('ASSET_OTHER', \"CY\") * -1").tokenize();
        assert_eq!(
            tokens,
            vec![
                Token::Equals,
                Token::Identifier("TBLOOKUP".to_string()),
                Token::LParen,
                Token::String("ASSET_OTHER".to_string()),
                Token::Comma,
                Token::String("CY".to_string()),
                Token::RParen,
                Token::Asterisk,
                Token::Minus,
                Token::Number(1.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_absolute_references_and_operators() {
        let tokens = Lexer::new("$b$2:B10<>true").tokenize();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("$B$2".to_string()),
                Token::Colon,
                Token::Identifier("B10".to_string()),
                Token::NotEqual,
                Token::Boolean(true),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_doubled_quotes_and_unterminated_strings() {
        assert_eq!(
            Lexer::new("'O''Brien'").next_token(),
            Token::String("O'Brien".to_string())
        );
        assert_eq!(Lexer::new("\"open").next_token(), Token::Illegal('"'));
    }
}
