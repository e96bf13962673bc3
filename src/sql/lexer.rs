//! SQL Lexer (Tokenizer)
//!
//! This module converts statement strings into a stream of tokens.

use super::token::Token;
use crate::error::{Error, Result};

/// SQL Lexer
pub struct Lexer {
    /// Input characters
    input: Vec<char>,
    /// Current position in input
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.skip_comments();
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        match ch {
            '(' => {
                self.advance();
                return Ok(Token::LParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RParen);
            }
            ',' => {
                self.advance();
                return Ok(Token::Comma);
            }
            ';' => {
                self.advance();
                return Ok(Token::Semicolon);
            }
            '*' => {
                self.advance();
                return Ok(Token::Asterisk);
            }
            '=' => {
                self.advance();
                return Ok(Token::Eq);
            }
            '-' => {
                // Negative number
                if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                    return self.read_number(true);
                }
                return Err(self.unexpected(ch));
            }
            '<' => {
                self.advance();
                if !self.is_at_end() {
                    match self.current_char() {
                        '=' => {
                            self.advance();
                            return Ok(Token::Lte);
                        }
                        '>' => {
                            self.advance();
                            return Ok(Token::Neq);
                        }
                        _ => {}
                    }
                }
                return Ok(Token::Lt);
            }
            '>' => {
                self.advance();
                if !self.is_at_end() && self.current_char() == '=' {
                    self.advance();
                    return Ok(Token::Gte);
                }
                return Ok(Token::Gt);
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    self.advance();
                    return Ok(Token::Neq);
                }
                return Err(self.unexpected(ch));
            }
            '\'' | '"' => {
                return self.read_string(ch);
            }
            _ => {}
        }

        // Numbers
        if ch.is_ascii_digit() {
            return self.read_number(false);
        }

        // Identifiers and keywords
        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.read_identifier());
        }

        Err(self.unexpected(ch))
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get the current character
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Peek at the next character
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
    }

    fn unexpected(&self, ch: char) -> Error {
        Error::syntax(format!("'{}' at position {}", ch, self.position))
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    /// Skip SQL comments (-- and /* */)
    fn skip_comments(&mut self) {
        if self.is_at_end() {
            return;
        }

        // Single line comment: --
        if self.current_char() == '-' && self.peek_char() == Some('-') {
            while !self.is_at_end() && self.current_char() != '\n' {
                self.advance();
            }
            self.skip_whitespace();
            self.skip_comments();
            return;
        }

        // Multi-line comment: /* */
        if self.current_char() == '/' && self.peek_char() == Some('*') {
            self.advance(); // skip /
            self.advance(); // skip *

            while !self.is_at_end() {
                if self.current_char() == '*' && self.peek_char() == Some('/') {
                    self.advance(); // skip *
                    self.advance(); // skip /
                    break;
                }
                self.advance();
            }
            self.skip_whitespace();
            self.skip_comments();
        }
    }

    /// Read a string literal. A doubled quote inside the literal stands for
    /// one quote character.
    fn read_string(&mut self, quote: char) -> Result<Token> {
        let start_pos = self.position;
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == quote {
                if self.peek_char() == Some(quote) {
                    value.push(quote);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    return Ok(Token::StringLiteral(value));
                }
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Err(Error::syntax(format!(
            "unterminated string at position {}",
            start_pos
        )))
    }

    /// Read an integer. The sign, if any, has already been consumed.
    fn read_number(&mut self, negative: bool) -> Result<Token> {
        let start_pos = self.position;
        let mut value = String::new();
        if negative {
            value.push('-');
        }

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        // Digits running into letters form a word such as `2024_sales`
        if !self.is_at_end() && (self.current_char().is_ascii_alphabetic() || self.current_char() == '_') {
            if negative {
                return Err(self.unexpected(self.current_char()));
            }
            self.position = start_pos;
            return Ok(self.read_identifier());
        }

        value
            .parse::<i64>()
            .map(Token::IntegerLiteral)
            .map_err(|_| Error::syntax(format!("invalid number at position {}", start_pos)))
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch.is_ascii_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::from_keyword(&value).unwrap_or(Token::Identifier(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let mut lexer = Lexer::new("SELECT * FROM users");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Asterisk,
                Token::From,
                Token::Identifier("users".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_select_with_where() {
        let mut lexer = Lexer::new("SELECT id, name FROM users WHERE id >= -1");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Identifier("id".to_string()),
                Token::Comma,
                Token::Identifier("name".to_string()),
                Token::From,
                Token::Identifier("users".to_string()),
                Token::Where,
                Token::Identifier("id".to_string()),
                Token::Gte,
                Token::IntegerLiteral(-1),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        let mut lexer = Lexer::new(r#"'it''s' "say ""hi""" 'a%'"#);
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0], Token::StringLiteral("it's".to_string()));
        assert_eq!(tokens[1], Token::StringLiteral("say \"hi\"".to_string()));
        assert_eq!(tokens[2], Token::StringLiteral("a%".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("SELECT 'oops");
        assert!(matches!(lexer.tokenize(), Err(Error::SyntaxError { .. })));
    }

    #[test]
    fn test_comparison_operators() {
        let mut lexer = Lexer::new("a < b <= c > d >= e <> f != g");
        let tokens = lexer.tokenize().unwrap();

        assert!(tokens.contains(&Token::Lt));
        assert!(tokens.contains(&Token::Lte));
        assert!(tokens.contains(&Token::Gt));
        assert!(tokens.contains(&Token::Gte));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Neq).count(), 2);
    }

    #[test]
    fn test_digit_led_word() {
        let mut lexer = Lexer::new("USE 2024_sales");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[1], Token::Identifier("2024_sales".to_string()));
    }

    #[test]
    fn test_bad_input() {
        assert!(Lexer::new("SELECT 1.5").tokenize().is_err());
        assert!(Lexer::new("SELECT -12abc").tokenize().is_err());
        assert!(Lexer::new("a ! b").tokenize().is_err());
        assert!(Lexer::new("99999999999999999999").tokenize().is_err());
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("SELECT -- this is a comment\n* /* more */ FROM users");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Asterisk,
                Token::From,
                Token::Identifier("users".to_string()),
                Token::Eof,
            ]
        );
    }
}
