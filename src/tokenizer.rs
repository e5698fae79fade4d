use std::collections::VecDeque;

use tracing::trace;

use crate::ast::Literal;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String(String),
    Number(f64),

    // Keywords
    And,
    Assert,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // End of file
    Eof,
}

impl Eq for TokenType {}

impl TokenType {
    fn keyword(word: &str) -> Option<TokenType> {
        let token_type = match word {
            "and" => TokenType::And,
            "assert" => TokenType::Assert,
            "class" => TokenType::Class,
            "else" => TokenType::Else,
            "false" => TokenType::False,
            "fun" => TokenType::Fun,
            "for" => TokenType::For,
            "if" => TokenType::If,
            "nil" => TokenType::Nil,
            "or" => TokenType::Or,
            "print" => TokenType::Print,
            "return" => TokenType::Return,
            "super" => TokenType::Super,
            "this" => TokenType::This,
            "true" => TokenType::True,
            "var" => TokenType::Var,
            "while" => TokenType::While,
            _ => return None,
        };
        Some(token_type)
    }

    /// Keywords the parser may resume at after a syntax error.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Assert
                | TokenType::Return
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn literal(&self) -> Option<Literal> {
        match &self.token_type {
            TokenType::Number(n) => Some(Literal::Number(*n)),
            TokenType::String(s) => Some(Literal::String(s.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("lexical error on line {line}: {kind}")]
pub struct LexicalError {
    pub line: usize,
    pub kind: LexicalErrorKind,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexicalErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Pulls characters from `chars` on demand and hands out one token per call.
///
/// Characters that have been peeked but not consumed wait in `lookahead`, so
/// any amount of forward peeking is possible without reading the whole input.
pub struct Tokenizer<I: Iterator<Item = char>> {
    chars: I,
    lookahead: VecDeque<char>,
    lexeme: String,
    line: usize,
    token_line: usize,
    exhausted: bool,
}

impl<'a> Tokenizer<std::str::Chars<'a>> {
    pub fn from_source(source: &'a str) -> Self {
        Self::new(source.chars())
    }
}

impl<I: Iterator<Item = char>> Tokenizer<I> {
    pub fn new(chars: I) -> Self {
        Self {
            chars,
            lookahead: VecDeque::new(),
            lexeme: String::new(),
            line: 1,
            token_line: 1,
            exhausted: false,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_whitespace_and_comments();
        self.lexeme.clear();
        self.token_line = self.line;

        let Some(c) = self.advance() else {
            return Ok(self.make(TokenType::Eof));
        };

        let token_type = match c {
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            ',' => TokenType::Comma,
            '.' => TokenType::Dot,
            '-' => TokenType::Minus,
            '+' => TokenType::Plus,
            ';' => TokenType::Semicolon,
            '/' => TokenType::Slash,
            '*' => TokenType::Star,
            '!' => self.either('=', TokenType::BangEqual, TokenType::Bang),
            '=' => self.either('=', TokenType::EqualEqual, TokenType::Equal),
            '<' => self.either('=', TokenType::LessEqual, TokenType::Less),
            '>' => self.either('=', TokenType::GreaterEqual, TokenType::Greater),
            '"' => self.string()?,
            c if c.is_ascii_digit() => self.number()?,
            c if is_identifier_start(c) => self.identifier(),
            c => {
                return Err(LexicalError {
                    line: self.token_line,
                    kind: LexicalErrorKind::UnexpectedCharacter(c),
                })
            }
        };

        Ok(self.make(token_type))
    }

    fn make(&self, token_type: TokenType) -> Token {
        let token = Token {
            token_type,
            lexeme: self.lexeme.clone(),
            line: self.token_line,
        };
        trace!(line = token.line, token = ?token.token_type, "scanned token");
        token
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek(0) {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek(1) == Some('/') => {
                    while self.peek(0).is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn either(&mut self, expected: char, matched: TokenType, otherwise: TokenType) -> TokenType {
        if self.peek(0) == Some(expected) {
            self.advance();
            matched
        } else {
            otherwise
        }
    }

    fn string(&mut self) -> Result<TokenType, LexicalError> {
        loop {
            match self.advance() {
                Some('"') => break,
                Some(_) => {}
                None => {
                    return Err(LexicalError {
                        line: self.token_line,
                        kind: LexicalErrorKind::UnterminatedString,
                    })
                }
            }
        }

        let value = &self.lexeme[1..self.lexeme.len() - 1];
        Ok(TokenType::String(value.to_string()))
    }

    fn number(&mut self) -> Result<TokenType, LexicalError> {
        self.advance_while(|c| c.is_ascii_digit());

        // A trailing dot without digits is left for the next token.
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        match self.lexeme.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(TokenType::Number(n)),
            _ => Err(LexicalError {
                line: self.token_line,
                kind: LexicalErrorKind::InvalidNumber(self.lexeme.clone()),
            }),
        }
    }

    fn identifier(&mut self) -> TokenType {
        self.advance_while(is_identifier_continue);
        TokenType::keyword(&self.lexeme).unwrap_or(TokenType::Identifier)
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek(0).is_some_and(&predicate) {
            self.advance();
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.lookahead.pop_front().or_else(|| self.chars.next())?;
        if c == '\n' {
            self.line += 1;
        }
        self.lexeme.push(c);
        Some(c)
    }

    fn peek(&mut self, offset: usize) -> Option<char> {
        while self.lookahead.len() <= offset {
            let c = self.chars.next()?;
            self.lookahead.push_back(c);
        }
        self.lookahead.get(offset).copied()
    }
}

/// Yields every token up to and including the first `Eof`.
impl<I: Iterator<Item = char>> Iterator for Tokenizer<I> {
    type Item = Result<Token, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let result = self.next_token();
        if let Ok(Token {
            token_type: TokenType::Eof,
            ..
        }) = &result
        {
            self.exhausted = true;
        }
        Some(result)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tokens(source: &str) -> Vec<TokenType> {
        Tokenizer::from_source(source)
            .map(|token| token.expect("source should tokenize").token_type)
            .collect()
    }

    #[test]
    fn test_tokens() {
        let source = "var x = 1;";
        let expected = vec![
            TokenType::Var,
            TokenType::Identifier,
            TokenType::Equal,
            TokenType::Number(1.0),
            TokenType::Semicolon,
            TokenType::Eof,
        ];
        assert_eq!(tokens(source), expected);
    }

    #[test]
    fn test_tokens_with_comments() {
        let source = "var x = 1; // comment";
        let expected = vec![
            TokenType::Var,
            TokenType::Identifier,
            TokenType::Equal,
            TokenType::Number(1.0),
            TokenType::Semicolon,
            TokenType::Eof,
        ];
        assert_eq!(tokens(source), expected);
    }

    #[test]
    fn test_simple_tokens() {
        let source = "(){},.+-;*";
        let expected = vec![
            TokenType::LeftParen,
            TokenType::RightParen,
            TokenType::LeftBrace,
            TokenType::RightBrace,
            TokenType::Comma,
            TokenType::Dot,
            TokenType::Plus,
            TokenType::Minus,
            TokenType::Semicolon,
            TokenType::Star,
            TokenType::Eof,
        ];
        assert_eq!(tokens(source), expected);
    }

    #[test]
    fn test_two_character_tokens() {
        let source = "
        == != <= >=\t// comment
        = ! < >\t\t// another comment
        1\t/\t2\t// and another one";
        let expected = vec![
            TokenType::EqualEqual,
            TokenType::BangEqual,
            TokenType::LessEqual,
            TokenType::GreaterEqual,
            TokenType::Equal,
            TokenType::Bang,
            TokenType::Less,
            TokenType::Greater,
            TokenType::Number(1.0),
            TokenType::Slash,
            TokenType::Number(2.0),
            TokenType::Eof,
        ];
        assert_eq!(tokens(source), expected);
    }

    #[test]
    fn test_double_equal() {
        let source = "a==b";
        let expected = vec![
            TokenType::Identifier,
            TokenType::EqualEqual,
            TokenType::Identifier,
            TokenType::Eof,
        ];
        assert_eq!(tokens(source), expected);
    }

    #[test]
    fn test_tokens_with_string() {
        let source = "var x = \"hello\";";
        let mut tokenizer = Tokenizer::from_source(source);
        let string = tokenizer
            .by_ref()
            .map(|token| token.expect("source should tokenize"))
            .find(|token| matches!(token.token_type, TokenType::String(_)))
            .expect("there should be a string token");
        assert_eq!(string.lexeme, "\"hello\"");
        assert_eq!(string.literal(), Some(Literal::String("hello".to_string())));
    }

    #[test]
    fn test_numbers() {
        let source = "123 123.456 0.456";
        let expected = vec![
            TokenType::Number(123.0),
            TokenType::Number(123.456),
            TokenType::Number(0.456),
            TokenType::Eof,
        ];
        assert_eq!(tokens(source), expected);
    }

    #[test]
    fn test_trailing_dot_is_not_part_of_number() {
        let expected = vec![TokenType::Number(1.0), TokenType::Dot, TokenType::Eof];
        assert_eq!(tokens("1."), expected);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let source = "assert true and orchid _under score1";
        let expected = vec![
            TokenType::Assert,
            TokenType::True,
            TokenType::And,
            TokenType::Identifier,
            TokenType::Identifier,
            TokenType::Identifier,
            TokenType::Identifier,
            TokenType::Eof,
        ];
        assert_eq!(tokens(source), expected);
    }

    #[test]
    fn test_empty_source_is_eof_forever() {
        let mut tokenizer = Tokenizer::from_source("");
        for _ in 0..3 {
            let token = tokenizer.next_token().expect("eof is not an error");
            assert_eq!(token.token_type, TokenType::Eof);
        }
    }

    #[test]
    fn test_error_keeps_going() {
        let mut tokenizer = Tokenizer::from_source("#\n#kbye");

        let error = tokenizer.next_token().unwrap_err();
        assert_eq!(error.kind, LexicalErrorKind::UnexpectedCharacter('#'));
        assert_eq!(error.line, 1);

        let error = tokenizer.next_token().unwrap_err();
        assert!(error.to_string().contains("unexpected character"));
        assert_eq!(error.line, 2);

        let token = tokenizer.next_token().unwrap();
        assert_eq!(token.token_type, TokenType::Identifier);
        assert_eq!(token.lexeme, "kbye");

        let token = tokenizer.next_token().unwrap();
        assert_eq!(token.token_type, TokenType::Eof);
    }

    #[test]
    fn test_number_too_big() {
        let source = "9".repeat(1000);
        let error = Tokenizer::from_source(&source).next_token().unwrap_err();
        assert!(matches!(error.kind, LexicalErrorKind::InvalidNumber(_)));
    }

    #[test]
    fn test_unterminated_string() {
        let error = Tokenizer::from_source("\"open").next_token().unwrap_err();
        assert_eq!(error.kind, LexicalErrorKind::UnterminatedString);
    }

    #[test]
    fn test_line_numbers() {
        let source = "\n\t2 2\t\n\n\t4\t4 \n\t5 // five\n\n\t7\n\t";
        let lines: Vec<usize> = Tokenizer::from_source(source)
            .map(|token| token.unwrap().line)
            .collect();
        assert_eq!(lines, vec![2, 2, 4, 4, 5, 7, 8]);
    }

    #[test]
    fn test_scanning_is_deterministic() {
        let source = "fun f(a) { return a * 2.5; } print f(\"x\") != nil;";
        let first: Vec<Token> = Tokenizer::from_source(source).map(Result::unwrap).collect();
        let second: Vec<Token> = Tokenizer::from_source(source).map(Result::unwrap).collect();
        assert_eq!(first, second);
    }
}
